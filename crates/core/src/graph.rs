//! Graph data structures for symbol dependency tracking.
//!
//! A `petgraph::StableGraph` is the backing store, so node indices stay
//! valid across the whole build even though nothing here ever removes a
//! node. A node is a tagged `GraphNode::File | GraphNode::Function` union
//! rather than one struct with fields that are meaningless off one branch,
//! and an id→index map rides alongside the graph so `find_node_by_id` is
//! O(1) instead of a linear scan.

use petgraph::stable_graph::{EdgeIndex, NodeIndex, StableGraph};
use petgraph::visit::{EdgeRef, IntoEdgeReferences};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

/// A file-level node.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileNode {
    pub id: String,
    pub display_name: String,
    pub file_path: PathBuf,
    pub start_line: usize,
    pub end_line: usize,
}

/// A function-level node, carrying the fields that are only meaningful for
/// functions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunctionNode {
    pub id: String,
    pub display_name: String,
    pub file_path: PathBuf,
    pub start_line: usize,
    pub end_line: usize,
    pub parameters: Vec<String>,
    pub is_exported: bool,
    pub is_async: bool,
    pub decorators: Vec<String>,
    /// Populated during reverse-relation backfill.
    pub outgoing_calls: Vec<String>,
    pub incoming_calls: Vec<String>,
    pub imported_from: Option<String>,
    pub files_that_import_me: Vec<String>,
}

/// Tagged node variant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum GraphNode {
    File(FileNode),
    Function(FunctionNode),
}

impl GraphNode {
    pub fn id(&self) -> &str {
        match self {
            GraphNode::File(f) => &f.id,
            GraphNode::Function(f) => &f.id,
        }
    }

    pub fn display_name(&self) -> &str {
        match self {
            GraphNode::File(f) => &f.display_name,
            GraphNode::Function(f) => &f.display_name,
        }
    }

    pub fn file_path(&self) -> &PathBuf {
        match self {
            GraphNode::File(f) => &f.file_path,
            GraphNode::Function(f) => &f.file_path,
        }
    }

    pub fn start_line(&self) -> usize {
        match self {
            GraphNode::File(f) => f.start_line,
            GraphNode::Function(f) => f.start_line,
        }
    }

    pub fn as_function(&self) -> Option<&FunctionNode> {
        match self {
            GraphNode::Function(f) => Some(f),
            _ => None,
        }
    }

    pub fn as_function_mut(&mut self) -> Option<&mut FunctionNode> {
        match self {
            GraphNode::Function(f) => Some(f),
            _ => None,
        }
    }

    pub fn is_function(&self) -> bool {
        matches!(self, GraphNode::Function(_))
    }
}

/// Edge relationship kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EdgeKind {
    Calls,
    Imports,
    Exports,
    Defines,
    ContainedIn,
}

impl EdgeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EdgeKind::Calls => "calls",
            EdgeKind::Imports => "imports",
            EdgeKind::Exports => "exports",
            EdgeKind::Defines => "defines",
            EdgeKind::ContainedIn => "contained_in",
        }
    }
}

/// A single edge in the graph. Multi-valued: each textual call site
/// produces its own `GraphEdge`, even between the same two nodes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphEdge {
    pub edge_id: String,
    pub source_node_id: String,
    pub target_node_id: String,
    pub kind: EdgeKind,
    pub occurrence_file: PathBuf,
    pub occurrence_line: usize,
    pub context: Option<String>,
}

/// Aggregate counters carried alongside the node/edge maps.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct GraphStats {
    pub total_functions: usize,
    pub total_files: usize,
    pub total_calls: usize,
    pub total_imports: usize,
    /// Builder-reported collisions.
    pub id_collisions: usize,
}

/// The dependency graph: node map plus an ordered edge sequence plus
/// aggregate counters.
#[derive(Default)]
pub struct Graph {
    inner: StableGraph<GraphNode, GraphEdge>,
    id_index: HashMap<String, NodeIndex>,
    next_edge_seq: usize,
    pub stats: GraphStats,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a node, indexing it by id. Returns `None` and bumps the
    /// collision counter if `id` is already present — first-writer-wins.
    pub fn add_node(&mut self, node: GraphNode) -> Option<NodeIndex> {
        let id = node.id().to_string();
        if self.id_index.contains_key(&id) {
            self.stats.id_collisions += 1;
            return None;
        }
        match &node {
            GraphNode::File(_) => self.stats.total_files += 1,
            GraphNode::Function(_) => self.stats.total_functions += 1,
        }
        let idx = self.inner.add_node(node);
        self.id_index.insert(id, idx);
        Some(idx)
    }

    pub fn add_edge(
        &mut self,
        source: NodeIndex,
        target: NodeIndex,
        kind: EdgeKind,
        occurrence_file: PathBuf,
        occurrence_line: usize,
        context: Option<String>,
    ) -> EdgeIndex {
        let source_node_id = self.inner[source].id().to_string();
        let target_node_id = self.inner[target].id().to_string();
        let edge_id = format!("e{}", self.next_edge_seq);
        self.next_edge_seq += 1;

        match kind {
            EdgeKind::Calls => self.stats.total_calls += 1,
            EdgeKind::Imports => self.stats.total_imports += 1,
            _ => {}
        }

        let edge = GraphEdge {
            edge_id,
            source_node_id,
            target_node_id,
            kind,
            occurrence_file,
            occurrence_line,
            context,
        };
        self.inner.add_edge(source, target, edge)
    }

    pub fn node_weight(&self, index: NodeIndex) -> Option<&GraphNode> {
        self.inner.node_weight(index)
    }

    pub fn node_weight_mut(&mut self, index: NodeIndex) -> Option<&mut GraphNode> {
        self.inner.node_weight_mut(index)
    }

    pub fn node_count(&self) -> usize {
        self.inner.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.inner.edge_count()
    }

    pub fn nodes(&self) -> impl Iterator<Item = &GraphNode> {
        self.inner.node_weights()
    }

    /// All edges, in insertion order.
    pub fn edges(&self) -> impl Iterator<Item = &GraphEdge> {
        self.inner.edge_weights()
    }

    pub fn edge_endpoints(
        &self,
    ) -> impl Iterator<Item = (NodeIndex, NodeIndex, &GraphEdge)> {
        self.inner
            .edge_references()
            .map(|e| (e.source(), e.target(), e.weight()))
    }

    pub fn node_indices(&self) -> impl Iterator<Item = NodeIndex> + '_ {
        self.inner.node_indices()
    }

    /// O(1) lookup by stable id, backed by `id_index`.
    pub fn find_node_by_id(&self, id: &str) -> Option<NodeIndex> {
        self.id_index.get(id).copied()
    }

    pub fn node_by_id(&self, id: &str) -> Option<&GraphNode> {
        self.find_node_by_id(id).and_then(|idx| self.node_weight(idx))
    }
}
