//! Builds the derived lookup tables over a finished graph: the master
//! usage table keyed by function name/id, a file→functions map, and the
//! two adjacency maps (callee ids, caller ids) per function. Usage
//! entries carry a source snippet, read lazily and cached per path.

use crate::graph::{EdgeKind, Graph};
use petgraph::stable_graph::NodeIndex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UsageKind {
    Definition,
    Export,
    Import,
    Call,
    Test,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UsageLocation {
    pub usage_kind: UsageKind,
    pub file_path: PathBuf,
    pub line: usize,
    pub source_snippet: String,
    pub enclosing_function: Option<String>,
}

/// Lazily-filled, per-path line cache used for snippet extraction. Grows
/// monotonically for the lifetime of the index.
#[derive(Default)]
pub struct FileContentCache {
    lines_by_path: HashMap<PathBuf, Vec<String>>,
}

impl FileContentCache {
    pub fn snippet(&mut self, path: &Path, line: usize) -> String {
        let lines = self.lines_by_path.entry(path.to_path_buf()).or_insert_with(|| {
            std::fs::read_to_string(path)
                .map(|text| text.lines().map(|l| l.to_string()).collect())
                .unwrap_or_default()
        });
        lines
            .get(line.saturating_sub(1))
            .map(|s| s.trim().to_string())
            .unwrap_or_default()
    }
}

pub struct Indexes {
    pub usages_by_name: HashMap<String, Vec<UsageLocation>>,
    pub usages_by_node_id: HashMap<String, Vec<UsageLocation>>,
    pub functions_by_file: HashMap<PathBuf, Vec<String>>,
    pub callees_by_function: HashMap<String, Vec<String>>,
    pub callers_by_function: HashMap<String, Vec<String>>,
    pub exported_name_to_id: HashMap<String, String>,
    /// First-wins (in graph node-insertion order) mapping from a bare
    /// display name to the node id reported on its `UsageReport`. Kept
    /// alongside `usages_by_name` instead of recovered later by a suffix
    /// scan over `usages_by_node_id`, so two functions sharing a display
    /// name across file stems resolve to a deterministic id on every run.
    pub canonical_node_id_by_name: HashMap<String, String>,
}

pub fn build_indexes(graph: &Graph) -> Indexes {
    let mut cache = FileContentCache::default();

    let mut usages_by_node_id: HashMap<String, Vec<UsageLocation>> = HashMap::new();
    let mut functions_by_file: HashMap<PathBuf, Vec<String>> = HashMap::new();
    let mut callees_by_function: HashMap<String, Vec<String>> = HashMap::new();
    let mut callers_by_function: HashMap<String, Vec<String>> = HashMap::new();
    let mut exported_name_to_id: HashMap<String, String> = HashMap::new();

    let function_indices: Vec<NodeIndex> = graph
        .node_indices()
        .filter(|&idx| graph.node_weight(idx).map(|n| n.is_function()).unwrap_or(false))
        .collect();

    for &idx in &function_indices {
        let node = graph.node_weight(idx).unwrap();
        let func = node.as_function().unwrap();

        functions_by_file
            .entry(func.file_path.clone())
            .or_default()
            .push(func.id.clone());

        callees_by_function.insert(func.id.clone(), func.outgoing_calls.clone());
        callers_by_function.insert(func.id.clone(), func.incoming_calls.clone());

        let mut usages = Vec::new();

        // 1. Definition usage.
        usages.push(UsageLocation {
            usage_kind: UsageKind::Definition,
            file_path: func.file_path.clone(),
            line: func.start_line,
            source_snippet: cache.snippet(&func.file_path, func.start_line),
            enclosing_function: None,
        });

        // 2. Export usages.
        for edge in graph.edges() {
            if edge.kind == EdgeKind::Exports && edge.target_node_id == func.id {
                usages.push(UsageLocation {
                    usage_kind: UsageKind::Export,
                    file_path: edge.occurrence_file.clone(),
                    line: edge.occurrence_line,
                    source_snippet: cache.snippet(&edge.occurrence_file, edge.occurrence_line),
                    enclosing_function: None,
                });
                exported_name_to_id.insert(func.display_name.clone(), func.id.clone());
            }
        }

        // 3. Import usages — one per Imports edge targeting this function,
        // from each file in files_that_import_me.
        for edge in graph.edges() {
            if edge.kind == EdgeKind::Imports && edge.target_node_id == func.id {
                usages.push(UsageLocation {
                    usage_kind: UsageKind::Import,
                    file_path: edge.occurrence_file.clone(),
                    line: edge.occurrence_line,
                    source_snippet: cache.snippet(&edge.occurrence_file, edge.occurrence_line),
                    enclosing_function: None,
                });
            }
        }

        // 4. Call usages, reclassified as Test if the occurrence file path
        // contains "test" (case-insensitive).
        for edge in graph.edges() {
            if edge.kind == EdgeKind::Calls && edge.target_node_id == func.id {
                let is_test = edge
                    .occurrence_file
                    .to_string_lossy()
                    .to_lowercase()
                    .contains("test");
                let enclosing_function = graph
                    .node_by_id(&edge.source_node_id)
                    .map(|n| n.display_name().to_string());
                usages.push(UsageLocation {
                    usage_kind: if is_test { UsageKind::Test } else { UsageKind::Call },
                    file_path: edge.occurrence_file.clone(),
                    line: edge.occurrence_line,
                    source_snippet: cache.snippet(&edge.occurrence_file, edge.occurrence_line),
                    enclosing_function,
                });
            }
        }

        usages_by_node_id.insert(func.id.clone(), usages);
    }

    // by-name table aliases the same lists; when two functions share a bare
    // name, usages from both are concatenated in node-iteration order
    // (which follows graph insertion order — file discovery order). The
    // first function registered under a name is its canonical node id.
    let mut usages_by_name: HashMap<String, Vec<UsageLocation>> = HashMap::new();
    let mut canonical_node_id_by_name: HashMap<String, String> = HashMap::new();
    for &idx in &function_indices {
        let func = graph.node_weight(idx).unwrap().as_function().unwrap();
        let usages = usages_by_node_id.get(&func.id).cloned().unwrap_or_default();
        usages_by_name
            .entry(func.display_name.clone())
            .or_default()
            .extend(usages);
        canonical_node_id_by_name
            .entry(func.display_name.clone())
            .or_insert_with(|| func.id.clone());
    }

    Indexes {
        usages_by_name,
        usages_by_node_id,
        functions_by_file,
        callees_by_function,
        callers_by_function,
        exported_name_to_id,
        canonical_node_id_by_name,
    }
}
