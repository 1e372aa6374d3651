//! JSON graph dump and an optional Graphviz DOT export for visualization.

use crate::graph::{EdgeKind, Graph, GraphNode};
use crate::impact::classify_tier;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphDump {
    /// A `BTreeMap`, not a `HashMap`: key order must be deterministic so
    /// two builds of the same repository serialize to byte-identical JSON.
    pub nodes: BTreeMap<String, Value>,
    pub edges: Vec<Value>,
    pub statistics: Value,
}

pub fn dump_json(graph: &Graph) -> GraphDump {
    let mut nodes = BTreeMap::new();
    for node in graph.nodes() {
        nodes.insert(node.id().to_string(), node_to_json(node));
    }

    let edges = graph
        .edges()
        .map(|e| {
            json!({
                "edge_id": e.edge_id,
                "source_node_id": e.source_node_id,
                "target_node_id": e.target_node_id,
                "kind": e.kind.as_str(),
                "occurrence_file": e.occurrence_file,
                "occurrence_line": e.occurrence_line,
                "context": e.context,
            })
        })
        .collect();

    let statistics = json!({
        "total_functions": graph.stats.total_functions,
        "total_files": graph.stats.total_files,
        "total_calls": graph.stats.total_calls,
        "total_imports": graph.stats.total_imports,
        "id_collisions": graph.stats.id_collisions,
    });

    GraphDump { nodes, edges, statistics }
}

fn node_to_json(node: &GraphNode) -> Value {
    match node {
        GraphNode::File(f) => json!({
            "kind": "file",
            "id": f.id,
            "display_name": f.display_name,
            "file_path": f.file_path,
            "start_line": f.start_line,
            "end_line": f.end_line,
        }),
        GraphNode::Function(f) => json!({
            "kind": "function",
            "id": f.id,
            "display_name": f.display_name,
            "file_path": f.file_path,
            "start_line": f.start_line,
            "end_line": f.end_line,
            "parameters": f.parameters,
            "is_exported": f.is_exported,
            "is_async": f.is_async,
            "decorators": f.decorators,
            "outgoing_calls": f.outgoing_calls,
            "incoming_calls": f.incoming_calls,
            "imported_from": f.imported_from,
            "files_that_import_me": f.files_that_import_me,
        }),
    }
}

/// Render the graph as Graphviz DOT, capped at `max_nodes` nodes (the
/// first `max_nodes` by insertion order). No stable schema is promised
/// beyond producing syntactically valid DOT.
pub fn dump_dot(graph: &Graph, max_nodes: usize) -> String {
    let mut out = String::from("digraph impactgraph {\n");

    let included: Vec<&GraphNode> = graph.nodes().take(max_nodes).collect();
    let included_ids: std::collections::HashSet<&str> = included.iter().map(|n| n.id()).collect();

    for node in &included {
        let (shape, label) = match node {
            GraphNode::File(f) => ("box".to_string(), f.display_name.clone()),
            GraphNode::Function(f) => {
                let tier = classify_tier(&f.file_path);
                let shape = match tier {
                    crate::impact::CriticalityTier::CriticalPath => "doubleoctagon",
                    crate::impact::CriticalityTier::Secondary => "ellipse",
                    crate::impact::CriticalityTier::Tertiary => "oval",
                    crate::impact::CriticalityTier::NonCritical => "plaintext",
                };
                (shape.to_string(), f.display_name.clone())
            }
        };
        out.push_str(&format!(
            "  \"{}\" [label=\"{}\", shape={}];\n",
            escape(node.id()),
            escape(&label),
            shape
        ));
    }

    for edge in graph.edges() {
        if !included_ids.contains(edge.source_node_id.as_str())
            || !included_ids.contains(edge.target_node_id.as_str())
        {
            continue;
        }
        let style = match edge.kind {
            EdgeKind::Calls => "solid",
            EdgeKind::Imports => "dashed",
            EdgeKind::Exports => "dotted",
            EdgeKind::Defines => "bold",
            EdgeKind::ContainedIn => "dotted",
        };
        out.push_str(&format!(
            "  \"{}\" -> \"{}\" [style={}, label=\"{}\"];\n",
            escape(&edge.source_node_id),
            escape(&edge.target_node_id),
            style,
            edge.kind.as_str(),
        ));
    }

    out.push_str("}\n");
    out
}

fn escape(s: &str) -> String {
    s.replace('"', "\\\"")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::{build_graph, BuiltFile};
    use crate::model::{FileDescriptor, FunctionDef, Language, ParsedFile};
    use std::path::PathBuf;

    #[test]
    fn test_json_dump_has_node_and_statistics() {
        let path = PathBuf::from("calc.py");
        let desc = FileDescriptor {
            absolute_path: path.clone(),
            path_relative_to_root: path.clone(),
            language: Language::Python,
            size_bytes: 0,
            line_count: 1,
        };
        let mut parsed = ParsedFile::new(path.clone(), Language::Python);
        parsed.functions.push(FunctionDef {
            name: "a".into(),
            file_path: path.clone(),
            start_line: 1,
            end_line: 1,
            parameters: vec![],
            is_exported: true,
            is_async: false,
            decorators: vec![],
        });
        let files = vec![BuiltFile { descriptor: &desc, parsed: &parsed }];
        let graph = build_graph(&files);

        let dump = dump_json(&graph);
        assert!(dump.nodes.contains_key("calc:a"));
        assert_eq!(dump.statistics["total_functions"], 1);
    }

    #[test]
    fn test_dot_export_is_valid_shell() {
        let path = PathBuf::from("calc.py");
        let desc = FileDescriptor {
            absolute_path: path.clone(),
            path_relative_to_root: path.clone(),
            language: Language::Python,
            size_bytes: 0,
            line_count: 1,
        };
        let mut parsed = ParsedFile::new(path.clone(), Language::Python);
        parsed.functions.push(FunctionDef {
            name: "a".into(),
            file_path: path.clone(),
            start_line: 1,
            end_line: 1,
            parameters: vec![],
            is_exported: true,
            is_async: false,
            decorators: vec![],
        });
        let files = vec![BuiltFile { descriptor: &desc, parsed: &parsed }];
        let graph = build_graph(&files);

        let dot = dump_dot(&graph, 100);
        assert!(dot.starts_with("digraph impactgraph {"));
        assert!(dot.trim_end().ends_with('}'));
    }
}
