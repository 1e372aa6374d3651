//! Converts parsed files into a typed node/edge graph.
//!
//! Six ordered phases over the whole file list, each completing before the
//! next starts: file nodes, function nodes (+ `Defines` edges), `Calls`
//! edges, `Imports` edges, `Exports` edges, then a reverse-relation
//! backfill pass over every edge once.

use crate::graph::{EdgeKind, FileNode, FunctionNode, Graph, GraphNode};
use crate::model::{FileDescriptor, ParsedFile};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// One discovered-and-parsed file, paired so the builder has both the
/// file-level metadata (for `FileNode.end_line`) and the extracted records.
pub struct BuiltFile<'a> {
    pub descriptor: &'a FileDescriptor,
    pub parsed: &'a ParsedFile,
}

pub fn build_graph(files: &[BuiltFile]) -> Graph {
    let mut graph = Graph::new();

    let mut file_node_id_by_path: HashMap<PathBuf, String> = HashMap::new();
    let mut function_name_counts: HashMap<String, usize> = HashMap::new();
    let mut function_name_first: HashMap<String, String> = HashMap::new();

    // Phase 1: file nodes.
    for f in files {
        let id = file_node_id(&f.parsed.file_path);
        file_node_id_by_path.insert(f.parsed.file_path.clone(), id.clone());
        let end_line = f.descriptor.line_count.max(1);
        graph.add_node(GraphNode::File(FileNode {
            id,
            display_name: basename(&f.parsed.file_path),
            file_path: f.parsed.file_path.clone(),
            start_line: 1,
            end_line,
        }));
    }

    // Phase 2: function nodes + Defines edges.
    for f in files {
        let stem = file_stem(&f.parsed.file_path);
        let file_id = file_node_id_by_path
            .get(&f.parsed.file_path)
            .cloned()
            .unwrap_or_else(|| file_node_id(&f.parsed.file_path));

        for func in &f.parsed.functions {
            let id = function_node_id(&stem, &func.name);

            let count = function_name_counts.entry(func.name.clone()).or_insert(0);
            *count += 1;
            function_name_first
                .entry(func.name.clone())
                .or_insert_with(|| id.clone());

            let added = graph.add_node(GraphNode::Function(FunctionNode {
                id: id.clone(),
                display_name: func.name.clone(),
                file_path: func.file_path.clone(),
                start_line: func.start_line,
                end_line: func.end_line,
                parameters: func.parameters.clone(),
                is_exported: func.is_exported,
                is_async: func.is_async,
                decorators: func.decorators.clone(),
                outgoing_calls: Vec::new(),
                incoming_calls: Vec::new(),
                imported_from: None,
                files_that_import_me: Vec::new(),
            }));

            if let Some(file_idx) = graph.find_node_by_id(&file_id) {
                if let Some(func_idx) = added.or_else(|| graph.find_node_by_id(&id)) {
                    graph.add_edge(
                        file_idx,
                        func_idx,
                        EdgeKind::Defines,
                        func.file_path.clone(),
                        func.start_line,
                        None,
                    );
                }
            }
        }
    }

    // Resolution policy shared by call and import resolution: an exact
    // stem:name match wins outright; otherwise the bare name must be
    // unique across the whole repository.
    let resolve = |callee: &str, stem: &str, function_name_counts: &HashMap<String, usize>, function_name_first: &HashMap<String, String>, graph: &Graph| -> Option<String> {
        let local_id = function_node_id(stem, callee);
        if graph.find_node_by_id(&local_id).is_some() {
            return Some(local_id);
        }
        if function_name_counts.get(callee).copied().unwrap_or(0) == 1 {
            return function_name_first.get(callee).cloned();
        }
        None
    };

    // Phase 3: Calls edges.
    for f in files {
        let stem = file_stem(&f.parsed.file_path);
        let file_id = file_node_id_by_path
            .get(&f.parsed.file_path)
            .cloned()
            .unwrap_or_else(|| file_node_id(&f.parsed.file_path));

        for call in &f.parsed.calls {
            let source_id = match &call.enclosing_function_name {
                Some(name) => function_node_id(&stem, name),
                None => file_id.clone(),
            };
            let Some(source_idx) = graph.find_node_by_id(&source_id) else {
                continue;
            };
            let Some(target_id) = resolve(&call.callee_name, &stem, &function_name_counts, &function_name_first, &graph) else {
                continue;
            };
            let Some(target_idx) = graph.find_node_by_id(&target_id) else {
                continue;
            };
            graph.add_edge(
                source_idx,
                target_idx,
                EdgeKind::Calls,
                call.file_path.clone(),
                call.line,
                Some(call.callee_name.clone()),
            );
        }
    }

    // Phase 4: Imports edges.
    for f in files {
        let stem = file_stem(&f.parsed.file_path);
        let file_id = file_node_id_by_path
            .get(&f.parsed.file_path)
            .cloned()
            .unwrap_or_else(|| file_node_id(&f.parsed.file_path));
        let Some(file_idx) = graph.find_node_by_id(&file_id) else {
            continue;
        };

        for import in &f.parsed.imports {
            for name in &import.imported_names {
                let Some(target_id) = resolve(name, &stem, &function_name_counts, &function_name_first, &graph) else {
                    continue;
                };
                let Some(target_idx) = graph.find_node_by_id(&target_id) else {
                    continue;
                };
                graph.add_edge(
                    file_idx,
                    target_idx,
                    EdgeKind::Imports,
                    import.file_path.clone(),
                    import.line,
                    Some(import.source_module_string.clone()),
                );
            }
        }
    }

    // Phase 5: Exports edges — same-file match only.
    for f in files {
        let stem = file_stem(&f.parsed.file_path);
        let file_id = file_node_id_by_path
            .get(&f.parsed.file_path)
            .cloned()
            .unwrap_or_else(|| file_node_id(&f.parsed.file_path));
        let Some(file_idx) = graph.find_node_by_id(&file_id) else {
            continue;
        };

        for export in &f.parsed.exports {
            for name in &export.exported_names {
                let target_id = function_node_id(&stem, name);
                let Some(target_idx) = graph.find_node_by_id(&target_id) else {
                    continue;
                };
                graph.add_edge(
                    file_idx,
                    target_idx,
                    EdgeKind::Exports,
                    export.file_path.clone(),
                    export.line,
                    None,
                );
            }
        }
    }

    // Phase 6: reverse-relation backfill — a single pass over every edge.
    let edges: Vec<_> = graph
        .edge_endpoints()
        .map(|(src, tgt, e)| (src, tgt, e.kind, e.source_node_id.clone(), e.occurrence_file.clone()))
        .collect();

    for (src_idx, tgt_idx, kind, source_node_id, occurrence_file) in edges {
        match kind {
            EdgeKind::Calls => {
                if let Some(GraphNode::Function(f)) = graph.node_weight_mut(tgt_idx) {
                    f.incoming_calls.push(source_node_id.clone());
                }
                let target_id = graph.node_weight(tgt_idx).map(|n| n.id().to_string());
                if let Some(target_id) = target_id {
                    if let Some(GraphNode::Function(f)) = graph.node_weight_mut(src_idx) {
                        f.outgoing_calls.push(target_id);
                    }
                }
            }
            EdgeKind::Imports => {
                if let Some(GraphNode::Function(f)) = graph.node_weight_mut(tgt_idx) {
                    let path_str = occurrence_file.to_string_lossy().to_string();
                    if !f.files_that_import_me.contains(&path_str) {
                        f.files_that_import_me.push(path_str);
                    }
                }
            }
            _ => {}
        }
    }

    // A second small pass sets `imported_from` from edge context, since the
    // context string lives on the edge, not in the loop above's tuple.
    let import_contexts: Vec<_> = graph
        .edges()
        .filter(|e| e.kind == EdgeKind::Imports)
        .map(|e| (e.target_node_id.clone(), e.context.clone()))
        .collect();
    for (target_id, context) in import_contexts {
        if let Some(idx) = graph.find_node_by_id(&target_id) {
            if let Some(GraphNode::Function(f)) = graph.node_weight_mut(idx) {
                if f.imported_from.is_none() {
                    f.imported_from = context;
                }
            }
        }
    }

    graph
}

fn basename(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.to_string_lossy().to_string())
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| basename(path))
}

fn file_node_id(path: &Path) -> String {
    format!("file:{}", basename(path))
}

fn function_node_id(stem: &str, name: &str) -> String {
    format!("{}:{}", stem, name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CallSite, FunctionDef, Language};

    fn descriptor(path: &str) -> FileDescriptor {
        FileDescriptor {
            absolute_path: PathBuf::from(path),
            path_relative_to_root: PathBuf::from(path),
            language: Language::Python,
            size_bytes: 0,
            line_count: 2,
        }
    }

    #[test]
    fn test_single_file_self_call() {
        let desc = descriptor("calc.py");
        let mut parsed = ParsedFile::new(desc.absolute_path.clone(), Language::Python);
        parsed.functions.push(FunctionDef {
            name: "a".to_string(),
            file_path: desc.absolute_path.clone(),
            start_line: 1,
            end_line: 1,
            parameters: vec![],
            is_exported: true,
            is_async: false,
            decorators: vec![],
        });
        parsed.functions.push(FunctionDef {
            name: "b".to_string(),
            file_path: desc.absolute_path.clone(),
            start_line: 2,
            end_line: 2,
            parameters: vec![],
            is_exported: true,
            is_async: false,
            decorators: vec![],
        });
        parsed.calls.push(CallSite {
            callee_name: "a".to_string(),
            file_path: desc.absolute_path.clone(),
            line: 2,
            enclosing_function_name: Some("b".to_string()),
        });

        let files = vec![BuiltFile {
            descriptor: &desc,
            parsed: &parsed,
        }];
        let graph = build_graph(&files);

        assert_eq!(graph.stats.total_functions, 2);
        assert_eq!(graph.stats.total_calls, 1);
        let b_idx = graph.find_node_by_id("calc:b").unwrap();
        let a_idx = graph.find_node_by_id("calc:a").unwrap();
        assert!(graph.node_weight(a_idx).unwrap().as_function().unwrap().incoming_calls.contains(&"calc:b".to_string()));
        assert!(graph.node_weight(b_idx).unwrap().as_function().unwrap().outgoing_calls.contains(&"calc:a".to_string()));
    }

    #[test]
    fn test_duplicate_function_name_first_wins() {
        let desc_a = descriptor("a.py");
        let mut parsed_a = ParsedFile::new(desc_a.absolute_path.clone(), Language::Python);
        parsed_a.functions.push(FunctionDef {
            name: "helper".to_string(),
            file_path: desc_a.absolute_path.clone(),
            start_line: 1,
            end_line: 1,
            parameters: vec![],
            is_exported: true,
            is_async: false,
            decorators: vec![],
        });

        let desc_b = descriptor("b.py");
        let mut parsed_b = ParsedFile::new(desc_b.absolute_path.clone(), Language::Python);
        parsed_b.functions.push(FunctionDef {
            name: "helper".to_string(),
            file_path: desc_b.absolute_path.clone(),
            start_line: 1,
            end_line: 1,
            parameters: vec![],
            is_exported: true,
            is_async: false,
            decorators: vec![],
        });

        let files = vec![
            BuiltFile { descriptor: &desc_a, parsed: &parsed_a },
            BuiltFile { descriptor: &desc_b, parsed: &parsed_b },
        ];
        let graph = build_graph(&files);
        // distinct stems -> distinct ids, no collision here.
        assert_eq!(graph.stats.id_collisions, 0);
        assert!(graph.find_node_by_id("a:helper").is_some());
        assert!(graph.find_node_by_id("b:helper").is_some());
    }
}
