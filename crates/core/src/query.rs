//! Answers "all usage sites for function F" by reading the precomputed
//! usage list built by the indexer.

use crate::indexer::{Indexes, UsageKind, UsageLocation};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UsageReport {
    pub function_name: String,
    pub node_id: String,
    pub definition: Option<UsageLocation>,
    pub exports: Vec<UsageLocation>,
    pub imports: Vec<UsageLocation>,
    pub calls: Vec<UsageLocation>,
    pub tests: Vec<UsageLocation>,
    pub total_count: usize,
    pub distinct_files_affected: Vec<PathBuf>,
}

pub fn find_all_usages(indexes: &Indexes, name: &str) -> Option<UsageReport> {
    let usages = indexes.usages_by_name.get(name)?;

    let node_id = indexes
        .canonical_node_id_by_name
        .get(name)
        .cloned()
        .unwrap_or_default();

    let mut definition = None;
    let mut exports = Vec::new();
    let mut imports = Vec::new();
    let mut calls = Vec::new();
    let mut tests = Vec::new();
    let mut files: HashSet<PathBuf> = HashSet::new();

    for usage in usages {
        files.insert(usage.file_path.clone());
        match usage.usage_kind {
            UsageKind::Definition => definition = Some(usage.clone()),
            UsageKind::Export => exports.push(usage.clone()),
            UsageKind::Import => imports.push(usage.clone()),
            UsageKind::Call => calls.push(usage.clone()),
            UsageKind::Test => tests.push(usage.clone()),
        }
    }

    let total_count = (definition.is_some() as usize) + exports.len() + imports.len() + calls.len() + tests.len();
    let mut distinct_files_affected: Vec<PathBuf> = files.into_iter().collect();
    distinct_files_affected.sort();

    Some(UsageReport {
        function_name: name.to_string(),
        node_id,
        definition,
        exports,
        imports,
        calls,
        tests,
        total_count,
        distinct_files_affected,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::{build_graph, BuiltFile};
    use crate::indexer::build_indexes;
    use crate::model::{CallSite, FileDescriptor, FunctionDef, Language, ParsedFile};
    use std::path::PathBuf;

    #[test]
    fn test_total_count_matches_formula() {
        let path = PathBuf::from("calc.py");
        let desc = FileDescriptor {
            absolute_path: path.clone(),
            path_relative_to_root: path.clone(),
            language: Language::Python,
            size_bytes: 0,
            line_count: 2,
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
        parsed.functions.push(FunctionDef {
            name: "b".into(),
            file_path: path.clone(),
            start_line: 2,
            end_line: 2,
            parameters: vec![],
            is_exported: true,
            is_async: false,
            decorators: vec![],
        });
        parsed.calls.push(CallSite {
            callee_name: "a".into(),
            file_path: path.clone(),
            line: 2,
            enclosing_function_name: Some("b".into()),
        });

        let files = vec![BuiltFile { descriptor: &desc, parsed: &parsed }];
        let graph = build_graph(&files);
        let indexes = build_indexes(&graph);

        let report = find_all_usages(&indexes, "a").unwrap();
        assert_eq!(report.total_count, 2);
        assert_eq!(
            report.total_count,
            (report.definition.is_some() as usize)
                + report.exports.len()
                + report.imports.len()
                + report.calls.len()
                + report.tests.len()
        );
    }

    #[test]
    fn test_ambiguous_name_resolves_to_deterministic_canonical_id() {
        let path_a = PathBuf::from("a.py");
        let desc_a = FileDescriptor {
            absolute_path: path_a.clone(),
            path_relative_to_root: path_a.clone(),
            language: Language::Python,
            size_bytes: 0,
            line_count: 1,
        };
        let mut parsed_a = ParsedFile::new(path_a.clone(), Language::Python);
        parsed_a.functions.push(FunctionDef {
            name: "helper".into(),
            file_path: path_a.clone(),
            start_line: 1,
            end_line: 1,
            parameters: vec![],
            is_exported: true,
            is_async: false,
            decorators: vec![],
        });

        let path_b = PathBuf::from("b.py");
        let desc_b = FileDescriptor {
            absolute_path: path_b.clone(),
            path_relative_to_root: path_b.clone(),
            language: Language::Python,
            size_bytes: 0,
            line_count: 1,
        };
        let mut parsed_b = ParsedFile::new(path_b.clone(), Language::Python);
        parsed_b.functions.push(FunctionDef {
            name: "helper".into(),
            file_path: path_b.clone(),
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
        let indexes = build_indexes(&graph);

        // Same inputs, run twice: the canonical node id must not depend on
        // hash-map iteration order.
        let first = find_all_usages(&indexes, "helper").unwrap().node_id;
        let second = find_all_usages(&indexes, "helper").unwrap().node_id;
        assert_eq!(first, second);
        assert_eq!(first, "a:helper");
    }

    #[test]
    fn test_unknown_name_absent() {
        let indexes = Indexes {
            usages_by_name: Default::default(),
            usages_by_node_id: Default::default(),
            functions_by_file: Default::default(),
            callees_by_function: Default::default(),
            callers_by_function: Default::default(),
            exported_name_to_id: Default::default(),
            canonical_node_id_by_name: Default::default(),
        };
        assert!(find_all_usages(&indexes, "nonexistent").is_none());
    }
}
