//! Property tests over synthetic `ParsedFile` records (no tree-sitter
//! parsing here — these check the builder/indexer/impact invariants hold
//! across the input space, not the language adapters).

use impactgraph_core::builder::{build_graph, BuiltFile};
use impactgraph_core::config::RiskWeights;
use impactgraph_core::graph::EdgeKind;
use impactgraph_core::impact::assess_change_impact;
use impactgraph_core::indexer::build_indexes;
use impactgraph_core::model::{CallSite, FileDescriptor, FunctionDef, Language, ParsedFile};
use impactgraph_core::query::find_all_usages;
use proptest::prelude::*;
use proptest::strategy::ValueTree;
use std::path::PathBuf;

fn make_file(stem: &str, fn_names: &[String], calls: &[(usize, usize)]) -> (FileDescriptor, ParsedFile) {
    let path = PathBuf::from(format!("{}.py", stem));
    let desc = FileDescriptor {
        absolute_path: path.clone(),
        path_relative_to_root: path.clone(),
        language: Language::Python,
        size_bytes: 0,
        line_count: fn_names.len().max(1) as usize,
    };
    let mut parsed = ParsedFile::new(path.clone(), Language::Python);
    for (i, name) in fn_names.iter().enumerate() {
        parsed.functions.push(FunctionDef {
            name: name.clone(),
            file_path: path.clone(),
            start_line: i + 1,
            end_line: i + 1,
            parameters: vec![],
            is_exported: true,
            is_async: false,
            decorators: vec![],
        });
    }
    for (caller_idx, callee_idx) in calls {
        if *caller_idx < fn_names.len() && *callee_idx < fn_names.len() {
            parsed.calls.push(CallSite {
                callee_name: fn_names[*callee_idx].clone(),
                file_path: path.clone(),
                line: caller_idx + 1,
                enclosing_function_name: Some(fn_names[*caller_idx].clone()),
            });
        }
    }
    (desc, parsed)
}

fn distinct_name_strategy(n: usize) -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec("[a-z]{3,6}", n).prop_map(|mut names| {
        names.dedup();
        if names.is_empty() {
            names.push("f".to_string());
        }
        names
    })
}

proptest! {
    /// Every `Defines` edge's occurrence file path matches the function
    /// node's own `file_path` — the builder never attributes a definition
    /// to the wrong file.
    #[test]
    fn defines_edges_keep_consistent_file_path(n in 1usize..6) {
        let names = names_for(n);
        let (desc, parsed) = make_file("calc", &names, &[]);
        let files = vec![BuiltFile { descriptor: &desc, parsed: &parsed }];
        let graph = build_graph(&files);

        for edge in graph.edges() {
            if edge.kind == EdgeKind::Defines {
                let target = graph.node_by_id(&edge.target_node_id).unwrap();
                prop_assert_eq!(target.file_path(), &edge.occurrence_file);
            }
        }
    }

    /// A `Calls` edge `caller -> callee` is always mirrored by `caller` in
    /// `callee.incoming_calls` and `callee` in `caller.outgoing_calls`.
    #[test]
    fn calls_edges_are_mirrored_in_adjacency(n in 2usize..6, seed in 0usize..20) {
        let names = names_for(n);
        let calls: Vec<(usize, usize)> = (0..n - 1)
            .map(|i| (i, (i + 1 + seed) % n))
            .filter(|(a, b)| a != b)
            .collect();
        let (desc, parsed) = make_file("calc", &names, &calls);
        let files = vec![BuiltFile { descriptor: &desc, parsed: &parsed }];
        let graph = build_graph(&files);

        for edge in graph.edges() {
            if edge.kind == EdgeKind::Calls {
                let caller = graph.node_by_id(&edge.source_node_id).unwrap().as_function().unwrap();
                let callee = graph.node_by_id(&edge.target_node_id).unwrap().as_function().unwrap();
                prop_assert!(callee.incoming_calls.contains(&caller.id));
                prop_assert!(caller.outgoing_calls.contains(&callee.id));
            }
        }
    }

    /// `total_count` always equals the sum of the five bucket lengths,
    /// regardless of how many functions or calls are fed in.
    #[test]
    fn usage_total_count_matches_formula(n in 1usize..6, seed in 0usize..20) {
        let names = names_for(n);
        let calls: Vec<(usize, usize)> = (0..n)
            .map(|i| (i, (i + 1 + seed) % n))
            .collect();
        let (desc, parsed) = make_file("calc", &names, &calls);
        let files = vec![BuiltFile { descriptor: &desc, parsed: &parsed }];
        let graph = build_graph(&files);
        let indexes = build_indexes(&graph);

        for name in &names {
            if let Some(report) = find_all_usages(&indexes, name) {
                let expected = (report.definition.is_some() as usize)
                    + report.exports.len()
                    + report.imports.len()
                    + report.calls.len()
                    + report.tests.len();
                prop_assert_eq!(report.total_count, expected);
            }
        }
    }

    /// The impact report's risk score is exactly the weighted sum over
    /// tier counts, for arbitrary (but fixed) weights.
    #[test]
    fn risk_score_matches_weighted_sum(n in 1usize..6, seed in 0usize..20,
                                        cp in 1u32..20, sec in 1u32..20, ter in 1u32..20, non in 1u32..20) {
        let names = names_for(n);
        let calls: Vec<(usize, usize)> = (0..n)
            .map(|i| (i, (i + 1 + seed) % n))
            .collect();
        let (desc, parsed) = make_file("calc", &names, &calls);
        let files = vec![BuiltFile { descriptor: &desc, parsed: &parsed }];
        let graph = build_graph(&files);
        let indexes = build_indexes(&graph);
        let weights = RiskWeights { critical_path: cp, secondary: sec, tertiary: ter, non_critical: non };

        for name in &names {
            if let Some(report) = assess_change_impact(&indexes, &weights, name, "_") {
                let expected: u64 = report
                    .modules
                    .iter()
                    .map(|m| {
                        let count = (m.definition_count + m.export_count + m.import_count + m.call_count + m.test_count) as u64;
                        let weight = match m.tier {
                            impactgraph_core::CriticalityTier::CriticalPath => weights.critical_path,
                            impactgraph_core::CriticalityTier::Secondary => weights.secondary,
                            impactgraph_core::CriticalityTier::Tertiary => weights.tertiary,
                            impactgraph_core::CriticalityTier::NonCritical => weights.non_critical,
                        } as u64;
                        count * weight
                    })
                    .sum();
                prop_assert_eq!(report.risk_score, expected);
            }
        }
    }
}

fn names_for(n: usize) -> Vec<String> {
    (0..n).map(|i| format!("fn{}", i)).collect()
}

// Kept separate from the proptest! block above so `distinct_name_strategy`
// has at least one caller and doesn't trip an unused-function lint.
#[test]
fn distinct_name_strategy_produces_nonempty_vecs() {
    let mut runner = proptest::test_runner::TestRunner::default();
    let strategy = distinct_name_strategy(4);
    let value = strategy.new_tree(&mut runner).unwrap().current();
    assert!(!value.is_empty());
}
