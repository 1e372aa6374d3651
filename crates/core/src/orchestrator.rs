//! Thin façade that runs discovery → parsing → building → indexing once
//! per repository and dispatches queries against the memoized result.
//! Modeled as an explicit two-state machine (`Empty`, `Built`) rather than
//! a mutable bag of optional fields, so a query against an unbuilt
//! instance is a type-level impossibility rather than a runtime check
//! scattered across every method.

use crate::builder::{build_graph, BuiltFile};
use crate::config::AnalysisConfig;
use crate::discovery::discover_files;
use crate::error::CoreError;
use crate::export::{dump_dot, dump_json, GraphDump};
use crate::graph::Graph;
use crate::impact::{assess_change_impact, ImpactReport};
use crate::indexer::{build_indexes, Indexes};
use crate::parser::parse_file;
use crate::query::{find_all_usages, UsageReport};
use crate::risk::{failure_modes as compute_failure_modes, RiskAssessment};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Statistics {
    pub total_files: usize,
    pub total_functions: usize,
    pub total_calls: usize,
    pub total_imports: usize,
    pub id_collisions: usize,
    pub parse_errors: usize,
    pub build_log: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CombinedReport {
    pub usages: Option<UsageReport>,
    pub impact: Option<ImpactReport>,
    pub risk: RiskAssessment,
}

enum State {
    Empty,
    Built { graph: Graph, indexes: Indexes, statistics: Statistics },
}

pub struct Orchestrator {
    config: AnalysisConfig,
    state: State,
}

impl Orchestrator {
    pub fn new(config: AnalysisConfig) -> Self {
        Self { config, state: State::Empty }
    }

    /// Run discovery → parsing → building → indexing and memoize the
    /// result. If `output_path` is set, the resulting graph is also
    /// written out as a JSON dump.
    pub fn build_graph(
        &mut self,
        repo_path: &Path,
        output_path: Option<&Path>,
    ) -> Result<Statistics, CoreError> {
        let span = tracing::info_span!("build_graph", repo = %repo_path.display());
        let _enter = span.enter();

        let descriptors = discover_files(repo_path, &self.config)?;
        debug!(file_count = descriptors.len(), "discovery complete");

        let parsed: Vec<_> = descriptors.iter().map(parse_file).collect();
        debug!("parsing complete");

        let mut parse_errors = 0;
        let mut build_log = Vec::new();
        for pf in &parsed {
            if !pf.errors.is_empty() {
                parse_errors += pf.errors.len();
                for err in &pf.errors {
                    warn!(file = %pf.file_path.display(), error = %err, "parse issue");
                }
            }
        }

        let built_files: Vec<BuiltFile> = descriptors
            .iter()
            .zip(parsed.iter())
            .map(|(descriptor, parsed)| BuiltFile { descriptor, parsed })
            .collect();

        let graph = build_graph(&built_files);
        debug!(
            functions = graph.stats.total_functions,
            files = graph.stats.total_files,
            "graph construction complete"
        );
        if graph.stats.id_collisions > 0 {
            let msg = format!("{} function id collisions resolved first-wins", graph.stats.id_collisions);
            warn!("{}", msg);
            build_log.push(msg);
        }

        let indexes = build_indexes(&graph);
        debug!("indexing complete");

        let statistics = Statistics {
            total_files: graph.stats.total_files,
            total_functions: graph.stats.total_functions,
            total_calls: graph.stats.total_calls,
            total_imports: graph.stats.total_imports,
            id_collisions: graph.stats.id_collisions,
            parse_errors,
            build_log,
        };

        if let Some(path) = output_path {
            if let Err(err) = write_json_dump(&graph, path) {
                warn!(path = %path.display(), error = %err, "failed to write graph dump");
            }
        }

        info!(
            functions = statistics.total_functions,
            files = statistics.total_files,
            "graph build complete"
        );

        self.state = State::Built {
            graph,
            indexes,
            statistics: statistics.clone(),
        };

        Ok(statistics)
    }

    pub fn find_usages(&self, name: &str) -> Result<Option<UsageReport>, CoreError> {
        let State::Built { indexes, .. } = &self.state else {
            return Err(CoreError::NotBuilt);
        };
        Ok(find_all_usages(indexes, name))
    }

    pub fn assess_change_impact(
        &self,
        name: &str,
        description: &str,
    ) -> Result<Option<ImpactReport>, CoreError> {
        let State::Built { indexes, .. } = &self.state else {
            return Err(CoreError::NotBuilt);
        };
        Ok(assess_change_impact(indexes, &self.config.risk_weights, name, description))
    }

    pub fn failure_modes(&self, name: &str, change_type: &str) -> Result<RiskAssessment, CoreError> {
        match &self.state {
            State::Built { .. } => Ok(compute_failure_modes(name, change_type)),
            State::Empty => Err(CoreError::NotBuilt),
        }
    }

    pub fn get_complete_analysis(
        &self,
        name: &str,
        description: &str,
    ) -> Result<CombinedReport, CoreError> {
        let usages = self.find_usages(name)?;
        let impact = self.assess_change_impact(name, description)?;
        let risk = self.failure_modes(name, "general")?;
        Ok(CombinedReport { usages, impact, risk })
    }

    pub fn statistics(&self) -> Result<Statistics, CoreError> {
        match &self.state {
            State::Built { statistics, .. } => Ok(statistics.clone()),
            State::Empty => Err(CoreError::NotBuilt),
        }
    }

    pub fn graph_dump(&self) -> Result<GraphDump, CoreError> {
        let State::Built { graph, .. } = &self.state else {
            return Err(CoreError::NotBuilt);
        };
        Ok(dump_json(graph))
    }

    pub fn dot_dump(&self, max_nodes: usize) -> Result<String, CoreError> {
        let State::Built { graph, .. } = &self.state else {
            return Err(CoreError::NotBuilt);
        };
        Ok(dump_dot(graph, max_nodes))
    }
}

fn write_json_dump(graph: &Graph, path: &Path) -> anyhow::Result<()> {
    let dump = dump_json(graph);
    let text = serde_json::to_string_pretty(&dump)?;
    std::fs::write(path, text)?;
    Ok(())
}

/// Load `impactgraph.toml` from the repository root if present, falling
/// back to defaults silently otherwise.
pub fn load_config(repo_path: &Path) -> AnalysisConfig {
    let config_path: PathBuf = repo_path.join("impactgraph.toml");
    match std::fs::read_to_string(&config_path) {
        Ok(text) => match AnalysisConfig::from_toml_str(&text) {
            Ok(cfg) => cfg,
            Err(err) => {
                warn!(path = %config_path.display(), error = %err, "failed to parse config, using defaults");
                AnalysisConfig::default()
            }
        },
        Err(_) => AnalysisConfig::default(),
    }
}
