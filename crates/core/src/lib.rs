//! impactgraph-core
//!
//! Builds a whole-repository symbol dependency graph from source files and
//! answers "what happens if I change this function?" from it: usage
//! reports, module-weighted risk scores, and failure-mode assessments.

pub mod builder;
pub mod config;
pub mod discovery;
pub mod error;
pub mod export;
pub mod graph;
pub mod impact;
pub mod indexer;
pub mod model;
pub mod orchestrator;
pub mod parser;
pub mod query;
pub mod risk;

pub use config::AnalysisConfig;
pub use error::CoreError;
pub use graph::{EdgeKind, Graph, GraphEdge, GraphNode};
pub use impact::{assess_change_impact, CriticalityTier, ImpactReport, RiskLevel};
pub use orchestrator::{load_config, CombinedReport, Orchestrator, Statistics};
pub use query::{find_all_usages, UsageReport};
pub use risk::{failure_modes, RiskAssessment};
