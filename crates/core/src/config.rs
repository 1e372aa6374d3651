//! Discovery and scoring configuration.
//!
//! The core ships with sensible defaults compiled in. An embedder (or the
//! CLI, via an optional `impactgraph.toml` at the repository root) can
//! extend the denylist or retune risk weights without forking the crate.

use serde::{Deserialize, Serialize};

/// Directory names skipped outright during discovery.
pub const DEFAULT_DENYLIST: &[&str] = &[
    "node_modules",
    ".git",
    ".github",
    "build",
    "dist",
    ".next",
    "venv",
    ".venv",
    "env",
    "__pycache__",
    ".pytest_cache",
    ".mypy_cache",
    "coverage",
    ".idea",
    ".vscode",
    "vendor",
    "target",
    "out",
];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskWeights {
    pub critical_path: u32,
    pub secondary: u32,
    pub tertiary: u32,
    pub non_critical: u32,
}

impl Default for RiskWeights {
    fn default() -> Self {
        // CriticalPath×10 + Secondary×5 + Tertiary×2 + NonCritical×1.
        Self {
            critical_path: 10,
            secondary: 5,
            tertiary: 2,
            non_critical: 1,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Directory names to exclude in addition to `DEFAULT_DENYLIST`.
    #[serde(default)]
    pub extra_denylist: Vec<String>,
    #[serde(default)]
    pub risk_weights: RiskWeights,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            extra_denylist: Vec::new(),
            risk_weights: RiskWeights::default(),
        }
    }
}

impl AnalysisConfig {
    /// Parse an `impactgraph.toml` document. Absence of the file is not an
    /// error at the call site — callers should skip this entirely when the
    /// file doesn't exist and fall back to `AnalysisConfig::default()`.
    pub fn from_toml_str(s: &str) -> anyhow::Result<Self> {
        let cfg = toml::from_str(s)?;
        Ok(cfg)
    }

    pub fn is_denylisted(&self, dir_name: &str) -> bool {
        DEFAULT_DENYLIST.contains(&dir_name)
            || self.extra_denylist.iter().any(|d| d == dir_name)
    }
}
