//! Groups usages by containing file, assigns a criticality tier per file
//! via path substring matching, and computes a weighted risk score.

use crate::config::RiskWeights;
use crate::indexer::{Indexes, UsageKind};
use crate::query::{find_all_usages, UsageReport};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CriticalityTier {
    CriticalPath,
    Secondary,
    Tertiary,
    NonCritical,
}

impl CriticalityTier {
    fn priority(&self) -> u8 {
        match self {
            CriticalityTier::CriticalPath => 0,
            CriticalityTier::Secondary => 1,
            CriticalityTier::Tertiary => 2,
            CriticalityTier::NonCritical => 3,
        }
    }
}

const NON_CRITICAL_MARKERS: &[&str] = &["test", "spec", "mock", "fixture"];
const CRITICAL_PATH_MARKERS: &[&str] = &["checkout", "payment", "auth", "billing"];
const SECONDARY_MARKERS: &[&str] = &["invoice", "report", "email", "notification"];
const TERTIARY_MARKERS: &[&str] = &["util", "helper", "validate", "format"];

/// NonCritical is probed first so a file like `test_checkout.py` classifies
/// as NonCritical rather than CriticalPath.
pub fn classify_tier(path: &PathBuf) -> CriticalityTier {
    let lower = path.to_string_lossy().to_lowercase();
    if NON_CRITICAL_MARKERS.iter().any(|m| lower.contains(m)) {
        CriticalityTier::NonCritical
    } else if CRITICAL_PATH_MARKERS.iter().any(|m| lower.contains(m)) {
        CriticalityTier::CriticalPath
    } else if SECONDARY_MARKERS.iter().any(|m| lower.contains(m)) {
        CriticalityTier::Secondary
    } else if TERTIARY_MARKERS.iter().any(|m| lower.contains(m)) {
        CriticalityTier::Tertiary
    } else {
        CriticalityTier::Secondary
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    Critical,
}

pub fn risk_level_for_score(score: u64) -> RiskLevel {
    match score {
        0..=20 => RiskLevel::Low,
        21..=50 => RiskLevel::Medium,
        51..=100 => RiskLevel::High,
        _ => RiskLevel::Critical,
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModuleUsage {
    pub module_display_name: String,
    pub file_path: PathBuf,
    pub tier: CriticalityTier,
    pub definition_count: usize,
    pub export_count: usize,
    pub import_count: usize,
    pub call_count: usize,
    pub test_count: usize,
    pub risk_summary: String,
    pub impact_summary: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BusinessImpact {
    pub revenue_per_hour_range: String,
    pub affected_users: String,
    pub recovery_time_range: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImpactReport {
    pub function_name: String,
    pub modules: Vec<ModuleUsage>,
    pub risk_score: u64,
    pub risk_level: RiskLevel,
    pub business_impact: BusinessImpact,
}

pub fn assess_change_impact(
    indexes: &Indexes,
    weights: &RiskWeights,
    name: &str,
    _description: &str,
) -> Option<ImpactReport> {
    let report: UsageReport = find_all_usages(indexes, name)?;

    let mut buckets: HashMap<PathBuf, (usize, usize, usize, usize, usize)> = HashMap::new();
    let mut bump = |path: &PathBuf, kind: UsageKind| {
        let entry = buckets.entry(path.clone()).or_insert((0, 0, 0, 0, 0));
        match kind {
            UsageKind::Definition => entry.0 += 1,
            UsageKind::Export => entry.1 += 1,
            UsageKind::Import => entry.2 += 1,
            UsageKind::Call => entry.3 += 1,
            UsageKind::Test => entry.4 += 1,
        }
    };

    if let Some(def) = &report.definition {
        bump(&def.file_path, UsageKind::Definition);
    }
    for u in &report.exports {
        bump(&u.file_path, UsageKind::Export);
    }
    for u in &report.imports {
        bump(&u.file_path, UsageKind::Import);
    }
    for u in &report.calls {
        bump(&u.file_path, UsageKind::Call);
    }
    for u in &report.tests {
        bump(&u.file_path, UsageKind::Test);
    }

    let mut modules: Vec<ModuleUsage> = buckets
        .into_iter()
        .map(|(path, (defs, exports, imports, calls, tests))| {
            let tier = classify_tier(&path);
            let module_display_name = format!(
                "{} MODULE",
                path.file_stem()
                    .map(|s| s.to_string_lossy().to_uppercase())
                    .unwrap_or_default()
            );
            let (risk_summary, impact_summary) = prose_for_tier(tier);
            ModuleUsage {
                module_display_name,
                file_path: path,
                tier,
                definition_count: defs,
                export_count: exports,
                import_count: imports,
                call_count: calls,
                test_count: tests,
                risk_summary,
                impact_summary,
            }
        })
        .collect();

    modules.sort_by(|a, b| {
        a.tier
            .priority()
            .cmp(&b.tier.priority())
            .then_with(|| a.file_path.cmp(&b.file_path))
    });

    let mut tier_counts: HashMap<CriticalityTier, u64> = HashMap::new();
    for m in &modules {
        let total = (m.definition_count + m.export_count + m.import_count + m.call_count + m.test_count) as u64;
        *tier_counts.entry(m.tier).or_insert(0) += total;
    }

    let risk_score = tier_counts.get(&CriticalityTier::CriticalPath).copied().unwrap_or(0) * weights.critical_path as u64
        + tier_counts.get(&CriticalityTier::Secondary).copied().unwrap_or(0) * weights.secondary as u64
        + tier_counts.get(&CriticalityTier::Tertiary).copied().unwrap_or(0) * weights.tertiary as u64
        + tier_counts.get(&CriticalityTier::NonCritical).copied().unwrap_or(0) * weights.non_critical as u64;

    let risk_level = risk_level_for_score(risk_score);
    let has_critical_path = modules.iter().any(|m| m.tier == CriticalityTier::CriticalPath);
    let business_impact = business_impact_for(has_critical_path, risk_level);

    Some(ImpactReport {
        function_name: name.to_string(),
        modules,
        risk_score,
        risk_level,
        business_impact,
    })
}

fn prose_for_tier(tier: CriticalityTier) -> (String, String) {
    match tier {
        CriticalityTier::CriticalPath => (
            "High risk: this module sits on a revenue-critical path.".to_string(),
            "A regression here can block purchases or account access outright.".to_string(),
        ),
        CriticalityTier::Secondary => (
            "Moderate risk: user-facing but not transaction-blocking.".to_string(),
            "A regression degrades a secondary workflow without halting revenue.".to_string(),
        ),
        CriticalityTier::Tertiary => (
            "Low risk: internal utility code.".to_string(),
            "A regression is likely caught by callers before reaching users.".to_string(),
        ),
        CriticalityTier::NonCritical => (
            "Minimal risk: test or fixture code.".to_string(),
            "A regression affects test reliability, not production behavior.".to_string(),
        ),
    }
}

fn business_impact_for(has_critical_path: bool, level: RiskLevel) -> BusinessImpact {
    match (has_critical_path, level) {
        (true, RiskLevel::Critical) => BusinessImpact {
            revenue_per_hour_range: "$50,000-$250,000".to_string(),
            affected_users: "all active customers on the critical path".to_string(),
            recovery_time_range: "4-12 hours".to_string(),
        },
        (true, RiskLevel::High) => BusinessImpact {
            revenue_per_hour_range: "$10,000-$50,000".to_string(),
            affected_users: "a majority of customers transacting during the incident window".to_string(),
            recovery_time_range: "2-6 hours".to_string(),
        },
        (true, _) => BusinessImpact {
            revenue_per_hour_range: "$1,000-$10,000".to_string(),
            affected_users: "a subset of customers on the affected path".to_string(),
            recovery_time_range: "1-3 hours".to_string(),
        },
        (false, RiskLevel::Critical) | (false, RiskLevel::High) => BusinessImpact {
            revenue_per_hour_range: "$500-$5,000".to_string(),
            affected_users: "users of the affected secondary workflow".to_string(),
            recovery_time_range: "1-4 hours".to_string(),
        },
        (false, _) => BusinessImpact {
            revenue_per_hour_range: "negligible".to_string(),
            affected_users: "internal developers only".to_string(),
            recovery_time_range: "under 1 hour".to_string(),
        },
    }
}
