//! Emits a fixed-structure failure-mode table parameterized by change
//! type. The output is deterministic and independent of the graph — a
//! reporting stub, not a statistical model; see `DESIGN.md` for why this
//! is intentional rather than a half-finished feature.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FailureMode {
    pub name: String,
    pub tier: String,
    pub probability_percent: f64,
    pub impact_description: String,
    pub recovery_estimate: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskAssessment {
    pub function_name: String,
    pub change_type: String,
    pub failure_modes: Vec<FailureMode>,
    pub mitigations: Vec<String>,
    pub overall_success_rate_percent: f64,
}

pub fn failure_modes(name: &str, change_type: &str) -> RiskAssessment {
    let failure_modes = vec![
        FailureMode {
            name: "Missed-Usage".to_string(),
            tier: "technical".to_string(),
            probability_percent: 12.0,
            impact_description: "A call site outside the analyzed set is not updated.".to_string(),
            recovery_estimate: "30-90 minutes to locate and patch.".to_string(),
        },
        FailureMode {
            name: "Inconsistent-Rename".to_string(),
            tier: "technical".to_string(),
            probability_percent: 8.0,
            impact_description: "Some call sites are updated, others still reference the old name.".to_string(),
            recovery_estimate: "1-2 hours across affected files.".to_string(),
        },
        FailureMode {
            name: "Type-Mismatch".to_string(),
            tier: "technical".to_string(),
            probability_percent: 10.0,
            impact_description: "A changed signature breaks a caller that passes incompatible arguments.".to_string(),
            recovery_estimate: "15-45 minutes once the compiler or test suite flags it.".to_string(),
        },
        FailureMode {
            name: "Test-Failure".to_string(),
            tier: "technical".to_string(),
            probability_percent: 15.0,
            impact_description: "Existing tests exercise the old behavior and fail against the change.".to_string(),
            recovery_estimate: "30 minutes to a few hours, depending on suite size.".to_string(),
        },
        FailureMode {
            name: "Documentation-Sync".to_string(),
            tier: "non-technical".to_string(),
            probability_percent: 25.0,
            impact_description: "Comments, READMEs, or API docs referencing the old behavior go stale.".to_string(),
            recovery_estimate: "Addressed opportunistically; rarely blocks a release.".to_string(),
        },
    ];

    let technical_probability_sum: f64 = failure_modes
        .iter()
        .filter(|m| m.tier == "technical")
        .map(|m| m.probability_percent)
        .sum();

    RiskAssessment {
        function_name: name.to_string(),
        change_type: change_type.to_string(),
        failure_modes,
        mitigations: vec![
            "Run the full usage report before renaming or changing a signature.".to_string(),
            "Update all call sites in the same commit as the definition change.".to_string(),
            "Add or update a regression test that exercises the changed behavior.".to_string(),
            "Review callers outside the analyzed languages manually (config, docs, scripts).".to_string(),
            "Stage the change behind a review pass focused on the CriticalPath modules it touches.".to_string(),
        ],
        overall_success_rate_percent: 100.0 - technical_probability_sum,
    }
}
