//! Pipeline stage descriptors and per-stage outcomes
//!
//! The pipeline is a closed, ordered set of stages. An unknown check can
//! not exist at runtime: stages are enum variants, and the execution plan
//! is an ordered list of (stage, enabled) pairs derived from settings.

use serde_json::json;

use crate::settings::ChecksConfig;

/// The five validation stages, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckKind {
    /// Message shape: exact length and required prefix
    Format,
    /// Live challenge lookup by token; the replay guard
    Token,
    /// Sender country prefix in the allow-list
    Country,
    /// Rolling per-mobile rate counter
    Count,
    /// Sender not in the blacklist set
    Blacklist,
}

impl CheckKind {
    /// All stages in pipeline order
    pub const ORDERED: [CheckKind; 5] = [
        CheckKind::Format,
        CheckKind::Token,
        CheckKind::Country,
        CheckKind::Count,
        CheckKind::Blacklist,
    ];

    /// Stable name used in audit details
    pub fn as_str(&self) -> &'static str {
        match self {
            CheckKind::Format => "format_check",
            CheckKind::Token => "token_check",
            CheckKind::Country => "country_check",
            CheckKind::Count => "count_check",
            CheckKind::Blacklist => "blacklist_check",
        }
    }
}

impl std::fmt::Display for CheckKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of one stage for one SMS event.
///
/// `Skipped` means the stage was disabled by configuration and never ran;
/// `NotEvaluated` means an earlier stage failed first. The two are kept
/// distinct in every report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckStatus {
    Passed,
    Failed,
    Skipped,
    NotEvaluated,
}

impl CheckStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CheckStatus::Passed => "passed",
            CheckStatus::Failed => "failed",
            CheckStatus::Skipped => "skipped",
            CheckStatus::NotEvaluated => "not_evaluated",
        }
    }
}

/// One stage's result
#[derive(Debug, Clone, PartialEq)]
pub struct StageOutcome {
    pub kind: CheckKind,
    pub status: CheckStatus,
    /// Failure detail for rejected stages
    pub detail: Option<String>,
}

impl StageOutcome {
    pub fn new(kind: CheckKind, status: CheckStatus) -> Self {
        Self {
            kind,
            status,
            detail: None,
        }
    }

    pub fn failed(kind: CheckKind, detail: impl Into<String>) -> Self {
        Self {
            kind,
            status: CheckStatus::Failed,
            detail: Some(detail.into()),
        }
    }
}

/// Full result of running the pipeline over one SMS event
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineReport {
    /// Per-stage outcomes in pipeline order
    pub stages: Vec<StageOutcome>,
    /// Whether every enabled stage passed
    pub accepted: bool,
    /// The stage that rejected the event, if any
    pub failed_stage: Option<CheckKind>,
    /// Token extracted from the message, when one was found
    pub token: Option<String>,
}

impl PipelineReport {
    /// Outcome for one stage, if it is part of the report
    pub fn status_of(&self, kind: CheckKind) -> Option<CheckStatus> {
        self.stages
            .iter()
            .find(|stage| stage.kind == kind)
            .map(|stage| stage.status)
    }

    /// Stage vector as audit-ready JSON
    pub fn stages_json(&self) -> serde_json::Value {
        let mut map = serde_json::Map::new();
        for stage in &self.stages {
            map.insert(
                stage.kind.as_str().to_string(),
                json!(stage.status.as_str()),
            );
        }
        serde_json::Value::Object(map)
    }
}

/// Ordered execution plan derived from the settings snapshot
pub fn stage_plan(checks: &ChecksConfig) -> Vec<(CheckKind, bool)> {
    CheckKind::ORDERED
        .iter()
        .map(|kind| {
            let enabled = match kind {
                CheckKind::Format => checks.format_check_enabled,
                CheckKind::Token => checks.token_check_enabled,
                CheckKind::Country => checks.country_check_enabled,
                CheckKind::Count => checks.count_check_enabled,
                CheckKind::Blacklist => checks.blacklist_check_enabled,
            };
            (*kind, enabled)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_plan_order() {
        let plan = stage_plan(&ChecksConfig::default());
        let kinds: Vec<CheckKind> = plan.iter().map(|(kind, _)| *kind).collect();
        assert_eq!(kinds, CheckKind::ORDERED.to_vec());
        assert!(plan.iter().all(|(_, enabled)| *enabled));
    }

    #[test]
    fn test_stage_plan_respects_toggles() {
        let mut checks = ChecksConfig::default();
        checks.count_check_enabled = false;
        let plan = stage_plan(&checks);
        assert_eq!(
            plan.iter()
                .find(|(kind, _)| *kind == CheckKind::Count)
                .map(|(_, enabled)| *enabled),
            Some(false)
        );
    }

    #[test]
    fn test_stages_json_uses_stable_names() {
        let report = PipelineReport {
            stages: vec![
                StageOutcome::new(CheckKind::Format, CheckStatus::Passed),
                StageOutcome::failed(CheckKind::Token, "expired"),
                StageOutcome::new(CheckKind::Country, CheckStatus::NotEvaluated),
            ],
            accepted: false,
            failed_stage: Some(CheckKind::Token),
            token: None,
        };
        let value = report.stages_json();
        assert_eq!(value["format_check"], "passed");
        assert_eq!(value["token_check"], "failed");
        assert_eq!(value["country_check"], "not_evaluated");
    }
}
