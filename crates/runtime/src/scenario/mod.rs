//! Scenario replay for driving a session without a live host.
//!
//! A scenario names the game system, the starting tokens, a scripted
//! percent-cover table and a list of steps: host events, setting writes,
//! visibility updates, cover queries and settle points. Scenarios are
//! written in RON.

use std::path::Path;

use serde::{Deserialize, Serialize};

use cover_core::{
    CoverMode, CoverRecord, CoverSettings, DispatchReport, HostEvent, SettingChange, Token,
    TokenId,
};

use crate::api::{Result, RuntimeError};
use crate::config::RuntimeConfig;
use crate::controller::CoverSnapshot;
use crate::oracle::CoverLine;
use crate::runtime::{Runtime, RuntimeBuilder};

/// One scripted step.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum ScenarioStep {
    /// Deliver a host event.
    Host(HostEvent),
    /// Write a cover setting.
    Setting(SettingChange),
    /// Change the scripted percent cover of one pair.
    Line(CoverLine),
    /// Ask for a defender's cover against one attacker.
    Query { defender: TokenId, attacker: TokenId },
    /// Wait for pending privileged writes.
    Settle,
}

/// Scenario configuration for a replayed session.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    /// Game system; keeps the configured one when absent.
    #[serde(default)]
    pub system_id: Option<String>,

    /// Settings; loaded from content when absent.
    #[serde(default)]
    pub settings: Option<CoverSettings>,

    #[serde(default)]
    pub tokens: Vec<Token>,

    #[serde(default)]
    pub lines: Vec<CoverLine>,

    #[serde(default)]
    pub steps: Vec<ScenarioStep>,
}

/// Serializable digest of a [`DispatchReport`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportSummary {
    pub changed: Vec<(TokenId, CoverMode)>,
    pub attackers_changed: Vec<CoverMode>,
    pub redraws: Vec<TokenId>,
    pub failures: Vec<String>,
}

impl From<&DispatchReport> for ReportSummary {
    fn from(report: &DispatchReport) -> Self {
        Self {
            changed: report.changed.clone(),
            attackers_changed: report.attackers_changed.clone(),
            redraws: report.redraws.clone(),
            failures: report
                .failures
                .iter()
                .map(|failure| format!("{} ({}): {}", failure.token, failure.mode, failure.error))
                .collect(),
        }
    }
}

/// What replaying one step produced.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepOutcome {
    Dispatched {
        event: String,
        report: ReportSummary,
    },
    SettingApplied {
        change: SettingChange,
        report: ReportSummary,
    },
    LineSet(CoverLine),
    Cover {
        defender: TokenId,
        attacker: TokenId,
        record: CoverRecord,
    },
    Settled(CoverSnapshot),
}

impl Scenario {
    /// Parses a scenario from RON text.
    pub fn parse(content: &str) -> Result<Self> {
        ron::from_str(content).map_err(|e| {
            RuntimeError::InvalidConfig(format!("Failed to parse scenario RON: {}", e))
        })
    }

    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            RuntimeError::InvalidConfig(format!("Failed to read scenario file: {}", e))
        })?;
        Self::parse(&content)
    }

    /// Applies the scenario's session setup to a builder.
    pub fn configure(&self, mut config: RuntimeConfig) -> RuntimeBuilder {
        if let Some(system_id) = &self.system_id {
            config.system_id = system_id.clone();
        }
        let mut builder = Runtime::builder()
            .config(config)
            .tokens(self.tokens.iter().cloned())
            .cover_lines(self.lines.iter().copied());
        if let Some(settings) = self.settings {
            builder = builder.settings(settings);
        }
        builder
    }

    /// Replays every step in order, reporting each outcome as it happens.
    pub async fn replay(
        &self,
        runtime: &Runtime,
        mut on_step: impl FnMut(&StepOutcome),
    ) -> Result<Vec<StepOutcome>> {
        let handle = runtime.handle();
        let mut outcomes = Vec::with_capacity(self.steps.len());

        for step in &self.steps {
            let outcome = match step {
                ScenarioStep::Host(event) => {
                    let report = handle.dispatch(event.clone()).await?;
                    StepOutcome::Dispatched {
                        event: event.kind().to_owned(),
                        report: ReportSummary::from(&report),
                    }
                }
                ScenarioStep::Setting(change) => {
                    let report = handle.update_setting(*change).await?;
                    StepOutcome::SettingApplied {
                        change: *change,
                        report: ReportSummary::from(&report),
                    }
                }
                ScenarioStep::Line(line) => {
                    let visibility = runtime.scripted_visibility().ok_or_else(|| {
                        RuntimeError::InvalidConfig(
                            "scenario scripts visibility but a custom oracle is installed".into(),
                        )
                    })?;
                    visibility.set(*line);
                    StepOutcome::LineSet(*line)
                }
                ScenarioStep::Query { defender, attacker } => StepOutcome::Cover {
                    defender: *defender,
                    attacker: *attacker,
                    record: handle.cover_from(*defender, *attacker).await?,
                },
                ScenarioStep::Settle => {
                    handle.settle().await?;
                    StepOutcome::Settled(handle.query_state().await?)
                }
            };
            on_step(&outcome);
            outcomes.push(outcome);
        }

        Ok(outcomes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCENARIO: &str = r#"(
        system_id: Some("dnd5e"),
        tokens: [
            (id: (1), name: "Archer", position: (x: 0, y: 0), controlled: true),
            (id: (2), name: "Goblin", position: (x: 4, y: 2)),
        ],
        lines: [(attacker: (1), defender: (2), percent: 0.6)],
        steps: [
            Host(token_moved(token: (2), position: (x: 5, y: 2))),
            Setting(targeting(mode: cover_types, enabled: true)),
            Line((attacker: (1), defender: (2), percent: 1.0)),
            Query(defender: (2), attacker: (1)),
            Settle,
        ],
    )"#;

    #[test]
    fn parses_scenario_ron() {
        let scenario = Scenario::parse(SCENARIO).unwrap();
        assert_eq!(scenario.system_id.as_deref(), Some("dnd5e"));
        assert_eq!(scenario.tokens.len(), 2);
        assert!(scenario.tokens[0].controlled);
        assert!(scenario.tokens[1].visible);
        assert_eq!(scenario.steps.len(), 5);
        assert_eq!(
            scenario.steps[1],
            ScenarioStep::Setting(SettingChange::Targeting {
                mode: CoverMode::CoverTypes,
                enabled: true,
            })
        );
        assert!(scenario.settings.is_none());
    }

    #[test]
    fn malformed_scenario_is_invalid_config() {
        let err = Scenario::parse("(tokens: oops)").unwrap_err();
        assert!(matches!(err, RuntimeError::InvalidConfig(_)));
    }

    #[test]
    fn missing_file_is_invalid_config() {
        let dir = tempfile::tempdir().unwrap();
        let err = Scenario::load_from_file(&dir.path().join("missing.ron")).unwrap_err();
        assert!(err.to_string().contains("Failed to read scenario file"));
    }
}
