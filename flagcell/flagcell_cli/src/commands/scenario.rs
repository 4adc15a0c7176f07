//! Walk both flag variants through the same call sequence and compare.

use std::fmt;

use anyhow::Result;
use flagcell_core::{BooleanFlag, HarnessConfig, SyncedFlag, UnsyncedFlag};
use serde::Serialize;

use super::emit;

/// One observed call in the scenario.
#[derive(Debug, Serialize)]
pub struct ScenarioStep {
    /// Flag variant the step ran against
    pub variant: &'static str,

    /// Call sequence leading to the observation
    pub step: &'static str,

    /// State the step should leave behind
    pub expected: bool,

    /// State `is_true` reported
    pub observed: bool,
}

/// All steps for both variants.
#[derive(Debug, Serialize)]
pub struct ScenarioReport {
    /// Steps in execution order
    pub steps: Vec<ScenarioStep>,
}

impl ScenarioReport {
    /// True when every observation matched.
    pub fn is_clean(&self) -> bool {
        self.steps.iter().all(|s| s.expected == s.observed)
    }
}

impl fmt::Display for ScenarioReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for step in &self.steps {
            writeln!(
                f,
                "{:<9} {:<12} expected {:<5} observed {:<5} {}",
                step.variant,
                step.step,
                step.expected,
                step.observed,
                if step.expected == step.observed { "ok" } else { "MISMATCH" }
            )?;
        }
        write!(
            f,
            "scenario: {}",
            if self.is_clean() { "ok" } else { "failed" }
        )
    }
}

fn run_steps<F: BooleanFlag>(variant: &'static str, flag: &mut F) -> Vec<ScenarioStep> {
    let mut steps = Vec::new();
    let mut record = |step, expected, observed| {
        steps.push(ScenarioStep {
            variant,
            step,
            expected,
            observed,
        })
    };

    record("new", false, flag.is_true());
    flag.set(true);
    record("set(true)", true, flag.is_true());
    flag.flip();
    record("flip", false, flag.is_true());
    flag.flip();
    flag.flip();
    record("flip x2", false, flag.is_true());
    steps
}

/// Build the report without printing it.
pub fn build_report(config: &HarnessConfig) -> ScenarioReport {
    let mut steps = run_steps("unsynced", &mut UnsyncedFlag::new());
    steps.extend(run_steps("synced", &mut SyncedFlag::from_config(&config.flag)));
    ScenarioReport { steps }
}

/// Implementation of the `scenario` command
pub fn execute(config: &HarnessConfig, json: bool) -> Result<bool> {
    let report = build_report(config);
    emit(&report, json)?;
    Ok(report.is_clean())
}
