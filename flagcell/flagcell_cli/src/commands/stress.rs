//! Threaded workloads against a shared `SyncedFlag`.

use std::sync::Arc;

use anyhow::{Context, Result};
use flagcell_core::{flip_parity, readers_writers, HarnessConfig, SyncedFlag};

use super::emit;

/// Implementation of the `parity` command
pub fn execute_parity(config: &HarnessConfig, json: bool) -> Result<bool> {
    let flag = Arc::new(SyncedFlag::from_config(&config.flag));
    let report = flip_parity(&flag, config.stress.threads, config.stress.rounds)
        .context("parity run failed")?;

    emit(&report, json)?;
    Ok(report.is_clean())
}

/// Implementation of the `stress` command
pub fn execute_stress(config: &HarnessConfig, json: bool) -> Result<bool> {
    let flag = Arc::new(SyncedFlag::from_config(&config.flag));
    let report = readers_writers(&flag, &config.stress).context("stress run failed")?;

    emit(&report, json)?;
    Ok(report.is_clean())
}
