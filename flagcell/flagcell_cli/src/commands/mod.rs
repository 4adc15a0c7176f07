//! Subcommand implementations.
//!
//! Each command returns whether its report came out clean; `main` maps that
//! onto the exit status.

pub mod scenario;
pub mod stress;

use anyhow::Result;
use serde::Serialize;
use std::fmt::Display;

/// Print a report as text, or as pretty JSON when `json` is set.
pub fn emit<R: Serialize + Display>(report: &R, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
    } else {
        println!("{report}");
    }
    Ok(())
}
