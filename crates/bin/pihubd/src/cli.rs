//! Command-line arguments of the three binaries.

use std::path::PathBuf;

use clap::Parser;

use pihub_domain::irrigation::HoldDuration;

use crate::config::DEFAULT_PATH;

/// Telegram bot controlling the irrigation outlet and reporting CPU health.
#[derive(Debug, Parser)]
#[command(name = "pihubd", version)]
pub struct DaemonArgs {
    /// Configuration file.
    #[arg(long, default_value = DEFAULT_PATH)]
    pub config: PathBuf,
}

/// Run one irrigation cycle: invert the outlet, wait, then restore it.
#[derive(Debug, Parser)]
#[command(name = "irrigate", version)]
pub struct IrrigateArgs {
    /// How long to keep the outlet inverted, in whole seconds.
    pub seconds: HoldDuration,

    /// Configuration file.
    #[arg(long, default_value = DEFAULT_PATH)]
    pub config: PathBuf,
}

/// Check the CPU temperature once and alert over Telegram when too hot.
#[derive(Debug, Parser)]
#[command(name = "cpu-watchdog", version)]
pub struct WatchdogArgs {
    /// Alert threshold in degrees Celsius (overrides the configuration).
    #[arg(long, value_parser = parse_ceiling)]
    pub ceiling: Option<f64>,

    /// Configuration file.
    #[arg(long, default_value = DEFAULT_PATH)]
    pub config: PathBuf,
}

fn parse_ceiling(raw: &str) -> Result<f64, String> {
    match raw.parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(value),
        _ => Err(format!("{raw:?} is not a temperature")),
    }
}
