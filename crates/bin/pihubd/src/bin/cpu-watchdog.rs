//! # cpu-watchdog — one CPU temperature check
//!
//! Meant to be run periodically (cron, systemd timer). Sends a Telegram
//! alert when the temperature is at or above the ceiling. An unreadable
//! sensor or a failed delivery is logged and still exits 0; only missing or
//! malformed Telegram settings, or an unusable ceiling, are fatal.

use anyhow::Context;
use clap::Parser;

use pihub_adapter_host::HostCpuSensor;
use pihub_adapter_telegram::TelegramClient;
use pihub_app::services::notification_dispatcher::{
    DEFAULT_DISPATCH_TIMEOUT, NotificationDispatcher,
};
use pihub_app::services::watchdog::ThresholdWatchdog;
use pihubd::cli::WatchdogArgs;
use pihubd::config::Config;
use pihubd::{runtime, telemetry};

fn main() -> anyhow::Result<()> {
    let args = WatchdogArgs::parse();
    let config = Config::load(&args.config)
        .with_context(|| format!("cannot load {}", args.config.display()))?;
    telemetry::init(&config.logging.filter);

    let recipient = config.recipient().context("bot not configured")?;
    let ceiling = match args.ceiling {
        Some(ceiling) => ceiling,
        None => config.ceiling().context("watchdog not configured")?,
    };
    let watchdog = ThresholdWatchdog::new(HostCpuSensor::new(config.sensor.clone()), ceiling);

    runtime()?.block_on(async {
        let dispatcher = NotificationDispatcher::new(
            TelegramClient::new(&config.telegram)?,
            DEFAULT_DISPATCH_TIMEOUT,
        );
        watchdog.run_once(&dispatcher, recipient).await;
        Ok::<_, anyhow::Error>(())
    })
}
