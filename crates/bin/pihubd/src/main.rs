//! # pihubd — pihub bot daemon
//!
//! Long-polls Telegram and routes each update through the command router in
//! its own task. On SIGINT/SIGTERM polling stops, running holds are cut
//! short, and every in-flight cycle restores its outlet and reports before
//! the process exits.

use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;

use pihub_adapter_host::HostCpuSensor;
use pihub_adapter_telegram::TelegramClient;
use pihub_app::device_locks::DeviceLocks;
use pihub_app::services::command_router::CommandRouter;
use pihub_app::services::cpu_info::CpuInfoService;
use pihub_app::services::notification_dispatcher::{
    DEFAULT_DISPATCH_TIMEOUT, NotificationDispatcher,
};
use pihubd::cli::DaemonArgs;
use pihubd::config::Config;
use pihubd::{irrigation_service, runtime, shutdown, telemetry};

/// In-flight cycles get this many device timeouts to finish after shutdown.
const GRACE_TIMEOUTS: u32 = 3;

fn main() -> anyhow::Result<()> {
    let args = DaemonArgs::parse();
    let config = Config::load(&args.config)
        .with_context(|| format!("cannot load {}", args.config.display()))?;
    telemetry::init(&config.logging.filter);
    runtime()?.block_on(run(config))
}

async fn run(config: Config) -> anyhow::Result<()> {
    let recipient = config.recipient().context("bot not configured")?;
    let client = Arc::new(TelegramClient::new(&config.telegram)?);

    let shutdown = CancellationToken::new();
    let irrigation = irrigation_service(&config, shutdown.clone());
    match irrigation.identity() {
        Some(device) => tracing::info!(%device, "irrigation device configured"),
        None => tracing::warn!("irrigation device not fully configured"),
    }

    let router = Arc::new(CommandRouter::new(
        recipient,
        irrigation,
        CpuInfoService::new(HostCpuSensor::new(config.sensor.clone())),
        Arc::clone(&client),
        NotificationDispatcher::new(Arc::clone(&client), DEFAULT_DISPATCH_TIMEOUT),
        DeviceLocks::new(),
    ));

    tokio::spawn(shutdown::cancel_on_signal(shutdown.clone()));
    tracing::info!(%recipient, "pihubd started");

    let tracker = TaskTracker::new();
    client
        .poll(&shutdown, |event| {
            let router = Arc::clone(&router);
            tracker.spawn(async move { router.route(event).await });
        })
        .await;

    tracker.close();
    let grace = config.io_timeout() * GRACE_TIMEOUTS;
    if tokio::time::timeout(grace, tracker.wait()).await.is_err() {
        tracing::warn!(
            pending = tracker.len(),
            "grace period elapsed with cycles still running"
        );
    }
    tracing::info!("pihubd stopped");
    Ok(())
}
