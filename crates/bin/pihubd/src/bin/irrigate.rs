//! # irrigate — one irrigation cycle from the shell
//!
//! `irrigate <seconds>` inverts the configured outlet, waits, restores it and
//! prints the outcome on stdout. Invalid arguments exit with status 2 before
//! any device is contacted; every other run exits 0, whatever the outcome.
//! An unreadable configuration file is reported as the outcome too. Ctrl-C
//! ends the wait early but the outlet is still restored.

use clap::Parser;
use tokio_util::sync::CancellationToken;

use pihub_domain::error::ConfigurationError;
use pihub_domain::irrigation::IrrigationOutcome;
use pihubd::cli::IrrigateArgs;
use pihubd::config::Config;
use pihubd::{irrigation_service, runtime, shutdown, telemetry};

fn main() -> anyhow::Result<()> {
    let args = IrrigateArgs::parse();
    let config = match Config::load(&args.config) {
        Ok(config) => config,
        Err(err) => {
            telemetry::init(&Config::default().logging.filter);
            tracing::error!(path = %args.config.display(), error = %err, "cannot load configuration");
            println!("{}", IrrigationOutcome::Misconfigured(ConfigurationError::from(err)));
            return Ok(());
        }
    };
    telemetry::init(&config.logging.filter);

    let outcome = runtime()?.block_on(async {
        let shutdown = CancellationToken::new();
        tokio::spawn(shutdown::cancel_on_signal(shutdown.clone()));
        let outcome = irrigation_service(&config, shutdown.clone())
            .run_irrigation_cycle(args.seconds)
            .await;
        shutdown.cancel();
        outcome
    });

    println!("{outcome}");
    Ok(())
}
