//! # Saorsa Map Host
//!
//! Replays an interaction script against a headless map widget.

use clap::Parser;
use map_host::{load_script, CliArgs, Host, HostConfig};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize tracing with an optional JSON format (`RUST_LOG_FORMAT=json`).
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,map_core=debug,map_engine=debug"));

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_file(true)
        .with_line_number(true);

    if std::env::var("RUST_LOG_FORMAT").as_deref() == Ok("json") {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer.json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer)
            .init();
    }
}

fn main() -> anyhow::Result<()> {
    init_tracing();

    tracing::info!("Starting Saorsa Map host v{}", map_core::VERSION);

    let args = CliArgs::parse();
    let config = HostConfig::from_args(&args)?;

    tracing::info!(
        "Viewport {}x{}, location {:?}, continuous_recenter={}",
        config.width,
        config.height,
        config.availability,
        config.map.continuous_recenter
    );

    let steps = match &args.script {
        Some(path) => load_script(path)?,
        None => {
            tracing::warn!("No script given, mounting an idle widget");
            Vec::new()
        }
    };

    let mut host = Host::new(config)?;
    let summary = host.run(&steps)?;

    for measurement in &summary.measurements {
        println!("{measurement}");
    }
    if summary.stale_draws > 0 {
        tracing::warn!("{} draw completions were stale", summary.stale_draws);
    }

    if host.wants_snapshot() {
        println!("{}", host.snapshot_json()?);
    }

    tracing::info!(
        "Done: {} steps, {} fixes applied",
        summary.steps,
        summary.fixes_applied
    );
    Ok(())
}
