//! `mprofile`: drive simulated drivetrain controllers from the command line.

mod cli;
mod error_fmt;
mod sim;

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use clap::Parser;
use eyre::Result;
use tracing_subscriber::{
    EnvFilter, Layer, Registry, fmt, layer::SubscriberExt, util::SubscriberInitExt,
};

use crate::cli::{Cli, Commands, FILE_GUARD, JSON_MODE};
use crate::error_fmt::{exit_code_for_error, format_error_json, humanize};

fn main() {
    let _ = color_eyre::install();
    let cli = Cli::parse();
    let _ = JSON_MODE.set(cli.json);

    if let Err(err) = real_main(&cli) {
        let json = JSON_MODE.get().copied().unwrap_or(false);
        if json {
            eprintln!("{}", format_error_json(&err));
        } else {
            eprintln!("{}", humanize(&err));
        }
        std::process::exit(exit_code_for_error(&err));
    }
}

fn real_main(cli: &Cli) -> Result<()> {
    match &cli.cmd {
        Commands::SelfCheck => {
            init_tracing(cli, None);
            sim::self_check(cli.json)
        }
        Commands::Check => {
            let cfg = sim::load_config(&cli.config)?;
            init_tracing(cli, Some(&cfg.logging));
            sim::check(&cli.config, cli.json)
        }
        Commands::Run {
            script,
            trajectory,
            realtime,
            max_cycles,
        } => {
            let cfg = sim::load_config(&cli.config)?;
            init_tracing(cli, Some(&cfg.logging));

            let shutdown = Arc::new(AtomicBool::new(false));
            let flag = Arc::clone(&shutdown);
            if let Err(e) = ctrlc::set_handler(move || flag.store(true, Ordering::Relaxed)) {
                tracing::warn!(error = %e, "could not install Ctrl-C handler");
            }

            let opts = sim::SimOpts {
                config_path: &cli.config,
                script,
                trajectory: trajectory.as_deref(),
                realtime: *realtime,
                max_cycles: *max_cycles,
                json: cli.json,
            };
            sim::run_sim(&opts, &shutdown).map(|_| ())
        }
    }
}

/// Console logs go to stderr so stdout stays clean for reports. An optional
/// JSON file layer follows `[logging]`.
fn init_tracing(cli: &Cli, logging: Option<&mprofile_config::Logging>) {
    let console_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));
    let mut layers: Vec<Box<dyn Layer<Registry> + Send + Sync>> = Vec::new();
    layers.push(if cli.json {
        fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .with_filter(console_filter)
            .boxed()
    } else {
        fmt::layer()
            .with_target(false)
            .with_writer(std::io::stderr)
            .with_filter(console_filter)
            .boxed()
    });

    let file = logging.and_then(|l| {
        let path = std::path::Path::new(l.file.as_deref()?);
        let dir = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| std::path::Path::new("."));
        let name = path.file_name()?;
        let appender = match l.rotation.as_deref() {
            Some("daily") => tracing_appender::rolling::daily(dir, name),
            Some("hourly") => tracing_appender::rolling::hourly(dir, name),
            _ => tracing_appender::rolling::never(dir, name),
        };
        let (writer, guard) = tracing_appender::non_blocking(appender);
        let _ = FILE_GUARD.set(guard);
        let level = l.level.as_deref().unwrap_or("info");
        Some(
            fmt::layer()
                .json()
                .with_writer(writer)
                .with_filter(EnvFilter::new(level))
                .boxed(),
        )
    });

    layers.extend(file);

    // A second init in the same process is ignored.
    let _ = tracing_subscriber::registry().with(layers).try_init();
}
