#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]

mod analyze;
mod cli;
mod error_fmt;
mod report;

use clap::Parser;
use eyre::{Result, WrapErr};
use roast_config::Config;
use std::path::Path;
use tracing_subscriber::{EnvFilter, Layer, fmt, prelude::*};

use crate::cli::{Cli, Commands, FILE_GUARD, JSON_MODE};
use crate::error_fmt::{exit_code_for_error, format_error_json, humanize};

fn main() {
    let cli = Cli::parse();
    let _ = JSON_MODE.set(cli.json);

    if let Err(err) = run(cli) {
        if JSON_MODE.get().copied().unwrap_or(false) {
            eprintln!("{}", format_error_json(&err));
        } else {
            eprintln!("{}", humanize(&err));
        }
        std::process::exit(exit_code_for_error(&err));
    }
}

fn run(cli: Cli) -> Result<()> {
    let _ = color_eyre::install();

    let cfg = match &cli.config {
        Some(path) => {
            let cfg = roast_config::load_path(path).wrap_err("load config")?;
            cfg.validate().wrap_err("invalid config")?;
            cfg
        }
        None => Config::default(),
    };
    init_tracing(cli.json, cli.log_level.as_deref(), &cfg.logging);
    tracing::debug!(config = ?cli.config, "configuration loaded");

    match cli.cmd {
        Commands::Analyze {
            log,
            plan,
            channel,
            out,
        } => analyze::run_analyze(
            &cfg,
            &log,
            plan.as_deref(),
            channel.into(),
            out.as_deref(),
            cli.json,
        ),
        Commands::Compare {
            logs,
            plan,
            plan_name,
            profile,
            data_dir,
        } => analyze::run_compare(
            &cfg,
            &analyze::CompareInputs {
                logs,
                plan,
                plan_name,
                profile,
                data_dir,
            },
            cli.json,
        ),
        Commands::Profiles { data_dir } => analyze::run_profiles(&data_dir, cli.json),
        Commands::Plan { file, horizon } => analyze::run_plan(&cfg, &file, horizon, cli.json),
    }
}

/// Console logs go to stderr so reports on stdout stay machine-readable.
/// `[logging] file` adds a JSON-lines file sink rotated per `logging.rotation`.
fn init_tracing(json: bool, cli_level: Option<&str>, logging: &roast_config::Logging) {
    let level = cli_level.or(logging.level.as_deref()).unwrap_or("warn");
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let console = if json {
        fmt::layer().json().with_writer(std::io::stderr).boxed()
    } else {
        fmt::layer()
            .with_target(false)
            .with_writer(std::io::stderr)
            .boxed()
    };

    let file = logging.file.as_deref().map(|file| {
        let path = Path::new(file);
        let dir = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        let name = path
            .file_name()
            .map_or_else(|| "roast.log".into(), std::ffi::OsStr::to_os_string);
        let appender = match logging.rotation.as_deref() {
            Some("daily") => tracing_appender::rolling::daily(dir, name),
            Some("hourly") => tracing_appender::rolling::hourly(dir, name),
            _ => tracing_appender::rolling::never(dir, name),
        };
        let (writer, guard) = tracing_appender::non_blocking(appender);
        let _ = FILE_GUARD.set(guard);
        fmt::layer()
            .json()
            .with_ansi(false)
            .with_writer(writer)
            .boxed()
    });

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(console)
        .with(file)
        .try_init();
}
