//! CLI argument definitions and shared statics.

use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use roast_core::Channel;
use std::path::PathBuf;
use std::sync::OnceLock;

pub static FILE_GUARD: OnceLock<tracing_appender::non_blocking::WorkerGuard> = OnceLock::new();
/// Whether the user asked for JSON output (controls structured error output).
pub static JSON_MODE: OnceLock<bool> = OnceLock::new();

#[derive(Parser, Debug)]
#[command(name = "roast", version, about = "Coffee roast log analysis")]
pub struct Cli {
    /// Path to config TOML; built-in defaults when omitted
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Emit reports and errors as JSON instead of text
    #[arg(long, action = ArgAction::SetTrue)]
    pub json: bool,

    /// Log level (error|warn|info|debug|trace); overrides `[logging] level`, default warn
    #[arg(long = "log-level", value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Command to execute
    #[command(subcommand)]
    pub cmd: Commands,
}

/// Temperature channel selector for per-channel tables.
#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum ChannelArg {
    /// Environment (IBTS) sensor
    Env,
    /// Bean probe
    Probe,
}

impl From<ChannelArg> for Channel {
    fn from(c: ChannelArg) -> Self {
        match c {
            ChannelArg::Env => Channel::Env,
            ChannelArg::Probe => Channel::Probe,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Analyse one roast log, optionally against a plan
    Analyze {
        /// Exported roaster log
        #[arg(long, value_name = "FILE")]
        log: PathBuf,
        /// Roast plan to compare against
        #[arg(long, value_name = "FILE")]
        plan: Option<PathBuf>,
        /// Channel used for phase, milestone and plan tables
        #[arg(long, value_enum, default_value = "env")]
        channel: ChannelArg,
        /// Write the series with every derived column as CSV
        #[arg(long, value_name = "CSV")]
        out: Option<PathBuf>,
    },
    /// Compare final thermal doses across several roast logs
    Compare {
        /// Roast logs; unreadable files are reported and skipped
        #[arg(required_unless_present = "profile", value_name = "FILE")]
        logs: Vec<PathBuf>,
        /// Plan shown next to the roasts with its expected dose
        #[arg(long, value_name = "FILE")]
        plan: Option<PathBuf>,
        /// Plan whose kinetics override applies to every log; defaults to the plan's file name
        #[arg(long, value_name = "NAME")]
        plan_name: Option<String>,
        /// Take the plan and roast logs of this profile from the data directory
        #[arg(long, value_name = "NAME")]
        profile: Option<String>,
        /// Root holding one folder per profile
        #[arg(long, value_name = "DIR", default_value = "data")]
        data_dir: PathBuf,
    },
    /// List the profiles found in a data directory
    Profiles {
        /// Root holding one folder per profile
        #[arg(long, value_name = "DIR", default_value = "data")]
        data_dir: PathBuf,
    },
    /// Inspect a roast plan and its expected dose
    Plan {
        /// Plan file
        #[arg(value_name = "FILE")]
        file: PathBuf,
        /// Extend the fitted curve to this many seconds
        #[arg(long, value_name = "SECONDS")]
        horizon: Option<f64>,
    },
}
