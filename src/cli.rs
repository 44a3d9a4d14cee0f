//! Flags every plugin accepts, and diagnostic logging setup

use std::path::PathBuf;
use std::time::Duration;

use structopt::StructOpt;
use tracing_subscriber::EnvFilter;

use crate::threshold::{Range, Thresholds};

/// Options shared by all plugins, flattened into each plugin's `Args`
#[derive(StructOpt, Debug, Clone)]
pub struct Common {
    #[structopt(
        short = "t",
        long = "timeout",
        name = "seconds",
        default_value = "10",
        help = "Seconds before network operations are abandoned"
    )]
    pub timeout: u64,
    #[structopt(
        short = "v",
        long = "verbose",
        parse(from_occurrences),
        help = "Log diagnostics to stderr, repeat for more detail"
    )]
    pub verbose: u8,
}

impl Common {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }
}

/// The usual `-w`/`-c` pair
#[derive(StructOpt, Debug, Clone, Copy, Default)]
pub struct ThresholdArgs {
    #[structopt(short = "w", long = "warning", help = "Warning range, [@]start:end")]
    pub warning: Option<Range>,
    #[structopt(short = "c", long = "critical", help = "Critical range, [@]start:end")]
    pub critical: Option<Range>,
}

impl ThresholdArgs {
    pub fn thresholds(&self) -> Thresholds {
        Thresholds::new(self.warning, self.critical)
    }
}

/// Where plugins that remember things between runs keep their databases
#[derive(StructOpt, Debug, Clone)]
pub struct StateArgs {
    #[structopt(
        long = "state-dir",
        env = "CAMPUS_PLUGINS_STATE_DIR",
        default_value = "/var/tmp/campus-plugins",
        parse(from_os_str),
        help = "Directory holding state kept between runs"
    )]
    pub state_dir: PathBuf,
}

/// Send diagnostics to stderr, stdout belongs to the monitoring system
///
/// `RUST_LOG` wins over the verbosity count when it is set.
pub fn init_logging(verbosity: u8) {
    let level = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .without_time()
        .try_init();
}
