//! Command-line surface.

use clap::Parser;
use std::path::PathBuf;

/// kopy-watch - supervised multi-task directory synchronizer
#[derive(Parser, Debug)]
#[command(name = "kopy-watch")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to the task configuration file
    #[arg(default_value = "config.json")]
    pub config: PathBuf,

    /// Raise log verbosity to DEBUG
    #[arg(long, short = 'v')]
    pub verbose: bool,

    /// Run a single synchronization pass per task and exit, instead of
    /// watching forever
    #[arg(long)]
    pub once: bool,

    /// Internal marker identifying this process as the supervised worker,
    /// set by the supervisor when it re-execs itself.
    #[arg(long, hide = true)]
    pub worker: bool,
}
