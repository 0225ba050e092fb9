use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// intrig - coordinate with per-project code generation daemons
#[derive(Parser)]
#[command(name = "intrig")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// JSON output where supported
    #[arg(long, global = true)]
    pub json: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List registered daemon instances and whether they are alive
    List,

    /// Show the daemon instance a path or project name resolves to
    Status {
        /// Project path or name (defaults to the current directory)
        identifier: Option<String>,
    },

    /// Make sure a project's daemon is running, starting it if needed
    Up {
        /// Project root (defaults to the current directory)
        path: Option<PathBuf>,
    },

    /// Regenerate a project's client code if its sources changed
    Sync {
        /// Project root (defaults to the current directory)
        path: Option<PathBuf>,

        /// Skip the hash check and regenerate unconditionally
        #[arg(long)]
        force: bool,
    },

    /// Remove registry records whose daemons are no longer running
    Clean,
}
