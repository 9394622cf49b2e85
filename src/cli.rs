//! CLI argument parsing

use crate::backends;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Generate dynamic help text for the backend argument
fn backend_help() -> String {
    format!(
        "Device backend to use [available: {}]",
        backends::backend_names_short()
    )
}

#[derive(Parser)]
#[command(name = "fwcfg")]
#[command(author, version, about = "Firmware configuration blob reader", long_about = None)]
pub struct Cli {
    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Platform lock acquisition timeout in milliseconds
    #[arg(long, global = true, default_value_t = 1000)]
    pub lock_timeout_ms: u64,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Probe for the device and show its identity
    Probe {
        /// Device backend to use
        #[arg(short, long, help = backend_help())]
        backend: String,
    },

    /// List blobs published in the device directory
    List {
        /// Device backend to use
        #[arg(short, long, help = backend_help())]
        backend: String,
    },

    /// Read one blob by name
    Read {
        /// Device backend to use
        #[arg(short, long, help = backend_help())]
        backend: String,

        /// Blob name, e.g. "bootorder" or "etc/system-uuid"
        #[arg(short, long)]
        name: String,

        /// Output file path (stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Read every blob into a directory
    Extract {
        /// Device backend to use
        #[arg(short, long, help = backend_help())]
        backend: String,

        /// Output directory
        #[arg(short, long)]
        output: PathBuf,
    },

    /// List supported backends
    ListBackends,
}
