//! fwcfg - read channel for the QEMU firmware-configuration device
//!
//! The device publishes named binary blobs behind a two-register
//! selector/data protocol. This tool opens a backend (in-memory dummy or
//! a memory-mapped region on Linux), enumerates the blob directory, and
//! retrieves blob contents by name.

mod backends;
mod cli;
mod commands;

use clap::Parser;
use cli::{Cli, Commands};
use std::time::Duration;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logger
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    // Set log level based on verbosity
    match cli.verbose {
        0 => {} // default (info)
        1 => log::set_max_level(log::LevelFilter::Debug),
        _ => log::set_max_level(log::LevelFilter::Trace),
    }

    let lock_timeout = Duration::from_millis(cli.lock_timeout_ms);

    match cli.command {
        Commands::Probe { backend } => {
            let session = backends::open_session(&backend, lock_timeout)?;
            print_device_info(&session);
            Ok(())
        }
        Commands::List { backend } => {
            let session = backends::open_session(&backend, lock_timeout)?;
            commands::list::run_list(&session);
            Ok(())
        }
        Commands::Read {
            backend,
            name,
            output,
        } => {
            let session = backends::open_session(&backend, lock_timeout)?;
            commands::read::run_read(&session, &name, output.as_deref())
        }
        Commands::Extract { backend, output } => {
            let session = backends::open_session(&backend, lock_timeout)?;
            commands::extract::run_extract(&session, &output)
        }
        Commands::ListBackends => {
            backends::list_backends();
            Ok(())
        }
    }
}

fn print_device_info(session: &fwcfg_core::session::DeviceSession<backends::BoxedPort>) {
    println!("Firmware Configuration Device");
    println!("=============================");
    println!();
    println!("Signature:       QEMU");
    println!("Revision:        {}", session.revision());
    println!("Directory:       {} blob(s)", session.catalog().len());
}
