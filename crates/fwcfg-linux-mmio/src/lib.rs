//! fwcfg-linux-mmio - Memory-mapped register backend for Linux
//!
//! This crate reaches the firmware-configuration device through its
//! memory-mapped register pair: it maps the region out of `/dev/mem`,
//! exposes it as a [`SelectorPort`], and optionally coordinates with
//! other host-side agents through an advisory file lock.
//!
//! # Example
//!
//! ```ignore
//! use fwcfg_linux_mmio::{MmioConfig, MmioPort};
//!
//! let port = MmioPort::open(&MmioConfig { base: 0x9020000, size: 2 })?;
//! let session = DeviceSession::open(Box::new(port) as _, lock, timeout)?;
//! ```
//!
//! # Usage with the fwcfg CLI
//!
//! ```bash
//! # List blobs on a device mapped at 0x9020000
//! fwcfg list -b mmio:base=0x9020000
//!
//! # Coordinate with another agent through a lock file
//! fwcfg read -b mmio:base=0x9020000,lock=/run/lock/fwcfg.lock -n bootorder
//! ```
//!
//! # System requirements
//!
//! - Linux with `/dev/mem` access to the register range (root, and a
//!   kernel without `CONFIG_STRICT_DEVMEM` restrictions on the range)
//! - The register region reserved for this process: nothing else on the
//!   host may own or access it while a session is open
//!
//! [`SelectorPort`]: fwcfg_core::port::SelectorPort

pub mod device;
pub mod error;
pub mod lock;
mod physmap;

// Re-exports
pub use device::{parse_options, MmioConfig, MmioPort};
pub use error::{MmioError, Result};
pub use lock::FileLock;

use fwcfg_core::lock::{NoPlatformLock, PlatformLock};
use fwcfg_core::port::SelectorPort;
use std::path::Path;

/// Open the memory-mapped backend from parsed option pairs.
///
/// This is a convenience function for the CLI backend dispatch. Returns
/// the mapped port and the platform lock: the file lock when a `lock=`
/// option names one, the degraded process-local-only mode otherwise.
///
/// # Supported options
///
/// - `base=0x...` - required, physical base of the register region
/// - `size=N` - region size in bytes, default 2
/// - `lock=<path>` - advisory lock file shared with other agents
pub fn open_mmio(
    options: &[(&str, &str)],
) -> std::result::Result<
    (
        Box<dyn SelectorPort + Send>,
        Box<dyn PlatformLock + Send + Sync>,
    ),
    Box<dyn std::error::Error>,
> {
    let config = parse_options(options)?;
    let port = MmioPort::open(&config)?;

    let platform: Box<dyn PlatformLock + Send + Sync> = match options
        .iter()
        .find(|(key, _)| *key == "lock")
        .map(|(_, value)| *value)
    {
        Some(path) => Box::new(FileLock::open(Path::new(path))?),
        None => {
            log::debug!("no lock file configured, process-local exclusion only");
            Box::new(NoPlatformLock)
        }
    };

    Ok((Box::new(port), platform))
}
