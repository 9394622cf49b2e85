//! Error types for the Linux MMIO backend

use std::io;
use thiserror::Error;

/// Errors from mapping or locking the register region
#[derive(Debug, Error)]
pub enum MmioError {
    /// /dev/mem could not be opened
    #[error("failed to open {path}: {source}")]
    DevMemOpen {
        path: &'static str,
        #[source]
        source: io::Error,
    },

    /// mmap of the register region failed
    #[error("failed to map {size} bytes at {address:#x}")]
    MemoryMap { address: u64, size: usize },

    /// The configured region cannot hold both registers
    #[error("register region of {0} bytes is too small (need at least 2)")]
    RegionTooSmall(usize),

    /// Lock file could not be opened or created
    #[error("failed to open lock file {path}: {source}")]
    LockFileOpen {
        path: String,
        #[source]
        source: io::Error,
    },

    /// Missing required parameter
    #[error("missing required parameter: {0}")]
    MissingParameter(&'static str),

    /// Invalid parameter value
    #[error("invalid parameter '{name}': {message}")]
    InvalidParameter { name: &'static str, message: String },

    /// Operation not supported on this platform
    #[error("not supported: {0}")]
    NotSupported(&'static str),
}

/// Result type for the Linux MMIO backend
pub type Result<T> = std::result::Result<T, MmioError>;
