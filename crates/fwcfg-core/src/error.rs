//! Error types for fwcfg-core
//!
//! This module provides a no_std compatible error type that can be used
//! throughout the crate.

use core::fmt;

/// Core error type - no_std compatible, Copy for efficiency
///
/// Hardware faults have no variant here: once the register region is
/// mapped, a register access cannot fail in a recoverable way.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// Device signature did not match - there is no compatible device
    /// behind the supplied register region. Fatal to `open`, no retry.
    DeviceNotPresent,
    /// Platform-wide lock could not be acquired in time. The transaction
    /// did not run; the caller may retry.
    LockUnavailable,
    /// Requested blob name is absent from the directory.
    NotFound,
    /// A payload or directory buffer could not be allocated. No partial
    /// read was performed.
    AllocationFailure,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DeviceNotPresent => write!(f, "firmware configuration device not present"),
            Self::LockUnavailable => write!(f, "platform lock unavailable"),
            Self::NotFound => write!(f, "blob not found in directory"),
            Self::AllocationFailure => write!(f, "buffer allocation failed"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}

/// Result type alias using the core Error type
pub type Result<T> = core::result::Result<T, Error>;
