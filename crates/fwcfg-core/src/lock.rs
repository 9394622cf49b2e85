//! Platform-wide advisory lock
//!
//! The register pair may also be driven by a firmware agent running
//! outside this process (for example an ACPI interpreter). Platforms that
//! support it expose an advisory lock both sides take before touching the
//! registers; platforms that don't degrade to process-local exclusion,
//! which is not an error.

use core::time::Duration;

/// Advisory lock shared with out-of-process users of the device.
///
/// Implementations must be safe to acquire and release from any thread.
pub trait PlatformLock {
    /// Try to take the lock, waiting at most `timeout`.
    ///
    /// Returns `false` if the lock could not be taken in time.
    fn acquire(&self, timeout: Duration) -> bool;

    /// Release a lock previously taken with [`acquire`].
    ///
    /// [`acquire`]: PlatformLock::acquire
    fn release(&self);
}

/// Degraded mode for platforms without a firmware-agent lock: every
/// acquisition succeeds immediately and exclusion is process-local only.
pub struct NoPlatformLock;

impl PlatformLock for NoPlatformLock {
    fn acquire(&self, _timeout: Duration) -> bool {
        true
    }

    fn release(&self) {}
}

#[cfg(feature = "alloc")]
impl PlatformLock for alloc::boxed::Box<dyn PlatformLock + Send + Sync> {
    fn acquire(&self, timeout: Duration) -> bool {
        (**self).acquire(timeout)
    }

    fn release(&self) {
        (**self).release()
    }
}
