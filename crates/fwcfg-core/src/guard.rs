//! Transaction exclusion guard
//!
//! The device has a single cursor shared by every blob read, so register
//! transactions must never interleave. The guard is the only way to reach
//! the port: it serializes callers within the process behind a mutex and
//! takes the platform-wide lock before every transaction.

use core::time::Duration;

use alloc::boxed::Box;
use std::sync::Mutex;

use crate::error::{Error, Result};
use crate::lock::PlatformLock;
use crate::port::SelectorPort;

/// Serializes all access to the selector/data register pair.
///
/// Owns the port for the lifetime of a session. Every transaction holds
/// both the process-local mutex and the platform lock for its full
/// duration; both are released on every exit path, including panics in
/// the transaction body.
pub struct AccessGuard<P> {
    port: Mutex<P>,
    platform: Box<dyn PlatformLock + Send + Sync>,
    lock_timeout: Duration,
}

impl<P: SelectorPort> AccessGuard<P> {
    /// Wrap `port` so it can only be reached through transactions.
    pub fn new(
        port: P,
        platform: Box<dyn PlatformLock + Send + Sync>,
        lock_timeout: Duration,
    ) -> Self {
        Self {
            port: Mutex::new(port),
            platform,
            lock_timeout,
        }
    }

    /// Run `body` with exclusive access to the port.
    ///
    /// Fails with [`Error::LockUnavailable`] if the platform lock cannot
    /// be acquired within the configured timeout; the body does not run
    /// in that case. After such a failure an out-of-process agent may
    /// have left the device cursor anywhere - the next transaction's
    /// selector write resets it.
    pub fn with_transaction<R, F>(&self, body: F) -> Result<R>
    where
        F: FnOnce(&mut P) -> R,
    {
        let mut port = self
            .port
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        if !self.platform.acquire(self.lock_timeout) {
            return Err(Error::LockUnavailable);
        }
        let held = HeldPlatformLock {
            lock: self.platform.as_ref(),
        };

        let out = body(&mut port);
        drop(held);
        Ok(out)
    }

    /// Tear the guard down and hand the port back to the caller.
    pub fn into_port(self) -> P {
        self.port
            .into_inner()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Releases the platform lock when dropped, unwinding included.
struct HeldPlatformLock<'a> {
    lock: &'a (dyn PlatformLock + Send + Sync),
}

impl Drop for HeldPlatformLock<'_> {
    fn drop(&mut self) {
        self.lock.release();
    }
}
