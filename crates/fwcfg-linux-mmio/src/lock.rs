//! Platform lock over an advisory file lock
//!
//! When another agent on the host can drive the same register pair (a
//! second process, a management daemon), both sides agree on a lock file
//! and take `flock(2)` on it around every transaction. This stands in
//! for a firmware-level lock, which user space cannot reach.

use core::time::Duration;

use fwcfg_core::lock::PlatformLock;

#[cfg(target_os = "linux")]
mod imp {
    use super::*;
    use crate::error::{MmioError, Result};
    use log::warn;
    use std::fs::{File, OpenOptions};
    use std::os::unix::io::AsRawFd;
    use std::path::Path;
    use std::time::Instant;

    /// Poll interval while waiting for a contended lock
    const RETRY_INTERVAL: Duration = Duration::from_millis(10);

    /// Advisory `flock(2)` on a shared lock file.
    pub struct FileLock {
        file: File,
        path: String,
    }

    impl FileLock {
        /// Open (creating if needed) the lock file at `path`.
        pub fn open(path: &Path) -> Result<Self> {
            let file = OpenOptions::new()
                .read(true)
                .write(true)
                .create(true)
                .open(path)
                .map_err(|source| MmioError::LockFileOpen {
                    path: path.display().to_string(),
                    source,
                })?;
            Ok(Self {
                file,
                path: path.display().to_string(),
            })
        }
    }

    impl PlatformLock for FileLock {
        fn acquire(&self, timeout: Duration) -> bool {
            let deadline = Instant::now() + timeout;
            loop {
                // SAFETY: the fd stays valid for as long as self.file lives
                let rc = unsafe {
                    libc::flock(self.file.as_raw_fd(), libc::LOCK_EX | libc::LOCK_NB)
                };
                if rc == 0 {
                    return true;
                }

                let err = std::io::Error::last_os_error();
                if err.raw_os_error() != Some(libc::EWOULDBLOCK) {
                    warn!("flock on {} failed: {}", self.path, err);
                    return false;
                }
                if Instant::now() >= deadline {
                    return false;
                }
                std::thread::sleep(RETRY_INTERVAL);
            }
        }

        fn release(&self) {
            // SAFETY: the fd stays valid for as long as self.file lives
            let rc = unsafe { libc::flock(self.file.as_raw_fd(), libc::LOCK_UN) };
            if rc != 0 {
                warn!(
                    "unlock of {} failed: {}",
                    self.path,
                    std::io::Error::last_os_error()
                );
            }
        }
    }
}

#[cfg(target_os = "linux")]
pub use imp::FileLock;

// Stub for non-Linux platforms
#[cfg(not(target_os = "linux"))]
pub struct FileLock {
    _private: (),
}

#[cfg(not(target_os = "linux"))]
impl FileLock {
    pub fn open(_path: &std::path::Path) -> crate::error::Result<Self> {
        Err(crate::error::MmioError::NotSupported(
            "file locks for the register pair only supported on Linux",
        ))
    }
}

#[cfg(not(target_os = "linux"))]
impl PlatformLock for FileLock {
    fn acquire(&self, _timeout: Duration) -> bool {
        false
    }

    fn release(&self) {}
}

#[cfg(all(test, target_os = "linux"))]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn acquire_and_release() {
        let dir = std::env::temp_dir();
        let path = dir.join("fwcfg-lock-test-a");
        let lock = FileLock::open(&path).unwrap();
        assert!(lock.acquire(Duration::from_millis(100)));
        lock.release();
        assert!(lock.acquire(Duration::from_millis(100)));
        lock.release();
    }

    #[test]
    fn contended_lock_times_out() {
        let dir = std::env::temp_dir();
        let path = dir.join("fwcfg-lock-test-b");
        let holder = Arc::new(FileLock::open(&path).unwrap());
        assert!(holder.acquire(Duration::from_millis(100)));

        // flock is per open file description, so a second description
        // on the same file contends with the first
        let waiter = FileLock::open(&path).unwrap();
        let blocked = thread::spawn(move || waiter.acquire(Duration::from_millis(50)))
            .join()
            .unwrap();
        assert!(!blocked);

        holder.release();
        let retry = FileLock::open(&path).unwrap();
        assert!(retry.acquire(Duration::from_millis(100)));
        retry.release();
    }
}
