//! Device session lifecycle
//!
//! A session owns the register port from open to close. Opening verifies
//! the device signature, reads the interface revision, and loads the blob
//! directory; after that the session only serves reads. There is no
//! re-scan: to see new device state, close and open a fresh session.

use core::time::Duration;

use alloc::boxed::Box;
use alloc::vec::Vec;

use log::{debug, info};

use crate::catalog::{DirectoryCatalog, DirectoryEntry};
use crate::error::{Error, Result};
use crate::guard::AccessGuard;
use crate::keys;
use crate::lock::PlatformLock;
use crate::port::SelectorPort;
use crate::reader::BlobReader;

/// One attached firmware-configuration device, ready for blob reads.
///
/// The catalog is immutable after open, so lookups are lock-free; only
/// the hardware transactions behind [`lookup_and_read`] serialize.
///
/// [`lookup_and_read`]: DeviceSession::lookup_and_read
pub struct DeviceSession<P: SelectorPort> {
    guard: AccessGuard<P>,
    catalog: DirectoryCatalog,
    revision: u32,
}

impl<P: SelectorPort> DeviceSession<P> {
    /// Attach to the device behind `port`.
    ///
    /// The caller must have reserved the register region exclusively
    /// before this call; `platform` coordinates with firmware agents
    /// outside the process (pass [`NoPlatformLock`] where the platform
    /// has none). Fails with [`Error::DeviceNotPresent`] when the
    /// signature blob does not read back as `"QEMU"`; the port is
    /// dropped, which returns the region to its owner.
    ///
    /// [`NoPlatformLock`]: crate::lock::NoPlatformLock
    pub fn open(
        port: P,
        platform: Box<dyn PlatformLock + Send + Sync>,
        lock_timeout: Duration,
    ) -> Result<Self> {
        let guard = AccessGuard::new(port, platform, lock_timeout);
        let reader = BlobReader::new(&guard);

        let mut signature = [0u8; 4];
        reader.read_blob(keys::SIGNATURE, 0, &mut signature)?;
        if signature != keys::SIGNATURE_MAGIC {
            debug!(
                "signature mismatch: got {:02x?}, want {:02x?}",
                signature,
                keys::SIGNATURE_MAGIC
            );
            return Err(Error::DeviceNotPresent);
        }

        let mut id = [0u8; 4];
        reader.read_blob(keys::INTERFACE_ID, 0, &mut id)?;
        let revision = u32::from_le_bytes(id);

        let catalog = DirectoryCatalog::load(&reader)?;
        info!(
            "firmware config device ready: revision {}, {} blobs",
            revision,
            catalog.len()
        );

        Ok(Self {
            guard,
            catalog,
            revision,
        })
    }

    /// Interface revision the device reported at open.
    pub fn revision(&self) -> u32 {
        self.revision
    }

    /// The directory loaded at open.
    pub fn catalog(&self) -> &DirectoryCatalog {
        &self.catalog
    }

    /// Retrieve the blob named `name`.
    ///
    /// Returns [`Error::NotFound`] without touching the registers when
    /// the name is absent. A present entry of size 0 yields an empty
    /// buffer, not an error. The payload is returned uninterpreted.
    pub fn lookup_and_read(&self, name: &str) -> Result<Vec<u8>> {
        let entry = self.catalog.lookup(name).ok_or(Error::NotFound)?;
        self.read_entry(entry)
    }

    /// Retrieve the payload for a directory entry.
    ///
    /// Reads exactly the declared size from offset 0 in one transaction.
    pub fn read_entry(&self, entry: &DirectoryEntry) -> Result<Vec<u8>> {
        let size = entry.size() as usize;
        let mut payload = Vec::new();
        payload
            .try_reserve_exact(size)
            .map_err(|_| Error::AllocationFailure)?;
        payload.resize(size, 0);

        let reader = BlobReader::new(&self.guard);
        reader.read_blob(entry.select(), 0, &mut payload)?;
        Ok(payload)
    }

    /// Detach from the device and hand the port back to the caller.
    ///
    /// Dropping the session has the same effect, minus the returned
    /// port. A closed session cannot be reopened; construct a new one.
    pub fn close(self) -> P {
        self.guard.into_port()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lock::NoPlatformLock;
    use crate::testutil::{encode_directory, MockDevice, Op, OpLog};
    use std::sync::Arc;
    use std::thread;

    const LOCK_TIMEOUT: Duration = Duration::from_secs(1);

    fn device_with_files(files: &[(&str, &[u8])]) -> (MockDevice, OpLog) {
        let mut blobs: Vec<(u16, Vec<u8>)> = alloc::vec![
            (keys::SIGNATURE, keys::SIGNATURE_MAGIC.to_vec()),
            (keys::INTERFACE_ID, 3u32.to_le_bytes().to_vec()),
        ];
        let mut records = Vec::new();
        for (index, (name, data)) in files.iter().enumerate() {
            let select = keys::FILE_FIRST + index as u16;
            records.push((*name, data.len() as u32, select));
            blobs.push((select, data.to_vec()));
        }
        blobs.push((keys::FILE_DIR, encode_directory(&records)));
        MockDevice::new(&blobs)
    }

    #[test]
    fn open_checks_signature_and_loads_directory() {
        let (device, _log) = device_with_files(&[("bootorder", b"/pci@0/sda")]);
        let session = DeviceSession::open(device, Box::new(NoPlatformLock), LOCK_TIMEOUT).unwrap();
        assert_eq!(session.revision(), 3);
        assert_eq!(session.catalog().len(), 1);
    }

    #[test]
    fn open_rejects_wrong_signature() {
        let (device, log) = MockDevice::new(&[(keys::SIGNATURE, b"KVM1".to_vec())]);
        let result = DeviceSession::open(device, Box::new(NoPlatformLock), LOCK_TIMEOUT);
        assert!(matches!(result, Err(Error::DeviceNotPresent)));
        // Exactly one transaction ran: the signature probe
        let ops = log.lock().unwrap();
        assert_eq!(ops[0], Op::Select(keys::SIGNATURE));
        assert_eq!(ops.len(), 5);
    }

    #[test]
    fn lookup_and_read_returns_declared_size() {
        let payload = b"uncompressed "; // 13 bytes
        let (device, _log) =
            device_with_files(&[("opt/test/a", payload), ("opt/test/b", b"")]);
        let session = DeviceSession::open(device, Box::new(NoPlatformLock), LOCK_TIMEOUT).unwrap();

        let a = session.lookup_and_read("opt/test/a").unwrap();
        assert_eq!(a, payload);

        let b = session.lookup_and_read("opt/test/b").unwrap();
        assert!(b.is_empty());

        assert!(matches!(
            session.lookup_and_read("missing"),
            Err(Error::NotFound)
        ));
    }

    #[test]
    fn not_found_does_not_touch_registers() {
        let (device, log) = device_with_files(&[("present", b"x")]);
        let session = DeviceSession::open(device, Box::new(NoPlatformLock), LOCK_TIMEOUT).unwrap();

        let ops_after_open = log.lock().unwrap().len();
        assert!(matches!(
            session.lookup_and_read("absent"),
            Err(Error::NotFound)
        ));
        assert_eq!(log.lock().unwrap().len(), ops_after_open);
    }

    #[test]
    fn close_returns_the_port() {
        let (device, _log) = device_with_files(&[]);
        let session = DeviceSession::open(device, Box::new(NoPlatformLock), LOCK_TIMEOUT).unwrap();
        let mut port = session.close();
        // The port is usable again by its owner
        port.write_selector(keys::SIGNATURE);
        assert_eq!(port.read_byte(), b'Q');
    }

    #[test]
    fn concurrent_reads_never_interleave_transactions() {
        let big: Vec<u8> = (0..2048u32).map(|i| i as u8).collect();
        let small: Vec<u8> = (0..97u32).map(|i| (i * 3) as u8).collect();
        let (device, log) =
            device_with_files(&[("blob/big", &big), ("blob/small", &small)]);
        let session = Arc::new(
            DeviceSession::open(device, Box::new(NoPlatformLock), LOCK_TIMEOUT).unwrap(),
        );

        let open_ops = log.lock().unwrap().len();

        let mut workers = Vec::new();
        for name in ["blob/big", "blob/small"] {
            let session = Arc::clone(&session);
            workers.push(thread::spawn(move || {
                for _ in 0..20 {
                    session.lookup_and_read(name).unwrap();
                }
            }));
        }
        for worker in workers {
            worker.join().unwrap();
        }

        // Payloads survived the contention untouched
        assert_eq!(session.lookup_and_read("blob/big").unwrap(), big);
        assert_eq!(session.lookup_and_read("blob/small").unwrap(), small);

        // Every select is followed by exactly the reads of its own
        // transaction before the next select appears
        let ops = log.lock().unwrap();
        let mut index = open_ops;
        while index < ops.len() {
            let key = match ops[index] {
                Op::Select(key) => key,
                Op::Read(_) => panic!("read outside a transaction at {}", index),
            };
            let expected = if key == 0x20 { big.len() } else { small.len() };
            for offset in 1..=expected {
                assert_eq!(
                    ops[index + offset],
                    Op::Read(key),
                    "transaction for key {:#x} interleaved at {}",
                    key,
                    index + offset
                );
            }
            index += 1 + expected;
        }
    }
}
