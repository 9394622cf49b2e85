//! Sequential blob read engine
//!
//! The protocol has no random access: a selector write moves the device
//! cursor to offset 0 of the chosen blob, and the only way forward is to
//! read bytes one at a time. Reading from a non-zero offset therefore
//! costs one discarded read per skipped byte. Blobs are read once, start
//! to end, so the O(skip) cost never compounds in practice.

use crate::error::Result;
use crate::guard::AccessGuard;
use crate::port::SelectorPort;

/// Reads blobs through the exclusion guard, one transaction per select.
pub struct BlobReader<'a, P: SelectorPort> {
    guard: &'a AccessGuard<P>,
}

impl<'a, P: SelectorPort> BlobReader<'a, P> {
    /// Create a reader over the session's guard.
    pub fn new(guard: &'a AccessGuard<P>) -> Self {
        Self { guard }
    }

    /// Select `key`, discard `skip` bytes, then fill `out`.
    ///
    /// Runs as one guarded transaction. A `skip` at or beyond the blob's
    /// actual size is undefined by the protocol - the device silently
    /// serves whatever exists past the logical end - so callers must stay
    /// within the declared size.
    pub fn read_blob(&self, key: u16, skip: u64, out: &mut [u8]) -> Result<()> {
        self.with_stream(key, |stream| {
            stream.skip(skip);
            stream.read_exact(out);
            Ok(())
        })
    }

    /// Select `key` and hand `body` the live byte stream.
    ///
    /// The whole callback runs inside a single select-session, so multiple
    /// reads observe one continuous stream with no cursor reset between
    /// them. This is how the directory is decoded: its count header and
    /// all records arrive over one select.
    pub fn with_stream<R, F>(&self, key: u16, body: F) -> Result<R>
    where
        F: FnOnce(&mut BlobStream<'_, P>) -> Result<R>,
    {
        self.guard.with_transaction(|port| {
            port.write_selector(key);
            let mut stream = BlobStream { port };
            body(&mut stream)
        })?
    }
}

/// Byte stream over the currently selected blob.
///
/// Only exists inside a guarded transaction; the device cursor advances
/// with every byte and never rewinds.
pub struct BlobStream<'p, P: SelectorPort> {
    port: &'p mut P,
}

impl<P: SelectorPort> BlobStream<'_, P> {
    /// Discard `count` bytes by reading and ignoring them.
    pub fn skip(&mut self, count: u64) {
        for _ in 0..count {
            self.port.read_byte();
        }
    }

    /// Read exactly `buf.len()` bytes into `buf`.
    pub fn read_exact(&mut self, buf: &mut [u8]) {
        self.port.read_bytes(buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lock::NoPlatformLock;
    use crate::testutil::{MockDevice, Op};
    use alloc::boxed::Box;
    use alloc::vec::Vec;
    use core::time::Duration;

    fn reader_over(blobs: &[(u16, Vec<u8>)]) -> (AccessGuard<MockDevice>, crate::testutil::OpLog) {
        let (device, log) = MockDevice::new(blobs);
        let guard = AccessGuard::new(device, Box::new(NoPlatformLock), Duration::from_secs(1));
        (guard, log)
    }

    #[test]
    fn read_from_offset_zero() {
        let (guard, _log) = reader_over(&[(0x21, b"hello world".to_vec())]);
        let reader = BlobReader::new(&guard);

        let mut out = [0u8; 5];
        reader.read_blob(0x21, 0, &mut out).unwrap();
        assert_eq!(&out, b"hello");
    }

    #[test]
    fn skip_discards_preceding_bytes() {
        let (guard, log) = reader_over(&[(0x21, b"hello world".to_vec())]);
        let reader = BlobReader::new(&guard);

        let mut out = [0u8; 5];
        reader.read_blob(0x21, 6, &mut out).unwrap();
        assert_eq!(&out, b"world");

        // One select, then skip + payload reads, nothing else
        let ops = log.lock().unwrap();
        assert_eq!(ops[0], Op::Select(0x21));
        assert_eq!(ops.len(), 1 + 6 + 5);
        assert!(ops[1..].iter().all(|op| *op == Op::Read(0x21)));
    }

    #[test]
    fn reselect_resets_cursor() {
        let (guard, _log) = reader_over(&[(0x21, b"abcdef".to_vec())]);
        let reader = BlobReader::new(&guard);

        let mut first = [0u8; 3];
        reader.read_blob(0x21, 0, &mut first).unwrap();
        let mut again = [0u8; 3];
        reader.read_blob(0x21, 0, &mut again).unwrap();
        // Second read starts over at offset 0, not where the first stopped
        assert_eq!(first, again);
    }

    #[test]
    fn stream_is_one_select_session() {
        let (guard, log) = reader_over(&[(0x19, b"0123456789".to_vec())]);
        let reader = BlobReader::new(&guard);

        let (mut head, mut tail) = ([0u8; 4], [0u8; 6]);
        reader
            .with_stream(0x19, |stream| {
                stream.read_exact(&mut head);
                stream.read_exact(&mut tail);
                Ok(())
            })
            .unwrap();
        assert_eq!(&head, b"0123");
        assert_eq!(&tail, b"456789");

        let ops = log.lock().unwrap();
        let selects = ops.iter().filter(|op| matches!(op, Op::Select(_))).count();
        assert_eq!(selects, 1);
    }
}
