//! Scripted in-memory device for protocol tests
//!
//! Records every register access so tests can assert on transaction
//! ordering, not just on the bytes returned.

use alloc::collections::BTreeMap;
use alloc::vec::Vec;
use std::sync::{Arc, Mutex};

use crate::port::SelectorPort;

/// One register access as seen by the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    /// Selector write with the given key
    Select(u16),
    /// Data-register read while the given key was selected
    Read(u16),
}

/// Shared access log, usable while the device is owned by a guard.
pub type OpLog = Arc<Mutex<Vec<Op>>>;

pub struct MockDevice {
    blobs: BTreeMap<u16, Vec<u8>>,
    selected: u16,
    cursor: usize,
    log: OpLog,
}

impl MockDevice {
    pub fn new(blobs: &[(u16, Vec<u8>)]) -> (Self, OpLog) {
        let log: OpLog = Arc::new(Mutex::new(Vec::new()));
        let device = Self {
            blobs: blobs.iter().cloned().collect(),
            selected: 0,
            cursor: 0,
            log: Arc::clone(&log),
        };
        (device, log)
    }
}

impl SelectorPort for MockDevice {
    fn write_selector(&mut self, key: u16) {
        self.selected = key;
        self.cursor = 0;
        self.log.lock().unwrap().push(Op::Select(key));
    }

    fn read_byte(&mut self) -> u8 {
        // Reads past the logical end return whatever the device has there;
        // the mock models that as zero bytes.
        let byte = self
            .blobs
            .get(&self.selected)
            .and_then(|data| data.get(self.cursor))
            .copied()
            .unwrap_or(0);
        self.cursor += 1;
        self.log.lock().unwrap().push(Op::Read(self.selected));
        byte
    }
}

/// Encode a directory blob: big-endian count, then 64-byte records.
pub fn encode_directory(files: &[(&str, u32, u16)]) -> Vec<u8> {
    let mut blob = Vec::with_capacity(4 + 64 * files.len());
    blob.extend_from_slice(&(files.len() as u32).to_be_bytes());
    for &(name, size, select) in files {
        blob.extend_from_slice(&size.to_be_bytes());
        blob.extend_from_slice(&select.to_be_bytes());
        blob.extend_from_slice(&[0u8; 2]);
        let mut field = [0u8; 56];
        field[..name.len()].copy_from_slice(name.as_bytes());
        blob.extend_from_slice(&field);
    }
    blob
}
