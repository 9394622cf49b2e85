//! fwcfg-dummy - In-memory firmware-configuration device emulator
//!
//! This crate provides a dummy device that serves the selector/data
//! protocol entirely from memory. It's useful for testing and development
//! without a real device: it keeps the real cursor semantics (a selector
//! write resets the cursor, every data read advances it, reads past the
//! logical end return zero bytes) and encodes its directory exactly the
//! way the hardware does.

use std::collections::BTreeMap;

use fwcfg_core::catalog::ENTRY_NAME_LEN;
use fwcfg_core::keys;
use fwcfg_core::port::SelectorPort;
use thiserror::Error as ThisError;

/// Errors from building up the emulated device contents
#[derive(ThisError, Debug, PartialEq, Eq)]
pub enum Error {
    /// A directory name longer than the 56-byte record field
    #[error("file name '{0}' exceeds {ENTRY_NAME_LEN} bytes")]
    NameTooLong(String),

    /// The directory already carries this name
    #[error("file '{0}' already exists")]
    FileAlreadyExists(String),

    /// All file selector keys are taken
    #[error("out of file selector keys")]
    OutOfSelectors,
}

struct DirFile {
    name: String,
    size: u32,
    select: u16,
}

/// Emulated firmware-configuration device.
///
/// Tracks the selected key and the byte offset within the selected blob,
/// exactly like the hardware's single shared cursor.
pub struct DummyDevice {
    blobs: BTreeMap<u16, Vec<u8>>,
    files: Vec<DirFile>,
    next_select: u16,
    selected: u16,
    cursor: usize,
}

impl DummyDevice {
    /// Create a device carrying only the signature, the given interface
    /// revision, and an empty directory.
    pub fn new(revision: u32) -> Self {
        let mut blobs = BTreeMap::new();
        blobs.insert(keys::SIGNATURE, keys::SIGNATURE_MAGIC.to_vec());
        blobs.insert(keys::INTERFACE_ID, revision.to_le_bytes().to_vec());

        let mut device = Self {
            blobs,
            files: Vec::new(),
            next_select: keys::FILE_FIRST,
            selected: 0,
            cursor: 0,
        };
        device.rebuild_directory();
        device
    }

    /// Create a device pre-populated with a few sample files.
    pub fn with_sample_files() -> Self {
        let mut device = Self::new(3);
        for (name, data) in [
            ("bootorder", &b"/pci@i0cf8/ethernet@3\n/pci@i0cf8/scsi@4/disk@0,0\n"[..]),
            ("etc/system-uuid", &b"37e02bd6-6baf-4e43-9f5c-8e3e8b2a1f01"[..]),
            ("opt/org.fwcfg/banner", &b"dummy firmware configuration device\n"[..]),
        ] {
            // Names are short and unique, insertion cannot fail
            let _ = device.add_file(name, data.to_vec());
        }
        device
    }

    /// Publish `data` under `name`, assigning the next free selector.
    ///
    /// Returns the selector key the blob was registered under.
    pub fn add_file(&mut self, name: &str, data: Vec<u8>) -> Result<u16, Error> {
        if name.len() > ENTRY_NAME_LEN {
            return Err(Error::NameTooLong(name.to_owned()));
        }
        if self.files.iter().any(|file| file.name == name) {
            return Err(Error::FileAlreadyExists(name.to_owned()));
        }
        let select = self.next_select;
        self.next_select = self.next_select.checked_add(1).ok_or(Error::OutOfSelectors)?;

        log::debug!("dummy: adding '{}' ({} bytes) at key {:#x}", name, data.len(), select);
        self.files.push(DirFile {
            name: name.to_owned(),
            size: data.len() as u32,
            select,
        });
        self.blobs.insert(select, data);
        self.rebuild_directory();
        Ok(select)
    }

    /// Replace the signature blob, e.g. to emulate an absent device.
    pub fn set_signature(&mut self, signature: [u8; 4]) {
        self.blobs.insert(keys::SIGNATURE, signature.to_vec());
    }

    /// Number of files in the directory.
    pub fn file_count(&self) -> usize {
        self.files.len()
    }

    // Directory blob: u32 be count, then per file u32 be size, u16 be
    // select, u16 reserved, 56-byte NUL-padded name.
    fn rebuild_directory(&mut self) {
        let mut dir = Vec::with_capacity(4 + 64 * self.files.len());
        dir.extend_from_slice(&(self.files.len() as u32).to_be_bytes());
        for file in &self.files {
            dir.extend_from_slice(&file.size.to_be_bytes());
            dir.extend_from_slice(&file.select.to_be_bytes());
            dir.extend_from_slice(&[0u8; 2]);
            let mut name_field = [0u8; ENTRY_NAME_LEN];
            name_field[..file.name.len()].copy_from_slice(file.name.as_bytes());
            dir.extend_from_slice(&name_field);
        }
        self.blobs.insert(keys::FILE_DIR, dir);
    }
}

impl SelectorPort for DummyDevice {
    fn write_selector(&mut self, key: u16) {
        self.selected = key;
        self.cursor = 0;
    }

    fn read_byte(&mut self) -> u8 {
        let byte = self
            .blobs
            .get(&self.selected)
            .and_then(|data| data.get(self.cursor))
            .copied()
            .unwrap_or(0);
        self.cursor += 1;
        byte
    }
}
