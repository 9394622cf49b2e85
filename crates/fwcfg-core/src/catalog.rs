//! Blob directory decoding and lookup
//!
//! The device publishes a directory of every file blob it carries under a
//! well-known key. The directory is itself a blob: a big-endian 32-bit
//! entry count followed by fixed-size records, all served as one
//! continuous byte stream.

use alloc::string::String;
use alloc::vec::Vec;

use crate::error::{Error, Result};
use crate::keys;
#[cfg(feature = "std")]
use crate::port::SelectorPort;
#[cfg(feature = "std")]
use crate::reader::BlobReader;

/// Capacity of the name field in a directory record.
pub const ENTRY_NAME_LEN: usize = 56;

/// Size of one directory record: u32 size + u16 select + u16 reserved +
/// 56-byte name.
pub const ENTRY_LEN: usize = 64;

/// One file published by the device.
///
/// Numeric fields arrive big-endian on the wire. The name is a
/// NUL-terminated (or NUL-padded) byte string; it is kept verbatim up to
/// the first NUL and matched by exact byte equality.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryEntry {
    size: u32,
    select: u16,
    name: heapless::Vec<u8, ENTRY_NAME_LEN>,
}

impl DirectoryEntry {
    /// Declared payload size in bytes. Zero is legal.
    pub fn size(&self) -> u32 {
        self.size
    }

    /// Selector key addressing this blob.
    pub fn select(&self) -> u16 {
        self.select
    }

    /// Raw name bytes, NUL padding stripped.
    pub fn name_bytes(&self) -> &[u8] {
        &self.name
    }

    /// Name for display; invalid UTF-8 is replaced, not rejected.
    pub fn display_name(&self) -> String {
        String::from_utf8_lossy(&self.name).into_owned()
    }

    fn decode(record: &[u8; ENTRY_LEN]) -> Self {
        let size = u32::from_be_bytes([record[0], record[1], record[2], record[3]]);
        let select = u16::from_be_bytes([record[4], record[5]]);
        let raw_name = &record[8..];
        let name_len = raw_name
            .iter()
            .position(|&b| b == 0)
            .unwrap_or(raw_name.len());
        // The slice is at most ENTRY_NAME_LEN bytes, so this cannot overflow
        let name = heapless::Vec::from_slice(&raw_name[..name_len]).unwrap_or_default();
        Self { size, select, name }
    }
}

/// Immutable name -> (size, select) directory, built once per session.
///
/// Lookups never touch the hardware, so a loaded catalog can be shared
/// across threads freely.
pub struct DirectoryCatalog {
    entries: Vec<DirectoryEntry>,
}

impl DirectoryCatalog {
    /// Fetch and decode the directory blob.
    ///
    /// The count header and every record are read as one continuous
    /// select-session; the device cursor is never reset between records.
    #[cfg(feature = "std")]
    pub fn load<P: SelectorPort>(reader: &BlobReader<'_, P>) -> Result<Self> {
        reader.with_stream(keys::FILE_DIR, |stream| {
            let mut count_field = [0u8; 4];
            stream.read_exact(&mut count_field);
            let count = u32::from_be_bytes(count_field) as usize;

            let mut entries = Vec::new();
            entries
                .try_reserve_exact(count)
                .map_err(|_| Error::AllocationFailure)?;

            let mut record = [0u8; ENTRY_LEN];
            for _ in 0..count {
                stream.read_exact(&mut record);
                entries.push(DirectoryEntry::decode(&record));
            }
            log::debug!("directory decoded: {} entries", entries.len());
            Ok(Self { entries })
        })
    }

    /// Find the first entry whose name matches `name` exactly.
    ///
    /// Duplicate names are a device-data anomaly; the first record wins
    /// and later ones are unreachable by name.
    pub fn lookup(&self, name: &str) -> Option<&DirectoryEntry> {
        self.entries
            .iter()
            .find(|entry| entry.name_bytes() == name.as_bytes())
    }

    /// Number of entries in the directory.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when the device publishes no file blobs.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All entries, in directory order.
    pub fn entries(&self) -> &[DirectoryEntry] {
        &self.entries
    }
}
