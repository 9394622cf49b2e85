//! Well-known selector keys
//!
//! The device reserves the low selector range for control items. File
//! blobs registered in the directory start at [`FILE_FIRST`].

/// Device signature, 4 ASCII bytes ("QEMU" when the device is present)
pub const SIGNATURE: u16 = 0x00;
/// Interface revision, 32-bit little-endian
pub const INTERFACE_ID: u16 = 0x01;
/// File directory: big-endian count followed by fixed-size file records
pub const FILE_DIR: u16 = 0x19;
/// First selector assigned to file blobs
pub const FILE_FIRST: u16 = 0x20;

/// Expected contents of the signature blob
pub const SIGNATURE_MAGIC: [u8; 4] = *b"QEMU";
