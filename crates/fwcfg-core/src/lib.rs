//! fwcfg-core - Core library for the QEMU firmware-configuration device
//!
//! This crate implements the read side of the fw_cfg selector/data register
//! protocol: selecting a blob by its 16-bit key, streaming its bytes through
//! the 8-bit data register, and decoding the file directory the device
//! publishes under a well-known key.
//!
//! The crate does not discover or map the device itself. A backend hands in
//! an already-mapped register pair as a [`port::SelectorPort`] implementation
//! and, optionally, a [`lock::PlatformLock`] to coordinate with firmware
//! agents outside this process.
//!
//! # Features
//!
//! - `std` - Enable standard library support (includes `alloc`); required
//!   for [`session::DeviceSession`] and the transaction guard
//! - `alloc` - Enable heap allocation for the directory catalog
//!
//! # Example
//!
//! ```ignore
//! use fwcfg_core::lock::NoPlatformLock;
//! use fwcfg_core::session::DeviceSession;
//!
//! let session = DeviceSession::open(port, Box::new(NoPlatformLock), timeout)?;
//! let kernel_cmdline = session.lookup_and_read("etc/kernel-cmdline")?;
//! ```

#![no_std]
#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

#[cfg(feature = "alloc")]
extern crate alloc;

#[cfg(feature = "std")]
extern crate std;

#[cfg(feature = "alloc")]
pub mod catalog;
pub mod error;
#[cfg(feature = "std")]
pub mod guard;
pub mod keys;
pub mod lock;
pub mod port;
#[cfg(feature = "std")]
pub mod reader;
#[cfg(feature = "std")]
pub mod session;
#[cfg(all(test, feature = "std"))]
pub(crate) mod testutil;

pub use error::{Error, Result};
