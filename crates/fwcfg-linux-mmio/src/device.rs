//! Register port over a physical memory mapping

use crate::error::{MmioError, Result};
use crate::physmap::PhysMap;
use fwcfg_core::port::SelectorPort;
use log::{debug, info};

/// Byte offset of the 16-bit control (selector) register
const CONTROL_OFFSET: usize = 0;
/// Byte offset of the 8-bit data register
const DATA_OFFSET: usize = 1;

/// Configuration for opening the memory-mapped register pair
#[derive(Debug, Clone)]
pub struct MmioConfig {
    /// Physical base address of the register region
    pub base: u64,
    /// Size of the register region in bytes (at least 2)
    pub size: usize,
}

/// The selector/data register pair, reached through /dev/mem.
///
/// The caller must have validated that the region is the device's and is
/// not shared with any other in-process consumer before opening it.
pub struct MmioPort {
    map: PhysMap,
}

impl MmioPort {
    /// Map the register region described by `config`.
    pub fn open(config: &MmioConfig) -> Result<Self> {
        if config.size < 2 {
            return Err(MmioError::RegionTooSmall(config.size));
        }

        let map = PhysMap::new(config.base, config.size)?;
        info!(
            "mapped firmware config registers at {:#x} ({} bytes)",
            config.base, config.size
        );
        Ok(Self { map })
    }
}

impl SelectorPort for MmioPort {
    fn write_selector(&mut self, key: u16) {
        // to_le() makes the native 16-bit store produce little-endian
        // bytes on either host order
        self.map.write16(CONTROL_OFFSET, key.to_le());
    }

    fn read_byte(&mut self) -> u8 {
        self.map.read8(DATA_OFFSET)
    }
}

/// Parse a string as a hex or decimal u64
fn parse_hex_u64(s: &str) -> std::result::Result<u64, String> {
    if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        u64::from_str_radix(hex, 16).map_err(|e| format!("invalid hex value: {}", e))
    } else {
        s.parse::<u64>().map_err(|e| format!("invalid number: {}", e))
    }
}

/// Parse backend options from key-value pairs
///
/// # Supported options
/// - `base=0x...` - physical base address of the register region (required)
/// - `size=N` - region size in bytes (default 2, just the register pair)
///
/// The `lock=<path>` option is handled separately by [`crate::FileLock`].
pub fn parse_options(options: &[(&str, &str)]) -> Result<MmioConfig> {
    let mut base: Option<u64> = None;
    let mut size: usize = 2;

    for (key, value) in options {
        match *key {
            "base" => {
                base = Some(parse_hex_u64(value).map_err(|message| {
                    MmioError::InvalidParameter {
                        name: "base",
                        message,
                    }
                })?);
            }
            "size" => {
                size = parse_hex_u64(value).map_err(|message| MmioError::InvalidParameter {
                    name: "size",
                    message,
                })? as usize;
            }
            "lock" => {}
            _ => {
                debug!("ignoring unknown mmio option: {}={}", key, value);
            }
        }
    }

    let base = base.ok_or(MmioError::MissingParameter("base"))?;
    Ok(MmioConfig { base, size })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_base_and_size() {
        let config = parse_options(&[("base", "0x510"), ("size", "16")]).unwrap();
        assert_eq!(config.base, 0x510);
        assert_eq!(config.size, 16);
    }

    #[test]
    fn base_is_required() {
        assert!(matches!(
            parse_options(&[("size", "2")]),
            Err(MmioError::MissingParameter("base"))
        ));
    }

    #[test]
    fn rejects_garbage_base() {
        assert!(matches!(
            parse_options(&[("base", "0xzz")]),
            Err(MmioError::InvalidParameter { name: "base", .. })
        ));
    }

    #[test]
    #[ignore] // Requires root and /dev/mem access
    fn map_real_region() {
        // Mapping a live register range needs hardware; the protocol
        // logic is covered against the dummy device instead.
    }
}
