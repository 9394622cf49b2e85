//! Device backend registry
//!
//! Backends are selected with a `name:key=value,...` string, for example
//! `dummy` or `mmio:base=0x9020000,lock=/run/lock/fwcfg.lock`. Each
//! backend supplies a mapped register port and the platform lock that
//! goes with it; the session built here is the only thing the command
//! implementations ever see.

use fwcfg_core::lock::NoPlatformLock;
use fwcfg_core::port::SelectorPort;
use fwcfg_core::session::DeviceSession;
use std::time::Duration;

/// Type-erased register port, so one session type serves every backend
pub type BoxedPort = Box<dyn SelectorPort + Send>;

/// Comma-separated backend names for help text
pub fn backend_names_short() -> &'static str {
    match (cfg!(feature = "dummy"), cfg!(feature = "linux-mmio")) {
        (true, true) => "dummy, mmio",
        (true, false) => "dummy",
        (false, true) => "mmio",
        (false, false) => "none",
    }
}

/// List all supported backends
pub fn list_backends() {
    println!("Supported backends:");
    println!();
    #[cfg(feature = "dummy")]
    println!("  dummy - In-memory device emulator (options: file=<name>=<path>)");
    #[cfg(feature = "linux-mmio")]
    println!("  mmio  - Memory-mapped registers via /dev/mem (options: base=0x..., size=N, lock=<path>)");
}

/// Parse a backend string into name and key-value options
///
/// Format: "name" or "name:key1=value1,key2=value2"
fn parse_backend_spec(spec: &str) -> Result<(&str, Vec<(&str, &str)>), Box<dyn std::error::Error>> {
    let (name, opts_str) = spec.split_once(':').unwrap_or((spec, ""));

    let mut options = Vec::new();
    if !opts_str.is_empty() {
        for opt in opts_str.split(',') {
            if let Some((key, value)) = opt.split_once('=') {
                options.push((key, value));
            } else {
                return Err(
                    format!("invalid parameter format: '{}' (expected key=value)", opt).into(),
                );
            }
        }
    }
    Ok((name, options))
}

/// Open a device session on the backend described by `spec`.
pub fn open_session(
    spec: &str,
    lock_timeout: Duration,
) -> Result<DeviceSession<BoxedPort>, Box<dyn std::error::Error>> {
    let (name, options) = parse_backend_spec(spec)?;

    match name {
        #[cfg(feature = "dummy")]
        "dummy" => {
            let mut device = fwcfg_dummy::DummyDevice::with_sample_files();
            for (key, value) in &options {
                match *key {
                    // file=<name>=<path> loads a host file into the device
                    "file" => {
                        let (blob_name, path) = value.split_once('=').ok_or_else(|| {
                            format!("invalid file option '{}' (expected name=path)", value)
                        })?;
                        let data = std::fs::read(path)?;
                        device.add_file(blob_name, data)?;
                    }
                    _ => log::warn!("unknown dummy option: {}={}", key, value),
                }
            }
            log::info!("dummy device with {} files", device.file_count());
            let session = DeviceSession::open(
                Box::new(device) as BoxedPort,
                Box::new(NoPlatformLock),
                lock_timeout,
            )?;
            Ok(session)
        }

        #[cfg(feature = "linux-mmio")]
        "mmio" => {
            let (port, platform) = fwcfg_linux_mmio::open_mmio(&options)?;
            let session = DeviceSession::open(port, platform, lock_timeout)?;
            Ok(session)
        }

        _ => Err(format!(
            "unknown backend '{}' (available: {})",
            name,
            backend_names_short()
        )
        .into()),
    }
}
