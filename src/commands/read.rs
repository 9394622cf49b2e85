//! Read command implementation

use crate::backends::BoxedPort;
use fwcfg_core::session::DeviceSession;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Read one blob by name and write it to a file or stdout
pub fn run_read(
    session: &DeviceSession<BoxedPort>,
    name: &str,
    output: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let payload = session.lookup_and_read(name)?;
    log::debug!("read '{}': {} bytes", name, payload.len());

    match output {
        Some(path) => {
            let mut file = File::create(path)?;
            file.write_all(&payload)?;
            println!("Wrote {} bytes to {:?}", payload.len(), path);
        }
        None => {
            // Payloads are raw bytes; write them unmangled
            std::io::stdout().write_all(&payload)?;
        }
    }
    Ok(())
}
