//! Extract command implementation

use crate::backends::BoxedPort;
use fwcfg_core::session::DeviceSession;
use indicatif::{ProgressBar, ProgressStyle};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Read every blob in the directory into `output_dir`
pub fn run_extract(
    session: &DeviceSession<BoxedPort>,
    output_dir: &Path,
) -> Result<(), Box<dyn std::error::Error>> {
    let catalog = session.catalog();
    if catalog.is_empty() {
        println!("Device publishes no blobs.");
        return Ok(());
    }

    fs::create_dir_all(output_dir)?;

    let pb = ProgressBar::new(catalog.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
            .progress_chars("#>-"),
    );

    let mut total_bytes = 0usize;
    for entry in catalog.entries() {
        let name = entry.display_name();
        pb.set_message(name.clone());

        let payload = session.read_entry(entry)?;
        total_bytes += payload.len();

        let target = output_dir.join(blob_path(&name, entry.select()));
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut file = fs::File::create(&target)?;
        file.write_all(&payload)?;
        log::debug!("extracted '{}' ({} bytes) to {:?}", name, payload.len(), target);

        pb.inc(1);
    }
    pb.finish_and_clear();

    println!(
        "Extracted {} blob(s), {} bytes total, to {:?}",
        catalog.len(),
        total_bytes,
        output_dir
    );
    Ok(())
}

/// Map a blob name to a relative path under the output root.
///
/// Blob names use '/' separators; empty, "." and ".." components are
/// dropped so a hostile name cannot escape the output directory. A name
/// with nothing left falls back to the selector key.
fn blob_path(name: &str, select: u16) -> PathBuf {
    let path: PathBuf = name
        .split('/')
        .filter(|component| !component.is_empty() && *component != "." && *component != "..")
        .collect();

    if path.as_os_str().is_empty() {
        PathBuf::from(format!("key-{:#06x}", select))
    } else {
        path
    }
}
