//! List command implementation

use crate::backends::BoxedPort;
use fwcfg_core::session::DeviceSession;

/// Print the device's blob directory
pub fn run_list(session: &DeviceSession<BoxedPort>) {
    let catalog = session.catalog();
    if catalog.is_empty() {
        println!("Device publishes no blobs.");
        return;
    }

    println!("{:<44} {:>10} {:>8}", "Name", "Size", "Key");
    println!("{}", "-".repeat(64));

    for entry in catalog.entries() {
        println!(
            "{:<44} {:>10} {:>8}",
            entry.display_name(),
            format_size(entry.size()),
            format!("{:#06x}", entry.select())
        );
    }

    println!();
    println!("{} blob(s)", catalog.len());
}

fn format_size(bytes: u32) -> String {
    if bytes >= 1024 * 1024 {
        format!("{} MiB", bytes / (1024 * 1024))
    } else if bytes >= 1024 {
        format!("{} KiB", bytes / 1024)
    } else {
        format!("{} B", bytes)
    }
}
