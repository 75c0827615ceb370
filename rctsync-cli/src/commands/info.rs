//! Show disk metadata and change tracking status.

use rctsync::client::{field_text, DiskInfo, RctService, TrackingStatus};

use crate::commands::common::format_size;
use crate::error::CliError;

/// Print the virtual disk info and RCT status of `disk_path`.
pub fn run<S: RctService>(service: &S, disk_path: &str) -> Result<(), CliError> {
    let info = service.disk_info(disk_path)?;
    let status = service.tracking_status(disk_path)?;

    for line in describe(disk_path, &info, &status) {
        println!("{}", line);
    }

    Ok(())
}

fn describe(disk_path: &str, info: &DiskInfo, status: &TrackingStatus) -> Vec<String> {
    let mut lines = vec![
        format!("Disk:     {}", disk_path),
        format!(
            "Size:     {} ({} bytes)",
            format_size(info.virtual_size),
            info.virtual_size
        ),
        format!(
            "RCT:      {}",
            if status.enabled { "enabled" } else { "disabled" }
        ),
    ];

    lines.extend(
        info.extra
            .iter()
            .chain(status.extra.iter())
            .map(|(key, value)| format!("  {}: {}", key, field_text(value))),
    );
    lines
}
