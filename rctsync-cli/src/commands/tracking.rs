//! Enable or disable resilient change tracking.

use rctsync::client::RctService;
use tracing::info;

use crate::error::CliError;

/// Switch change tracking on or off and print the resulting status.
pub fn run<S: RctService>(service: &S, disk_path: &str, enabled: bool) -> Result<(), CliError> {
    service.set_tracking(disk_path, enabled)?;
    info!(disk = disk_path, enabled, "Change tracking updated");

    let status = service.tracking_status(disk_path)?;
    println!("RCT status: {}", status);

    if status.enabled != enabled {
        return Err(CliError::TrackingNotApplied {
            disk_path: disk_path.to_string(),
            enabled: status.enabled,
        });
    }

    Ok(())
}
