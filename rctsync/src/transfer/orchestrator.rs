//! Disk download orchestration.
//!
//! Looks up what to transfer, splits it into batches and drains the batches
//! one at a time into the output extent.

use tracing::{debug, info};

use super::batcher::{batch_ranges, Batch, DEFAULT_MAX_BYTES_PER_REQUEST};
use super::demux::demux;
use super::extent::OutputExtent;
use super::progress::ProgressReporter;
use super::state::TransferState;
use crate::client::{DiskInfo, RctService};
use crate::error::{RctError, RctResult};
use crate::range::ChangeSet;

/// Everything needed to run a download, resolved from the service.
#[derive(Debug, Clone)]
pub struct DownloadPlan {
    /// Metadata of the disk being downloaded.
    pub disk_info: DiskInfo,
    /// Ranges to transfer.
    pub changes: ChangeSet,
    /// Content requests, in the order they will be issued.
    pub batches: Vec<Batch>,
}

impl DownloadPlan {
    /// Bytes that will be transferred.
    pub fn total_bytes(&self) -> u64 {
        self.changes.total_length()
    }
}

/// Downloads the full content or the changed ranges of a remote virtual disk.
///
/// Batches are requested strictly in sequence: the next request is issued
/// only after the previous response has been fully written. Nothing is
/// retried; the first failure aborts the download, leaving the bytes of
/// completed batches in place.
#[derive(Debug)]
pub struct DiskDownloader<S> {
    service: S,
    max_bytes_per_request: u64,
}

impl<S: RctService> DiskDownloader<S> {
    /// Create a downloader with the default request budget.
    pub fn new(service: S) -> Self {
        Self::with_max_bytes_per_request(service, DEFAULT_MAX_BYTES_PER_REQUEST)
    }

    /// Create a downloader requesting at most `max_bytes_per_request` bytes
    /// at once. `0` issues one request per changed range.
    pub fn with_max_bytes_per_request(service: S, max_bytes_per_request: u64) -> Self {
        Self {
            service,
            max_bytes_per_request,
        }
    }

    /// The request budget in bytes.
    pub fn max_bytes_per_request(&self) -> u64 {
        self.max_bytes_per_request
    }

    /// The underlying service.
    pub fn service(&self) -> &S {
        &self.service
    }

    /// Resolve what a download of `disk_path` would transfer.
    ///
    /// With an `rct_id` only the ranges changed since that checkpoint are
    /// planned, and change tracking must be enabled; otherwise the whole
    /// disk is.
    pub fn plan(&self, disk_path: &str, rct_id: Option<&str>) -> RctResult<DownloadPlan> {
        let disk_info = self.service.disk_info(disk_path)?;
        info!("Virtual disk info: {}", disk_info);

        let changes = match rct_id {
            Some(rct_id) => {
                let status = self.service.tracking_status(disk_path)?;
                info!("RCT status: {}", status);

                if !status.enabled {
                    return Err(RctError::TrackingDisabled {
                        disk_path: disk_path.to_string(),
                    });
                }

                let changes = self.service.changes(disk_path, rct_id)?;
                info!("Disk changes: {}", changes.len());
                info!("Total bytes: {}", changes.total_length());
                changes
            }
            None => {
                info!(
                    "Retrieving entire disk content. Total bytes: {}",
                    disk_info.virtual_size
                );
                ChangeSet::full_disk(disk_info.virtual_size)
            }
        };

        let batches = batch_ranges(changes.ranges(), self.max_bytes_per_request);
        debug!(
            batches = batches.len(),
            max_bytes_per_request = self.max_bytes_per_request,
            "Planned content requests"
        );

        Ok(DownloadPlan {
            disk_info,
            changes,
            batches,
        })
    }

    /// Download `disk_path` into `extent`.
    ///
    /// Equivalent to [`plan`](Self::plan) followed by [`execute`](Self::execute).
    pub fn download<E: OutputExtent + ?Sized>(
        &self,
        disk_path: &str,
        rct_id: Option<&str>,
        extent: &mut E,
        progress: Option<&dyn ProgressReporter>,
    ) -> RctResult<TransferState> {
        let plan = self.plan(disk_path, rct_id)?;
        self.execute(disk_path, &plan, extent, progress)
    }

    /// Size `extent` to the virtual disk and transfer every batch of `plan`.
    ///
    /// `progress` is called after each batch with the cumulative byte count.
    pub fn execute<E: OutputExtent + ?Sized>(
        &self,
        disk_path: &str,
        plan: &DownloadPlan,
        extent: &mut E,
        progress: Option<&dyn ProgressReporter>,
    ) -> RctResult<TransferState> {
        let virtual_size = plan.disk_info.virtual_size;
        extent
            .resize(virtual_size)
            .map_err(|source| RctError::ResizeFailed {
                len: virtual_size,
                source,
            })?;

        let mut state = TransferState::new(plan.batches.len(), plan.total_bytes());

        for (i, batch) in plan.batches.iter().enumerate() {
            if let Some(first) = batch.ranges().first() {
                info!(
                    "Requesting disk data {}/{}. Offset: {}, length: {}, ranges: {}",
                    i + 1,
                    plan.batches.len(),
                    first.offset,
                    batch.total_length(),
                    batch.len()
                );
            }

            let chunks = self.service.range_content(disk_path, batch.ranges())?;
            let written = demux(batch.ranges(), chunks, extent)?;

            state.record_batch(written);
            if let Some(reporter) = progress {
                reporter.report(state.progress());
            }
        }

        Ok(state)
    }
}
