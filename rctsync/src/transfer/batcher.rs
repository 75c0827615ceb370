//! Grouping of changed ranges into budget-sized content requests.
//!
//! The batcher is a pure function of the change set and the per-request
//! budget, so the layout of every request can be checked without a server.

use tracing::debug;

use crate::range::{total_length, DiskRange};

/// Default maximum number of disk bytes requested at once (20 MiB).
pub const DEFAULT_MAX_BYTES_PER_REQUEST: u64 = 20 * 1024 * 1024;

/// Ranges sent together in a single content request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Batch {
    ranges: Vec<DiskRange>,
}

impl Batch {
    /// Create a batch from an ordered list of sub-ranges.
    pub fn new(ranges: Vec<DiskRange>) -> Self {
        Self { ranges }
    }

    /// The sub-ranges, in request order.
    pub fn ranges(&self) -> &[DiskRange] {
        &self.ranges
    }

    /// Number of sub-ranges.
    pub fn len(&self) -> usize {
        self.ranges.len()
    }

    /// Whether the batch has no sub-ranges.
    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    /// Bytes requested by this batch.
    pub fn total_length(&self) -> u64 {
        total_length(&self.ranges)
    }

    /// Consume the batch, returning its sub-ranges.
    pub fn into_ranges(self) -> Vec<DiskRange> {
        self.ranges
    }
}

/// Batch under construction.
#[derive(Default)]
struct PendingBatch {
    ranges: Vec<DiskRange>,
    accumulated: u64,
}

impl PendingBatch {
    fn push(&mut self, range: DiskRange) {
        self.accumulated += range.length;
        self.ranges.push(range);
    }

    fn flush_into(&mut self, batches: &mut Vec<Batch>) {
        if !self.ranges.is_empty() {
            batches.push(Batch::new(std::mem::take(&mut self.ranges)));
        }
        self.accumulated = 0;
    }
}

/// Split `changes` into request batches of at most `max_bytes_per_request` bytes.
///
/// A budget of `0` disables batching: every change becomes its own batch,
/// unsplit. Otherwise consecutive changes share a batch until it is full.
/// A change that does not fit in the room left is carved so that its first
/// piece fills the current batch; every further piece of the same change
/// is sent on its own, with a length of at most the budget.
///
/// Concatenating the returned batches reproduces `changes` exactly, with
/// extra boundaries where changes were split. Zero-length changes are
/// dropped.
pub fn batch_ranges(changes: &[DiskRange], max_bytes_per_request: u64) -> Vec<Batch> {
    let mut batches = Vec::new();

    if max_bytes_per_request == 0 {
        batches.extend(
            changes
                .iter()
                .filter(|change| !change.is_empty())
                .map(|change| Batch::new(vec![*change])),
        );
        return batches;
    }

    let budget = max_bytes_per_request;
    let mut pending = PendingBatch::default();

    for change in changes.iter().filter(|change| !change.is_empty()) {
        let mut offset = change.offset;
        let mut remaining = change.length;

        let take = remaining.min(budget - pending.accumulated);
        pending.push(DiskRange::new(offset, take));
        if pending.accumulated == budget {
            pending.flush_into(&mut batches);
        }
        offset += take;
        remaining -= take;

        while remaining > 0 {
            debug!(offset, remaining, "Range split due to transfer size limit");
            let take = remaining.min(budget);
            pending.push(DiskRange::new(offset, take));
            pending.flush_into(&mut batches);
            offset += take;
            remaining -= take;
        }
    }

    pending.flush_into(&mut batches);
    batches
}
