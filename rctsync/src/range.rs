//! Byte ranges of a virtual disk and the change sets built from them.

use serde::{Deserialize, Serialize};

/// A contiguous span of a virtual disk's byte address space.
///
/// Serializes as `{"offset": n, "length": n}`, the shape used by both the
/// change query response and the content request body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DiskRange {
    /// Byte offset from the start of the disk.
    pub offset: u64,
    /// Number of bytes.
    pub length: u64,
}

impl DiskRange {
    /// Create a new range.
    pub fn new(offset: u64, length: u64) -> Self {
        Self { offset, length }
    }

    /// Offset one past the last byte of the range.
    pub fn end(&self) -> u64 {
        self.offset + self.length
    }

    /// Whether the range covers no bytes.
    pub fn is_empty(&self) -> bool {
        self.length == 0
    }
}

/// Sum of the lengths of `ranges`.
pub fn total_length(ranges: &[DiskRange]) -> u64 {
    ranges.iter().map(|r| r.length).sum()
}

/// Ordered set of ranges to transfer for one download.
///
/// Either the whole disk or the deltas reported by a change query. Ranges
/// are expected to be sorted by offset and pairwise disjoint; this is not
/// checked.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChangeSet {
    ranges: Vec<DiskRange>,
}

impl ChangeSet {
    /// A change set covering a whole disk of `virtual_size` bytes.
    pub fn full_disk(virtual_size: u64) -> Self {
        Self {
            ranges: vec![DiskRange::new(0, virtual_size)],
        }
    }

    /// The ranges, in order.
    pub fn ranges(&self) -> &[DiskRange] {
        &self.ranges
    }

    /// Iterate over the ranges in order.
    pub fn iter(&self) -> std::slice::Iter<'_, DiskRange> {
        self.ranges.iter()
    }

    /// Number of ranges.
    pub fn len(&self) -> usize {
        self.ranges.len()
    }

    /// Whether there is nothing to transfer.
    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    /// Total bytes covered by the change set.
    pub fn total_length(&self) -> u64 {
        total_length(&self.ranges)
    }
}

impl From<Vec<DiskRange>> for ChangeSet {
    fn from(ranges: Vec<DiskRange>) -> Self {
        Self { ranges }
    }
}

impl<'a> IntoIterator for &'a ChangeSet {
    type Item = &'a DiskRange;
    type IntoIter = std::slice::Iter<'a, DiskRange>;

    fn into_iter(self) -> Self::IntoIter {
        self.ranges.iter()
    }
}
