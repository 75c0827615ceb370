//! Demultiplexing of a batch's content stream into its sub-ranges.
//!
//! The service answers a batch with one body holding the bytes of every
//! sub-range back to back, in request order, cut into chunks of whatever
//! size the transport produces. [`demux`] walks a cursor over the sub-ranges
//! and seeks the extent explicitly at every range boundary, so a short or
//! long stream shows up as a byte count mismatch rather than as data written
//! at the wrong offset.

use bytes::Bytes;

use super::extent::OutputExtent;
use crate::error::{RctError, RctResult};
use crate::range::{total_length, DiskRange};

/// Position within the sub-ranges of a batch.
struct RangeCursor<'a> {
    ranges: &'a [DiskRange],
    index: usize,
    written_in_current: u64,
}

impl<'a> RangeCursor<'a> {
    fn new(ranges: &'a [DiskRange]) -> Self {
        Self {
            ranges,
            index: 0,
            written_in_current: 0,
        }
    }

    fn current(&self) -> Option<&DiskRange> {
        self.ranges.get(self.index)
    }

    /// Bytes still wanted by the current range.
    fn wanted(&self) -> u64 {
        self.current()
            .map(|range| range.length - self.written_in_current)
            .unwrap_or(0)
    }

    /// Absolute disk offset of the next byte to write.
    fn position(&self) -> u64 {
        self.current()
            .map(|range| range.offset + self.written_in_current)
            .unwrap_or(0)
    }

    /// Move past every completed range while more remain, seeking the extent
    /// to the start of the range the cursor lands on.
    fn advance<E: OutputExtent + ?Sized>(&mut self, extent: &mut E) -> RctResult<()> {
        while self.wanted() == 0 && self.index + 1 < self.ranges.len() {
            self.index += 1;
            self.written_in_current = 0;
            seek(extent, self.ranges[self.index].offset)?;
        }
        Ok(())
    }
}

fn seek<E: OutputExtent + ?Sized>(extent: &mut E, offset: u64) -> RctResult<()> {
    extent
        .seek_to(offset)
        .map_err(|source| RctError::WriteFailed { offset, source })
}

/// Write a batch's content stream to the extent, range by range.
///
/// `ranges` are the sub-ranges of the batch in the order they were
/// requested; `chunks` is the response body. Chunks may be empty, smaller
/// than a range, or span several ranges.
///
/// Returns the number of bytes written. Fails with
/// [`RctError::IncompleteStream`] if the stream ends early or carries bytes
/// past the last range, and passes through any error yielded by `chunks`.
pub fn demux<E, I>(ranges: &[DiskRange], chunks: I, extent: &mut E) -> RctResult<u64>
where
    E: OutputExtent + ?Sized,
    I: IntoIterator<Item = RctResult<Bytes>>,
{
    let expected = total_length(ranges);
    let mut cursor = RangeCursor::new(ranges);
    let mut total_written = 0u64;

    if let Some(first) = ranges.first() {
        seek(extent, first.offset)?;
        cursor.advance(extent)?;
    }

    for chunk in chunks {
        let mut chunk = chunk?;

        while !chunk.is_empty() {
            let wanted = cursor.wanted();
            if wanted == 0 {
                return Err(RctError::IncompleteStream {
                    expected,
                    received: total_written + chunk.len() as u64,
                });
            }

            let take = wanted.min(chunk.len() as u64) as usize;
            let buf = chunk.split_to(take);
            let offset = cursor.position();
            extent
                .write_bytes(&buf)
                .map_err(|source| RctError::WriteFailed { offset, source })?;

            cursor.written_in_current += take as u64;
            total_written += take as u64;
            cursor.advance(extent)?;
        }
    }

    if total_written != expected {
        return Err(RctError::IncompleteStream {
            expected,
            received: total_written,
        });
    }

    Ok(total_written)
}
