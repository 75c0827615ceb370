//! Download state tracking.

use super::progress::TransferProgress;

/// State of one disk download, returned to the caller as its summary.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransferState {
    /// Number of content requests planned.
    pub total_batches: usize,
    /// Number of content requests fully written.
    pub completed_batches: usize,
    /// Bytes written by completed requests.
    pub bytes_transferred: u64,
    /// Bytes in the change set.
    pub bytes_total: u64,
}

impl TransferState {
    /// Create a new state for a download of `bytes_total` bytes in `total_batches` requests.
    pub fn new(total_batches: usize, bytes_total: u64) -> Self {
        Self {
            total_batches,
            completed_batches: 0,
            bytes_transferred: 0,
            bytes_total,
        }
    }

    /// Record a completed batch.
    pub fn record_batch(&mut self, bytes: u64) {
        self.completed_batches += 1;
        self.bytes_transferred += bytes;
    }

    /// Check if every batch has completed.
    pub fn is_complete(&self) -> bool {
        self.completed_batches == self.total_batches
    }

    /// Current progress snapshot.
    pub fn progress(&self) -> TransferProgress {
        TransferProgress::new(self.bytes_transferred, self.bytes_total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transfer_state_new() {
        let state = TransferState::new(3, 1000);
        assert_eq!(state.completed_batches, 0);
        assert_eq!(state.bytes_transferred, 0);
        assert!(!state.is_complete());
        assert_eq!(state.progress(), TransferProgress::new(0, 1000));
    }

    #[test]
    fn test_record_batch() {
        let mut state = TransferState::new(2, 1000);

        state.record_batch(600);
        assert_eq!(state.progress().percent(), 60.0);
        assert!(!state.is_complete());

        state.record_batch(400);
        assert!(state.is_complete());
        assert!(state.progress().is_complete());
    }

    #[test]
    fn test_empty_download_is_complete() {
        let state = TransferState::new(0, 0);
        assert!(state.is_complete());
    }
}
