//! Progress reporting for disk downloads.

/// Cumulative progress of one download.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TransferProgress {
    /// Bytes written so far, counting completed batches only.
    pub bytes_transferred: u64,
    /// Bytes in the whole change set; fixed for the download.
    pub bytes_total: u64,
}

impl TransferProgress {
    /// Create a progress snapshot.
    pub fn new(bytes_transferred: u64, bytes_total: u64) -> Self {
        Self {
            bytes_transferred,
            bytes_total,
        }
    }

    /// Progress as a percentage. An empty transfer counts as complete.
    pub fn percent(&self) -> f64 {
        if self.bytes_total == 0 {
            100.0
        } else {
            (self.bytes_transferred as f64 / self.bytes_total as f64) * 100.0
        }
    }

    /// Whether every byte has been transferred.
    pub fn is_complete(&self) -> bool {
        self.bytes_transferred >= self.bytes_total
    }
}

/// Receives progress after each completed batch.
pub trait ProgressReporter {
    /// Report the cumulative progress of the download.
    fn report(&self, progress: TransferProgress);
}

impl<F> ProgressReporter for F
where
    F: Fn(TransferProgress),
{
    fn report(&self, progress: TransferProgress) {
        self(progress)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    #[test]
    fn test_percent() {
        assert_eq!(TransferProgress::new(0, 1000).percent(), 0.0);
        assert_eq!(TransferProgress::new(250, 1000).percent(), 25.0);
        assert_eq!(TransferProgress::new(1000, 1000).percent(), 100.0);
    }

    #[test]
    fn test_empty_transfer_is_complete() {
        let progress = TransferProgress::new(0, 0);
        assert_eq!(progress.percent(), 100.0);
        assert!(progress.is_complete());
    }

    #[test]
    fn test_closure_reporter() {
        let seen = RefCell::new(Vec::new());
        let reporter = |p: TransferProgress| seen.borrow_mut().push(p);

        reporter.report(TransferProgress::new(10, 20));
        reporter.report(TransferProgress::new(20, 20));

        let seen = seen.into_inner();
        assert_eq!(seen.len(), 2);
        assert!(seen[1].is_complete());
    }
}
