//! Client side of the RCT service.
//!
//! The transfer engine only depends on the [`RctService`] trait; the HTTP
//! implementation lives in `http` and can be swapped for a fake in tests.
//!
//! # Architecture
//!
//! ```text
//! RctService (trait)
//!     │
//!     └── HttpRctClient (reqwest, blocking)
//!             │
//!             ├── ServiceConfig / TlsVerification
//!             │
//!             └── ReadChunks (streamed content body → chunks)
//! ```

mod chunks;
mod config;
mod http;
mod types;

pub use chunks::{ReadChunks, DEFAULT_CHUNK_SIZE};
pub use config::{ServiceConfig, TlsVerification, DEFAULT_BASE_URL, DEFAULT_TIMEOUT_SECS};
pub use http::HttpRctClient;
pub use types::{field_text, DiskInfo, TrackingStatus};

use bytes::Bytes;

use crate::error::RctResult;
use crate::range::{ChangeSet, DiskRange};

/// Response body of a content request, as chunks in arrival order.
pub type ChunkStream = Box<dyn Iterator<Item = RctResult<Bytes>> + Send>;

/// Operations offered by the RCT service for one virtual disk.
///
/// Every call fails with [`RctError::RequestFailed`](crate::RctError::RequestFailed)
/// when the service does not answer with a success status.
pub trait RctService: Send + Sync {
    /// Fetch the virtual disk metadata.
    fn disk_info(&self, disk_path: &str) -> RctResult<DiskInfo>;

    /// Fetch the change tracking status.
    fn tracking_status(&self, disk_path: &str) -> RctResult<TrackingStatus>;

    /// Enable or disable change tracking.
    fn set_tracking(&self, disk_path: &str, enabled: bool) -> RctResult<()>;

    /// Ranges changed since the checkpoint `rct_id`, sorted by offset.
    fn changes(&self, disk_path: &str, rct_id: &str) -> RctResult<ChangeSet>;

    /// Request the content of `ranges`.
    ///
    /// The stream carries exactly the bytes of each range, concatenated in
    /// the order given.
    fn range_content(&self, disk_path: &str, ranges: &[DiskRange]) -> RctResult<ChunkStream>;
}

impl<T: RctService + ?Sized> RctService for &T {
    fn disk_info(&self, disk_path: &str) -> RctResult<DiskInfo> {
        (**self).disk_info(disk_path)
    }

    fn tracking_status(&self, disk_path: &str) -> RctResult<TrackingStatus> {
        (**self).tracking_status(disk_path)
    }

    fn set_tracking(&self, disk_path: &str, enabled: bool) -> RctResult<()> {
        (**self).set_tracking(disk_path, enabled)
    }

    fn changes(&self, disk_path: &str, rct_id: &str) -> RctResult<ChangeSet> {
        (**self).changes(disk_path, rct_id)
    }

    fn range_content(&self, disk_path: &str, ranges: &[DiskRange]) -> RctResult<ChunkStream> {
        (**self).range_content(disk_path, ranges)
    }
}
