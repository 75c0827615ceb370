//! Range-batched download of virtual disk content.
//!
//! This module provides the transfer engine:
//! - Grouping of changed ranges into budget-sized requests (`batcher`)
//! - Re-segmenting a request's byte stream into its ranges (`demux`)
//! - Random-access output targets (`extent`)
//! - Progress reporting and download state (`progress`, `state`)
//! - High-level download orchestration (`orchestrator`)
//!
//! # Architecture
//!
//! ```text
//! DiskDownloader (orchestrator)
//!         │
//!         ├── RctService (disk info, tracking status, changes, content)
//!         │
//!         ├── batch_ranges (ChangeSet → Vec<Batch>)
//!         │
//!         ├── demux (chunk stream → OutputExtent, per batch)
//!         │
//!         └── TransferState / ProgressReporter
//! ```
//!
//! # Example
//!
//! ```ignore
//! use std::fs::OpenOptions;
//! use rctsync::client::{HttpRctClient, ServiceConfig};
//! use rctsync::transfer::{DiskDownloader, TransferProgress};
//!
//! let client = HttpRctClient::new(ServiceConfig::new("https://hyperv01:6677", "key"))?;
//! let downloader = DiskDownloader::with_max_bytes_per_request(client, 20 * 1024 * 1024);
//!
//! let mut file = OpenOptions::new().write(true).create(true).open("disk.raw")?;
//! let report = |p: TransferProgress| println!("{:.1}%", p.percent());
//! downloader.download("C:\\VMs\\disk.vhdx", Some("rctX:..."), &mut file, Some(&report))?;
//! ```

mod batcher;
mod demux;
mod extent;
mod orchestrator;
mod progress;
mod state;

pub use batcher::{batch_ranges, Batch, DEFAULT_MAX_BYTES_PER_REQUEST};
pub use demux::demux;
pub use extent::OutputExtent;
pub use orchestrator::{DiskDownloader, DownloadPlan};
pub use progress::{ProgressReporter, TransferProgress};
pub use state::TransferState;
