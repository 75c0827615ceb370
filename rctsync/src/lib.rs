//! rctsync - incremental backup of remote virtual disks
//!
//! Downloads the content of a virtual disk exposed by an RCT (resilient
//! change tracking) service, either whole or only the byte ranges changed
//! since a checkpoint, into a local raw image.
//!
//! - [`range`]: byte ranges and change sets
//! - [`transfer`]: request batching, stream demultiplexing and the download
//!   orchestrator
//! - [`client`]: the service contract and its HTTP implementation
//! - [`config`]: the configuration file
//! - [`logging`]: tracing subscriber setup

pub mod client;
pub mod config;
pub mod error;
pub mod logging;
pub mod range;
pub mod transfer;

pub use error::{RctError, RctResult};
pub use range::{ChangeSet, DiskRange};
