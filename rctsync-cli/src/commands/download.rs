//! Full and incremental disk downloads.

use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};

use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};
use rctsync::client::RctService;
use rctsync::transfer::{DiskDownloader, DownloadPlan, TransferProgress, TransferState};
use tracing::info;

use crate::commands::common::format_size;
use crate::error::CliError;

/// Arguments of the `download` command.
#[derive(Debug, Clone, Args)]
pub struct DownloadArgs {
    /// Path of the virtual disk on the remote host
    #[arg(long, alias = "disk", value_name = "PATH")]
    pub remote_vhd_path: String,

    /// Local disk image to write; created when missing
    #[arg(long, alias = "output", value_name = "FILE")]
    pub local_disk_path: PathBuf,

    /// Download only ranges changed since this RCT checkpoint
    #[arg(long, value_name = "ID")]
    pub rct_id: Option<String>,

    /// Upper bound on bytes per content request; 0 sends one request per range
    #[arg(long, value_name = "BYTES")]
    pub max_bytes_per_request: Option<u64>,

    /// Truncate the local image before writing
    #[arg(long)]
    pub fresh: bool,

    /// Do not draw a progress bar
    #[arg(long)]
    pub no_progress: bool,
}

/// Plan and run a download of `args.remote_vhd_path` into `args.local_disk_path`.
pub fn run<S: RctService>(
    service: S,
    args: &DownloadArgs,
    max_bytes_per_request: u64,
) -> Result<TransferState, CliError> {
    let downloader = DiskDownloader::with_max_bytes_per_request(service, max_bytes_per_request);
    let plan = downloader.plan(&args.remote_vhd_path, args.rct_id.as_deref())?;

    let mut file = open_output(&args.local_disk_path, args.fresh)?;

    let bar = progress_bar(&plan, args.no_progress);
    let reporter = |progress: TransferProgress| bar.set_position(progress.bytes_transferred);
    let state = downloader.execute(&args.remote_vhd_path, &plan, &mut file, Some(&reporter));
    bar.finish_and_clear();
    let state = state?;

    file.sync_all().map_err(|source| CliError::Output {
        path: args.local_disk_path.clone(),
        source,
    })?;

    info!(
        batches = state.completed_batches,
        bytes = state.bytes_transferred,
        "Download complete"
    );
    println!(
        "Downloaded {} in {} request(s) to {}",
        format_size(state.bytes_transferred),
        state.completed_batches,
        args.local_disk_path.display()
    );

    Ok(state)
}

/// Open the local image for writing. Existing content is kept unless
/// `truncate` is set, so changed ranges land on top of the previous backup.
fn open_output(path: &Path, truncate: bool) -> Result<File, CliError> {
    OpenOptions::new()
        .read(true)
        .write(true)
        .create(true)
        .truncate(truncate)
        .open(path)
        .map_err(|source| CliError::Output {
            path: path.to_path_buf(),
            source,
        })
}

fn progress_bar(plan: &DownloadPlan, hidden: bool) -> ProgressBar {
    if hidden {
        return ProgressBar::hidden();
    }

    let bar = ProgressBar::new(plan.total_bytes());
    let style = ProgressStyle::with_template(
        "{spinner} [{elapsed_precise}] [{bar:40}] {bytes}/{total_bytes} ({bytes_per_sec}, {eta})",
    )
    .unwrap_or_else(|_| ProgressStyle::default_bar())
    .progress_chars("=> ");
    bar.set_style(style);
    bar
}
