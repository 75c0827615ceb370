//! End-to-end downloads into real files through a fake RCT service.

use std::cell::RefCell;
use std::fs::{File, OpenOptions};
use std::io::Read;
use std::sync::Mutex;

use bytes::Bytes;
use rctsync::client::{ChunkStream, DiskInfo, RctService, TrackingStatus};
use rctsync::transfer::{DiskDownloader, TransferProgress};
use rctsync::{ChangeSet, DiskRange, RctError, RctResult};
use tempfile::TempDir;

/// Serves a synthetic disk whose content changes between "checkpoints".
struct FakeService {
    disk: Mutex<Vec<u8>>,
    changes: Vec<DiskRange>,
    chunk_size: usize,
    requests: Mutex<Vec<Vec<DiskRange>>>,
}

impl FakeService {
    fn new(size: usize, chunk_size: usize) -> Self {
        Self {
            disk: Mutex::new((0..size).map(|i| (i * 7 % 256) as u8).collect()),
            changes: Vec::new(),
            chunk_size,
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Overwrite `ranges` on the remote disk and remember them as the changes.
    fn mutate(&mut self, ranges: &[DiskRange]) {
        let mut disk = self.disk.lock().unwrap();
        for range in ranges {
            for b in &mut disk[range.offset as usize..range.end() as usize] {
                *b = b.wrapping_add(101);
            }
        }
        self.changes = ranges.to_vec();
    }

    fn snapshot(&self) -> Vec<u8> {
        self.disk.lock().unwrap().clone()
    }

    fn take_requests(&self) -> Vec<Vec<DiskRange>> {
        std::mem::take(&mut *self.requests.lock().unwrap())
    }
}

impl RctService for FakeService {
    fn disk_info(&self, _disk_path: &str) -> RctResult<DiskInfo> {
        Ok(DiskInfo::new(self.disk.lock().unwrap().len() as u64))
    }

    fn tracking_status(&self, _disk_path: &str) -> RctResult<TrackingStatus> {
        Ok(TrackingStatus::new(true))
    }

    fn set_tracking(&self, _disk_path: &str, _enabled: bool) -> RctResult<()> {
        Ok(())
    }

    fn changes(&self, _disk_path: &str, rct_id: &str) -> RctResult<ChangeSet> {
        if rct_id == "unknown" {
            return Err(RctError::request_failed("fake://changes", "HTTP 404 Not Found"));
        }
        Ok(ChangeSet::from(self.changes.clone()))
    }

    fn range_content(&self, _disk_path: &str, ranges: &[DiskRange]) -> RctResult<ChunkStream> {
        self.requests.lock().unwrap().push(ranges.to_vec());

        let disk = self.disk.lock().unwrap();
        let mut body = Vec::new();
        for range in ranges {
            body.extend_from_slice(&disk[range.offset as usize..range.end() as usize]);
        }

        let chunks: Vec<RctResult<Bytes>> = body
            .chunks(self.chunk_size)
            .map(|c| Ok(Bytes::copy_from_slice(c)))
            .collect();
        Ok(Box::new(chunks.into_iter()))
    }
}

fn read_file(file: &mut File) -> Vec<u8> {
    use std::io::{Seek, SeekFrom};

    let mut data = Vec::new();
    file.seek(SeekFrom::Start(0)).unwrap();
    file.read_to_end(&mut data).unwrap();
    data
}

fn open_output(dir: &TempDir) -> File {
    OpenOptions::new()
        .read(true)
        .write(true)
        .create(true)
        .truncate(false)
        .open(dir.path().join("disk.raw"))
        .unwrap()
}

#[test]
fn full_then_incremental_backup_matches_remote_disk() {
    let dir = TempDir::new().unwrap();
    let mut service = FakeService::new(64 * 1024, 1500);

    // Full backup.
    {
        let downloader = DiskDownloader::with_max_bytes_per_request(&service, 4096);
        let mut file = open_output(&dir);
        let state = downloader
            .download("C:\\VMs\\web01.vhdx", None, &mut file, None)
            .unwrap();

        assert_eq!(state.completed_batches, 16);
        assert_eq!(read_file(&mut file), service.snapshot());
    }
    service.take_requests();

    // Incremental backup of a few scattered changes.
    let changes = [
        DiskRange::new(0, 512),
        DiskRange::new(10_000, 9_000),
        DiskRange::new(40_960, 1),
        DiskRange::new(65_000, 536),
    ];
    service.mutate(&changes);

    let downloader = DiskDownloader::with_max_bytes_per_request(&service, 4096);
    let mut file = open_output(&dir);
    let progress = RefCell::new(Vec::new());
    let reporter = |p: TransferProgress| progress.borrow_mut().push(p);

    let state = downloader
        .download("C:\\VMs\\web01.vhdx", Some("rctX:2"), &mut file, Some(&reporter))
        .unwrap();

    assert!(state.is_complete());
    assert_eq!(state.bytes_transferred, 512 + 9_000 + 1 + 536);
    assert_eq!(read_file(&mut file), service.snapshot());

    let progress = progress.into_inner();
    assert_eq!(progress.len(), state.total_batches);
    assert!(progress
        .windows(2)
        .all(|w| w[0].bytes_transferred <= w[1].bytes_transferred));
    assert!(progress.iter().all(|p| p.bytes_total == state.bytes_total));
    assert!(progress.last().unwrap().is_complete());

    for request in service.take_requests() {
        let bytes: u64 = request.iter().map(|r| r.length).sum();
        assert!(bytes <= 4096);
    }
}

#[test]
fn scenario_batches_are_requested_in_order() {
    let mut service = FakeService::new(256, 4);
    service.mutate(&[DiskRange::new(0, 15), DiskRange::new(100, 10)]);

    let mut out = std::io::Cursor::new(Vec::new());
    DiskDownloader::with_max_bytes_per_request(&service, 10)
        .download("disk.vhdx", Some("rctX:1"), &mut out, None)
        .unwrap();
    assert_eq!(
        service.take_requests(),
        vec![
            vec![DiskRange::new(0, 10)],
            vec![DiskRange::new(10, 5)],
            vec![DiskRange::new(100, 10)],
        ]
    );

    DiskDownloader::with_max_bytes_per_request(&service, 0)
        .download("disk.vhdx", Some("rctX:1"), &mut out, None)
        .unwrap();
    assert_eq!(
        service.take_requests(),
        vec![vec![DiskRange::new(0, 15)], vec![DiskRange::new(100, 10)]]
    );
}

#[test]
fn full_disk_without_budget_is_one_request() {
    let service = FakeService::new(1000, 333);
    let mut out = std::io::Cursor::new(Vec::new());
    let calls = RefCell::new(Vec::new());
    let reporter = |p: TransferProgress| calls.borrow_mut().push((p.bytes_transferred, p.bytes_total));

    DiskDownloader::with_max_bytes_per_request(&service, 0)
        .download("disk.vhdx", None, &mut out, Some(&reporter))
        .unwrap();

    assert_eq!(service.take_requests(), vec![vec![DiskRange::new(0, 1000)]]);
    assert_eq!(calls.into_inner(), vec![(1000, 1000)]);
    assert_eq!(out.into_inner(), service.snapshot());
}

#[test]
fn rerunning_an_incremental_backup_is_harmless() {
    let dir = TempDir::new().unwrap();
    let mut service = FakeService::new(8192, 1000);
    service.mutate(&[DiskRange::new(100, 3000)]);

    let downloader = DiskDownloader::with_max_bytes_per_request(&service, 1024);
    for _ in 0..2 {
        let mut file = open_output(&dir);
        downloader
            .download("disk.vhdx", Some("rctX:1"), &mut file, None)
            .unwrap();
        let data = read_file(&mut file);
        assert_eq!(&data[100..3100], &service.snapshot()[100..3100]);
        assert_eq!(data.len(), 8192);
    }
}

#[test]
fn unknown_checkpoint_fails_before_touching_output() {
    let dir = TempDir::new().unwrap();
    let service = FakeService::new(4096, 512);
    let downloader = DiskDownloader::new(&service);
    let mut file = open_output(&dir);

    let err = downloader
        .download("disk.vhdx", Some("unknown"), &mut file, None)
        .unwrap_err();

    assert!(matches!(err, RctError::RequestFailed { .. }));
    assert_eq!(file.metadata().unwrap().len(), 0);
    assert!(service.take_requests().is_empty());
}
