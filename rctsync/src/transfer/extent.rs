//! Random-access destinations for downloaded disk content.

use std::fs::File;
use std::io::{self, Cursor, Seek, SeekFrom, Write};

/// A seekable, writable byte sink pre-sized to the virtual disk.
///
/// Writes may land at any offset in any order; bytes never written read
/// back as zeros. The caller owns opening and closing the extent.
pub trait OutputExtent {
    /// Set the extent length to exactly `len` bytes.
    fn resize(&mut self, len: u64) -> io::Result<()>;

    /// Move the write position to `offset`.
    fn seek_to(&mut self, offset: u64) -> io::Result<()>;

    /// Write all of `buf` at the current position, advancing it by `buf.len()`.
    fn write_bytes(&mut self, buf: &[u8]) -> io::Result<()>;
}

impl OutputExtent for File {
    fn resize(&mut self, len: u64) -> io::Result<()> {
        self.set_len(len)
    }

    fn seek_to(&mut self, offset: u64) -> io::Result<()> {
        self.seek(SeekFrom::Start(offset)).map(|_| ())
    }

    fn write_bytes(&mut self, buf: &[u8]) -> io::Result<()> {
        self.write_all(buf)
    }
}

/// In-memory extent, mainly for tests.
impl OutputExtent for Cursor<Vec<u8>> {
    fn resize(&mut self, len: u64) -> io::Result<()> {
        let len = usize::try_from(len)
            .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "extent too large"))?;
        self.get_mut().resize(len, 0);
        Ok(())
    }

    fn seek_to(&mut self, offset: u64) -> io::Result<()> {
        self.set_position(offset);
        Ok(())
    }

    fn write_bytes(&mut self, buf: &[u8]) -> io::Result<()> {
        self.write_all(buf)
    }
}

impl<T: OutputExtent + ?Sized> OutputExtent for &mut T {
    fn resize(&mut self, len: u64) -> io::Result<()> {
        (**self).resize(len)
    }

    fn seek_to(&mut self, offset: u64) -> io::Result<()> {
        (**self).seek_to(offset)
    }

    fn write_bytes(&mut self, buf: &[u8]) -> io::Result<()> {
        (**self).write_bytes(buf)
    }
}
