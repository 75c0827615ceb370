//! Chunked reading of streamed response bodies.

use std::io::{ErrorKind, Read};

use bytes::Bytes;

use crate::error::{RctError, RctResult};

/// Default upper bound on the size of a body chunk (10 MiB).
pub const DEFAULT_CHUNK_SIZE: usize = 10 * 1024 * 1024;

/// Iterator over a reader's bytes in chunks of at most `chunk_size`.
///
/// Chunks are yielded as soon as a read returns, so their size depends on the
/// transport. Read errors are reported once against `url` and end the stream.
pub struct ReadChunks<R> {
    reader: R,
    chunk_size: usize,
    url: String,
    done: bool,
}

impl<R: Read> ReadChunks<R> {
    /// Wrap `reader`. A `chunk_size` of zero is raised to one byte.
    pub fn new(reader: R, chunk_size: usize, url: impl Into<String>) -> Self {
        Self {
            reader,
            chunk_size: chunk_size.max(1),
            url: url.into(),
            done: false,
        }
    }
}

impl<R: Read> Iterator for ReadChunks<R> {
    type Item = RctResult<Bytes>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let mut buffer = vec![0u8; self.chunk_size];
        loop {
            match self.reader.read(&mut buffer) {
                Ok(0) => {
                    self.done = true;
                    return None;
                }
                Ok(n) => {
                    buffer.truncate(n);
                    return Some(Ok(Bytes::from(buffer)));
                }
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => {
                    self.done = true;
                    return Some(Err(RctError::request_failed(
                        self.url.clone(),
                        format!("read error: {}", e),
                    )));
                }
            }
        }
    }
}
