//! [`ByteSource`] over a stream of byte chunks.
//!
//! HTTP bodies arrive as a stream of [`Bytes`] chunks whose sizes the
//! transport picks. This adapter re-slices them into whatever buffer sizes
//! the caller asks for, and skips by advancing through chunks without
//! copying them.

use std::io;

use async_trait::async_trait;
use bytes::{Buf, Bytes};
use futures::stream::{BoxStream, Stream, StreamExt};

use crate::store::ByteSource;

/// A sequential source fed by a chunk stream.
pub struct StreamByteSource {
    inner: BoxStream<'static, io::Result<Bytes>>,
    pending: Bytes,
    finished: bool,
}

impl StreamByteSource {
    /// Wrap a chunk stream.
    pub fn new<S>(stream: S) -> Self
    where
        S: Stream<Item = io::Result<Bytes>> + Send + 'static,
    {
        Self {
            inner: stream.boxed(),
            pending: Bytes::new(),
            finished: false,
        }
    }

    /// Make sure `pending` holds at least one byte. Returns `false` at end of
    /// stream.
    async fn fill(&mut self) -> io::Result<bool> {
        while self.pending.is_empty() {
            if self.finished {
                return Ok(false);
            }
            match self.inner.next().await {
                Some(Ok(chunk)) => self.pending = chunk,
                Some(Err(e)) => return Err(e),
                None => {
                    self.finished = true;
                    return Ok(false);
                }
            }
        }
        Ok(true)
    }
}

#[async_trait]
impl ByteSource for StreamByteSource {
    async fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if buf.is_empty() || !self.fill().await? {
            return Ok(0);
        }
        let n = buf.len().min(self.pending.len());
        buf[..n].copy_from_slice(&self.pending[..n]);
        self.pending.advance(n);
        Ok(n)
    }

    async fn skip(&mut self, n: u64) -> io::Result<u64> {
        let mut skipped = 0u64;
        while skipped < n {
            if !self.fill().await? {
                break;
            }
            let take = (n - skipped).min(self.pending.len() as u64) as usize;
            self.pending.advance(take);
            skipped += take as u64;
        }
        Ok(skipped)
    }
}
