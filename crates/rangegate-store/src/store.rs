//! The [`RemoteStore`] and [`ByteSource`] traits.

use async_trait::async_trait;
use rangegate_common::{ObjectId, ObjectMetadata, Result};

/// Upper bound on the scratch buffer used by the default discard-read skip.
const SKIP_SCRATCH_SIZE: usize = 64 * 1024;

/// A remote object store with whole-object, sequential reads only.
///
/// Implementations must be safe to share across request handlers
/// (`Send + Sync`). Neither method retries; a failure is reported once.
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// Human-readable name identifying this backend, used in logs.
    fn name(&self) -> &'static str;

    /// Fetch size, declared content type and name of an object.
    ///
    /// Fails with [`rangegate_common::Error::NotFound`] when the object is
    /// missing or its metadata is unusable, and with
    /// [`rangegate_common::Error::UpstreamUnavailable`] when the store could
    /// not be asked.
    async fn get_metadata(&self, id: &ObjectId) -> Result<ObjectMetadata>;

    /// Open a read positioned at byte 0 of the object.
    ///
    /// There is no offset parameter: callers reach later bytes through
    /// [`ByteSource::skip`]. The returned handle is closed when dropped.
    async fn open_sequential_read(&self, id: &ObjectId) -> Result<Box<dyn ByteSource>>;
}

/// An open sequential read over one object.
#[async_trait]
pub trait ByteSource: Send {
    /// Read up to `buf.len()` bytes. `Ok(0)` means end of stream (or an empty
    /// `buf`).
    async fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize>;

    /// Discard up to `n` bytes and return how many were actually discarded.
    ///
    /// A result below `n` means the stream ended first. The default reads and
    /// throws the bytes away, so its cost is proportional to `n`.
    async fn skip(&mut self, n: u64) -> std::io::Result<u64> {
        if n == 0 {
            return Ok(0);
        }
        let scratch_len = usize::try_from(n)
            .unwrap_or(SKIP_SCRATCH_SIZE)
            .min(SKIP_SCRATCH_SIZE);
        let mut scratch = vec![0u8; scratch_len];
        let mut skipped = 0u64;
        while skipped < n {
            let want = (n - skipped).min(scratch_len as u64) as usize;
            let got = self.read(&mut scratch[..want]).await?;
            if got == 0 {
                break;
            }
            skipped += got as u64;
        }
        Ok(skipped)
    }
}
