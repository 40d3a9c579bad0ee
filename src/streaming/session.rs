//! The live read handle for one streamed response.
//!
//! A [`StreamSession`] wraps the sequential source opened for a request and
//! tracks how far into the object it is. Seeking is emulated by discarding
//! bytes, so it only ever moves forward.

use std::io;

use async_trait::async_trait;
use rangegate_common::{ObjectId, Result};
use rangegate_store::{ByteSource, RemoteStore};
use thiserror::Error;

/// Failure to position a session.
#[derive(Debug, Error)]
pub enum SeekError {
    /// The object ended before the requested offset.
    #[error("short skip: wanted {requested} bytes, skipped {skipped}")]
    ShortSkip { requested: u64, skipped: u64 },

    /// Positioning requires going back, which a sequential read cannot do.
    #[error("cannot seek backwards from {position} to {target}")]
    Backwards { position: u64, target: u64 },

    /// The upstream read failed while discarding.
    #[error("upstream read failed while skipping: {0}")]
    Upstream(#[from] io::Error),
}

/// A sequential read over one object, owned by exactly one transfer.
pub struct StreamSession {
    object_id: ObjectId,
    source: Box<dyn ByteSource>,
    position: u64,
}

impl StreamSession {
    /// Open a read at byte 0.
    pub async fn open(store: &dyn RemoteStore, object_id: ObjectId) -> Result<Self> {
        let source = store.open_sequential_read(&object_id).await?;
        tracing::trace!(object_id = %object_id, store = store.name(), "Stream session opened");
        Ok(Self::from_source(object_id, source))
    }

    /// Wrap an already open source positioned at byte 0.
    pub fn from_source(object_id: ObjectId, source: Box<dyn ByteSource>) -> Self {
        Self {
            object_id,
            source,
            position: 0,
        }
    }

    /// Offset of the next byte `read` will return.
    pub fn position(&self) -> u64 {
        self.position
    }

    /// Discard bytes until `position() == offset`.
    ///
    /// Anything short of the exact offset is an error: forwarding bytes from
    /// the wrong place would corrupt the response.
    pub async fn seek_to(&mut self, offset: u64) -> std::result::Result<(), SeekError> {
        if offset < self.position {
            return Err(SeekError::Backwards {
                position: self.position,
                target: offset,
            });
        }
        let requested = offset - self.position;
        if requested == 0 {
            return Ok(());
        }

        let skipped = self.source.skip(requested).await?;
        self.position += skipped;
        if skipped != requested {
            return Err(SeekError::ShortSkip { requested, skipped });
        }
        Ok(())
    }
}

#[async_trait]
impl ByteSource for StreamSession {
    async fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.source.read(buf).await?;
        self.position += n as u64;
        Ok(n)
    }
}

impl Drop for StreamSession {
    fn drop(&mut self) {
        tracing::trace!(
            object_id = %self.object_id,
            position = self.position,
            "Stream session closed"
        );
    }
}
