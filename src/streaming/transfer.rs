//! The body-producing half of a streamed response.
//!
//! By the time a transfer starts the status line and headers are already
//! committed, so nothing here can change them. Every failure therefore ends
//! in a log line and a truncated body.

use std::io;
use std::sync::Arc;

use rangegate_common::{ObjectId, TransferWindow};
use rangegate_store::RemoteStore;

use super::copy::{copy_bounded, ChunkSink, CopyOutcome};
use super::session::{SeekError, StreamSession};

/// Everything one transfer needs.
pub struct TransferJob {
    pub store: Arc<dyn RemoteStore>,
    pub object_id: ObjectId,
    pub window: TransferWindow,
    pub buffer_size: usize,
}

/// How a transfer ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransferOutcome {
    /// The whole window was delivered.
    Complete { transferred: u64 },
    /// The upstream ended before the window was filled.
    SourceExhausted { transferred: u64, expected: u64 },
    /// The client stopped reading.
    ClientDisconnected { transferred: u64 },
    /// Reading from the upstream failed mid-copy.
    UpstreamReadFailed { transferred: u64, error: String },
    /// The upstream ended while skipping to the window offset.
    ShortSkip { requested: u64, skipped: u64 },
    /// Reading from the upstream failed while skipping to the window offset.
    SkipFailed { error: String },
    /// The upstream read could not be opened.
    OpenFailed { error: String },
    /// The session was asked to move backwards.
    Internal { error: String },
}

impl TransferOutcome {
    /// Whether the body was cut short by the server side.
    pub fn is_failure(&self) -> bool {
        !matches!(
            self,
            TransferOutcome::Complete { .. } | TransferOutcome::ClientDisconnected { .. }
        )
    }
}

impl TransferJob {
    /// Open the object, position it at the window offset and copy the window
    /// into `sink`. The session is dropped before this returns.
    pub async fn run<K: ChunkSink + ?Sized>(self, sink: &mut K) -> TransferOutcome {
        let TransferJob {
            store,
            object_id,
            window,
            buffer_size,
        } = self;

        let outcome = match StreamSession::open(store.as_ref(), object_id.clone()).await {
            Ok(mut session) => transfer_window(&mut session, sink, window, buffer_size).await,
            Err(e) => TransferOutcome::OpenFailed {
                error: e.to_string(),
            },
        };

        log_outcome(&object_id, window, &outcome);
        if outcome.is_failure() {
            sink.abort(io::Error::other(format!("transfer aborted: {:?}", outcome)))
                .await;
        }
        outcome
    }
}

async fn transfer_window<K: ChunkSink + ?Sized>(
    session: &mut StreamSession,
    sink: &mut K,
    window: TransferWindow,
    buffer_size: usize,
) -> TransferOutcome {
    match session.seek_to(window.offset).await {
        Ok(()) => {}
        Err(SeekError::ShortSkip { requested, skipped }) => {
            return TransferOutcome::ShortSkip { requested, skipped }
        }
        Err(e @ SeekError::Backwards { .. }) => {
            return TransferOutcome::Internal {
                error: e.to_string(),
            }
        }
        Err(SeekError::Upstream(e)) => {
            return TransferOutcome::SkipFailed {
                error: e.to_string(),
            }
        }
    }

    match copy_bounded(session, sink, window.length, buffer_size).await {
        CopyOutcome::Complete { transferred } => TransferOutcome::Complete { transferred },
        CopyOutcome::SourceExhausted { transferred } => TransferOutcome::SourceExhausted {
            transferred,
            expected: window.length,
        },
        CopyOutcome::ClientDisconnected { transferred } => {
            TransferOutcome::ClientDisconnected { transferred }
        }
        CopyOutcome::ReadFailed { transferred, error } => {
            TransferOutcome::UpstreamReadFailed { transferred, error }
        }
    }
}

fn log_outcome(object_id: &ObjectId, window: TransferWindow, outcome: &TransferOutcome) {
    let offset = window.offset;
    match outcome {
        TransferOutcome::Complete { transferred } => tracing::debug!(
            object_id = %object_id,
            offset,
            transferred,
            "Finished streaming"
        ),
        TransferOutcome::ClientDisconnected { transferred } => tracing::info!(
            object_id = %object_id,
            offset,
            transferred,
            expected = window.length,
            "Client disconnected during stream"
        ),
        TransferOutcome::SourceExhausted {
            transferred,
            expected,
        } => tracing::warn!(
            object_id = %object_id,
            offset,
            transferred,
            expected,
            "Upstream ended before the advertised length"
        ),
        TransferOutcome::UpstreamReadFailed { transferred, error } => tracing::error!(
            object_id = %object_id,
            offset,
            transferred,
            error = %error,
            "Upstream read failed during stream"
        ),
        TransferOutcome::ShortSkip { requested, skipped } => tracing::error!(
            object_id = %object_id,
            offset,
            requested,
            skipped,
            "Short skip while seeking; aborting response to avoid serving wrong bytes"
        ),
        TransferOutcome::SkipFailed { error } => tracing::error!(
            object_id = %object_id,
            offset,
            transferred = 0u64,
            error = %error,
            "Upstream read failed while skipping to offset"
        ),
        TransferOutcome::OpenFailed { error } => tracing::error!(
            object_id = %object_id,
            offset,
            error = %error,
            "Could not open upstream read"
        ),
        TransferOutcome::Internal { error } => tracing::error!(
            object_id = %object_id,
            offset,
            error = %error,
            "Transfer could not be positioned"
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::streaming::copy::tests::VecSink;
    use async_trait::async_trait;
    use rangegate_common::{ObjectMetadata, Result};
    use rangegate_store::{ByteSource, MemoryStore};

    /// Store whose reads always fail with a connection reset.
    struct ResettingStore;

    struct ResettingSource;

    #[async_trait]
    impl ByteSource for ResettingSource {
        async fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::ConnectionReset, "reset mid-skip"))
        }
    }

    #[async_trait]
    impl RemoteStore for ResettingStore {
        fn name(&self) -> &'static str {
            "resetting"
        }

        async fn get_metadata(&self, _id: &ObjectId) -> Result<ObjectMetadata> {
            Ok(ObjectMetadata::with_size(1000))
        }

        async fn open_sequential_read(&self, _id: &ObjectId) -> Result<Box<dyn ByteSource>> {
            Ok(Box::new(ResettingSource))
        }
    }

    fn id(raw: &str) -> ObjectId {
        raw.parse().unwrap()
    }

    fn job(store: &MemoryStore, object: &str, offset: u64, length: u64) -> TransferJob {
        TransferJob {
            store: Arc::new(store.clone()),
            object_id: id(object),
            window: TransferWindow { offset, length },
            buffer_size: 256,
        }
    }

    fn pattern(len: usize) -> Vec<u8> {
        (0..len).map(|i| (i % 251) as u8).collect()
    }

    #[tokio::test]
    async fn test_window_is_copied() {
        let store = MemoryStore::with_chunk_size(100);
        let data = pattern(1000);
        store.insert(id("clip"), data.clone(), None);

        let mut sink = VecSink::default();
        let outcome = job(&store, "clip", 100, 100).run(&mut sink).await;
        assert_eq!(outcome, TransferOutcome::Complete { transferred: 100 });
        assert_eq!(sink.bytes(), &data[100..200]);
        assert!(sink.aborted.is_none());
    }

    #[tokio::test]
    async fn test_short_skip_aborts_without_bytes() {
        let store = MemoryStore::new();
        // Advertises 1000 bytes but holds 50.
        store.insert_with_metadata(id("liar"), ObjectMetadata::with_size(1000), pattern(50));

        let mut sink = VecSink::default();
        let outcome = job(&store, "liar", 500, 500).run(&mut sink).await;
        assert_eq!(
            outcome,
            TransferOutcome::ShortSkip {
                requested: 500,
                skipped: 50
            }
        );
        assert!(sink.chunks.is_empty());
        assert!(sink.aborted.is_some());
    }

    #[tokio::test]
    async fn test_truncated_object_is_source_exhausted() {
        let store = MemoryStore::new();
        store.insert_with_metadata(id("short"), ObjectMetadata::with_size(1000), pattern(600));

        let mut sink = VecSink::default();
        let outcome = job(&store, "short", 0, 1000).run(&mut sink).await;
        assert_eq!(
            outcome,
            TransferOutcome::SourceExhausted {
                transferred: 600,
                expected: 1000
            }
        );
        assert!(outcome.is_failure());
        assert!(sink.aborted.is_some());
    }

    #[tokio::test]
    async fn test_disconnect_is_not_a_failure() {
        let store = MemoryStore::new();
        store.insert(id("big"), pattern(10 * 1024 * 1024), None);

        let mut sink = VecSink {
            limit: Some(1024),
            ..VecSink::default()
        };
        let outcome = job(&store, "big", 0, 10 * 1024 * 1024).run(&mut sink).await;
        assert!(matches!(outcome, TransferOutcome::ClientDisconnected { .. }));
        assert!(!outcome.is_failure());
        assert!(sink.aborted.is_none());
    }

    #[tokio::test]
    async fn test_vanished_object_fails_to_open() {
        let store = MemoryStore::new();
        let mut sink = VecSink::default();
        let outcome = job(&store, "gone", 0, 10).run(&mut sink).await;
        assert!(matches!(outcome, TransferOutcome::OpenFailed { .. }));
        assert!(sink.aborted.is_some());
    }

    #[tokio::test]
    async fn test_read_error_while_skipping_is_skip_failure() {
        let job = TransferJob {
            store: Arc::new(ResettingStore),
            object_id: id("flaky"),
            window: TransferWindow {
                offset: 500,
                length: 500,
            },
            buffer_size: 256,
        };

        let mut sink = VecSink::default();
        let outcome = job.run(&mut sink).await;
        match &outcome {
            TransferOutcome::SkipFailed { error } => assert!(error.contains("reset mid-skip")),
            other => panic!("unexpected outcome: {other:?}"),
        }
        assert!(outcome.is_failure());
        assert!(sink.chunks.is_empty());
        assert!(sink.aborted.is_some());
    }
}
