//! Bounded copy from a positioned source into a response body.

use std::io;

use async_trait::async_trait;
use bytes::Bytes;
use rangegate_store::ByteSource;
use tokio::sync::mpsc;

/// Where copied chunks go.
#[async_trait]
pub trait ChunkSink: Send {
    /// Deliver one chunk. An error means the receiver is gone.
    async fn write_chunk(&mut self, chunk: Bytes) -> io::Result<()>;

    /// Signal that the body will not be completed.
    async fn abort(&mut self, _reason: io::Error) {}
}

/// Sink feeding an HTTP response body through a bounded channel.
///
/// The body stream owns the receiver, so when the client goes away hyper
/// drops it and the next [`ChunkSink::write_chunk`] fails.
pub struct ChannelSink {
    tx: mpsc::Sender<io::Result<Bytes>>,
}

impl ChannelSink {
    pub fn new(tx: mpsc::Sender<io::Result<Bytes>>) -> Self {
        Self { tx }
    }
}

#[async_trait]
impl ChunkSink for ChannelSink {
    async fn write_chunk(&mut self, chunk: Bytes) -> io::Result<()> {
        self.tx
            .send(Ok(chunk))
            .await
            .map_err(|_| io::Error::new(io::ErrorKind::BrokenPipe, "response body dropped"))
    }

    async fn abort(&mut self, reason: io::Error) {
        // An error item makes hyper reset the connection instead of waiting
        // for bytes that will never come.
        let _ = self.tx.send(Err(reason)).await;
    }
}

/// How a copy ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CopyOutcome {
    /// Exactly `length` bytes were delivered.
    Complete { transferred: u64 },
    /// The source hit EOF before `length` bytes.
    SourceExhausted { transferred: u64 },
    /// The sink refused a chunk.
    ClientDisconnected { transferred: u64 },
    /// The source returned an error.
    ReadFailed { transferred: u64, error: String },
}

impl CopyOutcome {
    /// Bytes successfully handed to the sink.
    pub fn transferred(&self) -> u64 {
        match *self {
            CopyOutcome::Complete { transferred }
            | CopyOutcome::SourceExhausted { transferred }
            | CopyOutcome::ClientDisconnected { transferred }
            | CopyOutcome::ReadFailed { transferred, .. } => transferred,
        }
    }
}

/// Copy exactly `length` bytes from `source` to `sink` through one buffer of
/// `buffer_size` bytes.
///
/// Each read asks for at most the bytes still owed, so the sink never sees
/// more than `length` bytes.
pub async fn copy_bounded<S, K>(
    source: &mut S,
    sink: &mut K,
    length: u64,
    buffer_size: usize,
) -> CopyOutcome
where
    S: ByteSource + ?Sized,
    K: ChunkSink + ?Sized,
{
    let buffer_len = usize::try_from(length)
        .unwrap_or(usize::MAX)
        .min(buffer_size.max(1));
    let mut buf = vec![0u8; buffer_len];
    let mut transferred = 0u64;

    while transferred < length {
        let want = (length - transferred).min(buf.len() as u64) as usize;
        let n = match source.read(&mut buf[..want]).await {
            Ok(0) => return CopyOutcome::SourceExhausted { transferred },
            Ok(n) => n.min(want),
            Err(e) => {
                return CopyOutcome::ReadFailed {
                    transferred,
                    error: e.to_string(),
                }
            }
        };

        if sink
            .write_chunk(Bytes::copy_from_slice(&buf[..n]))
            .await
            .is_err()
        {
            return CopyOutcome::ClientDisconnected { transferred };
        }
        transferred += n as u64;
    }

    CopyOutcome::Complete { transferred }
}
