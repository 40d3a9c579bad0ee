//! In-process object store.
//!
//! Objects live in a map behind a lock. Reads are served through
//! [`StreamByteSource`] in fixed-size chunks so they behave like a network
//! body. Metadata is stored separately from the bytes, which lets tests
//! describe an object whose advertised size disagrees with its content.

use std::collections::HashMap;
use std::io;
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use futures::stream;
use parking_lot::RwLock;
use rangegate_common::{Error, ObjectId, ObjectMetadata, Result};

use crate::source::StreamByteSource;
use crate::store::{ByteSource, RemoteStore};

/// Default chunk size for reads.
const DEFAULT_CHUNK_SIZE: usize = 16 * 1024;

#[derive(Debug, Clone)]
struct MemoryObject {
    metadata: ObjectMetadata,
    data: Bytes,
}

/// A [`RemoteStore`] backed by a shared in-memory map.
///
/// Cloning is cheap and clones share the same objects.
#[derive(Debug, Clone)]
pub struct MemoryStore {
    objects: Arc<RwLock<HashMap<ObjectId, MemoryObject>>>,
    chunk_size: usize,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::with_chunk_size(DEFAULT_CHUNK_SIZE)
    }

    /// Store whose reads yield chunks of at most `chunk_size` bytes.
    pub fn with_chunk_size(chunk_size: usize) -> Self {
        Self {
            objects: Arc::new(RwLock::new(HashMap::new())),
            chunk_size: chunk_size.max(1),
        }
    }

    /// Add or replace an object. Its name is the id and its size the data
    /// length.
    pub fn insert(&self, id: ObjectId, data: impl Into<Bytes>, mime_type: Option<&str>) {
        let data = data.into();
        let metadata = ObjectMetadata {
            size: data.len() as u64,
            declared_mime_type: mime_type.map(String::from),
            name: Some(id.to_string()),
        };
        self.insert_with_metadata(id, metadata, data);
    }

    /// Add or replace an object with explicit metadata.
    pub fn insert_with_metadata(
        &self,
        id: ObjectId,
        metadata: ObjectMetadata,
        data: impl Into<Bytes>,
    ) {
        self.objects.write().insert(
            id,
            MemoryObject {
                metadata,
                data: data.into(),
            },
        );
    }

    fn get(&self, id: &ObjectId) -> Result<MemoryObject> {
        self.objects
            .read()
            .get(id)
            .cloned()
            .ok_or_else(|| Error::not_found("object", id))
    }
}

#[async_trait]
impl RemoteStore for MemoryStore {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn get_metadata(&self, id: &ObjectId) -> Result<ObjectMetadata> {
        Ok(self.get(id)?.metadata)
    }

    async fn open_sequential_read(&self, id: &ObjectId) -> Result<Box<dyn ByteSource>> {
        let data = self.get(id)?.data;
        let chunk_size = self.chunk_size;
        let chunks: Vec<io::Result<Bytes>> = (0..data.len())
            .step_by(chunk_size)
            .map(|start| Ok(data.slice(start..(start + chunk_size).min(data.len()))))
            .collect();
        Ok(Box::new(StreamByteSource::new(stream::iter(chunks))))
    }
}
