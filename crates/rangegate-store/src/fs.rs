//! Local filesystem store.
//!
//! Each object is a regular file directly under the store root, named by its
//! id. Files are seekable, so [`ByteSource::skip`] is a seek here rather than
//! a discard-read.

use std::io::{self, SeekFrom};
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use rangegate_common::{Error, ObjectId, ObjectMetadata, Result};
use tokio::fs::File;
use tokio::io::{AsyncReadExt, AsyncSeekExt};

use crate::store::{ByteSource, RemoteStore};

/// A [`RemoteStore`] serving files from one directory.
#[derive(Debug, Clone)]
pub struct FsStore {
    root: PathBuf,
}

impl FsStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Map an id to a path under the root. Ids that would escape the root or
    /// name hidden files do not exist as far as this store is concerned.
    fn resolve(&self, id: &ObjectId) -> Result<PathBuf> {
        let raw = id.as_str();
        if raw.contains('/') || raw.contains('\\') || raw.starts_with('.') {
            return Err(Error::not_found("object", id));
        }
        Ok(self.root.join(raw))
    }
}

fn map_io(id: &ObjectId, e: io::Error) -> Error {
    if e.kind() == io::ErrorKind::NotFound {
        Error::not_found("object", id)
    } else {
        Error::upstream(format!("filesystem error for {id}: {e}"))
    }
}

#[async_trait]
impl RemoteStore for FsStore {
    fn name(&self) -> &'static str {
        "filesystem"
    }

    async fn get_metadata(&self, id: &ObjectId) -> Result<ObjectMetadata> {
        let path = self.resolve(id)?;
        let metadata = tokio::fs::metadata(&path)
            .await
            .map_err(|e| map_io(id, e))?;
        if !metadata.is_file() {
            return Err(Error::not_found("object", id));
        }
        Ok(ObjectMetadata {
            size: metadata.len(),
            declared_mime_type: None,
            name: Some(id.to_string()),
        })
    }

    async fn open_sequential_read(&self, id: &ObjectId) -> Result<Box<dyn ByteSource>> {
        let path = self.resolve(id)?;
        let file = File::open(&path).await.map_err(|e| map_io(id, e))?;
        let len = file
            .metadata()
            .await
            .map_err(|e| map_io(id, e))?
            .len();
        Ok(Box::new(FileSource { file, pos: 0, len }))
    }
}

/// Open file plus the position bookkeeping needed to clamp seeks at EOF.
struct FileSource {
    file: File,
    pos: u64,
    len: u64,
}

#[async_trait]
impl ByteSource for FileSource {
    async fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.file.read(buf).await?;
        self.pos += n as u64;
        Ok(n)
    }

    async fn skip(&mut self, n: u64) -> io::Result<u64> {
        // Seeking past EOF succeeds on most platforms, so clamp to what exists.
        let target = n.min(self.len.saturating_sub(self.pos));
        if target > 0 {
            self.file.seek(SeekFrom::Start(self.pos + target)).await?;
            self.pos += target;
        }
        Ok(target)
    }
}
