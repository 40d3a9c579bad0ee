//! # rangegate-store
//!
//! Remote object stores that only offer whole-object, sequential reads.
//!
//! The gateway talks to every backend through two traits:
//!
//! - [`RemoteStore`]: metadata lookup and opening a sequential read
//! - [`ByteSource`]: the open read handle, with `read` and `skip`
//!
//! `skip` has a discard-read default so a purely sequential backend needs to
//! implement `read` only. Backends with cheaper positioning (the filesystem)
//! override it.
//!
//! ## Backends
//!
//! - [`DriveStore`]: Google Drive v3 over HTTP
//! - [`FsStore`]: files directly under a local directory
//! - [`MemoryStore`]: in-process objects, for tests and demos
//!
//! ## Quick start
//!
//! ```
//! use rangegate_common::ObjectId;
//! use rangegate_store::{MemoryStore, RemoteStore};
//!
//! # #[tokio::main]
//! # async fn main() {
//! let store = MemoryStore::new();
//! let id: ObjectId = "clip.mp4".parse().unwrap();
//! store.insert(id.clone(), vec![1u8, 2, 3, 4], Some("video/mp4"));
//!
//! let mut source = store.open_sequential_read(&id).await.unwrap();
//! assert_eq!(source.skip(2).await.unwrap(), 2);
//! let mut buf = [0u8; 8];
//! assert_eq!(source.read(&mut buf).await.unwrap(), 2);
//! assert_eq!(&buf[..2], &[3, 4]);
//! # }
//! ```

pub mod drive;
pub mod fs;
pub mod memory;
pub mod source;
pub mod store;

pub use drive::{DriveOptions, DriveStore};
pub use fs::FsStore;
pub use memory::MemoryStore;
pub use source::StreamByteSource;
pub use store::{ByteSource, RemoteStore};
