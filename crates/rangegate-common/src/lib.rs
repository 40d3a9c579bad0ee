//! Rangegate-Common: Shared types, identifiers, and errors.
//!
//! This crate provides the vocabulary used across rangegate:
//!
//! - **Object IDs**: A validated wrapper around the opaque handles remote
//!   stores use to name objects
//! - **Core Types**: Object metadata, validated byte ranges, and the transfer
//!   window derived from them
//! - **Error Handling**: Common error type and result alias
//!
//! # Examples
//!
//! ```
//! use rangegate_common::{ByteRange, Error, ObjectId, Result, TransferWindow};
//!
//! let id: ObjectId = "1a2b3c".parse().unwrap();
//! assert_eq!(id.as_str(), "1a2b3c");
//!
//! let range = ByteRange::new(100, 199).unwrap();
//! let window = TransferWindow::from(range);
//! assert_eq!(window.length, 100);
//!
//! fn example() -> Result<()> {
//!     Err(Error::not_found("object", "missing"))
//! }
//! assert!(example().is_err());
//! ```

pub mod error;
pub mod ids;
pub mod types;

pub use error::{Error, Result};
pub use ids::*;
pub use types::*;
