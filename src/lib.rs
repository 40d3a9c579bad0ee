//! rangegate - HTTP range-request streaming over sequential object stores
//!
//! This library crate exposes the server and streaming core for the binary
//! and for integration testing.

pub mod config;
pub mod server;
pub mod streaming;
