//! Shared test harness for integration tests.
//!
//! Provides [`TestHarness`] which wires a [`MemoryStore`] (or any other
//! [`RemoteStore`]) into a full [`AppContext`]. The `with_server`
//! constructors start Axum on a random port for HTTP-level testing.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;

use rangegate::config::Config;
use rangegate::server::{create_router, AppContext};
use rangegate_common::ObjectId;
use rangegate_store::{MemoryStore, RemoteStore};

/// Test harness wrapping a fully-constructed [`AppContext`].
pub struct TestHarness {
    pub ctx: AppContext,
    pub store: MemoryStore,
}

impl TestHarness {
    /// Create a new harness with default configuration and an empty store.
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    /// Create a new harness with a custom configuration and an empty store.
    pub fn with_config(config: Config) -> Self {
        let store = MemoryStore::with_chunk_size(4096);
        let ctx = AppContext::new(config, Arc::new(store.clone()))
            .expect("failed to build app context");
        Self { ctx, store }
    }

    /// Start an Axum server on a random port and return the harness together
    /// with the bound socket address.
    pub async fn with_server() -> (Self, SocketAddr) {
        let harness = Self::new();
        let addr = spawn(harness.ctx.clone()).await;
        (harness, addr)
    }

    /// Start an Axum server in front of an arbitrary store.
    pub async fn with_store(store: Arc<dyn RemoteStore>) -> SocketAddr {
        let ctx = AppContext::new(Config::default(), store).expect("failed to build app context");
        spawn(ctx).await
    }

    /// Add an object to the harness store.
    pub fn put(
        &self,
        id: &str,
        data: impl Into<bytes::Bytes>,
        mime_type: Option<&str>,
    ) -> ObjectId {
        let id: ObjectId = id.parse().expect("invalid test object id");
        self.store.insert(id.clone(), data, mime_type);
        id
    }
}

async fn spawn(ctx: AppContext) -> SocketAddr {
    let app = create_router(ctx);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("failed to bind random port");
    let addr = listener.local_addr().expect("failed to get local addr");

    tokio::spawn(async move {
        axum::serve(listener, app).await.ok();
    });

    addr
}

/// Deterministic, non-repeating-looking test payload.
pub fn pattern(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i.wrapping_mul(31) % 251) as u8).collect()
}
