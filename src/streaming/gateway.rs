//! Range-request gateway over a sequential-only store.
//!
//! Request flow: metadata lookup, range decision, headers committed, then a
//! spawned transfer task feeds the body through a one-slot channel. The
//! channel bounds memory to a single chunk per response and lets a client
//! disconnect surface as a failed send.

use std::io;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{HeaderValue, StatusCode};
use axum::response::Response;
use bytes::Bytes;
use rangegate_common::{Error, ObjectId, ObjectMetadata, Result};
use rangegate_store::RemoteStore;
use reqwest::Url;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;

use super::copy::ChannelSink;
use super::metadata::resolve_metadata;
use super::mime::resolve_content_type;
use super::range::{self, RangeDecision};
use super::response::ResponsePlan;
use super::transfer::TransferJob;

/// Construction-time settings for [`StreamGateway`].
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Copy buffer size per transfer.
    pub buffer_size: usize,
    /// Base URL clients reach the server at.
    pub public_base_url: Url,
}

impl GatewayConfig {
    pub fn new(buffer_size: usize, public_base_url: &str) -> Result<Self> {
        let public_base_url = Url::parse(public_base_url).map_err(|e| {
            Error::validation(format!("invalid public base URL '{public_base_url}': {e}"))
        })?;
        if public_base_url.cannot_be_a_base() {
            return Err(Error::validation(format!(
                "public base URL '{public_base_url}' cannot carry a path"
            )));
        }
        Ok(Self {
            buffer_size: buffer_size.max(1),
            public_base_url,
        })
    }
}

/// Serves byte ranges of objects held in a [`RemoteStore`].
pub struct StreamGateway {
    store: Arc<dyn RemoteStore>,
    config: GatewayConfig,
}

impl StreamGateway {
    pub fn new(store: Arc<dyn RemoteStore>, config: GatewayConfig) -> Self {
        Self { store, config }
    }

    pub fn store(&self) -> &Arc<dyn RemoteStore> {
        &self.store
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    /// Public URL of the streaming endpoint for `id`.
    pub fn stream_url(&self, id: &ObjectId) -> String {
        let mut url = self.config.public_base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments
                .pop_if_empty()
                .push("media")
                .push("stream")
                .push(id.as_str());
        }
        url.to_string()
    }

    /// Fetch metadata, logging the failure kind.
    pub async fn metadata(&self, id: &ObjectId) -> Result<ObjectMetadata> {
        resolve_metadata(self.store.as_ref(), id).await
    }

    /// Answer one streaming request.
    ///
    /// `Err` only before any header is committed: an unusable id or an object
    /// whose metadata cannot be resolved. Both are reported as not found.
    pub async fn serve(
        &self,
        raw_id: &str,
        range_header: Option<&HeaderValue>,
        head_only: bool,
    ) -> Result<Response> {
        let id = ObjectId::new(raw_id).map_err(|e| {
            tracing::warn!(object_id = raw_id, error = %e, "Rejected object id");
            Error::not_found("object", raw_id)
        })?;

        let metadata = self.metadata(&id).await.map_err(|e| {
            if e.is_not_found() {
                e
            } else {
                Error::not_found("object", &id)
            }
        })?;

        let content_type = resolve_content_type(
            metadata.declared_mime_type.as_deref(),
            metadata.name.as_deref(),
        );
        let decision = range::evaluate(range_header, metadata.size);
        let plan = ResponsePlan::new(&decision, content_type);

        match decision {
            RangeDecision::Unsatisfiable { size } => {
                tracing::info!(
                    object_id = %id,
                    range = ?range_header,
                    size,
                    "Range not satisfiable"
                );
                return Ok(plan.into_response(Body::empty()));
            }
            RangeDecision::Partial { range, size } => tracing::info!(
                object_id = %id,
                range = %range,
                size,
                "Streaming partial content"
            ),
            RangeDecision::Full { size } => {
                tracing::info!(object_id = %id, size, "Streaming full content")
            }
        }

        let window = plan.window;
        if head_only || window.length == 0 {
            return Ok(plan.into_response(Body::empty()));
        }

        let (tx, rx) = mpsc::channel::<io::Result<Bytes>>(1);
        let job = TransferJob {
            store: Arc::clone(&self.store),
            object_id: id,
            window,
            buffer_size: self.config.buffer_size,
        };
        tokio::spawn(async move {
            let mut sink = ChannelSink::new(tx);
            job.run(&mut sink).await;
        });

        Ok(plan.into_response(Body::from_stream(ReceiverStream::new(rx))))
    }
}

impl std::fmt::Debug for StreamGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StreamGateway")
            .field("store", &self.store.name())
            .field("config", &self.config)
            .finish()
    }
}

/// Status returned for requests the gateway cannot answer with an object.
pub fn error_status(error: &Error) -> StatusCode {
    StatusCode::from_u16(error.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::header;
    use http_body_util::BodyExt;
    use rangegate_store::MemoryStore;

    fn gateway(store: &MemoryStore) -> StreamGateway {
        StreamGateway::new(
            Arc::new(store.clone()),
            GatewayConfig::new(1024, "http://media.example.test/api/").unwrap(),
        )
    }

    fn id(raw: &str) -> ObjectId {
        raw.parse().unwrap()
    }

    #[test]
    fn test_stream_url_joins_base_path() {
        let g = gateway(&MemoryStore::new());
        assert_eq!(
            g.stream_url(&id("my clip.mp4")),
            "http://media.example.test/api/media/stream/my%20clip.mp4"
        );
    }

    #[test]
    fn test_config_rejects_bad_base() {
        assert!(GatewayConfig::new(1024, "not a url").is_err());
        assert!(GatewayConfig::new(1024, "data:text/plain,hi").is_err());
    }

    #[tokio::test]
    async fn test_serve_partial_body() {
        let store = MemoryStore::new();
        let data: Vec<u8> = (0..200u8).collect();
        store.insert(id("a.mp4"), data.clone(), None);

        let value = HeaderValue::from_static("bytes=10-19");
        let response = gateway(&store)
            .serve("a.mp4", Some(&value), false)
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::PARTIAL_CONTENT);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "video/mp4");

        let body = response.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(&body[..], &data[10..20]);
    }

    #[tokio::test]
    async fn test_head_has_headers_but_no_body() {
        let store = MemoryStore::new();
        store.insert(id("a.mp3"), vec![7u8; 64], None);

        let response = gateway(&store).serve("a.mp3", None, true).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_LENGTH], "64");
        let body = response.into_body().collect().await.unwrap().to_bytes();
        assert!(body.is_empty());
    }

    #[tokio::test]
    async fn test_missing_and_invalid_ids_are_not_found() {
        let g = gateway(&MemoryStore::new());
        let err = g.serve("nope", None, false).await.unwrap_err();
        assert_eq!(error_status(&err), StatusCode::NOT_FOUND);

        let err = g.serve("", None, false).await.unwrap_err();
        assert_eq!(error_status(&err), StatusCode::NOT_FOUND);

        let err = g.serve("..", None, false).await.unwrap_err();
        assert_eq!(error_status(&err), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_empty_object_is_empty_ok() {
        let store = MemoryStore::new();
        store.insert(id("empty"), Vec::<u8>::new(), None);

        let response = gateway(&store).serve("empty", None, false).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_LENGTH], "0");
    }
}
