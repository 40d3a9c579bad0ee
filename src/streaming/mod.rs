//! Range-request streaming.
//!
//! Turns a store that can only read objects front to back into an HTTP
//! endpoint with byte-range support.
//!
//! # Pipeline
//!
//! 1. [`metadata`]: fetch size, declared type and name
//! 2. [`range`]: parse the `Range` header and check it against the size
//! 3. [`mime`]: choose the `Content-Type`
//! 4. [`response`]: commit status and headers
//! 5. [`session`]: open the upstream read and discard up to the offset
//! 6. [`copy`]: forward exactly the window length in bounded chunks
//!
//! # Routes
//!
//! - `GET|HEAD /media/stream/{object_id}` - object bytes, honouring `Range`

pub mod copy;
mod gateway;
pub mod metadata;
pub mod mime;
pub mod range;
pub mod response;
pub mod session;
pub mod transfer;

pub use gateway::{error_status, GatewayConfig, StreamGateway};
pub use transfer::{TransferJob, TransferOutcome};

use axum::{
    extract::{Path, State},
    http::{header, HeaderMap, Method},
    response::Response,
    routing::get,
    Extension, Router,
};

use crate::server::{AppContext, AppError, RequestId};

/// Serve an object, or the requested byte range of it.
pub async fn stream_object(
    State(ctx): State<AppContext>,
    Extension(request_id): Extension<RequestId>,
    method: Method,
    Path(object_id): Path<String>,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    ctx.gateway
        .serve(
            &object_id,
            headers.get(header::RANGE),
            method == Method::HEAD,
        )
        .await
        .map_err(|e| AppError::from(e).with_request_id(request_id.0))
}

/// Create streaming router.
pub fn stream_router() -> Router<AppContext> {
    Router::new().route("/:object_id", get(stream_object))
}
