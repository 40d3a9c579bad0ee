//! Object description endpoint.

use axum::{
    extract::{Path, State},
    routing::get,
    Extension, Json, Router,
};
use rangegate_common::{Error, ObjectId};
use serde::Serialize;

use super::{AppContext, AppError, RequestId};
use crate::streaming::mime::resolve_content_type;

/// JSON description of one object.
#[derive(Debug, Serialize)]
pub struct MediaInfoResponse {
    pub id: String,
    pub name: Option<String>,
    pub size: u64,
    pub mime_type: String,
    pub stream_url: String,
}

/// Describe an object and where to stream it from.
pub async fn get_media_info(
    State(ctx): State<AppContext>,
    Extension(request_id): Extension<RequestId>,
    Path(object_id): Path<String>,
) -> Result<Json<MediaInfoResponse>, AppError> {
    let with_id = |e: Error| AppError::from(e).with_request_id(request_id.0.clone());

    let id = ObjectId::new(&object_id)
        .map_err(|_| with_id(Error::not_found("object", &object_id)))?;
    let metadata = ctx.gateway.metadata(&id).await.map_err(|e| {
        if e.is_not_found() {
            with_id(e)
        } else {
            with_id(Error::not_found("object", &id))
        }
    })?;

    Ok(Json(MediaInfoResponse {
        mime_type: resolve_content_type(
            metadata.declared_mime_type.as_deref(),
            metadata.name.as_deref(),
        ),
        stream_url: ctx.gateway.stream_url(&id),
        name: metadata.name,
        size: metadata.size,
        id: id.to_string(),
    }))
}

pub fn media_routes() -> Router<AppContext> {
    Router::new().route("/:object_id", get(get_media_info))
}
