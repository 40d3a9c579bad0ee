//! Error-to-HTTP response conversion.
//!
//! Wraps [`rangegate_common::Error`] so handlers can return it as a JSON
//! error body with the matching status code.

use axum::response::{IntoResponse, Response};
use serde_json::json;

use crate::streaming::error_status;

/// Wrapper so we can implement `IntoResponse` for an external type.
#[derive(Debug)]
pub struct AppError {
    inner: rangegate_common::Error,
    request_id: Option<String>,
}

impl AppError {
    pub fn new(inner: rangegate_common::Error) -> Self {
        Self {
            inner,
            request_id: None,
        }
    }

    pub fn with_request_id(mut self, id: String) -> Self {
        self.request_id = Some(id);
        self
    }
}

impl From<rangegate_common::Error> for AppError {
    fn from(e: rangegate_common::Error) -> Self {
        Self::new(e)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = error_status(&self.inner);

        if status.is_server_error() {
            tracing::error!(
                status = %status,
                error = %self.inner,
                "Server error in handler"
            );
        }

        let body = json!({
            "error": self.inner.to_string(),
            "code": self.inner.kind(),
            "request_id": self.request_id,
        });

        (status, axum::Json(body)).into_response()
    }
}
