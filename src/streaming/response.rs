//! Status line and headers for a streamed object.

use axum::body::Body;
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::Response;
use rangegate_common::TransferWindow;

use super::mime::OCTET_STREAM;
use super::range::RangeDecision;

/// The committed part of a response: everything except the body bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponsePlan {
    pub status: StatusCode,
    pub window: TransferWindow,
    pub content_type: String,
    pub content_range: Option<String>,
}

impl ResponsePlan {
    pub fn new(decision: &RangeDecision, content_type: impl Into<String>) -> Self {
        Self {
            status: decision.status(),
            window: decision.window(),
            content_type: content_type.into(),
            content_range: decision.content_range(),
        }
    }

    /// `Content-Length` promised to the client.
    pub fn content_length(&self) -> u64 {
        self.window.length
    }

    /// Build the response around `body`, which must yield exactly
    /// [`ResponsePlan::content_length`] bytes or fail.
    pub fn into_response(self, body: Body) -> Response {
        let mut response = Response::new(body);
        *response.status_mut() = self.status;

        let headers = response.headers_mut();
        headers.insert(header::ACCEPT_RANGES, HeaderValue::from_static("bytes"));
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_str(&self.content_type)
                .unwrap_or_else(|_| HeaderValue::from_static(OCTET_STREAM)),
        );
        headers.insert(header::CONTENT_LENGTH, HeaderValue::from(self.window.length));
        if let Some(range) = self.content_range {
            if let Ok(value) = HeaderValue::from_str(&range) {
                headers.insert(header::CONTENT_RANGE, value);
            }
        }
        response
    }
}
