//! Google Drive v3 store.
//!
//! Metadata comes from `files.get` with a field mask; content comes from
//! `files.get?alt=media`, which streams the whole file from byte 0. This
//! backend never sends an upstream `Range` header: positioning is left to the
//! discard-read skip of [`StreamByteSource`].

use std::io;
use std::time::Duration;

use async_trait::async_trait;
use futures::TryStreamExt;
use rangegate_common::{Error, ObjectId, ObjectMetadata, Result};
use reqwest::{Client, RequestBuilder, StatusCode, Url};
use serde::Deserialize;

use crate::source::StreamByteSource;
use crate::store::{ByteSource, RemoteStore};

/// Public Drive v3 endpoint.
pub const DEFAULT_API_BASE: &str = "https://www.googleapis.com/drive/v3";

/// Fields requested from `files.get`.
const METADATA_FIELDS: &str = "id,name,mimeType,size";

/// Connection settings for [`DriveStore`].
#[derive(Debug, Clone)]
pub struct DriveOptions {
    /// API root, e.g. [`DEFAULT_API_BASE`].
    pub api_base: String,
    /// OAuth access token sent as `Authorization: Bearer`.
    pub access_token: Option<String>,
    /// API key sent as the `key` query parameter.
    pub api_key: Option<String>,
    /// Limit on establishing a connection. Reads have no timeout.
    pub connect_timeout: Duration,
}

impl Default for DriveOptions {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            access_token: None,
            api_key: None,
            connect_timeout: Duration::from_secs(10),
        }
    }
}

/// A [`RemoteStore`] reading from Google Drive.
pub struct DriveStore {
    client: Client,
    api_base: Url,
    access_token: Option<String>,
    api_key: Option<String>,
}

/// Subset of the Drive `File` resource we ask for.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DriveFile {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    mime_type: Option<String>,
    #[serde(default)]
    size: Option<DriveSize>,
}

/// Drive encodes int64 fields as JSON strings; accept plain numbers too.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum DriveSize {
    Text(String),
    Number(u64),
}

impl DriveSize {
    fn value(&self) -> Option<u64> {
        match self {
            DriveSize::Text(s) => s.trim().parse().ok(),
            DriveSize::Number(n) => Some(*n),
        }
    }
}

impl DriveStore {
    pub fn new(options: DriveOptions) -> Result<Self> {
        let api_base = Url::parse(options.api_base.trim_end_matches('/')).map_err(|e| {
            Error::validation(format!("invalid Drive api_base '{}': {e}", options.api_base))
        })?;
        if api_base.cannot_be_a_base() {
            return Err(Error::validation(format!(
                "Drive api_base '{}' cannot carry a path",
                options.api_base
            )));
        }

        let client = Client::builder()
            .connect_timeout(options.connect_timeout)
            .build()
            .map_err(|e| Error::Internal(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_base,
            access_token: non_blank(options.access_token),
            api_key: non_blank(options.api_key),
        })
    }

    /// `{api_base}/files/{id}` with the id percent-encoded as one segment.
    fn file_url(&self, id: &ObjectId) -> Result<Url> {
        let mut url = self.api_base.clone();
        url.path_segments_mut()
            .map_err(|_| Error::Internal("Drive api_base cannot carry a path".into()))?
            .pop_if_empty()
            .push("files")
            .push(id.as_str());
        Ok(url)
    }

    fn get(&self, url: Url) -> RequestBuilder {
        let mut request = self
            .client
            .get(url)
            .query(&[("supportsAllDrives", "true")]);
        if let Some(ref token) = self.access_token {
            request = request.bearer_auth(token);
        }
        if let Some(ref key) = self.api_key {
            request = request.query(&[("key", key.as_str())]);
        }
        request
    }

    /// Send a request and sort the response status into the store taxonomy.
    async fn send(
        &self,
        id: &ObjectId,
        request: RequestBuilder,
        what: &str,
    ) -> Result<reqwest::Response> {
        let response = request
            .send()
            .await
            .map_err(|e| Error::upstream(format!("Drive {what} request for {id} failed: {e}")))?;

        match response.status() {
            status if status.is_success() => Ok(response),
            StatusCode::NOT_FOUND => Err(Error::not_found("object", id)),
            status => {
                let body = response.text().await.unwrap_or_default();
                tracing::debug!(
                    object_id = %id,
                    %status,
                    body = %body,
                    "Drive {what} request rejected"
                );
                Err(Error::upstream(format!(
                    "Drive {what} request for {id} returned {status}"
                )))
            }
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[async_trait]
impl RemoteStore for DriveStore {
    fn name(&self) -> &'static str {
        "drive"
    }

    async fn get_metadata(&self, id: &ObjectId) -> Result<ObjectMetadata> {
        let request = self
            .get(self.file_url(id)?)
            .query(&[("fields", METADATA_FIELDS)]);
        let response = self.send(id, request, "metadata").await?;

        let file: DriveFile = response
            .json()
            .await
            .map_err(|e| Error::upstream(format!("Drive metadata for {id} is unreadable: {e}")))?;

        // Native Docs/Sheets files have no byte size and cannot be streamed.
        let Some(size) = file.size.as_ref().and_then(DriveSize::value) else {
            tracing::debug!(object_id = %id, "Drive metadata has no usable size");
            return Err(Error::not_found("object", id));
        };

        Ok(ObjectMetadata {
            size,
            declared_mime_type: file.mime_type,
            name: file.name,
        })
    }

    async fn open_sequential_read(&self, id: &ObjectId) -> Result<Box<dyn ByteSource>> {
        let request = self.get(self.file_url(id)?).query(&[("alt", "media")]);
        let response = self.send(id, request, "media").await?;

        let chunks = response.bytes_stream().map_err(io::Error::other);
        Ok(Box::new(StreamByteSource::new(chunks)))
    }
}
