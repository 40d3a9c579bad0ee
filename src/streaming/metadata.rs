//! Per-request metadata lookup.

use rangegate_common::{Error, ObjectId, ObjectMetadata, Result};
use rangegate_store::RemoteStore;

/// Fetch fresh metadata for one request.
///
/// Failures are logged with their `kind` and returned unchanged; callers
/// decide how they surface. Nothing is retried.
pub async fn resolve_metadata(store: &dyn RemoteStore, id: &ObjectId) -> Result<ObjectMetadata> {
    match store.get_metadata(id).await {
        Ok(metadata) => {
            tracing::debug!(
                object_id = %id,
                store = store.name(),
                size = metadata.size,
                declared_mime_type = ?metadata.declared_mime_type,
                "Resolved object metadata"
            );
            Ok(metadata)
        }
        Err(e) => {
            match &e {
                Error::NotFound { .. } => tracing::warn!(
                    object_id = %id,
                    store = store.name(),
                    kind = e.kind(),
                    "Object not found"
                ),
                _ => tracing::error!(
                    object_id = %id,
                    store = store.name(),
                    kind = e.kind(),
                    error = %e,
                    "Object metadata unavailable"
                ),
            }
            Err(e)
        }
    }
}
