//! Storage backend seam for the archive sync
//!
//! The sync planner decides *what* to upload and under *which* key; the
//! actual transport (S3, GCS, anything) lives behind [`SegmentStore`] and is
//! supplied by the embedding application.

use std::path::Path;

use async_trait::async_trait;

/// Destination for archived manifests and segments
#[async_trait]
pub trait SegmentStore: Send + Sync {
    /// Upload one local file under the given object key
    async fn put(&self, local: &Path, key: &str) -> std::io::Result<()>;
}

#[async_trait]
impl<S: SegmentStore + ?Sized> SegmentStore for std::sync::Arc<S> {
    async fn put(&self, local: &Path, key: &str) -> std::io::Result<()> {
        (**self).put(local, key).await
    }
}

/// Store that logs what it would upload and uploads nothing
///
/// The default when no credentials are configured, so a misconfigured node
/// archives loudly instead of failing quietly.
pub struct DryRunStore;

#[async_trait]
impl SegmentStore for DryRunStore {
    async fn put(&self, local: &Path, key: &str) -> std::io::Result<()> {
        tracing::info!(local = %local.display(), key = %key, "Dry run: would upload");
        Ok(())
    }
}
