//! Archive sync planner
//!
//! Walks the ingest node's local segment directory and ships finished DASH
//! manifests and segments to a [`SegmentStore`]. Layout on disk is
//! `{watch_dir}/{app}/{stream}.mpd` with sibling `{stream}-{seq}.m4s`
//! segments; object keys are `{prefix}/{node_id}/{app}/{stream}/{file}`.
//!
//! The `node_id` in the key is the same canonical external id the lifecycle
//! coordinator attributes load to; archival and accounting must agree about
//! which node served a stream.
//!
//! Manifests are re-uploaded every pass (they change while the stream is
//! live); segments are immutable and uploaded once. The uploaded set is
//! pruned to files still on disk each pass so it cannot grow without bound.

use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;

use crate::registry::NodeId;

use super::store::SegmentStore;

/// Configuration for the archive sync loop
#[derive(Debug, Clone)]
pub struct ArchiveConfig {
    /// External id of the node this sync runs on; prefixes every object key
    pub node_id: NodeId,

    /// Root directory the ingest server writes segments under
    pub watch_dir: PathBuf,

    /// Leading component of every object key
    pub prefix: String,

    /// Delay between sync passes
    pub interval: Duration,
}

impl ArchiveConfig {
    /// Create a config for the given node and watch directory
    pub fn new(node_id: NodeId, watch_dir: impl Into<PathBuf>) -> Self {
        Self {
            node_id,
            watch_dir: watch_dir.into(),
            prefix: "backups".to_owned(),
            interval: Duration::from_secs(30),
        }
    }

    /// Set the object key prefix
    pub fn prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    /// Set the sync interval
    pub fn interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }
}

/// Periodically ships finished segments and manifests to a store
pub struct Archiver<S: SegmentStore> {
    config: ArchiveConfig,
    store: S,

    /// Segment paths already shipped, pruned against disk each pass
    uploaded: Mutex<HashSet<PathBuf>>,
}

impl<S: SegmentStore> Archiver<S> {
    /// Create an archiver over a store
    pub fn new(config: ArchiveConfig, store: S) -> Self {
        Self {
            config,
            store,
            uploaded: Mutex::new(HashSet::new()),
        }
    }

    /// Run one sync pass; returns the number of files shipped
    ///
    /// Store failures are logged and skipped; a flaky backend must not stall
    /// the scan, the next pass retries anything still on disk.
    pub async fn sync_once(&self) -> std::io::Result<usize> {
        if !tokio::fs::try_exists(&self.config.watch_dir).await? {
            tracing::warn!(
                dir = %self.config.watch_dir.display(),
                "Watch directory does not exist yet"
            );
            return Ok(0);
        }

        let mut shipped = 0;
        let mut on_disk = HashSet::new();

        let mut apps = tokio::fs::read_dir(&self.config.watch_dir).await?;
        while let Some(app_dir) = apps.next_entry().await? {
            if !app_dir.file_type().await?.is_dir() {
                continue;
            }
            let app_name = app_dir.file_name().to_string_lossy().into_owned();

            // First pass over the app directory: manifests identify streams.
            let mut streams = Vec::new();
            let mut entries = tokio::fs::read_dir(app_dir.path()).await?;
            while let Some(entry) = entries.next_entry().await? {
                let path = entry.path();
                if path.extension().is_some_and(|ext| ext == "mpd") {
                    if let Some(stem) = path.file_stem() {
                        streams.push((stem.to_string_lossy().into_owned(), path));
                    }
                }
            }

            for (stream, manifest) in streams {
                let manifest_name = manifest
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default();

                // Manifests change while the stream is live; ship every pass.
                if self
                    .ship(&manifest, &app_name, &stream, &manifest_name)
                    .await
                {
                    shipped += 1;
                }

                let segment_prefix = format!("{}-", stream);
                let mut entries = tokio::fs::read_dir(app_dir.path()).await?;
                while let Some(entry) = entries.next_entry().await? {
                    let path = entry.path();
                    let name = entry.file_name().to_string_lossy().into_owned();

                    if !name.starts_with(&segment_prefix)
                        || !path.extension().is_some_and(|ext| ext == "m4s")
                    {
                        continue;
                    }
                    on_disk.insert(path.clone());

                    let already = self.uploaded.lock().await.contains(&path);
                    if already {
                        continue;
                    }

                    if self.ship(&path, &app_name, &stream, &name).await {
                        shipped += 1;
                        self.uploaded.lock().await.insert(path);
                    }
                }
            }
        }

        // Forget segments that left the disk so the set stays bounded.
        self.uploaded
            .lock()
            .await
            .retain(|path| on_disk.contains(path));

        Ok(shipped)
    }

    /// Loop sync passes on the configured interval
    ///
    /// Returns a handle that can be used to abort the task.
    pub fn spawn(self: &Arc<Self>) -> tokio::task::JoinHandle<()>
    where
        S: 'static,
    {
        let archiver = Arc::clone(self);
        let interval = archiver.config.interval;

        tracing::info!(
            node = %archiver.config.node_id,
            dir = %archiver.config.watch_dir.display(),
            "Archive sync started"
        );

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            loop {
                ticker.tick().await;
                if let Err(e) = archiver.sync_once().await {
                    tracing::error!(error = %e, "Archive sync pass failed");
                }
            }
        })
    }

    async fn ship(
        &self,
        path: &std::path::Path,
        app: &str,
        stream: &str,
        file_name: &str,
    ) -> bool {
        let key = format!(
            "{}/{}/{}/{}/{}",
            self.config.prefix, self.config.node_id, app, stream, file_name
        );

        match self.store.put(path, &key).await {
            Ok(()) => {
                tracing::debug!(key = %key, "Uploaded");
                true
            }
            Err(e) => {
                tracing::error!(key = %key, error = %e, "Upload failed");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use async_trait::async_trait;

    use super::*;

    /// Store that records keys instead of uploading
    #[derive(Default)]
    struct MemoryStore {
        keys: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl SegmentStore for MemoryStore {
        async fn put(&self, _local: &Path, key: &str) -> std::io::Result<()> {
            self.keys.lock().await.push(key.to_owned());
            Ok(())
        }
    }

    fn archiver(dir: &Path) -> (Arc<MemoryStore>, Archiver<Arc<MemoryStore>>) {
        let store = Arc::new(MemoryStore::default());
        let config = ArchiveConfig::new(NodeId::new("edge-a"), dir);
        (Arc::clone(&store), Archiver::new(config, store))
    }

    async fn touch(path: &Path) {
        tokio::fs::write(path, b"x").await.unwrap();
    }

    #[tokio::test]
    async fn test_sync_ships_manifest_and_segments() {
        let dir = tempfile::tempdir().unwrap();
        let app = dir.path().join("live");
        tokio::fs::create_dir(&app).await.unwrap();
        touch(&app.join("s1.mpd")).await;
        touch(&app.join("s1-0.m4s")).await;
        touch(&app.join("s1-1.m4s")).await;
        touch(&app.join("notes.txt")).await;

        let (store, archiver) = archiver(dir.path());
        let shipped = archiver.sync_once().await.unwrap();
        assert_eq!(shipped, 3);

        let mut keys = store.keys.lock().await.clone();
        keys.sort();
        assert_eq!(
            keys,
            vec![
                "backups/edge-a/live/s1/s1-0.m4s",
                "backups/edge-a/live/s1/s1-1.m4s",
                "backups/edge-a/live/s1/s1.mpd",
            ]
        );
    }

    #[tokio::test]
    async fn test_segments_ship_once_manifests_every_pass() {
        let dir = tempfile::tempdir().unwrap();
        let app = dir.path().join("live");
        tokio::fs::create_dir(&app).await.unwrap();
        touch(&app.join("s1.mpd")).await;
        touch(&app.join("s1-0.m4s")).await;

        let (store, archiver) = archiver(dir.path());
        archiver.sync_once().await.unwrap();
        let shipped = archiver.sync_once().await.unwrap();

        // Second pass: manifest again, segment skipped.
        assert_eq!(shipped, 1);
        let keys = store.keys.lock().await;
        let segments = keys.iter().filter(|k| k.ends_with(".m4s")).count();
        let manifests = keys.iter().filter(|k| k.ends_with(".mpd")).count();
        assert_eq!(segments, 1);
        assert_eq!(manifests, 2);
    }

    #[tokio::test]
    async fn test_uploaded_set_prunes_deleted_segments() {
        let dir = tempfile::tempdir().unwrap();
        let app = dir.path().join("live");
        tokio::fs::create_dir(&app).await.unwrap();
        touch(&app.join("s1.mpd")).await;
        let segment = app.join("s1-0.m4s");
        touch(&segment).await;

        let (store, archiver) = archiver(dir.path());
        archiver.sync_once().await.unwrap();

        // Segment rotated out and a new file reuses the name later.
        tokio::fs::remove_file(&segment).await.unwrap();
        archiver.sync_once().await.unwrap();
        touch(&segment).await;
        archiver.sync_once().await.unwrap();

        let keys = store.keys.lock().await;
        let segments = keys
            .iter()
            .filter(|k| k.ends_with("s1-0.m4s"))
            .count();
        assert_eq!(segments, 2);
    }

    #[tokio::test]
    async fn test_missing_watch_dir_is_not_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("not-there");

        let (_store, archiver) = archiver(&missing);
        let shipped = archiver.sync_once().await.unwrap();
        assert_eq!(shipped, 0);
    }
}
