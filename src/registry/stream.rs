//! Stream registry implementation
//!
//! Authoritative state for every stream the control plane knows about: key,
//! assigned node, lifecycle status, and start/end timestamps. Status
//! transitions are driven exclusively by the lifecycle coordinator; this
//! registry enforces per-stream atomicity of each individual transition.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::RwLock;

use super::error::RegistryError;
use super::ident::{NodeId, StreamKey};

/// Lifecycle status of a stream
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum StreamStatus {
    /// Provisioned, not yet publishing
    Offline,
    /// Currently publishing
    Live,
    /// Finished (terminal)
    Ended,
}

/// Point-in-time snapshot of a stream record
#[derive(Debug, Clone, Serialize)]
pub struct Stream {
    /// Opaque stream key
    pub stream_key: StreamKey,
    /// Node currently attributed with serving this stream, if any
    ///
    /// Weak reference by external node id; corrected after the fact to
    /// whichever node actually reports the publish.
    pub assigned_node: Option<NodeId>,
    /// Lifecycle status
    pub status: StreamStatus,
    /// When the stream went live
    pub start_time: Option<DateTime<Utc>>,
    /// When the stream ended
    pub end_time: Option<DateTime<Utc>>,
    /// When the record was created
    pub created_at: DateTime<Utc>,
}

/// Mutable record for a single stream
#[derive(Debug)]
struct StreamEntry {
    assigned_node: Option<NodeId>,
    status: StreamStatus,
    start_time: Option<DateTime<Utc>>,
    end_time: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
}

impl StreamEntry {
    fn new() -> Self {
        Self {
            assigned_node: None,
            status: StreamStatus::Offline,
            start_time: None,
            end_time: None,
            created_at: Utc::now(),
        }
    }

    fn snapshot(&self, key: &StreamKey) -> Stream {
        Stream {
            stream_key: key.clone(),
            assigned_node: self.assigned_node.clone(),
            status: self.status,
            start_time: self.start_time,
            end_time: self.end_time,
            created_at: self.created_at,
        }
    }
}

/// Registry of all streams
///
/// Same locking shape as [`NodeRegistry`](super::NodeRegistry): outer map
/// read-locked for lookup, per-entry write lock serializing every mutation of
/// one stream, so a publish/unpublish pair for the same key can never
/// interleave mid-transition.
pub struct StreamRegistry {
    /// Map of stream key to stream entry
    streams: RwLock<HashMap<StreamKey, Arc<RwLock<StreamEntry>>>>,
}

impl StreamRegistry {
    /// Create an empty stream registry
    pub fn new() -> Self {
        Self {
            streams: RwLock::new(HashMap::new()),
        }
    }

    /// Create a stream record
    ///
    /// Generates an unguessable key when none is supplied. New streams start
    /// Offline with no assigned node.
    pub async fn create(&self, key: Option<StreamKey>) -> Result<Stream, RegistryError> {
        let key = key.unwrap_or_else(StreamKey::generate);
        let mut streams = self.streams.write().await;

        if streams.contains_key(&key) {
            return Err(RegistryError::DuplicateStream(key));
        }

        let entry = StreamEntry::new();
        let snapshot = entry.snapshot(&key);

        tracing::info!(stream = %key, "Stream created");

        streams.insert(key, Arc::new(RwLock::new(entry)));
        Ok(snapshot)
    }

    /// Look up a stream by key
    pub async fn find_by_key(&self, key: &StreamKey) -> Result<Stream, RegistryError> {
        let entry_arc = self.entry(key).await?;
        let entry = entry_arc.read().await;
        Ok(entry.snapshot(key))
    }

    /// Mark a stream Live and stamp `start_time`
    ///
    /// Stamps a fresh `start_time` on every call; callers wanting strict
    /// idempotence check the current status first (the lifecycle coordinator
    /// does).
    pub async fn set_live(&self, key: &StreamKey) -> Result<Stream, RegistryError> {
        let entry_arc = self.entry(key).await?;
        let mut entry = entry_arc.write().await;

        entry.status = StreamStatus::Live;
        entry.start_time = Some(Utc::now());

        tracing::info!(stream = %key, "Stream live");
        Ok(entry.snapshot(key))
    }

    /// Mark a stream Ended and stamp `end_time`
    ///
    /// Ended is terminal: calling again is a no-op and the original
    /// `end_time` is preserved.
    pub async fn set_ended(&self, key: &StreamKey) -> Result<Stream, RegistryError> {
        let entry_arc = self.entry(key).await?;
        let mut entry = entry_arc.write().await;

        if entry.status != StreamStatus::Ended {
            entry.status = StreamStatus::Ended;
            entry.end_time = Some(Utc::now());
            tracing::info!(stream = %key, "Stream ended");
        }

        Ok(entry.snapshot(key))
    }

    /// Overwrite a stream's assigned node
    ///
    /// The placement suggestion is advisory; the assignment is corrected to
    /// whichever node actually accepted the publish.
    pub async fn reassign(&self, key: &StreamKey, node_id: NodeId) -> Result<Stream, RegistryError> {
        let entry_arc = self.entry(key).await?;
        let mut entry = entry_arc.write().await;

        entry.assigned_node = Some(node_id);

        Ok(entry.snapshot(key))
    }

    /// Total number of stream records
    pub async fn stream_count(&self) -> usize {
        self.streams.read().await.len()
    }

    async fn entry(&self, key: &StreamKey) -> Result<Arc<RwLock<StreamEntry>>, RegistryError> {
        let streams = self.streams.read().await;
        streams
            .get(key)
            .cloned()
            .ok_or_else(|| RegistryError::StreamNotFound(key.clone()))
    }
}

impl Default for StreamRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_create_generates_key() {
        let registry = StreamRegistry::new();

        let stream = registry.create(None).await.unwrap();
        assert_eq!(stream.stream_key.as_str().len(), 32);
        assert_eq!(stream.status, StreamStatus::Offline);
        assert!(stream.assigned_node.is_none());
    }

    #[tokio::test]
    async fn test_create_with_explicit_key() {
        let registry = StreamRegistry::new();
        let key = StreamKey::new("my-stream");

        let stream = registry.create(Some(key.clone())).await.unwrap();
        assert_eq!(stream.stream_key, key);

        let result = registry.create(Some(key)).await;
        assert!(matches!(result, Err(RegistryError::DuplicateStream(_))));
    }

    #[tokio::test]
    async fn test_set_live_stamps_start_time() {
        let registry = StreamRegistry::new();
        let stream = registry.create(None).await.unwrap();
        let key = stream.stream_key;

        let stream = registry.set_live(&key).await.unwrap();
        assert_eq!(stream.status, StreamStatus::Live);
        assert!(stream.start_time.is_some());
        assert!(stream.end_time.is_none());
    }

    #[tokio::test]
    async fn test_set_ended_is_terminal() {
        let registry = StreamRegistry::new();
        let stream = registry.create(None).await.unwrap();
        let key = stream.stream_key;

        registry.set_live(&key).await.unwrap();
        let ended = registry.set_ended(&key).await.unwrap();
        assert_eq!(ended.status, StreamStatus::Ended);
        let first_end = ended.end_time.unwrap();

        // Second call is a no-op; end_time does not move.
        let again = registry.set_ended(&key).await.unwrap();
        assert_eq!(again.end_time.unwrap(), first_end);
    }

    #[tokio::test]
    async fn test_reassign() {
        let registry = StreamRegistry::new();
        let stream = registry.create(None).await.unwrap();
        let key = stream.stream_key;

        let stream = registry.reassign(&key, NodeId::new("edge-a")).await.unwrap();
        assert_eq!(stream.assigned_node, Some(NodeId::new("edge-a")));

        let stream = registry.reassign(&key, NodeId::new("edge-b")).await.unwrap();
        assert_eq!(stream.assigned_node, Some(NodeId::new("edge-b")));
    }

    #[tokio::test]
    async fn test_unknown_key() {
        let registry = StreamRegistry::new();
        let key = StreamKey::new("missing");

        assert!(matches!(
            registry.find_by_key(&key).await,
            Err(RegistryError::StreamNotFound(_))
        ));
        assert!(matches!(
            registry.set_live(&key).await,
            Err(RegistryError::StreamNotFound(_))
        ));
    }
}
