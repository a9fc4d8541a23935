//! Control plane context
//!
//! The explicitly constructed root object: owns both registries, the
//! placement engine, and the lifecycle coordinator, and exposes the
//! operations the outside world calls. Built once at startup, handed around
//! by reference (or `Arc`), dropped at shutdown. There is no module-level
//! state anywhere in the crate.

use std::sync::Arc;

use crate::error::Result;
use crate::lifecycle::{LifecycleCoordinator, PublishOutcome, UnpublishOutcome};
use crate::placement::{Placement, PlacementEngine, PlacementError};
use crate::playback::{self, PlaybackConfig, PlaybackUrls};
use crate::registry::{NodeId, NodeRegistry, Stream, StreamKey, StreamRegistry};

/// The assembled control plane
pub struct ControlPlane {
    nodes: Arc<NodeRegistry>,
    streams: Arc<StreamRegistry>,
    placement: PlacementEngine,
    coordinator: LifecycleCoordinator,
    playback: PlaybackConfig,
}

impl ControlPlane {
    /// Create a control plane with default playback addressing
    pub fn new() -> Self {
        Self::with_config(PlaybackConfig::default())
    }

    /// Create a control plane with custom playback addressing
    pub fn with_config(playback: PlaybackConfig) -> Self {
        let nodes = Arc::new(NodeRegistry::new());
        let streams = Arc::new(StreamRegistry::new());

        Self {
            placement: PlacementEngine::new(Arc::clone(&nodes)),
            coordinator: LifecycleCoordinator::new(Arc::clone(&nodes), Arc::clone(&streams)),
            nodes,
            streams,
            playback,
        }
    }

    /// The node registry (registration/heartbeat path)
    pub fn nodes(&self) -> &Arc<NodeRegistry> {
        &self.nodes
    }

    /// The stream registry (provisioning path)
    pub fn streams(&self) -> &Arc<StreamRegistry> {
        &self.streams
    }

    /// Provision a stream record, generating a key when none is given
    pub async fn create_stream(&self, key: Option<StreamKey>) -> Result<Stream> {
        Ok(self.streams.create(key).await?)
    }

    /// Pick the node the next encoder should push to
    pub async fn select_node(&self) -> std::result::Result<Placement, PlacementError> {
        self.placement.select_node().await
    }

    /// Publish callback from an ingest node
    pub async fn on_publish(
        &self,
        key: &StreamKey,
        reporting_node: Option<&NodeId>,
    ) -> PublishOutcome {
        self.coordinator.on_publish(key, reporting_node).await
    }

    /// Unpublish callback from an ingest node
    pub async fn on_unpublish(
        &self,
        key: &StreamKey,
        reporting_node: Option<&NodeId>,
    ) -> UnpublishOutcome {
        self.coordinator.on_unpublish(key, reporting_node).await
    }

    /// Playback URLs for a stream
    ///
    /// Direct-to-node protocols use the assigned node's address; an
    /// unassigned or unresolvable node falls back to the configured default.
    pub async fn playback_urls(&self, key: &StreamKey) -> Result<PlaybackUrls> {
        let stream = self.streams.find_by_key(key).await?;

        let node_address = match &stream.assigned_node {
            Some(node_id) => self.nodes.get(node_id).await.ok().map(|node| node.address),
            None => None,
        };

        Ok(playback::playback_urls(
            &self.playback,
            key,
            node_address.as_deref(),
        ))
    }
}

impl Default for ControlPlane {
    fn default() -> Self {
        Self::new()
    }
}
