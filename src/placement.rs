//! Capacity-aware node placement
//!
//! Answers "which node should accept the next stream": filter the fleet to
//! Active nodes with headroom, pick the least loaded. Pure read + ranking
//! over the node registry; selecting a node mutates nothing, so a caller
//! that times out can simply ask again.
//!
//! Load is advisory capacity accounting, not a hard admission limit: between
//! selection and the publish actually landing, other streams may take the
//! same node past its capacity. A homogeneous fleet is assumed, so ranking is
//! by absolute load; a mixed-capacity fleet would want load fraction instead.

use std::sync::Arc;

use serde::Serialize;

use crate::registry::{NodeId, NodeRegistry};

/// A placement decision: where the next stream should go
#[derive(Debug, Clone, Serialize)]
pub struct Placement {
    /// External id of the selected node
    pub node_id: NodeId,
    /// Endpoint the encoder should push to
    pub address: String,
}

/// Error type for placement
#[derive(Debug, Clone)]
pub enum PlacementError {
    /// Every Active node is at capacity (or there are none)
    ///
    /// Expected under fleet saturation; callers retry or alert, they do not
    /// crash.
    NoCapacity,
}

impl std::fmt::Display for PlacementError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PlacementError::NoCapacity => {
                write!(f, "No capacity available across the fleet")
            }
        }
    }
}

impl std::error::Error for PlacementError {}

/// Selects the best node for a new stream
pub struct PlacementEngine {
    nodes: Arc<NodeRegistry>,
}

impl PlacementEngine {
    /// Create a placement engine over a node registry
    pub fn new(nodes: Arc<NodeRegistry>) -> Self {
        Self { nodes }
    }

    /// Select the Active node with the lowest load and spare capacity
    ///
    /// Ties break by node id ascending so the choice is reproducible.
    pub async fn select_node(&self) -> Result<Placement, PlacementError> {
        let mut candidates = self.nodes.list_candidates().await;
        candidates.retain(|node| node.load < node.capacity);
        candidates.sort_by(|a, b| {
            a.load
                .cmp(&b.load)
                .then_with(|| a.node_id.cmp(&b.node_id))
        });

        let best = candidates.into_iter().next().ok_or(PlacementError::NoCapacity)?;

        tracing::debug!(
            node = %best.node_id,
            load = best.load,
            capacity = best.capacity,
            "Node selected for placement"
        );

        Ok(Placement {
            node_id: best.node_id,
            address: best.address,
        })
    }
}
