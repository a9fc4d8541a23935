//! Node registry implementation
//!
//! Authoritative state for every ingest node in the fleet: identity, address,
//! capacity, health status, and the load counter the placement engine ranks
//! by. All mutation of a node record goes through this registry; the load
//! counter in particular is only ever touched by the lifecycle coordinator.

use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;
use tokio::sync::RwLock;

use super::error::RegistryError;
use super::ident::NodeId;

/// Health status of an ingest node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum NodeStatus {
    /// Accepting new streams
    Active,
    /// Serving existing streams, refusing new ones
    Draining,
    /// Not serving
    Offline,
}

/// Point-in-time snapshot of a node record
///
/// Registry operations return owned snapshots; the live record stays behind
/// the registry's locks.
#[derive(Debug, Clone, Serialize)]
pub struct Node {
    /// External node identifier
    pub node_id: NodeId,
    /// Network endpoint the node serves on (host or host:port)
    pub address: String,
    /// Health status
    pub status: NodeStatus,
    /// Maximum concurrent streams
    pub capacity: u32,
    /// Current concurrent streams (advisory, never negative)
    pub load: u32,
}

/// Mutable record for a single node
#[derive(Debug)]
struct NodeEntry {
    address: String,
    status: NodeStatus,
    capacity: u32,
    load: u32,
}

impl NodeEntry {
    fn snapshot(&self, node_id: &NodeId) -> Node {
        Node {
            node_id: node_id.clone(),
            address: self.address.clone(),
            status: self.status,
            capacity: self.capacity,
            load: self.load,
        }
    }
}

/// Registry of all ingest nodes
///
/// Thread-safe via `RwLock`: the outer map is read-locked for lookups, and
/// each entry carries its own lock so that load updates on one node serialize
/// without blocking the rest of the fleet. Increment/decrement are a single
/// read-modify-write inside the entry's write lock, so concurrent publishes
/// landing on the same node never lose an update.
pub struct NodeRegistry {
    /// Map of external node id to node entry
    nodes: RwLock<HashMap<NodeId, Arc<RwLock<NodeEntry>>>>,
}

impl NodeRegistry {
    /// Create an empty node registry
    pub fn new() -> Self {
        Self {
            nodes: RwLock::new(HashMap::new()),
        }
    }

    /// Register a node
    ///
    /// Registration arrives out of band (provisioning or first heartbeat).
    /// New nodes start Active with zero load. Fails if the id is taken.
    pub async fn register(
        &self,
        node_id: NodeId,
        address: impl Into<String>,
        capacity: u32,
    ) -> Result<Node, RegistryError> {
        let mut nodes = self.nodes.write().await;

        if nodes.contains_key(&node_id) {
            return Err(RegistryError::DuplicateNode(node_id));
        }

        let entry = NodeEntry {
            address: address.into(),
            status: NodeStatus::Active,
            capacity,
            load: 0,
        };
        let snapshot = entry.snapshot(&node_id);

        tracing::info!(
            node = %node_id,
            address = %snapshot.address,
            capacity = capacity,
            "Node registered"
        );

        nodes.insert(node_id, Arc::new(RwLock::new(entry)));
        Ok(snapshot)
    }

    /// Update a node's health status
    pub async fn set_status(
        &self,
        node_id: &NodeId,
        status: NodeStatus,
    ) -> Result<Node, RegistryError> {
        let entry_arc = self.entry(node_id).await?;
        let mut entry = entry_arc.write().await;

        entry.status = status;

        tracing::info!(node = %node_id, status = ?status, "Node status updated");
        Ok(entry.snapshot(node_id))
    }

    /// Look up a node by its external id
    pub async fn get(&self, node_id: &NodeId) -> Result<Node, RegistryError> {
        let entry_arc = self.entry(node_id).await?;
        let entry = entry_arc.read().await;
        Ok(entry.snapshot(node_id))
    }

    /// All nodes currently eligible to take new streams (status Active)
    ///
    /// Read-only; capacity filtering is the placement engine's job.
    pub async fn list_candidates(&self) -> Vec<Node> {
        let nodes = self.nodes.read().await;
        let mut candidates = Vec::new();

        for (node_id, entry_arc) in nodes.iter() {
            let entry = entry_arc.read().await;
            if entry.status == NodeStatus::Active {
                candidates.push(entry.snapshot(node_id));
            }
        }

        candidates
    }

    /// Atomically increase a node's load by one
    pub async fn increment_load(&self, node_id: &NodeId) -> Result<Node, RegistryError> {
        let entry_arc = self.entry(node_id).await?;
        let mut entry = entry_arc.write().await;

        entry.load += 1;

        tracing::debug!(node = %node_id, load = entry.load, "Node load incremented");
        Ok(entry.snapshot(node_id))
    }

    /// Atomically decrease a node's load by one, floored at zero
    pub async fn decrement_load(&self, node_id: &NodeId) -> Result<Node, RegistryError> {
        let entry_arc = self.entry(node_id).await?;
        let mut entry = entry_arc.write().await;

        if entry.load == 0 {
            tracing::warn!(node = %node_id, "Load decrement on idle node ignored");
        } else {
            entry.load -= 1;
            tracing::debug!(node = %node_id, load = entry.load, "Node load decremented");
        }

        Ok(entry.snapshot(node_id))
    }

    /// Total number of registered nodes
    pub async fn node_count(&self) -> usize {
        self.nodes.read().await.len()
    }

    /// Resolve an entry by external id; the map key is the one and only
    /// identifier nodes can be found by.
    async fn entry(&self, node_id: &NodeId) -> Result<Arc<RwLock<NodeEntry>>, RegistryError> {
        let nodes = self.nodes.read().await;
        nodes
            .get(node_id)
            .cloned()
            .ok_or_else(|| RegistryError::NodeNotFound(node_id.clone()))
    }
}

impl Default for NodeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_register_and_get() {
        let registry = NodeRegistry::new();
        let id = NodeId::new("edge-a");

        let node = registry.register(id.clone(), "10.0.0.1", 10).await.unwrap();
        assert_eq!(node.status, NodeStatus::Active);
        assert_eq!(node.load, 0);

        let fetched = registry.get(&id).await.unwrap();
        assert_eq!(fetched.address, "10.0.0.1");
        assert_eq!(fetched.capacity, 10);
    }

    #[tokio::test]
    async fn test_duplicate_register() {
        let registry = NodeRegistry::new();
        let id = NodeId::new("edge-a");

        registry.register(id.clone(), "10.0.0.1", 10).await.unwrap();
        let result = registry.register(id, "10.0.0.2", 10).await;

        assert!(matches!(result, Err(RegistryError::DuplicateNode(_))));
    }

    #[tokio::test]
    async fn test_increment_decrement() {
        let registry = NodeRegistry::new();
        let id = NodeId::new("edge-a");
        registry.register(id.clone(), "10.0.0.1", 10).await.unwrap();

        let node = registry.increment_load(&id).await.unwrap();
        assert_eq!(node.load, 1);

        let node = registry.decrement_load(&id).await.unwrap();
        assert_eq!(node.load, 0);
    }

    #[tokio::test]
    async fn test_decrement_floors_at_zero() {
        let registry = NodeRegistry::new();
        let id = NodeId::new("edge-a");
        registry.register(id.clone(), "10.0.0.1", 10).await.unwrap();

        let node = registry.decrement_load(&id).await.unwrap();
        assert_eq!(node.load, 0);
    }

    #[tokio::test]
    async fn test_unknown_node() {
        let registry = NodeRegistry::new();

        let result = registry.increment_load(&NodeId::new("ghost")).await;
        assert!(matches!(result, Err(RegistryError::NodeNotFound(_))));

        let result = registry.decrement_load(&NodeId::new("ghost")).await;
        assert!(matches!(result, Err(RegistryError::NodeNotFound(_))));
    }

    #[tokio::test]
    async fn test_lookup_only_by_node_id() {
        // The external id is the only field nodes resolve by; an id that
        // happens to equal another node's address must not match.
        let registry = NodeRegistry::new();
        registry
            .register(NodeId::new("edge-a"), "10.0.0.1", 10)
            .await
            .unwrap();

        let result = registry.get(&NodeId::new("10.0.0.1")).await;
        assert!(matches!(result, Err(RegistryError::NodeNotFound(_))));
    }

    #[tokio::test]
    async fn test_list_candidates_filters_status() {
        let registry = NodeRegistry::new();
        registry
            .register(NodeId::new("edge-a"), "10.0.0.1", 10)
            .await
            .unwrap();
        registry
            .register(NodeId::new("edge-b"), "10.0.0.2", 10)
            .await
            .unwrap();
        registry
            .set_status(&NodeId::new("edge-b"), NodeStatus::Draining)
            .await
            .unwrap();

        let candidates = registry.list_candidates().await;
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].node_id, NodeId::new("edge-a"));
    }

    #[tokio::test]
    async fn test_concurrent_increments_lose_nothing() {
        let registry = Arc::new(NodeRegistry::new());
        let id = NodeId::new("edge-a");
        registry.register(id.clone(), "10.0.0.1", 100).await.unwrap();

        let mut handles = Vec::new();
        for _ in 0..50 {
            let registry = Arc::clone(&registry);
            let id = id.clone();
            handles.push(tokio::spawn(async move {
                registry.increment_load(&id).await.unwrap();
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        let node = registry.get(&id).await.unwrap();
        assert_eq!(node.load, 50);
    }
}
