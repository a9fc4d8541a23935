//! Registry error types
//!
//! Error types for node and stream registry operations.

use super::ident::{NodeId, StreamKey};

/// Error type for registry operations
#[derive(Debug, Clone)]
pub enum RegistryError {
    /// No node with the given external id
    NodeNotFound(NodeId),
    /// A node with the given id is already registered
    DuplicateNode(NodeId),
    /// No stream with the given key
    StreamNotFound(StreamKey),
    /// A stream with the given key already exists
    DuplicateStream(StreamKey),
}

impl std::fmt::Display for RegistryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RegistryError::NodeNotFound(id) => write!(f, "Node not found: {}", id),
            RegistryError::DuplicateNode(id) => write!(f, "Node already registered: {}", id),
            RegistryError::StreamNotFound(key) => write!(f, "Stream not found: {}", key),
            RegistryError::DuplicateStream(key) => {
                write!(f, "Stream already exists: {}", key)
            }
        }
    }
}

impl std::error::Error for RegistryError {}
