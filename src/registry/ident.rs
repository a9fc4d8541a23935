//! Identifier types for nodes and streams
//!
//! Nodes are addressed everywhere by their external `NodeId`: the registry
//! map key, stream assignment references, and archival path prefixes all use
//! this one identifier. There is no secondary lookup field.

use serde::{Deserialize, Serialize};

/// External identifier of an ingest node
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(String);

impl NodeId {
    /// Create a new node id
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The id as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NodeId {
    fn from(id: &str) -> Self {
        Self(id.to_owned())
    }
}

impl From<String> for NodeId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Opaque key identifying a single live stream
///
/// Keys handed out by [`generate`](StreamKey::generate) carry 128 bits of
/// CSPRNG entropy, hex-encoded, and are not guessable.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StreamKey(String);

impl StreamKey {
    /// Wrap an externally supplied key
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Generate a fresh random key (32 hex chars, 128 bits of entropy)
    pub fn generate() -> Self {
        let token: [u8; 16] = rand::random();
        Self(hex::encode(token))
    }

    /// The key as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for StreamKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for StreamKey {
    fn from(key: &str) -> Self {
        Self(key.to_owned())
    }
}

impl From<String> for StreamKey {
    fn from(key: String) -> Self {
        Self(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_key_shape() {
        let key = StreamKey::generate();

        assert_eq!(key.as_str().len(), 32);
        assert!(key.as_str().chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_generated_keys_unique() {
        let a = StreamKey::generate();
        let b = StreamKey::generate();

        assert_ne!(a, b);
    }

    #[test]
    fn test_node_id_display() {
        let id = NodeId::new("edge-fra-01");

        assert_eq!(id.to_string(), "edge-fra-01");
        assert_eq!(id.as_str(), "edge-fra-01");
    }
}
