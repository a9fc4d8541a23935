//! Segment archival sync
//!
//! Downstream consumer of node identity: ships finished segments and
//! manifests from an ingest node's local disk to object storage, keyed under
//! the node's canonical external id. It reads what the ingest server writes
//! and never calls back into the lifecycle coordinator.

pub mod store;
pub mod sync;

pub use store::{DryRunStore, SegmentStore};
pub use sync::{ArchiveConfig, Archiver};
