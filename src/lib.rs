//! Placement and lifecycle control plane for live media ingest fleets
//!
//! A fleet of ingest nodes accepts live streams; this crate decides which
//! node should take the next one and keeps stream status and per-node load
//! counters correct while publish/unpublish callbacks arrive duplicated, out
//! of order, or from nodes the placement never suggested.
//!
//! # Data flow
//!
//! ```text
//!  encoder ──► select_node ──► PlacementEngine ──► NodeRegistry (read)
//!     │             returns {node_id, address}
//!     └──► pushes to node ──► ingest node ──► on_publish ─┐
//!                                                         ▼
//!                                            LifecycleCoordinator
//!                                              ├─► StreamRegistry (Live/Ended)
//!                                              └─► NodeRegistry   (load ±1)
//! ```
//!
//! # Quick start
//!
//! ```no_run
//! use ingest_control::{ControlPlane, NodeId};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let plane = ControlPlane::new();
//! plane.nodes().register(NodeId::new("edge-a"), "10.0.0.1:1935", 50).await?;
//!
//! let stream = plane.create_stream(None).await?;
//! let placement = plane.select_node().await?;
//!
//! // ...the encoder pushes to placement.address, then the node calls back:
//! let outcome = plane.on_publish(&stream.stream_key, Some(&placement.node_id)).await;
//! assert!(outcome.is_accepted());
//! # Ok(())
//! # }
//! ```
//!
//! Load accounting is advisory by design: the coordinator never fails a
//! publish over an accounting problem, and placement tolerates transient
//! overshoot between selection and the publish landing. What it does
//! guarantee is that counters never drift: every real start/stop moves the
//! owning node's counter exactly once, no matter how many times the ingest
//! layer retries its hooks.

pub mod archive;
pub mod control;
pub mod error;
pub mod lifecycle;
pub mod placement;
pub mod playback;
pub mod registry;

pub use control::ControlPlane;
pub use error::{Error, Result};
pub use lifecycle::{
    Accounting, HookResponse, LifecycleCoordinator, PublishOutcome, RejectReason, SkipReason,
    UnpublishOutcome,
};
pub use placement::{Placement, PlacementEngine, PlacementError};
pub use playback::{PlaybackConfig, PlaybackUrls};
pub use registry::{
    Node, NodeId, NodeRegistry, NodeStatus, RegistryError, Stream, StreamKey, StreamRegistry,
    StreamStatus,
};
