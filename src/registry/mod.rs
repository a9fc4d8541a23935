//! Node and stream registries
//!
//! The registries hold the only shared mutable state in the control plane:
//! one record per ingest node and one per stream. Everything else (placement,
//! lifecycle accounting) is a function over these records, and all mutation
//! flows through the operations here so the load-counter invariants are
//! enforced in one place.
//!
//! # Architecture
//!
//! ```text
//!        Arc<NodeRegistry>                    Arc<StreamRegistry>
//!   ┌───────────────────────────┐       ┌────────────────────────────┐
//!   │ nodes: HashMap<NodeId,    │       │ streams: HashMap<StreamKey,│
//!   │   Entry {                 │       │   Entry {                  │
//!   │     address, status,      │◄──────│     assigned_node,         │
//!   │     capacity, load,       │ weak  │     status, start/end,     │
//!   │   }                       │  ref  │   }                        │
//!   └─────────────┬─────────────┘       └─────────────┬──────────────┘
//!                 │                                   │
//!        [PlacementEngine]                 [LifecycleCoordinator]
//!        reads candidates                  drives both: status
//!        ranks by load                     transitions + load ±1
//! ```
//!
//! # Locking
//!
//! Both registries use the same two-level shape: the outer map behind a
//! `RwLock`, each entry behind its own `RwLock`. Mutating one record takes
//! that record's write lock only, so operations on different nodes/streams
//! run fully in parallel while read-modify-write on a single record (load
//! increments, status transitions) is one critical section, with no lost updates.

pub mod error;
pub mod ident;
pub mod node;
pub mod stream;

pub use error::RegistryError;
pub use ident::{NodeId, StreamKey};
pub use node::{Node, NodeRegistry, NodeStatus};
pub use stream::{Stream, StreamRegistry, StreamStatus};
