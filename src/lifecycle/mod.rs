//! Stream lifecycle coordination
//!
//! The concurrency-sensitive core of the control plane. Ingest nodes call
//! back when a stream starts or stops; those callbacks arrive at least once,
//! sometimes duplicated, sometimes out of order, sometimes naming a node the
//! control plane has never heard of. The coordinator absorbs all of that:
//! status transitions are idempotent, load counters move exactly once per
//! real start/stop, and accounting problems degrade the outcome instead of
//! failing the hook.

pub mod coordinator;
pub mod outcome;

pub use coordinator::LifecycleCoordinator;
pub use outcome::{
    Accounting, HookResponse, PublishOutcome, RejectReason, SkipReason, UnpublishOutcome,
};
