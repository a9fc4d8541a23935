//! Lifecycle hook outcomes
//!
//! Publish/unpublish results distinguish the lifecycle transition (did the
//! stream change state?) from load accounting (did a node counter move?).
//! Accounting can be skipped without the hook failing (an ingest node must
//! never be blocked from serving traffic by an accounting problem), so the
//! degraded cases are carried in the outcome instead of an error.

use serde::{Deserialize, Serialize};

use crate::registry::Stream;

/// Whether load accounting was applied for a hook invocation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Accounting {
    /// A node load counter was updated
    Applied,
    /// The transition (if any) succeeded but no counter moved
    Skipped(SkipReason),
}

/// Why load accounting was skipped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The hook carried no reporting node id
    NoReportingNode,
    /// The reporting node id resolved to no known node
    UnknownNode,
    /// Re-publish of an already-live stream by its assigned node
    DuplicatePublish,
    /// Unpublish retry on an already-ended stream
    AlreadyEnded,
    /// Unpublish for a key this control plane has no record of
    UnknownStream,
    /// Unpublish on a stream that never went live; nothing to release
    NeverLive,
}

/// Result of a publish hook
#[derive(Debug, Clone)]
pub enum PublishOutcome {
    /// The stream is (now) live
    Accepted {
        /// Stream state after the transition
        stream: Stream,
        /// Whether the reporting node's load was charged
        accounting: Accounting,
    },
    /// The publish must not proceed
    Rejected {
        /// Why the publish was refused
        reason: RejectReason,
    },
}

impl PublishOutcome {
    /// Whether the ingest node may serve the stream
    pub fn is_accepted(&self) -> bool {
        matches!(self, PublishOutcome::Accepted { .. })
    }
}

/// Why a publish was refused
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    /// No stream record matches the offered key
    UnknownKey,
    /// The stream already ended; Ended is terminal and keys are one-shot
    StreamEnded,
}

/// Result of an unpublish hook
///
/// Unpublish is always acknowledged; the interesting part is whether a
/// counter was released and the stream's final state.
#[derive(Debug, Clone)]
pub struct UnpublishOutcome {
    /// Stream state after the hook, when the key was known
    pub stream: Option<Stream>,
    /// Whether the reporting node's load was released
    pub accounting: Accounting,
}

/// Wire-shaped hook response for the web layer fronting the coordinator
///
/// Ingest servers treat a non-zero code as "do not serve this stream".
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HookResponse {
    /// 0 = accepted/acked, 1 = rejected
    pub code: u8,
    /// Human-readable detail
    pub msg: String,
}

impl HookResponse {
    fn ok() -> Self {
        Self {
            code: 0,
            msg: "OK".to_owned(),
        }
    }
}

impl From<&PublishOutcome> for HookResponse {
    fn from(outcome: &PublishOutcome) -> Self {
        match outcome {
            PublishOutcome::Accepted { .. } => Self::ok(),
            PublishOutcome::Rejected {
                reason: RejectReason::UnknownKey,
            } => Self {
                code: 1,
                msg: "Invalid stream key".to_owned(),
            },
            PublishOutcome::Rejected {
                reason: RejectReason::StreamEnded,
            } => Self {
                code: 1,
                msg: "Stream already ended".to_owned(),
            },
        }
    }
}

impl From<&UnpublishOutcome> for HookResponse {
    fn from(_outcome: &UnpublishOutcome) -> Self {
        Self::ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reject_maps_to_code_1() {
        let outcome = PublishOutcome::Rejected {
            reason: RejectReason::UnknownKey,
        };
        let response = HookResponse::from(&outcome);

        assert_eq!(response.code, 1);
        assert!(!outcome.is_accepted());
    }

    #[test]
    fn test_unpublish_always_acked() {
        let outcome = UnpublishOutcome {
            stream: None,
            accounting: Accounting::Skipped(SkipReason::UnknownStream),
        };
        let response = HookResponse::from(&outcome);

        assert_eq!(response.code, 0);
        assert_eq!(response.msg, "OK");
    }
}
