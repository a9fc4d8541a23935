//! Lifecycle coordinator implementation
//!
//! Receives publish/unpublish callbacks from ingest nodes and reconciles the
//! stream registry (status transitions) with the node registry (load
//! counters). The ingest layer delivers hooks at least once, possibly
//! duplicated, possibly from a node other than the one placement suggested;
//! every path here is safe to replay.
//!
//! The per-stream state machine is `Offline -> Live -> Ended`, Ended
//! terminal. The invariant the accounting logic maintains: a live stream has
//! at most one outstanding load increment, held by its currently assigned
//! node, and the eventual unpublish releases exactly that one.

use std::sync::Arc;

use crate::registry::{
    NodeId, NodeRegistry, StreamKey, StreamRegistry, StreamStatus,
};

use super::outcome::{
    Accounting, PublishOutcome, RejectReason, SkipReason, UnpublishOutcome,
};

/// Coordinates stream lifecycle transitions and node load accounting
pub struct LifecycleCoordinator {
    nodes: Arc<NodeRegistry>,
    streams: Arc<StreamRegistry>,
}

impl LifecycleCoordinator {
    /// Create a coordinator over the two registries
    pub fn new(nodes: Arc<NodeRegistry>, streams: Arc<StreamRegistry>) -> Self {
        Self { nodes, streams }
    }

    /// Handle a publish callback from an ingest node
    ///
    /// Unknown keys are rejected; everything else is accepted. The reporting
    /// node (not the one placement suggested) becomes the stream's assigned
    /// node and is charged one unit of load. A reporting id that resolves to
    /// no known node downgrades to accepted-without-accounting rather than
    /// blocking live traffic.
    pub async fn on_publish(
        &self,
        key: &StreamKey,
        reporting_node: Option<&NodeId>,
    ) -> PublishOutcome {
        let stream = match self.streams.find_by_key(key).await {
            Ok(stream) => stream,
            Err(_) => {
                tracing::warn!(stream = %key, "Publish rejected: unknown stream key");
                return PublishOutcome::Rejected {
                    reason: RejectReason::UnknownKey,
                };
            }
        };

        if stream.status == StreamStatus::Ended {
            // Ended is terminal and keys are one-shot; a finished broadcast
            // cannot be resurrected by a late or replayed publish.
            tracing::warn!(stream = %key, "Publish rejected: stream already ended");
            return PublishOutcome::Rejected {
                reason: RejectReason::StreamEnded,
            };
        }

        let was_live = stream.status == StreamStatus::Live;
        let previous_node = stream.assigned_node.clone();

        // Only the Offline -> Live edge stamps start_time; a duplicate
        // publish must not move the clock on a stream already serving.
        let mut stream = if was_live {
            stream
        } else {
            match self.streams.set_live(key).await {
                Ok(stream) => stream,
                Err(_) => {
                    return PublishOutcome::Rejected {
                        reason: RejectReason::UnknownKey,
                    };
                }
            }
        };

        let accounting = match reporting_node {
            None => {
                tracing::debug!(stream = %key, "Publish without reporting node, load not charged");
                Accounting::Skipped(SkipReason::NoReportingNode)
            }
            Some(node_id) if was_live && previous_node.as_ref() == Some(node_id) => {
                tracing::debug!(
                    stream = %key,
                    node = %node_id,
                    "Duplicate publish from assigned node, load unchanged"
                );
                Accounting::Skipped(SkipReason::DuplicatePublish)
            }
            Some(node_id) => match self.nodes.increment_load(node_id).await {
                Err(_) => {
                    tracing::warn!(
                        stream = %key,
                        node = %node_id,
                        "Reporting node unknown, publish accepted without accounting"
                    );
                    Accounting::Skipped(SkipReason::UnknownNode)
                }
                Ok(node) => {
                    // The stream moved while live: release the increment the
                    // previously assigned node was carrying, so its eventual
                    // unpublish owes nothing.
                    if was_live {
                        if let Some(previous) = &previous_node {
                            if self.nodes.decrement_load(previous).await.is_err() {
                                tracing::warn!(
                                    stream = %key,
                                    node = %previous,
                                    "Previously assigned node unknown, load not released"
                                );
                            }
                        }
                    }

                    match self.streams.reassign(key, node.node_id.clone()).await {
                        Ok(updated) => stream = updated,
                        Err(_) => {
                            tracing::warn!(stream = %key, "Stream vanished during reassignment");
                        }
                    }

                    tracing::info!(
                        stream = %key,
                        node = %node.node_id,
                        load = node.load,
                        "Publish accounted"
                    );
                    Accounting::Applied
                }
            },
        };

        PublishOutcome::Accepted { stream, accounting }
    }

    /// Handle an unpublish callback from an ingest node
    ///
    /// Never an error: unknown keys and replays are acknowledged without
    /// touching state. The reporting node's load is released exactly once,
    /// on the transition out of Live.
    pub async fn on_unpublish(
        &self,
        key: &StreamKey,
        reporting_node: Option<&NodeId>,
    ) -> UnpublishOutcome {
        let stream = match self.streams.find_by_key(key).await {
            Ok(stream) => stream,
            Err(_) => {
                tracing::debug!(stream = %key, "Unpublish for unknown stream key ignored");
                return UnpublishOutcome {
                    stream: None,
                    accounting: Accounting::Skipped(SkipReason::UnknownStream),
                };
            }
        };

        if stream.status == StreamStatus::Ended {
            tracing::debug!(stream = %key, "Unpublish replay on ended stream ignored");
            return UnpublishOutcome {
                stream: Some(stream),
                accounting: Accounting::Skipped(SkipReason::AlreadyEnded),
            };
        }

        let was_live = stream.status == StreamStatus::Live;
        let assigned_node = stream.assigned_node.clone();

        let ended = match self.streams.set_ended(key).await {
            Ok(ended) => ended,
            Err(_) => {
                return UnpublishOutcome {
                    stream: None,
                    accounting: Accounting::Skipped(SkipReason::UnknownStream),
                };
            }
        };

        let accounting = if !was_live {
            // Never went live, so no increment exists to undo.
            tracing::debug!(stream = %key, "Offline stream ended without load release");
            Accounting::Skipped(SkipReason::NeverLive)
        } else {
            match reporting_node {
                None => {
                    tracing::warn!(stream = %key, "Unpublish without reporting node, load not released");
                    Accounting::Skipped(SkipReason::NoReportingNode)
                }
                Some(node_id) => {
                    if assigned_node.as_ref() != Some(node_id) {
                        tracing::warn!(
                            stream = %key,
                            reporting = %node_id,
                            assigned = ?assigned_node,
                            "Unpublish reported by a node other than the assigned one"
                        );
                    }
                    match self.nodes.decrement_load(node_id).await {
                        Ok(node) => {
                            tracing::info!(
                                stream = %key,
                                node = %node.node_id,
                                load = node.load,
                                "Unpublish accounted"
                            );
                            Accounting::Applied
                        }
                        Err(_) => {
                            tracing::warn!(
                                stream = %key,
                                node = %node_id,
                                "Reporting node unknown, load not released"
                            );
                            Accounting::Skipped(SkipReason::UnknownNode)
                        }
                    }
                }
            }
        };

        UnpublishOutcome {
            stream: Some(ended),
            accounting,
        }
    }
}
