//! Broadcaster
//!
//! Delivers one event to every member of a room. Membership is snapshotted
//! under the room's read lock and delivery happens after the lock is
//! released, so a slow recipient never blocks joins or leaves.

use crate::events::DispatchEvent;
use crate::registry::RoomRegistry;
use futures::future::join_all;
use relay_core::{ConnectionId, RelayEvent, RoomCode};
use std::sync::Arc;
use std::time::Duration;

/// Outcome of a single broadcast
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BroadcastReport {
    /// Members selected for delivery
    pub recipients: usize,
    /// Deliveries that reached the recipient's outbound queue
    pub delivered: usize,
    /// Deliveries that timed out or hit a closed connection
    pub failed: usize,
}

impl BroadcastReport {
    /// Check if every recipient got the event
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.failed == 0
    }
}

/// Room-scoped event fan-out
pub struct Broadcaster {
    registry: Arc<RoomRegistry>,
    send_timeout: Duration,
}

impl Broadcaster {
    /// Create a broadcaster over `registry`
    ///
    /// Each delivery waits at most `send_timeout` for queue space.
    #[must_use]
    pub fn new(registry: Arc<RoomRegistry>, send_timeout: Duration) -> Self {
        Self {
            registry,
            send_timeout,
        }
    }

    /// Get the registry this broadcaster reads membership from
    pub fn registry(&self) -> &Arc<RoomRegistry> {
        &self.registry
    }

    /// Get the per-recipient send timeout
    pub fn send_timeout(&self) -> Duration {
        self.send_timeout
    }

    /// Deliver `event` to the members of `room`, skipping `excluding`
    ///
    /// An unknown or empty room yields an empty report. A failure for one
    /// recipient is logged and counted; it never stops delivery to the rest.
    pub async fn broadcast(
        &self,
        room: &RoomCode,
        event: &RelayEvent,
        excluding: Option<ConnectionId>,
    ) -> BroadcastReport {
        let recipients: Vec<_> = self
            .registry
            .members_of(room)
            .into_iter()
            .filter(|member| Some(member.id()) != excluding)
            .collect();

        if recipients.is_empty() {
            tracing::trace!(room = %room, event = event.kind(), "Broadcast to empty room");
            return BroadcastReport::default();
        }

        let dispatch = DispatchEvent::from(event);
        let results = join_all(
            recipients
                .iter()
                .map(|member| member.deliver(&dispatch, self.send_timeout)),
        )
        .await;

        let mut report = BroadcastReport {
            recipients: recipients.len(),
            ..BroadcastReport::default()
        };

        for (member, result) in recipients.iter().zip(results) {
            match result {
                Ok(()) => report.delivered += 1,
                Err(e) => {
                    report.failed += 1;
                    tracing::warn!(
                        connection_id = %member.id(),
                        room = %room,
                        error = %e,
                        "Failed to deliver event"
                    );
                }
            }
        }

        tracing::trace!(
            room = %room,
            event = event.kind(),
            recipients = report.recipients,
            delivered = report.delivered,
            failed = report.failed,
            "Broadcast complete"
        );

        report
    }
}

impl std::fmt::Debug for Broadcaster {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Broadcaster")
            .field("registry", &self.registry)
            .field("send_timeout", &self.send_timeout)
            .finish()
    }
}
