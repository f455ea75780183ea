//! Chat and media handlers (op 3, op 4)

use super::HandlerResult;
use crate::connection::Connection;
use crate::protocol::CloseCode;
use crate::server::GatewayState;
use relay_core::RelayEvent;
use std::sync::Arc;

/// Relays user-authored events to the sender's room
pub struct RelayHandler;

impl RelayHandler {
    /// Broadcast `event` to the connection's current room
    ///
    /// Silently dropped when the connection has not joined a room.
    pub async fn handle(
        state: &GatewayState,
        connection: &Arc<Connection>,
        event: RelayEvent,
    ) -> HandlerResult<Option<CloseCode>> {
        let Some(room) = connection.room() else {
            tracing::trace!(
                connection_id = %connection.id(),
                event = event.kind(),
                "Dropping event from unjoined connection"
            );
            return Ok(None);
        };

        let excluding = if state.config().relay.echo_to_sender {
            None
        } else {
            Some(connection.id())
        };

        state.broadcaster().broadcast(&room, &event, excluding).await;

        Ok(None)
    }
}
