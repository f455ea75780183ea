//! Join handler (op 2)

use super::HandlerResult;
use crate::connection::Connection;
use crate::protocol::{CloseCode, JoinPayload};
use crate::server::GatewayState;
use relay_core::RelayEvent;
use std::sync::Arc;
use validator::Validate;

/// Handles Join messages
pub struct JoinHandler;

impl JoinHandler {
    /// Handle a Join message
    ///
    /// Allowed in any state. Joining another room first leaves the current
    /// one; the whole new room, joiner included, is told about the arrival.
    pub async fn handle(
        state: &GatewayState,
        connection: &Arc<Connection>,
        payload: JoinPayload,
    ) -> HandlerResult<Option<CloseCode>> {
        payload.validate()?;
        let (room, name) = payload.into_parts()?;

        let previous_name = connection.display_name();
        connection.set_display_name(name.clone());

        let previous_room = state.registry().join(connection, room.clone());

        tracing::info!(
            connection_id = %connection.id(),
            room = %room,
            username = %name,
            "Joined room"
        );

        if let Some(previous_room) = previous_room {
            if state.config().relay.announce_departures {
                let departed = previous_name.as_ref().unwrap_or(&name);
                state
                    .broadcaster()
                    .broadcast(&previous_room, &RelayEvent::left(departed), None)
                    .await;
            }
        }

        state
            .broadcaster()
            .broadcast(&room, &RelayEvent::joined(&name), None)
            .await;

        Ok(None)
    }
}
