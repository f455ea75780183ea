//! Disconnect handling

use crate::connection::Connection;
use crate::server::GatewayState;
use relay_core::{RelayEvent, RoomCode};

/// Removes a departing connection from its room
pub struct DisconnectHandler;

impl DisconnectHandler {
    /// Leave the current room, if any
    ///
    /// Returns the room that was left. Later broadcasts to it no longer
    /// reach this connection.
    pub async fn handle(state: &GatewayState, connection: &Connection) -> Option<RoomCode> {
        let room = state.registry().leave(connection)?;

        tracing::debug!(
            connection_id = %connection.id(),
            room = %room,
            "Left room on disconnect"
        );

        if state.config().relay.announce_departures {
            if let Some(name) = connection.display_name() {
                state
                    .broadcaster()
                    .broadcast(&room, &RelayEvent::left(&name), None)
                    .await;
            }
        }

        Some(room)
    }
}
