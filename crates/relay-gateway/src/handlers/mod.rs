//! Op code handlers
//!
//! Handles incoming WebSocket messages based on their operation code.

mod disconnect;
mod error;
mod heartbeat;
mod join;
mod relay;

pub use disconnect::DisconnectHandler;
pub use error::{HandlerError, HandlerResult};
pub use heartbeat::HeartbeatHandler;
pub use join::JoinHandler;
pub use relay::RelayHandler;

use crate::connection::Connection;
use crate::protocol::{CloseCode, GatewayMessage, OpCode};
use crate::server::GatewayState;
use relay_core::RelayEvent;
use std::sync::Arc;

/// Dispatch incoming client messages to appropriate handlers
pub struct MessageDispatcher;

impl MessageDispatcher {
    /// Handle an incoming client message
    ///
    /// `Ok(Some(code))` asks the caller to close the socket with `code`.
    pub async fn dispatch(
        state: &GatewayState,
        connection: &Arc<Connection>,
        message: GatewayMessage,
    ) -> HandlerResult<Option<CloseCode>> {
        if !message.is_valid_client_message() {
            tracing::warn!(
                connection_id = %connection.id(),
                op = %message.op,
                "Received server-only op code from client"
            );
            return Ok(Some(CloseCode::UnknownOpcode));
        }

        match message.op {
            OpCode::Join => {
                let payload = message.as_join().ok_or_else(|| {
                    HandlerError::InvalidPayload("Invalid Join payload".to_string())
                })?;

                JoinHandler::handle(state, connection, payload).await
            }
            OpCode::ChatMessage => {
                let payload = message.into_relay_payload().ok_or_else(|| {
                    HandlerError::InvalidPayload("Invalid ChatMessage payload".to_string())
                })?;

                RelayHandler::handle(state, connection, RelayEvent::Chat(payload)).await
            }
            OpCode::SendMedia => {
                let payload = message.into_relay_payload().ok_or_else(|| {
                    HandlerError::InvalidPayload("Invalid SendMedia payload".to_string())
                })?;

                RelayHandler::handle(state, connection, RelayEvent::Media(payload)).await
            }
            OpCode::Heartbeat => {
                let seq = message.as_heartbeat_seq().ok_or_else(|| {
                    HandlerError::InvalidPayload("Invalid Heartbeat payload".to_string())
                })?;

                HeartbeatHandler::handle(connection, seq, state.config().relay.send_timeout())
                    .await
            }
            // Server-only ops were rejected above
            _ => {
                tracing::error!(op = %message.op, "Unhandled client op code");
                Ok(Some(CloseCode::UnknownOpcode))
            }
        }
    }
}
