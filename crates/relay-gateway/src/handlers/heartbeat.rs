//! Heartbeat handler (op 1)

use super::{HandlerError, HandlerResult};
use crate::connection::Connection;
use crate::protocol::{CloseCode, GatewayMessage};
use std::sync::Arc;
use std::time::Duration;

/// Handles heartbeat messages
pub struct HeartbeatHandler;

impl HeartbeatHandler {
    /// Handle a heartbeat from the client
    ///
    /// `last_sequence` is the last dispatch sequence the client saw, if any.
    /// The ack waits at most `send_timeout` for queue space.
    pub async fn handle(
        connection: &Arc<Connection>,
        last_sequence: Option<u64>,
        send_timeout: Duration,
    ) -> HandlerResult<Option<CloseCode>> {
        connection.record_heartbeat();

        tracing::trace!(
            connection_id = %connection.id(),
            client_seq = ?last_sequence,
            server_seq = connection.current_sequence(),
            "Heartbeat received"
        );

        if let Err(e) = connection
            .enqueue(GatewayMessage::heartbeat_ack(), send_timeout)
            .await
        {
            tracing::warn!(
                connection_id = %connection.id(),
                error = %e,
                "Failed to send heartbeat ACK"
            );
            return Err(HandlerError::Internal(format!(
                "Failed to send heartbeat ACK: {e}"
            )));
        }

        Ok(None)
    }
}
