//! WebSocket handler
//!
//! Handles WebSocket connections and message processing.

use crate::connection::Connection;
use crate::events::DispatchEvent;
use crate::handlers::{DisconnectHandler, HandlerError, MessageDispatcher};
use crate::protocol::{CloseCode, GatewayMessage, HelloPayload};
use crate::server::GatewayState;
use axum::{
    extract::{
        ws::{CloseFrame, Message, WebSocket},
        State, WebSocketUpgrade,
    },
    response::IntoResponse,
};
use futures_util::{SinkExt, StreamExt};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::interval;

/// How long the send task gets to flush the close frame
const CLOSE_GRACE: Duration = Duration::from_secs(1);

/// Lower bound for the heartbeat check period
const MIN_HEARTBEAT_CHECK: Duration = Duration::from_millis(10);

/// WebSocket gateway handler
pub async fn gateway_handler(
    State(state): State<GatewayState>,
    ws: WebSocketUpgrade,
) -> impl IntoResponse {
    let max_message_bytes = state.config().relay.max_message_bytes;

    ws.max_message_size(max_message_bytes)
        .on_upgrade(|socket| handle_socket(state, socket))
}

/// Handle an upgraded WebSocket connection
async fn handle_socket(state: GatewayState, socket: WebSocket) {
    let relay = state.config().relay.clone();

    // Outbound queue drained by the send task
    let (tx, mut rx) = mpsc::channel::<GatewayMessage>(relay.outbound_buffer);
    let connection = state.connection_manager().add_connection(tx);
    let connection_id = connection.id();

    tracing::info!(connection_id = %connection_id, "WebSocket connection established");

    let (mut ws_sink, mut ws_stream) = socket.split();

    // Send Hello message immediately
    let hello = GatewayMessage::hello(HelloPayload::with_interval(relay.heartbeat_interval_ms));
    if let Ok(json) = hello.to_json() {
        if ws_sink.send(Message::Text(json)).await.is_err() {
            tracing::warn!(connection_id = %connection_id, "Failed to send Hello message");
            cleanup_connection(&state, &connection).await;
            return;
        }
    }

    let (close_tx, mut close_rx) = oneshot::channel::<CloseCode>();

    // Spawn task to send messages to WebSocket
    let connection_send = connection.clone();
    let mut send_task = tokio::spawn(async move {
        loop {
            tokio::select! {
                code = &mut close_rx => {
                    if let Ok(code) = code {
                        let (code, reason) = GatewayMessage::close_frame(code);
                        let frame = CloseFrame {
                            code,
                            reason: reason.into(),
                        };
                        let _ = ws_sink.send(Message::Close(Some(frame))).await;
                    }
                    break;
                }
                msg = rx.recv() => {
                    let Some(msg) = msg else { break };

                    // Sequence numbers are assigned in socket order
                    let msg = connection_send.stamp(msg);
                    let json = match msg.to_json() {
                        Ok(json) => json,
                        Err(e) => {
                            tracing::warn!(
                                connection_id = %connection_send.id(),
                                error = %e,
                                "Failed to serialize message"
                            );
                            continue;
                        }
                    };

                    if ws_sink.send(Message::Text(json)).await.is_err() {
                        tracing::warn!(
                            connection_id = %connection_send.id(),
                            "Failed to send message to WebSocket"
                        );
                        break;
                    }
                }
            }
        }

        let _ = ws_sink.close().await;
    });

    // Spawn task to receive messages from WebSocket
    let state_recv = state.clone();
    let connection_recv = connection.clone();
    let mut recv_task = tokio::spawn(async move {
        while let Some(msg) = ws_stream.next().await {
            match msg {
                Ok(Message::Text(text)) => {
                    if let Err(close_code) =
                        handle_text_message(&state_recv, &connection_recv, &text).await
                    {
                        return Some(close_code);
                    }
                }
                Ok(Message::Binary(_)) => {
                    tracing::debug!(
                        connection_id = %connection_recv.id(),
                        "Binary messages not supported"
                    );
                    return Some(CloseCode::DecodeError);
                }
                Ok(Message::Ping(_) | Message::Pong(_)) => {
                    // Pong is handled automatically by axum
                    tracing::trace!(connection_id = %connection_recv.id(), "Ping/Pong received");
                }
                Ok(Message::Close(_)) => {
                    tracing::info!(connection_id = %connection_recv.id(), "Client closed connection");
                    return None;
                }
                Err(e) => {
                    tracing::warn!(
                        connection_id = %connection_recv.id(),
                        error = %e,
                        "WebSocket error"
                    );
                    return None;
                }
            }
        }
        None
    });

    // Spawn heartbeat monitoring task
    let connection_hb = connection.clone();
    let heartbeat_timeout = relay.heartbeat_timeout();
    let check_period = (relay.heartbeat_interval() / 2).max(MIN_HEARTBEAT_CHECK);
    let mut heartbeat_task = tokio::spawn(async move {
        let mut check_interval = interval(check_period);

        loop {
            check_interval.tick().await;

            let time_since = connection_hb.time_since_heartbeat();
            if time_since > heartbeat_timeout {
                tracing::warn!(
                    connection_id = %connection_hb.id(),
                    time_since_ms = time_since.as_millis(),
                    "Connection timed out (no heartbeat)"
                );
                return CloseCode::SessionTimeout;
            }
        }
    });

    // Wait for any task to complete
    let mut send_done = false;
    let close_code = tokio::select! {
        result = &mut recv_task => result.unwrap_or(Some(CloseCode::UnknownError)),
        _ = &mut send_task => {
            send_done = true;
            tracing::debug!(connection_id = %connection_id, "Send task ended");
            None
        }
        result = &mut heartbeat_task => result.ok(),
    };

    // Membership changes made by the receive task must land before cleanup
    stop_task(&mut recv_task).await;
    stop_task(&mut heartbeat_task).await;

    if let Some(code) = close_code {
        if code.is_protocol_violation() {
            tracing::warn!(connection_id = %connection_id, close_code = %code, "Closing connection after protocol violation");
        } else {
            tracing::debug!(connection_id = %connection_id, close_code = %code, "Closing connection");
        }
        let _ = close_tx.send(code);
    } else {
        drop(close_tx);
    }

    if !send_done && tokio::time::timeout(CLOSE_GRACE, &mut send_task).await.is_err() {
        send_task.abort();
    }

    cleanup_connection(&state, &connection).await;
}

/// Handle a text message from the client
///
/// `Err` carries the code to close the socket with.
async fn handle_text_message(
    state: &GatewayState,
    connection: &Arc<Connection>,
    text: &str,
) -> Result<(), CloseCode> {
    let message = match GatewayMessage::from_json(text) {
        Ok(m) => m,
        Err(e) => {
            tracing::debug!(
                connection_id = %connection.id(),
                error = %e,
                "Failed to parse message"
            );
            report_error(
                state,
                connection,
                &HandlerError::InvalidPayload(format!("Malformed message: {e}")),
            )
            .await;
            return Ok(());
        }
    };

    tracing::trace!(
        connection_id = %connection.id(),
        op = %message.op,
        "Received message"
    );

    match MessageDispatcher::dispatch(state, connection, message).await {
        Ok(Some(close_code)) => Err(close_code),
        Ok(None) => Ok(()),
        Err(e) if e.is_recoverable() => {
            tracing::debug!(
                connection_id = %connection.id(),
                error = %e,
                "Rejected client message"
            );
            report_error(state, connection, &e).await;
            Ok(())
        }
        Err(e) => {
            tracing::warn!(
                connection_id = %connection.id(),
                error = %e,
                "Handler error"
            );
            Err(e.to_close_code().unwrap_or(CloseCode::UnknownError))
        }
    }
}

/// Send an ERROR event to this connection only
async fn report_error(state: &GatewayState, connection: &Connection, error: &HandlerError) {
    let event = DispatchEvent::error(&error.to_error_response());

    if let Err(e) = connection
        .deliver(&event, state.config().relay.send_timeout())
        .await
    {
        tracing::warn!(
            connection_id = %connection.id(),
            error = %e,
            "Failed to send error event"
        );
    }
}

/// Abort `task` and wait until it has stopped
///
/// A task that already finished is left alone.
async fn stop_task<T>(task: &mut JoinHandle<T>) {
    if !task.is_finished() {
        task.abort();
        let _ = task.await;
    }
}

/// Clean up a connection on disconnect
async fn cleanup_connection(state: &GatewayState, connection: &Arc<Connection>) {
    DisconnectHandler::handle(state, connection).await;
    state.connection_manager().remove_connection(connection.id());

    tracing::info!(
        connection_id = %connection.id(),
        age_ms = connection.age().as_millis(),
        "Connection closed"
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use relay_common::AppConfig;
    use relay_core::RoomCode;

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_cleanup_waits_for_in_flight_join() {
        let state = GatewayState::new(AppConfig::default());
        let (tx, _rx) = mpsc::channel(8);
        let connection = state.connection_manager().add_connection(tx);
        let room = RoomCode::parse("R1").unwrap();

        let mut task = {
            let state = state.clone();
            let connection = connection.clone();
            let room = room.clone();
            tokio::spawn(async move {
                // No await point between here and the join
                std::thread::sleep(Duration::from_millis(100));
                state.registry().join(&connection, room);
                tokio::time::sleep(Duration::from_secs(5)).await;
            })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;

        stop_task(&mut task).await;
        cleanup_connection(&state, &connection).await;
        tokio::time::sleep(Duration::from_millis(150)).await;

        assert!(!state.registry().is_member(&room, connection.id()));
        assert_eq!(state.registry().member_count(&room), 0);
        assert_eq!(state.connection_manager().connection_count(), 0);
    }

    #[tokio::test]
    async fn test_stop_finished_task() {
        let mut task = tokio::spawn(async { 7 });
        while !task.is_finished() {
            tokio::task::yield_now().await;
        }

        stop_task(&mut task).await;
        assert_eq!(task.await.unwrap(), 7);
    }
}
