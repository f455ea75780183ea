//! Individual WebSocket connection
//!
//! Represents a single WebSocket connection and its relay state.

use crate::events::DispatchEvent;
use crate::protocol::{GatewayMessage, OpCode};
use parking_lot::{Mutex, MutexGuard, RwLock};
use relay_core::{ConnectionId, RoomCode, Username};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::sync::mpsc::{self, error::SendTimeoutError};

/// Session state of a connection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Connected, not in any room
    Unjoined,
    /// Member of exactly one room
    Joined,
}

/// Failure to hand a message to one connection's outbound queue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DeliveryError {
    #[error("outbound queue full after {0:?}")]
    Timeout(Duration),

    #[error("connection closed")]
    Closed,
}

/// A single WebSocket connection
pub struct Connection {
    /// Unique connection ID
    id: ConnectionId,

    /// Display name announced on the last join
    display_name: RwLock<Option<Username>>,

    /// Current room; locked by the registry for the whole leave/join sequence
    room: Mutex<Option<RoomCode>>,

    /// Channel to send messages to the WebSocket
    sender: mpsc::Sender<GatewayMessage>,

    /// Last sequence number written to the socket
    sequence: AtomicU64,

    /// Last heartbeat received
    last_heartbeat: Mutex<Instant>,

    /// Connection creation time
    created_at: Instant,
}

impl Connection {
    /// Create a new connection with a fresh ID
    pub fn new(sender: mpsc::Sender<GatewayMessage>) -> Arc<Self> {
        Self::with_id(ConnectionId::generate(), sender)
    }

    /// Create a new connection with a known ID
    pub fn with_id(id: ConnectionId, sender: mpsc::Sender<GatewayMessage>) -> Arc<Self> {
        Arc::new(Self {
            id,
            display_name: RwLock::new(None),
            room: Mutex::new(None),
            sender,
            sequence: AtomicU64::new(0),
            last_heartbeat: Mutex::new(Instant::now()),
            created_at: Instant::now(),
        })
    }

    /// Get the connection ID
    pub fn id(&self) -> ConnectionId {
        self.id
    }

    /// Get the display name (if joined at least once)
    pub fn display_name(&self) -> Option<Username> {
        self.display_name.read().clone()
    }

    /// Set the display name
    pub fn set_display_name(&self, name: Username) {
        *self.display_name.write() = Some(name);
    }

    /// Get the current room
    pub fn room(&self) -> Option<RoomCode> {
        self.room.lock().clone()
    }

    /// Lock the current-room slot
    ///
    /// Lock order: this slot first, then any room's member lock.
    pub(crate) fn room_slot(&self) -> MutexGuard<'_, Option<RoomCode>> {
        self.room.lock()
    }

    /// Get the session state
    pub fn session_state(&self) -> SessionState {
        if self.room.lock().is_some() {
            SessionState::Joined
        } else {
            SessionState::Unjoined
        }
    }

    /// Get the next sequence number
    pub fn next_sequence(&self) -> u64 {
        self.sequence.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Get the current sequence number
    pub fn current_sequence(&self) -> u64 {
        self.sequence.load(Ordering::SeqCst)
    }

    /// Stamp a dispatch message with the next sequence number
    pub fn stamp(&self, message: GatewayMessage) -> GatewayMessage {
        if message.op == OpCode::Dispatch && message.s.is_none() {
            message.with_sequence(self.next_sequence())
        } else {
            message
        }
    }

    /// Record a heartbeat received
    pub fn record_heartbeat(&self) {
        *self.last_heartbeat.lock() = Instant::now();
    }

    /// Get time since last heartbeat
    pub fn time_since_heartbeat(&self) -> Duration {
        self.last_heartbeat.lock().elapsed()
    }

    /// Get connection age
    pub fn age(&self) -> Duration {
        self.created_at.elapsed()
    }

    /// Queue a message, waiting at most `timeout` for queue space
    pub async fn enqueue(
        &self,
        message: GatewayMessage,
        timeout: Duration,
    ) -> Result<(), DeliveryError> {
        self.sender
            .send_timeout(message, timeout)
            .await
            .map_err(|e| match e {
                SendTimeoutError::Timeout(_) => DeliveryError::Timeout(timeout),
                SendTimeoutError::Closed(_) => DeliveryError::Closed,
            })
    }

    /// Queue a dispatch event, waiting at most `timeout` for queue space
    pub async fn deliver(
        &self,
        event: &DispatchEvent,
        timeout: Duration,
    ) -> Result<(), DeliveryError> {
        let message = GatewayMessage::dispatch(event.event_type, event.data.clone());
        self.enqueue(message, timeout).await
    }

    /// Check if the sender channel is closed
    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }
}

impl std::fmt::Debug for Connection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connection")
            .field("id", &self.id)
            .field("room", &self.room.try_lock().map(|room| room.clone()))
            .field("sequence", &self.sequence.load(Ordering::SeqCst))
            .field("created_at", &self.created_at)
            .finish()
    }
}
