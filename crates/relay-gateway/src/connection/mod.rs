//! Connection management
//!
//! Tracks live WebSocket connections and their per-connection relay state.

mod connection;
mod manager;

pub use connection::{Connection, DeliveryError, SessionState};
pub use manager::ConnectionManager;
