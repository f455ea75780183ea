//! # relay-gateway
//!
//! WebSocket relay: clients join named rooms and every chat or media message
//! is fanned out to the members of the sender's room.

pub mod broadcast;
pub mod connection;
pub mod events;
pub mod handlers;
pub mod protocol;
pub mod registry;
pub mod server;

pub use server::run;
