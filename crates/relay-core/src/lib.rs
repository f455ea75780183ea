//! # relay-core
//!
//! Domain layer for the room relay: identifiers, validated names, and the events
//! that flow through a room. This crate does no I/O.

pub mod error;
pub mod events;
pub mod value_objects;

// Re-export commonly used types at crate root
pub use error::DomainError;
pub use events::RelayEvent;
pub use value_objects::{ConnectionId, RoomCode, Username};
