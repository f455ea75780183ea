//! Room registry
//!
//! Maps room codes to their member sets and enforces that a connection is a
//! member of at most one room.

mod room;
mod room_registry;

pub use room::Room;
pub use room_registry::RoomRegistry;
