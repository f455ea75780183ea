//! Value objects - immutable types that represent domain concepts

mod connection_id;
mod room_code;
mod username;

pub use connection_id::ConnectionId;
pub use room_code::RoomCode;
pub use username::Username;
