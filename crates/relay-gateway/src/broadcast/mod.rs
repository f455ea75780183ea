//! Room broadcasting
//!
//! Fans room events out to the outbound queues of every current member.

mod broadcaster;

pub use broadcaster::{BroadcastReport, Broadcaster};
