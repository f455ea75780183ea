//! Gateway dispatch events
//!
//! Event names and payload shapes sent with op=0 Dispatch.

mod event_types;
mod payloads;

pub use event_types::GatewayEventType;
pub use payloads::{DispatchEvent, SystemMessagePayload};
