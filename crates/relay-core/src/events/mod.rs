//! Events fanned out to room members

mod relay_event;

pub use relay_event::RelayEvent;
