//! Integration test utilities for the room relay
//!
//! This crate provides helpers for running end-to-end tests against
//! a real gateway over WebSockets.

pub mod helpers;

pub use helpers::*;
