//! Data models for the relay
//!
//! Client connections as the hub sees them, the `mode` event frame, and the
//! events the connection tasks hand to the hub.

pub mod client;
pub mod payload;
pub mod propagated;
