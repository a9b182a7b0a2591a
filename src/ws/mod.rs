//! WebSocket layer: connection handling, wire messages, socket adapter.
//!
//! The WebSocket endpoint at `/ws` carries the whole game protocol: role
//! selection, move requests, and the event stream of a session.

pub mod connection;
pub mod handler;
pub mod messages;
pub mod socket;
