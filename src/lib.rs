//! # connect-four-relay
//!
//! WebSocket relay for two-player Connect Four games with live spectators.
//!
//! The first connection to select no role creates a game and receives two
//! opaque tokens: one for the second player to join, one for anyone to
//! watch. Moves are validated against the authoritative board held by the
//! server and fanned out to every participant of the game. Watchers that
//! arrive late are replayed the history before receiving live moves.
//!
//! ## Architecture
//!
//! ```text
//! Clients (WebSocket, HTTP)
//!     │
//!     ├── WS connection state machine (ws/)
//!     ├── System endpoints (api/)
//!     │
//!     ├── SessionRegistry (domain/)
//!     │       └── Session ── Board + Fanout
//!     │
//!     └── tracing / config / error
//! ```

pub mod api;
pub mod app_state;
pub mod config;
pub mod domain;
pub mod error;
pub mod ws;
