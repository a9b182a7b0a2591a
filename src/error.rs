//! Relay error types.
//!
//! [`RelayError`] is the central error type of the relay. Recoverable
//! variants are reported to the originating connection as an `error`
//! event carrying [`RelayError::client_message`]; the rest end that
//! connection without a structured report.

use crate::domain::MoveError;

/// Wire text sent when a token does not resolve to a live session.
pub const GAME_NOT_FOUND: &str = "Game not found";

/// Wire text sent when the second-player seat is already taken.
pub const GAME_FULL: &str = "Game is full";

/// Errors raised while relaying a connection.
///
/// | Variant           | Connection continues | Reported to client        |
/// |-------------------|----------------------|---------------------------|
/// | `Move`            | yes                  | `error` event             |
/// | `SessionNotFound` | no                   | `error` event, then close |
/// | `GameFull`        | no                   | `error` event, then close |
/// | `Protocol`        | no                   | close frame 1008          |
/// | `Transport`       | no                   | none (connection gone)    |
/// | `SendTimeout`     | no                   | none (connection dropped) |
/// | `Serialization`   | no                   | none                      |
#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    /// Join or watch token does not match a live session.
    #[error("session not found")]
    SessionNotFound,

    /// The second-player seat is held by another connection.
    #[error("second player seat already taken")]
    GameFull,

    /// The board rejected a move.
    #[error(transparent)]
    Move(#[from] MoveError),

    /// The client sent a message of unexpected shape.
    #[error("protocol violation: {0}")]
    Protocol(String),

    /// The underlying WebSocket failed.
    #[error("transport error: {0}")]
    Transport(#[from] axum::Error),

    /// An outbound message could not be delivered in time.
    #[error("send timed out")]
    SendTimeout,

    /// An outbound event could not be encoded.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl RelayError {
    /// Returns the text sent to the client in an `error` event, or `None`
    /// if this error is not reported as an event.
    #[must_use]
    pub fn client_message(&self) -> Option<String> {
        match self {
            Self::SessionNotFound => Some(GAME_NOT_FOUND.to_string()),
            Self::GameFull => Some(GAME_FULL.to_string()),
            Self::Move(err) => Some(err.to_string()),
            Self::Protocol(_) | Self::Transport(_) | Self::SendTimeout | Self::Serialization(_) => {
                None
            }
        }
    }

    /// Returns `true` if the connection may keep running after this error.
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::Move(_))
    }
}
