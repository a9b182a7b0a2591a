//! WebSocket message types: role selection, move requests and events.
//!
//! Every payload is a JSON object discriminated by a `type` field.

use serde::{Deserialize, Deserializer, Serialize};

use crate::domain::{GameEvent, Player, Token};
use crate::error::RelayError;

/// Server → client event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerEvent {
    /// Session created; sent to the creator only.
    Init {
        /// Token for the second player's join link.
        join: Token,
        /// Token for spectators' watch link.
        watch: Token,
    },

    /// A move was accepted and applied.
    Play {
        /// Player who moved.
        player: Player,
        /// Column played.
        column: usize,
        /// Row the mark landed on.
        row: usize,
    },

    /// A player has four in a row.
    Win {
        /// The winning player.
        player: Player,
    },

    /// Rejected move or unknown token; sent to the originating
    /// connection only.
    Error {
        /// Human-readable reason.
        message: String,
    },
}

impl ServerEvent {
    /// Builds an `error` event.
    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            message: message.into(),
        }
    }
}

impl From<GameEvent> for ServerEvent {
    fn from(event: GameEvent) -> Self {
        match event {
            GameEvent::Play {
                player,
                column,
                row,
            } => Self::Play {
                player,
                column,
                row,
            },
            GameEvent::Win { player } => Self::Win { player },
        }
    }
}

/// First message of a connection, as received.
///
/// Browsers send `{"type": "init"}` optionally followed by a `join` or
/// `watch` token; the `type` field may also be omitted. The outer `Option`
/// of a token field records whether the key was sent at all, so an explicit
/// `null` is told apart from an absent key.
#[derive(Debug, Default, Deserialize)]
pub struct RoleSelection {
    /// Optional discriminator; must be `"init"` when present.
    #[serde(rename = "type", default)]
    pub msg_type: Option<String>,
    /// Join token for the second player.
    #[serde(default, deserialize_with = "present")]
    pub join: Option<Option<Token>>,
    /// Watch token for spectators.
    #[serde(default, deserialize_with = "present")]
    pub watch: Option<Option<Token>>,
}

/// Marks a key as present, keeping `null` as `Some(None)`.
fn present<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Rejects a token key that was sent without a value.
fn sent_token(key: &str, field: Option<Option<Token>>) -> Result<Option<Token>, RelayError> {
    match field {
        None => Ok(None),
        Some(Some(token)) => Ok(Some(token)),
        Some(None) => Err(RelayError::Protocol(format!("{key} token is null"))),
    }
}

/// Role a connection takes for its whole lifetime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Role {
    /// Start a new game as the first player.
    Create,
    /// Join an existing game as the second player.
    Join(Token),
    /// Watch an existing game.
    Watch(Token),
}

impl Role {
    /// Parses a role-selection payload. An empty payload selects
    /// [`Role::Create`].
    ///
    /// # Errors
    ///
    /// Returns [`RelayError::Protocol`] for anything that is not a valid
    /// role selection.
    pub fn parse(text: &str) -> Result<Self, RelayError> {
        if text.trim().is_empty() {
            return Ok(Self::Create);
        }
        let selection: RoleSelection = serde_json::from_str(text)
            .map_err(|e| RelayError::Protocol(format!("malformed role selection: {e}")))?;
        selection.into_role()
    }
}

impl RoleSelection {
    /// Resolves the selected role.
    ///
    /// # Errors
    ///
    /// Returns [`RelayError::Protocol`] if `type` is not `"init"`, a token
    /// is `null`, or both tokens are present.
    pub fn into_role(self) -> Result<Role, RelayError> {
        if let Some(msg_type) = self.msg_type.as_deref()
            && msg_type != "init"
        {
            return Err(RelayError::Protocol(format!(
                "expected role selection, got type {msg_type:?}"
            )));
        }
        let join = sent_token("join", self.join)?;
        let watch = sent_token("watch", self.watch)?;
        match (join, watch) {
            (None, None) => Ok(Role::Create),
            (Some(join), None) => Ok(Role::Join(join)),
            (None, Some(watch)) => Ok(Role::Watch(watch)),
            (Some(_), Some(_)) => Err(RelayError::Protocol(
                "role selection names both join and watch".to_string(),
            )),
        }
    }
}

/// Client → server message during play.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Drop a mark into `column`.
    Play {
        /// Target column; range is checked by the board.
        column: i64,
    },
}

impl ClientMessage {
    /// Parses a move-request payload.
    ///
    /// # Errors
    ///
    /// Returns [`RelayError::Protocol`] if the payload is not a move
    /// request.
    pub fn parse(text: &str) -> Result<Self, RelayError> {
        serde_json::from_str(text)
            .map_err(|e| RelayError::Protocol(format!("malformed move request: {e}")))
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    fn role(text: &str) -> Role {
        let Ok(role) = Role::parse(text) else {
            panic!("{text} should parse as a role");
        };
        role
    }

    #[test]
    fn empty_or_bare_init_creates() {
        assert_eq!(role(""), Role::Create);
        assert_eq!(role("{}"), Role::Create);
        assert_eq!(role(r#"{"type":"init"}"#), Role::Create);
    }

    #[test]
    fn join_and_watch_tokens_select_role() {
        assert_eq!(
            role(r#"{"type":"init","join":"abc"}"#),
            Role::Join(Token::from("abc"))
        );
        assert_eq!(role(r#"{"watch":"xyz"}"#), Role::Watch(Token::from("xyz")));
    }

    #[test]
    fn invalid_role_selections_are_protocol_violations() {
        for text in [
            r#"{"join":"a","watch":"b"}"#,
            r#"{"type":"play","column":3}"#,
            r#"{"join":42}"#,
            r#"{"join":null}"#,
            r#"{"watch":null}"#,
            r#"{"type":"init","join":null,"watch":"w"}"#,
            "[]",
            "not json",
        ] {
            assert!(
                matches!(Role::parse(text), Err(RelayError::Protocol(_))),
                "{text} should be rejected"
            );
        }
    }

    #[test]
    fn move_request_parses() {
        let parsed = ClientMessage::parse(r#"{"type":"play","column":3}"#);
        assert_eq!(parsed.ok(), Some(ClientMessage::Play { column: 3 }));

        let negative = ClientMessage::parse(r#"{"type":"play","column":-2}"#);
        assert_eq!(negative.ok(), Some(ClientMessage::Play { column: -2 }));
    }

    #[test]
    fn malformed_move_requests_are_protocol_violations() {
        for text in [
            r#"{"type":"resign"}"#,
            r#"{"type":"play"}"#,
            r#"{"type":"play","column":"3"}"#,
            r#"{"column":3}"#,
        ] {
            assert!(
                matches!(ClientMessage::parse(text), Err(RelayError::Protocol(_))),
                "{text} should be rejected"
            );
        }
    }

    #[test]
    fn init_event_wire_shape() {
        let event = ServerEvent::Init {
            join: Token::from("j"),
            watch: Token::from("w"),
        };
        let json = serde_json::to_string(&event).unwrap_or_default();
        assert_eq!(json, r#"{"type":"init","join":"j","watch":"w"}"#);
    }

    #[test]
    fn error_event_wire_shape() {
        let json = serde_json::to_string(&ServerEvent::error("Game not found")).unwrap_or_default();
        assert_eq!(json, r#"{"type":"error","message":"Game not found"}"#);
    }

    #[test]
    fn game_events_convert() {
        let event = ServerEvent::from(GameEvent::Win {
            player: Player::Red,
        });
        assert_eq!(
            event,
            ServerEvent::Win {
                player: Player::Red
            }
        );
    }
}
