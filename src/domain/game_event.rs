//! Events broadcast to every subscriber of a session.
//!
//! A [`GameEvent`] is published through the session's
//! [`super::Fanout`] after each accepted move. The serialized form is the
//! exact wire payload sent to clients.

use serde::Serialize;

use super::Player;
use super::board::Move;

/// State change of a game, fanned out to players and watchers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GameEvent {
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
}

impl GameEvent {
    /// Returns the event type as a static string slice.
    #[must_use]
    pub const fn event_type_str(&self) -> &'static str {
        match self {
            Self::Play { .. } => "play",
            Self::Win { .. } => "win",
        }
    }
}

impl From<Move> for GameEvent {
    fn from(mv: Move) -> Self {
        Self::Play {
            player: mv.player,
            column: mv.column,
            row: mv.row,
        }
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn play_event_wire_shape() {
        let event = GameEvent::Play {
            player: Player::Red,
            column: 3,
            row: 0,
        };
        let Ok(value) = serde_json::to_value(&event) else {
            panic!("serialization failed");
        };
        assert_eq!(
            value,
            serde_json::json!({"type": "play", "player": "red", "column": 3, "row": 0})
        );
        assert_eq!(event.event_type_str(), "play");
    }

    #[test]
    fn win_event_wire_shape() {
        let event = GameEvent::Win {
            player: Player::Yellow,
        };
        let json = serde_json::to_string(&event).unwrap_or_default();
        assert_eq!(json, r#"{"type":"win","player":"yellow"}"#);
    }

    #[test]
    fn move_converts_to_play() {
        let mv = Move {
            player: Player::Yellow,
            column: 2,
            row: 4,
        };
        assert_eq!(
            GameEvent::from(mv),
            GameEvent::Play {
                player: Player::Yellow,
                column: 2,
                row: 4
            }
        );
    }
}
