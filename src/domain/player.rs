//! The two fixed player identities of a Connect Four game.

use std::fmt;

use serde::{Deserialize, Serialize};

/// One of the two players of a game.
///
/// The creator of a session always plays [`Player::Red`]; the connection
/// that joins through the join token plays [`Player::Yellow`]. The
/// assignment is fixed for the lifetime of the game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Player {
    /// First player (session creator).
    Red,
    /// Second player (joiner).
    Yellow,
}

impl Player {
    /// Returns the wire name of this player.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Red => "red",
            Self::Yellow => "yellow",
        }
    }
}

impl fmt::Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn serializes_as_lowercase_name() {
        let json = serde_json::to_string(&Player::Yellow).unwrap_or_default();
        assert_eq!(json, "\"yellow\"");
    }

    #[test]
    fn display_matches_wire_name() {
        assert_eq!(Player::Red.to_string(), Player::Red.as_str());
    }
}
