//! Domain layer: board engine, sessions, fan-out and the session registry.
//!
//! This module contains the game model (board, players, moves), the
//! per-session broadcast set, and the token-keyed registry that lets
//! connections find the session they belong to.

pub mod board;
pub mod fanout;
pub mod game_event;
pub mod player;
pub mod session;
pub mod session_registry;
pub mod token;

pub use board::{Board, Move, MoveError};
pub use fanout::{Fanout, Subscription};
pub use game_event::GameEvent;
pub use player::Player;
pub use session::{MoveOutcome, SeatGuard, Session};
pub use session_registry::{CreatedSession, SessionRegistry};
pub use token::Token;
