//! One live game: board, subscribers and the second-player seat.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};

use super::board::{Board, COLUMNS, Move, MoveError, ROWS};
use super::fanout::{Fanout, Subscription};
use super::{GameEvent, Player};

/// Smallest fan-out capacity a session runs with: one `play` per cell plus
/// the `win`. A subscriber can then buffer a whole game without lagging.
pub const MIN_FANOUT_CAPACITY: usize = COLUMNS * ROWS + 1;

/// Result of an accepted move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveOutcome {
    /// The applied move.
    pub mv: Move,
    /// Set only when this move produced the game's first winner.
    pub new_winner: Option<Player>,
}

/// A game session shared by its players and watchers.
///
/// The board sits behind a synchronous mutex that is only held for the
/// duration of a move or a snapshot, never across an `.await`. Events are
/// published while the board lock is held, so subscribers observe moves in
/// exactly the order the board accepted them.
#[derive(Debug)]
pub struct Session {
    id: uuid::Uuid,
    board: Mutex<Board>,
    fanout: Fanout,
    second_seat_taken: AtomicBool,
    created_at: DateTime<Utc>,
}

impl Session {
    /// Creates a session with an empty standard board.
    ///
    /// `fanout_capacity` is raised to [`MIN_FANOUT_CAPACITY`] if smaller.
    #[must_use]
    pub fn new(fanout_capacity: usize) -> Self {
        Self {
            id: uuid::Uuid::new_v4(),
            board: Mutex::new(Board::new()),
            fanout: Fanout::new(fanout_capacity.max(MIN_FANOUT_CAPACITY)),
            second_seat_taken: AtomicBool::new(false),
            created_at: Utc::now(),
        }
    }

    /// Session identifier, used for logging only.
    #[must_use]
    pub const fn id(&self) -> uuid::Uuid {
        self.id
    }

    /// Creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Applies a move for `player` and broadcasts the resulting `play`
    /// event, followed by a `win` event if the move won the game.
    ///
    /// # Errors
    ///
    /// Returns the [`MoveError`] from the board. Nothing is broadcast on
    /// error.
    pub fn play(&self, player: Player, column: i64) -> Result<MoveOutcome, MoveError> {
        let mut board = self.lock_board();
        let had_winner = board.winner().is_some();
        let mv = board.apply_move(player, column)?;
        let new_winner = if had_winner { None } else { board.winner() };

        self.fanout.broadcast(GameEvent::from(mv));
        if let Some(winner) = new_winner {
            self.fanout.broadcast(GameEvent::Win { player: winner });
        }
        Ok(MoveOutcome { mv, new_winner })
    }

    /// Subscribes to this session's events.
    #[must_use]
    pub fn subscribe(&self) -> Subscription {
        self.fanout.subscribe()
    }

    /// Subscribes and takes a history snapshot in one step.
    ///
    /// Every move is either in the returned history or will be delivered
    /// through the subscription, never both and never neither.
    #[must_use]
    pub fn subscribe_with_history(&self) -> (Subscription, Vec<Move>) {
        let board = self.lock_board();
        let subscription = self.fanout.subscribe();
        (subscription, board.history())
    }

    /// Returns a point-in-time copy of the move history.
    #[must_use]
    pub fn history(&self) -> Vec<Move> {
        self.lock_board().history()
    }

    /// Returns the winner, if any.
    #[must_use]
    pub fn winner(&self) -> Option<Player> {
        self.lock_board().winner()
    }

    /// Events a subscriber may fall behind before it lags.
    #[must_use]
    pub const fn fanout_capacity(&self) -> usize {
        self.fanout.capacity()
    }

    /// Number of connections currently subscribed.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.fanout.subscriber_count()
    }

    /// Claims the second-player seat.
    ///
    /// Returns `None` if another connection already holds it. The seat is
    /// released when the returned guard is dropped.
    #[must_use]
    pub fn claim_second_seat(self: &Arc<Self>) -> Option<SeatGuard> {
        self.second_seat_taken
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| SeatGuard {
                session: Arc::clone(self),
            })
    }

    fn lock_board(&self) -> MutexGuard<'_, Board> {
        self.board.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Holds the second-player seat of a [`Session`] until dropped.
#[derive(Debug)]
pub struct SeatGuard {
    session: Arc<Session>,
}

impl Drop for SeatGuard {
    fn drop(&mut self) {
        self.session
            .second_seat_taken
            .store(false, Ordering::Release);
    }
}
