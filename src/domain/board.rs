//! Connect Four board engine.
//!
//! [`Board`] is a pure state machine for one game: a grid of drop
//! columns, the ordered move history, and a write-once winner. It does no
//! locking of its own; [`super::Session`] serializes access to it.

use serde::Serialize;

use super::Player;

/// Default number of columns.
pub const COLUMNS: usize = 7;

/// Default number of rows.
pub const ROWS: usize = 6;

/// Number of aligned marks needed to win.
const WIN_LENGTH: usize = 4;

/// Directions checked for a win: horizontal, vertical and both diagonals.
const AXES: [(isize, isize); 4] = [(1, 0), (0, 1), (1, 1), (1, -1)];

/// A move that was accepted and applied to the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Move {
    /// Player who made the move.
    pub player: Player,
    /// Column the mark was dropped into.
    pub column: usize,
    /// Row the mark landed on (0 is the bottom row).
    pub row: usize,
}

/// Reasons a move is rejected by the engine.
///
/// Both variants are recoverable: the board is left untouched and the
/// requesting player may try again.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MoveError {
    /// The target column has no empty cell left.
    #[error("This slot is full.")]
    ColumnFull {
        /// The full column.
        column: usize,
    },

    /// The target column does not exist on this board.
    #[error("Column {column} is out of range.")]
    IllegalMove {
        /// The requested column as received.
        column: i64,
    },
}

/// Grid, move history and winner of a single game.
///
/// Each column is stored as the stack of marks dropped into it, so the
/// filled cells of a column are always a contiguous run from row 0.
#[derive(Debug, Clone)]
pub struct Board {
    columns: Vec<Vec<Player>>,
    height: usize,
    moves: Vec<Move>,
    winner: Option<Player>,
}

impl Board {
    /// Creates an empty 7×6 board.
    #[must_use]
    pub fn new() -> Self {
        Self::with_size(COLUMNS, ROWS)
    }

    /// Creates an empty board with the given number of columns and rows.
    #[must_use]
    pub fn with_size(width: usize, height: usize) -> Self {
        Self {
            columns: vec![Vec::with_capacity(height); width],
            height,
            moves: Vec::new(),
            winner: None,
        }
    }

    /// Number of columns.
    #[must_use]
    pub fn width(&self) -> usize {
        self.columns.len()
    }

    /// Number of rows.
    #[must_use]
    pub const fn height(&self) -> usize {
        self.height
    }

    /// Returns the mark at `(column, row)`, or `None` for an empty or
    /// out-of-range cell.
    #[must_use]
    pub fn cell(&self, column: usize, row: usize) -> Option<Player> {
        self.columns.get(column)?.get(row).copied()
    }

    /// Drops a mark for `player` into `column` and returns the recorded
    /// move, whose `row` is where the mark landed.
    ///
    /// Turn order is not enforced: either player may move at any time.
    /// If the move completes four in a row and no winner has been recorded
    /// yet, `player` becomes the winner.
    ///
    /// # Errors
    ///
    /// - [`MoveError::IllegalMove`] if `column` is negative or not on the board.
    /// - [`MoveError::ColumnFull`] if the column has no empty cell.
    ///
    /// The board is unchanged when an error is returned.
    pub fn apply_move(&mut self, player: Player, column: i64) -> Result<Move, MoveError> {
        let index = usize::try_from(column).map_err(|_| MoveError::IllegalMove { column })?;
        let height = self.height;
        let stack = self
            .columns
            .get_mut(index)
            .ok_or(MoveError::IllegalMove { column })?;
        if stack.len() >= height {
            return Err(MoveError::ColumnFull { column: index });
        }

        let row = stack.len();
        stack.push(player);
        let mv = Move {
            player,
            column: index,
            row,
        };
        self.moves.push(mv);

        if self.winner.is_none() && self.connects(player, index, row) {
            self.winner = Some(player);
        }
        Ok(mv)
    }

    /// Returns the winner, if any. Once set it never changes.
    #[must_use]
    pub const fn winner(&self) -> Option<Player> {
        self.winner
    }

    /// Returns a point-in-time copy of the move history, oldest first.
    #[must_use]
    pub fn history(&self) -> Vec<Move> {
        self.moves.clone()
    }

    /// Number of moves applied so far.
    #[must_use]
    pub fn move_count(&self) -> usize {
        self.moves.len()
    }

    /// Whether the cell at `(column, row)` is part of a run of at least
    /// four marks of `player` along any axis.
    fn connects(&self, player: Player, column: usize, row: usize) -> bool {
        AXES.iter().any(|&(dc, dr)| {
            let forward = self.run_length(player, column, row, dc, dr);
            let backward = self.run_length(player, column, row, -dc, -dr);
            forward + backward + 1 >= WIN_LENGTH
        })
    }

    /// Counts consecutive marks of `player` starting next to
    /// `(column, row)` and stepping by `(dc, dr)`.
    fn run_length(&self, player: Player, column: usize, row: usize, dc: isize, dr: isize) -> usize {
        let mut count = 0;
        let (mut c, mut r) = (column, row);
        while let (Some(next_c), Some(next_r)) = (c.checked_add_signed(dc), r.checked_add_signed(dr))
        {
            if self.cell(next_c, next_r) != Some(player) {
                break;
            }
            count += 1;
            c = next_c;
            r = next_r;
        }
        count
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}
