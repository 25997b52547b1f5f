//! Board state mirrored from the authoritative peer.

use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};

/// Rows on a standard board.
pub const ROWS: usize = 6;
/// Columns on a standard board.
pub const COLS: usize = 7;

/// Numeric code on the wire that is neither empty nor a seat.
#[derive(Debug, Clone, Copy, Display, Error)]
#[display("invalid player code {code}, expected 0-2")]
pub struct InvalidCode {
    /// The rejected code.
    pub code: u8,
}

/// A player's seat at the table. Seat one moves first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Seat {
    /// Seat 1 (red in the reference client).
    One,
    /// Seat 2 (yellow in the reference client).
    Two,
}

impl Seat {
    /// Returns the other seat.
    pub fn opponent(self) -> Self {
        match self {
            Seat::One => Seat::Two,
            Seat::Two => Seat::One,
        }
    }

    /// Numeric wire code for this seat.
    pub fn code(self) -> u8 {
        match self {
            Seat::One => 1,
            Seat::Two => 2,
        }
    }
}

impl From<Seat> for u8 {
    fn from(seat: Seat) -> Self {
        seat.code()
    }
}

impl TryFrom<u8> for Seat {
    type Error = InvalidCode;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            1 => Ok(Seat::One),
            2 => Ok(Seat::Two),
            code => Err(InvalidCode { code }),
        }
    }
}

impl std::fmt::Display for Seat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// One cell of the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Cell {
    /// No piece yet.
    Empty,
    /// A piece dropped by the seated player.
    Taken(Seat),
}

impl From<Cell> for u8 {
    fn from(cell: Cell) -> Self {
        match cell {
            Cell::Empty => 0,
            Cell::Taken(seat) => seat.code(),
        }
    }
}

impl TryFrom<u8> for Cell {
    type Error = InvalidCode;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(Cell::Empty),
            code => Seat::try_from(code).map(Cell::Taken),
        }
    }
}

/// The latest authoritative game state pushed by the peer.
///
/// Replaced wholesale on every state frame; the client never edits cells
/// itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardSnapshot {
    #[serde(rename = "board")]
    grid: Vec<Vec<Cell>>,
    current_player: Seat,
    is_finished: bool,
    is_draw: bool,
    #[serde(with = "winner_code")]
    winner: Option<Seat>,
}

impl BoardSnapshot {
    /// Builds a snapshot from its parts.
    pub fn new(
        grid: Vec<Vec<Cell>>,
        current_player: Seat,
        is_finished: bool,
        is_draw: bool,
        winner: Option<Seat>,
    ) -> Self {
        Self {
            grid,
            current_player,
            is_finished,
            is_draw,
            winner,
        }
    }

    /// Row-major grid, top row first.
    pub fn grid(&self) -> &[Vec<Cell>] {
        &self.grid
    }

    /// Cell at `(row, column)`, if within bounds.
    pub fn cell(&self, row: usize, column: usize) -> Option<Cell> {
        self.grid.get(row).and_then(|r| r.get(column)).copied()
    }

    /// Number of columns the peer sent.
    pub fn width(&self) -> usize {
        self.grid.first().map(Vec::len).unwrap_or(COLS)
    }

    /// Seat whose turn it is.
    pub fn current_player(&self) -> Seat {
        self.current_player
    }

    /// True once the game reached a terminal state.
    pub fn is_finished(&self) -> bool {
        self.is_finished
    }

    /// True when the terminal state is a draw.
    pub fn is_draw(&self) -> bool {
        self.is_draw
    }

    /// Winning seat, if any.
    pub fn winner(&self) -> Option<Seat> {
        self.winner
    }
}

/// Wire mapping for the winner field: 0 means no winner.
mod winner_code {
    use serde::{Deserialize, Deserializer, Serializer};

    use super::Seat;

    pub fn serialize<S: Serializer>(winner: &Option<Seat>, ser: S) -> Result<S::Ok, S::Error> {
        ser.serialize_u8(winner.map(Seat::code).unwrap_or(0))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(de: D) -> Result<Option<Seat>, D::Error> {
        match u8::deserialize(de)? {
            0 => Ok(None),
            code => Seat::try_from(code)
                .map(Some)
                .map_err(serde::de::Error::custom),
        }
    }
}
