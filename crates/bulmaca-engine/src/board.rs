use bulmaca_core::Position;
use rand::Rng;

/// The puzzle-specific half of a session.
///
/// A board owns the player's mutable answer state and the immutable puzzle
/// payload it was seeded from. The generic [`Session`](crate::Session)
/// supplies everything shared between puzzle types: the phase machine,
/// counters, hint budget, and the countdown.
pub trait PuzzleBoard {
    /// A single player edit.
    type Move;

    /// The authoritative data revealed by the external hint service:
    /// the solution grid for Sudoku, the full cipher map for Kriptogram.
    type HintPayload;

    /// The number of hints permitted within one session.
    const HINT_BUDGET: u8;

    /// Whether completion is detected automatically after each mutation.
    ///
    /// Sudoku checks for a full grid after every move and hint; the
    /// kriptogram board only validates on explicit player request.
    const AUTO_DETECT_COMPLETION: bool;

    /// Applies one player edit to the answer state.
    ///
    /// # Errors
    ///
    /// Returns a [`MoveError`] when the edit targets a non-editable slot
    /// (given cell, hint-locked letter) or is otherwise malformed. Rejected
    /// moves leave the board unchanged.
    fn apply_move(&mut self, mov: Self::Move) -> Result<(), MoveError>;

    /// Applies a hint payload to the answer state.
    ///
    /// `rng` drives target selection where the hint reveals a single unit
    /// out of several candidates.
    fn apply_hint(&mut self, payload: &Self::HintPayload, rng: &mut dyn Rng) -> HintOutcome;

    /// Returns whether every required answer slot is filled.
    fn is_full(&self) -> bool;

    /// Returns the fill ratio as a whole percentage (100 iff full).
    fn completion_percentage(&self) -> u8;

    /// Returns whether a player-initiated correctness check is permitted.
    fn check_ready(&self) -> bool;
}

/// An error which can be returned when applying a player move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum MoveError {
    /// The targeted cell is part of the original puzzle.
    #[display("cannot modify a given cell")]
    GivenCell,
    /// The value is not a digit 0-9.
    #[display("cell value out of range: {_0}")]
    ValueOutOfRange(#[error(not(source))] u8),
    /// The targeted letter was revealed by a hint and is locked.
    #[display("letter {_0:?} is locked by an applied hint")]
    LockedLetter(#[error(not(source))] char),
    /// The targeted letter does not appear in the encrypted text.
    #[display("letter {_0:?} does not appear in the encrypted text")]
    UnknownLetter(#[error(not(source))] char),
    /// The chosen plain letter is not in the cipher alphabet.
    #[display("{_0:?} is not a letter of the cipher alphabet")]
    NotALetter(#[error(not(source))] char),
}

/// What a hint application did to the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HintOutcome {
    /// One cell received its solution value.
    Placed {
        /// The filled cell.
        pos: Position,
        /// The value written into it.
        value: u8,
    },
    /// The full cipher map was merged into the answer mapping.
    Revealed {
        /// How many letters the merge revealed.
        letters: usize,
    },
    /// No eligible target existed; the board is unchanged.
    NoTarget,
}
