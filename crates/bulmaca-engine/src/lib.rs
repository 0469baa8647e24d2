//! The puzzle interaction engine.
//!
//! One session drives one timed attempt at a puzzle: it owns the player's
//! in-progress answer, applies moves under editability constraints, spends
//! the hint budget, detects completion, and counts the clock down.
//!
//! Both puzzle types share the same [`Session`] state machine; the
//! puzzle-specific answer representation, move rules, and completion
//! predicate are supplied through the [`PuzzleBoard`] trait by
//! [`SudokuBoard`] and [`Cryptogram`].
//!
//! The engine is a local, optimistic view: it never decides correctness.
//! Completion always goes through the external validator, which the
//! client crate talks to.

pub use self::{
    board::{HintOutcome, MoveError, PuzzleBoard},
    cryptogram::{Cryptogram, LetterEdit},
    session::{
        CheckError, CheckResolution, HintApplied, HintError, MoveApplied, PuzzleDefinition,
        Session, SessionError, SessionId, SessionMeta, SessionPhase, TickOutcome, format_time,
    },
    sudoku::{CellEdit, CheckReport, SudokuBoard},
};

mod board;
mod cryptogram;
mod session;
mod sudoku;
