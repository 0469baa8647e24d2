use bulmaca_core::Difficulty;
use rand::Rng;

use crate::{HintOutcome, MoveError, PuzzleBoard};

/// The identifier correlating a session with the external session-tracking
/// service. Also used to tag asynchronous requests so that late responses
/// for a superseded session can be discarded.
#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_more::Display)]
pub struct SessionId(String);

impl SessionId {
    /// Creates a session id from the value returned by the session service.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// The immutable identity of a puzzle instance, minus its type-specific
/// payload (which lives in the board).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PuzzleDefinition {
    /// Backend identifier of this puzzle instance.
    pub id: String,
    /// The level this puzzle belongs to.
    pub level: u32,
    /// Difficulty tier of the level.
    pub difficulty: Difficulty,
    /// Session time limit in seconds.
    pub time_limit: u32,
}

/// Mutable counters scoped to one attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionMeta {
    /// Seconds remaining on the countdown.
    pub time_left: u32,
    /// Accepted player moves (hint placements included).
    pub moves: u32,
    /// Hints consumed so far.
    pub hints_used: u8,
    /// Set once the external validator confirms the solution.
    pub completed: bool,
}

/// The session lifecycle state.
///
/// The `Loading` state of the full state machine is represented by the
/// absence of a session: a [`Session`] only exists once the loader has a
/// puzzle and a session handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::IsVariant)]
pub enum SessionPhase {
    /// Accepting moves and hints; the timer runs.
    InProgress,
    /// Awaiting the external validator's verdict.
    Completing,
    /// Confirmed correct; terminal.
    Completed,
    /// The timer ran out; terminal.
    Expired,
}

/// An error which can be returned when applying a player move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::Error, derive_more::From)]
pub enum SessionError {
    /// The session is not in a state that accepts input.
    #[display("session is not accepting input")]
    NotActive,
    /// The board rejected the move.
    Move(MoveError),
}

/// An error which can be returned when requesting or applying a hint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum HintError {
    /// The session is not in a state that accepts input.
    #[display("session is not accepting input")]
    NotActive,
    /// The per-session hint budget is spent.
    #[display("hint budget of {budget} is exhausted")]
    BudgetExhausted {
        /// The budget that was exhausted.
        budget: u8,
    },
}

/// An error which can be returned by the completion protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum CheckError {
    /// The session is not in a state that accepts a check.
    #[display("session is not accepting input")]
    NotActive,
    /// The fill-ratio guard rejected a premature check.
    #[display("answer is only {percentage}% complete")]
    NotReady {
        /// Current completion percentage.
        percentage: u8,
    },
    /// No check is awaiting a verdict.
    #[display("no check in flight")]
    NotChecking,
}

/// Result of an accepted move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveApplied {
    /// Whether the board is now full and should be validated externally.
    pub completion_ready: bool,
}

/// Result of an applied hint payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HintApplied {
    /// What the hint did to the board.
    pub outcome: HintOutcome,
    /// Whether the board is now full and should be validated externally.
    pub completion_ready: bool,
}

/// Verdict handed back by [`Session::resolve_check`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckResolution {
    /// The validator confirmed the solution; the session is over.
    Solved {
        /// Seconds spent, `time_limit - time_left`.
        time_taken: u32,
    },
    /// The validator rejected the solution; the session continues.
    Incorrect,
}

/// Result of one timer tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// The countdown decremented and the session continues.
    Running {
        /// Seconds remaining.
        time_left: u32,
    },
    /// The countdown reached zero; the session just expired.
    Expired,
    /// The session is not in progress; the tick did nothing.
    Ignored,
}

/// One timed attempt at a single puzzle instance.
///
/// Owns the board (answer state) and the attempt counters exclusively; the
/// whole session is discarded on restart or abandonment.
///
/// # Example
///
/// ```
/// use bulmaca_core::{Difficulty, Grid, Position};
/// use bulmaca_engine::{CellEdit, PuzzleDefinition, Session, SessionId, SudokuBoard};
///
/// let definition = PuzzleDefinition {
///     id: "p-1".into(),
///     level: 5,
///     difficulty: Difficulty::from_level(5),
///     time_limit: 600,
/// };
/// let board = SudokuBoard::new(Grid::new());
/// let mut session = Session::new(SessionId::new("s-1"), definition, board);
///
/// let applied = session
///     .apply_move(CellEdit::new(Position::new(0, 0), 5))
///     .unwrap();
/// assert!(!applied.completion_ready);
/// assert_eq!(session.meta().moves, 1);
/// ```
#[derive(Debug, Clone)]
pub struct Session<B> {
    id: SessionId,
    puzzle: PuzzleDefinition,
    board: B,
    meta: SessionMeta,
    phase: SessionPhase,
}

impl<B: PuzzleBoard> Session<B> {
    /// Creates an in-progress session with fresh counters and the timer
    /// seeded from the puzzle's time limit.
    #[must_use]
    pub fn new(id: SessionId, puzzle: PuzzleDefinition, board: B) -> Self {
        let meta = SessionMeta {
            time_left: puzzle.time_limit,
            moves: 0,
            hints_used: 0,
            completed: false,
        };
        Self {
            id,
            puzzle,
            board,
            meta,
            phase: SessionPhase::InProgress,
        }
    }

    /// Returns the session identifier.
    #[must_use]
    pub fn id(&self) -> &SessionId {
        &self.id
    }

    /// Returns the puzzle definition this session is playing.
    #[must_use]
    pub fn puzzle(&self) -> &PuzzleDefinition {
        &self.puzzle
    }

    /// Returns the attempt counters.
    #[must_use]
    pub fn meta(&self) -> &SessionMeta {
        &self.meta
    }

    /// Returns the current lifecycle phase.
    #[must_use]
    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    /// Returns the board (read-only; all mutation goes through the session).
    #[must_use]
    pub fn board(&self) -> &B {
        &self.board
    }

    /// Returns the per-session hint budget.
    #[must_use]
    pub fn hint_budget(&self) -> u8 {
        B::HINT_BUDGET
    }

    /// Returns how many hints remain.
    #[must_use]
    pub fn hints_remaining(&self) -> u8 {
        B::HINT_BUDGET.saturating_sub(self.meta.hints_used)
    }

    /// Returns seconds elapsed since the session started.
    #[must_use]
    pub fn elapsed(&self) -> u32 {
        self.puzzle.time_limit - self.meta.time_left
    }

    /// Applies one player edit and increments the move counter.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::NotActive`] outside `InProgress`, or the
    /// board's [`MoveError`] for an unaccepted edit; either way nothing
    /// changes.
    pub fn apply_move(&mut self, mov: B::Move) -> Result<MoveApplied, SessionError> {
        if !self.phase.is_in_progress() {
            return Err(SessionError::NotActive);
        }
        self.board.apply_move(mov)?;
        self.meta.moves += 1;
        Ok(MoveApplied {
            completion_ready: self.completion_ready(),
        })
    }

    /// Returns whether a hint request should be dispatched at all.
    ///
    /// # Errors
    ///
    /// Returns [`HintError::BudgetExhausted`] when the budget is spent, so
    /// the caller can surface the budget message without a round trip.
    pub fn can_request_hint(&self) -> Result<(), HintError> {
        if !self.phase.is_in_progress() {
            return Err(HintError::NotActive);
        }
        if self.meta.hints_used >= B::HINT_BUDGET {
            return Err(HintError::BudgetExhausted {
                budget: B::HINT_BUDGET,
            });
        }
        Ok(())
    }

    /// Applies an authoritative hint payload.
    ///
    /// A placement counts as both a hint and a move; a full-map reveal
    /// counts as a hint only. A payload with no eligible target is a
    /// no-op and consumes nothing.
    ///
    /// # Errors
    ///
    /// Same conditions as [`Session::can_request_hint`].
    pub fn apply_hint(
        &mut self,
        payload: &B::HintPayload,
        rng: &mut dyn Rng,
    ) -> Result<HintApplied, HintError> {
        self.can_request_hint()?;
        let outcome = self.board.apply_hint(payload, rng);
        match outcome {
            HintOutcome::Placed { .. } => {
                self.meta.hints_used += 1;
                self.meta.moves += 1;
            }
            HintOutcome::Revealed { .. } => {
                self.meta.hints_used += 1;
            }
            HintOutcome::NoTarget => {}
        }
        Ok(HintApplied {
            outcome,
            completion_ready: self.completion_ready(),
        })
    }

    fn completion_ready(&self) -> bool {
        B::AUTO_DETECT_COMPLETION && self.board.is_full()
    }

    /// Enters the transient `Completing` phase ahead of external validation.
    ///
    /// For auto-detecting boards the answer must be full; for
    /// player-initiated checks the board's fill-ratio guard must pass.
    ///
    /// # Errors
    ///
    /// Returns [`CheckError::NotActive`] outside `InProgress` and
    /// [`CheckError::NotReady`] when the guard rejects the check.
    pub fn begin_check(&mut self) -> Result<(), CheckError> {
        if !self.phase.is_in_progress() {
            return Err(CheckError::NotActive);
        }
        let ready = if B::AUTO_DETECT_COMPLETION {
            self.board.is_full()
        } else {
            self.board.check_ready()
        };
        if !ready {
            return Err(CheckError::NotReady {
                percentage: self.board.completion_percentage(),
            });
        }
        self.phase = SessionPhase::Completing;
        Ok(())
    }

    /// Returns to `InProgress` after a validation round trip failed.
    ///
    /// Local state is preserved; the player may retry.
    pub fn abort_check(&mut self) {
        if self.phase.is_completing() {
            self.phase = SessionPhase::InProgress;
        }
    }

    /// Records the external validator's verdict.
    ///
    /// A positive verdict sets the completion flag and stops the timer by
    /// entering the terminal `Completed` phase; a negative verdict reopens
    /// the session for edits.
    ///
    /// # Errors
    ///
    /// Returns [`CheckError::NotChecking`] unless a check is in flight.
    pub fn resolve_check(&mut self, is_correct: bool) -> Result<CheckResolution, CheckError> {
        if !self.phase.is_completing() {
            return Err(CheckError::NotChecking);
        }
        if is_correct {
            self.meta.completed = true;
            self.phase = SessionPhase::Completed;
            Ok(CheckResolution::Solved {
                time_taken: self.elapsed(),
            })
        } else {
            self.phase = SessionPhase::InProgress;
            Ok(CheckResolution::Incorrect)
        }
    }

    /// Advances the countdown by one second.
    ///
    /// Only an `InProgress` session ticks; reaching zero transitions to the
    /// terminal `Expired` phase exactly once. Every later tick is ignored,
    /// so a stale timer cannot fire against a finished session.
    pub fn tick(&mut self) -> TickOutcome {
        if !self.phase.is_in_progress() {
            return TickOutcome::Ignored;
        }
        if self.meta.time_left > 0 {
            self.meta.time_left -= 1;
        }
        if self.meta.time_left == 0 {
            self.phase = SessionPhase::Expired;
            TickOutcome::Expired
        } else {
            TickOutcome::Running {
                time_left: self.meta.time_left,
            }
        }
    }
}

/// Formats seconds as `M:SS` for display.
#[must_use]
pub fn format_time(seconds: u32) -> String {
    format!("{}:{:02}", seconds / 60, seconds % 60)
}
