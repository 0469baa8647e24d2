//! Wire-level types for the external puzzle service.
//!
//! Requests and responses are plain serde types so a transport can ship
//! them over any channel (HTTP, message port, in-process fake). The client
//! never blocks on a response: a dispatch returns a [`ServiceHandle`] that
//! is polled from the update loop.

use std::collections::BTreeMap;

use futures_channel::oneshot;

/// A request sent to the puzzle service.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum ServiceRequest {
    /// Open a session for one attempt at a level.
    StartSession {
        /// Puzzle type identifier (`"sudoku"` or `"kriptogram"`).
        game_type: String,
        /// The level being attempted.
        level: u32,
        /// Difficulty tier label, computed from the level.
        difficulty: String,
    },
    /// Close a session, reporting whether it ended in a solve.
    EndSession {
        /// The session to close.
        session_id: String,
        /// Whether the puzzle was solved within this session.
        completed: bool,
    },
    /// Fetch a fresh puzzle instance for a level.
    GetNewPuzzle {
        /// Puzzle type identifier.
        game_type: String,
        /// The level being attempted.
        level: u32,
    },
    /// Submit an answer for authoritative validation.
    ValidateSolution {
        /// The session the answer belongs to.
        session_id: String,
        /// The puzzle instance being answered.
        puzzle_id: String,
        /// The player's answer.
        answer: AnswerDto,
    },
    /// Request the authoritative hint payload for a puzzle.
    GetHint {
        /// The session requesting the hint.
        session_id: String,
        /// The puzzle instance.
        puzzle_id: String,
    },
    /// Record a completed level in the player's progress.
    UpdateProgress {
        /// Puzzle type identifier.
        game_type: String,
        /// The completed level.
        level: u32,
        /// Seconds spent solving.
        time_taken: u32,
        /// Accepted moves within the session.
        moves: u32,
        /// Hints consumed within the session.
        hints_used: u8,
    },
    /// Fetch the player's saved progress for a puzzle type.
    GetUserProgress {
        /// Puzzle type identifier.
        game_type: String,
    },
}

/// A response produced by the puzzle service.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum ServiceResponse {
    /// A session was opened.
    SessionStarted(SessionDto),
    /// A session was closed.
    SessionEnded,
    /// A puzzle instance is ready.
    Puzzle(PuzzleDto),
    /// The validator's verdict on a submitted answer.
    Validation(ValidationDto),
    /// The authoritative hint payload.
    Hint(HintDto),
    /// The player's progress was recorded.
    ProgressUpdated,
    /// The player's saved progress.
    UserProgress(UserProgressDto),
}

/// A submitted answer, shaped by the puzzle type.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum AnswerDto {
    /// 81 row-major cell characters for the number grid.
    Grid(String),
    /// The full cipher-letter → plain-letter mapping.
    CipherMap(BTreeMap<char, char>),
}

/// Identifies an opened session.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct SessionDto {
    /// Service-assigned session identifier.
    pub session_id: String,
}

/// A puzzle instance as delivered by the service.
///
/// Exactly one of `grid` and `encrypted_text` is set, matching `game_type`.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct PuzzleDto {
    /// Service-assigned puzzle identifier.
    pub id: String,
    /// Puzzle type identifier.
    pub game_type: String,
    /// The level this puzzle belongs to.
    pub level: u32,
    /// Session time limit in seconds.
    pub time_limit: u32,
    /// 81 row-major cell characters (`.` = empty) for the number grid.
    pub grid: Option<String>,
    /// The encrypted text for the cryptogram.
    pub encrypted_text: Option<String>,
}

/// The validator's verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ValidationDto {
    /// Whether the submitted answer is the solution.
    pub is_correct: bool,
}

/// The authoritative hint payload, shaped by the puzzle type.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct HintDto {
    /// The full solution grid for the number puzzle.
    pub solution: Option<String>,
    /// The full cipher map for the cryptogram.
    pub cipher_map: Option<BTreeMap<char, char>>,
}

/// The player's saved progress for one puzzle type.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct UserProgressDto {
    /// Puzzle type identifier.
    pub game_type: String,
    /// The highest level completed so far (0 = none).
    pub highest_level: u32,
    /// The next level to play.
    pub current_level: u32,
}

/// An error which can be returned by a transport or the service.
#[derive(
    Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error,
    serde::Serialize, serde::Deserialize,
)]
pub enum ServiceError {
    /// The transport channel closed before a response arrived.
    #[display("the puzzle service disconnected")]
    Disconnected,
    /// The service refused the request.
    #[display("the puzzle service rejected the request: {_0}")]
    Rejected(#[error(not(source))] String),
}

/// Sending half of a pending service call.
pub type ServiceResponder = oneshot::Sender<Result<ServiceResponse, ServiceError>>;

/// A pending service call, polled from the client update loop.
pub struct ServiceHandle {
    receiver: oneshot::Receiver<Result<ServiceResponse, ServiceError>>,
}

impl std::fmt::Debug for ServiceHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceHandle").finish()
    }
}

impl ServiceHandle {
    /// Creates a connected responder/handle pair.
    #[must_use]
    pub fn pair() -> (ServiceResponder, Self) {
        let (responder, receiver) = oneshot::channel();
        (responder, Self { receiver })
    }

    /// Attempts to poll for a completed response.
    ///
    /// # Errors
    ///
    /// Returns the service's error, or [`ServiceError::Disconnected`] when
    /// the responder was dropped without answering.
    pub fn poll(&mut self) -> Result<Option<ServiceResponse>, ServiceError> {
        match self.receiver.try_recv() {
            Ok(Some(result)) => result.map(Some),
            Ok(None) => Ok(None),
            Err(oneshot::Canceled) => Err(ServiceError::Disconnected),
        }
    }
}

/// A channel to the puzzle service.
///
/// `dispatch` hands the request off and returns immediately; the response
/// arrives later through the returned handle.
pub trait ServiceTransport {
    /// Sends a request to the service.
    ///
    /// # Errors
    ///
    /// Returns a [`ServiceError`] when the request cannot be handed off at
    /// all (responses that fail later arrive through the handle).
    fn dispatch(&mut self, request: ServiceRequest) -> Result<ServiceHandle, ServiceError>;
}
