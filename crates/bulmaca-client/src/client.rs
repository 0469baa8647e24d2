//! The game client driving sessions against an external puzzle service.

use std::collections::VecDeque;

use bulmaca_core::{Difficulty, GameKind, Grid};
use bulmaca_engine::{
    CellEdit, CheckError, CheckReport, CheckResolution, Cryptogram, HintError, HintOutcome,
    LetterEdit, PuzzleDefinition, Session, SessionError, SessionId, SessionMeta, SessionPhase,
    SudokuBoard, TickOutcome,
};
use rand::SeedableRng as _;
use rand_pcg::Pcg64Mcg;

use crate::{
    action::{Action, Notice, Responder},
    flow::{self, FlowExecutor},
    service::{
        AnswerDto, HintDto, PuzzleDto, ServiceError, ServiceHandle, ServiceResponse,
        ServiceTransport, SessionDto,
    },
};

/// The session for whichever puzzle type is currently being played.
#[derive(Debug, Clone)]
pub enum ActiveGame {
    /// A number-placement session.
    Sudoku(Session<SudokuBoard>),
    /// A substitution-cipher session.
    Kriptogram(Session<Cryptogram>),
}

impl ActiveGame {
    /// Returns the puzzle type being played.
    #[must_use]
    pub fn kind(&self) -> GameKind {
        match self {
            Self::Sudoku(_) => GameKind::Sudoku,
            Self::Kriptogram(_) => GameKind::Kriptogram,
        }
    }

    /// Returns the session lifecycle phase.
    #[must_use]
    pub fn phase(&self) -> SessionPhase {
        match self {
            Self::Sudoku(session) => session.phase(),
            Self::Kriptogram(session) => session.phase(),
        }
    }

    /// Returns the attempt counters.
    #[must_use]
    pub fn meta(&self) -> &SessionMeta {
        match self {
            Self::Sudoku(session) => session.meta(),
            Self::Kriptogram(session) => session.meta(),
        }
    }

    /// Returns the puzzle definition being played.
    #[must_use]
    pub fn puzzle(&self) -> &PuzzleDefinition {
        match self {
            Self::Sudoku(session) => session.puzzle(),
            Self::Kriptogram(session) => session.puzzle(),
        }
    }

    /// Returns the session identifier.
    #[must_use]
    pub fn session_id(&self) -> &SessionId {
        match self {
            Self::Sudoku(session) => session.id(),
            Self::Kriptogram(session) => session.id(),
        }
    }

    fn tick(&mut self) -> TickOutcome {
        match self {
            Self::Sudoku(session) => session.tick(),
            Self::Kriptogram(session) => session.tick(),
        }
    }

    fn can_request_hint(&self) -> Result<(), HintError> {
        match self {
            Self::Sudoku(session) => session.can_request_hint(),
            Self::Kriptogram(session) => session.can_request_hint(),
        }
    }

    fn abort_check(&mut self) {
        match self {
            Self::Sudoku(session) => session.abort_check(),
            Self::Kriptogram(session) => session.abort_check(),
        }
    }

    fn resolve_check(&mut self, is_correct: bool) -> Result<CheckResolution, CheckError> {
        match self {
            Self::Sudoku(session) => session.resolve_check(is_correct),
            Self::Kriptogram(session) => session.resolve_check(is_correct),
        }
    }
}

#[derive(Debug)]
enum GameState {
    Idle,
    Loading { kind: GameKind },
    Active(ActiveGame),
}

/// An error which can be returned by a [`GameClient`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum ClientError {
    /// No game is loaded.
    #[display("no active game")]
    NoActiveGame,
    /// A puzzle is still loading.
    #[display("a puzzle is still loading")]
    Loading,
    /// The call targets the other puzzle type.
    #[display("the active game is not {expected}")]
    WrongGame {
        /// The puzzle type the call applies to.
        expected: GameKind,
    },
    /// The session rejected the move.
    Session(SessionError),
    /// The hint request was rejected locally.
    Hint(HintError),
    /// The check was rejected locally.
    Check(CheckError),
}

impl From<SessionError> for ClientError {
    fn from(err: SessionError) -> Self {
        Self::Session(err)
    }
}

impl From<HintError> for ClientError {
    fn from(err: HintError) -> Self {
        Self::Hint(err)
    }
}

impl From<CheckError> for ClientError {
    fn from(err: CheckError) -> Self {
        Self::Check(err)
    }
}

struct InFlight {
    handle: ServiceHandle,
    responder: Responder<Result<ServiceResponse, ServiceError>>,
}

/// Drives puzzle sessions against a service transport.
///
/// The client is updated from the host's frame or event loop: player calls
/// mutate local state and spawn flows, and [`GameClient::update`] pumps
/// pending service calls and applies their outcomes. Player-facing
/// notifications accumulate until drained with
/// [`GameClient::drain_notices`].
pub struct GameClient<T> {
    transport: T,
    executor: FlowExecutor,
    in_flight: Vec<InFlight>,
    state: GameState,
    generation: u64,
    notices: VecDeque<Notice>,
    rng: Pcg64Mcg,
}

impl<T> std::fmt::Debug for GameClient<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GameClient")
            .field("state", &self.state)
            .field("generation", &self.generation)
            .field("in_flight", &self.in_flight.len())
            .finish_non_exhaustive()
    }
}

impl<T> GameClient<T>
where
    T: ServiceTransport,
{
    /// Creates a client over the given transport.
    #[must_use]
    pub fn new(transport: T) -> Self {
        Self::with_rng(transport, Pcg64Mcg::seed_from_u64(rand::random()))
    }

    /// Creates a client with an explicit hint-selection RNG.
    #[must_use]
    pub fn with_rng(transport: T, rng: Pcg64Mcg) -> Self {
        Self {
            transport,
            executor: FlowExecutor::new(),
            in_flight: Vec::new(),
            state: GameState::Idle,
            generation: 0,
            notices: VecDeque::new(),
            rng,
        }
    }

    /// Returns the active game, if one is loaded.
    #[must_use]
    pub fn game(&self) -> Option<&ActiveGame> {
        match &self.state {
            GameState::Active(game) => Some(game),
            GameState::Idle | GameState::Loading { .. } => None,
        }
    }

    /// Returns whether a puzzle load is in progress.
    #[must_use]
    pub fn is_loading(&self) -> bool {
        matches!(self.state, GameState::Loading { .. })
    }

    /// Returns whether any flow or service call is still pending.
    #[must_use]
    pub fn has_pending_work(&self) -> bool {
        !self.executor.is_idle() || !self.in_flight.is_empty()
    }

    /// Returns the transport, for backend-specific configuration.
    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// Removes and returns all accumulated notices, oldest first.
    pub fn drain_notices(&mut self) -> Vec<Notice> {
        self.notices.drain(..).collect()
    }

    /// Starts a fresh attempt at a level, replacing any current game.
    pub fn start_game(&mut self, kind: GameKind, level: u32) {
        self.replace_game(GameState::Loading { kind });
        let handle = self.executor.handle();
        self.executor
            .spawn(flow::load_flow(handle, self.generation, kind, level));
    }

    /// Resumes at the level the saved progress points at.
    pub fn resume(&mut self, kind: GameKind) {
        self.replace_game(GameState::Loading { kind });
        let handle = self.executor.handle();
        self.executor
            .spawn(flow::resume_flow(handle, self.generation, kind));
    }

    /// Discards the current game and all its local state.
    pub fn abandon(&mut self) {
        self.replace_game(GameState::Idle);
    }

    /// Restarts the current level with a fresh session.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::NoActiveGame`] when nothing is loaded.
    pub fn restart(&mut self) -> Result<(), ClientError> {
        let (kind, level) = match &self.state {
            GameState::Active(game) => (game.kind(), game.puzzle().level),
            GameState::Loading { .. } => return Err(ClientError::Loading),
            GameState::Idle => return Err(ClientError::NoActiveGame),
        };
        self.start_game(kind, level);
        Ok(())
    }

    /// Applies one cell edit to the grid puzzle.
    ///
    /// Filling the last empty cell submits the answer for validation
    /// automatically.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::WrongGame`] for a cryptogram session, or the
    /// session's rejection.
    pub fn edit_cell(&mut self, edit: CellEdit) -> Result<(), ClientError> {
        match &mut self.state {
            GameState::Active(ActiveGame::Sudoku(session)) => {
                let applied = session.apply_move(edit)?;
                if applied.completion_ready {
                    self.submit_active()?;
                }
                Ok(())
            }
            GameState::Active(ActiveGame::Kriptogram(_)) => Err(ClientError::WrongGame {
                expected: GameKind::Sudoku,
            }),
            GameState::Loading { .. } => Err(ClientError::Loading),
            GameState::Idle => Err(ClientError::NoActiveGame),
        }
    }

    /// Applies one letter-mapping edit to the cryptogram.
    ///
    /// A full mapping is never submitted automatically; the player decides
    /// when to call [`GameClient::submit_solution`].
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::WrongGame`] for a grid session, or the
    /// session's rejection.
    pub fn edit_letter(&mut self, edit: LetterEdit) -> Result<(), ClientError> {
        match &mut self.state {
            GameState::Active(ActiveGame::Kriptogram(session)) => {
                session.apply_move(edit)?;
                Ok(())
            }
            GameState::Active(ActiveGame::Sudoku(_)) => Err(ClientError::WrongGame {
                expected: GameKind::Kriptogram,
            }),
            GameState::Loading { .. } => Err(ClientError::Loading),
            GameState::Idle => Err(ClientError::NoActiveGame),
        }
    }

    /// Runs the advisory local check on the grid puzzle.
    ///
    /// Nothing is blocked or mutated; the counts are also queued as a
    /// notice.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::WrongGame`] for a cryptogram session.
    pub fn check_board(&mut self) -> Result<CheckReport, ClientError> {
        match &self.state {
            GameState::Active(ActiveGame::Sudoku(session)) => {
                let report = session.board().check_report();
                self.notices.push_back(Notice::CheckReport {
                    incorrect: report.incorrect,
                    empty: report.empty,
                });
                Ok(report)
            }
            GameState::Active(ActiveGame::Kriptogram(_)) => Err(ClientError::WrongGame {
                expected: GameKind::Sudoku,
            }),
            GameState::Loading { .. } => Err(ClientError::Loading),
            GameState::Idle => Err(ClientError::NoActiveGame),
        }
    }

    /// Submits the current answer for authoritative validation.
    ///
    /// # Errors
    ///
    /// Returns the session's rejection: a grid must be full, and a
    /// cryptogram must have at least half its letters mapped.
    pub fn submit_solution(&mut self) -> Result<(), ClientError> {
        self.submit_active()
    }

    /// Requests a hint from the service.
    ///
    /// The budget is checked locally before anything is dispatched, so an
    /// exhausted budget costs no round trip. The payload is applied when
    /// the response arrives during [`GameClient::update`].
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Hint`] when the budget is spent or the
    /// session is not accepting input.
    pub fn request_hint(&mut self) -> Result<(), ClientError> {
        let (session_id, puzzle_id) = match &self.state {
            GameState::Active(game) => {
                game.can_request_hint()?;
                (
                    game.session_id().as_str().to_owned(),
                    game.puzzle().id.clone(),
                )
            }
            GameState::Loading { .. } => return Err(ClientError::Loading),
            GameState::Idle => return Err(ClientError::NoActiveGame),
        };
        let handle = self.executor.handle();
        self.executor.spawn(flow::hint_flow(
            handle,
            self.generation,
            session_id,
            puzzle_id,
        ));
        Ok(())
    }

    /// Advances the countdown by one second.
    ///
    /// On expiry the session is closed on the service side and a
    /// [`Notice::TimeExpired`] is queued. Ticks outside an in-progress
    /// session are ignored.
    pub fn tick(&mut self) {
        let GameState::Active(game) = &mut self.state else {
            return;
        };
        if game.tick() == TickOutcome::Expired {
            let session_id = game.session_id().as_str().to_owned();
            self.notices.push_back(Notice::TimeExpired);
            let handle = self.executor.handle();
            self.executor.spawn(flow::end_flow(handle, session_id));
        }
    }

    /// Pumps pending service calls and flows until nothing more can make
    /// progress without a new response arriving.
    pub fn update(&mut self) {
        loop {
            let delivered = self.poll_in_flight();
            let mut actions = Vec::new();
            self.executor.poll(&mut actions);
            if !delivered && actions.is_empty() {
                break;
            }
            for action in actions {
                self.apply_action(action);
            }
        }
    }

    fn poll_in_flight(&mut self) -> bool {
        let mut delivered = false;
        let mut i = 0;
        while i < self.in_flight.len() {
            match self.in_flight[i].handle.poll() {
                Ok(Some(response)) => {
                    let entry = self.in_flight.swap_remove(i);
                    let _ = entry.responder.send(Ok(response));
                    delivered = true;
                }
                Ok(None) => i += 1,
                Err(err) => {
                    let entry = self.in_flight.swap_remove(i);
                    let _ = entry.responder.send(Err(err));
                    delivered = true;
                }
            }
        }
        delivered
    }

    fn apply_action(&mut self, action: Action) {
        match action {
            Action::Dispatch { request, responder } => match self.transport.dispatch(request) {
                Ok(handle) => self.in_flight.push(InFlight { handle, responder }),
                Err(err) => {
                    let _ = responder.send(Err(err));
                }
            },
            Action::SessionReady {
                generation,
                kind,
                session,
                puzzle,
            } => {
                if self.is_stale(generation, "session") {
                    return;
                }
                self.install_game(kind, session, puzzle);
            }
            Action::ProgressLoaded { generation, level } => {
                if self.is_stale(generation, "progress") {
                    return;
                }
                self.notices.push_back(Notice::ProgressLoaded { level });
            }
            Action::LoadFailed { generation, reason } => {
                if self.is_stale(generation, "load failure") {
                    return;
                }
                log::error!("failed to load puzzle: {reason}");
                self.state = GameState::Idle;
                self.notices.push_back(Notice::LoadFailed { reason });
            }
            Action::HintReady { generation, hint } => {
                if self.is_stale(generation, "hint") {
                    return;
                }
                self.apply_hint_payload(hint);
            }
            Action::HintFailed { generation, reason } => {
                if self.is_stale(generation, "hint failure") {
                    return;
                }
                log::warn!("hint request failed: {reason}");
                self.notices.push_back(Notice::HintFailed { reason });
            }
            Action::Verdict {
                generation,
                is_correct,
            } => {
                if self.is_stale(generation, "validation") {
                    return;
                }
                self.apply_verdict(generation, is_correct);
            }
            Action::CheckFailed { generation, reason } => {
                if self.is_stale(generation, "validation failure") {
                    return;
                }
                log::warn!("solution validation failed: {reason}");
                if let GameState::Active(game) = &mut self.state {
                    game.abort_check();
                }
                self.notices.push_back(Notice::CheckFailed { reason });
            }
            Action::ProgressSaved { generation } => {
                if self.is_stale(generation, "progress report") {
                    return;
                }
                self.notices.push_back(Notice::ProgressSaved);
            }
            Action::ReportFailed { generation, reason } => {
                if self.is_stale(generation, "progress report failure") {
                    return;
                }
                log::warn!("failed to record progress: {reason}");
                self.notices.push_back(Notice::ReportFailed { reason });
            }
        }
    }

    fn is_stale(&self, generation: u64, what: &str) -> bool {
        if generation == self.generation {
            false
        } else {
            log::warn!(
                "discarding stale {what} response (generation {generation}, current {})",
                self.generation
            );
            true
        }
    }

    /// Bumps the load generation so in-flight responses for the previous
    /// game are discarded, and closes its session if it was still open.
    fn replace_game(&mut self, next: GameState) {
        self.generation += 1;
        let previous = std::mem::replace(&mut self.state, next);
        if let GameState::Active(game) = previous {
            if matches!(
                game.phase(),
                SessionPhase::InProgress | SessionPhase::Completing
            ) {
                let session_id = game.session_id().as_str().to_owned();
                let handle = self.executor.handle();
                self.executor.spawn(flow::end_flow(handle, session_id));
            }
        }
    }

    fn install_game(&mut self, kind: GameKind, session: SessionDto, puzzle: PuzzleDto) {
        let level = puzzle.level;
        let difficulty = Difficulty::from_level(level);
        let definition = PuzzleDefinition {
            id: puzzle.id.clone(),
            level,
            difficulty,
            time_limit: puzzle.time_limit,
        };
        let id = SessionId::new(session.session_id);
        match build_game(kind, id, definition, puzzle) {
            Ok(game) => {
                self.state = GameState::Active(game);
                self.notices.push_back(Notice::PuzzleReady {
                    kind,
                    level,
                    difficulty,
                });
            }
            Err(reason) => {
                log::error!("failed to build {kind} puzzle: {reason}");
                self.state = GameState::Idle;
                self.notices.push_back(Notice::LoadFailed { reason });
            }
        }
    }

    fn apply_hint_payload(&mut self, hint: HintDto) {
        let mut submit = false;
        match &mut self.state {
            GameState::Active(ActiveGame::Sudoku(session)) => {
                let Some(solution) = hint.solution else {
                    self.notices.push_back(Notice::HintFailed {
                        reason: "hint payload is missing the solution".to_owned(),
                    });
                    return;
                };
                let solution: Grid = match solution.parse() {
                    Ok(grid) => grid,
                    Err(err) => {
                        self.notices.push_back(Notice::HintFailed {
                            reason: err.to_string(),
                        });
                        return;
                    }
                };
                match session.apply_hint(&solution, &mut self.rng) {
                    Ok(applied) => {
                        if let HintOutcome::Placed { pos, value } = applied.outcome {
                            self.notices.push_back(Notice::HintPlaced { pos, value });
                        }
                        submit = applied.completion_ready;
                    }
                    Err(err) => log::warn!("hint payload could not be applied: {err}"),
                }
            }
            GameState::Active(ActiveGame::Kriptogram(session)) => {
                let Some(map) = hint.cipher_map else {
                    self.notices.push_back(Notice::HintFailed {
                        reason: "hint payload is missing the cipher map".to_owned(),
                    });
                    return;
                };
                match session.apply_hint(&map, &mut self.rng) {
                    Ok(applied) => {
                        if let HintOutcome::Revealed { letters } = applied.outcome {
                            self.notices.push_back(Notice::HintRevealed { letters });
                        }
                    }
                    Err(err) => log::warn!("hint payload could not be applied: {err}"),
                }
            }
            GameState::Loading { .. } | GameState::Idle => {
                log::warn!("hint response arrived with no active game");
            }
        }
        if submit {
            if let Err(err) = self.submit_active() {
                log::warn!("failed to dispatch validation after hint: {err}");
            }
        }
    }

    fn apply_verdict(&mut self, generation: u64, is_correct: bool) {
        let GameState::Active(game) = &mut self.state else {
            log::warn!("validation verdict arrived with no active game");
            return;
        };
        match game.resolve_check(is_correct) {
            Ok(CheckResolution::Solved { time_taken }) => {
                let kind = game.kind();
                let level = game.puzzle().level;
                let session_id = game.session_id().as_str().to_owned();
                let meta = game.meta().clone();
                self.notices.push_back(Notice::Solved { time_taken });
                let handle = self.executor.handle();
                self.executor.spawn(flow::finish_flow(
                    handle,
                    generation,
                    session_id,
                    kind,
                    level,
                    time_taken,
                    meta.moves,
                    meta.hints_used,
                ));
            }
            Ok(CheckResolution::Incorrect) => self.notices.push_back(Notice::Incorrect),
            Err(err) => log::warn!("validation verdict arrived with no check in flight: {err}"),
        }
    }

    fn submit_active(&mut self) -> Result<(), ClientError> {
        let (session_id, puzzle_id, answer) = match &mut self.state {
            GameState::Active(ActiveGame::Sudoku(session)) => {
                session.begin_check()?;
                (
                    session.id().as_str().to_owned(),
                    session.puzzle().id.clone(),
                    AnswerDto::Grid(session.board().answer().to_string()),
                )
            }
            GameState::Active(ActiveGame::Kriptogram(session)) => {
                session.begin_check()?;
                (
                    session.id().as_str().to_owned(),
                    session.puzzle().id.clone(),
                    AnswerDto::CipherMap(session.board().mapping().clone()),
                )
            }
            GameState::Loading { .. } => return Err(ClientError::Loading),
            GameState::Idle => return Err(ClientError::NoActiveGame),
        };
        let handle = self.executor.handle();
        self.executor.spawn(flow::validate_flow(
            handle,
            self.generation,
            session_id,
            puzzle_id,
            answer,
        ));
        Ok(())
    }
}

fn build_game(
    kind: GameKind,
    id: SessionId,
    definition: PuzzleDefinition,
    puzzle: PuzzleDto,
) -> Result<ActiveGame, String> {
    match kind {
        GameKind::Sudoku => {
            let grid = puzzle
                .grid
                .ok_or_else(|| "puzzle payload is missing the grid".to_owned())?;
            let givens: Grid = grid.parse().map_err(|err| format!("{err}"))?;
            Ok(ActiveGame::Sudoku(Session::new(
                id,
                definition,
                SudokuBoard::new(givens),
            )))
        }
        GameKind::Kriptogram => {
            let text = puzzle
                .encrypted_text
                .ok_or_else(|| "puzzle payload is missing the encrypted text".to_owned())?;
            Ok(ActiveGame::Kriptogram(Session::new(
                id,
                definition,
                Cryptogram::new(text),
            )))
        }
    }
}
