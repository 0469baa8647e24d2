//! Internal actions produced by flows and player-facing notices.

use bulmaca_core::{Difficulty, GameKind, Position};

use crate::service::{HintDto, PuzzleDto, ServiceError, ServiceRequest, ServiceResponse, SessionDto};

/// One-shot channel for answering a flow's pending request.
pub(crate) type Responder<T> = futures_channel::oneshot::Sender<T>;

/// An action queued by a flow and applied by the client update loop.
///
/// Every action produced after a service round trip carries the load
/// generation it was spawned under, so responses for a superseded game are
/// discarded instead of corrupting the current one.
#[derive(Debug)]
pub(crate) enum Action {
    /// Hand a request to the transport and route the response back to the
    /// awaiting flow.
    Dispatch {
        request: ServiceRequest,
        responder: Responder<Result<ServiceResponse, ServiceError>>,
    },
    /// A session and its puzzle are both ready; install the game.
    SessionReady {
        generation: u64,
        kind: GameKind,
        session: SessionDto,
        puzzle: PuzzleDto,
    },
    /// Saved progress arrived while resuming.
    ProgressLoaded { generation: u64, level: u32 },
    /// Loading failed; return to the idle state.
    LoadFailed { generation: u64, reason: String },
    /// The authoritative hint payload arrived.
    HintReady { generation: u64, hint: HintDto },
    /// The hint round trip failed.
    HintFailed { generation: u64, reason: String },
    /// The validator's verdict arrived.
    Verdict { generation: u64, is_correct: bool },
    /// The validation round trip failed; reopen the session.
    CheckFailed { generation: u64, reason: String },
    /// Progress reporting and session close both succeeded.
    ProgressSaved { generation: u64 },
    /// Progress reporting or session close failed.
    ReportFailed { generation: u64, reason: String },
}

/// A player-facing notification drained from the client after each update.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display)]
pub enum Notice {
    /// A new puzzle was installed and the timer started.
    #[display("{kind} bulmacası hazır: seviye {level} ({difficulty})")]
    PuzzleReady {
        /// The puzzle type.
        kind: GameKind,
        /// The level being attempted.
        level: u32,
        /// Difficulty tier of the level.
        difficulty: Difficulty,
    },
    /// Saved progress determined which level to resume at.
    #[display("Kaldığın yerden devam: seviye {level}")]
    ProgressLoaded {
        /// The level about to be loaded.
        level: u32,
    },
    /// The puzzle could not be loaded.
    #[display("Bulmaca yüklenemedi: {reason}")]
    LoadFailed {
        /// What went wrong.
        reason: String,
    },
    /// A hint filled one cell with its solution value.
    #[display("İpucu: {pos} hücresine {value} yerleştirildi")]
    HintPlaced {
        /// The filled cell.
        pos: Position,
        /// The value written into it.
        value: u8,
    },
    /// A hint revealed the full cipher map.
    #[display("İpucu: {letters} harf açığa çıkarıldı")]
    HintRevealed {
        /// How many letters were revealed.
        letters: usize,
    },
    /// The hint round trip failed; the budget was not consumed.
    #[display("İpucu alınamadı: {reason}")]
    HintFailed {
        /// What went wrong.
        reason: String,
    },
    /// Result of the advisory grid check.
    #[display("Kontrol: {incorrect} hatalı, {empty} boş hücre")]
    CheckReport {
        /// Player-filled cells violating row/column/box uniqueness.
        incorrect: usize,
        /// Editable cells still empty.
        empty: usize,
    },
    /// The validator confirmed the solution.
    #[display("Tebrikler! Bulmacayı çözdün ({time_taken} sn)")]
    Solved {
        /// Seconds spent solving.
        time_taken: u32,
    },
    /// The validator rejected the solution; the session continues.
    #[display("Çözüm doğru değil, tekrar dene")]
    Incorrect,
    /// The validation round trip failed; the session was reopened.
    #[display("Doğrulama tamamlanamadı: {reason}")]
    CheckFailed {
        /// What went wrong.
        reason: String,
    },
    /// The countdown reached zero.
    #[display("Süre doldu!")]
    TimeExpired,
    /// The solve was recorded and the session closed.
    #[display("İlerleme kaydedildi")]
    ProgressSaved,
    /// The solve could not be recorded.
    #[display("İlerleme kaydedilemedi: {reason}")]
    ReportFailed {
        /// What went wrong.
        reason: String,
    },
}
