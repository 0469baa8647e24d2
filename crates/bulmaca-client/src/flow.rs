//! Async flows orchestrating multi-step service conversations.
//!
//! The executor is polled from the client update loop and drives flow
//! futures with a noop waker; a pending flow is simply re-polled on the
//! next update. Flows never touch client state directly: they queue
//! [`Action`]s, and the client applies them (discarding stale ones by
//! load generation).

use std::{
    cell::RefCell,
    future::Future,
    pin::Pin,
    rc::Rc,
    task::{Context, Poll, RawWaker, RawWakerVTable, Waker},
};

use bulmaca_core::{Difficulty, GameKind};
use futures_channel::oneshot;

use crate::{
    action::Action,
    service::{AnswerDto, ServiceError, ServiceRequest, ServiceResponse},
};

/// Lightweight async flow executor for service orchestration.
pub(crate) struct FlowExecutor {
    state: Rc<RefCell<FlowState>>,
    tasks: Vec<FlowTask>,
}

impl std::fmt::Debug for FlowExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FlowExecutor")
            .field("tasks", &self.tasks.len())
            .finish_non_exhaustive()
    }
}

impl Default for FlowExecutor {
    fn default() -> Self {
        Self::new()
    }
}

impl FlowExecutor {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self {
            state: Rc::new(RefCell::new(FlowState::default())),
            tasks: Vec::new(),
        }
    }

    /// Returns a handle for flows to queue actions and dispatch calls.
    #[must_use]
    pub(crate) fn handle(&self) -> FlowHandle {
        FlowHandle {
            state: Rc::clone(&self.state),
        }
    }

    /// Returns true if no flows are currently running.
    #[must_use]
    pub(crate) fn is_idle(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Spawn a new flow future.
    pub(crate) fn spawn(&mut self, future: impl Future<Output = ()> + 'static) {
        self.tasks.push(FlowTask {
            future: Box::pin(future),
        });
    }

    /// Poll all active flows and drain any queued actions.
    pub(crate) fn poll(&mut self, queue: &mut Vec<Action>) {
        self.drain_actions(queue);

        let waker = noop_waker();
        let mut cx = Context::from_waker(&waker);

        let mut i = 0;
        while i < self.tasks.len() {
            let task = &mut self.tasks[i];
            if task.future.as_mut().poll(&mut cx).is_ready() {
                self.tasks.swap_remove(i);
            } else {
                i += 1;
            }
        }

        self.drain_actions(queue);
    }

    fn drain_actions(&mut self, queue: &mut Vec<Action>) {
        let mut state = self.state.borrow_mut();
        queue.extend(state.pending_actions.drain(..));
    }
}

/// Flow handle used by async flows to queue actions and call the service.
#[derive(Clone)]
pub(crate) struct FlowHandle {
    state: Rc<RefCell<FlowState>>,
}

impl FlowHandle {
    pub(crate) fn request_action(&self, action: Action) {
        self.state.borrow_mut().pending_actions.push(action);
    }

    /// Starts a service call.
    ///
    /// The dispatch action is queued immediately, so two calls created
    /// before the first await run concurrently.
    #[must_use]
    pub(crate) fn call(&self, request: ServiceRequest) -> ServiceCall {
        let (responder, receiver) = oneshot::channel();
        self.request_action(Action::Dispatch { request, responder });
        ServiceCall { receiver }
    }
}

struct FlowTask {
    future: Pin<Box<dyn Future<Output = ()>>>,
}

#[derive(Default)]
struct FlowState {
    pending_actions: Vec<Action>,
}

/// Awaitable for a single service round trip.
pub(crate) struct ServiceCall {
    receiver: oneshot::Receiver<Result<ServiceResponse, ServiceError>>,
}

impl Future for ServiceCall {
    type Output = Result<ServiceResponse, ServiceError>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        match Pin::new(&mut self.receiver).poll(cx) {
            Poll::Ready(Ok(result)) => Poll::Ready(result),
            Poll::Ready(Err(oneshot::Canceled)) => Poll::Ready(Err(ServiceError::Disconnected)),
            Poll::Pending => Poll::Pending,
        }
    }
}

const UNEXPECTED_RESPONSE: &str = "unexpected response from the puzzle service";

fn first_failure(results: &[&Result<ServiceResponse, ServiceError>]) -> String {
    results
        .iter()
        .find_map(|result| result.as_ref().err().map(ToString::to_string))
        .unwrap_or_else(|| UNEXPECTED_RESPONSE.to_owned())
}

/// Opens a session and fetches a puzzle for one level.
///
/// Both requests go out before the first await and complete in parallel.
pub(crate) async fn load_flow(handle: FlowHandle, generation: u64, kind: GameKind, level: u32) {
    let session = handle.call(ServiceRequest::StartSession {
        game_type: kind.as_str().to_owned(),
        level,
        difficulty: Difficulty::from_level(level).as_str().to_owned(),
    });
    let puzzle = handle.call(ServiceRequest::GetNewPuzzle {
        game_type: kind.as_str().to_owned(),
        level,
    });

    match (session.await, puzzle.await) {
        (Ok(ServiceResponse::SessionStarted(session)), Ok(ServiceResponse::Puzzle(puzzle))) => {
            handle.request_action(Action::SessionReady {
                generation,
                kind,
                session,
                puzzle,
            });
        }
        (session, puzzle) => {
            handle.request_action(Action::LoadFailed {
                generation,
                reason: first_failure(&[&session, &puzzle]),
            });
        }
    }
}

/// Looks up saved progress and loads the level it points at.
pub(crate) async fn resume_flow(handle: FlowHandle, generation: u64, kind: GameKind) {
    let progress = handle
        .call(ServiceRequest::GetUserProgress {
            game_type: kind.as_str().to_owned(),
        })
        .await;

    let level = match progress {
        Ok(ServiceResponse::UserProgress(dto)) => dto.current_level,
        Ok(_) => {
            handle.request_action(Action::LoadFailed {
                generation,
                reason: UNEXPECTED_RESPONSE.to_owned(),
            });
            return;
        }
        Err(err) => {
            handle.request_action(Action::LoadFailed {
                generation,
                reason: err.to_string(),
            });
            return;
        }
    };

    handle.request_action(Action::ProgressLoaded { generation, level });
    load_flow(handle, generation, kind, level).await;
}

/// Fetches the authoritative hint payload.
pub(crate) async fn hint_flow(
    handle: FlowHandle,
    generation: u64,
    session_id: String,
    puzzle_id: String,
) {
    match handle
        .call(ServiceRequest::GetHint {
            session_id,
            puzzle_id,
        })
        .await
    {
        Ok(ServiceResponse::Hint(hint)) => {
            handle.request_action(Action::HintReady { generation, hint });
        }
        Ok(_) => handle.request_action(Action::HintFailed {
            generation,
            reason: UNEXPECTED_RESPONSE.to_owned(),
        }),
        Err(err) => handle.request_action(Action::HintFailed {
            generation,
            reason: err.to_string(),
        }),
    }
}

/// Submits an answer for authoritative validation.
pub(crate) async fn validate_flow(
    handle: FlowHandle,
    generation: u64,
    session_id: String,
    puzzle_id: String,
    answer: AnswerDto,
) {
    match handle
        .call(ServiceRequest::ValidateSolution {
            session_id,
            puzzle_id,
            answer,
        })
        .await
    {
        Ok(ServiceResponse::Validation(verdict)) => handle.request_action(Action::Verdict {
            generation,
            is_correct: verdict.is_correct,
        }),
        Ok(_) => handle.request_action(Action::CheckFailed {
            generation,
            reason: UNEXPECTED_RESPONSE.to_owned(),
        }),
        Err(err) => handle.request_action(Action::CheckFailed {
            generation,
            reason: err.to_string(),
        }),
    }
}

/// Records a solve and closes the session after a confirmed solution.
///
/// Both requests go out before the first await and complete in parallel.
#[expect(clippy::too_many_arguments)]
pub(crate) async fn finish_flow(
    handle: FlowHandle,
    generation: u64,
    session_id: String,
    kind: GameKind,
    level: u32,
    time_taken: u32,
    moves: u32,
    hints_used: u8,
) {
    let report = handle.call(ServiceRequest::UpdateProgress {
        game_type: kind.as_str().to_owned(),
        level,
        time_taken,
        moves,
        hints_used,
    });
    let end = handle.call(ServiceRequest::EndSession {
        session_id,
        completed: true,
    });

    match (report.await, end.await) {
        (Ok(ServiceResponse::ProgressUpdated), Ok(ServiceResponse::SessionEnded)) => {
            handle.request_action(Action::ProgressSaved { generation });
        }
        (report, end) => handle.request_action(Action::ReportFailed {
            generation,
            reason: first_failure(&[&report, &end]),
        }),
    }
}

/// Closes a session that ended without a solve (expiry, restart, abandon).
///
/// Best effort: a failure is logged and otherwise ignored.
pub(crate) async fn end_flow(handle: FlowHandle, session_id: String) {
    match handle
        .call(ServiceRequest::EndSession {
            session_id,
            completed: false,
        })
        .await
    {
        Ok(ServiceResponse::SessionEnded) => {}
        Ok(_) => log::warn!("unexpected response while closing a session"),
        Err(err) => log::warn!("failed to close a session: {err}"),
    }
}

fn noop_waker() -> Waker {
    unsafe fn clone(_: *const ()) -> RawWaker {
        RawWaker::new(std::ptr::null(), &VTABLE)
    }

    unsafe fn wake(_: *const ()) {}

    unsafe fn wake_by_ref(_: *const ()) {}

    unsafe fn drop(_: *const ()) {}

    static VTABLE: RawWakerVTable = RawWakerVTable::new(clone, wake, wake_by_ref, drop);

    unsafe { Waker::from_raw(RawWaker::new(std::ptr::null(), &VTABLE)) }
}
