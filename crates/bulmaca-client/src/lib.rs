//! Client for the Bulmaca puzzle service.
//!
//! Wraps the engine's sessions with everything a frontend needs to play
//! against the external service: loading and resuming levels, dispatching
//! hints and validation without blocking, closing sessions, and reporting
//! progress. The host drives [`GameClient::update`] from its frame or
//! event loop and renders the drained notices.
#![allow(missing_docs, clippy::missing_errors_doc, clippy::missing_panics_doc)]

pub mod action;
pub mod client;
pub mod local;
pub mod service;

mod flow;

pub use self::{
    action::Notice,
    client::{ActiveGame, ClientError, GameClient},
    local::LocalService,
    service::{
        AnswerDto, HintDto, PuzzleDto, ServiceError, ServiceHandle, ServiceRequest,
        ServiceResponse, ServiceTransport, SessionDto, UserProgressDto, ValidationDto,
    },
};
