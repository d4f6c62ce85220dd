//! Errors raised while processing game commands.
//!
//! None of these reach the client: the dispatch layer logs and drops them.

use crate::types::GamePhase;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum GameError {
    #[error("{command} is not allowed during {phase:?}")]
    InvalidCommandForPhase {
        command: &'static str,
        phase: GamePhase,
    },
    #[error("admin command from unauthorized connection")]
    UnauthorizedAdminCommand,
    #[error("unknown session {0}")]
    UnknownSession(String),
    #[error("invalid choice {0:?}")]
    InvalidChoice(String),
    #[error("session already voted this round")]
    DuplicateVote,
    #[error("vote arrived within the debounce window")]
    VoteDebounced,
    #[error("no round data for index {0}")]
    RoundDataMissing(usize),
    #[error("answer label {0:?} does not resolve to a choice")]
    UnresolvableAnswer(String),
}
