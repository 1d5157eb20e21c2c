//! Error taxonomy for session operations.
//!
//! Every failure is returned to the immediate caller; nothing in this crate
//! retries or swallows an error. Adapters map these kinds onto their own wire
//! representation.

use thiserror::Error;

use super::moves::Throw;
use super::player::PlayerId;
use super::round::PlayerSlot;
use super::session::SessionId;

pub type Result<T, E = GameError> = std::result::Result<T, E>;

/// A state-dependent precondition failed because of a race or a stale read.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConflictError {
    #[error("throw for {slot} already set to '{existing}'; can't set to '{attempted}'")]
    ThrowAlreadySet {
        slot: PlayerSlot,
        existing: Throw,
        attempted: Throw,
    },

    #[error("max rounds is {actual}, not the expected {expected}")]
    MaxRoundsChanged { expected: u32, actual: u32 },

    #[error("seat already taken by player {seated}; player {candidate} can't join")]
    SeatTaken {
        seated: PlayerId,
        candidate: PlayerId,
    },

    #[error("session was modified concurrently (expected revision {expected}, found {actual})")]
    StaleRevision { expected: u64, actual: u64 },
}

/// Errors surfaced by the session core and its collaborators.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GameError {
    /// Malformed or out-of-range input. Always caller-fixable.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("conflict: {0}")]
    Conflict(#[from] ConflictError),

    #[error("game session not found: {0}")]
    NotFound(SessionId),

    #[error("storage failure: {0}")]
    Storage(String),

    /// An internal invariant does not hold. Indicates a bug or corrupt data.
    #[error("internal consistency failure: {0}")]
    Logic(String),
}

impl GameError {
    pub fn invalid(detail: impl Into<String>) -> Self {
        Self::InvalidArgument(detail.into())
    }

    pub fn logic(detail: impl Into<String>) -> Self {
        Self::Logic(detail.into())
    }

    /// Whether re-reading the session and retrying may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Conflict(_))
    }

    pub fn as_conflict(&self) -> Option<&ConflictError> {
        match self {
            Self::Conflict(c) => Some(c),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conflict_message_names_both_throws() {
        let err: GameError = ConflictError::ThrowAlreadySet {
            slot: PlayerSlot::Player1,
            existing: Throw::Rock,
            attempted: Throw::Paper,
        }
        .into();

        assert_eq!(
            err.to_string(),
            "conflict: throw for player 1 already set to 'ROCK'; can't set to 'PAPER'"
        );
        assert!(err.is_retryable());
    }

    #[test]
    fn test_only_conflicts_are_retryable() {
        assert!(!GameError::invalid("bad").is_retryable());
        assert!(!GameError::logic("bug").is_retryable());
        assert!(!GameError::NotFound(SessionId::from("abc")).is_retryable());
        assert!(GameError::from(ConflictError::MaxRoundsChanged {
            expected: 3,
            actual: 5
        })
        .is_retryable());
    }
}
