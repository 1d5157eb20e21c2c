//! A single round of play.
//!
//! Each slot's throw moves from unset to set exactly once. A second submission
//! for the same slot is a [`ConflictError`], never an overwrite, whatever the
//! value. Once both throws are in, the outcome is fixed.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::error::ConflictError;
use super::moves::{result_of, Outcome, Throw};

/// A seat within a session or round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PlayerSlot {
    #[serde(rename = "PLAYER_1")]
    Player1,
    #[serde(rename = "PLAYER_2")]
    Player2,
}

impl PlayerSlot {
    pub fn other(&self) -> Self {
        match self {
            Self::Player1 => Self::Player2,
            Self::Player2 => Self::Player1,
        }
    }

    /// The outcome in which this slot wins.
    pub fn winning_outcome(&self) -> Outcome {
        match self {
            Self::Player1 => Outcome::Player1Won,
            Self::Player2 => Outcome::Player2Won,
        }
    }
}

impl fmt::Display for PlayerSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Player1 => write!(f, "player 1"),
            Self::Player2 => write!(f, "player 2"),
        }
    }
}

/// One submitted throw and when it arrived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Submission {
    pub throw: Throw,
    pub at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Round {
    index: usize,
    player1: Option<Submission>,
    player2: Option<Submission>,
}

impl Round {
    /// Create an empty round.
    pub fn new(index: usize) -> Self {
        Self {
            index,
            player1: None,
            player2: None,
        }
    }

    /// Rebuild a round from stored submissions.
    pub fn from_parts(
        index: usize,
        player1: Option<Submission>,
        player2: Option<Submission>,
    ) -> Self {
        Self {
            index,
            player1,
            player2,
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn submission(&self, slot: PlayerSlot) -> Option<&Submission> {
        match slot {
            PlayerSlot::Player1 => self.player1.as_ref(),
            PlayerSlot::Player2 => self.player2.as_ref(),
        }
    }

    pub fn throw_for(&self, slot: PlayerSlot) -> Option<Throw> {
        self.submission(slot).map(|s| s.throw)
    }

    pub fn timestamp_for(&self, slot: PlayerSlot) -> Option<DateTime<Utc>> {
        self.submission(slot).map(|s| s.at)
    }

    pub fn has_throw(&self, slot: PlayerSlot) -> bool {
        self.submission(slot).is_some()
    }

    /// Whether any throw has been submitted.
    pub fn is_started(&self) -> bool {
        self.player1.is_some() || self.player2.is_some()
    }

    /// Whether both throws are in.
    pub fn is_complete(&self) -> bool {
        self.player1.is_some() && self.player2.is_some()
    }

    /// The round result, or `None` until both throws are in.
    pub fn outcome(&self) -> Option<Outcome> {
        match (&self.player1, &self.player2) {
            (Some(p1), Some(p2)) => Some(result_of(p1.throw, p2.throw)),
            _ => None,
        }
    }

    /// Record a throw for `slot`, stamped with the current time.
    pub fn submit_throw(&mut self, slot: PlayerSlot, throw: Throw) -> Result<(), ConflictError> {
        self.submit_throw_at(slot, throw, Utc::now())
    }

    /// Record a throw for `slot` with an explicit timestamp.
    pub fn submit_throw_at(
        &mut self,
        slot: PlayerSlot,
        throw: Throw,
        at: DateTime<Utc>,
    ) -> Result<(), ConflictError> {
        let target = match slot {
            PlayerSlot::Player1 => &mut self.player1,
            PlayerSlot::Player2 => &mut self.player2,
        };

        if let Some(existing) = target.as_ref() {
            return Err(ConflictError::ThrowAlreadySet {
                slot,
                existing: existing.throw,
                attempted: throw,
            });
        }

        *target = Some(Submission { throw, at });
        debug!(round_index = self.index, %slot, %throw, "throw recorded");
        Ok(())
    }

    pub fn to_json(&self) -> serde_json::Value {
        let stamp = |slot| self.timestamp_for(slot).map(|t| t.to_rfc3339());

        serde_json::json!({
            "round_index": self.index,
            "throw_for_player1": self.throw_for(PlayerSlot::Player1).map(|t| t.as_str()),
            "throw_for_player1_timestamp": stamp(PlayerSlot::Player1),
            "throw_for_player2": self.throw_for(PlayerSlot::Player2).map(|t| t.as_str()),
            "throw_for_player2_timestamp": stamp(PlayerSlot::Player2),
            "result": self.outcome().map(|o| o.as_str())
        })
    }
}
