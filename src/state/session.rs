//! Game session state machine.
//!
//! A session seats two players, holds an append-only list of rounds and a
//! round limit. Its status is never stored; it is derived from the seats and
//! the round history on every read.
//!
//! # State Diagram
//!
//! ```text
//! ┌─────────────────┐  join   ┌───────────────────┐ prepare_round ┌─────────────────┐
//! │ AwaitingPlayer2 │────────▶│ AwaitingRoundPrep │──────────────▶│ RoundInProgress │
//! └─────────────────┘         └───────────────────┘               └────────┬────────┘
//!                                       ▲                                  │
//!                                       │ second throw, no majority yet    │
//!                                       └──────────────────────────────────┤
//!                                                                          │ second throw,
//!                                                                          │ majority reached
//!                                                                          ▼
//!                                                                   ┌──────────┐
//!                                                                   │ Complete │
//!                                                                   └──────────┘
//! ```
//!
//! Every operation either succeeds completely or leaves the session
//! untouched. [`Session::apply`] returns a new snapshot; [`Session::apply_mut`]
//! updates in place.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::config::{GameConfig, DEFAULT_MAX_ROUNDS};
use super::error::{ConflictError, GameError, Result};
use super::moves::{Outcome, Throw};
use super::player::Player;
use super::round::{PlayerSlot, Round};

/// Unique session identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    /// Generate a fresh random id.
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().simple().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for SessionId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for SessionId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Derived session status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SessionStatus {
    /// Second seat is open
    AwaitingPlayer2,
    /// Both seated; no round yet, or the latest round is resolved
    AwaitingRoundPrep,
    /// Latest round is waiting on at least one throw
    RoundInProgress,
    /// One player holds a strict majority of the round limit
    Complete,
}

impl SessionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AwaitingPlayer2 => "awaiting_player2",
            Self::AwaitingRoundPrep => "awaiting_round_prep",
            Self::RoundInProgress => "round_in_progress",
            Self::Complete => "complete",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Complete)
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Cumulative round results. Ties are counted but never decide a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Score {
    pub player1_wins: u32,
    pub player2_wins: u32,
    pub ties: u32,
}

impl Score {
    pub fn wins_for(&self, slot: PlayerSlot) -> u32 {
        match slot {
            PlayerSlot::Player1 => self.player1_wins,
            PlayerSlot::Player2 => self.player2_wins,
        }
    }

    fn record(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::Player1Won => self.player1_wins += 1,
            Outcome::Player2Won => self.player2_wins += 1,
            Outcome::Tied => self.ties += 1,
        }
    }
}

/// Mutations a caller can request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionCommand {
    Join {
        player: Player,
    },
    SetMaxRounds {
        expected: u32,
        new: u32,
    },
    PrepareRound,
    SubmitThrow {
        round_index: usize,
        player: Player,
        throw: Throw,
    },
}

impl SessionCommand {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Join { .. } => "join",
            Self::SetMaxRounds { .. } => "set_max_rounds",
            Self::PrepareRound => "prepare_round",
            Self::SubmitThrow { .. } => "submit_throw",
        }
    }
}

/// Flat persisted form of a session. Converting back goes through
/// [`Session::restore`], which re-checks every invariant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionParts {
    pub id: SessionId,
    pub player1: Player,
    pub player2: Option<Player>,
    pub max_rounds: u32,
    pub rounds: Vec<Round>,
    pub revision: u64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "SessionParts", into = "SessionParts")]
pub struct Session {
    id: SessionId,
    player1: Player,
    player2: Option<Player>,
    max_rounds: u32,
    rounds: Vec<Round>,
    /// Bumped by every mutation that changes state
    revision: u64,
    created_at: DateTime<Utc>,
}

impl Session {
    /// Create a session hosted by `player1` with the default round limit.
    pub fn new(player1: Player) -> Self {
        Self::build(SessionId::generate(), player1, DEFAULT_MAX_ROUNDS)
    }

    /// Create a session using the configured default round limit.
    pub fn with_config(player1: Player, config: &GameConfig) -> Result<Self> {
        Self::with_id(SessionId::generate(), player1, config.default_max_rounds)
    }

    /// Create a session with a caller-chosen id.
    pub fn with_id(id: SessionId, player1: Player, max_rounds: u32) -> Result<Self> {
        if max_rounds == 0 {
            return Err(GameError::invalid("max rounds must be positive"));
        }
        Ok(Self::build(id, player1, max_rounds))
    }

    fn build(id: SessionId, player1: Player, max_rounds: u32) -> Self {
        debug!(session_id = %id, player1 = %player1.id(), max_rounds, "session created");
        Self {
            id,
            player1,
            player2: None,
            max_rounds,
            rounds: Vec::new(),
            revision: 0,
            created_at: Utc::now(),
        }
    }

    /// Rebuild a session from persisted parts, checking every invariant.
    pub fn restore(parts: SessionParts) -> Result<Self> {
        if parts.max_rounds == 0 {
            return Err(GameError::logic(format!(
                "session {} has non-positive max rounds",
                parts.id
            )));
        }

        if parts.player2.as_ref() == Some(&parts.player1) {
            return Err(GameError::logic(format!(
                "session {} seats player {} twice",
                parts.id,
                parts.player1.id()
            )));
        }

        if parts.player2.is_none() && !parts.rounds.is_empty() {
            return Err(GameError::logic(format!(
                "session {} has rounds but no second player",
                parts.id
            )));
        }

        for (i, round) in parts.rounds.iter().enumerate() {
            if round.index() != i {
                return Err(GameError::logic(format!(
                    "session {} has round index {} at position {}",
                    parts.id,
                    round.index(),
                    i
                )));
            }
        }

        // Only the latest round may be unresolved
        let earlier = parts.rounds.len().saturating_sub(1);
        if let Some(open) = parts.rounds[..earlier].iter().find(|r| !r.is_complete()) {
            return Err(GameError::logic(format!(
                "session {} has unresolved round {} before the latest",
                parts.id,
                open.index()
            )));
        }

        Ok(Self {
            id: parts.id,
            player1: parts.player1,
            player2: parts.player2,
            max_rounds: parts.max_rounds,
            rounds: parts.rounds,
            revision: parts.revision,
            created_at: parts.created_at,
        })
    }

    pub fn into_parts(self) -> SessionParts {
        SessionParts {
            id: self.id,
            player1: self.player1,
            player2: self.player2,
            max_rounds: self.max_rounds,
            rounds: self.rounds,
            revision: self.revision,
            created_at: self.created_at,
        }
    }

    pub fn id(&self) -> &SessionId {
        &self.id
    }

    pub fn player1(&self) -> &Player {
        &self.player1
    }

    pub fn player2(&self) -> Option<&Player> {
        self.player2.as_ref()
    }

    pub fn player(&self, slot: PlayerSlot) -> Option<&Player> {
        match slot {
            PlayerSlot::Player1 => Some(&self.player1),
            PlayerSlot::Player2 => self.player2.as_ref(),
        }
    }

    /// Which seat `player` occupies, if any.
    pub fn slot_of(&self, player: &Player) -> Option<PlayerSlot> {
        if *player == self.player1 {
            Some(PlayerSlot::Player1)
        } else if self.player2.as_ref() == Some(player) {
            Some(PlayerSlot::Player2)
        } else {
            None
        }
    }

    pub fn has_player(&self, player: &Player) -> bool {
        self.slot_of(player).is_some()
    }

    pub fn max_rounds(&self) -> u32 {
        self.max_rounds
    }

    pub fn rounds(&self) -> &[Round] {
        &self.rounds
    }

    pub fn round(&self, index: usize) -> Option<&Round> {
        self.rounds.get(index)
    }

    /// The latest round, resolved or not.
    pub fn current_round(&self) -> Option<&Round> {
        self.rounds.last()
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Whether an unresolved round is waiting for throws.
    pub fn is_round_prepared(&self) -> bool {
        self.current_round().is_some_and(|r| !r.is_complete())
    }

    pub fn score(&self) -> Score {
        let mut score = Score::default();
        for outcome in self.rounds.iter().filter_map(Round::outcome) {
            score.record(outcome);
        }
        score
    }

    /// Non-tied wins needed to take the session.
    pub fn wins_needed(&self) -> u32 {
        self.max_rounds / 2 + 1
    }

    /// The player holding a strict majority of the round limit, if any.
    pub fn winner(&self) -> Option<PlayerSlot> {
        let score = self.score();
        let needed = self.wins_needed();
        let (p1, p2) = (score.player1_wins, score.player2_wins);

        // After a round-limit cut both could clear the bar; the leader takes it
        if p1 >= needed && p1 > p2 {
            Some(PlayerSlot::Player1)
        } else if p2 >= needed && p2 > p1 {
            Some(PlayerSlot::Player2)
        } else {
            None
        }
    }

    pub fn is_complete(&self) -> bool {
        self.winner().is_some()
    }

    pub fn status(&self) -> SessionStatus {
        use SessionStatus::*;

        if self.is_complete() {
            return Complete;
        }

        match (&self.player2, self.rounds.last()) {
            (None, _) => AwaitingPlayer2,
            (Some(_), None) => AwaitingRoundPrep,
            (Some(_), Some(round)) if round.is_complete() => AwaitingRoundPrep,
            (Some(_), Some(_)) => RoundInProgress,
        }
    }

    /// Apply a command, returning the new snapshot. `self` is left unchanged.
    pub fn apply(&self, command: SessionCommand) -> Result<Self> {
        let mut next = self.clone();
        next.apply_mut(command)?;
        Ok(next)
    }

    /// Apply a command in place. On error nothing is modified.
    pub fn apply_mut(&mut self, command: SessionCommand) -> Result<()> {
        let name = command.name();
        let changed = self.execute(command)?;

        if changed {
            self.revision += 1;
        }

        debug!(
            session_id = %self.id,
            command = name,
            changed,
            revision = self.revision,
            status = %self.status(),
            "command applied"
        );
        Ok(())
    }

    /// Seat `player` as player 2.
    pub fn join(&mut self, player: Player) -> Result<()> {
        self.apply_mut(SessionCommand::Join { player })
    }

    /// Compare-and-set the round limit.
    pub fn set_max_rounds(&mut self, expected: u32, new: u32) -> Result<()> {
        self.apply_mut(SessionCommand::SetMaxRounds { expected, new })
    }

    /// Open the next round if one is due. Safe to call speculatively.
    pub fn prepare_round(&mut self) -> Result<()> {
        self.apply_mut(SessionCommand::PrepareRound)
    }

    /// Record `player`'s throw for the latest round.
    pub fn submit_throw(
        &mut self,
        round_index: usize,
        player: &Player,
        throw: Throw,
    ) -> Result<()> {
        self.apply_mut(SessionCommand::SubmitThrow {
            round_index,
            player: player.clone(),
            throw,
        })
    }

    /// Validate and perform a command. Returns whether anything changed.
    fn execute(&mut self, command: SessionCommand) -> Result<bool> {
        match command {
            SessionCommand::Join { player } => self.execute_join(player),
            SessionCommand::SetMaxRounds { expected, new } => {
                self.execute_set_max_rounds(expected, new)
            }
            SessionCommand::PrepareRound => Ok(self.execute_prepare_round()),
            SessionCommand::SubmitThrow {
                round_index,
                player,
                throw,
            } => self.execute_submit_throw(round_index, &player, throw),
        }
    }

    fn execute_join(&mut self, player: Player) -> Result<bool> {
        if player == self.player1 {
            return Err(GameError::invalid(format!(
                "player {} can't join their own game",
                player.id()
            )));
        }

        if let Some(seated) = &self.player2 {
            if *seated == player {
                return Ok(false);
            }
            return Err(ConflictError::SeatTaken {
                seated: seated.id(),
                candidate: player.id(),
            }
            .into());
        }

        self.player2 = Some(player);
        Ok(true)
    }

    fn execute_set_max_rounds(&mut self, expected: u32, new: u32) -> Result<bool> {
        if new == 0 {
            return Err(GameError::invalid("max rounds must be positive"));
        }

        if self.max_rounds != expected {
            return Err(ConflictError::MaxRoundsChanged {
                expected,
                actual: self.max_rounds,
            }
            .into());
        }

        let changed = self.max_rounds != new;
        self.max_rounds = new;
        Ok(changed)
    }

    fn execute_prepare_round(&mut self) -> bool {
        match self.status() {
            SessionStatus::AwaitingRoundPrep => {
                self.rounds.push(Round::new(self.rounds.len()));
                true
            }
            SessionStatus::AwaitingPlayer2
            | SessionStatus::RoundInProgress
            | SessionStatus::Complete => false,
        }
    }

    fn execute_submit_throw(
        &mut self,
        round_index: usize,
        player: &Player,
        throw: Throw,
    ) -> Result<bool> {
        let slot = self.slot_of(player).ok_or_else(|| {
            GameError::invalid(format!(
                "player {} is not seated in session {}",
                player.id(),
                self.id
            ))
        })?;

        let decided = self.is_complete();
        let round = self.rounds.last_mut().ok_or_else(|| {
            GameError::invalid(format!("no round has been prepared in session {}", self.id))
        })?;

        if round.index() != round_index {
            return Err(GameError::invalid(format!(
                "round {} is not the current round ({})",
                round_index,
                round.index()
            )));
        }

        // A repeat into an occupied slot stays a conflict
        if decided && round.throw_for(slot).is_none() {
            return Err(GameError::invalid(format!(
                "session {} is already decided",
                self.id
            )));
        }

        round.submit_throw(slot, throw)?;
        Ok(true)
    }

    /// Convert full session state to a JSON snapshot.
    pub fn to_json(&self) -> serde_json::Value {
        let score = self.score();
        let rounds: Vec<serde_json::Value> = self.rounds.iter().map(Round::to_json).collect();

        serde_json::json!({
            "id": self.id.as_str(),
            "status": self.status().as_str(),
            "player1": self.player1.to_json(),
            "player2": self.player2.as_ref().map(Player::to_json),
            "max_rounds": self.max_rounds,
            "rounds": rounds,
            "score": {
                "player1_wins": score.player1_wins,
                "player2_wins": score.player2_wins,
                "ties": score.ties
            },
            "winner": self.winner().and_then(|slot| self.player(slot)).map(|p| p.id().0),
            "revision": self.revision,
            "created_at": self.created_at.to_rfc3339()
        })
    }
}

impl TryFrom<SessionParts> for Session {
    type Error = GameError;

    fn try_from(parts: SessionParts) -> Result<Self> {
        Session::restore(parts)
    }
}

impl From<Session> for SessionParts {
    fn from(session: Session) -> Self {
        session.into_parts()
    }
}
