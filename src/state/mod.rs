//! State management module for rock-paper-scissors tournaments.
//!
//! This module provides the core state types and collaborators:
//!
//! - `moves` - Throws and the round resolver
//! - `round` - A single round and its per-seat submissions
//! - `player` - Player identities
//! - `session` - The game session state machine
//! - `store` - Lookup/persistence/identity interfaces, locked updates and an in-memory store
//! - `service` - Load → mutate → save orchestration
//! - `config` - Game configuration
//! - `error` - Error taxonomy
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────────┐
//! │                            GameService                               │
//! │                                                                      │
//! │   IdentityProvider ──▶ caller: Player                                │
//! │                                                                      │
//! │   SessionRepository::update ─▶ Session ──apply_mut(cmd)──▶ Session'  │
//! │                                   │                                  │
//! │                                   │                                  │
//! │                        ┌──────────┴──────────┐                       │
//! │                        │ player1 / player2   │                       │
//! │                        │ max_rounds (CAS)    │                       │
//! │                        │ rounds: [Round]     │                       │
//! │                        │   └─ Submission × 2 │                       │
//! │                        └─────────────────────┘                       │
//! └──────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Usage
//!
//! ```rust
//! use rps_tourney_state::state::{Player, PlayerId, Session, SessionStatus, Throw};
//!
//! let alice = Player::human(PlayerId(1), 10, "Alice")?;
//! let bob = Player::human(PlayerId(2), 20, "Bob")?;
//!
//! let mut session = Session::new(alice.clone());
//! session.join(bob.clone())?;
//! session.prepare_round()?;
//! session.submit_throw(0, &alice, Throw::Rock)?;
//! session.submit_throw(0, &bob, Throw::Scissors)?;
//!
//! assert_eq!(session.score().player1_wins, 1);
//! assert_eq!(session.status(), SessionStatus::AwaitingRoundPrep);
//! # Ok::<(), rps_tourney_state::state::GameError>(())
//! ```

pub mod config;
pub mod error;
pub mod moves;
pub mod player;
pub mod round;
pub mod service;
pub mod session;
pub mod store;

// Re-export commonly used types
pub use config::{GameConfig, DEFAULT_MAX_ROUNDS};
pub use error::{ConflictError, GameError, Result};
pub use moves::{result_of, Outcome, Throw};
pub use player::{Player, PlayerId, PlayerKind};
pub use round::{PlayerSlot, Round, Submission};
pub use service::GameService;
pub use session::{Score, Session, SessionCommand, SessionId, SessionParts, SessionStatus};
pub use store::{
    IdentityProvider, InMemorySessionStore, RoundKey, SessionLookup, SessionRepository,
    SessionSink,
};
