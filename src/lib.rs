//! RPS Tourney State Library
//!
//! This crate provides the game session core for rock-paper-scissors tournaments.
//!
//! # Overview
//!
//! - **Moves and Rounds** - Throws, the exhaustive outcome table, and rounds whose
//!   per-seat throws can be set exactly once.
//!
//! - **Session State Machine** - Seats, round preparation, throw submission, and
//!   majority termination, with status derived from history rather than stored.
//!
//! - **Optimistic Concurrency** - Compare-and-set on the round limit, plus a
//!   revision counter that persistence adapters use to reject stale writes.
//!
//! - **Collaborators** - Lookup, persistence and identity traits, an in-memory
//!   store, and a service running the load → mutate → save loop.
//!
//! # Design Principles
//!
//! 1. **Pure core** - Session operations do no I/O. They return a new snapshot or
//!    a typed error and never partially apply.
//!
//! 2. **No transport** - No HTTP, auth or database code lives here. Adapters
//!    translate [`GameError`] into their own wire formats.
//!
//! 3. **Serialization-ready** - Sessions convert to JSON snapshots for clients and
//!    to [`SessionParts`] for storage.
//!
//! # Example
//!
//! ```rust
//! use rps_tourney_state::{GameConfig, GameService, InMemorySessionStore, Player, PlayerId, Throw};
//!
//! let service = GameService::new(InMemorySessionStore::new(), GameConfig::default())?;
//! let alice = Player::human(PlayerId(1), 10, "Alice")?;
//! let bob = Player::ai(PlayerId(2), "random-bot")?;
//!
//! let game = service.create_game(&alice)?;
//! service.join_game(game.id(), &bob)?;
//! service.prepare_round(game.id())?;
//! service.submit_throw(game.id(), &alice, 0, Throw::Paper)?;
//! let game = service.submit_throw(game.id(), &bob, 0, Throw::Rock)?;
//!
//! assert_eq!(game.score().player1_wins, 1);
//! # Ok::<(), rps_tourney_state::GameError>(())
//! ```

pub mod state;

// Re-export everything from state module at crate root
pub use state::*;
