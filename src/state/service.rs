//! Gameplay service: the load → mutate → save loop around the session core.
//!
//! Each mutating call resolves the caller and hands one command to the
//! store's [`SessionRepository::update`], which loads, applies and stores it
//! as a unit. Nothing is retried here; a conflict goes straight back to the
//! caller, who re-reads and decides.

use tracing::{info, warn};

use super::config::GameConfig;
use super::error::{GameError, Result};
use super::moves::Throw;
use super::player::Player;
use super::session::{Session, SessionCommand, SessionId};
use super::store::{IdentityProvider, SessionRepository};

#[derive(Debug)]
pub struct GameService<S> {
    store: S,
    config: GameConfig,
}

impl<S> GameService<S>
where
    S: SessionRepository,
{
    pub fn new(store: S, config: GameConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { store, config })
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Start a new session hosted by the caller.
    pub fn create_game(&self, caller: &impl IdentityProvider) -> Result<Session> {
        let player = require_player(caller)?;
        let session = Session::with_config(player, &self.config)?;
        self.store.save(&session)?;

        info!(
            session_id = %session.id(),
            player1 = %session.player1().id(),
            max_rounds = session.max_rounds(),
            "game created"
        );
        Ok(session)
    }

    /// Sessions the caller is seated in. Anonymous callers get none.
    pub fn games_for_player(&self, caller: &impl IdentityProvider) -> Vec<Session> {
        match caller.current_player() {
            Some(player) => self.store.list_sessions_for_player(&player),
            None => Vec::new(),
        }
    }

    pub fn get_game(&self, id: &SessionId) -> Result<Session> {
        self.store.find_session(id)
    }

    /// Change the round limit. Only a seated player may do this.
    pub fn set_max_rounds(
        &self,
        id: &SessionId,
        caller: &impl IdentityProvider,
        expected: u32,
        new: u32,
    ) -> Result<Session> {
        let player = require_player(caller)?;
        self.commit(
            id,
            SessionCommand::SetMaxRounds { expected, new },
            Some(&player),
        )
    }

    /// Take the second seat.
    pub fn join_game(&self, id: &SessionId, caller: &impl IdentityProvider) -> Result<Session> {
        let player = require_player(caller)?;
        self.commit(id, SessionCommand::Join { player }, None)
    }

    /// Open the next round if one is due. Anyone may call this.
    pub fn prepare_round(&self, id: &SessionId) -> Result<Session> {
        self.commit(id, SessionCommand::PrepareRound, None)
    }

    pub fn submit_throw(
        &self,
        id: &SessionId,
        caller: &impl IdentityProvider,
        round_index: usize,
        throw: Throw,
    ) -> Result<Session> {
        let player = require_player(caller)?;
        self.commit(
            id,
            SessionCommand::SubmitThrow {
                round_index,
                player,
                throw,
            },
            None,
        )
    }

    /// Apply one command through the store. `seated`, when given, must hold a
    /// seat in the session as loaded.
    fn commit(
        &self,
        id: &SessionId,
        command: SessionCommand,
        seated: Option<&Player>,
    ) -> Result<Session> {
        let name = command.name();
        let mut base = None;

        let result = self.store.update(id, |session| {
            base = Some(session.revision());
            if let Some(player) = seated {
                require_seat(session, player)?;
            }
            session.apply_mut(command)
        });

        let updated = match result {
            Ok(updated) => updated,
            Err(err) => {
                warn!(session_id = %id, command = name, error = %err, "command rejected");
                return Err(err);
            }
        };

        if base != Some(updated.revision()) {
            info!(
                session_id = %updated.id(),
                command = name,
                revision = updated.revision(),
                status = %updated.status(),
                "game updated"
            );
        }
        Ok(updated)
    }
}

fn require_seat(session: &Session, player: &Player) -> Result<()> {
    if session.has_player(player) {
        return Ok(());
    }
    Err(GameError::invalid(format!(
        "player {} is not seated in session {}",
        player.id(),
        session.id()
    )))
}

fn require_player(caller: &impl IdentityProvider) -> Result<Player> {
    caller
        .current_player()
        .ok_or_else(|| GameError::invalid("no authenticated player for this request"))
}
