//! Collaborator interfaces and an in-memory session store.
//!
//! The session core never loads or saves anything itself. Hosts supply a
//! [`SessionLookup`] and [`SessionSink`] (usually one type backing both) and
//! an [`IdentityProvider`] for the caller of each request.
//!
//! [`SessionRepository::update`] is how mutations reach a store.
//! [`InMemorySessionStore`] runs each update under its write lock, so
//! two players throwing into the same round at once both land. A plain
//! [`SessionSink::save`] still checks the revision counter: a save based on
//! an outdated read fails with [`ConflictError::StaleRevision`] instead of
//! overwriting a concurrent write.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::error::{ConflictError, GameError, Result};
use super::player::{Player, PlayerId};
use super::session::{Session, SessionId};

/// Read side of session persistence.
pub trait SessionLookup {
    /// Fetch a session, failing with [`GameError::NotFound`] if it doesn't exist.
    fn find_session(&self, id: &SessionId) -> Result<Session>;

    /// All sessions `player` is seated in, oldest first.
    fn list_sessions_for_player(&self, player: &Player) -> Vec<Session>;
}

/// Write side of session persistence.
pub trait SessionSink {
    fn save(&self, session: &Session) -> Result<()>;
}

/// Load → mutate → store for a single session.
///
/// The default runs optimistically: it loads, mutates, and saves only when the
/// revision moved, so a racing writer surfaces as the sink's conflict. Stores
/// that can lock per session should override it to serialize updates instead.
pub trait SessionRepository: SessionLookup + SessionSink {
    fn update<F>(&self, id: &SessionId, mutate: F) -> Result<Session>
    where
        F: FnOnce(&mut Session) -> Result<()>,
    {
        let mut session = self.find_session(id)?;
        let base = session.revision();
        mutate(&mut session)?;
        if session.revision() != base {
            self.save(&session)?;
        }
        Ok(session)
    }
}

impl<T: SessionRepository + ?Sized> SessionRepository for Arc<T> {
    fn update<F>(&self, id: &SessionId, mutate: F) -> Result<Session>
    where
        F: FnOnce(&mut Session) -> Result<()>,
    {
        (**self).update(id, mutate)
    }
}

/// Supplies the authenticated player behind the current request.
pub trait IdentityProvider {
    fn current_player(&self) -> Option<Player>;
}

impl IdentityProvider for Player {
    fn current_player(&self) -> Option<Player> {
        Some(self.clone())
    }
}

impl IdentityProvider for Option<Player> {
    fn current_player(&self) -> Option<Player> {
        self.clone()
    }
}

impl<T: SessionLookup + ?Sized> SessionLookup for Arc<T> {
    fn find_session(&self, id: &SessionId) -> Result<Session> {
        (**self).find_session(id)
    }

    fn list_sessions_for_player(&self, player: &Player) -> Vec<Session> {
        (**self).list_sessions_for_player(player)
    }
}

impl<T: SessionSink + ?Sized> SessionSink for Arc<T> {
    fn save(&self, session: &Session) -> Result<()> {
        (**self).save(session)
    }
}

/// Key for a round row in a persistence adapter.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RoundKey {
    pub session_id: SessionId,
    pub round_index: usize,
}

impl RoundKey {
    pub fn new(session_id: SessionId, round_index: usize) -> Self {
        Self {
            session_id,
            round_index,
        }
    }

    /// Keys for every round of `session`, in order.
    pub fn all_for(session: &Session) -> impl Iterator<Item = RoundKey> + '_ {
        session
            .rounds()
            .iter()
            .map(|r| RoundKey::new(session.id().clone(), r.index()))
    }
}

#[derive(Debug, Default)]
struct Inner {
    sessions: HashMap<SessionId, Session>,
    /// Player ID to the sessions they're seated in
    player_index: HashMap<PlayerId, BTreeSet<SessionId>>,
}

impl Inner {
    /// Insert or replace a session and index its players.
    fn put(&mut self, session: Session) {
        let seated = [Some(session.player1()), session.player2()];
        for player in seated.into_iter().flatten() {
            self.player_index
                .entry(player.id())
                .or_default()
                .insert(session.id().clone());
        }
        self.sessions.insert(session.id().clone(), session);
    }
}

/// Thread-safe in-memory store.
#[derive(Debug, Default)]
pub struct InMemorySessionStore {
    inner: RwLock<Inner>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remove a session.
    pub fn remove(&self, id: &SessionId) -> Option<Session> {
        let mut inner = self.inner.write();
        let session = inner.sessions.remove(id)?;

        let seated = [Some(session.player1()), session.player2()];
        for player in seated.into_iter().flatten() {
            if let Some(ids) = inner.player_index.get_mut(&player.id()) {
                ids.remove(id);
                if ids.is_empty() {
                    inner.player_index.remove(&player.id());
                }
            }
        }

        Some(session)
    }

    pub fn contains(&self, id: &SessionId) -> bool {
        self.inner.read().sessions.contains_key(id)
    }

    /// Total session count.
    pub fn count(&self) -> usize {
        self.inner.read().sessions.len()
    }
}

impl SessionLookup for InMemorySessionStore {
    fn find_session(&self, id: &SessionId) -> Result<Session> {
        self.inner
            .read()
            .sessions
            .get(id)
            .cloned()
            .ok_or_else(|| GameError::NotFound(id.clone()))
    }

    fn list_sessions_for_player(&self, player: &Player) -> Vec<Session> {
        let inner = self.inner.read();
        let mut sessions: Vec<Session> = inner
            .player_index
            .get(&player.id())
            .into_iter()
            .flatten()
            .filter_map(|id| inner.sessions.get(id))
            .cloned()
            .collect();
        sessions.sort_by(|a, b| {
            a.created_at()
                .cmp(&b.created_at())
                .then_with(|| a.id().cmp(b.id()))
        });
        sessions
    }
}

impl SessionSink for InMemorySessionStore {
    fn save(&self, session: &Session) -> Result<()> {
        let mut inner = self.inner.write();

        if let Some(stored) = inner.sessions.get(session.id()) {
            if stored.revision() + 1 != session.revision() {
                let base = session.revision().saturating_sub(1);
                warn!(
                    session_id = %session.id(),
                    expected = base,
                    actual = stored.revision(),
                    "rejected stale session write"
                );
                return Err(ConflictError::StaleRevision {
                    expected: base,
                    actual: stored.revision(),
                }
                .into());
            }
        }

        inner.put(session.clone());
        debug!(session_id = %session.id(), revision = session.revision(), "session saved");
        Ok(())
    }
}

impl SessionRepository for InMemorySessionStore {
    /// Holds the write lock from load to store, so concurrent updates to one
    /// session run one after another against the latest state.
    fn update<F>(&self, id: &SessionId, mutate: F) -> Result<Session>
    where
        F: FnOnce(&mut Session) -> Result<()>,
    {
        let mut inner = self.inner.write();
        let mut session = inner
            .sessions
            .get(id)
            .cloned()
            .ok_or_else(|| GameError::NotFound(id.clone()))?;
        let base = session.revision();

        mutate(&mut session)?;

        if session.revision() != base {
            inner.put(session.clone());
            debug!(session_id = %id, revision = session.revision(), "session updated");
        }
        Ok(session)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::moves::Throw;
    use pretty_assertions::assert_eq;

    fn alice() -> Player {
        Player::human(PlayerId(1), 100, "Alice").unwrap()
    }

    fn bob() -> Player {
        Player::human(PlayerId(2), 200, "Bob").unwrap()
    }

    #[test]
    fn test_save_and_find() {
        let store = InMemorySessionStore::new();
        let session = Session::new(alice());
        store.save(&session).unwrap();

        assert_eq!(store.find_session(session.id()).unwrap(), session);
        assert_eq!(store.count(), 1);
    }

    #[test]
    fn test_find_missing() {
        let store = InMemorySessionStore::new();
        let result = store.find_session(&SessionId::from("nope"));
        assert_eq!(result, Err(GameError::NotFound(SessionId::from("nope"))));
    }

    #[test]
    fn test_player_index() {
        let store = InMemorySessionStore::new();

        let mut first = Session::new(alice());
        store.save(&first).unwrap();
        let second = Session::new(bob());
        store.save(&second).unwrap();

        assert_eq!(store.list_sessions_for_player(&bob()).len(), 1);

        // Joining adds bob to the index
        first.join(bob()).unwrap();
        store.save(&first).unwrap();

        let bobs: Vec<SessionId> = store
            .list_sessions_for_player(&bob())
            .iter()
            .map(|s| s.id().clone())
            .collect();
        assert_eq!(bobs.len(), 2);
        assert!(bobs.contains(first.id()));
        assert_eq!(store.list_sessions_for_player(&alice()).len(), 1);
    }

    #[test]
    fn test_stale_write_rejected() {
        let store = InMemorySessionStore::new();
        let session = Session::new(alice());
        store.save(&session).unwrap();

        // Two writers from the same read
        let mut a = store.find_session(session.id()).unwrap();
        let mut b = store.find_session(session.id()).unwrap();
        a.set_max_rounds(3, 5).unwrap();
        b.join(bob()).unwrap();

        store.save(&a).unwrap();
        let result = store.save(&b);
        assert_eq!(
            result,
            Err(GameError::Conflict(ConflictError::StaleRevision {
                expected: 0,
                actual: 1,
            }))
        );

        let stored = store.find_session(session.id()).unwrap();
        assert_eq!(stored.max_rounds(), 5);
        assert!(stored.player2().is_none());
    }

    #[test]
    fn test_same_limit_from_same_read_only_one_saves() {
        let store = InMemorySessionStore::new();
        let session = Session::new(alice());
        store.save(&session).unwrap();

        // Identical CAS from one stale read yields identical snapshots
        let mut a = store.find_session(session.id()).unwrap();
        let mut b = store.find_session(session.id()).unwrap();
        a.set_max_rounds(3, 5).unwrap();
        b.set_max_rounds(3, 5).unwrap();
        assert_eq!(a, b);

        store.save(&a).unwrap();
        let result = store.save(&b);
        assert_eq!(
            result,
            Err(GameError::Conflict(ConflictError::StaleRevision {
                expected: 0,
                actual: 1,
            }))
        );
    }

    #[test]
    fn test_save_requires_next_revision() {
        let store = InMemorySessionStore::new();
        let mut session = Session::new(alice());
        session.join(bob()).unwrap();
        store.save(&session).unwrap();

        // Same revision again
        assert!(store.save(&session).is_err());

        session.prepare_round().unwrap();
        session.submit_throw(0, &alice(), Throw::Rock).unwrap();
        // Skipped a revision
        assert!(store.save(&session).is_err());
    }

    #[test]
    fn test_update_serializes_writers() {
        let store = InMemorySessionStore::new();
        let mut session = Session::new(alice());
        session.join(bob()).unwrap();
        session.prepare_round().unwrap();
        store.save(&session).unwrap();

        // Both throws arrive against the same prior state
        store
            .update(session.id(), |s| s.submit_throw(0, &alice(), Throw::Rock))
            .unwrap();
        let updated = store
            .update(session.id(), |s| s.submit_throw(0, &bob(), Throw::Scissors))
            .unwrap();

        assert_eq!(updated.revision(), session.revision() + 2);
        assert_eq!(store.find_session(session.id()).unwrap(), updated);
        assert!(updated.round(0).unwrap().is_complete());
    }

    #[test]
    fn test_update_failure_and_noop_store_nothing() {
        let store = InMemorySessionStore::new();
        let session = Session::new(alice());
        store.save(&session).unwrap();

        let result = store.update(session.id(), |s| s.join(alice()));
        assert!(matches!(result, Err(GameError::InvalidArgument(_))));

        let unchanged = store.update(session.id(), |s| s.prepare_round()).unwrap();
        assert_eq!(unchanged, session);
        assert_eq!(store.find_session(session.id()).unwrap(), session);

        let missing = store.update(&SessionId::from("nope"), |s| s.prepare_round());
        assert_eq!(missing, Err(GameError::NotFound(SessionId::from("nope"))));
    }

    #[test]
    fn test_remove_cleans_index() {
        let store = InMemorySessionStore::new();
        let session = Session::new(alice());
        store.save(&session).unwrap();

        assert!(store.remove(session.id()).is_some());
        assert!(!store.contains(session.id()));
        assert!(store.list_sessions_for_player(&alice()).is_empty());
        assert!(store.remove(session.id()).is_none());
    }

    #[test]
    fn test_round_keys() {
        let mut session = Session::with_id("s-9".into(), alice(), 3).unwrap();
        session.join(bob()).unwrap();
        session.prepare_round().unwrap();

        let keys: Vec<RoundKey> = RoundKey::all_for(&session).collect();
        assert_eq!(keys, vec![RoundKey::new("s-9".into(), 0)]);
    }

    #[test]
    fn test_identity_providers() {
        assert_eq!(alice().current_player(), Some(alice()));
        let anonymous: Option<Player> = None;
        assert_eq!(anonymous.current_player(), None);
    }
}
