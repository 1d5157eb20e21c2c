//! Player identities.
//!
//! A [`Player`] is a thin reference to either a human account or an AI
//! opponent. Two players are the same player iff their ids match; the rest of
//! the record is descriptive only.

use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

use super::error::{GameError, Result};

/// Stable player identifier, assigned by whoever owns the player records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(pub u64);

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// What kind of participant a player is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PlayerKind {
    Human { account_id: i64, name: String },
    Ai { designator: String },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    id: PlayerId,
    kind: PlayerKind,
}

impl Player {
    /// Create a player backed by a human account.
    pub fn human(id: PlayerId, account_id: i64, name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(GameError::invalid("player name must not be blank"));
        }
        Ok(Self {
            id,
            kind: PlayerKind::Human { account_id, name },
        })
    }

    /// Create a player controlled by an AI.
    pub fn ai(id: PlayerId, designator: impl Into<String>) -> Result<Self> {
        let designator = designator.into();
        if designator.trim().is_empty() {
            return Err(GameError::invalid("AI designator must not be blank"));
        }
        Ok(Self {
            id,
            kind: PlayerKind::Ai { designator },
        })
    }

    pub fn id(&self) -> PlayerId {
        self.id
    }

    pub fn kind(&self) -> &PlayerKind {
        &self.kind
    }

    pub fn is_human(&self) -> bool {
        matches!(self.kind, PlayerKind::Human { .. })
    }

    /// The account id, for human players.
    pub fn account_id(&self) -> Option<i64> {
        match &self.kind {
            PlayerKind::Human { account_id, .. } => Some(*account_id),
            PlayerKind::Ai { .. } => None,
        }
    }

    pub fn display_name(&self) -> &str {
        match &self.kind {
            PlayerKind::Human { name, .. } => name,
            PlayerKind::Ai { designator } => designator,
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "id": self.id.0,
            "name": self.display_name(),
            "is_human": self.is_human()
        })
    }
}

impl PartialEq for Player {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Player {}

impl Hash for Player {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (#{})", self.display_name(), self.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_equality_is_by_id() {
        let a = Player::human(PlayerId(1), 10, "Alice").unwrap();
        let renamed = Player::human(PlayerId(1), 10, "Alice B.").unwrap();
        let b = Player::human(PlayerId(2), 20, "Alice").unwrap();

        assert_eq!(a, renamed);
        assert_ne!(a, b);

        let set: HashSet<Player> = [a, renamed, b].into_iter().collect();
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_kinds() {
        let human = Player::human(PlayerId(1), 10, "Alice").unwrap();
        let bot = Player::ai(PlayerId(2), "random-bot").unwrap();

        assert!(human.is_human());
        assert_eq!(human.account_id(), Some(10));
        assert!(!bot.is_human());
        assert_eq!(bot.account_id(), None);
        assert_eq!(bot.display_name(), "random-bot");
    }

    #[test]
    fn test_blank_names_rejected() {
        assert!(matches!(
            Player::human(PlayerId(1), 10, "  "),
            Err(GameError::InvalidArgument(_))
        ));
        assert!(Player::ai(PlayerId(2), "").is_err());
    }

    #[test]
    fn test_display() {
        let p = Player::human(PlayerId(7), 70, "Bob").unwrap();
        assert_eq!(format!("{}", p), "Bob (#7)");
    }
}
