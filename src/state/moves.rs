//! Moves and round outcome resolution.
//!
//! A [`Throw`] is one player's pick for a round. [`result_of`] is the pure
//! resolver: every one of the nine pairings is listed in a single exhaustive
//! match, so adding a new throw without extending the table fails to compile.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A player's choice for a round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Throw {
    Rock,
    Paper,
    Scissors,
}

impl Throw {
    /// All throws, in declaration order.
    pub const ALL: [Throw; 3] = [Throw::Rock, Throw::Paper, Throw::Scissors];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Rock => "ROCK",
            Self::Paper => "PAPER",
            Self::Scissors => "SCISSORS",
        }
    }

    /// Check if this throw beats the other.
    pub fn beats(&self, other: &Throw) -> bool {
        result_of(*self, *other) == Outcome::Player1Won
    }
}

impl fmt::Display for Throw {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of a fully played round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Outcome {
    #[serde(rename = "PLAYER_1_WON")]
    Player1Won,
    #[serde(rename = "PLAYER_2_WON")]
    Player2Won,
    Tied,
}

impl Outcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Player1Won => "PLAYER_1_WON",
            Self::Player2Won => "PLAYER_2_WON",
            Self::Tied => "TIED",
        }
    }

    /// The same result seen from the other seat.
    pub fn reversed(&self) -> Self {
        match self {
            Self::Player1Won => Self::Player2Won,
            Self::Player2Won => Self::Player1Won,
            Self::Tied => Self::Tied,
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Resolve a round from player 1's and player 2's throws.
pub fn result_of(throw1: Throw, throw2: Throw) -> Outcome {
    use Outcome::*;
    use Throw::*;

    match (throw1, throw2) {
        (Rock, Rock) => Tied,
        (Rock, Paper) => Player2Won,
        (Rock, Scissors) => Player1Won,

        (Paper, Rock) => Player1Won,
        (Paper, Paper) => Tied,
        (Paper, Scissors) => Player2Won,

        (Scissors, Rock) => Player2Won,
        (Scissors, Paper) => Player1Won,
        (Scissors, Scissors) => Tied,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn any_throw() -> impl Strategy<Value = Throw> {
        prop::sample::select(Throw::ALL.to_vec())
    }

    #[test]
    fn test_rock_beats_scissors() {
        assert_eq!(result_of(Throw::Rock, Throw::Scissors), Outcome::Player1Won);
        assert_eq!(result_of(Throw::Scissors, Throw::Rock), Outcome::Player2Won);
    }

    #[test]
    fn test_scissors_beats_paper() {
        assert_eq!(result_of(Throw::Scissors, Throw::Paper), Outcome::Player1Won);
        assert_eq!(result_of(Throw::Paper, Throw::Scissors), Outcome::Player2Won);
    }

    #[test]
    fn test_paper_beats_rock() {
        assert_eq!(result_of(Throw::Paper, Throw::Rock), Outcome::Player1Won);
        assert_eq!(result_of(Throw::Rock, Throw::Paper), Outcome::Player2Won);
    }

    #[test]
    fn test_all_outcomes() {
        let mut wins = 0;
        let mut losses = 0;
        let mut ties = 0;

        for a in Throw::ALL {
            for b in Throw::ALL {
                match result_of(a, b) {
                    Outcome::Player1Won => wins += 1,
                    Outcome::Player2Won => losses += 1,
                    Outcome::Tied => ties += 1,
                }
            }
        }

        assert_eq!(wins, 3);
        assert_eq!(losses, 3);
        assert_eq!(ties, 3);
    }

    #[test]
    fn test_wire_names() {
        assert_eq!(serde_json::to_value(Throw::Scissors).unwrap(), "SCISSORS");
        assert_eq!(
            serde_json::to_value(Outcome::Player2Won).unwrap(),
            "PLAYER_2_WON"
        );
        let parsed: Outcome = serde_json::from_str("\"PLAYER_1_WON\"").unwrap();
        assert_eq!(parsed, Outcome::Player1Won);
    }

    proptest! {
        #[test]
        fn prop_swapping_seats_reverses_outcome(a in any_throw(), b in any_throw()) {
            prop_assert_eq!(result_of(a, b), result_of(b, a).reversed());
        }

        #[test]
        fn prop_equal_throws_tie(a in any_throw()) {
            prop_assert_eq!(result_of(a, a), Outcome::Tied);
            prop_assert!(!a.beats(&a));
        }

        #[test]
        fn prop_exactly_one_side_wins_unequal(a in any_throw(), b in any_throw()) {
            prop_assume!(a != b);
            prop_assert!(a.beats(&b) ^ b.beats(&a));
        }
    }
}
