//! Table snapshot types.
//!
//! These mirror what the game engine reports after every mutating call.
//! A [`TableState`] is an immutable value: the coordinator derives
//! per-viewer copies from it but never edits the engine's own snapshot.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::PlayerId;

// ---------------------------------------------------------------------------
// Cards
// ---------------------------------------------------------------------------

/// Card rank, deuce low.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum Rank {
    Two,
    Three,
    Four,
    Five,
    Six,
    Seven,
    Eight,
    Nine,
    Ten,
    Jack,
    Queen,
    King,
    Ace,
}

impl Rank {
    fn symbol(self) -> char {
        match self {
            Self::Two => '2',
            Self::Three => '3',
            Self::Four => '4',
            Self::Five => '5',
            Self::Six => '6',
            Self::Seven => '7',
            Self::Eight => '8',
            Self::Nine => '9',
            Self::Ten => 'T',
            Self::Jack => 'J',
            Self::Queen => 'Q',
            Self::King => 'K',
            Self::Ace => 'A',
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Suit {
    Clubs,
    Diamonds,
    Hearts,
    Spades,
}

impl Suit {
    fn symbol(self) -> char {
        match self {
            Self::Clubs => 'c',
            Self::Diamonds => 'd',
            Self::Hearts => 'h',
            Self::Spades => 's',
        }
    }
}

/// A single playing card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Card {
    pub rank: Rank,
    pub suit: Suit,
}

impl Card {
    pub fn new(rank: Rank, suit: Suit) -> Self {
        Self { rank, suit }
    }
}

/// Short form, e.g. `As` or `Td`.
impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.rank.symbol(), self.suit.symbol())
    }
}

// ---------------------------------------------------------------------------
// Seats
// ---------------------------------------------------------------------------

/// Per-seat flags maintained by the engine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeatFlags {
    /// Folded out of the current hand.
    #[serde(default)]
    pub folded: bool,
    /// Has no chips left behind the pot.
    #[serde(default)]
    pub all_in: bool,
    /// The engine auto-folds this seat's turns.
    #[serde(default)]
    pub defaulting: bool,
}

/// One occupied seat as seen by the engine.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Seat {
    pub id: PlayerId,
    pub chips: u32,
    #[serde(default)]
    pub chips_in_pot: u32,
    /// Hole cards. Empty once redacted.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub cards: Vec<Card>,
    #[serde(default)]
    pub flags: SeatFlags,
}

impl Seat {
    /// Creates an empty seat for `id` holding `chips`.
    pub fn new(id: PlayerId, chips: u32) -> Self {
        Self {
            id,
            chips,
            ..Self::default()
        }
    }
}

// ---------------------------------------------------------------------------
// Status and result
// ---------------------------------------------------------------------------

/// Betting round of the current hand.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TableStatus {
    #[default]
    PreFlop,
    Flop,
    Turn,
    River,
    /// The hand is over; a new round may be requested.
    Done,
}

impl TableStatus {
    pub fn is_done(self) -> bool {
        matches!(self, Self::Done)
    }
}

/// Outcome of a concluded hand.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandResult {
    pub winners: Vec<Seat>,
    /// Every seat still in the hand at the end. A single contestant means
    /// everyone else folded and no cards are shown.
    pub contestants: Vec<Seat>,
    pub table_cards: Vec<Card>,
}

impl HandResult {
    /// Returns `true` if cards were turned over between two or more seats.
    pub fn is_showdown(&self) -> bool {
        self.contestants.len() > 1
    }

    pub fn is_contestant(&self, id: &PlayerId) -> bool {
        self.contestants.iter().any(|c| &c.id == id)
    }
}

/// Immutable snapshot of the table returned by the engine.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableState {
    /// Seats in table order.
    pub seats: Vec<Seat>,
    /// The seat that must act next, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active: Option<Seat>,
    /// Community cards.
    #[serde(default)]
    pub cards: Vec<Card>,
    pub pot: u32,
    pub status: TableStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<HandResult>,
}

impl TableState {
    /// Looks up the seat belonging to `id`.
    pub fn seat(&self, id: &PlayerId) -> Option<&Seat> {
        self.seats.iter().find(|s| &s.id == id)
    }

    /// Returns the id of the player to act, if any.
    pub fn active_id(&self) -> Option<&PlayerId> {
        self.active.as_ref().map(|s| &s.id)
    }
}

// ---------------------------------------------------------------------------
// Actions
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActionKind {
    Fold,
    Check,
    Call,
    Bet,
    Raise,
    AllIn,
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// A betting action. `chips` is only meaningful for `Bet` and `Raise`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Action {
    pub kind: ActionKind,
    #[serde(default)]
    pub chips: u32,
}

impl Action {
    pub fn new(kind: ActionKind, chips: u32) -> Self {
        Self { kind, chips }
    }

    pub fn fold() -> Self {
        Self::new(ActionKind::Fold, 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pid(s: &str) -> PlayerId {
        PlayerId::from(s)
    }

    #[test]
    fn test_card_display() {
        assert_eq!(Card::new(Rank::Ace, Suit::Spades).to_string(), "As");
        assert_eq!(Card::new(Rank::Ten, Suit::Diamonds).to_string(), "Td");
    }

    #[test]
    fn test_status_done() {
        assert!(TableStatus::Done.is_done());
        assert!(!TableStatus::River.is_done());
    }

    #[test]
    fn test_showdown_needs_two_contestants() {
        let mut result = HandResult {
            contestants: vec![Seat::new(pid("a"), 0)],
            ..HandResult::default()
        };
        assert!(!result.is_showdown());
        result.contestants.push(Seat::new(pid("b"), 0));
        assert!(result.is_showdown());
        assert!(result.is_contestant(&pid("b")));
        assert!(!result.is_contestant(&pid("c")));
    }

    #[test]
    fn test_action_defaults_chips_when_missing() {
        let action: Action =
            serde_json::from_str(r#"{"kind":"Check"}"#).unwrap();
        assert_eq!(action, Action::new(ActionKind::Check, 0));
    }

    #[test]
    fn test_seat_omits_empty_cards() {
        let json = serde_json::to_value(Seat::new(pid("a"), 100)).unwrap();
        assert!(json.get("cards").is_none());
        assert_eq!(json["chips"], 100);
    }

    #[test]
    fn test_table_state_lookup() {
        let state = TableState {
            seats: vec![Seat::new(pid("a"), 10), Seat::new(pid("b"), 20)],
            active: Some(Seat::new(pid("b"), 20)),
            ..TableState::default()
        };
        assert_eq!(state.seat(&pid("a")).map(|s| s.chips), Some(10));
        assert_eq!(state.active_id(), Some(&pid("b")));
    }
}
