//! The seam to the card-game rules.
//!
//! Dealing, betting legality, hand ranking, and pot splitting all live
//! behind this trait. The coordinator only ever asks the engine to do
//! something and reads back the snapshot it returns.

use cardroom_protocol::{Action, Card, PlayerId, Seat, TableState};

use crate::TableConfig;

/// Errors reported by an engine.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EngineError {
    /// The action is not legal in the current betting state.
    #[error("illegal action: {0}")]
    IllegalAction(String),

    /// The engine has no seat for this player.
    #[error("player {0} is not seated at the table")]
    UnknownPlayer(PlayerId),

    /// The operation doesn't fit the current table status.
    #[error("invalid table status: {0}")]
    InvalidStatus(String),
}

/// A live table instance, one per room.
///
/// The coordinator never issues overlapping calls against one engine: all
/// calls happen under the owning room's lock. Implementations therefore
/// only need `Send`.
///
/// Every mutating call returns or leaves behind a fresh [`TableState`];
/// the coordinator treats those snapshots as immutable values.
pub trait TableEngine: Send + 'static {
    /// Creates the table and deals the first hand.
    ///
    /// `players` is in seat order. Players listed in `sitting_out` are
    /// seated but defaulting from the start.
    fn new(config: &TableConfig, players: &[PlayerId], sitting_out: &[PlayerId]) -> Self
    where
        Self: Sized;

    /// The current snapshot.
    fn state(&self) -> TableState;

    /// The seat that must act next, if a hand is running.
    fn active(&self) -> Option<Seat>;

    /// Applies an action for the active seat.
    ///
    /// # Errors
    /// [`EngineError::IllegalAction`] if the action isn't allowed; the
    /// table is left unchanged.
    fn act(&mut self, action: Action) -> Result<TableState, EngineError>;

    /// Deals the next hand. Only meaningful once the current one is done.
    fn new_round(&mut self) -> TableState;

    /// Seats a player who joined after the table was created.
    fn add_player(&mut self, player: &PlayerId, defaulting: bool) -> Result<(), EngineError>;

    /// Turns auto-folding on or off for a seated player.
    fn set_player_defaulting(
        &mut self,
        player: &PlayerId,
        defaulting: bool,
    ) -> Result<(), EngineError>;

    /// Restores a broke player's stack to the buy-in.
    fn buy_player_in(&mut self, player: &PlayerId) -> Result<(), EngineError>;

    /// Every seat, in table order, with full information.
    fn seats(&self) -> Vec<Seat>;

    /// Names the best hand made from `cards`, e.g. "a flush, ace high".
    fn describe_hand(cards: &[Card]) -> String
    where
        Self: Sized;

    /// Returns `true` if the engine has a seat for `player`.
    fn is_seated(&self, player: &PlayerId) -> bool {
        self.seats().iter().any(|s| &s.id == player)
    }
}
