//! Room and table configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// TableConfig
// ---------------------------------------------------------------------------

/// Betting structure handed to the engine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum BettingLimit {
    #[default]
    NoLimit,
    PotLimit,
    FixedLimit,
}

/// Fixed configuration the engine is created with.
///
/// Every room uses the same table settings; they are fixed when the first
/// hand starts and not changed afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableConfig {
    /// Chips each player starts with, and receives again on a buy-in.
    pub buy_in: u32,
    pub small_blind: u32,
    pub big_blind: u32,
    pub ante: u32,
    pub limit: BettingLimit,
    /// Play one hand and stop; the next hand is requested explicitly
    /// once every eligible player is ready again.
    pub one_shot: bool,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            buy_in: 2000,
            small_blind: 10,
            big_blind: 20,
            ante: 0,
            limit: BettingLimit::NoLimit,
            one_shot: true,
        }
    }
}

// ---------------------------------------------------------------------------
// RetryPolicy
// ---------------------------------------------------------------------------

/// Per-recipient delivery retries.
///
/// A send that fails with a transient error is retried up to
/// `max_retries` times; retry `n` (0-based) is preceded by a sleep of
/// `initial_backoff * 2^n`.
///
/// A message is therefore sent at most `max_retries + 1` times: the first
/// attempt plus one per retry. The defaults give six sends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub initial_backoff: Duration,
}

impl RetryPolicy {
    /// The sleep before retry `retry` (0-based).
    pub fn backoff(&self, retry: u32) -> Duration {
        self.initial_backoff
            .saturating_mul(2u32.saturating_pow(retry))
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 5,
            initial_backoff: Duration::from_millis(100),
        }
    }
}

// ---------------------------------------------------------------------------
// RejoinPolicy
// ---------------------------------------------------------------------------

/// What happens to a player who reconnects under an id already seated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum RejoinPolicy {
    /// They come back sitting out and must send Ready.
    #[default]
    MustReady,
    /// They are treated as if they sent Ready straight away.
    Resume,
}

// ---------------------------------------------------------------------------
// RoomConfig
// ---------------------------------------------------------------------------

/// Configuration for a room instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomConfig {
    /// Maximum seats in the room.
    pub max_players: usize,
    pub table: TableConfig,
    pub retry: RetryPolicy,
    pub rejoin: RejoinPolicy,
}

impl Default for RoomConfig {
    fn default() -> Self {
        Self {
            max_players: 6,
            table: TableConfig::default(),
            retry: RetryPolicy::default(),
            rejoin: RejoinPolicy::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_room_config_default() {
        let config = RoomConfig::default();
        assert_eq!(config.max_players, 6);
        assert_eq!(config.table.buy_in, 2000);
        assert_eq!(config.table.big_blind, 20);
        assert_eq!(config.table.small_blind, 10);
        assert!(config.table.one_shot);
        assert_eq!(config.rejoin, RejoinPolicy::MustReady);
    }

    #[test]
    fn test_backoff_doubles_from_100ms() {
        let retry = RetryPolicy::default();
        let delays: Vec<u128> =
            (0..5).map(|n| retry.backoff(n).as_millis()).collect();
        assert_eq!(delays, vec![100, 200, 400, 800, 1600]);
    }

    #[test]
    fn test_backoff_saturates_instead_of_overflowing() {
        let retry = RetryPolicy {
            max_retries: 100,
            initial_backoff: Duration::from_secs(1),
        };
        assert_eq!(retry.backoff(64), retry.backoff(40));
    }
}
