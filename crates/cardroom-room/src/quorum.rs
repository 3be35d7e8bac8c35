//! Deciding when the next hand may be dealt.
//!
//! Evaluated synchronously after every readiness-affecting message; there
//! is no background polling.

use cardroom_protocol::TableStatus;
use cardroom_session::Player;

/// The flags quorum looks at, detached from the registry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Readiness {
    pub ready: bool,
    pub sitting_out: bool,
    pub broke: bool,
}

impl Readiness {
    fn is_eligible(self) -> bool {
        !self.sitting_out && !self.broke
    }
}

impl<C> From<&Player<C>> for Readiness {
    fn from(p: &Player<C>) -> Self {
        Self {
            ready: p.is_ready(),
            sitting_out: p.is_sitting_out(),
            broke: p.is_broke(),
        }
    }
}

/// What the coordinator should do after a readiness change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuorumDecision {
    /// Not everyone is ready, or a hand is still running.
    Wait,
    /// No table exists yet: create one, which deals the first hand.
    CreateTable,
    /// The table's last hand is done: deal another.
    NewRound,
}

/// At least two players registered, at least two eligible (neither sitting
/// out nor broke), and every eligible player ready.
pub fn quorum_met(players: &[Readiness]) -> bool {
    if players.len() < 2 {
        return false;
    }
    let mut eligible = 0;
    for p in players.iter().filter(|p| p.is_eligible()) {
        if !p.ready {
            return false;
        }
        eligible += 1;
    }
    eligible >= 2
}

/// Combines quorum with the table's status. `table` is `None` until the
/// first hand has been dealt.
pub fn decide(table: Option<TableStatus>, players: &[Readiness]) -> QuorumDecision {
    let idle = table.is_none_or(TableStatus::is_done);
    if !idle || !quorum_met(players) {
        return QuorumDecision::Wait;
    }
    match table {
        None => QuorumDecision::CreateTable,
        Some(_) => QuorumDecision::NewRound,
    }
}
