//! Test doubles for driving a [`Room`](crate::Room) without a network or a
//! real card engine.
//!
//! Enabled by the `test-util` feature.

use std::collections::VecDeque;
use std::io;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use cardroom_protocol::{
    Action, ActionKind, Card, Codec, HandResult, JsonCodec, PlayerId, Rank, Seat,
    ServerMessage, Suit, TableState, TableStatus,
};
use cardroom_transport::{Connection, ConnectionId, FailureKind, TransportError};

use crate::{EngineError, TableConfig, TableEngine};

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

// ---------------------------------------------------------------------------
// MockConnection
// ---------------------------------------------------------------------------

/// A connection that records what it is sent and fails on demand.
pub struct MockConnection {
    id: ConnectionId,
    sent: Mutex<Vec<Vec<u8>>>,
    script: Mutex<VecDeque<FailureKind>>,
    always: Mutex<Option<FailureKind>>,
    attempts: AtomicUsize,
    closed: AtomicBool,
}

impl MockConnection {
    pub fn new(id: u64) -> Arc<Self> {
        Arc::new(Self {
            id: ConnectionId::new(id),
            sent: Mutex::new(Vec::new()),
            script: Mutex::new(VecDeque::new()),
            always: Mutex::new(None),
            attempts: AtomicUsize::new(0),
            closed: AtomicBool::new(false),
        })
    }

    /// Fails the next `times` sends with `kind`.
    pub fn fail_next(&self, kind: FailureKind, times: usize) {
        lock(&self.script).extend(std::iter::repeat_n(kind, times));
    }

    /// Fails every send from now on.
    pub fn fail_always(&self, kind: FailureKind) {
        *lock(&self.always) = Some(kind);
    }

    /// Send attempts so far, successful or not.
    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    /// Every message delivered so far, decoded.
    pub fn sent(&self) -> Vec<ServerMessage> {
        lock(&self.sent).iter().filter_map(|b| JsonCodec.decode(b).ok()).collect()
    }

    /// Like [`sent`](Self::sent), but clears the log.
    pub fn take_sent(&self) -> Vec<ServerMessage> {
        let raw = std::mem::take(&mut *lock(&self.sent));
        raw.iter().filter_map(|b| JsonCodec.decode(b).ok()).collect()
    }
}

fn scripted_error(kind: FailureKind) -> TransportError {
    match kind {
        FailureKind::ClosedByPeer => TransportError::ConnectionClosed("connection reset".into()),
        FailureKind::Timeout => TransportError::Timeout("write timed out".into()),
        FailureKind::Other => TransportError::SendFailed(io::Error::other("scripted failure")),
    }
}

impl Connection for MockConnection {
    async fn send(&self, data: &[u8]) -> Result<(), TransportError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        let failure = lock(&self.script).pop_front().or(*lock(&self.always));
        if let Some(kind) = failure {
            return Err(scripted_error(kind));
        }
        lock(&self.sent).push(data.to_vec());
        Ok(())
    }

    async fn recv(&self) -> Result<Option<Vec<u8>>, TransportError> {
        Ok(None)
    }

    async fn close(&self) -> Result<(), TransportError> {
        self.closed.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn id(&self) -> ConnectionId {
        self.id
    }
}

// ---------------------------------------------------------------------------
// ScriptedEngine
// ---------------------------------------------------------------------------

const LADDER: [Rank; 13] = [
    Rank::Ace,
    Rank::King,
    Rank::Queen,
    Rank::Jack,
    Rank::Ten,
    Rank::Nine,
    Rank::Eight,
    Rank::Seven,
    Rank::Six,
    Rank::Five,
    Rank::Four,
    Rank::Three,
    Rank::Two,
];

const SUITS: [Suit; 4] = [Suit::Spades, Suit::Hearts, Suit::Diamonds, Suit::Clubs];

const BOARD: [Card; 5] = [
    Card { rank: Rank::Two, suit: Suit::Clubs },
    Card { rank: Rank::Seven, suit: Suit::Diamonds },
    Card { rank: Rank::Nine, suit: Suit::Clubs },
    Card { rank: Rank::Jack, suit: Suit::Diamonds },
    Card { rank: Rank::Four, suit: Suit::Clubs },
];

/// A deterministic single-street table.
///
/// Seats act in seat order starting from seat 0, with no blinds. The hand
/// ends when one seat is left or when everyone has acted and matched the
/// bet; the board is then turned over and the highest rank total wins.
///
/// Seat 0 always holds the best cards, unless `SPLIT` is set, in which
/// case every seat holds ace-king and every showdown splits the pot.
/// Defaulting seats are folded when their turn comes.
#[derive(Debug, Clone)]
pub struct ScriptedEngine<const SPLIT: bool = false> {
    buy_in: u32,
    seats: Vec<Seat>,
    to_act: VecDeque<usize>,
    status: TableStatus,
    pot: u32,
    cards: Vec<Card>,
    result: Option<HandResult>,
}

/// A [`ScriptedEngine`] where every showdown is a tie.
pub type SplitPotEngine = ScriptedEngine<true>;

impl<const SPLIT: bool> ScriptedEngine<SPLIT> {
    fn hole_cards(seat: usize) -> Vec<Card> {
        if SPLIT {
            vec![
                Card::new(Rank::Ace, SUITS[seat % 4]),
                Card::new(Rank::King, SUITS[(seat + 1) % 4]),
            ]
        } else {
            vec![
                Card::new(LADDER[(2 * seat) % 13], Suit::Spades),
                Card::new(LADDER[(2 * seat + 1) % 13], Suit::Hearts),
            ]
        }
    }

    fn strength(cards: &[Card]) -> u32 {
        cards.iter().map(|c| c.rank as u32).sum()
    }

    fn can_act(&self, i: usize) -> bool {
        let seat = &self.seats[i];
        !seat.flags.folded && !seat.flags.all_in && seat.chips > 0
    }

    fn in_hand(&self) -> Vec<usize> {
        (0..self.seats.len())
            .filter(|&i| !self.seats[i].flags.folded)
            .collect()
    }

    fn current_bet(&self) -> u32 {
        self.seats.iter().map(|s| s.chips_in_pot).max().unwrap_or(0)
    }

    fn position(&self, player: &PlayerId) -> Result<usize, EngineError> {
        self.seats
            .iter()
            .position(|s| &s.id == player)
            .ok_or_else(|| EngineError::UnknownPlayer(player.clone()))
    }

    fn deal(&mut self) {
        self.pot = 0;
        self.cards.clear();
        self.result = None;
        self.status = TableStatus::PreFlop;
        for (i, seat) in self.seats.iter_mut().enumerate() {
            let playing = seat.chips > 0;
            seat.chips_in_pot = 0;
            seat.flags.all_in = false;
            seat.flags.folded = !playing;
            seat.cards = if playing { Self::hole_cards(i) } else { Vec::new() };
        }
        self.to_act = (0..self.seats.len()).filter(|&i| self.can_act(i)).collect();
        self.settle();
    }

    /// Folds defaulting seats whose turn has come, and finishes the hand
    /// once nobody is left to act.
    fn settle(&mut self) {
        loop {
            if self.in_hand().len() <= 1 {
                return self.finish();
            }
            let Some(&next) = self.to_act.front() else {
                return self.finish();
            };
            if !self.seats[next].flags.defaulting {
                return;
            }
            self.to_act.pop_front();
            self.seats[next].flags.folded = true;
        }
    }

    fn finish(&mut self) {
        self.to_act.clear();
        self.status = TableStatus::Done;

        let contenders = self.in_hand();
        if contenders.len() > 1 {
            self.cards = BOARD.to_vec();
        }
        let best = contenders
            .iter()
            .map(|&i| Self::strength(&self.seats[i].cards))
            .max();
        let winners: Vec<usize> = contenders
            .iter()
            .copied()
            .filter(|&i| Some(Self::strength(&self.seats[i].cards)) == best)
            .collect();

        if !winners.is_empty() {
            let n = winners.len() as u32;
            let mut odd = self.pot % n;
            for &w in &winners {
                let extra = if odd > 0 {
                    odd -= 1;
                    1
                } else {
                    0
                };
                self.seats[w].chips += self.pot / n + extra;
            }
        }

        self.result = Some(HandResult {
            winners: winners.iter().map(|&i| self.seats[i].clone()).collect(),
            contestants: contenders.iter().map(|&i| self.seats[i].clone()).collect(),
            table_cards: self.cards.clone(),
        });
    }
}

impl<const SPLIT: bool> TableEngine for ScriptedEngine<SPLIT> {
    fn new(config: &TableConfig, players: &[PlayerId], sitting_out: &[PlayerId]) -> Self {
        let seats = players
            .iter()
            .map(|id| {
                let mut seat = Seat::new(id.clone(), config.buy_in);
                seat.flags.defaulting = sitting_out.contains(id);
                seat
            })
            .collect();
        let mut engine = Self {
            buy_in: config.buy_in,
            seats,
            to_act: VecDeque::new(),
            status: TableStatus::PreFlop,
            pot: 0,
            cards: Vec::new(),
            result: None,
        };
        engine.deal();
        engine
    }

    fn state(&self) -> TableState {
        TableState {
            seats: self.seats.clone(),
            active: self.active(),
            cards: self.cards.clone(),
            pot: self.pot,
            status: self.status,
            result: self.result.clone(),
        }
    }

    fn active(&self) -> Option<Seat> {
        if self.status.is_done() {
            return None;
        }
        self.to_act.front().map(|&i| self.seats[i].clone())
    }

    fn act(&mut self, action: Action) -> Result<TableState, EngineError> {
        if self.status.is_done() {
            return Err(EngineError::InvalidStatus("hand is over".into()));
        }
        let Some(&i) = self.to_act.front() else {
            return Err(EngineError::InvalidStatus("nobody to act".into()));
        };

        let current = self.current_bet();
        let seat = &self.seats[i];
        let owed = current - seat.chips_in_pot;
        let put = match action.kind {
            ActionKind::Fold => None,
            ActionKind::Check if owed == 0 => Some(0),
            ActionKind::Check => {
                return Err(EngineError::IllegalAction(format!(
                    "cannot check facing {owed}"
                )));
            }
            ActionKind::Call => Some(owed.min(seat.chips)),
            ActionKind::Bet | ActionKind::Raise => {
                if action.chips > seat.chips || action.chips <= owed {
                    return Err(EngineError::IllegalAction(format!(
                        "cannot bet {} with {} behind",
                        action.chips, seat.chips
                    )));
                }
                Some(action.chips)
            }
            ActionKind::AllIn => Some(seat.chips),
        };

        self.to_act.pop_front();
        match put {
            None => self.seats[i].flags.folded = true,
            Some(chips) => {
                let seat = &mut self.seats[i];
                seat.chips -= chips;
                seat.chips_in_pot += chips;
                seat.flags.all_in = seat.chips == 0;
                self.pot += chips;
                if self.seats[i].chips_in_pot > current {
                    let n = self.seats.len();
                    self.to_act = (1..n)
                        .map(|k| (i + k) % n)
                        .filter(|&j| self.can_act(j))
                        .collect();
                }
            }
        }

        self.settle();
        Ok(self.state())
    }

    fn new_round(&mut self) -> TableState {
        self.deal();
        self.state()
    }

    fn add_player(&mut self, player: &PlayerId, defaulting: bool) -> Result<(), EngineError> {
        if self.is_seated(player) {
            return Ok(());
        }
        let mut seat = Seat::new(player.clone(), self.buy_in);
        seat.flags.folded = true;
        seat.flags.defaulting = defaulting;
        self.seats.push(seat);
        Ok(())
    }

    fn set_player_defaulting(
        &mut self,
        player: &PlayerId,
        defaulting: bool,
    ) -> Result<(), EngineError> {
        let i = self.position(player)?;
        self.seats[i].flags.defaulting = defaulting;
        Ok(())
    }

    fn buy_player_in(&mut self, player: &PlayerId) -> Result<(), EngineError> {
        let i = self.position(player)?;
        self.seats[i].chips = self.buy_in;
        Ok(())
    }

    fn seats(&self) -> Vec<Seat> {
        self.seats.clone()
    }

    fn describe_hand(cards: &[Card]) -> String {
        cards
            .iter()
            .max_by_key(|c| c.rank)
            .map(|c| format!("{c} high"))
            .unwrap_or_default()
    }
}
