//! The per-room player registry.
//!
//! # Lifecycle
//!
//! ```text
//! connect() ──→ [connected, sitting in] ──→ detach() ──→ [absent, sitting out]
//!                        ↑                                     │
//!                        └──────── connect() (same id) ────────┘
//!                                  ready=false, sitting_out=true
//! ```
//!
//! Players are never removed. Their seat stays reserved for the life of
//! the room so a returning player lands back where they were.

use std::collections::HashMap;
use std::sync::Arc;

use cardroom_protocol::PlayerId;
use cardroom_transport::{Connection, ConnectionId};

use crate::{Player, SeatAssignment, SessionError};

/// Seats, flags, and connection handles for one room.
pub struct PlayerRegistry<C> {
    players: HashMap<PlayerId, Player<C>>,

    /// Player ids indexed by seat. Kept in sync with `players`; its length
    /// is the next free seat.
    seats: Vec<PlayerId>,

    max_players: usize,
}

impl<C: Connection> PlayerRegistry<C> {
    /// Creates an empty registry with room for `max_players` seats.
    pub fn new(max_players: usize) -> Self {
        Self {
            players: HashMap::new(),
            seats: Vec::new(),
            max_players,
        }
    }

    /// Checks whether `player_id` could connect right now, without
    /// changing anything.
    ///
    /// # Errors
    /// - [`SessionError::AlreadySeated`]: the id has a live connection
    /// - [`SessionError::RoomFull`]: the id is new and no seat is free
    pub fn check_admission(
        &self,
        player_id: &PlayerId,
    ) -> Result<(), SessionError> {
        match self.players.get(player_id) {
            Some(existing) if existing.is_connected() => {
                Err(SessionError::AlreadySeated(player_id.clone()))
            }
            Some(_) => Ok(()),
            None if self.seats.len() >= self.max_players => {
                Err(SessionError::RoomFull(self.max_players))
            }
            None => Ok(()),
        }
    }

    /// Seats a new player or re-attaches a returning one.
    ///
    /// A new id gets the next seat and starts with every flag cleared. A
    /// returning id keeps its seat but comes back not ready and sitting
    /// out; it has to send Ready before it is dealt in again.
    ///
    /// # Errors
    /// Same as [`check_admission`](Self::check_admission).
    pub fn connect(
        &mut self,
        player_id: PlayerId,
        conn: Arc<C>,
    ) -> Result<SeatAssignment, SessionError> {
        self.check_admission(&player_id)?;

        if let Some(existing) = self.players.get_mut(&player_id) {
            existing.attach(conn);
            tracing::info!(%player_id, seat = existing.seat(), "player rejoined");
            return Ok(SeatAssignment {
                seat: existing.seat(),
                rejoined: true,
            });
        }

        let seat = self.seats.len();
        self.seats.push(player_id.clone());
        self.players
            .insert(player_id.clone(), Player::new(player_id.clone(), seat, conn));
        tracing::info!(%player_id, seat, "player joined");

        Ok(SeatAssignment {
            seat,
            rejoined: false,
        })
    }

    /// Clears a player's connection handle and marks them sitting out in
    /// the same step.
    ///
    /// With `expected` set, only detaches if the current handle is that
    /// connection, so a stale reader of a replaced connection can't knock
    /// the player's new one off.
    ///
    /// Returns the detached handle, or `None` if there was nothing to do
    /// (unknown id, already absent, or a different connection).
    pub fn detach(
        &mut self,
        player_id: &PlayerId,
        expected: Option<ConnectionId>,
    ) -> Option<Arc<C>> {
        let player = self.players.get_mut(player_id)?;
        let current = player.conn()?.id();
        if expected.is_some_and(|id| id != current) {
            tracing::debug!(
                %player_id,
                %current,
                "ignoring detach for a replaced connection"
            );
            return None;
        }
        let conn = player.detach();
        tracing::info!(%player_id, "player detached, sitting out");
        conn
    }
}

impl<C> PlayerRegistry<C> {
    /// Looks up a player by id.
    pub fn get(&self, player_id: &PlayerId) -> Option<&Player<C>> {
        self.players.get(player_id)
    }

    fn get_mut(
        &mut self,
        player_id: &PlayerId,
    ) -> Result<&mut Player<C>, SessionError> {
        self.players
            .get_mut(player_id)
            .ok_or_else(|| SessionError::NotFound(player_id.clone()))
    }

    /// `ready = true`, `sitting_out = false`.
    pub fn set_ready(&mut self, player_id: &PlayerId) -> Result<(), SessionError> {
        self.get_mut(player_id)?.set_ready();
        Ok(())
    }

    /// `ready = false`, `sitting_out = true`.
    pub fn set_sitting_out(
        &mut self,
        player_id: &PlayerId,
    ) -> Result<(), SessionError> {
        self.get_mut(player_id)?.set_sitting_out();
        Ok(())
    }

    pub fn set_broke(
        &mut self,
        player_id: &PlayerId,
        broke: bool,
    ) -> Result<(), SessionError> {
        self.get_mut(player_id)?.set_broke(broke);
        Ok(())
    }

    /// Clears `ready` on every player, forcing an explicit re-ready.
    pub fn reset_ready(&mut self) {
        for player in self.players.values_mut() {
            player.clear_ready();
        }
    }

    /// Iterates players in seat order.
    pub fn iter(&self) -> impl Iterator<Item = &Player<C>> {
        self.seats.iter().filter_map(|id| self.players.get(id))
    }

    /// Player ids in seat order.
    pub fn ids_in_seat_order(&self) -> Vec<PlayerId> {
        self.seats.clone()
    }

    /// Ids of every player currently sitting out, in seat order.
    pub fn sitting_out(&self) -> Vec<PlayerId> {
        self.iter()
            .filter(|p| p.is_sitting_out())
            .map(|p| p.id().clone())
            .collect()
    }

    /// Snapshot of every live connection, in seat order.
    ///
    /// Cloning the handles out lets the caller send without borrowing the
    /// registry.
    pub fn live_connections(&self) -> Vec<(PlayerId, Arc<C>)> {
        self.iter()
            .filter_map(|p| p.conn().map(|c| (p.id().clone(), Arc::clone(c))))
            .collect()
    }

    /// Number of seats taken.
    pub fn len(&self) -> usize {
        self.seats.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seats.is_empty()
    }

    pub fn max_players(&self) -> usize {
        self.max_players
    }
}

#[cfg(test)]
mod tests {
    use cardroom_transport::TransportError;

    use super::*;

    struct TestConn(u64);

    impl Connection for TestConn {
        async fn send(&self, _data: &[u8]) -> Result<(), TransportError> {
            Ok(())
        }

        async fn recv(&self) -> Result<Option<Vec<u8>>, TransportError> {
            Ok(None)
        }

        async fn close(&self) -> Result<(), TransportError> {
            Ok(())
        }

        fn id(&self) -> ConnectionId {
            ConnectionId::new(self.0)
        }
    }

    fn pid(s: &str) -> PlayerId {
        PlayerId::from(s)
    }

    fn conn(id: u64) -> Arc<TestConn> {
        Arc::new(TestConn(id))
    }

    #[test]
    fn test_connect_assigns_dense_seats_in_join_order() {
        let mut reg = PlayerRegistry::new(6);
        let a = reg.connect(pid("a"), conn(1)).unwrap();
        let b = reg.connect(pid("b"), conn(2)).unwrap();
        let c = reg.connect(pid("c"), conn(3)).unwrap();

        assert_eq!((a.seat, b.seat, c.seat), (0, 1, 2));
        assert!(!a.rejoined);
        assert_eq!(reg.ids_in_seat_order(), vec![pid("a"), pid("b"), pid("c")]);
    }

    #[test]
    fn test_new_player_starts_with_flags_cleared() {
        let mut reg = PlayerRegistry::new(6);
        reg.connect(pid("a"), conn(1)).unwrap();
        let a = reg.get(&pid("a")).unwrap();
        assert!(!a.is_ready());
        assert!(!a.is_sitting_out());
        assert!(!a.is_broke());
        assert!(a.is_connected());
    }

    #[test]
    fn test_duplicate_live_connection_rejected() {
        let mut reg = PlayerRegistry::new(6);
        reg.connect(pid("a"), conn(1)).unwrap();
        let result = reg.connect(pid("a"), conn(2));
        assert!(matches!(result, Err(SessionError::AlreadySeated(_))));
        assert_eq!(reg.len(), 1);
    }

    #[test]
    fn test_room_full_rejects_new_ids_only() {
        let mut reg = PlayerRegistry::new(2);
        reg.connect(pid("a"), conn(1)).unwrap();
        reg.connect(pid("b"), conn(2)).unwrap();
        assert!(matches!(
            reg.connect(pid("c"), conn(3)),
            Err(SessionError::RoomFull(2))
        ));

        // A returning player still gets back in.
        reg.detach(&pid("a"), None).unwrap();
        assert!(reg.connect(pid("a"), conn(4)).is_ok());
    }

    #[test]
    fn test_detach_clears_handle_and_sits_out_together() {
        let mut reg = PlayerRegistry::new(6);
        reg.connect(pid("a"), conn(1)).unwrap();
        reg.set_ready(&pid("a")).unwrap();

        assert!(reg.detach(&pid("a"), None).is_some());
        let a = reg.get(&pid("a")).unwrap();
        assert!(!a.is_connected());
        assert!(a.is_sitting_out());
    }

    #[test]
    fn test_detach_twice_is_a_no_op() {
        let mut reg = PlayerRegistry::new(6);
        reg.connect(pid("a"), conn(1)).unwrap();
        assert!(reg.detach(&pid("a"), None).is_some());
        assert!(reg.detach(&pid("a"), None).is_none());
        assert!(reg.detach(&pid("ghost"), None).is_none());
    }

    #[test]
    fn test_detach_ignores_stale_connection_id() {
        let mut reg = PlayerRegistry::new(6);
        reg.connect(pid("a"), conn(1)).unwrap();
        reg.detach(&pid("a"), Some(ConnectionId::new(1))).unwrap();
        reg.connect(pid("a"), conn(2)).unwrap();

        // The old reader notices its socket died; must not touch conn 2.
        assert!(reg.detach(&pid("a"), Some(ConnectionId::new(1))).is_none());
        assert!(reg.get(&pid("a")).unwrap().is_connected());
    }

    #[test]
    fn test_rejoin_keeps_seat_and_requires_ready() {
        let mut reg = PlayerRegistry::new(6);
        reg.connect(pid("a"), conn(1)).unwrap();
        reg.connect(pid("b"), conn(2)).unwrap();
        reg.set_ready(&pid("a")).unwrap();
        reg.detach(&pid("a"), None);

        let again = reg.connect(pid("a"), conn(3)).unwrap();
        assert_eq!(again.seat, 0);
        assert!(again.rejoined);
        let a = reg.get(&pid("a")).unwrap();
        assert!(!a.is_ready());
        assert!(a.is_sitting_out());
        assert_eq!(reg.len(), 2);
    }

    #[test]
    fn test_ready_and_sit_out_flags() {
        let mut reg = PlayerRegistry::new(6);
        reg.connect(pid("a"), conn(1)).unwrap();

        reg.set_sitting_out(&pid("a")).unwrap();
        assert_eq!(reg.sitting_out(), vec![pid("a")]);

        reg.set_ready(&pid("a")).unwrap();
        let a = reg.get(&pid("a")).unwrap();
        assert!(a.is_ready() && !a.is_sitting_out());
        assert!(reg.sitting_out().is_empty());

        assert!(matches!(
            reg.set_ready(&pid("nobody")),
            Err(SessionError::NotFound(_))
        ));
    }

    #[test]
    fn test_broke_and_ready_are_independent() {
        let mut reg = PlayerRegistry::new(6);
        reg.connect(pid("a"), conn(1)).unwrap();
        reg.set_broke(&pid("a"), true).unwrap();
        reg.set_ready(&pid("a")).unwrap();
        let a = reg.get(&pid("a")).unwrap();
        assert!(a.is_broke() && a.is_ready());
        assert!(!a.is_eligible());
    }

    #[test]
    fn test_reset_ready_clears_everyone() {
        let mut reg = PlayerRegistry::new(6);
        reg.connect(pid("a"), conn(1)).unwrap();
        reg.connect(pid("b"), conn(2)).unwrap();
        reg.set_ready(&pid("a")).unwrap();
        reg.set_ready(&pid("b")).unwrap();

        reg.reset_ready();
        assert!(reg.iter().all(|p| !p.is_ready()));
    }

    #[test]
    fn test_live_connections_skip_absent_players() {
        let mut reg = PlayerRegistry::new(6);
        reg.connect(pid("a"), conn(1)).unwrap();
        reg.connect(pid("b"), conn(2)).unwrap();
        reg.detach(&pid("a"), None);

        let live: Vec<_> =
            reg.live_connections().into_iter().map(|(id, _)| id).collect();
        assert_eq!(live, vec![pid("b")]);
    }
}
