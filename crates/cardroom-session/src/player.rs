//! A single seated player.

use std::sync::Arc;

use cardroom_protocol::PlayerId;

/// Where a connecting player ended up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeatAssignment {
    /// Seat index, dense from 0 in join order.
    pub seat: usize,
    /// `true` if the id had joined before and is coming back.
    pub rejoined: bool,
}

/// A player scoped to one room.
///
/// The three flags are independent: a player can be `broke` and `ready` at
/// once, which means "wants to buy back in".
///
/// Fields are private so that the registry is the only place that can
/// clear a connection handle, and it always sets `sitting_out` in the
/// same step.
#[derive(Debug)]
pub struct Player<C> {
    id: PlayerId,
    seat: usize,
    conn: Option<Arc<C>>,
    ready: bool,
    sitting_out: bool,
    broke: bool,
}

impl<C> Player<C> {
    pub(crate) fn new(id: PlayerId, seat: usize, conn: Arc<C>) -> Self {
        Self {
            id,
            seat,
            conn: Some(conn),
            ready: false,
            sitting_out: false,
            broke: false,
        }
    }

    pub fn id(&self) -> &PlayerId {
        &self.id
    }

    pub fn seat(&self) -> usize {
        self.seat
    }

    /// The live connection, if the player is connected.
    pub fn conn(&self) -> Option<&Arc<C>> {
        self.conn.as_ref()
    }

    pub fn is_connected(&self) -> bool {
        self.conn.is_some()
    }

    pub fn is_ready(&self) -> bool {
        self.ready
    }

    pub fn is_sitting_out(&self) -> bool {
        self.sitting_out
    }

    pub fn is_broke(&self) -> bool {
        self.broke
    }

    /// Neither sitting out nor broke: this player counts towards quorum.
    pub fn is_eligible(&self) -> bool {
        !self.sitting_out && !self.broke
    }

    pub(crate) fn attach(&mut self, conn: Arc<C>) {
        self.conn = Some(conn);
        self.ready = false;
        self.sitting_out = true;
    }

    pub(crate) fn detach(&mut self) -> Option<Arc<C>> {
        self.sitting_out = true;
        self.conn.take()
    }

    pub(crate) fn set_ready(&mut self) {
        self.ready = true;
        self.sitting_out = false;
    }

    pub(crate) fn set_sitting_out(&mut self) {
        self.ready = false;
        self.sitting_out = true;
    }

    pub(crate) fn clear_ready(&mut self) {
        self.ready = false;
    }

    pub(crate) fn set_broke(&mut self, broke: bool) {
        self.broke = broke;
    }
}
