//! A single room: its players, its table, and the coordinator that drives
//! them.
//!
//! Every inbound event (connect, client message, disconnect) takes the
//! room lock and keeps it until the engine call and the broadcast that
//! follows are finished, so events in one room are handled strictly one
//! at a time. Rooms never share a lock.
//!
//! A failed delivery does not recurse into recovery. The recipient is
//! detached on the spot and queued, and the queue is drained before the
//! lock is released.

use std::collections::VecDeque;
use std::sync::Arc;

use cardroom_protocol::{
    Action, ClientMessage, Codec, JsonCodec, PlayerId, RoomId, ServerMessage,
    TableState, TableStatus, TableUpdate,
};
use cardroom_session::{PlayerRegistry, SeatAssignment};
use cardroom_transport::{Connection, ConnectionId};
use tokio::sync::Mutex;

use crate::broadcast::send_with_retry;
use crate::quorum::{self, QuorumDecision, Readiness};
use crate::redact::{redact, summarize};
use crate::seating::{self, Intent};
use crate::{RejoinPolicy, RoomConfig, RoomError, TableEngine};

/// Who an action came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionOrigin {
    /// Sent by the player over their connection.
    Player,
    /// Synthesized by the coordinator on the player's behalf.
    System,
}

impl ActionOrigin {
    fn as_str(self) -> &'static str {
        match self {
            Self::Player => "player",
            Self::System => "system",
        }
    }
}

/// One player's membership flags, as seen from outside the room.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerInfo {
    pub player_id: PlayerId,
    pub seat: usize,
    /// The live connection, if any.
    pub connection: Option<ConnectionId>,
    pub connected: bool,
    pub ready: bool,
    pub sitting_out: bool,
    pub broke: bool,
}

/// A snapshot of room metadata (not the table itself).
#[derive(Debug, Clone)]
pub struct RoomInfo {
    pub room_id: RoomId,
    /// Seats taken, connected or not.
    pub player_count: usize,
    pub max_players: usize,
    /// Players in seat order.
    pub players: Vec<PlayerInfo>,
    /// Status of the current hand, or `None` before the first deal.
    pub table: Option<TableStatus>,
}

/// A room and everything it owns.
///
/// Cheap to share behind an `Arc`; all state sits behind one async lock.
pub struct Room<E, C> {
    id: RoomId,
    core: Mutex<RoomCore<E, C>>,
}

impl<E: TableEngine, C: Connection> Room<E, C> {
    /// Creates an empty room. The table is created later, on quorum.
    pub fn new(id: RoomId, config: RoomConfig) -> Self {
        let core = RoomCore {
            room_id: id.clone(),
            players: PlayerRegistry::new(config.max_players),
            config,
            table: None,
            codec: JsonCodec,
            pending: VecDeque::new(),
        };
        Self {
            id,
            core: Mutex::new(core),
        }
    }

    pub fn id(&self) -> &RoomId {
        &self.id
    }

    /// Checks whether `player_id` could connect, without changing anything.
    ///
    /// Used before the transport handshake completes so a rejected client
    /// gets a proper HTTP status instead of an upgraded socket.
    pub async fn check_admission(&self, player_id: &PlayerId) -> Result<(), RoomError> {
        let core = self.core.lock().await;
        core.players.check_admission(player_id)?;
        Ok(())
    }

    /// Seats or re-attaches a player, greets them, and tells the room.
    ///
    /// # Errors
    /// [`RoomError::Session`] if the id already has a live connection or
    /// the room has no free seat. Nothing is sent in that case.
    pub async fn connect(
        &self,
        player_id: PlayerId,
        conn: Arc<C>,
    ) -> Result<SeatAssignment, RoomError> {
        let mut core = self.core.lock().await;
        let assignment = core.players.connect(player_id.clone(), Arc::clone(&conn))?;

        core.deliver(&player_id, &conn, &ServerMessage::Hello).await;
        core.broadcast(&ServerMessage::PlayerConnected {
            player_id: player_id.clone(),
        })
        .await;

        if assignment.rejoined && core.config.rejoin == RejoinPolicy::Resume {
            tracing::debug!(
                room_id = %self.id,
                %player_id,
                "resuming returning player"
            );
            core.on_ready(&player_id).await;
        }

        core.drain().await;
        Ok(assignment)
    }

    /// Routes one decoded client message.
    ///
    /// `conn` is the connection the message arrived on. Messages from any
    /// connection other than the player's current one are dropped.
    pub async fn handle(&self, player_id: &PlayerId, conn: ConnectionId, msg: ClientMessage) {
        let mut core = self.core.lock().await;
        core.route(player_id, conn, msg).await;
        core.drain().await;
    }

    /// Disconnection recovery for a failed read or a closed socket.
    ///
    /// `conn` names the connection that observed the failure; a signal
    /// from a connection the player no longer uses is ignored. Repeated
    /// signals for an absent player only log.
    pub async fn disconnect(&self, player_id: &PlayerId, conn: Option<ConnectionId>) {
        let mut core = self.core.lock().await;
        if !core.lose(player_id, conn) {
            tracing::info!(
                room_id = %self.id,
                %player_id,
                "disconnect for absent player ignored"
            );
        }
        core.drain().await;
    }

    pub async fn info(&self) -> RoomInfo {
        let core = self.core.lock().await;
        let players = core
            .players
            .iter()
            .map(|p| PlayerInfo {
                player_id: p.id().clone(),
                seat: p.seat(),
                connection: p.conn().map(|c| c.id()),
                connected: p.is_connected(),
                ready: p.is_ready(),
                sitting_out: p.is_sitting_out(),
                broke: p.is_broke(),
            })
            .collect();
        RoomInfo {
            room_id: self.id.clone(),
            player_count: core.players.len(),
            max_players: core.players.max_players(),
            players,
            table: core.table.as_ref().map(|t| t.state().status),
        }
    }

    /// The unredacted table snapshot, if a table exists.
    pub async fn table_state(&self) -> Option<TableState> {
        let core = self.core.lock().await;
        core.table.as_ref().map(E::state)
    }
}

/// Lock-protected room state.
struct RoomCore<E, C> {
    room_id: RoomId,
    config: RoomConfig,
    players: PlayerRegistry<C>,
    table: Option<E>,
    codec: JsonCodec,
    /// Players detached by a failed send whose recovery hasn't run yet.
    pending: VecDeque<PlayerId>,
}

impl<E: TableEngine, C: Connection> RoomCore<E, C> {
    // -----------------------------------------------------------------
    // Routing
    // -----------------------------------------------------------------

    async fn route(&mut self, player_id: &PlayerId, conn: ConnectionId, msg: ClientMessage) {
        let current = self
            .players
            .get(player_id)
            .and_then(|p| p.conn())
            .map(|c| c.id());
        if current != Some(conn) {
            tracing::warn!(
                room_id = %self.room_id,
                %player_id,
                %conn,
                current = ?current,
                kind = msg.kind(),
                "message from a connection the player no longer uses, ignoring"
            );
            return;
        }
        tracing::debug!(room_id = %self.room_id, %player_id, kind = msg.kind(), "routing");

        match msg {
            ClientMessage::Ready => self.on_ready(player_id).await,
            ClientMessage::SitOut => self.on_sit_out(player_id).await,
            ClientMessage::BuyIn => self.on_buy_in(player_id).await,
            ClientMessage::PlayerAction { action } => {
                self.apply_action(player_id, action, ActionOrigin::Player)
                    .await;
            }
        }
    }

    async fn on_ready(&mut self, player_id: &PlayerId) {
        if let Err(e) = self.players.set_ready(player_id) {
            tracing::warn!(room_id = %self.room_id, %player_id, error = %e, "ready failed");
            return;
        }
        self.mirror(player_id, Intent::Ready);
        self.evaluate_quorum().await;
    }

    async fn on_sit_out(&mut self, player_id: &PlayerId) {
        if let Err(e) = self.players.set_sitting_out(player_id) {
            tracing::warn!(room_id = %self.room_id, %player_id, error = %e, "sit out failed");
            return;
        }
        self.mirror(player_id, Intent::SitOut);
        self.evaluate_quorum().await;
    }

    async fn on_buy_in(&mut self, player_id: &PlayerId) {
        let broke = self.players.get(player_id).is_some_and(|p| p.is_broke());
        if !broke {
            tracing::debug!(
                room_id = %self.room_id,
                %player_id,
                "buy-in from a player with chips, ignoring"
            );
            return;
        }

        if let Some(table) = self.table.as_mut() {
            if let Err(e) = table.buy_player_in(player_id) {
                tracing::warn!(room_id = %self.room_id, %player_id, error = %e, "buy-in rejected by table");
            }
        }
        if let Err(e) = self.players.set_broke(player_id, false) {
            tracing::warn!(room_id = %self.room_id, %player_id, error = %e, "buy-in failed");
            return;
        }
        tracing::info!(room_id = %self.room_id, %player_id, "player bought in");
        self.on_ready(player_id).await;
    }

    /// Applies the seating transition for `intent`, if a table exists.
    fn mirror(&mut self, player_id: &PlayerId, intent: Intent) {
        let Some(table) = self.table.as_mut() else {
            return;
        };
        match seating::apply(table, player_id, intent) {
            Ok(call) => {
                tracing::debug!(room_id = %self.room_id, %player_id, ?intent, ?call, "seating updated");
            }
            Err(e) => {
                tracing::warn!(room_id = %self.room_id, %player_id, ?intent, error = %e, "seating update failed");
            }
        }
    }

    // -----------------------------------------------------------------
    // Quorum and actions
    // -----------------------------------------------------------------

    async fn evaluate_quorum(&mut self) {
        let readiness: Vec<Readiness> = self.players.iter().map(Readiness::from).collect();
        let status = self.table.as_ref().map(|t| t.state().status);

        let state = match quorum::decide(status, &readiness) {
            QuorumDecision::Wait => return,
            QuorumDecision::CreateTable => {
                let ids = self.players.ids_in_seat_order();
                let sitting_out = self.players.sitting_out();
                let table = E::new(&self.config.table, &ids, &sitting_out);
                let state = table.state();
                self.table = Some(table);
                tracing::info!(room_id = %self.room_id, players = ids.len(), "table created");
                state
            }
            QuorumDecision::NewRound => {
                let Some(table) = self.table.as_mut() else {
                    return;
                };
                tracing::info!(room_id = %self.room_id, "dealing new round");
                table.new_round()
            }
        };
        self.publish(state).await;
    }

    /// The PlayerAction path, shared by real and synthesized actions.
    async fn apply_action(&mut self, player_id: &PlayerId, action: Action, origin: ActionOrigin) {
        let outcome = {
            let Some(table) = self.table.as_mut() else {
                tracing::debug!(room_id = %self.room_id, %player_id, "action with no table, ignoring");
                return;
            };
            let active = table.active().map(|s| s.id);
            if active.as_ref() != Some(player_id) {
                tracing::debug!(
                    room_id = %self.room_id,
                    %player_id,
                    active = ?active,
                    "action from a player who is not active, ignoring"
                );
                return;
            }
            table.act(action)
        };

        match outcome {
            Ok(state) => {
                tracing::info!(
                    room_id = %self.room_id,
                    %player_id,
                    action = %action.kind,
                    chips = action.chips,
                    origin = origin.as_str(),
                    "action applied"
                );
                self.broadcast(&ServerMessage::PlayerAction {
                    player_id: player_id.clone(),
                    action,
                })
                .await;
                self.publish(state).await;
            }
            Err(e) => {
                tracing::info!(
                    room_id = %self.room_id,
                    %player_id,
                    action = %action.kind,
                    origin = origin.as_str(),
                    error = %e,
                    "action rejected"
                );
                if origin == ActionOrigin::Player {
                    self.send_illegal(player_id).await;
                }
            }
        }
    }

    /// Post-snapshot handling: broke detection, the per-viewer broadcast,
    /// and the readiness reset after a concluded hand.
    async fn publish(&mut self, state: TableState) {
        if state.status.is_done() {
            for seat in state.seats.iter().filter(|s| s.chips == 0) {
                if self.players.set_broke(&seat.id, true).is_ok() {
                    tracing::info!(room_id = %self.room_id, player_id = %seat.id, "player is broke");
                }
            }
        }

        let result = summarize(&state, E::describe_hand);
        if let Some(summary) = &result {
            tracing::info!(room_id = %self.room_id, %summary, "hand concluded");
        }

        for (player_id, conn) in self.players.live_connections() {
            let update = TableUpdate {
                table: redact(&state, &player_id),
                result: result.clone(),
                player: state.seat(&player_id).cloned(),
            };
            self.deliver(&player_id, &conn, &ServerMessage::TableState(update))
                .await;
        }

        if result.is_some() {
            self.players.reset_ready();
        }
    }

    async fn send_illegal(&mut self, player_id: &PlayerId) {
        let Some(state) = self.table.as_ref().map(E::state) else {
            return;
        };
        let Some(conn) = self.players.get(player_id).and_then(|p| p.conn()).cloned() else {
            return;
        };
        let update = TableUpdate {
            table: redact(&state, player_id),
            result: None,
            player: state.seat(player_id).cloned(),
        };
        self.deliver(player_id, &conn, &ServerMessage::IllegalAction(update))
            .await;
    }

    // -----------------------------------------------------------------
    // Delivery and recovery
    // -----------------------------------------------------------------

    /// Sends `msg` verbatim to every live connection.
    async fn broadcast(&mut self, msg: &ServerMessage) {
        let bytes = match self.codec.encode(msg) {
            Ok(b) => b,
            Err(e) => {
                tracing::error!(room_id = %self.room_id, kind = msg.kind(), error = %e, "encode failed");
                return;
            }
        };
        for (player_id, conn) in self.players.live_connections() {
            self.send_bytes(&player_id, &conn, &bytes, msg.kind()).await;
        }
    }

    /// Sends `msg` to one recipient.
    async fn deliver(&mut self, player_id: &PlayerId, conn: &Arc<C>, msg: &ServerMessage) {
        match self.codec.encode(msg) {
            Ok(bytes) => self.send_bytes(player_id, conn, &bytes, msg.kind()).await,
            Err(e) => {
                tracing::error!(room_id = %self.room_id, kind = msg.kind(), error = %e, "encode failed");
            }
        }
    }

    async fn send_bytes(&mut self, player_id: &PlayerId, conn: &Arc<C>, bytes: &[u8], kind: &str) {
        if let Err(e) = send_with_retry(conn.as_ref(), bytes, &self.config.retry).await {
            tracing::warn!(
                room_id = %self.room_id,
                %player_id,
                kind,
                error = %e,
                "delivery failed"
            );
            self.lose(player_id, Some(conn.id()));
        }
    }

    /// Detaches the player and queues the rest of recovery. Returns
    /// `false` if the player was already absent.
    fn lose(&mut self, player_id: &PlayerId, conn: Option<ConnectionId>) -> bool {
        if self.players.detach(player_id, conn).is_none() {
            return false;
        }
        self.pending.push_back(player_id.clone());
        true
    }

    /// Runs recovery for every queued player. Recovery can itself fail
    /// deliveries and queue more players; the loop runs until the queue
    /// is empty.
    async fn drain(&mut self) {
        while let Some(player_id) = self.pending.pop_front() {
            self.recover(&player_id).await;
        }
    }

    async fn recover(&mut self, player_id: &PlayerId) {
        tracing::info!(room_id = %self.room_id, %player_id, "player disconnected");
        self.broadcast(&ServerMessage::PlayerDisconnected {
            player_id: player_id.clone(),
        })
        .await;

        self.mirror(player_id, Intent::Disconnect);

        let is_active = self
            .table
            .as_ref()
            .and_then(E::active)
            .is_some_and(|s| &s.id == player_id);
        if is_active {
            tracing::info!(room_id = %self.room_id, %player_id, "folding for disconnected active player");
            self.apply_action(player_id, Action::fold(), ActionOrigin::System)
                .await;
        }
    }
}
