//! HTTP routes, admission, and the connection's reader loop.
//!
//! The flow for a player is:
//!   1. `GET /connect/{room}/{player}` → find the room, admission check
//!   2. WebSocket upgrade, attach to the room
//!   3. Loop: receive frames → decode → hand to the room
//!   4. On exit, tell the room this connection is gone
//!
//! `POST /create/{room}` answers 201 or 409 and never upgrades.

use std::sync::Arc;

use axum::Router;
use axum::extract::ws::{WebSocket, WebSocketUpgrade};
use axum::extract::ws::rejection::WebSocketUpgradeRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use cardroom_protocol::{ClientMessage, Codec, PlayerId, RoomId};
use cardroom_room::{Room, TableEngine};
use cardroom_transport::{Connection, WebSocketConnection};

use crate::CardroomError;
use crate::server::ServerState;

type RoomHandle<E> = Arc<Room<E, WebSocketConnection>>;

/// Builds the router serving both endpoints.
///
/// Path segments are percent-decoded before they become ids.
pub(crate) fn router<E: TableEngine>(state: Arc<ServerState<E>>) -> Router {
    Router::new()
        .route("/create/{room_id}", post(create_room::<E>))
        .route("/connect/{room_id}/{player_id}", get(connect_player::<E>))
        .with_state(state)
}

async fn create_room<E: TableEngine>(
    State(state): State<Arc<ServerState<E>>>,
    Path(room_id): Path<RoomId>,
) -> Result<StatusCode, CardroomError> {
    state.rooms.create_room(room_id).await?;
    Ok(StatusCode::CREATED)
}

/// Admits a player and upgrades the request.
///
/// Rejections are answered as plain HTTP so the client never sees a
/// socket that opens and immediately closes.
async fn connect_player<E: TableEngine>(
    State(state): State<Arc<ServerState<E>>>,
    Path((room_id, player_id)): Path<(RoomId, PlayerId)>,
    upgrade: Result<WebSocketUpgrade, WebSocketUpgradeRejection>,
) -> Result<Response, CardroomError> {
    let room = if state.config.create_rooms_on_connect {
        state.rooms.get_or_create(&room_id).await
    } else {
        state.rooms.require(&room_id).await.inspect_err(|_| {
            tracing::debug!(%room_id, %player_id, "connect to unknown room");
        })?
    };

    if let Err(e) = room.check_admission(&player_id).await {
        tracing::info!(%room_id, %player_id, error = %e, "connect rejected");
        return Err(e.into());
    }

    let upgrade = match upgrade {
        Ok(upgrade) => upgrade,
        Err(rejection) => {
            tracing::debug!(%room_id, %player_id, %rejection, "not a WebSocket request");
            return Ok(rejection.into_response());
        }
    };

    Ok(upgrade.on_upgrade(move |socket| {
        serve_connection(socket, room, state, player_id)
    }))
}

/// Attaches the upgraded socket and runs its reader until it ends.
async fn serve_connection<E: TableEngine>(
    socket: WebSocket,
    room: RoomHandle<E>,
    state: Arc<ServerState<E>>,
    player_id: PlayerId,
) {
    let conn = Arc::new(WebSocketConnection::new(socket));
    let conn_id = conn.id();

    // Another connect for the same id may have won the race since the
    // admission check.
    if let Err(e) = room.connect(player_id.clone(), Arc::clone(&conn)).await {
        tracing::info!(room_id = %room.id(), %player_id, %conn_id, error = %e, "connect lost race");
        let _ = conn.close_with_policy(&e.to_string()).await;
        return;
    }

    read_loop(&room, &conn, &state, &player_id).await;

    room.disconnect(&player_id, Some(conn_id)).await;
    let _ = conn.close().await;
}

/// Feeds every decodable frame to the room until the connection ends.
async fn read_loop<E: TableEngine>(
    room: &Room<E, WebSocketConnection>,
    conn: &WebSocketConnection,
    state: &ServerState<E>,
    player_id: &PlayerId,
) {
    let max_failures = state.config.room.retry.max_retries;
    let mut failures: u32 = 0;

    loop {
        let data = match conn.recv().await {
            Ok(Some(data)) => {
                failures = 0;
                data
            }
            Ok(None) => {
                tracing::info!(%player_id, "connection closed cleanly");
                break;
            }
            Err(e) if e.is_closed() => {
                tracing::info!(%player_id, error = %e, "connection lost");
                break;
            }
            Err(e) => {
                failures += 1;
                if failures > max_failures {
                    tracing::info!(%player_id, error = %e, failures, "giving up on reads");
                    break;
                }
                tracing::debug!(%player_id, error = %e, failures, "recv error");
                continue;
            }
        };

        let msg: ClientMessage = match state.codec.decode(&data) {
            Ok(msg) => msg,
            Err(e) => {
                tracing::debug!(%player_id, error = %e, "failed to decode message");
                continue;
            }
        };

        room.handle(player_id, conn.id(), msg).await;
    }
}
