//! `CardroomServer` builder and serve loop.
//!
//! Ties the layers together: router → handler → room registry → room.

use std::net::SocketAddr;
use std::sync::Arc;

use cardroom_protocol::{JsonCodec, RoomId};
use cardroom_room::{RoomConfig, RoomError, RoomRegistry, TableEngine};
use cardroom_transport::WebSocketConnection;
use tokio::net::TcpListener;

use crate::handler;
use crate::{CardroomError, ServerConfig};

/// The room registry as the server uses it.
pub type Rooms<E> = RoomRegistry<E, WebSocketConnection>;

/// Shared server state passed to each connection handler task.
pub(crate) struct ServerState<E> {
    pub(crate) rooms: Arc<Rooms<E>>,
    pub(crate) config: ServerConfig,
    pub(crate) codec: JsonCodec,
}

/// Builder for configuring and starting a Cardroom server.
///
/// # Example
///
/// ```rust,ignore
/// use cardroom::prelude::*;
///
/// let server = CardroomServer::builder()
///     .bind("0.0.0.0:2222".parse()?)
///     .build::<MyEngine>()
///     .await?;
/// server.run().await
/// ```
#[derive(Debug, Clone, Default)]
pub struct CardroomServerBuilder {
    config: ServerConfig,
}

impl CardroomServerBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the whole configuration, e.g. with
    /// [`ServerConfig::from_env`].
    pub fn config(mut self, config: ServerConfig) -> Self {
        self.config = config;
        self
    }

    /// Sets the address to bind the server to.
    pub fn bind(mut self, addr: SocketAddr) -> Self {
        self.config.bind = addr;
        self
    }

    /// Sets the configuration every room is created with.
    pub fn room_config(mut self, room: RoomConfig) -> Self {
        self.config.room = room;
        self
    }

    /// Enables or disables room creation on first connect.
    pub fn create_rooms_on_connect(mut self, enabled: bool) -> Self {
        self.config.create_rooms_on_connect = enabled;
        self
    }

    /// Adds a room to create at start-up.
    pub fn default_room(mut self, room_id: impl Into<RoomId>) -> Self {
        self.config.default_rooms.push(room_id.into());
        self
    }

    /// Binds the listener and creates the default rooms.
    pub async fn build<E: TableEngine>(self) -> Result<CardroomServer<E>, CardroomError> {
        let listener = TcpListener::bind(self.config.bind).await?;
        let rooms = Arc::new(RoomRegistry::new(self.config.room.clone()));

        for room_id in &self.config.default_rooms {
            match rooms.create_room(room_id.clone()).await {
                Ok(_) => {}
                Err(RoomError::AlreadyExists(id)) => {
                    tracing::warn!(room_id = %id, "default room listed twice");
                }
                Err(e) => return Err(e.into()),
            }
        }

        let state = Arc::new(ServerState {
            rooms,
            config: self.config,
            codec: JsonCodec,
        });

        Ok(CardroomServer { listener, state })
    }
}

/// A bound Cardroom server.
///
/// Call [`run()`](Self::run) to start accepting connections.
pub struct CardroomServer<E> {
    listener: TcpListener,
    state: Arc<ServerState<E>>,
}

impl<E: TableEngine> CardroomServer<E> {
    /// Creates a new builder.
    pub fn builder() -> CardroomServerBuilder {
        CardroomServerBuilder::new()
    }

    /// Returns the local address the server is bound to.
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// The registry of every room this server hosts.
    pub fn rooms(&self) -> Arc<Rooms<E>> {
        Arc::clone(&self.state.rooms)
    }

    /// Serves both endpoints until the process is terminated.
    ///
    /// Each request runs on its own task, which for a player connection
    /// becomes that connection's dedicated reader.
    pub async fn run(self) -> Result<(), CardroomError> {
        tracing::info!(
            addr = ?self.listener.local_addr().ok(),
            lazy_rooms = self.state.config.create_rooms_on_connect,
            "cardroom server running"
        );

        axum::serve(self.listener, handler::router(self.state)).await?;
        Ok(())
    }
}
