//! # Cardroom
//!
//! Room session coordinator for a multiplayer card-game server.
//!
//! Clients reach a room over WebSocket at `/connect/{room}/{player}`. The
//! server admits them into the room's player registry, routes their
//! messages to the room, starts a hand once enough players are ready,
//! and sends every viewer its own redacted view of the table. The rules
//! of the game live behind [`TableEngine`](cardroom_room::TableEngine),
//! which the embedding binary supplies.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use cardroom::prelude::*;
//!
//! // Implement TableEngine for your game, then:
//! // cardroom::logging::init();
//! // let server = CardroomServer::builder()
//! //     .config(ServerConfig::from_env()?)
//! //     .build::<MyEngine>()
//! //     .await?;
//! // server.run().await
//! ```

pub mod config;
mod error;
mod handler;
pub mod logging;
mod server;

pub use config::{ConfigError, ServerConfig};
pub use error::CardroomError;
pub use server::{CardroomServer, CardroomServerBuilder, Rooms};

/// Everything an embedding binary usually needs.
pub mod prelude {
    pub use crate::{
        CardroomError, CardroomServer, CardroomServerBuilder, ServerConfig,
    };
    pub use cardroom_protocol::{
        Action, ActionKind, Card, ClientMessage, HandResult, PlayerId,
        RoomId, Seat, ServerMessage, TableState, TableStatus, TableUpdate,
    };
    pub use cardroom_room::{
        EngineError, RejoinPolicy, RetryPolicy, RoomConfig, RoomRegistry,
        TableConfig, TableEngine,
    };
}
