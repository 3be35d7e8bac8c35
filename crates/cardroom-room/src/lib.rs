//! Rooms and the session coordinator for Cardroom.
//!
//! A room pairs a [`PlayerRegistry`](cardroom_session::PlayerRegistry)
//! with an optional live table. Every event that reaches a room is
//! handled under that room's lock, start to finish:
//!
//! ```text
//! handle(player, conn, msg)
//!   ├─ conn is not the player's current connection → dropped
//!   ├─ Ready / SitOut / BuyIn → registry flags → seating → quorum
//!   │                                               └─ deal → publish
//!   └─ PlayerAction → engine.act → echo → publish
//!
//! publish(snapshot)
//!   └─ for each live viewer: redact → send_with_retry
//!                                        └─ failure → recovery queue
//! ```
//!
//! # Key types
//!
//! - [`TableEngine`]: the card-game rules, supplied by the caller
//! - [`RoomRegistry`]: creates and looks up rooms by id
//! - [`Room`]: one room's coordinator
//! - [`RoomConfig`]: seats, table settings, retry and rejoin policy

pub mod broadcast;
mod config;
mod engine;
mod error;
mod manager;
pub mod quorum;
pub mod redact;
mod room;
pub mod seating;
#[cfg(any(test, feature = "test-util"))]
pub mod testing;

pub use config::{BettingLimit, RejoinPolicy, RetryPolicy, RoomConfig, TableConfig};
pub use engine::{EngineError, TableEngine};
pub use error::RoomError;
pub use manager::RoomRegistry;
pub use room::{ActionOrigin, PlayerInfo, Room, RoomInfo};
