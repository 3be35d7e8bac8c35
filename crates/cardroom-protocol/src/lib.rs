//! Wire protocol for Cardroom.
//!
//! This crate defines what clients and the server say to each other:
//!
//! - **Identifiers** ([`RoomId`], [`PlayerId`]).
//! - **Table snapshots** ([`TableState`], [`Seat`], [`HandResult`], ...):
//!   the engine's view of the table, as it travels to clients.
//! - **Messages** ([`ClientMessage`], [`ServerMessage`]).
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]): how messages become bytes.
//!
//! ```text
//! Transport (bytes) → Protocol (messages) → Room (coordinator)
//! ```

mod codec;
mod error;
mod table;
mod types;

pub use codec::Codec;
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use error::ProtocolError;
pub use table::{
    Action, ActionKind, Card, HandResult, Rank, Seat, SeatFlags, Suit,
    TableState, TableStatus,
};
pub use types::{ClientMessage, PlayerId, RoomId, ServerMessage, TableUpdate};
