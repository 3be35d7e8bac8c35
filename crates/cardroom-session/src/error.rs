//! Error types for the session layer.

use cardroom_protocol::PlayerId;

/// Errors that can occur while admitting or looking up players.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// The player id already has a live connection in this room.
    /// The new handshake must be rejected.
    #[error("player {0} is already seated with a live connection")]
    AlreadySeated(PlayerId),

    /// Every seat is taken and the id is not one of them.
    #[error("room is full ({0} seats)")]
    RoomFull(usize),

    /// No player with this id has ever joined the room.
    #[error("player {0} not found")]
    NotFound(PlayerId),
}
