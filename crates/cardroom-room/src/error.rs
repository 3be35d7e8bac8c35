//! Error types for the room layer.

use cardroom_protocol::RoomId;
use cardroom_session::SessionError;

/// Errors that can occur during room operations.
#[derive(Debug, thiserror::Error)]
pub enum RoomError {
    /// The room does not exist.
    #[error("room {0} not found")]
    NotFound(RoomId),

    /// A room with this id was already created.
    #[error("room {0} already exists")]
    AlreadyExists(RoomId),

    /// The player registry refused the connection.
    #[error(transparent)]
    Session(#[from] SessionError),
}

impl RoomError {
    /// Returns `true` if the error means "no free seat", as opposed to a
    /// duplicate connection or a missing room.
    pub fn is_room_full(&self) -> bool {
        matches!(self, Self::Session(SessionError::RoomFull(_)))
    }
}
