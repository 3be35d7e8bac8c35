//! Unified error type for Cardroom.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use cardroom_protocol::ProtocolError;
use cardroom_room::RoomError;
use cardroom_session::SessionError;
use cardroom_transport::TransportError;

use crate::ConfigError;

/// Top-level error that wraps every layer's error.
///
/// The `#[from]` attributes let `?` convert layer errors automatically.
#[derive(Debug, thiserror::Error)]
pub enum CardroomError {
    /// A transport-level error (send, recv, close).
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A message couldn't be encoded or decoded.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// The player registry refused an operation.
    #[error(transparent)]
    Session(#[from] SessionError),

    /// A room-level error (not found, already exists).
    #[error(transparent)]
    Room(#[from] RoomError),

    /// The configuration couldn't be loaded.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Binding or serving the listener failed.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CardroomError {
    /// The HTTP status a request failing with this error is answered with.
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Room(RoomError::NotFound(_)) => StatusCode::NOT_FOUND,
            Self::Room(e) if e.is_room_full() => StatusCode::LOCKED,
            Self::Room(RoomError::AlreadyExists(_))
            | Self::Room(RoomError::Session(SessionError::AlreadySeated(_))) => {
                StatusCode::CONFLICT
            }
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for CardroomError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        } else {
            tracing::debug!(error = %self, %status, "request refused");
        }
        (status, self.to_string()).into_response()
    }
}
