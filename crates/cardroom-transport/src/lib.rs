//! Transport abstraction layer for Cardroom.
//!
//! Provides the [`Connection`] trait that the session coordinator is
//! written against, and a WebSocket implementation that wraps sockets
//! upgraded by an `axum` router.
//!
//! Failures are reported as a typed [`TransportError`] whose
//! [`kind`](TransportError::kind) tells the caller whether the peer is gone
//! ([`FailureKind::ClosedByPeer`]) or the failure may be transient.
//!
//! # Feature Flags
//!
//! - `websocket` (default): WebSocket connections via `axum`'s `ws` upgrade

mod error;
#[cfg(feature = "websocket")]
mod websocket;

pub use error::{FailureKind, TransportError, classify_io};
#[cfg(feature = "websocket")]
pub use websocket::WebSocketConnection;

use std::fmt;
use std::future::Future;

/// Opaque identifier for a connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(u64);

impl ConnectionId {
    /// Creates a new `ConnectionId` from a raw `u64`.
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the underlying `u64` value.
    pub fn into_inner(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

/// A single live connection that can send and receive bytes.
///
/// Both calls block the calling task until they complete; neither carries
/// its own timeout.
pub trait Connection: Send + Sync + 'static {
    /// Sends one message to the remote peer.
    fn send(
        &self,
        data: &[u8],
    ) -> impl Future<Output = Result<(), TransportError>> + Send;

    /// Receives the next message from the remote peer.
    ///
    /// Returns `Ok(None)` when the connection is cleanly closed.
    fn recv(
        &self,
    ) -> impl Future<Output = Result<Option<Vec<u8>>, TransportError>> + Send;

    /// Closes the connection.
    fn close(&self) -> impl Future<Output = Result<(), TransportError>> + Send;

    /// Returns the unique identifier for this connection.
    fn id(&self) -> ConnectionId;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connection_id_new_and_into_inner() {
        let id = ConnectionId::new(42);
        assert_eq!(id.into_inner(), 42);
    }

    #[test]
    fn test_connection_id_display() {
        let id = ConnectionId::new(7);
        assert_eq!(id.to_string(), "conn-7");
    }

    #[test]
    fn test_connection_id_equality() {
        assert_eq!(ConnectionId::new(1), ConnectionId::new(1));
        assert_ne!(ConnectionId::new(1), ConnectionId::new(2));
    }
}
