//! WebSocket connections over an upgraded `axum` socket.
//!
//! Routing and the HTTP handshake belong to the `axum` router; this module
//! takes the socket once the upgrade has completed.

use std::io;
use std::sync::atomic::{AtomicU64, Ordering};

use axum::extract::ws::{CloseFrame, Message, WebSocket, close_code};
use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use tokio::sync::Mutex;
use tokio_tungstenite::tungstenite::Error as WsError;
use tokio_tungstenite::tungstenite::error::ProtocolError as WsProtocolError;

use crate::{Connection, ConnectionId, TransportError};

/// Counter for generating unique connection IDs.
static NEXT_CONNECTION_ID: AtomicU64 = AtomicU64::new(1);

/// A single WebSocket connection.
///
/// The socket is split so that a task blocked in `recv` never holds up a
/// concurrent `send` from another task.
pub struct WebSocketConnection {
    id: ConnectionId,
    sink: Mutex<SplitSink<WebSocket, Message>>,
    stream: Mutex<SplitStream<WebSocket>>,
}

impl WebSocketConnection {
    /// Wraps an upgraded socket and assigns it a fresh [`ConnectionId`].
    pub fn new(socket: WebSocket) -> Self {
        let id = ConnectionId::new(
            NEXT_CONNECTION_ID.fetch_add(1, Ordering::Relaxed),
        );
        tracing::debug!(%id, "accepted WebSocket connection");

        let (sink, stream) = socket.split();
        Self {
            id,
            sink: Mutex::new(sink),
            stream: Mutex::new(stream),
        }
    }

    /// Closes the connection with a policy-violation close frame.
    pub async fn close_with_policy(
        &self,
        reason: &str,
    ) -> Result<(), TransportError> {
        let frame = CloseFrame {
            code: close_code::POLICY,
            reason: reason.to_string().into(),
        };
        self.sink
            .lock()
            .await
            .send(Message::Close(Some(frame)))
            .await
            .map_err(|e| classify(e, true))
    }
}

impl Connection for WebSocketConnection {
    async fn send(&self, data: &[u8]) -> Result<(), TransportError> {
        let msg = Message::Binary(data.to_vec().into());
        self.sink
            .lock()
            .await
            .send(msg)
            .await
            .map_err(|e| classify(e, true))
    }

    async fn recv(&self) -> Result<Option<Vec<u8>>, TransportError> {
        let mut stream = self.stream.lock().await;
        loop {
            match stream.next().await {
                Some(Ok(Message::Binary(data))) => {
                    return Ok(Some(data.to_vec()));
                }
                Some(Ok(Message::Text(text))) => {
                    return Ok(Some(text.as_str().as_bytes().to_vec()));
                }
                Some(Ok(Message::Close(frame))) => {
                    if let Some(frame) = frame {
                        tracing::debug!(
                            id = %self.id,
                            code = frame.code,
                            "peer sent close frame"
                        );
                    }
                    return Ok(None);
                }
                None => return Ok(None),
                Some(Ok(_)) => continue, // ping/pong
                Some(Err(e)) => return Err(classify(e, false)),
            }
        }
    }

    async fn close(&self) -> Result<(), TransportError> {
        self.sink
            .lock()
            .await
            .close()
            .await
            .map_err(|e| classify(e, true))
    }

    fn id(&self) -> ConnectionId {
        self.id
    }
}

/// Maps an `axum` socket error onto the typed transport taxonomy.
///
/// `axum` boxes the underlying `tungstenite` error, so it is unwrapped
/// and classified by type.
fn classify(err: axum::Error, sending: bool) -> TransportError {
    let inner = match err.into_inner().downcast::<WsError>() {
        Ok(ws) => return classify_ws(*ws, sending),
        Err(inner) => inner,
    };
    match inner.downcast::<io::Error>() {
        Ok(io) => TransportError::from_io(*io, sending),
        Err(other) => failed(io::Error::other(other), sending),
    }
}

fn classify_ws(err: WsError, sending: bool) -> TransportError {
    match err {
        e @ (WsError::ConnectionClosed | WsError::AlreadyClosed) => {
            TransportError::ConnectionClosed(e.to_string())
        }
        WsError::Protocol(WsProtocolError::ResetWithoutClosingHandshake) => {
            TransportError::ConnectionClosed(
                "reset without closing handshake".into(),
            )
        }
        WsError::Io(io) => TransportError::from_io(io, sending),
        other => failed(io::Error::other(other), sending),
    }
}

fn failed(io: io::Error, sending: bool) -> TransportError {
    if sending {
        TransportError::SendFailed(io)
    } else {
        TransportError::ReceiveFailed(io)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::FailureKind;

    #[test]
    fn test_classify_closed_errors() {
        assert!(classify(axum::Error::new(WsError::ConnectionClosed), true).is_closed());
        assert!(classify(axum::Error::new(WsError::AlreadyClosed), false).is_closed());
        assert!(
            classify(
                axum::Error::new(WsError::Protocol(
                    WsProtocolError::ResetWithoutClosingHandshake
                )),
                false
            )
            .is_closed()
        );
    }

    #[test]
    fn test_classify_io_errors() {
        let pipe = io::Error::from(io::ErrorKind::BrokenPipe);
        assert!(classify(axum::Error::new(WsError::Io(pipe)), true).is_closed());

        let reset = io::Error::from(io::ErrorKind::ConnectionReset);
        assert!(classify(axum::Error::new(reset), false).is_closed());

        let other = io::Error::other("disk on fire");
        assert_eq!(
            classify(axum::Error::new(WsError::Io(other)), true).kind(),
            FailureKind::Other
        );
    }

    #[test]
    fn test_classify_unknown_error_keeps_direction() {
        let err = classify(axum::Error::new("odd frame"), true);
        assert!(matches!(err, TransportError::SendFailed(_)));

        let err = classify(axum::Error::new("odd frame"), false);
        assert!(matches!(err, TransportError::ReceiveFailed(_)));
    }
}
