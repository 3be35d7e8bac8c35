/// Coarse classification of a transport failure.
///
/// Callers decide how to react from this value alone: a peer that went
/// away is never worth retrying, while other failures may clear up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// The peer reset, hung up, or sent a going-away close.
    ClosedByPeer,
    /// The operation did not complete in time.
    Timeout,
    /// Anything else.
    Other,
}

/// Errors that can occur in the transport layer.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The connection was closed by the peer or is already shut.
    #[error("connection closed: {0}")]
    ConnectionClosed(String),

    /// The operation timed out.
    #[error("timed out: {0}")]
    Timeout(String),

    /// Sending data failed.
    #[error("send failed: {0}")]
    SendFailed(#[source] std::io::Error),

    /// Receiving data failed.
    #[error("receive failed: {0}")]
    ReceiveFailed(#[source] std::io::Error),

}

impl TransportError {
    /// Classifies this error for retry decisions.
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::ConnectionClosed(_) => FailureKind::ClosedByPeer,
            Self::Timeout(_) => FailureKind::Timeout,
            Self::SendFailed(e) | Self::ReceiveFailed(e) => {
                classify_io(e.kind())
            }
        }
    }

    /// Shorthand for `kind() == FailureKind::ClosedByPeer`.
    pub fn is_closed(&self) -> bool {
        self.kind() == FailureKind::ClosedByPeer
    }

    /// Builds an error from an I/O failure, routing closed-connection
    /// kinds to [`TransportError::ConnectionClosed`].
    pub fn from_io(err: std::io::Error, sending: bool) -> Self {
        match classify_io(err.kind()) {
            FailureKind::ClosedByPeer => {
                Self::ConnectionClosed(err.to_string())
            }
            FailureKind::Timeout => Self::Timeout(err.to_string()),
            FailureKind::Other if sending => Self::SendFailed(err),
            FailureKind::Other => Self::ReceiveFailed(err),
        }
    }
}

/// Maps an I/O error kind onto a [`FailureKind`].
pub fn classify_io(kind: std::io::ErrorKind) -> FailureKind {
    use std::io::ErrorKind;
    match kind {
        ErrorKind::BrokenPipe
        | ErrorKind::ConnectionReset
        | ErrorKind::ConnectionAborted
        | ErrorKind::UnexpectedEof
        | ErrorKind::NotConnected => FailureKind::ClosedByPeer,
        ErrorKind::TimedOut | ErrorKind::WouldBlock => FailureKind::Timeout,
        _ => FailureKind::Other,
    }
}
