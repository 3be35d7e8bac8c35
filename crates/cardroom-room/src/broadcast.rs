//! Delivery to one recipient with bounded retry.

use cardroom_transport::{Connection, TransportError};

use crate::RetryPolicy;

/// Sends `bytes` over `conn`, retrying transient failures with
/// exponential backoff.
///
/// A closed-by-peer failure stops immediately. Running out of retries
/// force-closes the connection. Either way the last error is returned and
/// the caller starts disconnection recovery.
pub async fn send_with_retry<C: Connection>(
    conn: &C,
    bytes: &[u8],
    retry: &RetryPolicy,
) -> Result<(), TransportError> {
    let mut retries = 0;
    loop {
        let err = match conn.send(bytes).await {
            Ok(()) => return Ok(()),
            Err(e) => e,
        };

        if err.is_closed() {
            tracing::debug!(conn = %conn.id(), error = %err, "peer closed during send");
            let _ = conn.close().await;
            return Err(err);
        }
        if retries >= retry.max_retries {
            tracing::warn!(
                conn = %conn.id(),
                error = %err,
                retries,
                "giving up on send, closing connection"
            );
            let _ = conn.close().await;
            return Err(err);
        }

        let delay = retry.backoff(retries);
        tracing::debug!(
            conn = %conn.id(),
            error = %err,
            ?delay,
            "send failed, retrying"
        );
        tokio::time::sleep(delay).await;
        retries += 1;
    }
}
