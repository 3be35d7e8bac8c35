//! Codec trait and implementations for serializing/deserializing messages.
//!
//! The coordinator doesn't care how messages become bytes; it only needs
//! something that implements [`Codec`]. [`JsonCodec`] is the one browser
//! clients speak.

use serde::{Serialize, de::DeserializeOwned};

use crate::ProtocolError;

/// A codec that can encode Rust types to bytes and decode bytes back.
///
/// `DeserializeOwned` (vs plain `Deserialize`) means the decoded value
/// owns all its data, so the receive buffer can be dropped right away.
pub trait Codec: Send + Sync + 'static {
    /// Serializes a value into bytes.
    ///
    /// # Errors
    /// Returns `ProtocolError::Encode` if serialization fails.
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError>;

    /// Deserializes bytes back into a value.
    ///
    /// # Errors
    /// Returns `ProtocolError::Decode` if the bytes are malformed or name
    /// a message kind this side doesn't know.
    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError>;
}

/// A [`Codec`] that uses JSON (via `serde_json`).
///
/// ## Example
///
/// ```rust
/// use cardroom_protocol::{ClientMessage, Codec, JsonCodec};
///
/// let codec = JsonCodec;
/// let bytes = codec.encode(&ClientMessage::Ready).unwrap();
/// let decoded: ClientMessage = codec.decode(&bytes).unwrap();
/// assert_eq!(decoded, ClientMessage::Ready);
/// ```
#[cfg(feature = "json")]
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

#[cfg(feature = "json")]
impl Codec for JsonCodec {
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError> {
        serde_json::to_vec(value).map_err(ProtocolError::Encode)
    }

    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError> {
        serde_json::from_slice(data).map_err(ProtocolError::Decode)
    }
}

#[cfg(all(test, feature = "json"))]
mod tests {
    use super::*;
    use crate::{ClientMessage, PlayerId, ServerMessage};

    #[test]
    fn test_json_codec_decodes_client_message() {
        let msg: ClientMessage = JsonCodec.decode(br#"{"type":"BuyIn"}"#).unwrap();
        assert_eq!(msg, ClientMessage::BuyIn);
    }

    #[test]
    fn test_json_codec_encodes_server_message() {
        let bytes = JsonCodec
            .encode(&ServerMessage::PlayerConnected {
                player_id: PlayerId::from("zed"),
            })
            .unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert!(text.contains(r#""type":"PlayerConnected""#));
        assert!(text.contains(r#""player_id":"zed""#));
    }

    #[test]
    fn test_json_codec_decode_garbage_fails() {
        let result: Result<ClientMessage, _> = JsonCodec.decode(b"not json");
        assert!(matches!(result, Err(ProtocolError::Decode(_))));
    }
}
