//! Identifiers and the messages exchanged with clients.
//!
//! Both message enums are internally tagged, so every message on the wire
//! is a JSON object with a `"type"` field naming its kind:
//!
//! ```text
//! { "type": "PlayerAction", "action": { "kind": "Bet", "chips": 50 } }
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::table::{Action, Seat, TableState};

// ---------------------------------------------------------------------------
// Identity types
// ---------------------------------------------------------------------------

/// A player identifier, chosen by the client when it connects.
///
/// Unique within one room only. Serialized as a plain string.
#[derive(
    Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct PlayerId(pub String);

impl PlayerId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for PlayerId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A room identifier, supplied by whoever creates the room.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoomId(pub String);

impl RoomId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for RoomId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ---------------------------------------------------------------------------
// Client → server
// ---------------------------------------------------------------------------

/// Messages a client may send after the handshake.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ClientMessage {
    /// "Deal me in."
    Ready,
    /// "Skip me until I say otherwise."
    SitOut,
    /// "I'm out of chips and want a fresh stack." Implies `Ready`.
    BuyIn,
    /// A betting action for the current hand.
    PlayerAction { action: Action },
}

impl ClientMessage {
    /// Short name used in log lines.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Ready => "Ready",
            Self::SitOut => "SitOut",
            Self::BuyIn => "BuyIn",
            Self::PlayerAction { .. } => "PlayerAction",
        }
    }
}

// ---------------------------------------------------------------------------
// Server → client
// ---------------------------------------------------------------------------

/// A table snapshot addressed to one viewer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableUpdate {
    /// The snapshot, already redacted for the recipient.
    pub table: TableState,
    /// Human-readable summary of a concluded hand.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<String>,
    /// The recipient's own seat, unredacted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub player: Option<Seat>,
}

/// Messages the server sends to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ServerMessage {
    /// Sent once, right after a successful connect.
    Hello,
    /// New table state.
    TableState(TableUpdate),
    /// Echo of an action the engine accepted.
    PlayerAction { player_id: PlayerId, action: Action },
    /// Sent only to a player whose action the engine rejected.
    IllegalAction(TableUpdate),
    PlayerConnected { player_id: PlayerId },
    PlayerDisconnected { player_id: PlayerId },
}

impl ServerMessage {
    /// Short name used in log lines.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Hello => "Hello",
            Self::TableState(_) => "TableState",
            Self::PlayerAction { .. } => "PlayerAction",
            Self::IllegalAction(_) => "IllegalAction",
            Self::PlayerConnected { .. } => "PlayerConnected",
            Self::PlayerDisconnected { .. } => "PlayerDisconnected",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::ActionKind;

    #[test]
    fn test_player_id_serializes_as_plain_string() {
        let json = serde_json::to_string(&PlayerId::from("alice")).unwrap();
        assert_eq!(json, "\"alice\"");
    }

    #[test]
    fn test_ids_display_raw_value() {
        assert_eq!(PlayerId::from("bob").to_string(), "bob");
        assert_eq!(RoomId::from("r1").to_string(), "r1");
    }

    #[test]
    fn test_client_message_unit_variants() {
        let msg: ClientMessage =
            serde_json::from_str(r#"{"type":"Ready"}"#).unwrap();
        assert_eq!(msg, ClientMessage::Ready);

        let msg: ClientMessage =
            serde_json::from_str(r#"{"type":"SitOut"}"#).unwrap();
        assert_eq!(msg, ClientMessage::SitOut);
    }

    #[test]
    fn test_client_message_player_action_json_format() {
        let msg: ClientMessage = serde_json::from_str(
            r#"{"type":"PlayerAction","action":{"kind":"Bet","chips":50}}"#,
        )
        .unwrap();
        assert_eq!(
            msg,
            ClientMessage::PlayerAction {
                action: Action::new(ActionKind::Bet, 50)
            }
        );
    }

    #[test]
    fn test_unknown_client_message_is_rejected() {
        let result: Result<ClientMessage, _> =
            serde_json::from_str(r#"{"type":"Shuffle"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_server_message_json_format() {
        let json = serde_json::to_value(ServerMessage::PlayerDisconnected {
            player_id: PlayerId::from("a"),
        })
        .unwrap();
        assert_eq!(json["type"], "PlayerDisconnected");
        assert_eq!(json["player_id"], "a");

        let json = serde_json::to_value(ServerMessage::Hello).unwrap();
        assert_eq!(json["type"], "Hello");
    }

    #[test]
    fn test_table_update_is_flattened_under_tag() {
        let msg = ServerMessage::TableState(TableUpdate {
            table: TableState::default(),
            result: Some("a wins.".into()),
            player: None,
        });
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["type"], "TableState");
        assert_eq!(json["result"], "a wins.");
        assert!(json.get("player").is_none());

        let back: ServerMessage = serde_json::from_value(json).unwrap();
        assert_eq!(back, msg);
    }
}
