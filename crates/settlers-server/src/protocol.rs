//! WebSocket protocol messages.
//!
//! Clients send bare engine commands (`{"kind": "endTurn"}` and so on), parsed
//! by `Command::from_json`. The server sends engine events plus a couple of
//! lobby notices, all tagged by `kind`.

use serde::{Deserialize, Serialize};
use settlers_core::{Event, PlayerId};

/// Notices about the lobby and seat connections.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum LobbyMessage {
    /// Queue size changed while waiting for a match
    Waiting { players: usize },

    /// A seat in the match lost its connection
    PlayerDisconnected { player: PlayerId },
}

/// Messages sent from server to client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ServerMessage {
    Game(Event),
    Lobby(LobbyMessage),
}

impl From<Event> for ServerMessage {
    fn from(event: Event) -> Self {
        ServerMessage::Game(event)
    }
}

impl From<LobbyMessage> for ServerMessage {
    fn from(message: LobbyMessage) -> Self {
        ServerMessage::Lobby(message)
    }
}

impl ServerMessage {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}
