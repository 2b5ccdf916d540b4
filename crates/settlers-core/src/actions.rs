//! Commands players send and the events the engine emits in response.
//!
//! Both are tagged by a `kind` field on the wire, e.g.
//! `{"kind": "build", "type": "road", "x": 3, "y": 3, "d": 0}`.

use crate::board::{BoardSnapshot, Piece, PlayerId, Resource};
use crate::game::GameError;
use crate::player::{CardHand, DevelopmentCard, PieceSupply, ResourceHand};
use serde::{Deserialize, Serialize};

/// Everything a player can ask the engine to do
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Command {
    // ==================== Building ====================
    /// Place a road, town or city at `(x, y, d)`
    Build {
        #[serde(rename = "type")]
        piece: Piece,
        x: i32,
        y: i32,
        d: u8,
    },
    /// Draw a development card from the deck
    BuyDevelopCard,
    /// Play a development card. Year of Plenty reads `resources` (exactly two
    /// cards); Monopoly reads `resource`.
    PlayDevelopCard {
        card: DevelopmentCard,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        resources: Option<ResourceHand>,
        #[serde(default, alias = "terrain", skip_serializing_if = "Option::is_none")]
        resource: Option<Resource>,
    },
    /// Pass the turn to the next player, who rolls
    EndTurn,

    // ==================== Trading ====================
    /// Put resources on the table. The active player's offer opens a trade.
    OfferTrade { offer: ResourceHand },
    /// Active player accepts another player's standing offer
    ConfirmTrade {
        #[serde(rename = "withPlayer")]
        with_player: PlayerId,
    },
    /// Active player abandons the trade
    CancelTrade,

    // ==================== Robber ====================
    /// Give up half of an over-limit hand
    Discard { resources: ResourceHand },
    /// Move the robber to tile `(x, y)`
    MoveRobber { x: i32, y: i32 },
    /// Take a random card from a player next to the robber
    Steal {
        #[serde(rename = "targetPlayer")]
        target_player: PlayerId,
    },
}

impl Command {
    /// Parse a JSON command. Anything unrecognized is an unknown command.
    pub fn from_json(text: &str) -> Result<Self, GameError> {
        serde_json::from_str(text).map_err(|err| {
            tracing::debug!(%err, "unparseable command");
            GameError::UnknownCommand
        })
    }

    /// Wire name, for logging
    pub fn kind(&self) -> &'static str {
        match self {
            Command::Build { .. } => "build",
            Command::BuyDevelopCard => "buyDevelopCard",
            Command::PlayDevelopCard { .. } => "playDevelopCard",
            Command::EndTurn => "endTurn",
            Command::OfferTrade { .. } => "offerTrade",
            Command::ConfirmTrade { .. } => "confirmTrade",
            Command::CancelTrade => "cancelTrade",
            Command::Discard { .. } => "discard",
            Command::MoveRobber { .. } => "moveRobber",
            Command::Steal { .. } => "steal",
        }
    }
}

/// Everything the engine tells players
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Event {
    /// Match begins; tells each player their seat (to one)
    Start {
        board: BoardSnapshot,
        player: PlayerId,
    },
    /// A new turn (or setup placement) begins
    Turn {
        player: PlayerId,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        dice: Option<[u8; 2]>,
        #[serde(rename = "isSetupComplete")]
        setup_complete: bool,
    },
    /// The recipient's own hand (to one)
    Resources {
        resources: ResourceHand,
        pieces: PieceSupply,
        cards: CardHand,
        pending: CardHand,
    },
    /// A piece was placed
    Build {
        #[serde(rename = "type")]
        piece: Piece,
        x: i32,
        y: i32,
        d: u8,
        player: PlayerId,
    },
    TradeOffer {
        offer: ResourceHand,
        player: PlayerId,
    },
    /// Trade closed, by exchange with `withPlayer` or by cancellation
    TradeResolved {
        #[serde(
            rename = "withPlayer",
            default,
            skip_serializing_if = "Option::is_none"
        )]
        with_player: Option<PlayerId>,
    },
    RobberMoved { x: i32, y: i32 },
    /// Legal steal candidates (to the active player)
    StealTargets { targets: Vec<PlayerId> },
    /// A card changed hands; which one is only visible in the two hands
    ResourceStolen { thief: PlayerId, victim: PlayerId },
    /// Discard accepted (to one)
    DiscardAck,
    CardBought { player: PlayerId },
    CardPlayed {
        player: PlayerId,
        card: DevelopmentCard,
    },
    LongestRoad {
        #[serde(default)]
        player: Option<PlayerId>,
        length: u32,
    },
    LargestArmy {
        #[serde(default)]
        player: Option<PlayerId>,
        size: u32,
    },
    /// A command was rejected (to one)
    Error { reason: String },
    GameEnded { winner: PlayerId },
}

impl Event {
    pub fn error(err: &GameError) -> Self {
        Event::Error {
            reason: err.reason().to_string(),
        }
    }
}

/// Who should receive an event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Recipient {
    All,
    Player(PlayerId),
}

/// An event addressed to its recipients
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Outbound {
    pub to: Recipient,
    pub event: Event,
}

impl Outbound {
    pub fn all(event: Event) -> Self {
        Self {
            to: Recipient::All,
            event,
        }
    }

    pub fn to(player: PlayerId, event: Event) -> Self {
        Self {
            to: Recipient::Player(player),
            event,
        }
    }

    /// Whether `player` should see this event
    pub fn reaches(&self, player: PlayerId) -> bool {
        match self.to {
            Recipient::All => true,
            Recipient::Player(p) => p == player,
        }
    }
}
