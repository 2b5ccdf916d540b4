//! Settlers - a hex-board trading game engine
//!
//! This crate provides the core rules for a four-player match:
//! - Hex coordinate system with canonical vertex and edge addresses
//! - Board generation, placement rules, production and the robber
//! - Player hands, piece supplies and development cards
//! - Longest road and largest army
//! - Turn state machine with setup, play, trade and robber phases
//!
//! # Architecture
//!
//! The engine does no I/O. A [`Session`] consumes [`Command`]s tagged with the
//! sending seat and returns [`Outbound`] events addressed to one seat or to
//! everyone. Transport and matchmaking live in the server crate.
//!
//! # Modules
//!
//! - [`hex`]: Coordinate system for tiles, vertices and edges
//! - [`board`]: Tiles, pieces, placement validation and production
//! - [`player`]: Resource hands, card hands and build costs
//! - [`roads`]: Longest road search and award
//! - [`actions`]: Wire commands and events
//! - [`game`]: Match state machine

pub mod actions;
pub mod board;
pub mod game;
pub mod hex;
pub mod player;
pub mod roads;

// Re-export commonly used types
pub use actions::{Command, Event, Outbound, Recipient};
pub use board::{Award, Board, BoardSnapshot, Piece, PlayerId, Resource, Stage, Terrain, Tile};
pub use game::{GameError, Phase, Session, PLAYER_COUNT, VICTORY_POINTS_TO_WIN};
pub use hex::{EdgeCoord, EdgeSide, TileCoord, VertexCoord, VertexSide};
pub use player::{CardHand, DevelopmentCard, PieceSupply, Player, ResourceHand};
