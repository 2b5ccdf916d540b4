//! Player accounts.
//!
//! This module contains:
//! - ResourceHand for resource card counts
//! - Development card kinds, the deck and per-kind card counts
//! - Remaining piece supply
//! - Fixed costs and the Player account that spends them

use crate::board::{Piece, PlayerId, Resource};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Development card types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DevelopmentCard {
    /// Move the robber and steal; counts toward largest army
    Knight,
    /// Worth 1 VP while held
    VictoryPoint,
    /// Place 2 roads for free
    RoadBuilding,
    /// Take any 2 resources from the bank
    YearOfPlenty,
    /// Every other player hands over all of one resource
    Monopoly,
}

impl DevelopmentCard {
    pub const ALL: [DevelopmentCard; 5] = [
        DevelopmentCard::Knight,
        DevelopmentCard::VictoryPoint,
        DevelopmentCard::RoadBuilding,
        DevelopmentCard::YearOfPlenty,
        DevelopmentCard::Monopoly,
    ];

    /// The fixed 25-card deck, unshuffled
    pub fn standard_deck() -> Vec<DevelopmentCard> {
        let mut deck = Vec::with_capacity(25);
        deck.extend(std::iter::repeat(DevelopmentCard::Knight).take(14));
        deck.extend(std::iter::repeat(DevelopmentCard::VictoryPoint).take(5));
        deck.extend(std::iter::repeat(DevelopmentCard::RoadBuilding).take(2));
        deck.extend(std::iter::repeat(DevelopmentCard::YearOfPlenty).take(2));
        deck.extend(std::iter::repeat(DevelopmentCard::Monopoly).take(2));
        deck
    }

    /// The standard deck in random order; draw with `pop`
    pub fn shuffled_deck<R: Rng>(rng: &mut R) -> Vec<DevelopmentCard> {
        let mut deck = Self::standard_deck();
        deck.shuffle(rng);
        deck
    }

    /// Victory point cards are never played
    pub fn is_playable(&self) -> bool {
        !matches!(self, DevelopmentCard::VictoryPoint)
    }
}

/// A hand of resources
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceHand {
    #[serde(default)]
    pub brick: u32,
    #[serde(default)]
    pub lumber: u32,
    #[serde(default)]
    pub ore: u32,
    #[serde(default)]
    pub grain: u32,
    #[serde(default)]
    pub wool: u32,
}

impl ResourceHand {
    /// Create an empty hand
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_amounts(brick: u32, lumber: u32, ore: u32, grain: u32, wool: u32) -> Self {
        Self {
            brick,
            lumber,
            ore,
            grain,
            wool,
        }
    }

    /// Total number of resource cards
    pub fn total(&self) -> u32 {
        self.brick + self.lumber + self.ore + self.grain + self.wool
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    pub fn get(&self, resource: Resource) -> u32 {
        match resource {
            Resource::Brick => self.brick,
            Resource::Lumber => self.lumber,
            Resource::Ore => self.ore,
            Resource::Grain => self.grain,
            Resource::Wool => self.wool,
        }
    }

    fn slot(&mut self, resource: Resource) -> &mut u32 {
        match resource {
            Resource::Brick => &mut self.brick,
            Resource::Lumber => &mut self.lumber,
            Resource::Ore => &mut self.ore,
            Resource::Grain => &mut self.grain,
            Resource::Wool => &mut self.wool,
        }
    }

    pub fn add(&mut self, resource: Resource, amount: u32) {
        *self.slot(resource) += amount;
    }

    /// Add another hand to this one
    pub fn add_hand(&mut self, other: &ResourceHand) {
        for resource in Resource::ALL {
            self.add(resource, other.get(resource));
        }
    }

    /// Whether every count in `cost` is covered
    pub fn can_afford(&self, cost: &ResourceHand) -> bool {
        Resource::ALL
            .iter()
            .all(|r| self.get(*r) >= cost.get(*r))
    }

    /// Subtract a cost. Callers check `can_afford` first.
    pub fn subtract(&mut self, cost: &ResourceHand) {
        debug_assert!(self.can_afford(cost), "subtracting more than held");
        for resource in Resource::ALL {
            let slot = self.slot(resource);
            *slot = slot.saturating_sub(cost.get(resource));
        }
    }

    /// Empty one resource slot, returning how many cards it held
    pub fn take_all(&mut self, resource: Resource) -> u32 {
        std::mem::take(self.slot(resource))
    }

    /// Remove one card chosen uniformly at random
    pub fn steal_random<R: Rng>(&mut self, rng: &mut R) -> Option<Resource> {
        let total = self.total();
        if total == 0 {
            return None;
        }
        let mut pick = rng.gen_range(0..total);
        for resource in Resource::ALL {
            let held = self.get(resource);
            if pick < held {
                *self.slot(resource) -= 1;
                return Some(resource);
            }
            pick -= held;
        }
        None
    }
}

/// Development card counts by kind
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardHand {
    pub knight: u32,
    pub victory_point: u32,
    pub road_building: u32,
    pub year_of_plenty: u32,
    pub monopoly: u32,
}

impl CardHand {
    pub fn get(&self, card: DevelopmentCard) -> u32 {
        match card {
            DevelopmentCard::Knight => self.knight,
            DevelopmentCard::VictoryPoint => self.victory_point,
            DevelopmentCard::RoadBuilding => self.road_building,
            DevelopmentCard::YearOfPlenty => self.year_of_plenty,
            DevelopmentCard::Monopoly => self.monopoly,
        }
    }

    fn slot(&mut self, card: DevelopmentCard) -> &mut u32 {
        match card {
            DevelopmentCard::Knight => &mut self.knight,
            DevelopmentCard::VictoryPoint => &mut self.victory_point,
            DevelopmentCard::RoadBuilding => &mut self.road_building,
            DevelopmentCard::YearOfPlenty => &mut self.year_of_plenty,
            DevelopmentCard::Monopoly => &mut self.monopoly,
        }
    }

    pub fn add(&mut self, card: DevelopmentCard) {
        *self.slot(card) += 1;
    }

    /// Remove one card of this kind; false if none held
    pub fn remove(&mut self, card: DevelopmentCard) -> bool {
        let slot = self.slot(card);
        if *slot == 0 {
            return false;
        }
        *slot -= 1;
        true
    }

    /// Move every card from `other` into this hand
    pub fn absorb(&mut self, other: &mut CardHand) {
        for card in DevelopmentCard::ALL {
            *self.slot(card) += std::mem::take(other.slot(card));
        }
    }

    pub fn total(&self) -> u32 {
        DevelopmentCard::ALL.iter().map(|c| self.get(*c)).sum()
    }
}

/// Pieces a player still has in supply
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PieceSupply {
    pub roads: u32,
    pub towns: u32,
    pub cities: u32,
}

impl Default for PieceSupply {
    fn default() -> Self {
        Self {
            roads: 15,
            towns: 5,
            cities: 4,
        }
    }
}

impl PieceSupply {
    pub fn get(&self, piece: Piece) -> u32 {
        match piece {
            Piece::Road => self.roads,
            Piece::Town => self.towns,
            Piece::City => self.cities,
        }
    }

    fn slot(&mut self, piece: Piece) -> &mut u32 {
        match piece {
            Piece::Road => &mut self.roads,
            Piece::Town => &mut self.towns,
            Piece::City => &mut self.cities,
        }
    }
}

/// Fixed costs
pub mod costs {
    use super::ResourceHand;
    use crate::board::Piece;

    /// 1 brick, 1 lumber
    pub fn road() -> ResourceHand {
        ResourceHand::with_amounts(1, 1, 0, 0, 0)
    }

    /// 1 brick, 1 lumber, 1 grain, 1 wool
    pub fn town() -> ResourceHand {
        ResourceHand::with_amounts(1, 1, 0, 1, 1)
    }

    /// 3 ore, 2 grain
    pub fn city() -> ResourceHand {
        ResourceHand::with_amounts(0, 0, 3, 2, 0)
    }

    /// 1 ore, 1 grain, 1 wool
    pub fn development_card() -> ResourceHand {
        ResourceHand::with_amounts(0, 0, 1, 1, 1)
    }

    pub fn for_piece(piece: Piece) -> ResourceHand {
        match piece {
            Piece::Road => road(),
            Piece::Town => town(),
            Piece::City => city(),
        }
    }
}

/// A single player's account
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub resources: ResourceHand,
    pub pieces: PieceSupply,
    /// Development cards playable this turn
    pub cards: CardHand,
    /// Cards bought this turn, playable from the owner's next turn
    pub pending: CardHand,
    /// Knights played (army size)
    pub knights: u32,
}

impl Player {
    pub fn new(id: PlayerId) -> Self {
        Self {
            id,
            resources: ResourceHand::new(),
            pieces: PieceSupply::default(),
            cards: CardHand::default(),
            pending: CardHand::default(),
            knights: 0,
        }
    }

    pub fn has_resources(&self, cost: &ResourceHand) -> bool {
        self.resources.can_afford(cost)
    }

    pub fn spend_resources(&mut self, cost: &ResourceHand) {
        self.resources.subtract(cost);
    }

    pub fn gain_resources(&mut self, hand: &ResourceHand) {
        self.resources.add_hand(hand);
    }

    /// Resources cover the cost and a piece of this kind remains
    pub fn can_afford(&self, piece: Piece) -> bool {
        self.has_resources(&costs::for_piece(piece)) && self.pieces.get(piece) > 0
    }

    /// Pay for and take one piece. A city hands its town back to supply.
    pub fn build(&mut self, piece: Piece) {
        self.spend_resources(&costs::for_piece(piece));
        self.take_piece(piece);
    }

    /// Take a piece from supply without paying (setup and free roads)
    pub fn take_piece(&mut self, piece: Piece) {
        let slot = self.pieces.slot(piece);
        *slot = slot.saturating_sub(1);
        if piece == Piece::City {
            self.pieces.towns += 1;
        }
    }

    pub fn can_buy_card(&self) -> bool {
        self.has_resources(&costs::development_card())
    }

    /// Pay for a drawn card; it stays pending until `end_turn`
    pub fn buy_card(&mut self, card: DevelopmentCard) {
        self.spend_resources(&costs::development_card());
        self.pending.add(card);
    }

    /// Remove a playable card from hand. Playing a knight grows the army.
    pub fn play_card(&mut self, card: DevelopmentCard) -> bool {
        if !card.is_playable() || !self.cards.remove(card) {
            return false;
        }
        if card == DevelopmentCard::Knight {
            self.knights += 1;
        }
        true
    }

    /// Pending cards become playable
    pub fn end_turn(&mut self) {
        self.cards.absorb(&mut self.pending);
    }

    /// Victory point cards held, pending ones included
    pub fn victory_cards(&self) -> u32 {
        self.cards.victory_point + self.pending.victory_point
    }
}
