//! Board state: terrain, number chits, occupancy and placement rules.
//!
//! This module contains:
//! - Resource and terrain types
//! - Buildings (towns and cities) and roads keyed by canonical addresses
//! - Placement legality for roads, towns and cities
//! - Production and robber queries
//! - The serializable board snapshot sent to clients

use crate::game::GameError;
use crate::hex::{for_each_tile, EdgeCoord, TileCoord, VertexCoord, CENTER};
use crate::player::ResourceHand;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// Player identifier (seat index 0-3)
pub type PlayerId = u8;

/// Rings of land around the centre tile.
pub const LAND_RADIUS: u32 = 2;

/// Road length a player must strictly exceed to claim the longest road bonus.
pub const LONGEST_ROAD_THRESHOLD: u32 = 4;

/// Knights a player must strictly exceed to claim the largest army bonus.
pub const LARGEST_ARMY_THRESHOLD: u32 = 2;

/// Chits in their canonical order. The board rotates this sequence rather
/// than shuffling it.
pub const CHIT_POOL: [u8; 18] = [5, 2, 6, 3, 8, 10, 9, 12, 11, 4, 8, 10, 9, 4, 5, 6, 3, 11];

/// Resource card kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Resource {
    Brick,
    Lumber,
    Ore,
    Grain,
    Wool,
}

impl Resource {
    /// All resource types
    pub const ALL: [Resource; 5] = [
        Resource::Brick,
        Resource::Lumber,
        Resource::Ore,
        Resource::Grain,
        Resource::Wool,
    ];
}

/// What a tile is made of
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Terrain {
    /// Produces a resource when its chit is rolled
    Land(Resource),
    /// Produces nothing; the robber starts here
    Desert,
    /// Border ring, not part of play
    Ocean,
}

impl Terrain {
    /// Tiles drawn for the land area: 1 desert, 3 ore, 3 brick, 4 each of
    /// lumber, grain and wool.
    pub fn standard_pool() -> Vec<Terrain> {
        let mut pool = vec![Terrain::Desert];
        for (resource, count) in [
            (Resource::Ore, 3),
            (Resource::Brick, 3),
            (Resource::Lumber, 4),
            (Resource::Grain, 4),
            (Resource::Wool, 4),
        ] {
            pool.extend(std::iter::repeat(Terrain::Land(resource)).take(count));
        }
        pool
    }
}

/// A single hex tile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tile {
    pub terrain: Terrain,
    /// Production number, 0 for desert and ocean
    pub chit: u8,
}

impl Tile {
    /// Land or desert, anything that is not ocean
    pub fn is_land(&self) -> bool {
        !matches!(self.terrain, Terrain::Ocean)
    }

    /// The resource this tile produces, if any
    pub fn resource(&self) -> Option<Resource> {
        match self.terrain {
            Terrain::Land(r) => Some(r),
            _ => None,
        }
    }
}

/// Kind of building on a vertex
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BuildingKind {
    Town,
    City,
}

/// A town or city and its owner
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Building {
    pub owner: PlayerId,
    pub kind: BuildingKind,
}

impl Building {
    /// Units of a resource produced per matching roll
    pub fn yield_amount(&self) -> u32 {
        match self.kind {
            BuildingKind::Town => 1,
            BuildingKind::City => 2,
        }
    }

    pub fn victory_points(&self) -> u32 {
        self.yield_amount()
    }
}

/// Anything a player can put on the board
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Piece {
    Road,
    Town,
    City,
}

/// Which placement rules apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Opening placements. Towns need no road; a road must touch the
    /// player's own building, and `anchor` (when set) pins it to the town
    /// placed just before it.
    Setup { anchor: Option<VertexCoord> },
    /// Main play. Everything must connect to the player's road network.
    Play,
}

/// A bonus (longest road or largest army) and who holds it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Award {
    /// Length or army size to beat
    pub size: u32,
    pub owner: Option<PlayerId>,
}

impl Award {
    pub const fn unclaimed(threshold: u32) -> Self {
        Self {
            size: threshold,
            owner: None,
        }
    }
}

/// The complete game board
#[derive(Debug, Clone)]
pub struct Board {
    tiles: HashMap<TileCoord, Tile>,
    buildings: HashMap<VertexCoord, Building>,
    roads: HashMap<EdgeCoord, PlayerId>,
    /// Chit value to the tiles bearing it
    hit: BTreeMap<u8, Vec<TileCoord>>,
    robber: TileCoord,
    longest_road: Award,
    largest_army: Award,
}

impl Board {
    /// Create a randomized board from the provided RNG.
    ///
    /// Terrain is drawn from a shuffled pool while walking outward from the
    /// centre, chits are drawn from the canonical sequence rotated by a random
    /// offset, and the desert takes no chit and the robber.
    pub fn generate<R: Rng>(rng: &mut R) -> Self {
        let mut pool = Terrain::standard_pool();
        pool.shuffle(rng);
        let mut chits = CHIT_POOL.to_vec();
        let offset = rng.gen_range(0..chits.len());
        chits.rotate_left(offset);

        let mut board = Board {
            tiles: HashMap::new(),
            buildings: HashMap::new(),
            roads: HashMap::new(),
            hit: BTreeMap::new(),
            robber: CENTER,
            longest_road: Award::unclaimed(LONGEST_ROAD_THRESHOLD),
            largest_army: Award::unclaimed(LARGEST_ARMY_THRESHOLD),
        };

        for_each_tile(CENTER, LAND_RADIUS, |coord| {
            let terrain = pool.pop().unwrap_or(Terrain::Desert);
            let chit = match terrain {
                Terrain::Land(_) => chits.pop().unwrap_or(0),
                _ => 0,
            };
            if terrain == Terrain::Desert {
                board.robber = coord;
            }
            board.hit.entry(chit).or_default().push(coord);
            board.tiles.insert(coord, Tile { terrain, chit });
        });

        for coord in CENTER.ring(LAND_RADIUS + 1) {
            board.tiles.insert(
                coord,
                Tile {
                    terrain: Terrain::Ocean,
                    chit: 0,
                },
            );
        }

        board
    }

    // ==================== Query Methods ====================

    pub fn tile(&self, coord: &TileCoord) -> Option<&Tile> {
        self.tiles.get(coord)
    }

    /// All tiles, including ocean
    pub fn tiles(&self) -> impl Iterator<Item = (&TileCoord, &Tile)> {
        self.tiles.iter()
    }

    /// Tiles that are not ocean
    pub fn land_tiles(&self) -> impl Iterator<Item = (&TileCoord, &Tile)> {
        self.tiles.iter().filter(|(_, t)| t.is_land())
    }

    /// Tiles producing on `chit`. Empty for 0 and 7.
    pub fn tiles_hit_by(&self, chit: u8) -> &[TileCoord] {
        match chit {
            0 | 7 => &[],
            _ => self.hit.get(&chit).map(Vec::as_slice).unwrap_or(&[]),
        }
    }

    pub fn building_at(&self, vertex: &VertexCoord) -> Option<Building> {
        self.buildings.get(vertex).copied()
    }

    pub fn road_at(&self, edge: &EdgeCoord) -> Option<PlayerId> {
        self.roads.get(edge).copied()
    }

    pub fn buildings(&self) -> impl Iterator<Item = (&VertexCoord, &Building)> {
        self.buildings.iter()
    }

    /// Edges holding `player`'s roads
    pub fn roads_of(&self, player: PlayerId) -> impl Iterator<Item = EdgeCoord> + '_ {
        self.roads
            .iter()
            .filter(move |(_, owner)| **owner == player)
            .map(|(edge, _)| *edge)
    }

    pub fn robber(&self) -> TileCoord {
        self.robber
    }

    pub fn longest_road(&self) -> Award {
        self.longest_road
    }

    pub fn largest_army(&self) -> Award {
        self.largest_army
    }

    pub fn set_longest_road(&mut self, award: Award) {
        self.longest_road = award;
    }

    pub fn set_largest_army(&mut self, award: Award) {
        self.largest_army = award;
    }

    /// Whether any tile sharing this corner is land
    pub fn touches_land(&self, vertex: &VertexCoord) -> bool {
        vertex
            .touching_tiles()
            .iter()
            .any(|t| self.tiles.get(t).is_some_and(Tile::is_land))
    }

    // ==================== Validation Methods ====================

    /// Whether `player` may place a road on `edge`.
    ///
    /// Both endpoints must touch land, so a road can never run between two
    /// ocean tiles even when it would connect.
    pub fn valid_road(&self, edge: EdgeCoord, player: PlayerId, stage: Stage) -> bool {
        if !edge.tile().in_range() || self.roads.contains_key(&edge) {
            return false;
        }
        let endpoints = edge.endpoint_vertices();
        if !endpoints.iter().all(|v| self.touches_land(v)) {
            return false;
        }

        endpoints.iter().any(|vertex| {
            let owns_building = self
                .buildings
                .get(vertex)
                .is_some_and(|b| b.owner == player);
            match stage {
                Stage::Setup { anchor } => owns_building && anchor.map_or(true, |a| a == *vertex),
                Stage::Play => {
                    owns_building
                        || vertex
                            .protruding_edges()
                            .iter()
                            .any(|e| self.roads.get(e) == Some(&player))
                }
            }
        })
    }

    /// Whether `player` may place a town on `vertex`
    pub fn valid_town(&self, vertex: VertexCoord, player: PlayerId, stage: Stage) -> bool {
        if !vertex.tile().in_range()
            || self.buildings.contains_key(&vertex)
            || !self.touches_land(&vertex)
        {
            return false;
        }

        // Distance rule: no building one edge away
        if vertex
            .adjacent_vertices()
            .iter()
            .any(|adj| self.buildings.contains_key(adj))
        {
            return false;
        }

        match stage {
            Stage::Setup { .. } => true,
            Stage::Play => vertex
                .protruding_edges()
                .iter()
                .any(|e| self.roads.get(e) == Some(&player)),
        }
    }

    /// Whether `player` may upgrade the building on `vertex` to a city
    pub fn valid_city(&self, vertex: VertexCoord, player: PlayerId) -> bool {
        self.buildings.get(&vertex)
            == Some(&Building {
                owner: player,
                kind: BuildingKind::Town,
            })
    }

    // ==================== Mutation Methods ====================

    /// Place `piece` at the address `(x, y, d)`.
    ///
    /// Dispatches to the matching placement; on failure the board is left
    /// untouched.
    pub fn build(
        &mut self,
        piece: Piece,
        x: i32,
        y: i32,
        d: u8,
        player: PlayerId,
        stage: Stage,
    ) -> Result<(), GameError> {
        match piece {
            Piece::Road => {
                let edge = EdgeCoord::from_parts(x, y, d).ok_or(GameError::InvalidPlacement)?;
                self.place_road(edge, player, stage)
            }
            Piece::Town => {
                let vertex =
                    VertexCoord::from_parts(x, y, d).ok_or(GameError::InvalidPlacement)?;
                self.place_town(vertex, player, stage)
            }
            Piece::City => {
                let vertex =
                    VertexCoord::from_parts(x, y, d).ok_or(GameError::InvalidPlacement)?;
                self.place_city(vertex, player)
            }
        }
    }

    pub fn place_road(
        &mut self,
        edge: EdgeCoord,
        player: PlayerId,
        stage: Stage,
    ) -> Result<(), GameError> {
        if !self.valid_road(edge, player, stage) {
            return Err(GameError::InvalidPlacement);
        }
        self.roads.insert(edge, player);
        Ok(())
    }

    pub fn place_town(
        &mut self,
        vertex: VertexCoord,
        player: PlayerId,
        stage: Stage,
    ) -> Result<(), GameError> {
        if !self.valid_town(vertex, player, stage) {
            return Err(GameError::InvalidPlacement);
        }
        self.buildings.insert(
            vertex,
            Building {
                owner: player,
                kind: BuildingKind::Town,
            },
        );
        Ok(())
    }

    pub fn place_city(&mut self, vertex: VertexCoord, player: PlayerId) -> Result<(), GameError> {
        if !self.valid_city(vertex, player) {
            return Err(GameError::InvalidPlacement);
        }
        self.buildings.insert(
            vertex,
            Building {
                owner: player,
                kind: BuildingKind::City,
            },
        );
        Ok(())
    }

    /// Move the robber to any land tile, including the one it occupies
    pub fn move_robber(&mut self, to: TileCoord) -> Result<(), GameError> {
        let land = self.tiles.get(&to).is_some_and(Tile::is_land);
        if !land {
            return Err(GameError::InvalidRobberMove);
        }
        self.robber = to;
        Ok(())
    }

    // ==================== Production ====================

    /// Resources each player receives for a dice roll. Tiles under the robber
    /// produce nothing.
    pub fn production(&self, roll: u8) -> BTreeMap<PlayerId, ResourceHand> {
        let mut produced: BTreeMap<PlayerId, ResourceHand> = BTreeMap::new();
        for coord in self.tiles_hit_by(roll) {
            if *coord == self.robber {
                continue;
            }
            let Some(resource) = self.tiles.get(coord).and_then(Tile::resource) else {
                continue;
            };
            for vertex in coord.corner_vertices() {
                if let Some(building) = self.buildings.get(&vertex) {
                    produced
                        .entry(building.owner)
                        .or_default()
                        .add(resource, building.yield_amount());
                }
            }
        }
        produced
    }

    /// One resource per producing tile touching each of `player`'s towns.
    /// Paid out once when setup ends.
    pub fn setup_yield(&self, player: PlayerId) -> ResourceHand {
        let mut hand = ResourceHand::new();
        for (vertex, building) in &self.buildings {
            if building.owner != player || building.kind != BuildingKind::Town {
                continue;
            }
            for resource in vertex
                .touching_tiles()
                .iter()
                .filter_map(|t| self.tiles.get(t).and_then(Tile::resource))
            {
                hand.add(resource, 1);
            }
        }
        hand
    }

    /// Owners other than `player` with a building on `tile` who hold at least
    /// one resource card, in seat order.
    pub fn robber_targets(
        &self,
        tile: TileCoord,
        player: PlayerId,
        has_cards: impl Fn(PlayerId) -> bool,
    ) -> Vec<PlayerId> {
        let owners: BTreeSet<PlayerId> = tile
            .corner_vertices()
            .iter()
            .filter_map(|v| self.buildings.get(v))
            .map(|b| b.owner)
            .filter(|owner| *owner != player && has_cards(*owner))
            .collect();
        owners.into_iter().collect()
    }

    /// Victory points from buildings owned by `player`
    pub fn building_points(&self, player: PlayerId) -> u32 {
        self.buildings
            .values()
            .filter(|b| b.owner == player)
            .map(Building::victory_points)
            .sum()
    }

    /// Array-based snapshot for the wire, sorted for stable output
    pub fn snapshot(&self) -> BoardSnapshot {
        let mut tiles: Vec<TileSnapshot> = self
            .tiles
            .iter()
            .map(|(coord, tile)| TileSnapshot {
                x: coord.x,
                y: coord.y,
                terrain: tile.terrain,
                chit: tile.chit,
            })
            .collect();
        tiles.sort_by_key(|t| (t.x, t.y));

        let mut buildings: Vec<BuildingSnapshot> = self
            .buildings
            .iter()
            .map(|(at, b)| BuildingSnapshot {
                at: *at,
                owner: b.owner,
                kind: b.kind,
            })
            .collect();
        buildings.sort_by_key(|b| b.at);

        let mut roads: Vec<RoadSnapshot> = self
            .roads
            .iter()
            .map(|(at, owner)| RoadSnapshot {
                at: *at,
                owner: *owner,
            })
            .collect();
        roads.sort_by_key(|r| r.at);

        BoardSnapshot {
            tiles,
            buildings,
            roads,
            robber: self.robber,
            longest_road: self.longest_road,
            largest_army: self.largest_army,
        }
    }

    #[cfg(test)]
    pub(crate) fn force_road(&mut self, edge: EdgeCoord, player: PlayerId) {
        self.roads.insert(edge, player);
    }

    #[cfg(test)]
    pub(crate) fn force_building(&mut self, vertex: VertexCoord, building: Building) {
        self.buildings.insert(vertex, building);
    }
}

/// Board state as sent to clients
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardSnapshot {
    pub tiles: Vec<TileSnapshot>,
    pub buildings: Vec<BuildingSnapshot>,
    pub roads: Vec<RoadSnapshot>,
    pub robber: TileCoord,
    pub longest_road: Award,
    pub largest_army: Award,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TileSnapshot {
    pub x: i32,
    pub y: i32,
    pub terrain: Terrain,
    pub chit: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BuildingSnapshot {
    #[serde(flatten)]
    pub at: VertexCoord,
    pub owner: PlayerId,
    pub kind: BuildingKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RoadSnapshot {
    #[serde(flatten)]
    pub at: EdgeCoord,
    pub owner: PlayerId,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hex::{EdgeSide, VertexSide};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    const SETUP: Stage = Stage::Setup { anchor: None };

    fn seeded(seed: u64) -> Board {
        Board::generate(&mut StdRng::seed_from_u64(seed))
    }

    fn town(owner: PlayerId) -> Building {
        Building {
            owner,
            kind: BuildingKind::Town,
        }
    }

    /// Lowest-addressed producing tile not under the robber
    fn producing_tile(board: &Board) -> (TileCoord, Tile) {
        board
            .land_tiles()
            .filter(|(c, t)| t.resource().is_some() && **c != board.robber())
            .map(|(c, t)| (*c, *t))
            .min_by_key(|(c, _)| *c)
            .unwrap()
    }

    #[test]
    fn test_board_layout() {
        for seed in 0..20 {
            let board = seeded(seed);
            let land: Vec<_> = board.land_tiles().collect();
            let ocean = board.tiles().filter(|(_, t)| !t.is_land()).count();
            assert_eq!(land.len(), 19);
            assert_eq!(ocean, 18);

            let deserts: Vec<_> = land
                .iter()
                .filter(|(_, t)| t.terrain == Terrain::Desert)
                .collect();
            assert_eq!(deserts.len(), 1);
            assert_eq!(*deserts[0].0, board.robber());
            assert_eq!(deserts[0].1.chit, 0);

            let mut chits: Vec<u8> = land
                .iter()
                .filter(|(_, t)| t.resource().is_some())
                .map(|(_, t)| t.chit)
                .collect();
            chits.sort_unstable();
            let mut expected = CHIT_POOL.to_vec();
            expected.sort_unstable();
            assert_eq!(chits, expected);
        }
    }

    #[test]
    fn test_terrain_counts() {
        let board = seeded(7);
        let count = |r: Resource| {
            board
                .land_tiles()
                .filter(|(_, t)| t.resource() == Some(r))
                .count()
        };
        assert_eq!(count(Resource::Ore), 3);
        assert_eq!(count(Resource::Brick), 3);
        assert_eq!(count(Resource::Lumber), 4);
        assert_eq!(count(Resource::Grain), 4);
        assert_eq!(count(Resource::Wool), 4);
    }

    #[test]
    fn test_hit_index_matches_tiles() {
        let board = seeded(3);
        assert!(board.tiles_hit_by(7).is_empty());
        assert!(board.tiles_hit_by(0).is_empty());
        for (coord, tile) in board.land_tiles() {
            if tile.chit != 0 {
                assert!(board.tiles_hit_by(tile.chit).contains(coord));
            }
        }
    }

    #[test]
    fn test_same_seed_same_board() {
        assert_eq!(seeded(42).snapshot(), seeded(42).snapshot());
    }

    #[test]
    fn test_distance_rule() {
        let mut board = seeded(1);
        let vertex = VertexCoord::new(3, 3, VertexSide::Left);
        board.place_town(vertex, 0, SETUP).unwrap();

        for adj in vertex.adjacent_vertices() {
            assert!(!board.valid_town(adj, 1, SETUP));
        }
        assert_eq!(
            board.place_town(vertex, 1, SETUP),
            Err(GameError::InvalidPlacement)
        );
    }

    #[test]
    fn test_town_must_touch_land() {
        let board = seeded(1);
        // Left corner of an ocean tile on the western rim touches only ocean
        // and off-board slots
        let offshore = VertexCoord::new(0, 3, VertexSide::Left);
        assert!(!board.touches_land(&offshore));
        assert!(!board.valid_town(offshore, 0, SETUP));
    }

    #[test]
    fn test_town_needs_road_during_play() {
        let mut board = seeded(1);
        let home = VertexCoord::new(3, 3, VertexSide::Left);
        board.place_town(home, 0, SETUP).unwrap();

        let edge = home.protruding_edges()[0];
        board.place_road(edge, 0, Stage::Play).unwrap();
        let far = edge.other_endpoint(home).unwrap();
        let next = far
            .protruding_edges()
            .into_iter()
            .find(|e| *e != edge)
            .unwrap();
        board.place_road(next, 0, Stage::Play).unwrap();

        let spot = next.other_endpoint(far).unwrap();
        assert!(!board.valid_town(spot, 1, Stage::Play));
        assert!(board.valid_town(spot, 0, Stage::Play));
    }

    #[test]
    fn test_setup_road_must_touch_anchor() {
        let mut board = seeded(1);
        let first = VertexCoord::new(3, 3, VertexSide::Left);
        let second = VertexCoord::new(2, 2, VertexSide::Right);
        board.place_town(first, 0, SETUP).unwrap();
        board.place_town(second, 0, SETUP).unwrap();

        let anchored = Stage::Setup {
            anchor: Some(second),
        };
        assert!(!board.valid_road(first.protruding_edges()[0], 0, anchored));
        assert!(board.valid_road(second.protruding_edges()[0], 0, anchored));
    }

    #[test]
    fn test_road_connectivity_in_play() {
        let mut board = seeded(1);
        let home = VertexCoord::new(3, 3, VertexSide::Left);
        board.place_town(home, 0, SETUP).unwrap();

        let edge = home.protruding_edges()[0];
        assert!(!board.valid_road(edge, 1, Stage::Play));
        board.place_road(edge, 0, Stage::Play).unwrap();
        assert!(!board.valid_road(edge, 0, Stage::Play), "edge already taken");

        let far = edge.other_endpoint(home).unwrap();
        for next in far.protruding_edges().into_iter().filter(|e| *e != edge) {
            assert!(board.valid_road(next, 0, Stage::Play));
        }
    }

    #[test]
    fn test_road_between_ocean_tiles_rejected() {
        let mut board = seeded(1);
        // Rim vertex touching land tile (1,3) and two ocean tiles
        let rim = VertexCoord::new(1, 3, VertexSide::Left);
        assert!(board.touches_land(&rim));
        board.force_building(rim, town(0));
        let outward = rim
            .protruding_edges()
            .into_iter()
            .find(|e| {
                e.endpoint_vertices()
                    .iter()
                    .any(|v| !board.touches_land(v))
            })
            .unwrap();
        assert!(!board.valid_road(outward, 0, Stage::Play));
    }

    #[test]
    fn test_city_upgrade() {
        let mut board = seeded(1);
        let vertex = VertexCoord::new(3, 3, VertexSide::Right);
        assert!(!board.valid_city(vertex, 0));
        board.place_town(vertex, 0, SETUP).unwrap();
        assert!(!board.valid_city(vertex, 1));
        board.place_city(vertex, 0).unwrap();
        assert_eq!(board.building_at(&vertex).unwrap().kind, BuildingKind::City);
        assert!(!board.valid_city(vertex, 0), "already a city");
    }

    #[test]
    fn test_build_rejects_bad_side() {
        let mut board = seeded(1);
        assert_eq!(
            board.build(Piece::Town, 3, 3, 2, 0, SETUP),
            Err(GameError::InvalidPlacement)
        );
        assert_eq!(
            board.build(Piece::Road, 3, 3, 3, 0, SETUP),
            Err(GameError::InvalidPlacement)
        );
        assert_eq!(
            board.build(Piece::Town, 9, 9, 0, 0, SETUP),
            Err(GameError::InvalidPlacement)
        );
    }

    #[test]
    fn test_validation_does_not_mutate() {
        let mut board = seeded(5);
        let before = board.snapshot();
        let edge = EdgeCoord::new(3, 3, EdgeSide::North);
        assert!(!board.valid_road(edge, 0, Stage::Play));
        assert!(!board.valid_city(VertexCoord::new(3, 3, VertexSide::Left), 0));
        let first = board.build(Piece::Road, 3, 3, 1, 0, Stage::Play);
        let second = board.build(Piece::Road, 3, 3, 1, 0, Stage::Play);
        assert_eq!(first, second);
        assert_eq!(board.snapshot(), before);
    }

    #[test]
    fn test_production_and_city_doubles() {
        let mut board = seeded(11);
        let (coord, tile) = producing_tile(&board);
        let resource = tile.resource().unwrap();
        let corners = coord.corner_vertices();
        board.force_building(corners[0], town(0));
        board.force_building(
            corners[3],
            Building {
                owner: 1,
                kind: BuildingKind::City,
            },
        );

        let produced = board.production(tile.chit);
        assert!(produced[&0].get(resource) >= 1);
        assert!(produced[&1].get(resource) >= 2);
    }

    #[test]
    fn test_robber_blocks_production() {
        let mut board = seeded(11);
        let (coord, tile) = producing_tile(&board);
        board.force_building(coord.corner_vertices()[0], town(0));
        let before = board.production(tile.chit)[&0].get(tile.resource().unwrap());

        board.move_robber(coord).unwrap();
        let after = board
            .production(tile.chit)
            .get(&0)
            .map_or(0, |h| h.get(tile.resource().unwrap()));
        assert_eq!(after + 1, before);
    }

    #[test]
    fn test_move_robber_rules() {
        let mut board = seeded(2);
        let robber = board.robber();
        let ocean = CENTER.ring(3)[0];
        assert_eq!(board.move_robber(ocean), Err(GameError::InvalidRobberMove));
        assert_eq!(
            board.move_robber(TileCoord::new(0, 0)),
            Err(GameError::InvalidRobberMove)
        );
        let target = CENTER.ring(1).into_iter().find(|t| *t != robber).unwrap();
        board.move_robber(target).unwrap();
        assert_eq!(board.robber(), target);

        // Staying put is a legal move
        board.move_robber(target).unwrap();
        assert_eq!(board.robber(), target);
    }

    #[test]
    fn test_robber_targets() {
        let mut board = seeded(2);
        let corners = CENTER.corner_vertices();
        board.force_building(corners[0], town(0));
        board.force_building(corners[2], town(2));
        board.force_building(corners[4], town(1));

        let targets = board.robber_targets(CENTER, 0, |p| p != 1);
        assert_eq!(targets, vec![2]);
        let targets = board.robber_targets(CENTER, 3, |_| true);
        assert_eq!(targets, vec![0, 1, 2]);
    }

    #[test]
    fn test_setup_yield_counts_towns_only() {
        let mut board = seeded(9);
        let vertex = CENTER.corner_vertices()[1];
        board.force_building(vertex, town(0));
        let expected = vertex
            .touching_tiles()
            .iter()
            .filter(|t| board.tile(t).and_then(Tile::resource).is_some())
            .count() as u32;
        assert_eq!(board.setup_yield(0).total(), expected);

        board.place_city(vertex, 0).unwrap();
        assert_eq!(board.setup_yield(0).total(), 0);
    }

    #[test]
    fn test_snapshot_serializes_addresses() {
        let mut board = seeded(4);
        board.force_building(VertexCoord::new(3, 3, VertexSide::Left), town(2));
        let json = serde_json::to_value(board.snapshot()).unwrap();
        assert_eq!(json["tiles"].as_array().unwrap().len(), 37);
        assert_eq!(
            json["buildings"][0],
            serde_json::json!({"x": 3, "y": 3, "d": 0, "owner": 2, "kind": "town"})
        );
        assert_eq!(json["longestRoad"]["size"], 4);
    }
}
