//! Hex board geometry: tile, vertex and edge addresses.
//!
//! The board lives in a 7x7 address space of axial coordinates `(x, y)`.
//! Only tiles within hex distance 3 of the centre `(3, 3)` exist; the rest of
//! the array is unused.
//!
//! Tiles are flat-topped. Increasing `y` moves north, increasing `x` moves
//! north-east. Every geometric feature has exactly one address:
//!
//! - a vertex is the left (side 0) or right (side 1) corner of one tile;
//! - an edge is the north-west (side 0), north (side 1) or north-east
//!   (side 2) side of one tile.
//!
//! The remaining corners and sides of a tile are addressed through its
//! neighbours, so deriving the same corner from any of the (up to three) tiles
//! that share it always produces the same `VertexCoord`.

use serde::{Deserialize, Serialize};

/// Width and height of the tile address space.
pub const GRID_SIZE: i32 = 7;

/// Centre of the board.
pub const CENTER: TileCoord = TileCoord::new(3, 3);

/// Hex distance from the centre to the outermost (ocean) ring.
pub const BOARD_RADIUS: u32 = 3;

/// Axial offsets in clockwise order: N, NE, SE, S, SW, NW.
pub const DIRECTIONS: [(i32, i32); 6] = [(0, 1), (1, 0), (1, -1), (0, -1), (-1, 0), (-1, 1)];

/// Tile address.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
pub struct TileCoord {
    pub x: i32,
    pub y: i32,
}

impl TileCoord {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    fn offset(self, (dx, dy): (i32, i32)) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }

    /// The six neighbouring tiles, clockwise from north.
    pub fn neighbors(&self) -> [TileCoord; 6] {
        DIRECTIONS.map(|d| self.offset(d))
    }

    /// Distance to another tile in hex steps.
    pub fn distance_to(&self, other: &TileCoord) -> u32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        ((dx.abs() + dy.abs() + (dx + dy).abs()) / 2) as u32
    }

    /// Whether this address is a board position (inside the grid and within
    /// `BOARD_RADIUS` of the centre).
    pub fn in_range(&self) -> bool {
        (0..GRID_SIZE).contains(&self.x)
            && (0..GRID_SIZE).contains(&self.y)
            && self.distance_to(&CENTER) <= BOARD_RADIUS
    }

    /// The six corners of this tile, counter-clockwise from the right corner.
    pub fn corner_vertices(&self) -> [VertexCoord; 6] {
        let Self { x, y } = *self;
        [
            VertexCoord::new(x, y, VertexSide::Right),
            VertexCoord::new(x + 1, y, VertexSide::Left),
            VertexCoord::new(x - 1, y + 1, VertexSide::Right),
            VertexCoord::new(x, y, VertexSide::Left),
            VertexCoord::new(x - 1, y, VertexSide::Right),
            VertexCoord::new(x + 1, y - 1, VertexSide::Left),
        ]
    }

    /// The six sides of this tile: its own three northern sides followed by
    /// the southern sides owned by its southern neighbours.
    pub fn border_edges(&self) -> [EdgeCoord; 6] {
        let Self { x, y } = *self;
        [
            EdgeCoord::new(x, y, EdgeSide::NorthWest),
            EdgeCoord::new(x, y, EdgeSide::North),
            EdgeCoord::new(x, y, EdgeSide::NorthEast),
            EdgeCoord::new(x - 1, y, EdgeSide::NorthEast),
            EdgeCoord::new(x, y - 1, EdgeSide::North),
            EdgeCoord::new(x + 1, y - 1, EdgeSide::NorthWest),
        ]
    }

    /// The tiles at exactly `radius` steps, walked from the south-west corner
    /// of the ring clockwise around its six sides.
    pub fn ring(&self, radius: u32) -> Vec<TileCoord> {
        if radius == 0 {
            return vec![*self];
        }
        let r = radius as i32;
        let (sx, sy) = DIRECTIONS[4];
        let mut tile = Self::new(self.x + sx * r, self.y + sy * r);
        let mut ring = Vec::with_capacity(6 * radius as usize);
        for direction in DIRECTIONS {
            for _ in 0..radius {
                ring.push(tile);
                tile = tile.offset(direction);
            }
        }
        ring
    }
}

/// Calls `f` once for every tile within `radius` of `center`: the centre first,
/// then each ring outward in `TileCoord::ring` order.
pub fn for_each_tile(center: TileCoord, radius: u32, mut f: impl FnMut(TileCoord)) {
    for r in 0..=radius {
        for tile in center.ring(r) {
            f(tile);
        }
    }
}

/// Which corner of a tile a vertex address names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum VertexSide {
    /// The west-pointing corner (side 0).
    Left,
    /// The east-pointing corner (side 1).
    Right,
}

impl TryFrom<u8> for VertexSide {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(VertexSide::Left),
            1 => Ok(VertexSide::Right),
            other => Err(format!("vertex side must be 0 or 1, got {other}")),
        }
    }
}

impl From<VertexSide> for u8 {
    fn from(side: VertexSide) -> u8 {
        side as u8
    }
}

/// Which side of a tile an edge address names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum EdgeSide {
    /// Side 0, between the left corner and the upper-left corner.
    NorthWest,
    /// Side 1, the top side.
    North,
    /// Side 2, between the upper-right corner and the right corner.
    NorthEast,
}

impl TryFrom<u8> for EdgeSide {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(EdgeSide::NorthWest),
            1 => Ok(EdgeSide::North),
            2 => Ok(EdgeSide::NorthEast),
            other => Err(format!("edge side must be 0, 1 or 2, got {other}")),
        }
    }
}

impl From<EdgeSide> for u8 {
    fn from(side: EdgeSide) -> u8 {
        side as u8
    }
}

/// Vertex address: a corner where up to three tiles meet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct VertexCoord {
    pub x: i32,
    pub y: i32,
    #[serde(rename = "d")]
    pub side: VertexSide,
}

impl VertexCoord {
    pub const fn new(x: i32, y: i32, side: VertexSide) -> Self {
        Self { x, y, side }
    }

    /// Build a vertex from wire fields; `None` if `d` is not a vertex side.
    pub fn from_parts(x: i32, y: i32, d: u8) -> Option<Self> {
        VertexSide::try_from(d).ok().map(|side| Self::new(x, y, side))
    }

    /// The tile whose corner this address names.
    pub fn tile(&self) -> TileCoord {
        TileCoord::new(self.x, self.y)
    }

    /// The three tiles sharing this corner (some may be off the board).
    pub fn touching_tiles(&self) -> [TileCoord; 3] {
        let Self { x, y, side } = *self;
        match side {
            VertexSide::Left => [
                TileCoord::new(x, y),
                TileCoord::new(x - 1, y),
                TileCoord::new(x - 1, y + 1),
            ],
            VertexSide::Right => [
                TileCoord::new(x + 1, y),
                TileCoord::new(x + 1, y - 1),
                TileCoord::new(x, y),
            ],
        }
    }

    /// The three vertices one edge away.
    pub fn adjacent_vertices(&self) -> [VertexCoord; 3] {
        let Self { x, y, side } = *self;
        match side {
            VertexSide::Left => [
                VertexCoord::new(x - 1, y + 1, VertexSide::Right),
                VertexCoord::new(x - 1, y, VertexSide::Right),
                VertexCoord::new(x - 2, y + 1, VertexSide::Right),
            ],
            VertexSide::Right => [
                VertexCoord::new(x + 2, y - 1, VertexSide::Left),
                VertexCoord::new(x + 1, y - 1, VertexSide::Left),
                VertexCoord::new(x + 1, y, VertexSide::Left),
            ],
        }
    }

    /// The three edges meeting at this vertex.
    pub fn protruding_edges(&self) -> [EdgeCoord; 3] {
        let Self { x, y, side } = *self;
        match side {
            VertexSide::Left => [
                EdgeCoord::new(x, y, EdgeSide::NorthWest),
                EdgeCoord::new(x - 1, y, EdgeSide::NorthEast),
                EdgeCoord::new(x - 1, y, EdgeSide::North),
            ],
            VertexSide::Right => [
                EdgeCoord::new(x + 1, y - 1, EdgeSide::North),
                EdgeCoord::new(x + 1, y - 1, EdgeSide::NorthWest),
                EdgeCoord::new(x, y, EdgeSide::NorthEast),
            ],
        }
    }
}

/// Edge address: a side shared by two tiles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EdgeCoord {
    pub x: i32,
    pub y: i32,
    #[serde(rename = "d")]
    pub side: EdgeSide,
}

impl EdgeCoord {
    pub const fn new(x: i32, y: i32, side: EdgeSide) -> Self {
        Self { x, y, side }
    }

    /// Build an edge from wire fields; `None` if `d` is not an edge side.
    pub fn from_parts(x: i32, y: i32, d: u8) -> Option<Self> {
        EdgeSide::try_from(d).ok().map(|side| Self::new(x, y, side))
    }

    /// The tile whose side this address names.
    pub fn tile(&self) -> TileCoord {
        TileCoord::new(self.x, self.y)
    }

    /// The vertices at either end of this edge.
    pub fn endpoint_vertices(&self) -> [VertexCoord; 2] {
        let Self { x, y, side } = *self;
        match side {
            EdgeSide::NorthWest => [
                VertexCoord::new(x - 1, y + 1, VertexSide::Right),
                VertexCoord::new(x, y, VertexSide::Left),
            ],
            EdgeSide::North => [
                VertexCoord::new(x + 1, y, VertexSide::Left),
                VertexCoord::new(x - 1, y + 1, VertexSide::Right),
            ],
            EdgeSide::NorthEast => [
                VertexCoord::new(x, y, VertexSide::Right),
                VertexCoord::new(x + 1, y, VertexSide::Left),
            ],
        }
    }

    /// The endpoint opposite `vertex`, or `None` if `vertex` is not an endpoint.
    pub fn other_endpoint(&self, vertex: VertexCoord) -> Option<VertexCoord> {
        match self.endpoint_vertices() {
            [a, b] if a == vertex => Some(b),
            [a, b] if b == vertex => Some(a),
            _ => None,
        }
    }

    /// The two tiles on either side of this edge.
    pub fn touching_tiles(&self) -> [TileCoord; 2] {
        let Self { x, y, side } = *self;
        let neighbor = match side {
            EdgeSide::NorthWest => TileCoord::new(x - 1, y + 1),
            EdgeSide::North => TileCoord::new(x, y + 1),
            EdgeSide::NorthEast => TileCoord::new(x + 1, y),
        };
        [TileCoord::new(x, y), neighbor]
    }
}
