//! Tile grid identity types.
//!
//! Tiles are immutable grid cell descriptions owned by the map; the
//! navigation core only ever borrows them. Everything here is plain
//! data with stable, copyable ids.

use serde::{Deserialize, Serialize};

/// Stable identifier of a tile within the current map.
///
/// Ids are row-major indices and remain valid until the map bounds
/// change, at which point every cached structure keyed by tile id is
/// discarded.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TileId(u32);

impl TileId {
    /// Create a tile id from its raw index.
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Get the raw numeric value.
    #[must_use]
    pub const fn as_u32(self) -> u32 {
        self.0
    }
}

/// Composite passability-graph node id: a tile at ground or bridge level.
///
/// One tile can contribute up to two nodes to a passability graph, one
/// per traversal level.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeKey {
    /// The tile this node belongs to.
    pub tile: TileId,
    /// True for the bridge-deck node, false for the ground node.
    pub bridge: bool,
}

impl NodeKey {
    /// Ground-level node key for a tile.
    #[must_use]
    pub const fn ground(tile: TileId) -> Self {
        Self { tile, bridge: false }
    }

    /// Bridge-level node key for a tile.
    #[must_use]
    pub const fn on_bridge(tile: TileId) -> Self {
        Self { tile, bridge: true }
    }
}

/// Land classification of a tile, the key into the speed-modifier rules.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LandType {
    /// Ordinary open ground.
    Clear,
    /// Paved road.
    Road,
    /// Broken ground.
    Rough,
    /// Impassable rock or cliff face.
    Rock,
    /// Wall piece (crushable by tracked movement).
    Wall,
    /// Deep water.
    Water,
    /// Shoreline.
    Beach,
    /// Frozen water.
    Ice,
    /// Rail track.
    Railroad,
    /// Overgrowth.
    Weeds,
}

impl LandType {
    /// Every land type, in rules-table order.
    pub const ALL: [LandType; 10] = [
        LandType::Clear,
        LandType::Road,
        LandType::Rough,
        LandType::Rock,
        LandType::Wall,
        LandType::Water,
        LandType::Beach,
        LandType::Ice,
        LandType::Railroad,
        LandType::Weeds,
    ];
}

/// Raw terrain classification of a tile, independent of overlays.
///
/// Used to resolve the land type of the ground underneath a wall when
/// tracked movement is allowed to crush through it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TerrainType {
    /// Flat open terrain.
    Flat,
    /// Broken terrain.
    Rough,
    /// Sheer rock.
    Rock,
    /// Paved surface.
    Pavement,
    /// Water surface.
    Water,
    /// Shoreline.
    Shore,
    /// Rail bed.
    Railbed,
}

impl TerrainType {
    /// The land type of the bare terrain.
    #[must_use]
    pub const fn land_type(self) -> LandType {
        match self {
            TerrainType::Flat => LandType::Clear,
            TerrainType::Rough => LandType::Rough,
            TerrainType::Rock => LandType::Rock,
            TerrainType::Pavement => LandType::Road,
            TerrainType::Water => LandType::Water,
            TerrainType::Shore => LandType::Beach,
            TerrainType::Railbed => LandType::Railroad,
        }
    }
}

/// The eight grid directions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// `(-1, 0)`
    Left,
    /// `(-1, -1)`
    TopLeft,
    /// `(0, -1)`
    Top,
    /// `(1, -1)`
    TopRight,
    /// `(1, 0)`
    Right,
    /// `(1, 1)`
    BottomRight,
    /// `(0, 1)`
    Bottom,
    /// `(-1, 1)`
    BottomLeft,
}

impl Direction {
    /// All eight directions.
    pub const ALL: [Direction; 8] = [
        Direction::Left,
        Direction::TopLeft,
        Direction::Top,
        Direction::TopRight,
        Direction::Right,
        Direction::BottomRight,
        Direction::Bottom,
        Direction::BottomLeft,
    ];

    /// The canonical half-neighborhood used when sweeping tiles.
    ///
    /// Adjacency links are symmetric, so a full sweep only needs to link
    /// each tile to the four neighbors that were already visited in
    /// row-major order; the complementary four edges are created when the
    /// opposite tile is processed.
    pub const CANONICAL: [Direction; 4] = [
        Direction::Left,
        Direction::TopLeft,
        Direction::Top,
        Direction::TopRight,
    ];

    /// Coordinate offset of this direction as `(dx, dy)`.
    #[must_use]
    pub const fn offset(self) -> (i32, i32) {
        match self {
            Direction::Left => (-1, 0),
            Direction::TopLeft => (-1, -1),
            Direction::Top => (0, -1),
            Direction::TopRight => (1, -1),
            Direction::Right => (1, 0),
            Direction::BottomRight => (1, 1),
            Direction::Bottom => (0, 1),
            Direction::BottomLeft => (-1, 1),
        }
    }

    /// The opposite direction.
    #[must_use]
    pub const fn opposite(self) -> Direction {
        match self {
            Direction::Left => Direction::Right,
            Direction::TopLeft => Direction::BottomRight,
            Direction::Top => Direction::Bottom,
            Direction::TopRight => Direction::BottomLeft,
            Direction::Right => Direction::Left,
            Direction::BottomRight => Direction::TopLeft,
            Direction::Bottom => Direction::Top,
            Direction::BottomLeft => Direction::TopRight,
        }
    }

    /// True for the four diagonal directions.
    #[must_use]
    pub const fn is_diagonal(self) -> bool {
        let (dx, dy) = self.offset();
        dx != 0 && dy != 0
    }
}

/// Theater (tile set) tag of the current map.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Theater {
    /// Temperate climate tile set.
    Temperate,
    /// Snow tile set.
    Snow,
    /// Urban tile set.
    Urban,
    /// Desert tile set.
    Desert,
    /// Lunar tile set.
    Lunar,
}

/// Infantry sub-cell slot within a tile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SubCell {
    /// Center slot.
    #[default]
    Center,
    /// North-east slot.
    NorthEast,
    /// South-west slot.
    SouthWest,
    /// South-east slot.
    SouthEast,
}

impl SubCell {
    const fn bit(self) -> u8 {
        match self {
            SubCell::Center => 1 << 0,
            SubCell::NorthEast => 1 << 1,
            SubCell::SouthWest => 1 << 2,
            SubCell::SouthEast => 1 << 3,
        }
    }
}

/// Set of occupied sub-cell slots.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct SubCellSet(u8);

impl SubCellSet {
    /// The empty set.
    pub const EMPTY: Self = Self(0);

    /// Create a set from a slice of slots.
    #[must_use]
    pub fn from_slots(slots: &[SubCell]) -> Self {
        let mut bits = 0;
        for slot in slots {
            bits |= slot.bit();
        }
        Self(bits)
    }

    /// The full set of slots infantry can occupy in the given theater.
    ///
    /// Urban tile sets expose the center slot in addition to the three
    /// corner slots; the other theaters use the corner slots only.
    #[must_use]
    pub const fn occupiable(theater: Theater) -> Self {
        let corners = SubCell::NorthEast.bit() | SubCell::SouthWest.bit() | SubCell::SouthEast.bit();
        match theater {
            Theater::Urban => Self(corners | SubCell::Center.bit()),
            _ => Self(corners),
        }
    }

    /// Whether the set contains a slot.
    #[must_use]
    pub const fn contains(self, slot: SubCell) -> bool {
        self.0 & slot.bit() != 0
    }

    /// Add a slot to the set.
    pub fn insert(&mut self, slot: SubCell) {
        self.0 |= slot.bit();
    }
}

/// Immutable grid cell identity, owned by the map.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tile {
    /// Stable tile id (row-major index).
    pub id: TileId,
    /// Column coordinate.
    pub rx: i32,
    /// Row coordinate.
    pub ry: i32,
    /// Ground elevation.
    pub z: i32,
    /// Land type of the ground level.
    pub land_type: LandType,
    /// Land type of the bridge deck, when a bridge crosses this tile.
    pub on_bridge_land_type: Option<LandType>,
    /// Raw terrain classification underneath overlays.
    pub terrain_type: TerrainType,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direction_opposites() {
        for dir in Direction::ALL {
            assert_eq!(dir.opposite().opposite(), dir);
            let (dx, dy) = dir.offset();
            let (ox, oy) = dir.opposite().offset();
            assert_eq!((dx, dy), (-ox, -oy));
        }
    }

    #[test]
    fn test_canonical_covers_half_neighborhood() {
        // Each of the 8 directions is either canonical or the opposite
        // of a canonical direction, never both.
        for dir in Direction::ALL {
            let canonical = Direction::CANONICAL.contains(&dir);
            let complement = Direction::CANONICAL.contains(&dir.opposite());
            assert!(canonical != complement, "{dir:?}");
        }
    }

    #[test]
    fn test_sub_cell_sets() {
        let mut set = SubCellSet::EMPTY;
        assert!(!set.contains(SubCell::Center));
        set.insert(SubCell::NorthEast);
        set.insert(SubCell::SouthEast);
        assert!(set.contains(SubCell::NorthEast));
        assert!(!set.contains(SubCell::SouthWest));
        assert_eq!(
            set,
            SubCellSet::from_slots(&[SubCell::SouthEast, SubCell::NorthEast])
        );
    }

    #[test]
    fn test_occupiable_slots_by_theater() {
        assert!(SubCellSet::occupiable(Theater::Urban).contains(SubCell::Center));
        assert!(!SubCellSet::occupiable(Theater::Temperate).contains(SubCell::Center));
        assert!(SubCellSet::occupiable(Theater::Snow).contains(SubCell::SouthWest));
    }
}
