//! Game object identity as seen by the navigation core.
//!
//! The core never simulates objects; it only classifies occupants of a
//! tile as blocking or not. Object kinds form a closed enum so the
//! blocker classification can match exhaustively.

use serde::{Deserialize, Serialize};

use crate::rules::MovementType;
use crate::tile::{NodeKey, SubCell, SubCellSet, TileId};

/// Stable identifier of a game object.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ObjectId(u32);

impl ObjectId {
    /// Create an object id from its raw value.
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

/// Overlay sub-classification relevant to passability.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum OverlayKind {
    /// Deck piece of a low bridge.
    BridgeDeck,
    /// Deck piece of a high bridge (ground traffic passes underneath).
    HighBridge,
    /// Harvestable resource deposit.
    ResourceDeposit,
    /// Pickup crate.
    Crate,
    /// Placeholder marking a destroyed or unbuilt bridge span.
    BridgePlaceholder,
    /// Any other overlay (walls, decorations).
    Other,
}

/// Static description of a building, as far as passability is concerned.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildingInfo {
    /// Building exists for rules purposes but is not present in the world.
    pub invisible_in_game: bool,
    /// Gate buildings open for friendly traffic and never block the graph.
    pub gate: bool,
    /// The building has been destroyed.
    pub destroyed: bool,
    /// Destruction leaves passable rubble instead of a blocked footprint.
    pub leaves_rubble: bool,
    /// Foundation size as `(columns, rows)`.
    pub foundation: (u8, u8),
    /// Number of foundation rows that block movement, when configured.
    pub impassable_rows: Option<u8>,
    /// War-factory style building whose last foundation row is an exit.
    pub weapons_factory: bool,
}

/// Closed classification of every object kind the core can encounter.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ObjectKind {
    /// Map prop (tree, rock formation) occupying a set of sub-cells.
    TerrainObject {
        /// Sub-cell slots the prop occupies.
        occupied_sub_cells: SubCellSet,
    },
    /// Structure with a footprint.
    Building(BuildingInfo),
    /// Airborne unit.
    Aircraft,
    /// Foot soldier.
    Infantry,
    /// Ground vehicle.
    Vehicle,
    /// Ground decal (scorch mark, crater).
    Smudge,
    /// Terrain overlay.
    Overlay(OverlayKind),
}

impl ObjectKind {
    /// True for kinds that represent mobile units.
    #[must_use]
    pub const fn is_unit(&self) -> bool {
        matches!(
            self,
            ObjectKind::Aircraft | ObjectKind::Infantry | ObjectKind::Vehicle
        )
    }
}

/// A game object reference as borrowed by the navigation core.
///
/// The simulation owns these; the core receives snapshots through
/// occupancy queries and change events and never mutates them.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameObject {
    /// Stable object id.
    pub id: ObjectId,
    /// Kind classification.
    pub kind: ObjectKind,
    /// Whether heavy movement can crush this object.
    pub crushable: bool,
    /// Occupied tile; footprint origin for buildings.
    pub tile: TileId,
    /// Current elevation.
    pub z: i32,
    /// Whether the object stands on a bridge deck.
    pub on_bridge: bool,
    /// Occupied sub-cell slot (meaningful for infantry).
    pub sub_cell: SubCell,
    /// Movement type, for mobile units.
    pub movement: Option<MovementType>,
    /// Path nodes the object currently holds reservations on.
    pub reserved_nodes: Vec<NodeKey>,
}

impl GameObject {
    /// Create a stationary object of the given kind on a tile.
    #[must_use]
    pub fn new(id: ObjectId, kind: ObjectKind, tile: TileId) -> Self {
        Self {
            id,
            kind,
            crushable: false,
            tile,
            z: 0,
            on_bridge: false,
            sub_cell: SubCell::default(),
            movement: None,
            reserved_nodes: Vec::new(),
        }
    }
}
