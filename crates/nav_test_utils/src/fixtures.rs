//! Test fixtures and helpers.
//!
//! Pre-built worlds and object configurations for consistent testing.

use std::rc::Rc;

use fixed::types::I32F32;

use nav_core::map::{Bridge, MapTiles};
use nav_core::object::{BuildingInfo, GameObject, ObjectId, ObjectKind};
use nav_core::occupancy::Occupancy;
use nav_core::rules::{MovementType, Rules};
use nav_core::terrain::{ElevationLevel, PathNode, PathOptions, Terrain};
use nav_core::tile::{LandType, TerrainType, Theater, Tile, TileId};

/// Create a fixed-point number from an integer.
#[must_use]
pub fn fixed(n: i32) -> I32F32 {
    I32F32::from_num(n)
}

/// Create a fixed-point number from a float (for tests only).
///
/// Note: In real navigation code, never use floats.
/// This is only for convenient test setup.
#[must_use]
pub fn fixed_f(n: f64) -> I32F32 {
    I32F32::from_num(n)
}

/// A complete navigation world: map, occupancy, rules, and the terrain
/// engine wired to them.
pub struct NavWorld {
    /// Tile grid.
    pub map: Rc<MapTiles>,
    /// Occupancy tracker handle.
    pub occupancy: Occupancy,
    /// Terrain engine under test.
    pub terrain: Terrain,
}

impl NavWorld {
    /// A fully passable flat world of the given size.
    #[must_use]
    pub fn flat(width: i32, height: i32) -> Self {
        Self::from_tiles(width, height, |rx, ry, id| flat_tile(rx, ry, id))
    }

    /// A world whose tiles are generated per coordinate.
    #[must_use]
    pub fn from_tiles(
        width: i32,
        height: i32,
        f: impl FnMut(i32, i32, TileId) -> Tile,
    ) -> Self {
        let map = Rc::new(MapTiles::from_fn(width, height, f));
        let occupancy = Occupancy::new();
        let terrain = Terrain::new(
            Theater::Temperate,
            Rc::clone(&map),
            occupancy.clone(),
            Rc::new(Rules::default()),
        );
        Self {
            map,
            occupancy,
            terrain,
        }
    }

    /// Tile id at grid coordinates.
    ///
    /// # Panics
    ///
    /// Panics when the coordinates are outside the map.
    #[must_use]
    pub fn tile_at(&self, rx: i32, ry: i32) -> TileId {
        self.map
            .tile_at(rx, ry)
            .unwrap_or_else(|| panic!("no tile at ({rx}, {ry})"))
            .id
    }

    /// Place a plain blocking building and return its id.
    pub fn place_building(&self, id: u32, rx: i32, ry: i32, foundation: (u8, u8)) -> ObjectId {
        let object = GameObject::new(
            ObjectId::new(id),
            ObjectKind::Building(BuildingInfo {
                invisible_in_game: false,
                gate: false,
                destroyed: false,
                leaves_rubble: false,
                foundation,
                impassable_rows: None,
                weapons_factory: false,
            }),
            self.tile_at(rx, ry),
        );
        let object_id = object.id;
        self.occupancy.add_object(&self.map, object);
        object_id
    }

    /// Place a vehicle unit and return its id.
    pub fn place_vehicle(&self, id: u32, rx: i32, ry: i32, movement: MovementType) -> ObjectId {
        let mut object = GameObject::new(ObjectId::new(id), ObjectKind::Vehicle, self.tile_at(rx, ry));
        object.movement = Some(movement);
        let object_id = object.id;
        self.occupancy.add_object(&self.map, object);
        object_id
    }

    /// Record a bridge crossing a tile.
    pub fn place_bridge(&self, rx: i32, ry: i32, elevation_offset: i32, high: bool) {
        self.occupancy.set_bridge(
            self.tile_at(rx, ry),
            Bridge {
                elevation_offset,
                high,
            },
        );
    }

    /// Ground-level path query with default options.
    #[must_use]
    pub fn path(
        &self,
        movement: MovementType,
        from: (i32, i32),
        to: (i32, i32),
    ) -> Vec<PathNode> {
        self.terrain.compute_path(
            movement,
            ElevationLevel::Ground,
            self.tile_at(from.0, from.1),
            false,
            self.tile_at(to.0, to.1),
            false,
            &PathOptions::default(),
        )
    }
}

/// A plain passable tile.
#[must_use]
pub fn flat_tile(rx: i32, ry: i32, id: TileId) -> Tile {
    Tile {
        id,
        rx,
        ry,
        z: 0,
        land_type: LandType::Clear,
        on_bridge_land_type: None,
        terrain_type: TerrainType::Flat,
    }
}

/// A tile no ground movement can enter.
#[must_use]
pub fn rock_tile(rx: i32, ry: i32, id: TileId) -> Tile {
    Tile {
        land_type: LandType::Rock,
        terrain_type: TerrainType::Rock,
        ..flat_tile(rx, ry, id)
    }
}

/// Hashable signature of a path: `(tile, on_bridge)` per waypoint.
#[must_use]
pub fn path_signature(path: &[PathNode]) -> Vec<(u32, bool)> {
    path.iter()
        .map(|node| (node.tile.as_u32(), node.on_bridge.is_some()))
        .collect()
}
