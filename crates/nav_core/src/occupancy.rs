//! Tile occupancy bookkeeping.
//!
//! Tracks which objects stand on which tiles and which tiles carry
//! bridges, and broadcasts every occupancy mutation so the terrain
//! cache can invalidate affected passability graphs.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::events::Signal;
use crate::map::{Bridge, MapTiles};
use crate::object::{GameObject, ObjectId, ObjectKind};
use crate::tile::TileId;

/// Payload of the occupancy change signal.
#[derive(Clone, Debug)]
pub struct OccupancyChange {
    /// Every tile whose occupant list changed.
    pub tiles: Vec<TileId>,
    /// Snapshot of the object that moved, appeared, or disappeared.
    pub object: GameObject,
}

#[derive(Default)]
struct OccupancyState {
    objects: HashMap<ObjectId, GameObject>,
    by_tile: HashMap<TileId, Vec<ObjectId>>,
    bridges: HashMap<TileId, Bridge>,
}

impl OccupancyState {
    fn place(&mut self, tiles: &[TileId], id: ObjectId) {
        for tile in tiles {
            self.by_tile.entry(*tile).or_default().push(id);
        }
    }

    fn displace(&mut self, tiles: &[TileId], id: ObjectId) {
        for tile in tiles {
            if let Some(ids) = self.by_tile.get_mut(tile) {
                ids.retain(|other| *other != id);
                if ids.is_empty() {
                    self.by_tile.remove(tile);
                }
            }
        }
    }
}

/// Shared handle to the occupancy tracker.
///
/// Cloning produces another handle to the same state; the terrain cache
/// keeps one to answer blocker queries during path computation.
///
/// Change events are emitted after the interior borrow is released, so
/// handlers are free to query occupancy.
#[derive(Clone)]
pub struct Occupancy {
    state: Rc<RefCell<OccupancyState>>,
    on_change: Signal<OccupancyChange>,
}

impl Default for Occupancy {
    fn default() -> Self {
        Self::new()
    }
}

impl Occupancy {
    /// Create an empty tracker.
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: Rc::new(RefCell::new(OccupancyState::default())),
            on_change: Signal::new(),
        }
    }

    /// Signal fired after every occupancy mutation.
    #[must_use]
    pub fn on_change(&self) -> &Signal<OccupancyChange> {
        &self.on_change
    }

    /// Record a bridge crossing a tile.
    ///
    /// Bridge records are silent: the corresponding deck overlay object
    /// carries the change event when a bridge appears or is destroyed.
    pub fn set_bridge(&self, tile: TileId, bridge: Bridge) {
        self.state.borrow_mut().bridges.insert(tile, bridge);
    }

    /// Remove the bridge record of a tile.
    pub fn remove_bridge(&self, tile: TileId) {
        self.state.borrow_mut().bridges.remove(&tile);
    }

    /// The bridge crossing a tile, if any.
    #[must_use]
    pub fn bridge_on_tile(&self, tile: TileId) -> Option<Bridge> {
        self.state.borrow().bridges.get(&tile).copied()
    }

    /// The tiles an object occupies: the foundation rectangle for a
    /// building, the single occupied tile otherwise.
    #[must_use]
    pub fn tiles_for_object(&self, object: &GameObject, map: &MapTiles) -> Vec<TileId> {
        match &object.kind {
            ObjectKind::Building(info) => {
                let Some(origin) = map.tile(object.tile) else {
                    return Vec::new();
                };
                let (width, height) = info.foundation;
                let mut tiles = Vec::with_capacity(width as usize * height as usize);
                for dy in 0..i32::from(height) {
                    for dx in 0..i32::from(width) {
                        if let Some(tile) = map.tile_at(origin.rx + dx, origin.ry + dy) {
                            tiles.push(tile.id);
                        }
                    }
                }
                tiles
            }
            _ => vec![object.tile],
        }
    }

    /// Insert an object and notify subscribers.
    pub fn add_object(&self, map: &MapTiles, object: GameObject) {
        let tiles = self.tiles_for_object(&object, map);
        let snapshot = object.clone();
        {
            let mut state = self.state.borrow_mut();
            state.place(&tiles, object.id);
            state.objects.insert(object.id, object);
        }
        self.on_change.emit(&OccupancyChange {
            tiles,
            object: snapshot,
        });
    }

    /// Remove an object and notify subscribers.
    ///
    /// Returns the removed object, or `None` if the id was unknown.
    pub fn remove_object(&self, map: &MapTiles, id: ObjectId) -> Option<GameObject> {
        let (tiles, object) = {
            let mut state = self.state.borrow_mut();
            let object = state.objects.remove(&id)?;
            let tiles = self.tiles_for_object(&object, map);
            state.displace(&tiles, id);
            (tiles, object)
        };
        self.on_change.emit(&OccupancyChange {
            tiles,
            object: object.clone(),
        });
        Some(object)
    }

    /// Mutate an object in place, re-indexing its tiles, and notify
    /// subscribers with the union of old and new tiles.
    pub fn update_object(
        &self,
        map: &MapTiles,
        id: ObjectId,
        mutate: impl FnOnce(&mut GameObject),
    ) {
        let change = {
            let mut state = self.state.borrow_mut();
            let Some(existing) = state.objects.get(&id) else {
                return;
            };
            let mut object = existing.clone();

            let old_tiles = self.tiles_for_object(&object, map);
            mutate(&mut object);
            let new_tiles = self.tiles_for_object(&object, map);

            state.displace(&old_tiles, id);
            state.place(&new_tiles, id);
            state.objects.insert(id, object.clone());

            let mut tiles = old_tiles;
            for tile in new_tiles {
                if !tiles.contains(&tile) {
                    tiles.push(tile);
                }
            }
            OccupancyChange { tiles, object }
        };
        self.on_change.emit(&change);
    }

    /// Snapshot of an object by id.
    #[must_use]
    pub fn object(&self, id: ObjectId) -> Option<GameObject> {
        self.state.borrow().objects.get(&id).cloned()
    }

    /// Snapshots of every object occupying a tile, in insertion order.
    #[must_use]
    pub fn objects_on_tile(&self, tile: TileId) -> Vec<GameObject> {
        let state = self.state.borrow();
        state
            .by_tile
            .get(&tile)
            .map(|ids| {
                ids.iter()
                    .filter_map(|id| state.objects.get(id).cloned())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Snapshots of the ground-level occupants of a tile.
    #[must_use]
    pub fn ground_objects_on_tile(&self, tile: TileId) -> Vec<GameObject> {
        let mut objects = self.objects_on_tile(tile);
        objects.retain(|obj| !obj.on_bridge);
        objects
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::BuildingInfo;
    use crate::tile::{LandType, TerrainType, Tile};

    fn test_map() -> MapTiles {
        MapTiles::from_fn(6, 6, |rx, ry, id| Tile {
            id,
            rx,
            ry,
            z: 0,
            land_type: LandType::Clear,
            on_bridge_land_type: None,
            terrain_type: TerrainType::Flat,
        })
    }

    fn building(id: u32, tile: TileId, foundation: (u8, u8)) -> GameObject {
        GameObject::new(
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
            tile,
        )
    }

    #[test]
    fn test_building_occupies_foundation() {
        let map = test_map();
        let occupancy = Occupancy::new();
        let origin = map.tile_at(1, 1).unwrap().id;
        occupancy.add_object(&map, building(1, origin, (2, 2)));

        for (rx, ry) in [(1, 1), (2, 1), (1, 2), (2, 2)] {
            let tile = map.tile_at(rx, ry).unwrap().id;
            assert_eq!(occupancy.objects_on_tile(tile).len(), 1, "({rx},{ry})");
        }
        assert!(occupancy
            .objects_on_tile(map.tile_at(3, 3).unwrap().id)
            .is_empty());
    }

    #[test]
    fn test_change_event_carries_tiles_and_snapshot() {
        let map = test_map();
        let occupancy = Occupancy::new();
        let seen: Rc<RefCell<Vec<OccupancyChange>>> = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let _sub = occupancy
            .on_change()
            .subscribe(move |change| sink.borrow_mut().push(change.clone()));

        let origin = map.tile_at(0, 0).unwrap().id;
        occupancy.add_object(&map, building(7, origin, (2, 1)));
        occupancy.remove_object(&map, ObjectId::new(7));

        let seen = seen.borrow();
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[0].tiles.len(), 2);
        assert_eq!(seen[0].object.id, ObjectId::new(7));
        assert_eq!(seen[1].tiles, seen[0].tiles);
    }

    #[test]
    fn test_handlers_may_query_occupancy() {
        let map = Rc::new(test_map());
        let occupancy = Occupancy::new();

        let occ = occupancy.clone();
        let counted = Rc::new(std::cell::Cell::new(0usize));
        let sink = Rc::clone(&counted);
        let _sub = occupancy.on_change().subscribe(move |change| {
            // Reentrant query during emit must not panic.
            sink.set(occ.objects_on_tile(change.tiles[0]).len());
        });

        let tile = map.tile_at(2, 2).unwrap().id;
        occupancy.add_object(&map, GameObject::new(ObjectId::new(1), ObjectKind::Vehicle, tile));
        assert_eq!(counted.get(), 1);
    }

    #[test]
    fn test_update_object_reindexes_tiles() {
        let map = test_map();
        let occupancy = Occupancy::new();
        let from = map.tile_at(0, 0).unwrap().id;
        let to = map.tile_at(4, 4).unwrap().id;
        occupancy.add_object(&map, GameObject::new(ObjectId::new(3), ObjectKind::Vehicle, from));

        occupancy.update_object(&map, ObjectId::new(3), |obj| obj.tile = to);

        assert!(occupancy.objects_on_tile(from).is_empty());
        assert_eq!(occupancy.objects_on_tile(to).len(), 1);
        assert_eq!(occupancy.object(ObjectId::new(3)).unwrap().tile, to);
    }

    #[test]
    fn test_bridge_records() {
        let map = test_map();
        let occupancy = Occupancy::new();
        let tile = map.tile_at(3, 0).unwrap().id;
        occupancy.set_bridge(
            tile,
            Bridge {
                elevation_offset: 4,
                high: true,
            },
        );
        assert!(occupancy.bridge_on_tile(tile).unwrap().high);
        occupancy.remove_bridge(tile);
        assert!(occupancy.bridge_on_tile(tile).is_none());
    }
}
