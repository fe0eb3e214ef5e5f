//! Map tile storage and bounds.
//!
//! The map owns the tile grid; the navigation core borrows tiles and
//! subscribes to the local-bounds resize event, since a resize changes
//! the tile id space and invalidates every cached graph.

use std::cell::Cell;

use serde::{Deserialize, Serialize};

use crate::events::Signal;
use crate::tile::{Direction, Tile, TileId};

/// Bridge overlay data for one tile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bridge {
    /// Deck elevation above the carrying tile.
    pub elevation_offset: i32,
    /// High bridges let ground traffic pass underneath.
    pub high: bool,
}

/// Axis-aligned tile rectangle, used for the local (playable) bounds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rect {
    /// Leftmost column.
    pub x: i32,
    /// Topmost row.
    pub y: i32,
    /// Width in columns.
    pub width: i32,
    /// Height in rows.
    pub height: i32,
}

impl Rect {
    /// Whether a coordinate pair lies inside the rectangle.
    #[must_use]
    pub const fn contains(&self, rx: i32, ry: i32) -> bool {
        rx >= self.x && ry >= self.y && rx < self.x + self.width && ry < self.y + self.height
    }
}

/// Rectangular tile grid with row-major storage and a playable sub-rect.
pub struct MapTiles {
    width: i32,
    height: i32,
    tiles: Vec<Tile>,
    local: Cell<Rect>,
    on_local_resize: Signal<()>,
}

impl MapTiles {
    /// Create a map from pre-built tiles in row-major order.
    ///
    /// The playable bounds start out covering the full grid.
    ///
    /// # Panics
    ///
    /// Panics if the tile count does not match `width * height`.
    #[must_use]
    pub fn new(width: i32, height: i32, tiles: Vec<Tile>) -> Self {
        assert!(width > 0 && height > 0, "MapTiles size must be positive");
        assert_eq!(
            tiles.len(),
            (width as usize) * (height as usize),
            "tile count must match map size"
        );
        debug_assert!(tiles
            .iter()
            .enumerate()
            .all(|(i, t)| t.id.as_u32() as usize == i));
        Self {
            width,
            height,
            tiles,
            local: Cell::new(Rect {
                x: 0,
                y: 0,
                width,
                height,
            }),
            on_local_resize: Signal::new(),
        }
    }

    /// Create a map by generating each tile from its coordinates.
    #[must_use]
    pub fn from_fn(width: i32, height: i32, mut f: impl FnMut(i32, i32, TileId) -> Tile) -> Self {
        let mut tiles = Vec::with_capacity((width.max(0) as usize) * (height.max(0) as usize));
        for ry in 0..height {
            for rx in 0..width {
                let id = TileId::new((ry * width + rx) as u32);
                tiles.push(f(rx, ry, id));
            }
        }
        Self::new(width, height, tiles)
    }

    /// Grid width in columns.
    #[must_use]
    pub const fn width(&self) -> i32 {
        self.width
    }

    /// Grid height in rows.
    #[must_use]
    pub const fn height(&self) -> i32 {
        self.height
    }

    /// Look up a tile by id.
    #[must_use]
    pub fn tile(&self, id: TileId) -> Option<&Tile> {
        self.tiles.get(id.as_u32() as usize)
    }

    /// Look up a tile by coordinates.
    #[must_use]
    pub fn tile_at(&self, rx: i32, ry: i32) -> Option<&Tile> {
        if rx < 0 || ry < 0 || rx >= self.width || ry >= self.height {
            return None;
        }
        self.tiles.get((ry * self.width + rx) as usize)
    }

    /// The neighbor of a tile in a direction, if it exists.
    #[must_use]
    pub fn neighbor(&self, tile: &Tile, direction: Direction) -> Option<&Tile> {
        let (dx, dy) = direction.offset();
        self.tile_at(tile.rx + dx, tile.ry + dy)
    }

    /// Visit every tile in row-major order.
    pub fn for_each_tile(&self, mut f: impl FnMut(&Tile)) {
        for tile in &self.tiles {
            f(tile);
        }
    }

    /// Whether a tile lies within the playable bounds.
    #[must_use]
    pub fn is_within_bounds(&self, tile: &Tile) -> bool {
        self.local.get().contains(tile.rx, tile.ry)
    }

    /// Current playable bounds.
    #[must_use]
    pub fn local_bounds(&self) -> Rect {
        self.local.get()
    }

    /// Change the playable bounds and notify subscribers.
    pub fn resize_local(&self, bounds: Rect) {
        self.local.set(bounds);
        self.on_local_resize.emit(&());
    }

    /// Signal fired after every [`resize_local`](Self::resize_local).
    #[must_use]
    pub fn on_local_resize(&self) -> &Signal<()> {
        &self.on_local_resize
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tile::{LandType, TerrainType};

    fn flat_tile(rx: i32, ry: i32, id: TileId) -> Tile {
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

    #[test]
    fn test_lookup_by_id_and_coords() {
        let map = MapTiles::from_fn(4, 3, flat_tile);
        let tile = map.tile_at(2, 1).unwrap();
        assert_eq!(tile.id, TileId::new(6));
        assert_eq!(map.tile(TileId::new(6)).unwrap().rx, 2);
        assert!(map.tile_at(4, 0).is_none());
        assert!(map.tile_at(-1, 0).is_none());
    }

    #[test]
    fn test_neighbor_lookup() {
        let map = MapTiles::from_fn(3, 3, flat_tile);
        let center = map.tile_at(1, 1).unwrap();
        assert_eq!(map.neighbor(center, Direction::Left).unwrap().rx, 0);
        assert_eq!(map.neighbor(center, Direction::TopRight).unwrap().ry, 0);
        let corner = map.tile_at(0, 0).unwrap();
        assert!(map.neighbor(corner, Direction::Top).is_none());
    }

    #[test]
    fn test_local_bounds_and_resize_event() {
        let map = MapTiles::from_fn(5, 5, flat_tile);
        let tile = map.tile_at(4, 4).unwrap().clone();
        assert!(map.is_within_bounds(&tile));

        let fired = std::rc::Rc::new(std::cell::Cell::new(0));
        let sink = std::rc::Rc::clone(&fired);
        let _sub = map.on_local_resize().subscribe(move |()| {
            sink.set(sink.get() + 1);
        });

        map.resize_local(Rect {
            x: 1,
            y: 1,
            width: 3,
            height: 3,
        });
        assert_eq!(fired.get(), 1);
        assert!(!map.is_within_bounds(&tile));
        assert!(map.is_within_bounds(map.tile_at(2, 2).unwrap()));
    }
}
