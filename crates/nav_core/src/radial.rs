//! Outward radial tile scan around a footprint.
//!
//! Yields tiles matching a predicate in rings of increasing Chebyshev
//! radius around a rectangular footprint. Ring zero is the footprint
//! itself; outer rings visit only their perimeter. The scan is
//! resumable, so callers can take the first match or keep pulling
//! further candidates.

use crate::map::MapTiles;
use crate::tile::{Tile, TileId};

/// Resumable ring-by-ring tile finder.
pub struct RadialTileFinder<'a, F> {
    map: &'a MapTiles,
    origin: (i32, i32),
    extents: (i32, i32),
    step: i32,
    max_radius: i32,
    next_radius: i32,
    pending: Vec<TileId>,
    predicate: F,
}

impl<'a, F: Fn(&Tile) -> bool> RadialTileFinder<'a, F> {
    /// Set up a scan around `center` for a footprint of `extents`
    /// tiles, growing the ring radius by `step` per ring, out to
    /// `max_radius`.
    ///
    /// Tiles outside the map or its playable bounds are skipped before
    /// the predicate runs.
    pub fn new(
        map: &'a MapTiles,
        center: TileId,
        extents: (i32, i32),
        step: i32,
        max_radius: i32,
        predicate: F,
    ) -> Self {
        let origin = map
            .tile(center)
            .map_or((0, 0), |tile| (tile.rx, tile.ry));
        Self {
            map,
            origin,
            extents,
            step: step.max(1),
            max_radius,
            next_radius: 0,
            pending: Vec::new(),
            predicate,
        }
    }

    /// The next matching tile, scanning outward; `None` once every
    /// ring up to the maximum radius is exhausted.
    pub fn next_tile(&mut self) -> Option<TileId> {
        loop {
            if let Some(tile) = self.take_pending() {
                return Some(tile);
            }
            if self.next_radius > self.max_radius {
                return None;
            }
            let radius = self.next_radius;
            self.next_radius += self.step;
            self.scan_ring(radius);
        }
    }

    fn take_pending(&mut self) -> Option<TileId> {
        if self.pending.is_empty() {
            None
        } else {
            Some(self.pending.remove(0))
        }
    }

    fn scan_ring(&mut self, radius: i32) {
        let (width, height) = self.extents;
        for dx in -radius..width + radius {
            for dy in -radius..height + radius {
                let on_perimeter = radius == 0
                    || dx == -radius
                    || dx == width + radius - 1
                    || dy == -radius
                    || dy == height + radius - 1;
                if !on_perimeter {
                    continue;
                }
                let Some(tile) = self.map.tile_at(self.origin.0 + dx, self.origin.1 + dy) else {
                    continue;
                };
                if !self.map.is_within_bounds(tile) {
                    continue;
                }
                if (self.predicate)(tile) {
                    self.pending.push(tile.id);
                }
            }
        }
    }
}
