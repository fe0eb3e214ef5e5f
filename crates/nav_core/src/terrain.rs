//! Cached passability graphs and the path/obstacle query surface.
//!
//! One adjacency graph is maintained per movement type and elevation
//! level, built lazily and patched incrementally as occupancy changes
//! arrive. Connected-component ("island") ids over each graph let
//! unreachable queries fail in constant time; blocked destinations are
//! retargeted to a nearby substitute tile via an expanding ring scan.
//!
//! All temporary mutations a query makes to a cached graph (forced
//! start nodes, ignored-blocker overrides) are rolled back before the
//! query returns, so the cache always matches the unmodified world.

use std::cell::RefCell;
use std::collections::{BTreeSet, HashMap};
use std::rc::Rc;

use crate::events::Subscription;
use crate::graph::Graph;
use crate::map::{Bridge, MapTiles};
use crate::math::{octile_distance, Fixed, TURN_PENALTY};
use crate::object::{GameObject, ObjectId, ObjectKind, OverlayKind};
use crate::occupancy::{Occupancy, OccupancyChange};
use crate::pathfinder::{PathContext, PathFinder};
use crate::radial::RadialTileFinder;
use crate::rules::{MovementType, Rules};
use crate::tile::{Direction, LandType, NodeKey, SubCellSet, Theater, Tile, TileId};

/// Traversal level a passability graph is cached for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ElevationLevel {
    /// Ground-level traversal.
    Ground,
    /// Bridge-deck traversal.
    Bridge,
}

impl ElevationLevel {
    /// Both levels.
    pub const ALL: [ElevationLevel; 2] = [ElevationLevel::Ground, ElevationLevel::Bridge];
}

type CacheKey = (MovementType, ElevationLevel);

/// Payload of one passability-graph node.
#[derive(Clone, Debug)]
pub struct NodeData {
    /// The tile this node stands on.
    pub tile: TileId,
    /// Tile column, cached for cost functions.
    pub rx: i32,
    /// Tile row, cached for cost functions.
    pub ry: i32,
    /// Bridge-deck node when true, ground node otherwise.
    pub on_bridge: bool,
    /// Connected-component label; `None` until the next island
    /// recomputation reaches this node.
    pub island: Option<u32>,
}

/// One waypoint of a computed route.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PathNode {
    /// The waypoint tile.
    pub tile: TileId,
    /// The bridge traversed at this waypoint, when on a deck.
    pub on_bridge: Option<Bridge>,
}

/// A blocking occupant reported by [`Terrain::find_obstacles`].
#[derive(Clone, Debug)]
pub struct Obstacle {
    /// Snapshot of the blocking object.
    pub obj: GameObject,
    /// Static obstacles never move; callers wait on non-static ones.
    pub is_static: bool,
}

/// Options of one [`Terrain::compute_path`] call.
pub struct PathOptions<'a> {
    /// Search expansion cap.
    pub max_expanded: usize,
    /// Accept a partial path toward the goal when the cap is hit.
    pub best_effort: bool,
    /// Waypoints the route must not use.
    pub exclude_tiles: Option<&'a dyn Fn(&PathNode) -> bool>,
    /// Objects whose occupancy must not block this query, typically
    /// the moving unit itself and any escorted units.
    pub ignored_blockers: &'a [ObjectId],
}

impl Default for PathOptions<'_> {
    fn default() -> Self {
        Self {
            max_expanded: usize::MAX,
            best_effort: true,
            exclude_tiles: None,
            ignored_blockers: &[],
        }
    }
}

#[derive(Default)]
struct TerrainCache {
    graphs: HashMap<CacheKey, Graph<NodeKey, NodeData>>,
    dirty: HashMap<CacheKey, BTreeSet<TileId>>,
}

/// Passability and pathfinding engine over one map.
///
/// Holds shared handles to the map, occupancy tracker, and rules, and
/// subscribes to their change events for cache invalidation. Dropping
/// the terrain (or calling [`dispose`](Terrain::dispose)) releases the
/// subscriptions.
pub struct Terrain {
    theater: Theater,
    map: Rc<MapTiles>,
    occupancy: Occupancy,
    rules: Rc<Rules>,
    cache: Rc<RefCell<TerrainCache>>,
    subscriptions: Vec<Subscription>,
}

impl Terrain {
    /// Wire the engine up to its world-state sources.
    #[must_use]
    pub fn new(theater: Theater, map: Rc<MapTiles>, occupancy: Occupancy, rules: Rc<Rules>) -> Self {
        let cache = Rc::new(RefCell::new(TerrainCache::default()));
        let mut subscriptions = Vec::new();

        {
            let cache = Rc::clone(&cache);
            let map = Rc::clone(&map);
            subscriptions.push(occupancy.on_change().subscribe(move |change: &OccupancyChange| {
                let mut cache = cache.borrow_mut();
                if cache.graphs.is_empty() {
                    return;
                }
                let mut relevant: Vec<TileId> = Vec::new();
                for tile_id in &change.tiles {
                    let Some(tile) = map.tile(*tile_id) else {
                        continue;
                    };
                    if affects_passability(&map, theater, &change.object, tile) {
                        relevant.push(*tile_id);
                    }
                }
                if relevant.is_empty() {
                    return;
                }
                tracing::debug!(
                    tiles = relevant.len(),
                    object = change.object.id.as_u32(),
                    "occupancy change invalidates passability"
                );
                let keys: Vec<CacheKey> = cache.graphs.keys().copied().collect();
                for key in keys {
                    cache
                        .dirty
                        .entry(key)
                        .or_default()
                        .extend(relevant.iter().copied());
                }
            }));
        }

        {
            let cache = Rc::clone(&cache);
            subscriptions.push(map.on_local_resize().subscribe(move |()| {
                let mut cache = cache.borrow_mut();
                if cache.graphs.is_empty() && cache.dirty.is_empty() {
                    return;
                }
                tracing::debug!("map bounds changed, discarding passability cache");
                cache.graphs.clear();
                cache.dirty.clear();
            }));
        }

        Self {
            theater,
            map,
            occupancy,
            rules,
            cache,
            subscriptions,
        }
    }

    /// Release every event subscription. Further world mutations no
    /// longer invalidate the cache; queries keep working on stale data.
    pub fn dispose(&mut self) {
        self.subscriptions.clear();
    }

    /// Eagerly build every passability graph except for flying
    /// movement, which needs none.
    pub fn compute_all_passability_graphs(&self) {
        let mut cache = self.cache.borrow_mut();
        for movement in MovementType::ALL {
            if movement == MovementType::Fly {
                continue;
            }
            for level in ElevationLevel::ALL {
                self.ensure_graph(&mut cache, (movement, level));
            }
        }
    }

    /// Compute a route from start to destination.
    ///
    /// Returns waypoints in travel order, or an empty vector when no
    /// route exists. A route may end at a substitute tile near the
    /// destination when the destination itself is blocked.
    #[must_use]
    #[allow(clippy::too_many_lines)]
    pub fn compute_path(
        &self,
        movement: MovementType,
        level: ElevationLevel,
        start_tile: TileId,
        start_on_bridge: bool,
        end_tile: TileId,
        end_on_bridge: bool,
        options: &PathOptions<'_>,
    ) -> Vec<PathNode> {
        if movement == MovementType::Fly {
            return vec![
                self.path_node(start_tile, start_on_bridge),
                self.path_node(end_tile, end_on_bridge),
            ];
        }

        let key = (movement, level);
        let mut cache = self.cache.borrow_mut();
        self.ensure_graph(&mut cache, key);
        let Some(graph) = cache.graphs.get_mut(&key) else {
            return Vec::new();
        };

        // Tiles whose nodes were temporarily mutated for this query;
        // reprocessed against the unmodified world before returning.
        let mut touched: BTreeSet<TileId> = BTreeSet::new();
        let mut islands_valid = true;

        if !options.ignored_blockers.is_empty() {
            islands_valid = false;
            let mut override_tiles: BTreeSet<TileId> = BTreeSet::new();
            for id in options.ignored_blockers {
                if let Some(obj) = self.occupancy.object(*id) {
                    override_tiles.extend(self.occupancy.tiles_for_object(&obj, &self.map));
                }
            }
            for tile_id in override_tiles {
                if let Some(tile) = self.map.tile(tile_id) {
                    touched.insert(tile_id);
                    self.process_tile(
                        graph,
                        movement,
                        tile,
                        &Direction::ALL,
                        options.ignored_blockers,
                    );
                }
            }
        }

        let start_key = NodeKey {
            tile: start_tile,
            bridge: start_on_bridge,
        };
        if !graph.has_node(start_key) {
            // A unit departing from inside a structure still needs a
            // node to search from.
            if let Some(tile) = self.map.tile(start_tile) {
                touched.insert(start_tile);
                self.process_tile_level(
                    graph,
                    movement,
                    tile,
                    start_on_bridge,
                    &Direction::ALL,
                    options.ignored_blockers,
                    true,
                );
            }
        }

        let end_key = NodeKey {
            tile: end_tile,
            bridge: end_on_bridge,
        };
        let start_island = graph.node(start_key).and_then(|node| node.data.island);
        let end_island = graph.node(end_key).and_then(|node| node.data.island);
        let islands_usable = islands_valid && start_island.is_some() && end_island.is_some();
        let reachable = if islands_usable {
            start_island == end_island
        } else {
            self.map.tile(end_tile).is_some_and(|tile| {
                self.passable_speed(tile, movement, end_on_bridge, options.ignored_blockers, false)
                    > Fixed::ZERO
            })
        };

        let mut target_key = end_key;
        let mut max_expanded = options.max_expanded;
        if !reachable || !graph.has_node(target_key) {
            let max_radius = if islands_usable { 15 } else { 5 };
            let end_z = self.map.tile(end_tile).map_or(0, |tile| tile.z);
            let substitute = {
                let graph_ref: &Graph<NodeKey, NodeData> = graph;
                let predicate = |tile: &Tile| {
                    let Some(node) = graph_ref.node(NodeKey::ground(tile.id)) else {
                        return false;
                    };
                    if (tile.z - end_z).abs() >= 2 {
                        return false;
                    }
                    if islands_usable && node.data.island != start_island {
                        return false;
                    }
                    if let Some(exclude) = options.exclude_tiles {
                        if exclude(&PathNode {
                            tile: tile.id,
                            on_bridge: None,
                        }) {
                            return false;
                        }
                    }
                    true
                };
                let mut finder =
                    RadialTileFinder::new(&self.map, end_tile, (1, 1), 1, max_radius, predicate);
                finder.next_tile()
            };
            match substitute {
                Some(tile_id) => {
                    // Substitute destinations are always ground level.
                    target_key = NodeKey::ground(tile_id);
                }
                None if islands_usable => {
                    // Destination island is provably unreachable.
                    self.rollback(graph, movement, &touched);
                    return Vec::new();
                }
                None => {
                    let Some(tile) = self.map.tile(end_tile) else {
                        self.rollback(graph, movement, &touched);
                        return Vec::new();
                    };
                    // Bounded last attempt at the literal destination.
                    touched.insert(end_tile);
                    self.process_tile_level(
                        graph,
                        movement,
                        tile,
                        end_on_bridge,
                        &Direction::ALL,
                        options.ignored_blockers,
                        true,
                    );
                    max_expanded = max_expanded.min(500);
                }
            }
        }

        let exclude_fn;
        let excluded: Option<&dyn Fn(&NodeData) -> bool> = match options.exclude_tiles {
            Some(exclude) => {
                let occupancy = &self.occupancy;
                exclude_fn = move |data: &NodeData| {
                    let on_bridge = if data.on_bridge {
                        occupancy.bridge_on_tile(data.tile)
                    } else {
                        None
                    };
                    exclude(&PathNode {
                        tile: data.tile,
                        on_bridge,
                    })
                };
                Some(&exclude_fn)
            }
            None => None,
        };

        let finder = PathFinder {
            distance: &node_distance,
            heuristic: &node_heuristic,
            excluded,
            max_expanded,
            best_effort: options.best_effort,
        };
        let keys = finder.find(graph, start_key, target_key);

        let mut valid = keys.len() >= 2;
        if valid && options.exclude_tiles.is_some() && !options.best_effort {
            valid = keys.last() == Some(&start_key) && keys.first() == Some(&target_key);
        }

        self.rollback(graph, movement, &touched);

        if !valid {
            return Vec::new();
        }
        keys.iter()
            .rev()
            .map(|key| self.path_node(key.tile, key.bridge))
            .collect()
    }

    /// Blocking occupants of a path node from `unit`'s point of view.
    ///
    /// Scans the ground-level occupants of the node's tile, skipping
    /// the unit itself, and classifies each as a static blocker, a
    /// unit occupying or holding a reservation on the node, a
    /// crushable object, a terrain prop contesting the unit's
    /// sub-cell, or a closed gate.
    #[must_use]
    pub fn find_obstacles(&self, node: &PathNode, unit: &GameObject) -> Vec<Obstacle> {
        let Some(movement) = unit.movement else {
            return Vec::new();
        };
        let Some(tile) = self.map.tile(node.tile) else {
            return Vec::new();
        };
        let infantry = matches!(unit.kind, ObjectKind::Infantry);
        let bridge_level = node.on_bridge.is_some();
        let node_key = NodeKey {
            tile: node.tile,
            bridge: bridge_level,
        };

        let mut obstacles = Vec::new();
        for obj in self.occupancy.ground_objects_on_tile(node.tile) {
            if obj.id == unit.id {
                continue;
            }
            if is_blocker_object(&self.map, self.theater, &obj, tile, bridge_level, movement, infantry)
            {
                obstacles.push(Obstacle {
                    obj,
                    is_static: true,
                });
                continue;
            }
            if obj.kind.is_unit() {
                let occupies = obj.tile == node.tile && obj.on_bridge == bridge_level;
                let reserved = obj.reserved_nodes.contains(&node_key);
                if occupies || reserved {
                    if infantry
                        && matches!(obj.kind, ObjectKind::Infantry)
                        && obj.sub_cell != unit.sub_cell
                    {
                        // Different sub-cell slots share the tile.
                        continue;
                    }
                    obstacles.push(Obstacle {
                        obj,
                        is_static: false,
                    });
                    continue;
                }
            }
            if obj.crushable && matches!(movement, MovementType::Track | MovementType::Hover) {
                obstacles.push(Obstacle {
                    obj,
                    is_static: false,
                });
                continue;
            }
            if infantry {
                if let ObjectKind::TerrainObject { occupied_sub_cells } = &obj.kind {
                    if occupied_sub_cells.contains(unit.sub_cell) {
                        obstacles.push(Obstacle {
                            obj,
                            is_static: true,
                        });
                        continue;
                    }
                }
            }
            if let ObjectKind::Building(info) = &obj.kind {
                if info.gate {
                    obstacles.push(Obstacle {
                        obj,
                        is_static: false,
                    });
                }
            }
        }
        obstacles
    }

    /// Speed modifier of a tile for one movement type and traversal
    /// level, zero meaning impassable.
    ///
    /// Resolves the on-bridge land type at bridge level, substitutes
    /// the underlying terrain for walls under tracked movement, and
    /// unless `skip_blocker_check` is set scans tile occupants for
    /// blockers not listed in `ignored_blockers`.
    #[must_use]
    pub fn passable_speed(
        &self,
        tile: &Tile,
        movement: MovementType,
        bridge_level: bool,
        ignored_blockers: &[ObjectId],
        skip_blocker_check: bool,
    ) -> Fixed {
        if !self.map.is_within_bounds(tile) {
            return Fixed::ZERO;
        }
        let mut land = if bridge_level {
            match tile.on_bridge_land_type {
                Some(land) => land,
                None => return Fixed::ZERO,
            }
        } else {
            tile.land_type
        };
        // Tracked movement crushes walls down to the terrain below.
        if land == LandType::Wall && movement == MovementType::Track {
            land = tile.terrain_type.land_type();
        }
        let modifier = self.rules.speed_modifier(land, movement);
        if modifier == Fixed::ZERO {
            return Fixed::ZERO;
        }
        if !skip_blocker_check {
            let infantry = movement == MovementType::Foot;
            for obj in self.occupancy.objects_on_tile(tile.id) {
                if ignored_blockers.contains(&obj.id) {
                    continue;
                }
                if is_blocker_object(&self.map, self.theater, &obj, tile, bridge_level, movement, infantry)
                {
                    return Fixed::ZERO;
                }
            }
        }
        modifier
    }

    fn path_node(&self, tile: TileId, on_bridge: bool) -> PathNode {
        PathNode {
            tile,
            on_bridge: if on_bridge {
                self.occupancy.bridge_on_tile(tile)
            } else {
                None
            },
        }
    }

    fn ensure_graph(&self, cache: &mut TerrainCache, key: CacheKey) {
        if !cache.graphs.contains_key(&key) {
            let graph = self.build_graph(key.0);
            tracing::debug!(
                movement = ?key.0,
                level = ?key.1,
                nodes = graph.len(),
                "built passability graph"
            );
            cache.graphs.insert(key, graph);
            cache.dirty.remove(&key);
            return;
        }
        if let Some(dirty) = cache.dirty.remove(&key) {
            if dirty.is_empty() {
                return;
            }
            let Some(graph) = cache.graphs.get_mut(&key) else {
                return;
            };
            tracing::debug!(
                movement = ?key.0,
                level = ?key.1,
                tiles = dirty.len(),
                "applying dirty tiles to passability graph"
            );
            self.apply_dirty(graph, key.0, &dirty);
        }
    }

    fn build_graph(&self, movement: MovementType) -> Graph<NodeKey, NodeData> {
        let mut graph = Graph::new();
        // Row-major sweep; linking only to already-visited neighbors
        // covers every edge once.
        self.map.for_each_tile(|tile| {
            self.process_tile(&mut graph, movement, tile, &Direction::CANONICAL, &[]);
        });
        self.recompute_islands(&mut graph);
        graph
    }

    /// Patch the graph for a set of changed tiles, then recompute the
    /// island labels from scratch.
    ///
    /// Every neighbor of a dirty tile is reprocessed too: diagonal
    /// adjacency between two neighbors depends on the tile between
    /// them, so their edges may flip without their own passability
    /// changing.
    fn apply_dirty(
        &self,
        graph: &mut Graph<NodeKey, NodeData>,
        movement: MovementType,
        dirty: &BTreeSet<TileId>,
    ) {
        let mut affected: BTreeSet<TileId> = BTreeSet::new();
        for tile_id in dirty {
            let Some(tile) = self.map.tile(*tile_id) else {
                continue;
            };
            affected.insert(*tile_id);
            for direction in Direction::ALL {
                if let Some(neighbor) = self.map.neighbor(tile, direction) {
                    affected.insert(neighbor.id);
                }
            }
        }
        for tile_id in &affected {
            if let Some(tile) = self.map.tile(*tile_id) {
                self.process_tile(graph, movement, tile, &Direction::ALL, &[]);
            }
        }
        self.recompute_islands(graph);
    }

    /// Reprocess temporarily mutated tiles against the unmodified
    /// world. Existing nodes keep their payload, so island labels
    /// survive; nodes without a passable counterpart are removed.
    fn rollback(
        &self,
        graph: &mut Graph<NodeKey, NodeData>,
        movement: MovementType,
        touched: &BTreeSet<TileId>,
    ) {
        for tile_id in touched {
            if let Some(tile) = self.map.tile(*tile_id) {
                self.process_tile(graph, movement, tile, &Direction::ALL, &[]);
            }
        }
    }

    fn process_tile(
        &self,
        graph: &mut Graph<NodeKey, NodeData>,
        movement: MovementType,
        tile: &Tile,
        directions: &[Direction],
        ignored_blockers: &[ObjectId],
    ) {
        self.process_tile_level(graph, movement, tile, false, directions, ignored_blockers, false);
        self.process_tile_level(graph, movement, tile, true, directions, ignored_blockers, false);
    }

    /// Recompute one tile's node at one traversal level and its links
    /// in the given directions.
    #[allow(clippy::too_many_arguments)]
    fn process_tile_level(
        &self,
        graph: &mut Graph<NodeKey, NodeData>,
        movement: MovementType,
        tile: &Tile,
        bridge_level: bool,
        directions: &[Direction],
        ignored_blockers: &[ObjectId],
        forced: bool,
    ) {
        let key = NodeKey {
            tile: tile.id,
            bridge: bridge_level,
        };
        if bridge_level && self.occupancy.bridge_on_tile(tile.id).is_none() {
            graph.remove_node(key);
            return;
        }
        let passable = forced
            || self.passable_speed(tile, movement, bridge_level, ignored_blockers, false)
                > Fixed::ZERO;
        if !passable {
            graph.remove_node(key);
            return;
        }
        if !graph.has_node(key) {
            graph.add_node(
                key,
                NodeData {
                    tile: tile.id,
                    rx: tile.rx,
                    ry: tile.ry,
                    on_bridge: bridge_level,
                    island: None,
                },
            );
        }
        for direction in directions {
            if let Some(neighbor) = self.map.neighbor(tile, *direction) {
                // Drop stale links before re-deriving them, so a
                // reprocess converges to the same edges a from-scratch
                // build would produce.
                graph.remove_link(key, NodeKey::ground(neighbor.id));
                graph.remove_link(key, NodeKey::on_bridge(neighbor.id));
                self.connect_tiles(
                    graph,
                    movement,
                    tile,
                    bridge_level,
                    neighbor,
                    *direction,
                    ignored_blockers,
                );
            }
        }
    }

    /// Link a tile node to a neighbor where elevation allows.
    ///
    /// The elevation tolerance is one level on open ground and zero
    /// when either side is on a bridge deck. High bridges are the
    /// exception: where the raw tile elevations match and the
    /// originating ground node exists, the crossing is treated as
    /// ground level for that edge, ignoring the bridge context.
    #[allow(clippy::too_many_arguments)]
    fn connect_tiles(
        &self,
        graph: &mut Graph<NodeKey, NodeData>,
        movement: MovementType,
        tile: &Tile,
        bridge_level: bool,
        neighbor: &Tile,
        direction: Direction,
        ignored_blockers: &[ObjectId],
    ) {
        let origin_key = NodeKey {
            tile: tile.id,
            bridge: bridge_level,
        };
        if !graph.has_node(origin_key) {
            return;
        }
        let origin_bridge = self.occupancy.bridge_on_tile(tile.id);
        let origin_z = tile.z
            + if bridge_level {
                origin_bridge.map_or(0, |bridge| bridge.elevation_offset)
            } else {
                0
            };
        let neighbor_bridge = self.occupancy.bridge_on_tile(neighbor.id);

        for candidate_level in [false, true] {
            let candidate_key = NodeKey {
                tile: neighbor.id,
                bridge: candidate_level,
            };
            if !graph.has_node(candidate_key) {
                continue;
            }

            let origin_high = bridge_level && origin_bridge.is_some_and(|bridge| bridge.high);
            let candidate_high =
                candidate_level && neighbor_bridge.is_some_and(|bridge| bridge.high);
            if (origin_high || candidate_high)
                && tile.z == neighbor.z
                && graph.has_node(NodeKey::ground(tile.id))
            {
                let ground_candidate = NodeKey::ground(neighbor.id);
                if graph.has_node(ground_candidate) {
                    graph.add_link(NodeKey::ground(tile.id), ground_candidate);
                }
                continue;
            }

            let candidate_z = neighbor.z
                + if candidate_level {
                    neighbor_bridge.map_or(0, |bridge| bridge.elevation_offset)
                } else {
                    0
                };
            let max_dz = i32::from(!bridge_level && !candidate_level);
            if (origin_z - candidate_z).abs() > max_dz {
                continue;
            }
            if !bridge_level
                && !candidate_level
                && direction.is_diagonal()
                && !self.diagonal_corners_clear(movement, tile, direction, ignored_blockers)
            {
                continue;
            }
            graph.add_link(origin_key, candidate_key);
        }
    }

    /// Both orthogonal tiles flanking a diagonal step must be passable
    /// for the step to be allowed, so routes never cut corners through
    /// blocked cells.
    fn diagonal_corners_clear(
        &self,
        movement: MovementType,
        tile: &Tile,
        direction: Direction,
        ignored_blockers: &[ObjectId],
    ) -> bool {
        let (dx, dy) = direction.offset();
        let horizontal = self.map.tile_at(tile.rx + dx, tile.ry);
        let vertical = self.map.tile_at(tile.rx, tile.ry + dy);
        match (horizontal, vertical) {
            (Some(horizontal), Some(vertical)) => {
                self.passable_speed(horizontal, movement, false, ignored_blockers, false)
                    > Fixed::ZERO
                    && self.passable_speed(vertical, movement, false, ignored_blockers, false)
                        > Fixed::ZERO
            }
            _ => false,
        }
    }

    /// Relabel every node with its connected-component id.
    ///
    /// Flood fill seeded in sorted key order, so labels are
    /// deterministic for a given graph shape.
    fn recompute_islands(&self, graph: &mut Graph<NodeKey, NodeData>) {
        let mut keys: Vec<NodeKey> = graph.keys().collect();
        keys.sort_unstable();
        for key in &keys {
            if let Some(node) = graph.node_mut(*key) {
                node.data.island = None;
            }
        }
        let mut next_island = 0u32;
        let mut stack: Vec<NodeKey> = Vec::new();
        for key in keys {
            if graph
                .node(key)
                .is_some_and(|node| node.data.island.is_some())
            {
                continue;
            }
            let island = next_island;
            next_island += 1;
            stack.push(key);
            while let Some(current) = stack.pop() {
                let labeled = match graph.node_mut(current) {
                    Some(node) => {
                        if node.data.island.is_some() {
                            true
                        } else {
                            node.data.island = Some(island);
                            false
                        }
                    }
                    None => true,
                };
                if labeled {
                    continue;
                }
                stack.extend(graph.neighbors(current));
            }
        }
    }
}

fn node_distance(a: &NodeData, b: &NodeData) -> Fixed {
    octile_distance(b.rx - a.rx, b.ry - a.ry)
}

fn node_heuristic(node: &NodeData, goal: &NodeData, context: PathContext<'_, NodeData>) -> Fixed {
    let mut cost = octile_distance(goal.rx - node.rx, goal.ry - node.ry);
    if let Some(grandparent) = context.grandparent {
        let previous = (
            context.parent.rx - grandparent.rx,
            context.parent.ry - grandparent.ry,
        );
        let next = (node.rx - context.parent.rx, node.ry - context.parent.ry);
        if previous != next {
            cost += TURN_PENALTY;
        }
    }
    cost
}

/// Whether an object blocks a tile for one movement type and
/// traversal level.
///
/// Classification runs in a fixed precedence order: terrain props
/// first (full sub-cell occupation required to block infantry), then
/// building footprints, then the kinds that never block, then overlay
/// special cases, and finally the crushable exemption for heavy
/// movement.
#[must_use]
pub fn is_blocker_object(
    map: &MapTiles,
    theater: Theater,
    obj: &GameObject,
    tile: &Tile,
    bridge_level: bool,
    movement: MovementType,
    infantry: bool,
) -> bool {
    match &obj.kind {
        ObjectKind::TerrainObject { occupied_sub_cells } => {
            if infantry && *occupied_sub_cells != SubCellSet::occupiable(theater) {
                return false;
            }
        }
        ObjectKind::Building(info) => {
            if info.invisible_in_game || info.gate || (info.destroyed && info.leaves_rubble) {
                return false;
            }
            let Some(origin) = map.tile(obj.tile) else {
                return false;
            };
            let (width, height) = info.foundation;
            let dx = tile.rx - origin.rx;
            let dy = tile.ry - origin.ry;
            if dx < 0 || dy < 0 || dx >= i32::from(width) || dy >= i32::from(height) {
                return false;
            }
            let blocked_rows = info.impassable_rows.unwrap_or(if infantry {
                height
            } else if info.weapons_factory {
                // The last foundation row is the factory exit.
                height.saturating_sub(1)
            } else {
                height
            });
            if dy >= i32::from(blocked_rows) {
                return false;
            }
        }
        ObjectKind::Aircraft
        | ObjectKind::Infantry
        | ObjectKind::Vehicle
        | ObjectKind::Smudge => return false,
        ObjectKind::Overlay(kind) => match kind {
            OverlayKind::BridgeDeck if bridge_level => return false,
            OverlayKind::HighBridge if !bridge_level => return false,
            OverlayKind::ResourceDeposit
            | OverlayKind::Crate
            | OverlayKind::BridgePlaceholder => return false,
            _ => {}
        },
    }
    if obj.crushable && matches!(movement, MovementType::Track | MovementType::Hover) {
        return false;
    }
    true
}

/// Whether an occupancy change involving `obj` on `tile` can change
/// any passability graph.
fn affects_passability(map: &MapTiles, theater: Theater, obj: &GameObject, tile: &Tile) -> bool {
    match &obj.kind {
        ObjectKind::Overlay(
            OverlayKind::BridgeDeck
            | OverlayKind::HighBridge
            | OverlayKind::BridgePlaceholder
            | OverlayKind::ResourceDeposit,
        ) => true,
        ObjectKind::Building(info) if info.leaves_rubble => true,
        _ => {
            // Check both levels with a representative ground movement;
            // blocker classification only varies by level and the
            // crushable/infantry flags, which the dirty rebuild will
            // re-evaluate per graph anyway.
            is_blocker_object(map, theater, obj, tile, false, MovementType::Wheel, false)
                || is_blocker_object(map, theater, obj, tile, true, MovementType::Wheel, false)
        }
    }
}
