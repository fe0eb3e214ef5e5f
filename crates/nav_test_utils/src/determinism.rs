//! Determinism testing utilities.
//!
//! Provides a harness for verifying that navigation queries produce
//! identical results given identical inputs.
//!
//! # Testing Strategy
//!
//! Route computation must be 100% deterministic for lockstep
//! simulation. Sources of non-determinism include:
//!
//! - **Floating-point math**: Different CPUs can produce different
//!   results. Path costs use fixed-point arithmetic via
//!   [`nav_core::math::Fixed`] throughout.
//!
//! - **HashMap iteration order**: Rust's default hasher is randomized.
//!   Flood fills and dirty-tile drains always iterate in sorted key
//!   order, and the search breaks cost ties toward the lower node key.
//!
//! - **Stale caches**: Incremental invalidation must converge to the
//!   same graph a from-scratch rebuild produces.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

/// Result of a determinism test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeterminismResult {
    /// Whether all runs produced identical results.
    pub is_deterministic: bool,
    /// Hashes from each run.
    pub hashes: Vec<u64>,
}

impl DeterminismResult {
    /// Get all unique hashes (should be 1 for a deterministic query).
    #[must_use]
    pub fn unique_hashes(&self) -> Vec<u64> {
        let mut unique: Vec<u64> = self.hashes.clone();
        unique.sort_unstable();
        unique.dedup();
        unique
    }

    /// Assert that the runs were deterministic, with a detailed error
    /// message.
    ///
    /// # Panics
    ///
    /// Panics if the runs produced different hashes.
    pub fn assert_deterministic(&self) {
        if !self.is_deterministic {
            let unique = self.unique_hashes();
            panic!(
                "Navigation query is non-deterministic!\n\
                 Runs: {}\n\
                 Unique hashes: {} (expected 1)\n\
                 All hashes: {:?}",
                self.hashes.len(),
                unique.len(),
                self.hashes
            );
        }
    }
}

/// Build a world `runs` times and hash the outcome of the same query
/// against each copy.
///
/// # Arguments
///
/// * `runs` - Number of independent world copies to build
/// * `setup` - Function to create one world
/// * `query` - Function to run the query and hash its result
///
/// # Example
///
/// ```
/// use nav_test_utils::determinism::{compute_hash, verify_determinism};
/// use nav_test_utils::fixtures::{path_signature, NavWorld};
/// use nav_core::rules::MovementType;
///
/// let result = verify_determinism(
///     3,
///     || NavWorld::flat(6, 6),
///     |world| compute_hash(&path_signature(&world.path(
///         MovementType::Wheel,
///         (0, 0),
///         (5, 5),
///     ))),
/// );
/// result.assert_deterministic();
/// ```
pub fn verify_determinism<S, Setup, Query>(runs: usize, setup: Setup, query: Query) -> DeterminismResult
where
    Setup: Fn() -> S,
    Query: Fn(&S) -> u64,
{
    let mut hashes = Vec::with_capacity(runs);
    for _ in 0..runs {
        let state = setup();
        hashes.push(query(&state));
    }
    let is_deterministic = hashes.windows(2).all(|w| w[0] == w[1]);
    DeterminismResult {
        is_deterministic,
        hashes,
    }
}

/// Compute a simple hash for any hashable value.
pub fn compute_hash<T: Hash>(value: &T) -> u64 {
    let mut hasher = DefaultHasher::new();
    value.hash(&mut hasher);
    hasher.finish()
}

/// Proptest strategies for navigation testing.
///
/// These strategies generate random but reproducible worlds and
/// queries for property-based testing.
pub mod strategies {
    use proptest::prelude::*;

    use nav_core::rules::MovementType;

    /// Generate a coordinate pair inside a `size` x `size` map.
    pub fn arb_coord(size: i32) -> impl Strategy<Value = (i32, i32)> {
        (0..size, 0..size)
    }

    /// Generate a ground-capable movement type.
    pub fn arb_ground_movement() -> impl Strategy<Value = MovementType> {
        prop_oneof![
            Just(MovementType::Foot),
            Just(MovementType::Wheel),
            Just(MovementType::Track),
            Just(MovementType::Hover),
            Just(MovementType::Amphibious),
        ]
    }

    /// Generate a set of obstacle coordinates inside a `size` x `size`
    /// map.
    pub fn arb_obstacles(size: i32, max: usize) -> impl Strategy<Value = Vec<(i32, i32)>> {
        proptest::collection::vec(arb_coord(size), 0..max)
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;
    use crate::fixtures::{path_signature, NavWorld};
    use nav_core::object::ObjectId;
    use nav_core::rules::MovementType;
    use nav_core::terrain::{ElevationLevel, PathNode, PathOptions};

    const SIZE: i32 = 8;

    fn world_with_obstacles(obstacles: &[(i32, i32)]) -> NavWorld {
        let world = NavWorld::flat(SIZE, SIZE);
        for (index, (rx, ry)) in obstacles.iter().enumerate() {
            #[allow(clippy::cast_possible_truncation)]
            world.place_building(index as u32 + 1, *rx, *ry, (1, 1));
        }
        world
    }

    #[test]
    fn test_verify_determinism_simple() {
        let result = verify_determinism(3, || 7u64, |n| *n);
        assert!(result.is_deterministic);
        assert_eq!(result.unique_hashes().len(), 1);
    }

    #[test]
    fn test_flat_world_path_determinism() {
        let result = verify_determinism(
            5,
            || NavWorld::flat(SIZE, SIZE),
            |world| {
                compute_hash(&path_signature(&world.path(
                    MovementType::Wheel,
                    (0, 0),
                    (SIZE - 1, SIZE - 1),
                )))
            },
        );
        result.assert_deterministic();
    }

    #[test]
    fn test_flat_grid_paths_are_symmetric() {
        let world = NavWorld::flat(SIZE, SIZE);
        let forward = world.path(MovementType::Wheel, (0, 1), (7, 6));
        let backward = world.path(MovementType::Wheel, (7, 6), (0, 1));
        assert_eq!(forward.len(), backward.len());
        assert_eq!(forward.first().map(|n| n.tile), backward.last().map(|n| n.tile));
    }

    proptest! {
        /// Identical worlds answer identical queries identically.
        #[test]
        fn prop_queries_are_deterministic(
            obstacles in strategies::arb_obstacles(SIZE, 8),
            start in strategies::arb_coord(SIZE),
            end in strategies::arb_coord(SIZE),
            movement in strategies::arb_ground_movement(),
        ) {
            let result = verify_determinism(
                2,
                || world_with_obstacles(&obstacles),
                |world| compute_hash(&path_signature(&world.path(movement, start, end))),
            );
            prop_assert!(result.is_deterministic);
        }

        /// Repeating a query on one unchanged world never changes the
        /// answer; temporary query-time mutations must roll back.
        #[test]
        fn prop_repeated_queries_match(
            obstacles in strategies::arb_obstacles(SIZE, 8),
            start in strategies::arb_coord(SIZE),
            end in strategies::arb_coord(SIZE),
        ) {
            let world = world_with_obstacles(&obstacles);
            let first = path_signature(&world.path(MovementType::Wheel, start, end));
            for _ in 0..3 {
                let again = path_signature(&world.path(MovementType::Wheel, start, end));
                prop_assert_eq!(&again, &first);
            }
        }

        /// Graphs patched through invalidation events answer queries
        /// exactly like graphs built from scratch over the final world.
        #[test]
        fn prop_incremental_rebuild_matches_fresh(
            obstacles in strategies::arb_obstacles(SIZE, 8),
            start in strategies::arb_coord(SIZE),
            end in strategies::arb_coord(SIZE),
            movement in strategies::arb_ground_movement(),
        ) {
            // Warm the cache on the empty world, then mutate it.
            let incremental = NavWorld::flat(SIZE, SIZE);
            let _ = incremental.path(movement, (0, 0), (SIZE - 1, SIZE - 1));
            for (index, (rx, ry)) in obstacles.iter().enumerate() {
                #[allow(clippy::cast_possible_truncation)]
                incremental.place_building(index as u32 + 1, *rx, *ry, (1, 1));
            }

            let fresh = world_with_obstacles(&obstacles);

            prop_assert_eq!(
                path_signature(&incremental.path(movement, start, end)),
                path_signature(&fresh.path(movement, start, end))
            );
        }

        /// Island pruning answers "is the exact destination reachable"
        /// identically to a full unpruned search. A non-empty
        /// ignored-blocker list disables pruning, and an id matching no
        /// object leaves passability untouched, so the second query
        /// runs the same search without the island shortcut.
        #[test]
        fn prop_island_pruning_matches_unrestricted_search(
            obstacles in strategies::arb_obstacles(SIZE, 8),
            start in strategies::arb_coord(SIZE),
            end in strategies::arb_coord(SIZE),
        ) {
            let world = world_with_obstacles(&obstacles);
            let end_tile = world.tile_at(end.0, end.1);

            let pruned = world.path(MovementType::Wheel, start, end);
            let unpruned = world.terrain.compute_path(
                MovementType::Wheel,
                ElevationLevel::Ground,
                world.tile_at(start.0, start.1),
                false,
                end_tile,
                false,
                &PathOptions {
                    ignored_blockers: &[ObjectId::new(u32::MAX)],
                    ..PathOptions::default()
                },
            );

            let reaches = |route: &[PathNode]| {
                route.last().is_some_and(|node| node.tile == end_tile)
            };
            prop_assert_eq!(reaches(&pruned), reaches(&unpruned));
        }

        /// Island pruning and the adjacency links are both symmetric,
        /// so a query reaches its exact destination in one direction
        /// exactly when the reverse query does. Only holds when
        /// neither endpoint is itself obstructed.
        #[test]
        fn prop_exact_reachability_is_symmetric(
            obstacles in strategies::arb_obstacles(SIZE, 8),
            start in strategies::arb_coord(SIZE),
            end in strategies::arb_coord(SIZE),
        ) {
            prop_assume!(!obstacles.contains(&start) && !obstacles.contains(&end));
            let world = world_with_obstacles(&obstacles);
            let reaches = |from: (i32, i32), to: (i32, i32)| {
                world
                    .path(MovementType::Wheel, from, to)
                    .last()
                    .is_some_and(|node| node.tile == world.tile_at(to.0, to.1))
            };
            prop_assert_eq!(reaches(start, end), reaches(end, start));
        }

        /// Every returned route starts at the start tile and only
        /// steps between adjacent tiles.
        #[test]
        fn prop_route_steps_are_adjacent(
            obstacles in strategies::arb_obstacles(SIZE, 8),
            start in strategies::arb_coord(SIZE),
            end in strategies::arb_coord(SIZE),
        ) {
            let world = world_with_obstacles(&obstacles);
            let route = world.path(MovementType::Wheel, start, end);
            if let Some(first) = route.first() {
                prop_assert_eq!(first.tile, world.tile_at(start.0, start.1));
            }
            for window in route.windows(2) {
                let a = world.map.tile(window[0].tile).unwrap();
                let b = world.map.tile(window[1].tile).unwrap();
                let step = (a.rx - b.rx).abs().max((a.ry - b.ry).abs());
                prop_assert_eq!(step, 1);
            }
        }
    }
}
