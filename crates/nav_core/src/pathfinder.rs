//! Bounded best-effort A* search over a [`Graph`].
//!
//! The search is generic over node keys and payloads; cost and
//! heuristic functions are injected so the same machinery serves every
//! movement type. Expansion is capped, and when the cap is hit the
//! search can fall back to a partial path toward the node it saw that
//! lies nearest the goal.
//!
//! Ties on estimated cost break toward the lower node key, so runs
//! over identical graphs always produce identical paths.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap, HashSet};
use std::hash::Hash;

use crate::graph::Graph;
use crate::math::Fixed;

/// Path shape context handed to the heuristic.
///
/// `parent` is the node being expanded and `grandparent` the node it
/// was reached from, letting the heuristic charge for direction
/// changes.
pub struct PathContext<'p, D> {
    /// Payload of the node whose neighbor is being scored.
    pub parent: &'p D,
    /// Payload of the node `parent` was reached from, if any.
    pub grandparent: Option<&'p D>,
}

/// Search configuration. The caller owns the cost functions; the
/// finder borrows them for the duration of one query and works with
/// any key type the graph uses.
pub struct PathFinder<'a, D> {
    /// Exact cost of traversing one link.
    pub distance: &'a dyn Fn(&D, &D) -> Fixed,
    /// Estimated remaining cost from a node to the goal.
    pub heuristic: &'a dyn Fn(&D, &D, PathContext<'_, D>) -> Fixed,
    /// Nodes the search must not traverse.
    pub excluded: Option<&'a dyn Fn(&D) -> bool>,
    /// Expansion cap; one expansion is one node settled.
    pub max_expanded: usize,
    /// On cap exhaustion, return a partial path toward the goal
    /// instead of nothing.
    pub best_effort: bool,
}

struct SearchNode<K> {
    estimate: Fixed,
    key: K,
}

impl<K: Eq> PartialEq for SearchNode<K> {
    fn eq(&self, other: &Self) -> bool {
        self.estimate == other.estimate && self.key == other.key
    }
}

impl<K: Eq> Eq for SearchNode<K> {}

impl<K: Ord> PartialOrd for SearchNode<K> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<K: Ord> Ord for SearchNode<K> {
    // BinaryHeap is a max-heap; reverse both fields for a
    // deterministic min-heap.
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .estimate
            .cmp(&self.estimate)
            .then_with(|| other.key.cmp(&self.key))
    }
}

impl<D> PathFinder<'_, D> {
    /// Search for a path from `start` to `goal`.
    ///
    /// Returns node keys in goal-to-start order. An empty result means
    /// no path was found; a result not ending at the goal means the
    /// expansion cap was hit and best-effort mode returned the partial
    /// path to the reachable node nearest the goal.
    #[must_use]
    pub fn find<K>(&self, graph: &Graph<K, D>, start: K, goal: K) -> Vec<K>
    where
        K: Copy + Eq + Hash + Ord,
    {
        let (Some(start_node), Some(goal_node)) = (graph.node(start), graph.node(goal)) else {
            return Vec::new();
        };
        if start == goal {
            return vec![start];
        }

        let mut open = BinaryHeap::new();
        let mut g_score: HashMap<K, Fixed> = HashMap::new();
        let mut came_from: HashMap<K, K> = HashMap::new();
        let mut closed: HashSet<K> = HashSet::new();

        g_score.insert(start, Fixed::ZERO);
        open.push(SearchNode {
            estimate: (self.heuristic)(
                &start_node.data,
                &goal_node.data,
                PathContext {
                    parent: &start_node.data,
                    grandparent: None,
                },
            ),
            key: start,
        });

        // Fallback target for best-effort partial paths.
        let mut nearest_key = start;
        let mut nearest_dist = (self.distance)(&start_node.data, &goal_node.data);

        let mut expanded = 0usize;
        while let Some(SearchNode { key: current, .. }) = open.pop() {
            if !closed.insert(current) {
                continue;
            }
            if current == goal {
                return reconstruct(&came_from, start, goal);
            }
            expanded += 1;
            if expanded >= self.max_expanded {
                if self.best_effort && nearest_key != start {
                    return reconstruct(&came_from, start, nearest_key);
                }
                return Vec::new();
            }

            let Some(current_node) = graph.node(current) else {
                continue;
            };
            let current_g = g_score.get(&current).copied().unwrap_or(Fixed::ZERO);
            let grandparent = came_from
                .get(&current)
                .and_then(|key| graph.node(*key))
                .map(|node| &node.data);

            for neighbor in current_node.links() {
                let neighbor = *neighbor;
                if closed.contains(&neighbor) {
                    continue;
                }
                let Some(neighbor_node) = graph.node(neighbor) else {
                    continue;
                };
                if neighbor != goal {
                    if let Some(excluded) = self.excluded {
                        if excluded(&neighbor_node.data) {
                            continue;
                        }
                    }
                }

                let tentative = current_g + (self.distance)(&current_node.data, &neighbor_node.data);
                let known = g_score.get(&neighbor).copied();
                if known.is_some_and(|g| g <= tentative) {
                    continue;
                }
                g_score.insert(neighbor, tentative);
                came_from.insert(neighbor, current);

                let remaining = (self.heuristic)(
                    &neighbor_node.data,
                    &goal_node.data,
                    PathContext {
                        parent: &current_node.data,
                        grandparent,
                    },
                );
                open.push(SearchNode {
                    estimate: tentative + remaining,
                    key: neighbor,
                });

                let to_goal = (self.distance)(&neighbor_node.data, &goal_node.data);
                if to_goal < nearest_dist || (to_goal == nearest_dist && neighbor < nearest_key) {
                    nearest_dist = to_goal;
                    nearest_key = neighbor;
                }
            }
        }

        Vec::new()
    }
}

fn reconstruct<K: Copy + Eq + Hash>(came_from: &HashMap<K, K>, start: K, end: K) -> Vec<K> {
    let mut path = vec![end];
    let mut current = end;
    while current != start {
        match came_from.get(&current) {
            Some(previous) => {
                current = *previous;
                path.push(current);
            }
            None => return Vec::new(),
        }
    }
    path
}
