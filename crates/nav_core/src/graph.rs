//! Generic undirected adjacency graph with keyed lookup.
//!
//! Nodes are addressed by a copyable key and carry an arbitrary data
//! payload. Links are symmetric by construction: adding a link makes
//! the two nodes mutual neighbors, and removing a node detaches it
//! from every neighbor's adjacency list.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::hash::Hash;

/// A node payload together with its adjacency list.
#[derive(Clone, Debug)]
pub struct GraphNode<K, D> {
    /// Node payload.
    pub data: D,
    links: Vec<K>,
}

impl<K, D> GraphNode<K, D> {
    /// Keys of the neighboring nodes.
    #[must_use]
    pub fn links(&self) -> &[K] {
        &self.links
    }
}

/// Plain undirected graph keyed by `K` with payload `D`.
#[derive(Clone, Debug, Default)]
pub struct Graph<K, D> {
    nodes: HashMap<K, GraphNode<K, D>>,
}

impl<K: Copy + Eq + Hash, D> Graph<K, D> {
    /// Create an empty graph.
    #[must_use]
    pub fn new() -> Self {
        Self {
            nodes: HashMap::new(),
        }
    }

    /// Number of nodes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the graph has no nodes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Insert a node. If the key already exists its payload is replaced
    /// and its links are kept.
    pub fn add_node(&mut self, key: K, data: D) {
        match self.nodes.entry(key) {
            Entry::Occupied(mut entry) => entry.get_mut().data = data,
            Entry::Vacant(entry) => {
                entry.insert(GraphNode {
                    data,
                    links: Vec::new(),
                });
            }
        }
    }

    /// Look up a node.
    #[must_use]
    pub fn node(&self, key: K) -> Option<&GraphNode<K, D>> {
        self.nodes.get(&key)
    }

    /// Look up a node mutably.
    pub fn node_mut(&mut self, key: K) -> Option<&mut GraphNode<K, D>> {
        self.nodes.get_mut(&key)
    }

    /// Whether a node exists.
    #[must_use]
    pub fn has_node(&self, key: K) -> bool {
        self.nodes.contains_key(&key)
    }

    /// Remove a node, detaching it from every neighbor.
    ///
    /// Returns the removed payload, or `None` if the key was unknown.
    pub fn remove_node(&mut self, key: K) -> Option<D> {
        let node = self.nodes.remove(&key)?;
        for neighbor in &node.links {
            if let Some(other) = self.nodes.get_mut(neighbor) {
                other.links.retain(|k| *k != key);
            }
        }
        Some(node.data)
    }

    /// Add a symmetric link between two existing nodes.
    ///
    /// Idempotent; returns `false` if either node is missing, the keys
    /// are equal, or the link already exists.
    pub fn add_link(&mut self, a: K, b: K) -> bool {
        if a == b || !self.nodes.contains_key(&a) || !self.nodes.contains_key(&b) {
            return false;
        }
        let node_a = self
            .nodes
            .get_mut(&a)
            .filter(|node| !node.links.contains(&b));
        match node_a {
            Some(node) => node.links.push(b),
            None => return false,
        }
        if let Some(node) = self.nodes.get_mut(&b) {
            node.links.push(a);
        }
        true
    }

    /// Remove the link between two nodes, if present.
    pub fn remove_link(&mut self, a: K, b: K) {
        if let Some(node) = self.nodes.get_mut(&a) {
            node.links.retain(|k| *k != b);
        }
        if let Some(node) = self.nodes.get_mut(&b) {
            node.links.retain(|k| *k != a);
        }
    }

    /// Keys of the neighbors of a node; empty if the node is missing.
    pub fn neighbors(&self, key: K) -> impl Iterator<Item = K> + '_ {
        self.nodes
            .get(&key)
            .map(|node| node.links.as_slice())
            .unwrap_or_default()
            .iter()
            .copied()
    }

    /// Iterate over every node key.
    pub fn keys(&self) -> impl Iterator<Item = K> + '_ {
        self.nodes.keys().copied()
    }

    /// Visit every node.
    pub fn for_each_node(&self, mut f: impl FnMut(K, &GraphNode<K, D>)) {
        for (key, node) in &self.nodes {
            f(*key, node);
        }
    }
}
