//! # Nav Core
//!
//! Deterministic terrain passability and pathfinding core.
//!
//! This crate contains **only** deterministic logic:
//! - No rendering
//! - No IO
//! - No system randomness
//! - No floating-point math in path costs (uses fixed-point)
//!
//! One passability graph is cached per movement type and elevation
//! level, invalidated incrementally as the world changes, and searched
//! with a bounded best-effort A*. This separation enables:
//! - Lockstep simulation (identical routes across clients)
//! - Headless server builds
//! - Determinism testing
//!
//! ## Crate Structure
//!
//! - [`terrain`] - Cached passability graphs and the query surface
//! - [`pathfinder`] - Generic bounded best-effort search
//! - [`graph`] - Undirected adjacency graph container
//! - [`radial`] - Expanding-ring substitute-tile scan
//! - [`map`] / [`tile`] / [`object`] - World-state data model
//! - [`occupancy`] - Tile occupancy tracking and change events
//! - [`rules`] - Data-driven land/movement speed modifiers
//! - [`math`] - Fixed-point math utilities

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod error;
pub mod events;
pub mod graph;
pub mod map;
pub mod math;
pub mod object;
pub mod occupancy;
pub mod pathfinder;
pub mod radial;
pub mod rules;
pub mod terrain;
pub mod tile;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::error::{NavError, Result};
    pub use crate::events::{Signal, Subscription};
    pub use crate::map::{Bridge, MapTiles, Rect};
    pub use crate::math::Fixed;
    pub use crate::object::{
        BuildingInfo, GameObject, ObjectId, ObjectKind, OverlayKind,
    };
    pub use crate::occupancy::{Occupancy, OccupancyChange};
    pub use crate::rules::{MovementType, Rules};
    pub use crate::terrain::{
        ElevationLevel, Obstacle, PathNode, PathOptions, Terrain,
    };
    pub use crate::tile::{
        Direction, LandType, NodeKey, SubCell, SubCellSet, TerrainType, Theater, Tile, TileId,
    };
}
