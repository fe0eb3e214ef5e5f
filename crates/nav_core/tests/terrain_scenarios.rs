//! End-to-end navigation scenarios through the public API.

use nav_core::map::Rect;
use nav_core::rules::MovementType;
use nav_core::terrain::{ElevationLevel, PathOptions};
use nav_core::tile::{LandType, TerrainType};
use nav_test_utils::fixtures::{fixed, fixed_f, flat_tile, rock_tile, NavWorld};

#[test]
fn sealed_destination_resolves_to_nearest_outside_tile() {
    // Rock ring around (5, 5); the interior is its own island.
    let world = NavWorld::from_tiles(9, 9, |rx, ry, id| {
        let ring = (4..=6).contains(&rx)
            && (4..=6).contains(&ry)
            && !(rx == 5 && ry == 5);
        if ring {
            rock_tile(rx, ry, id)
        } else {
            flat_tile(rx, ry, id)
        }
    });

    let route = world.path(MovementType::Wheel, (0, 0), (5, 5));
    assert!(!route.is_empty());
    let end = world.map.tile(route.last().unwrap().tile).unwrap();
    assert!(
        !((4..=6).contains(&end.rx) && (4..=6).contains(&end.ry)),
        "route must stop outside the sealed ring, ended at ({}, {})",
        end.rx,
        end.ry
    );
}

#[test]
fn bridge_carries_route_across_water() {
    // Water column at rx 3, bridged at (3, 1).
    let world = NavWorld::from_tiles(7, 3, |rx, ry, id| {
        if rx == 3 {
            let mut tile = flat_tile(rx, ry, id);
            tile.land_type = LandType::Water;
            tile.terrain_type = TerrainType::Water;
            if ry == 1 {
                tile.on_bridge_land_type = Some(LandType::Clear);
            }
            tile
        } else {
            flat_tile(rx, ry, id)
        }
    });
    world.place_bridge(3, 1, 0, false);

    let route = world.path(MovementType::Wheel, (0, 1), (6, 1));
    assert!(!route.is_empty());
    assert_eq!(route.last().unwrap().tile, world.tile_at(6, 1));
    let deck = route
        .iter()
        .find(|node| node.tile == world.tile_at(3, 1))
        .expect("route must cross the bridge tile");
    assert!(deck.on_bridge.is_some());

    // Hover movement crosses the water directly instead.
    let hover = world.path(MovementType::Hover, (0, 1), (6, 1));
    assert!(hover.iter().all(|node| node.on_bridge.is_none()));
}

#[test]
fn expansion_cap_honors_best_effort_flag() {
    let world = NavWorld::flat(16, 16);
    let query = |best_effort: bool| {
        world.terrain.compute_path(
            MovementType::Wheel,
            ElevationLevel::Ground,
            world.tile_at(0, 0),
            false,
            world.tile_at(15, 15),
            false,
            &PathOptions {
                max_expanded: 8,
                best_effort,
                ..PathOptions::default()
            },
        )
    };

    let partial = query(true);
    assert!(!partial.is_empty());
    assert_ne!(partial.last().unwrap().tile, world.tile_at(15, 15));

    assert!(query(false).is_empty());
}

#[test]
fn bounds_resize_discards_cached_graphs() {
    let world = NavWorld::flat(10, 10);
    let full = world.path(MovementType::Wheel, (0, 0), (9, 9));
    assert_eq!(full.len(), 10);

    world.map.resize_local(Rect {
        x: 0,
        y: 0,
        width: 5,
        height: 5,
    });

    // The old destination fell outside the playable bounds; the route
    // must stay inside the new rect.
    let clipped = world.path(MovementType::Wheel, (0, 0), (9, 9));
    for node in &clipped {
        let tile = world.map.tile(node.tile).unwrap();
        assert!(tile.rx < 5 && tile.ry < 5, "({}, {})", tile.rx, tile.ry);
    }
}

#[test]
fn speed_modifiers_follow_land_rules() {
    let world = NavWorld::from_tiles(3, 1, |rx, ry, id| {
        let mut tile = flat_tile(rx, ry, id);
        if rx == 1 {
            tile.land_type = LandType::Road;
            tile.terrain_type = TerrainType::Pavement;
        }
        if rx == 2 {
            tile.land_type = LandType::Water;
            tile.terrain_type = TerrainType::Water;
        }
        tile
    });
    let speed = |rx: i32, movement: MovementType| {
        let tile = world.map.tile_at(rx, 0).unwrap();
        world.terrain.passable_speed(tile, movement, false, &[], false)
    };

    assert_eq!(speed(0, MovementType::Wheel), fixed(1));
    assert_eq!(speed(1, MovementType::Wheel), fixed_f(1.25));
    assert_eq!(speed(2, MovementType::Wheel), fixed(0));
    assert_eq!(speed(2, MovementType::Hover), fixed(1));
}

#[test]
fn warmed_cache_answers_every_ground_movement() {
    let world = NavWorld::flat(6, 6);
    world.terrain.compute_all_passability_graphs();
    for movement in [
        MovementType::Foot,
        MovementType::Wheel,
        MovementType::Track,
        MovementType::Hover,
        MovementType::Amphibious,
    ] {
        let route = world.path(movement, (0, 0), (5, 5));
        assert_eq!(route.len(), 6, "{movement:?}");
    }
}
