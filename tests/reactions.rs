mod common;

use common::{run_ticks, WorldBuilder};
use hazardsim_lib::model::config::{FieldConfig, ReactionConfig};
use hazardsim_lib::model::grid::Grid;
use hazardsim_lib::model::reactions::{apply_phase_transitions, react_acid_base, react_fire_water};
use hazardsim_lib::model::state::{Mode, TileMaterial};
use hazardsim_lib::model::WorldEvent;

fn small_grid() -> Grid {
    Grid::new(8, 8, 0.21, &FieldConfig::default())
}

#[test]
fn test_water_ice_hysteresis() {
    let mut grid = small_grid();
    let cfg = ReactionConfig::default();
    let water = grid.index(2, 2).unwrap();
    let ice = grid.index(5, 5).unwrap();
    grid.set_material(water, Some(TileMaterial::new(Mode::Water, 0.5, 0.5, 0.0)));
    grid.set_material(ice, Some(TileMaterial::new(Mode::Ice, 0.5, 0.5, 0.0)));

    // Inside the dead band neither side moves.
    grid.heat[water] = 0.17;
    grid.heat[ice] = 0.17;
    assert_eq!(apply_phase_transitions(&mut grid, &cfg), 0);
    assert_eq!(grid.mode_at(water), Some(Mode::Water));
    assert_eq!(grid.mode_at(ice), Some(Mode::Ice));

    grid.heat[water] = 0.15;
    grid.heat[ice] = 0.2;
    assert_eq!(apply_phase_transitions(&mut grid, &cfg), 2);
    assert_eq!(grid.mode_at(water), Some(Mode::Ice));
    assert_eq!(grid.mode_at(ice), Some(Mode::Water));
    assert!((grid.heat[ice] - 0.19).abs() < 1e-6);
    assert!((grid.heat[water] - 0.16).abs() < 1e-6);

    // Latent heat never pushes a tile straight back across.
    for _ in 0..5 {
        assert_eq!(apply_phase_transitions(&mut grid, &cfg), 0);
    }
}

#[test]
fn test_fire_water_extinguishes_monotonically() {
    let mut grid = small_grid();
    let cfg = ReactionConfig::default();
    let fire = grid.index(3, 3).unwrap();
    let water = grid.index(4, 3).unwrap();
    grid.set_material(fire, Some(TileMaterial::new(Mode::Fire, 0.8, 1.0, 0.0)));
    grid.set_material(water, Some(TileMaterial::new(Mode::Water, 0.6, 0.6, 0.0)));

    let mut last = grid.fire_amplitude(fire);
    let mut out = false;
    for _ in 0..25 {
        if react_fire_water(&mut grid, fire, water, &cfg) {
            out = true;
            break;
        }
        let now = grid.fire_amplitude(fire);
        assert!(now < last, "amplitude rose from {last} to {now}");
        last = now;
    }

    assert!(out, "fire survived 25 quenches");
    assert_eq!(grid.tiles[fire], None);
    assert!(!grid.fire.contains(&fire));
    assert!(grid.heat[water] > 0.0);
}

#[test]
fn test_ice_also_quenches() {
    let mut grid = small_grid();
    let cfg = ReactionConfig::default();
    let fire = grid.index(3, 3).unwrap();
    let ice = grid.index(3, 4).unwrap();
    grid.set_material(fire, Some(TileMaterial::new(Mode::Fire, 0.8, 1.0, 0.0)));
    grid.set_material(ice, Some(TileMaterial::new(Mode::Ice, 0.6, 0.6, 0.0)));

    react_fire_water(&mut grid, fire, ice, &cfg);
    assert!(grid.fire_amplitude(fire) < 1.0);
}

#[test]
fn test_acid_base_heats_base_side_only() {
    let mut grid = small_grid();
    let cfg = ReactionConfig::default();
    let acid = grid.index(3, 3).unwrap();
    let base = grid.index(4, 3).unwrap();
    grid.set_material(acid, Some(TileMaterial::new(Mode::Acid, 0.8, 0.5, 0.0)));
    grid.set_material(base, Some(TileMaterial::new(Mode::Base, 0.8, 0.5, 0.0)));

    let mut events = Vec::new();
    let outcome = react_acid_base(&mut grid, acid, base, &cfg, 1, &mut events);

    assert!(outcome.reacted);
    assert_eq!(outcome.flash, Some(true));
    assert_eq!(grid.heat[acid], 0.0);
    assert!(grid.heat[base] > 0.0);
    assert!(grid.tiles[acid].unwrap().tension < 0.8);
    assert!(grid.tiles[base].unwrap().tension < 0.8);
    assert!(matches!(
        events.as_slice(),
        [WorldEvent::Flash { first_contact: true, .. }]
    ));

    // Same pair in the same tick: no second flash.
    let again = react_acid_base(&mut grid, acid, base, &cfg, 1, &mut events);
    assert_eq!(again.flash, None);
    assert_eq!(events.len(), 1);
}

#[test]
fn test_canister_chain_detonation() {
    let mut world = WorldBuilder::new()
        .with_canister(10, 10, 0.6)
        .with_canister(12, 10, 0.6)
        .build();
    let first = world.grid.index(10, 10).unwrap();
    world.ignite(first, 1.0).unwrap();
    assert!(world.grid.canisters[&first].fuse.is_some());

    let mut detonations = Vec::new();
    for _ in 0..10 {
        run_ticks(&mut world, 1);
        assert_fields_bounded!(world);
        for event in world.drain_events() {
            if let WorldEvent::Detonation { tile, radius } = event {
                detonations.push((world.tick, tile, radius));
            }
        }
    }

    assert_eq!(detonations.len(), 2, "got {detonations:?}");
    let second = world.grid.index(12, 10).unwrap();
    assert_eq!(detonations[0].1, first);
    assert_eq!(detonations[1].1, second);
    assert_eq!(detonations[1].0, detonations[0].0 + 1);
    assert!(world.grid.canisters.is_empty());
    assert!(world.grid.fire.contains(&first));
}

#[test]
fn test_cryofoam_smothers_fire_then_expires() {
    let mut world = WorldBuilder::new()
        .with_config(|c| c.reactions.foam_lifetime = 5)
        .with_fire(20, 20, 1.0)
        .build();
    let idx = world.grid.index(20, 20).unwrap();
    world.deposit_cryofoam(idx, 1.0).unwrap();
    assert_eq!(world.grid.mode_at(idx), Some(Mode::Cryofoam));
    assert!(world.grid.fire.is_empty());

    let mut expired = false;
    for _ in 0..10 {
        run_ticks(&mut world, 1);
        assert_fields_bounded!(world);
        expired |= world
            .drain_events()
            .iter()
            .any(|e| matches!(e, WorldEvent::FoamExpired { tile } if *tile == idx));
        if expired {
            break;
        }
    }

    assert!(expired, "foam never expired");
    assert_eq!(world.grid.tiles[idx], None);
    assert!(world.grid.fire.is_empty());
}

#[test]
fn test_cryofoam_freezes_against_base() {
    let mut world = WorldBuilder::new()
        .with_material(31, 12, Mode::Base, 0.8, 0.5)
        .build();
    let idx = world.grid.index(30, 12).unwrap();
    world.deposit_cryofoam(idx, 1.0).unwrap();

    run_ticks(&mut world, 1);
    let events = world.drain_events();
    assert!(events
        .iter()
        .any(|e| matches!(e, WorldEvent::FoamFrozen { tile } if *tile == idx)));
    assert_eq!(world.grid.mode_at(idx), Some(Mode::Ice));
    assert!(!world.grid.foam.contains_key(&idx));

    run_ticks(&mut world, 5);
    assert_eq!(world.grid.mode_at(idx), Some(Mode::Ice));
}
