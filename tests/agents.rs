mod common;

use common::{run_ticks, WorldBuilder};
use hazardsim_lib::model::state::{AgentId, FactionRef, Mode};
use hazardsim_lib::model::{PlacementError, SpawnAt, SimConfig, StepSettings, World};

#[test]
fn test_trapped_panic_agent_stays_put() {
    let mut builder = WorldBuilder::new();
    for dy in -1..=1 {
        for dx in -1..=1 {
            if (dx, dy) != (0, 0) {
                builder = builder.with_wall(10 + dx, 10 + dy);
            }
        }
    }
    let mut world = builder
        .with_heat(10, 10, 1.0)
        .with_agent(Mode::Panic, 0, 10, 10)
        .build();
    let id = world.agents()[0].id;

    let settings = StepSettings::default();
    for _ in 0..100 {
        world.step(&settings).unwrap();
        assert_fields_bounded!(world);
        let agent = world.agent(id).unwrap();
        assert_eq!((agent.x, agent.y), (10, 10));
    }

    let agent = world.agent(id).unwrap();
    assert!(agent.fail_count > 0);
    assert_eq!(world.occupant(world.grid.index(10, 10).unwrap()), Some(id));
    assert_eq!(world.diagnostics().agents, 1);
}

#[test]
fn test_panicked_agent_escapes_once_released() {
    let mut builder = WorldBuilder::new();
    let mut pocket = Vec::new();
    for dy in -1..=1 {
        for dx in -1..=1 {
            if (dx, dy) != (0, 0) {
                builder = builder.with_wall(20 + dx, 20 + dy);
                pocket.push((20 + dx, 20 + dy));
            }
        }
    }
    let mut world = builder.with_agent(Mode::Panic, 0, 20, 20).build();
    let id = world.agents()[0].id;
    let cell = world.grid.index(20, 20).unwrap();

    let settings = StepSettings::default();
    for _ in 0..10 {
        world.set_heat(cell, 1.0).unwrap();
        world.step(&settings).unwrap();
        let agent = world.agent(id).unwrap();
        assert_eq!((agent.x, agent.y), (20, 20));
    }

    for (x, y) in pocket {
        world.set_wall(world.grid.index(x, y).unwrap(), false).unwrap();
    }
    let mut left = false;
    let mut cooled = false;
    for _ in 0..50 {
        world.step(&settings).unwrap();
        assert_fields_bounded!(world);
        let agent = world.agent(id).unwrap();
        left |= (agent.x, agent.y) != (20, 20);
        let here = world.grid.index(agent.x, agent.y).unwrap();
        if left && world.grid.heat[here] < 0.4 {
            cooled = true;
            break;
        }
    }
    assert!(left, "agent never left the pocket");
    assert!(cooled, "agent never reached cool ground");
}

#[test]
fn test_spawn_error_codes() {
    // A 3x3 grid whose only interior tile is walled has nowhere to stand.
    let mut sealed = WorldBuilder::new().with_size(3, 3).with_wall(1, 1).build();
    assert_eq!(
        sealed.spawn(Mode::Calm, FactionRef::Id(0), SpawnAt::Anywhere),
        Err(PlacementError::NoOpenTile)
    );

    let mut world = WorldBuilder::new()
        .with_wall(5, 5)
        .with_canister(7, 7, 0.5)
        .build();
    assert_eq!(
        world.spawn(Mode::Calm, FactionRef::Id(0), SpawnAt::Coords(5, 5)),
        Err(PlacementError::Blocked)
    );
    assert_eq!(
        world.spawn(Mode::Calm, FactionRef::Id(0), SpawnAt::Coords(7, 7)),
        Err(PlacementError::Blocked)
    );
    assert_eq!(
        world.spawn(Mode::Calm, FactionRef::Id(0), SpawnAt::Coords(500, 5)),
        Err(PlacementError::Blocked)
    );

    let id = world
        .spawn(Mode::Calm, FactionRef::Id(0), SpawnAt::Coords(3, 3))
        .unwrap();
    assert_eq!(
        world.spawn(Mode::Calm, FactionRef::Id(1), SpawnAt::Coords(3, 3)),
        Err(PlacementError::TileOccupied)
    );
    assert_eq!(
        world.set_wall(world.grid.index(3, 3).unwrap(), true),
        Err(PlacementError::TileOccupied)
    );
    assert_eq!(PlacementError::TileOccupied.code(), "tile-occupied");
    assert_agent_count!(world, 1);

    assert!(world.despawn(id));
    assert!(!world.despawn(id));
    assert_agent_count!(world, 0);
}

#[test]
fn test_spawn_falls_back_on_loose_input() {
    let mut world = WorldBuilder::new().build();
    let id = world
        .spawn(Mode::Fire, FactionRef::Name("nobody".into()), SpawnAt::Anywhere)
        .unwrap();
    let agent = world.agent(id).unwrap();
    assert_eq!(agent.state.mode, Mode::Calm);
    assert_eq!(agent.faction.index(), 0);

    let tide = world
        .spawn(Mode::Calm, FactionRef::Name("Tide".into()), SpawnAt::Coords(4, 4))
        .unwrap();
    assert_eq!(world.agent(tide).unwrap().faction.index(), 1);
}

#[test]
fn test_agent_ids_step_in_order_and_stay_sorted() {
    let mut world = WorldBuilder::new()
        .with_agent(Mode::Calm, 0, 30, 20)
        .with_agent(Mode::Calm, 1, 10, 10)
        .with_agent(Mode::Panic, 2, 50, 30)
        .build();
    run_ticks(&mut world, 25);
    assert_fields_bounded!(world);
    let ids: Vec<AgentId> = world.agents().iter().map(|a| a.id).collect();
    assert_eq!(ids, vec![AgentId(1), AgentId(2), AgentId(3)]);

    // No two agents ever share a tile.
    let mut tiles: Vec<(i32, i32)> = world.agents().iter().map(|a| (a.x, a.y)).collect();
    tiles.sort_unstable();
    tiles.dedup();
    assert_eq!(tiles.len(), 3);
}

#[test]
fn test_medic_claims_and_calms_patient() {
    let mut world = WorldBuilder::new()
        .with_agent(Mode::Medic, 0, 10, 10)
        .with_agent(Mode::Panic, 0, 13, 10)
        .build();
    let medic = AgentId(1);
    let patient = AgentId(2);
    let cap = world.config.medic.assignment_cap;

    run_ticks(&mut world, 1);
    assert_eq!(world.agent(medic).unwrap().medic.target, Some(patient));
    assert_eq!(world.assignment_count(patient), 1);

    let mut calmed = false;
    for _ in 0..300 {
        run_ticks(&mut world, 1);
        assert!(world.assignment_count(patient) <= cap);
        assert_eq!(world.agent(medic).unwrap().state.mode, Mode::Medic);
        if world.agent(patient).unwrap().state.mode == Mode::Calm {
            calmed = true;
            break;
        }
    }
    assert!(calmed, "patient never calmed down");
}

#[test]
fn test_despawned_patient_frees_medic() {
    let mut world = WorldBuilder::new()
        .with_agent(Mode::Medic, 0, 10, 10)
        .with_agent(Mode::Panic, 0, 12, 10)
        .build();
    run_ticks(&mut world, 1);
    assert_eq!(world.assignment_count(AgentId(2)), 1);

    assert!(world.despawn(AgentId(2)));
    assert_eq!(world.assignment_count(AgentId(2)), 0);
    assert_eq!(world.agent(AgentId(1)).unwrap().medic.target, None);
    run_ticks(&mut world, 5);
    assert_fields_bounded!(world);
}

#[test]
fn test_reset_keeps_world_usable() {
    let mut config = SimConfig::default();
    config.world.seed = Some(3);
    config.debug.assert_invariants = true;
    let mut world = World::new(config).unwrap();
    world
        .spawn(Mode::Calm, FactionRef::Id(0), SpawnAt::Anywhere)
        .unwrap();
    run_ticks(&mut world, 3);

    world.reset(0.21, Default::default());
    assert_eq!(world.tick, 0);
    assert_agent_count!(world, 0);
    let id = world
        .spawn(Mode::Calm, FactionRef::Id(0), SpawnAt::Anywhere)
        .unwrap();
    run_ticks(&mut world, 3);
    assert!(world.agent(id).is_some());
}
