mod common;

use common::{run_ticks, WorldBuilder};
use hazardsim_lib::model::config::{FieldConfig, TerritoryConfig};
use hazardsim_lib::model::grid::Grid;
use hazardsim_lib::model::state::{FactionId, Mode};
use hazardsim_lib::model::territory::{deposit_presence, update_territory};
use proptest::prelude::*;

prop_compose! {
    fn arb_deposit()(
        x in 1i32..15,
        y in 1i32..15,
        faction in 0usize..3,
        amount in 0.01f32..1.0,
    ) -> (i32, i32, usize, f32) {
        (x, y, faction, amount)
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn test_control_is_normalized(
        deposits in prop::collection::vec(arb_deposit(), 0..40),
        ticks in 1usize..4,
    ) {
        let fields = FieldConfig::default();
        let config = TerritoryConfig::default();
        let mut grid = Grid::new(16, 16, 0.21, &fields);
        for _ in 0..ticks {
            for &(x, y, faction, amount) in &deposits {
                let idx = grid.index(x, y).unwrap();
                deposit_presence(&mut grid, idx, FactionId::from_index(faction).unwrap(), amount);
            }
            update_territory(&mut grid, &fields, &config);
        }

        for idx in 0..grid.len() {
            let control = grid.territory.control[idx];
            prop_assert!((0.0..=1.0).contains(&control), "control {} at {}", control, idx);
            match grid.territory.dominant[idx] {
                // The winner holds at least an even three-way share.
                Some(_) => prop_assert!(
                    control >= 1.0 / 3.0 - 1e-5,
                    "owned tile {} has control {}",
                    idx,
                    control
                ),
                None => prop_assert_eq!(control, 0.0),
            }
            if grid.wall[idx] {
                prop_assert_eq!(grid.territory.dominant[idx], None);
            }
        }
        prop_assert!(grid.territory.check_invariants().is_ok());
    }
}

#[test]
fn test_lone_faction_owns_its_ground() {
    let fields = FieldConfig::default();
    let config = TerritoryConfig::default();
    let mut grid = Grid::new(12, 12, 0.21, &fields);
    let idx = grid.index(6, 6).unwrap();
    for _ in 0..5 {
        deposit_presence(&mut grid, idx, FactionId(1), 0.5);
        update_territory(&mut grid, &fields, &config);
    }
    assert_eq!(grid.territory.dominant[idx], Some(FactionId(1)));
    assert!(grid.territory.control[idx] > 0.99);
    assert!(grid.territory.contest(idx) < 0.05);
}

#[test]
fn test_agents_claim_territory_in_world() {
    let mut world = WorldBuilder::new()
        .with_agent(Mode::Calm, 0, 10, 10)
        .with_agent(Mode::Calm, 0, 11, 10)
        .with_agent(Mode::Calm, 2, 60, 30)
        .build();
    run_ticks(&mut world, 20);
    assert_fields_bounded!(world);

    let owned = |f: FactionId| {
        world
            .grid
            .territory
            .dominant
            .iter()
            .filter(|d| **d == Some(f))
            .count()
    };
    assert!(owned(FactionId(0)) > 0);
    assert!(owned(FactionId(2)) > 0);
    assert_eq!(owned(FactionId(1)), 0);
}

#[test]
fn test_sustained_border_grows_frontier() {
    let fields = FieldConfig::default();
    let config = TerritoryConfig::default();
    let mut grid = Grid::new(12, 7, 0.21, &fields);
    for _ in 0..300 {
        for y in 1..6 {
            for x in 1..11 {
                let idx = grid.index(x, y).unwrap();
                let faction = if x <= 5 { FactionId(0) } else { FactionId(1) };
                deposit_presence(&mut grid, idx, faction, config.presence_deposit);
            }
        }
        update_territory(&mut grid, &fields, &config);
    }

    let frontier = |f: usize| grid.territory.frontier[f].iter().sum::<f32>();
    assert!(frontier(0) > 0.0, "faction 0 has no frontier");
    assert!(frontier(1) > 0.0, "faction 1 has no frontier");
    assert_eq!(frontier(2), 0.0);

    // Pressure sits on the seam, not deep inside either side.
    let f0 = &grid.territory.frontier[0];
    let seam_value = f0[grid.index(5, 3).unwrap()] + f0[grid.index(6, 3).unwrap()];
    let deep = f0[grid.index(1, 3).unwrap()];
    assert!(seam_value > deep);
    assert!(grid.territory.check_invariants().is_ok());
}
