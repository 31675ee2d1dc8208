use hazardsim_lib::model::config::{FieldConfig, StepSettings};
use hazardsim_lib::model::diffusion::DiffusionEngine;
use hazardsim_lib::model::grid::Grid;
use proptest::prelude::*;

prop_compose! {
    fn arb_field()(
        width in 4usize..20,
        height in 4usize..20,
    )(
        values in prop::collection::vec(0.0f32..1.0, width * height),
        walls in prop::collection::vec(prop::bool::weighted(0.15), width * height),
        width in Just(width),
        height in Just(height),
    ) -> (usize, usize, Vec<f32>, Vec<bool>) {
        (width, height, values, walls)
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn test_diffusion_conserves_open_mass(
        (width, height, mut field, walls) in arb_field(),
        d in 0.0f32..2.0,
    ) {
        let mut engine = DiffusionEngine::new(width, height, &FieldConfig::default());
        let open_sum = |f: &[f32]| -> f64 {
            f.iter().zip(&walls).filter(|(_, w)| !**w).map(|(v, _)| f64::from(*v)).sum()
        };
        let before = open_sum(&field);
        engine.diffuse(&mut field, &walls, d);
        let after = open_sum(&field);
        prop_assert!((before - after).abs() <= 1e-3 * (1.0 + before),
            "mass drifted from {} to {}", before, after);
    }

    #[test]
    fn test_diffusion_stays_within_input_range(
        (width, height, mut field, walls) in arb_field(),
        d in 0.0f32..2.0,
    ) {
        let open: Vec<f32> = field
            .iter()
            .zip(&walls)
            .filter(|(_, w)| !**w)
            .map(|(v, _)| *v)
            .collect();
        prop_assume!(!open.is_empty());
        let lo = open.iter().copied().fold(f32::MAX, f32::min);
        let hi = open.iter().copied().fold(f32::MIN, f32::max);

        let mut engine = DiffusionEngine::new(width, height, &FieldConfig::default());
        engine.diffuse(&mut field, &walls, d);
        for (i, v) in field.iter().enumerate() {
            if walls[i] {
                continue;
            }
            prop_assert!(v.is_finite());
            prop_assert!(*v >= lo - 1e-5 && *v <= hi + 1e-5,
                "tile {} left [{}, {}] with {}", i, lo, hi, v);
        }
    }

    #[test]
    fn test_walls_are_untouched(
        (width, height, mut field, walls) in arb_field(),
        d in 0.0f32..2.0,
    ) {
        let before = field.clone();
        let mut engine = DiffusionEngine::new(width, height, &FieldConfig::default());
        engine.diffuse(&mut field, &walls, d);
        for i in 0..field.len() {
            if walls[i] {
                prop_assert_eq!(field[i], before[i]);
            }
        }
    }
}

#[test]
fn test_heat_spreads_from_a_hot_tile() {
    let fields = FieldConfig::default();
    let mut grid = Grid::new(9, 9, 0.21, &fields);
    let center = grid.index(4, 4).unwrap();
    grid.heat[center] = 1.0;

    let mut engine = DiffusionEngine::new(9, 9, &fields);
    let before = grid.heat_sum();
    engine.diffuse(&mut grid.heat, &grid.wall, StepSettings::default().d_heat);

    assert!(grid.heat[center] < 1.0);
    let east = grid.index(5, 4).unwrap();
    assert!(grid.heat[east] > 0.0);
    assert!((grid.heat_sum() - before).abs() < 1e-4);
}
