//! Scheduler, wind and lifecycle behaviour of the forest coordinator

use forest_fire_core::{
    ConfigError, Forest, ForestConfig, ForestError, SequenceSource, TileCoord, UniformDensity,
    WindMatrix, WindModel, ALIVE, EMPTY, FIRE,
};

#[ctor::ctor]
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

#[test]
fn test_construction_rejects_bad_config() {
    let config = ForestConfig::default().with_fire_spread_speed(2.0);
    let err = Forest::seeded(config, 0).unwrap_err();
    assert_eq!(
        err,
        ForestError::Config(ConfigError::ProbabilityOutOfRange {
            name: "fire_spread_speed",
            value: 2.0
        })
    );

    let config = ForestConfig::with_dimensions(10, 0, 3);
    assert!(matches!(
        Forest::seeded(config, 0),
        Err(ForestError::Config(ConfigError::ZeroDimension { name: "width" }))
    ));
}

#[test]
fn test_scheduler_sweeps_two_rows_per_step() {
    let config = ForestConfig::with_dimensions(3, 6, 6);
    let mut forest = Forest::seeded(config, 3).expect("valid config");
    forest.set_active(true);
    assert_eq!(forest.scheduler().sweep_len(), 3);

    let rows: Vec<Vec<usize>> = (0..4).map(|_| forest.tick_step().rows).collect();
    assert_eq!(
        rows,
        vec![vec![0, 1], vec![2, 3], vec![4, 5], vec![0, 1]]
    );
    assert_eq!(forest.steps(), 4);
}

#[test]
fn test_scheduler_only_ticks_selected_rows() {
    let config = ForestConfig::with_dimensions(3, 4, 1)
        .with_fire_spread_speed(1.0)
        .with_burn_speed(1.0);
    let mut forest = Forest::with_source(config, SequenceSource::constant(0.0))
        .expect("valid config")
        .with_density_field(UniformDensity(5.0));
    forest.regenerate(0.0, 0.0);
    // One fire in each tile row along X
    for row in 0..4 {
        forest.ignite(row as f32 * 3.0 + 1.0, 1.0).unwrap();
    }
    forest.set_active(true);

    forest.tick_step();

    // Rows 0 and 1 advanced, rows 2 and 3 untouched
    let state = |row: usize| forest.cell_state(TileCoord::new(row, 0), 1, 1).unwrap();
    assert_eq!(state(0), FIRE + 1);
    assert_eq!(state(1), FIRE + 1);
    assert_eq!(state(2), FIRE);
    assert_eq!(state(3), FIRE);
}

#[test]
fn test_pause_and_resume() {
    let config = ForestConfig::with_dimensions(4, 2, 2);
    let mut forest = Forest::seeded(config, 9).expect("valid config");
    assert!(!forest.is_active());
    assert!(!forest.tick_step().ran());

    forest.set_active(true);
    assert!(forest.tick_step().ran());

    forest.set_active(false);
    let next_row = forest.scheduler().next_row();
    assert!(!forest.tick_step().ran());
    assert_eq!(forest.scheduler().next_row(), next_row);
}

#[test]
fn test_edit_scenarios() {
    let config = ForestConfig::with_dimensions(4, 2, 2);
    let mut forest = Forest::seeded(config, 0).expect("valid config");
    let origin = TileCoord::new(0, 0);

    // Igniting bare ground does nothing
    assert_eq!(forest.ignite(1.0, 1.0), Ok(false));
    assert_eq!(forest.cell_state(origin, 1, 1), Ok(EMPTY));

    // Planting twice leaves the first tree alone
    assert_eq!(forest.add_tree(1.0, 1.0), Ok(true));
    forest.tile_mut(origin).unwrap().set_cell(1, 1, 40).unwrap();
    assert_eq!(forest.add_tree(1.0, 1.0), Ok(false));
    assert_eq!(forest.cell_state(origin, 1, 1), Ok(40));

    // Extinguishing restores a fresh tree, removing clears it
    forest.ignite(1.0, 1.0).unwrap();
    assert_eq!(forest.extinguish(1.0, 1.0), Ok(1));
    assert_eq!(forest.cell_state(origin, 1, 1), Ok(ALIVE));
    assert_eq!(forest.remove_tree(1.0, 1.0), Ok(true));
    assert_eq!(forest.cell_state(origin, 1, 1), Ok(EMPTY));

    assert!(matches!(
        forest.extinguish(8.5, 0.0),
        Err(ForestError::OutOfRange { .. })
    ));
}

#[test]
fn test_empty_forest_stays_empty() {
    let config = ForestConfig::with_dimensions(6, 3, 3);
    let mut forest = Forest::seeded(config, 4)
        .expect("valid config")
        .with_density_field(UniformDensity(9.0));
    forest.regenerate(1.0, 1.0);
    forest.ignite_random_in_all_tiles();
    forest.reset_all();
    forest.set_active(true);

    for _ in 0..30 {
        let report = forest.tick_step();
        assert_eq!(report.cells_changed, 0);
    }
    assert_eq!(forest.census().empty, 6 * 6 * 9);
    assert_eq!(forest.ignite_random_in_all_tiles(), 0);
}

/// Single 11×11 tile with a fire in the middle, run for 40 steps
fn fire_in_wind(wind: WindMatrix) -> Forest<SequenceSource> {
    let config = ForestConfig::with_dimensions(11, 1, 1)
        .with_fire_spread_speed(1.0)
        .with_burn_speed(1.0);
    let mut forest = Forest::with_source(config, SequenceSource::constant(0.0))
        .expect("valid config")
        .with_density_field(UniformDensity(5.0));
    forest.regenerate(0.0, 0.0);
    forest.ignite(5.0, 5.0).unwrap();
    forest.set_wind_matrix(wind);
    forest.set_active(true);
    for _ in 0..40 {
        forest.tick_step();
    }
    forest
}

#[test]
fn test_fire_runs_downwind() {
    let windy = fire_in_wind(WindModel::new(1.0).matrix(3.0, 0.0));
    let tile = TileCoord::new(0, 0);

    // Downwind of the fire (toward -X) catches quickly
    assert!(windy.cell_state(tile, 4, 5).unwrap() >= FIRE);
    // Upwind columns never receive heat from the fire
    for x in 6..11 {
        for y in 0..11 {
            assert_eq!(windy.cell_state(tile, x, y), Ok(ALIVE), "cell ({x}, {y})");
        }
    }

    // Without wind the fire heats both sides
    let calm = fire_in_wind(WindMatrix::calm());
    assert!(calm.cell_state(tile, 6, 5).unwrap() > ALIVE);
    assert!(calm.cell_state(tile, 4, 5).unwrap() > ALIVE);
}

#[test]
fn test_burned_events_carry_world_position() {
    let config = ForestConfig::with_dimensions(4, 2, 2).with_burn_speed(1.0);
    let mut forest = Forest::with_source(config, SequenceSource::constant(0.0))
        .expect("valid config")
        .with_height_field(|x: f32, z: f32| x + z);
    forest.add_tree(6.0, 2.0).unwrap();
    forest.ignite(6.0, 2.0).unwrap();
    forest.set_active(true);

    let mut events = Vec::new();
    while events.is_empty() && forest.steps() < 500 {
        forest.tick_step();
        events.extend(forest.drain_events());
    }

    assert_eq!(events.len(), 1);
    let event = events[0];
    assert_eq!(event.tile, TileCoord::new(1, 0));
    assert_eq!(event.position.x, 6.5);
    assert_eq!(event.position.z, 2.5);
    assert_eq!(event.position.y, 9.0);
}
