//! Integration tests for scenario and map files

use group_walk::core::{GroupWalkError, ScenarioConfig, Vec2};
use group_walk::simulation::Network;
use group_walk::spatial::{SpatialOracle, StreetMap};

fn temp_file(name: &str, content: &str) -> std::path::PathBuf {
    let path = std::env::temp_dir().join(format!("group_walk_{}_{}", std::process::id(), name));
    std::fs::write(&path, content).unwrap();
    path
}

const SCENARIO: &str = r#"
[simulation]
seed = 99
period = 1.0

[map]
cell_size = 5.0

[[groups]]
group_id = 0
group_size = 1
group_speed_kmh = 20.0

[[groups]]
group_id = 5
group_size = 12
group_radius = 25.0
group_speed_kmh = 5.0
start_time = 3.0
"#;

const MAP: &str = "\
....................
....................
..######....######..
..######....######..
..######....######..
....................
....................
..######....######..
..######....######..
....................
";

#[test]
fn test_load_scenario_file() {
    let path = temp_file("scenario.toml", SCENARIO);
    let scenario = ScenarioConfig::load(&path).unwrap();
    std::fs::remove_file(&path).ok();

    assert_eq!(scenario.simulation.seed, 99);
    assert_eq!(scenario.map.cell_size, 5.0);
    assert_eq!(scenario.groups.len(), 2);
    assert_eq!(scenario.groups[1].start_time, 3.0);
}

#[test]
fn test_missing_scenario_file_is_io_error() {
    let result = ScenarioConfig::load(std::path::Path::new("/nonexistent/group_walk.toml"));
    assert!(matches!(result, Err(GroupWalkError::IoError(_))));
}

#[test]
fn test_oversized_group_is_rejected() {
    let result = ScenarioConfig::from_toml_str(
        r#"
        [[groups]]
        group_id = 1
        group_size = 100
        "#,
    );
    assert!(matches!(result, Err(GroupWalkError::InvalidGroup { group_id: 1, .. })));
}

#[test]
fn test_scenario_runs_on_ascii_map() {
    let scenario = ScenarioConfig::from_toml_str(SCENARIO).unwrap();
    let path = temp_file("map.txt", MAP);
    let map = StreetMap::load(&path, scenario.map.cell_size).unwrap();
    std::fs::remove_file(&path).ok();

    assert_eq!(map.bounds().hi_x, 100.0);
    assert_eq!(map.bounds().hi_y, 50.0);
    assert!(map.closest_obstacle(Vec2::new(1.0, 1.0)).is_finite());

    let mut config = scenario.simulation.clone();
    config.world = map.bounds();
    let mut network = Network::new(config, map, &scenario.groups).unwrap();

    network.run(3);
    assert_eq!(network.device_count(), 1);

    network.run(1);
    assert_eq!(network.device_count(), 13);

    network.run(20);
    for device in network.snapshot() {
        assert!(network.config().world.contains(device.position));
    }
}
