//! Tests for builder modules

use elevator_fleet::builders::build_fleet;
use elevator_fleet::config::BuildingConfig;
use elevator_fleet::core::{Direction, ElevatorError};

const CONFIG: &str = r#"{
    "number_of_floors": 12,
    "elevators": [
        { "name": "Low", "initial_floor": 1, "min_floor": 1, "top_floor": 6 },
        { "name": "High", "initial_floor": 12, "min_floor": 6, "top_floor": 12 }
    ],
    "timing": { "tick_ms": 2, "poll_interval_ms": 10 }
}"#;

#[test]
fn test_build_fleet_from_json() {
    let cfg = BuildingConfig::from_json_str(CONFIG).unwrap();
    let fleet = build_fleet(&cfg).unwrap();

    assert_eq!(fleet.number_of_floors(), 12);
    let names: Vec<_> = fleet.units().iter().map(|u| u.name().to_string()).collect();
    assert_eq!(names, vec!["Low", "High"]);
    assert_eq!(fleet.units()[1].current_floor(), 12);
    assert_eq!(fleet.units()[1].min_floor(), 6);
    fleet.shutdown();
}

#[test]
fn test_built_fleet_dispatches_by_range() {
    let cfg = BuildingConfig::from_json_str(CONFIG).unwrap();
    let fleet = build_fleet(&cfg).unwrap();

    // "Low" is closer but only "High" serves floor 9.
    let unit = fleet.call_elevator(9, Direction::Down).unwrap();
    assert_eq!(unit.name(), "High");
    fleet.shutdown();
}

#[test]
fn test_build_fleet_invalid_config() {
    let cfg = BuildingConfig {
        number_of_floors: 0,
        elevators: Vec::new(),
        timing: Default::default(),
    };
    assert!(matches!(build_fleet(&cfg), Err(ElevatorError::InvalidConfig(_))));
}

#[test]
fn test_build_fleet_rejects_out_of_building_range() {
    let mut cfg = BuildingConfig::from_json_str(CONFIG).unwrap();
    cfg.elevators[0].top_floor = 20;
    assert!(matches!(build_fleet(&cfg), Err(ElevatorError::InvalidConfig(_))));
}
