//! Tests for configuration validation

use std::time::Duration;

use elevator_fleet::config::{BuildingConfig, ElevatorConfig, TimingConfig};

fn elevator(name: &str, initial_floor: i32, min_floor: i32, top_floor: i32) -> ElevatorConfig {
    ElevatorConfig {
        name: name.to_string(),
        initial_floor,
        min_floor,
        top_floor,
    }
}

fn building(number_of_floors: i32, elevators: Vec<ElevatorConfig>) -> BuildingConfig {
    BuildingConfig {
        number_of_floors,
        elevators,
        timing: TimingConfig::default(),
    }
}

#[test]
fn test_elevator_config_validation() {
    assert!(elevator("E1", 1, 1, 10).validate().is_ok());
    assert!(elevator("E1", 10, 1, 10).validate().is_ok());
}

#[test]
fn test_elevator_config_empty_name() {
    assert!(elevator("  ", 1, 1, 10).validate().is_err());
}

#[test]
fn test_elevator_config_inverted_range() {
    let err = elevator("E1", 5, 10, 1).validate().unwrap_err();
    assert!(err.contains("min_floor 10 is above top_floor 1"));
}

#[test]
fn test_elevator_config_initial_out_of_range() {
    assert!(elevator("E1", 0, 1, 10).validate().is_err());
    assert!(elevator("E1", 11, 1, 10).validate().is_err());
}

#[test]
fn test_timing_defaults() {
    let timing = TimingConfig::default();
    assert_eq!(timing.tick_ms, 100);
    assert_eq!(timing.poll_interval_ms, 50);
    assert_eq!(timing.event_queue_capacity, 256);
    assert_eq!(timing.tick(), Duration::from_millis(100));
    assert_eq!(timing.poll_interval(), Duration::from_millis(50));
    assert!(timing.validate().is_ok());
}

#[test]
fn test_timing_rejects_zero_values() {
    let zero_tick = TimingConfig { tick_ms: 0, ..TimingConfig::default() };
    let zero_poll = TimingConfig { poll_interval_ms: 0, ..TimingConfig::default() };
    let zero_queue = TimingConfig { event_queue_capacity: 0, ..TimingConfig::default() };
    assert!(zero_tick.validate().is_err());
    assert!(zero_poll.validate().is_err());
    assert!(zero_queue.validate().is_err());
}

#[test]
fn test_building_config_validation() {
    let cfg = building(20, vec![elevator("E1", 1, 1, 20), elevator("E2", 5, 3, 10)]);
    assert!(cfg.validate().is_ok());
}

#[test]
fn test_building_config_empty_fleet_is_valid() {
    assert!(building(5, Vec::new()).validate().is_ok());
}

#[test]
fn test_building_config_invalid_floor_count() {
    assert!(building(0, Vec::new()).validate().is_err());
    assert!(building(-3, Vec::new()).validate().is_err());
}

#[test]
fn test_building_config_range_outside_building() {
    let too_high = building(10, vec![elevator("E1", 1, 1, 11)]);
    let too_low = building(10, vec![elevator("E1", 1, 0, 10)]);
    assert!(too_high.validate().unwrap_err().contains("exceeds building floors [1, 10]"));
    assert!(too_low.validate().is_err());
}

#[test]
fn test_building_config_duplicate_names() {
    let cfg = building(10, vec![elevator("E1", 1, 1, 10), elevator("E1", 2, 1, 10)]);
    assert_eq!(cfg.validate().unwrap_err(), "duplicate elevator name `E1`");
}

#[test]
fn test_building_config_reports_invalid_elevator() {
    let cfg = building(10, vec![elevator("E1", 12, 1, 10)]);
    assert!(cfg.validate().unwrap_err().starts_with("elevator `E1` invalid:"));
}

#[test]
fn test_building_config_from_json() {
    let json = r#"{
        "number_of_floors": 30,
        "elevators": [
            { "name": "North", "initial_floor": 1, "min_floor": 1, "top_floor": 30 },
            { "name": "South", "initial_floor": 15, "min_floor": 10, "top_floor": 30 }
        ],
        "timing": { "tick_ms": 20 }
    }"#;
    let cfg = BuildingConfig::from_json_str(json).unwrap();
    assert_eq!(cfg.number_of_floors, 30);
    assert_eq!(cfg.elevators.len(), 2);
    assert_eq!(cfg.elevators[1], elevator("South", 15, 10, 30));
    assert_eq!(cfg.timing.tick_ms, 20);
    assert_eq!(cfg.timing.poll_interval_ms, 50);
    assert_eq!(cfg.timing.event_queue_capacity, 256);
}

#[test]
fn test_building_config_from_json_defaults() {
    let cfg = BuildingConfig::from_json_str(r#"{ "number_of_floors": 4 }"#).unwrap();
    assert!(cfg.elevators.is_empty());
    assert_eq!(cfg.timing, TimingConfig::default());
}

#[test]
fn test_building_config_from_json_errors() {
    assert!(BuildingConfig::from_json_str("not json").unwrap_err().starts_with("parse error:"));
    assert!(BuildingConfig::from_json_str(r#"{ "number_of_floors": 0 }"#).is_err());
}

#[test]
fn test_building_config_serde_round_trip() {
    let cfg = building(8, vec![elevator("E1", 2, 1, 8)]);
    let json = serde_json::to_string(&cfg).unwrap();
    assert_eq!(BuildingConfig::from_json_str(&json).unwrap(), cfg);
}
