//! Tests for utility functions

use elevator_fleet::core::Direction;
use elevator_fleet::util::{init_tracing, DEFAULT_LOG_FILTER};

#[test]
fn test_init_tracing_is_idempotent() {
    init_tracing();
    init_tracing();
    assert!(tracing::dispatcher::has_been_set());
}

#[test]
fn test_default_log_filter_targets_crate() {
    assert!(DEFAULT_LOG_FILTER.starts_with("elevator_fleet"));
}

#[test]
fn test_direction_helpers() {
    assert_eq!(Direction::Up.reversed(), Direction::Down);
    assert_eq!(Direction::Down.reversed(), Direction::Up);
    assert_eq!(Direction::Idle.reversed(), Direction::Idle);
    assert!(Direction::Up.is_moving());
    assert!(!Direction::Idle.is_moving());
    assert_eq!(Direction::toward(3, 7), Direction::Up);
    assert_eq!(Direction::toward(7, 3), Direction::Down);
}

#[test]
fn test_direction_serde() {
    assert_eq!(serde_json::to_string(&Direction::Up).unwrap(), "\"up\"");
    let parsed: Direction = serde_json::from_str("\"down\"").unwrap();
    assert_eq!(parsed, Direction::Down);
}
