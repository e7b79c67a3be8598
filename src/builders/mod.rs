//! Builders to construct a running fleet from configuration.

pub mod fleet_builder;

pub use fleet_builder::build_fleet;
