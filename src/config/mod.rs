//! Configuration models for the building, its elevators and timing.

pub mod building;

pub use building::{
    BuildingConfig, ElevatorConfig, TimingConfig, EVENT_QUEUE_CAPACITY_ENV, POLL_INTERVAL_MS_ENV,
    TICK_MS_ENV,
};
