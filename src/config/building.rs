//! Building, elevator and timing configuration structures.

use std::collections::HashSet;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::core::Floor;

/// Environment variable overriding [`TimingConfig::tick_ms`].
pub const TICK_MS_ENV: &str = "ELEVATOR_TICK_MS";
/// Environment variable overriding [`TimingConfig::poll_interval_ms`].
pub const POLL_INTERVAL_MS_ENV: &str = "ELEVATOR_POLL_INTERVAL_MS";
/// Environment variable overriding [`TimingConfig::event_queue_capacity`].
pub const EVENT_QUEUE_CAPACITY_ENV: &str = "ELEVATOR_EVENT_QUEUE_CAPACITY";

/// One elevator unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElevatorConfig {
    /// Unit name, unique within a building.
    pub name: String,
    /// Floor the unit starts at.
    pub initial_floor: Floor,
    /// Lowest floor the unit serves.
    pub min_floor: Floor,
    /// Highest floor the unit serves.
    pub top_floor: Floor,
}

/// Movement cadence and dispatcher wait bounds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    /// Period of each unit's movement tick, in milliseconds.
    pub tick_ms: u64,
    /// Longest a blocked call waits before rescanning, in milliseconds.
    pub poll_interval_ms: u64,
    /// Capacity of each unit's observer event queue.
    pub event_queue_capacity: usize,
}

/// Root building configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildingConfig {
    /// Floors are numbered `1..=number_of_floors`.
    pub number_of_floors: Floor,
    /// Fleet, in dispatcher scan order. May be empty.
    #[serde(default)]
    pub elevators: Vec<ElevatorConfig>,
    /// Timing shared by every unit.
    #[serde(default)]
    pub timing: TimingConfig,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            tick_ms: 100,
            poll_interval_ms: 50,
            event_queue_capacity: 256,
        }
    }
}

impl ElevatorConfig {
    /// Validate the unit's range and starting floor.
    pub fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("elevator name must not be empty".into());
        }
        if self.min_floor > self.top_floor {
            return Err(format!(
                "min_floor {} is above top_floor {}",
                self.min_floor, self.top_floor
            ));
        }
        if !(self.min_floor..=self.top_floor).contains(&self.initial_floor) {
            return Err(format!(
                "initial_floor {} is outside [{}, {}]",
                self.initial_floor, self.min_floor, self.top_floor
            ));
        }
        Ok(())
    }
}

impl TimingConfig {
    /// Validate timing values.
    pub fn validate(&self) -> Result<(), String> {
        if self.tick_ms == 0 {
            return Err("tick_ms must be greater than 0".into());
        }
        if self.poll_interval_ms == 0 {
            return Err("poll_interval_ms must be greater than 0".into());
        }
        if self.event_queue_capacity == 0 {
            return Err("event_queue_capacity must be greater than 0".into());
        }
        Ok(())
    }

    /// Movement tick period.
    #[must_use]
    pub const fn tick(&self) -> Duration {
        Duration::from_millis(self.tick_ms)
    }

    /// Dispatcher wait bound.
    #[must_use]
    pub const fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// Defaults overridden by `ELEVATOR_*` environment variables.
    ///
    /// A `.env` file in the working directory is loaded first if present.
    pub fn from_env() -> Result<Self, String> {
        // A missing .env file is not an error.
        let _ = dotenvy::dotenv();
        let defaults = Self::default();
        let cfg = Self {
            tick_ms: env_or(TICK_MS_ENV, defaults.tick_ms)?,
            poll_interval_ms: env_or(POLL_INTERVAL_MS_ENV, defaults.poll_interval_ms)?,
            event_queue_capacity: env_or(EVENT_QUEUE_CAPACITY_ENV, defaults.event_queue_capacity)?,
        };
        cfg.validate()?;
        Ok(cfg)
    }
}

impl BuildingConfig {
    /// Validate the building, every elevator and the timing block.
    ///
    /// Elevator ranges must lie inside the building and names must be unique.
    pub fn validate(&self) -> Result<(), String> {
        if self.number_of_floors <= 0 {
            return Err(format!(
                "number_of_floors must be greater than 0, got {}",
                self.number_of_floors
            ));
        }
        self.timing.validate().map_err(|e| format!("timing invalid: {e}"))?;

        let mut names = HashSet::new();
        for elevator in &self.elevators {
            elevator
                .validate()
                .map_err(|e| format!("elevator `{}` invalid: {e}", elevator.name))?;
            if elevator.min_floor < 1 || elevator.top_floor > self.number_of_floors {
                return Err(format!(
                    "elevator `{}` range [{}, {}] exceeds building floors [1, {}]",
                    elevator.name, elevator.min_floor, elevator.top_floor, self.number_of_floors
                ));
            }
            if !names.insert(elevator.name.as_str()) {
                return Err(format!("duplicate elevator name `{}`", elevator.name));
            }
        }
        Ok(())
    }

    /// Parse building configuration from a JSON string and validate.
    pub fn from_json_str(input: &str) -> Result<Self, String> {
        let cfg: Self = serde_json::from_str(input).map_err(|e| format!("parse error: {e}"))?;
        cfg.validate()?;
        Ok(cfg)
    }
}

fn env_or<T>(key: &str, default: T) -> Result<T, String>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|e| format!("{key}={raw:?} is not valid: {e}")),
        Err(_) => Ok(default),
    }
}
