//! Travel direction shared by units and callers.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Floor number. Buildings count from 1; unit ranges may start anywhere.
pub type Floor = i32;

/// Direction a unit is travelling, or `Idle` when it has nothing to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum Direction {
    /// No pending stops.
    Idle = 0,
    /// Moving toward higher floors.
    Up = 1,
    /// Moving toward lower floors.
    Down = 2,
}

impl Direction {
    /// The opposite travel direction. `Idle` stays `Idle`.
    #[must_use]
    pub const fn reversed(self) -> Self {
        match self {
            Self::Up => Self::Down,
            Self::Down => Self::Up,
            Self::Idle => Self::Idle,
        }
    }

    /// Whether this is `Up` or `Down`.
    #[must_use]
    pub const fn is_moving(self) -> bool {
        !matches!(self, Self::Idle)
    }

    /// Direction needed to travel from `from` to reach `to`. Same floor counts as `Up`.
    #[must_use]
    pub const fn toward(from: Floor, to: Floor) -> Self {
        if to >= from {
            Self::Up
        } else {
            Self::Down
        }
    }

    pub(crate) const fn as_u8(self) -> u8 {
        self as u8
    }

    pub(crate) const fn from_u8(raw: u8) -> Self {
        match raw {
            1 => Self::Up,
            2 => Self::Down,
            _ => Self::Idle,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Up => write!(f, "up"),
            Self::Down => write!(f, "down"),
            Self::Idle => write!(f, "idle"),
        }
    }
}
