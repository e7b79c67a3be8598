//! Movement state machine for a single cabin.
//!
//! `Cabin` holds everything one elevator's lock guards: the current floor, the
//! travel direction and the ordered set of pending stops. It has no threads or
//! clocks of its own; [`ElevatorUnit`](super::ElevatorUnit) drives it one
//! [`Cabin::step`] per tick.
//!
//! Stops are served in sweep order. A moving cabin keeps its direction while
//! any pending stop lies strictly ahead and reverses only once the far side is
//! exhausted.

use std::collections::BTreeSet;
use std::ops::Bound::{Excluded, Unbounded};

use super::direction::{Direction, Floor};

/// What a single tick did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Nothing pending; the cabin is idle.
    Idle,
    /// The cabin was at a pending floor and opened its doors.
    Served(Floor),
    /// The cabin moved to a new floor.
    Moved(Floor),
    /// The cabin hit a bound of its range and flipped direction instead of moving.
    Blocked(Floor),
}

impl Step {
    /// Whether this step changed observable state.
    #[must_use]
    pub const fn changed_state(self) -> bool {
        !matches!(self, Self::Idle)
    }
}

/// Floor, direction and pending stops for one elevator.
#[derive(Debug, Clone)]
pub struct Cabin {
    floor: Floor,
    min_floor: Floor,
    top_floor: Floor,
    direction: Direction,
    stops: BTreeSet<Floor>,
}

impl Cabin {
    /// Idle cabin parked at `floor`. Callers validate that the floor is within range.
    #[must_use]
    pub const fn new(floor: Floor, min_floor: Floor, top_floor: Floor) -> Self {
        Self {
            floor,
            min_floor,
            top_floor,
            direction: Direction::Idle,
            stops: BTreeSet::new(),
        }
    }

    /// Current floor.
    #[must_use]
    pub const fn floor(&self) -> Floor {
        self.floor
    }

    /// Current travel direction.
    #[must_use]
    pub const fn direction(&self) -> Direction {
        self.direction
    }

    /// Whether any stop is pending.
    #[must_use]
    pub fn is_busy(&self) -> bool {
        !self.stops.is_empty()
    }

    /// Pending stops in ascending order.
    #[must_use]
    pub fn stops(&self) -> Vec<Floor> {
        self.stops.iter().copied().collect()
    }

    /// Register a stop. The first stop of an idle cabin picks the direction.
    ///
    /// Returns `true` when the cabin went from idle to moving.
    pub fn enqueue(&mut self, floor: Floor) -> bool {
        let was_idle = self.stops.is_empty();
        if was_idle {
            self.direction = Direction::toward(self.floor, floor);
        }
        self.stops.insert(floor);
        was_idle
    }

    /// Advance one tick.
    ///
    /// # Panics
    ///
    /// Panics if the cabin has pending stops but no travel direction. That state
    /// cannot be reached through [`Cabin::enqueue`] and indicates a bug.
    pub fn step(&mut self) -> Step {
        if self.stops.is_empty() {
            self.direction = Direction::Idle;
            return Step::Idle;
        }

        if self.stops.remove(&self.floor) {
            if self.stops.is_empty() {
                self.direction = Direction::Idle;
            }
            return Step::Served(self.floor);
        }

        assert!(
            self.direction.is_moving(),
            "cabin at floor {} has pending stops {:?} but no direction",
            self.floor,
            self.stops
        );

        if !self.has_stops_ahead() {
            self.direction = self.direction.reversed();
        }

        match self.direction {
            Direction::Up if self.floor < self.top_floor => {
                self.floor += 1;
                Step::Moved(self.floor)
            }
            Direction::Down if self.floor > self.min_floor => {
                self.floor -= 1;
                Step::Moved(self.floor)
            }
            _ => {
                self.direction = self.direction.reversed();
                Step::Blocked(self.floor)
            }
        }
    }

    #[cfg(test)]
    pub(crate) fn force_direction(&mut self, direction: Direction) {
        self.direction = direction;
    }

    fn has_stops_ahead(&self) -> bool {
        match self.direction {
            Direction::Up => self.stops.range((Excluded(self.floor), Unbounded)).next().is_some(),
            Direction::Down => self.stops.range(..self.floor).next_back().is_some(),
            Direction::Idle => false,
        }
    }
}
