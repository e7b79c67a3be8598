//! # Elevator Fleet
//!
//! A concurrent multi-elevator dispatch and movement engine.
//!
//! Every [`ElevatorUnit`](core::ElevatorUnit) runs its own movement thread that
//! advances one floor per tick, serving pending stops in sweep order: it keeps
//! its direction while stops lie ahead and reverses only when that side is
//! exhausted. The [`FleetDispatcher`](core::FleetDispatcher) assigns floor calls
//! to the nearest unit that is idle or can still intercept the caller on its
//! way.
//!
//! ## Key Features
//!
//! - **Per-unit locking**: one `parking_lot::Mutex` per unit, lock-free state reads
//! - **No polling**: blocked calls wait on a condvar that units signal on every change
//! - **Cancellable calls**: `CancelToken` for blocking calls, drop-to-cancel for async
//! - **Isolated observers**: floor events are delivered off the movement thread
//! - **Clean shutdown**: units stop and join their threads on request
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! use elevator_fleet::core::{Direction, ElevatorUnit, FleetDispatcher, Floor};
//!
//! # fn main() -> Result<(), elevator_fleet::core::ElevatorError> {
//! let units = vec![
//!     ElevatorUnit::start("Elevator 1", 1, 1, 100)?,
//!     ElevatorUnit::start("Elevator 2", 50, 1, 100)?,
//! ];
//! units[0].set_floor_listener(Arc::new(|floor: Floor| println!("at floor {floor}")));
//!
//! let fleet = FleetDispatcher::new(100, units)?;
//!
//! // Blocks until a unit is assigned; the pickup floor is already queued on it.
//! let elevator = fleet.call_elevator(2, Direction::Up)?;
//! elevator.wait_until_idle(Duration::from_secs(10));
//! elevator.request_floor(10)?;
//!
//! fleet.shutdown();
//! # Ok(())
//! # }
//! ```
//!
//! Fleets can also be built from JSON with [`builders::build_fleet`] and
//! [`config::BuildingConfig::from_json_str`].

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

/// Elevator state machines, dispatch and concurrency plumbing.
pub mod core;
/// Configuration models for the building, elevators and timing.
pub mod config;
/// Builders to construct a running fleet from configuration.
pub mod builders;
/// Shared utilities.
pub mod util;
