//! Fleet dispatcher: assigns floor calls to the best-placed elevator.
//!
//! A call is blocking. The dispatcher scans the fleet for eligible units, picks
//! the nearest one and enqueues the pickup floor on it. When nothing is eligible
//! it waits on the fleet's [`StateSignal`], which every unit publishes on, and
//! rescans. The wait is bounded by the poll interval so a missed wake-up can
//! only cost latency.
//!
//! Scans read unit state without locks. A unit chosen by one scan may have moved
//! on by the time the pickup is enqueued; the heuristic is advisory and racing
//! callers simply rescan.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::TimingConfig;

use super::cancel::CancelToken;
use super::direction::{Direction, Floor};
use super::elevator::{ElevatorSnapshot, ElevatorUnit};
use super::error::ElevatorError;
use super::signal::StateSignal;

/// Lock-free reading of the unit state the eligibility rule looks at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitView {
    /// Floor the unit was at.
    pub floor: Floor,
    /// Whether it had pending stops.
    pub busy: bool,
    /// Direction it was travelling.
    pub direction: Direction,
}

impl UnitView {
    /// Read a unit's state without taking its lock.
    #[must_use]
    pub fn of(unit: &ElevatorUnit) -> Self {
        Self {
            floor: unit.current_floor(),
            busy: unit.is_busy(),
            direction: unit.direction(),
        }
    }

    /// Whether a unit in this state can take a call from `floor` going `direction`.
    ///
    /// Idle units are always eligible. A busy unit is eligible only while it is
    /// travelling in the call's direction and has not yet passed the floor.
    #[must_use]
    pub fn is_eligible(&self, floor: Floor, direction: Direction) -> bool {
        if !self.busy {
            return true;
        }
        if self.direction != direction {
            return false;
        }
        match direction {
            Direction::Up => self.floor < floor,
            Direction::Down => self.floor > floor,
            Direction::Idle => false,
        }
    }

    /// Floors between this unit and `floor`.
    #[must_use]
    pub const fn distance_to(&self, floor: Floor) -> u32 {
        self.floor.abs_diff(floor)
    }
}

/// Index of the nearest eligible view. Ties keep the earliest index.
pub fn select_nearest<I>(views: I, floor: Floor, direction: Direction) -> Option<usize>
where
    I: IntoIterator<Item = UnitView>,
{
    let mut best: Option<(usize, u32)> = None;
    for (idx, view) in views.into_iter().enumerate() {
        if !view.is_eligible(floor, direction) {
            continue;
        }
        let distance = view.distance_to(floor);
        if best.is_none_or(|(_, d)| distance < d) {
            best = Some((idx, distance));
            if distance == 0 {
                break;
            }
        }
    }
    best.map(|(idx, _)| idx)
}

struct FleetInner {
    number_of_floors: Floor,
    units: Vec<Arc<ElevatorUnit>>,
    signal: Arc<StateSignal>,
    poll_interval: Duration,
}

/// Dispatcher over a fixed fleet of elevator units.
///
/// Cloning is cheap and shares the same fleet.
#[derive(Clone)]
pub struct FleetDispatcher {
    inner: Arc<FleetInner>,
}

impl FleetDispatcher {
    /// Create a dispatcher for floors `1..=number_of_floors`.
    ///
    /// The fleet may be empty; calls then block until cancelled.
    ///
    /// # Errors
    ///
    /// Returns `ElevatorError::InvalidConfig` if `number_of_floors` is not positive.
    pub fn new(number_of_floors: Floor, units: Vec<Arc<ElevatorUnit>>) -> Result<Self, ElevatorError> {
        Self::with_poll_interval(
            number_of_floors,
            units,
            TimingConfig::default().poll_interval(),
        )
    }

    /// Create a dispatcher with an explicit upper bound on each wait.
    ///
    /// # Errors
    ///
    /// Returns `ElevatorError::InvalidConfig` if `number_of_floors` is not
    /// positive or `poll_interval` is zero.
    pub fn with_poll_interval(
        number_of_floors: Floor,
        units: Vec<Arc<ElevatorUnit>>,
        poll_interval: Duration,
    ) -> Result<Self, ElevatorError> {
        if number_of_floors <= 0 {
            return Err(ElevatorError::InvalidConfig(format!(
                "number of floors must be greater than 0, got {number_of_floors}"
            )));
        }
        if poll_interval.is_zero() {
            return Err(ElevatorError::InvalidConfig("poll interval must be greater than 0".into()));
        }

        let signal = Arc::new(StateSignal::new());
        for unit in &units {
            unit.subscribe(Arc::clone(&signal));
        }

        info!(
            number_of_floors,
            units = units.len(),
            poll_interval_ms = u64::try_from(poll_interval.as_millis()).unwrap_or(u64::MAX),
            "fleet dispatcher created"
        );

        Ok(Self {
            inner: Arc::new(FleetInner {
                number_of_floors,
                units,
                signal,
                poll_interval,
            }),
        })
    }

    /// Number of floors in the building.
    #[must_use]
    pub fn number_of_floors(&self) -> Floor {
        self.inner.number_of_floors
    }

    /// The fleet, in scan order.
    #[must_use]
    pub fn units(&self) -> &[Arc<ElevatorUnit>] {
        &self.inner.units
    }

    /// Call an elevator to `from_floor` for travel in `direction`.
    ///
    /// Blocks until a unit is assigned. The returned unit already has
    /// `from_floor` as a pending stop; call [`ElevatorUnit::request_floor`] on it
    /// to add a destination.
    ///
    /// # Errors
    ///
    /// - `ElevatorError::InvalidFloor` if `from_floor` is outside the building
    /// - `ElevatorError::InvalidDirection` if `direction` is `Idle`
    pub fn call_elevator(&self, from_floor: Floor, direction: Direction) -> Result<Arc<ElevatorUnit>, ElevatorError> {
        self.call_elevator_with_cancel(from_floor, direction, &CancelToken::new())
    }

    /// Like [`FleetDispatcher::call_elevator`], but gives up once `cancel` fires.
    ///
    /// # Errors
    ///
    /// As [`FleetDispatcher::call_elevator`], plus `ElevatorError::Cancelled`.
    pub fn call_elevator_with_cancel(
        &self,
        from_floor: Floor,
        direction: Direction,
        cancel: &CancelToken,
    ) -> Result<Arc<ElevatorUnit>, ElevatorError> {
        self.validate_call(from_floor, direction)?;
        cancel.watch(&self.inner.signal);

        if !self.inner.units.iter().any(|u| u.serves(from_floor)) {
            warn!(from_floor, "no elevator in the fleet serves this floor; call will wait");
        }

        let mut rescans: u64 = 0;
        loop {
            let seen = self.inner.signal.generation();
            if cancel.is_cancelled() {
                debug!(from_floor, %direction, rescans, "call cancelled");
                return Err(ElevatorError::Cancelled);
            }

            if let Some(unit) = self.find_candidate(from_floor, direction) {
                match unit.request_floor(from_floor) {
                    Ok(()) => {
                        debug!(
                            unit = %unit.name(),
                            from_floor,
                            %direction,
                            rescans,
                            "call assigned"
                        );
                        return Ok(unit);
                    }
                    // Shut down between scan and enqueue; look again.
                    Err(ElevatorError::Shutdown(_)) => continue,
                    Err(e) => return Err(e),
                }
            }

            rescans += 1;
            self.inner.signal.wait_past(seen, self.inner.poll_interval);
        }
    }

    /// One non-blocking scan for the best unit, without enqueueing anything.
    #[must_use]
    pub fn find_candidate(&self, from_floor: Floor, direction: Direction) -> Option<Arc<ElevatorUnit>> {
        let candidates: Vec<&Arc<ElevatorUnit>> = self
            .inner
            .units
            .iter()
            .filter(|u| u.serves(from_floor) && !u.is_shut_down())
            .collect();
        let views = candidates.iter().map(|u| UnitView::of(u));
        select_nearest(views, from_floor, direction).map(|idx| Arc::clone(candidates[idx]))
    }

    /// Snapshot every unit, in fleet order.
    #[must_use]
    pub fn snapshot(&self) -> Vec<ElevatorSnapshot> {
        self.inner.units.iter().map(|u| u.snapshot()).collect()
    }

    /// Shut down every unit in the fleet.
    pub fn shutdown(&self) {
        for unit in &self.inner.units {
            unit.shutdown();
        }
        self.inner.signal.publish();
    }

    fn validate_call(&self, from_floor: Floor, direction: Direction) -> Result<(), ElevatorError> {
        ElevatorError::check_floor(from_floor, 1, self.inner.number_of_floors)?;
        if !direction.is_moving() {
            return Err(ElevatorError::InvalidDirection(direction));
        }
        Ok(())
    }
}

#[cfg(feature = "tokio-runtime")]
impl FleetDispatcher {
    /// Async form of [`FleetDispatcher::call_elevator`].
    ///
    /// The wait runs on tokio's blocking pool. Dropping the returned future
    /// cancels the pending call.
    ///
    /// # Errors
    ///
    /// As [`FleetDispatcher::call_elevator`], plus `ElevatorError::Internal` if
    /// the blocking task fails.
    pub async fn call_elevator_async(
        &self,
        from_floor: Floor,
        direction: Direction,
    ) -> Result<Arc<ElevatorUnit>, ElevatorError> {
        // Reject bad input before touching the blocking pool.
        self.validate_call(from_floor, direction)?;

        let token = Arc::new(CancelToken::new());
        let _cancel_on_drop = super::cancel::CancelOnDrop(Arc::clone(&token));
        let dispatcher = self.clone();

        tokio::task::spawn_blocking(move || dispatcher.call_elevator_with_cancel(from_floor, direction, &token))
            .await
            .map_err(|e| ElevatorError::Internal(format!("dispatch task failed: {e}")))?
    }
}

impl std::fmt::Debug for FleetDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FleetDispatcher")
            .field("number_of_floors", &self.inner.number_of_floors)
            .field("units", &self.inner.units)
            .field("poll_interval", &self.inner.poll_interval)
            .finish()
    }
}
