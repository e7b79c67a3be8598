//! Elevator unit with an autonomous movement thread.
//!
//! Each unit owns two OS threads:
//!
//! - **movement**: locks the cabin once per tick, advances it one step and
//!   publishes what changed
//! - **delivery**: forwards floor events to the registered observer
//!
//! # Design
//!
//! - One `parking_lot::Mutex` guards the [`Cabin`]: floor, direction and
//!   pending stops always change together
//! - Floor, direction and busy flag are mirrored into atomics under that lock,
//!   so readers such as the dispatcher scan never take it
//! - Every transition publishes on the unit's [`StateSignal`]s; waiters block on
//!   a condvar instead of polling
//! - Shutdown wakes the movement thread immediately; dropping its event
//!   publisher then ends the delivery thread

use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicI32, AtomicU64, AtomicU8, Ordering};
use std::sync::{Arc, Weak};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex, RwLock};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::config::{ElevatorConfig, TimingConfig};

use super::cabin::{Cabin, Step};
use super::direction::{Direction, Floor};
use super::error::ElevatorError;
use super::observer::{spawn_delivery, EventPublisher, FloorEvent, FloorVisitObserver, ObserverHandle};
use super::signal::StateSignal;

/// Point-in-time view of a unit, suitable for serialization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElevatorSnapshot {
    /// Stable unit identifier.
    pub id: Uuid,
    /// Human-readable name.
    pub name: String,
    /// Floor at snapshot time.
    pub current_floor: Floor,
    /// Travel direction at snapshot time.
    pub direction: Direction,
    /// Whether stops were pending.
    pub busy: bool,
    /// Pending stops, ascending.
    pub pending_stops: Vec<Floor>,
    /// Lowest floor served.
    pub min_floor: Floor,
    /// Highest floor served.
    pub top_floor: Floor,
    /// Floor events discarded because the observer queue was full.
    pub dropped_events: u64,
}

/// State shared between the unit handle and its threads.
struct UnitShared {
    name: String,
    min_floor: Floor,
    top_floor: Floor,

    /// Floor, direction and pending stops. Held for one tick or one enqueue.
    cabin: Mutex<Cabin>,

    /// Lock-free mirrors of the cabin, written only while `cabin` is held.
    current_floor: AtomicI32,
    direction: AtomicU8,
    busy: AtomicBool,

    observer: RwLock<Option<ObserverHandle>>,
    /// Held weakly; a subscriber that drops its signal is pruned on the next publish.
    signals: RwLock<Vec<Weak<StateSignal>>>,
    dropped_events: Arc<AtomicU64>,

    /// Shutdown flag paired with `shutdown_cv` so the tick sleep can be interrupted.
    shutdown: Mutex<bool>,
    shutdown_cv: Condvar,
    stopped: AtomicBool,
}

impl UnitShared {
    fn mirror(&self, cabin: &Cabin) {
        self.current_floor.store(cabin.floor(), Ordering::Release);
        self.direction.store(cabin.direction().as_u8(), Ordering::Release);
        self.busy.store(cabin.is_busy(), Ordering::Release);
    }

    fn publish(&self) {
        let mut stale = false;
        for signal in self.signals.read().iter() {
            match signal.upgrade() {
                Some(signal) => signal.publish(),
                None => stale = true,
            }
        }
        if stale {
            self.signals.write().retain(|s| s.strong_count() > 0);
        }
    }

    /// Sleep for one tick. Returns `false` once shutdown has been requested.
    fn sleep_tick(&self, tick: Duration) -> bool {
        let mut shutdown = self.shutdown.lock();
        if !*shutdown {
            let _ = self.shutdown_cv.wait_for(&mut shutdown, tick);
        }
        !*shutdown
    }

    fn request_shutdown(&self) -> bool {
        let mut shutdown = self.shutdown.lock();
        if *shutdown {
            return false;
        }
        *shutdown = true;
        self.stopped.store(true, Ordering::Release);
        drop(shutdown);
        self.shutdown_cv.notify_all();
        true
    }
}

/// One elevator car: thread-safe stop requests, lock-free state reads.
///
/// Created with [`ElevatorUnit::start`] and shared as `Arc<ElevatorUnit>`. The
/// movement thread runs until [`ElevatorUnit::shutdown`] is called or the last
/// handle is dropped.
pub struct ElevatorUnit {
    id: Uuid,
    shared: Arc<UnitShared>,
    /// Change signal owned by this unit, used by [`ElevatorUnit::wait_until_idle`].
    own_signal: Arc<StateSignal>,
    workers: Mutex<Vec<JoinHandle<()>>>,
}

impl ElevatorUnit {
    /// Start a unit with default timing.
    ///
    /// # Errors
    ///
    /// Returns `ElevatorError::InvalidConfig` if the range is empty or the
    /// initial floor lies outside it, and `ElevatorError::Internal` if a thread
    /// cannot be spawned.
    pub fn start(
        name: impl Into<String>,
        initial_floor: Floor,
        min_floor: Floor,
        top_floor: Floor,
    ) -> Result<Arc<Self>, ElevatorError> {
        let config = ElevatorConfig {
            name: name.into(),
            initial_floor,
            min_floor,
            top_floor,
        };
        Self::start_with(&config, &TimingConfig::default())
    }

    /// Start a unit from configuration.
    ///
    /// # Errors
    ///
    /// Same as [`ElevatorUnit::start`], plus invalid timing values.
    pub fn start_with(config: &ElevatorConfig, timing: &TimingConfig) -> Result<Arc<Self>, ElevatorError> {
        config.validate().map_err(ElevatorError::InvalidConfig)?;
        timing.validate().map_err(ElevatorError::InvalidConfig)?;

        let cabin = Cabin::new(config.initial_floor, config.min_floor, config.top_floor);
        let own_signal = Arc::new(StateSignal::new());
        let shared = Arc::new(UnitShared {
            name: config.name.clone(),
            min_floor: config.min_floor,
            top_floor: config.top_floor,
            current_floor: AtomicI32::new(cabin.floor()),
            direction: AtomicU8::new(cabin.direction().as_u8()),
            busy: AtomicBool::new(false),
            cabin: Mutex::new(cabin),
            observer: RwLock::new(None),
            signals: RwLock::new(vec![Arc::downgrade(&own_signal)]),
            dropped_events: Arc::new(AtomicU64::new(0)),
            shutdown: Mutex::new(false),
            shutdown_cv: Condvar::new(),
            stopped: AtomicBool::new(false),
        });

        let (publisher, delivery) = spawn_delivery(
            &config.name,
            timing.event_queue_capacity,
            Arc::clone(&shared.dropped_events),
        )?;
        let movement = spawn_movement(Arc::clone(&shared), publisher, timing.tick())
            .inspect_err(|_| {
                // Publisher moved into the failed spawn and is gone; delivery exits on its own.
                shared.request_shutdown();
            })?;

        info!(
            unit = %config.name,
            floor = config.initial_floor,
            min_floor = config.min_floor,
            top_floor = config.top_floor,
            tick_ms = timing.tick_ms,
            "elevator unit started"
        );

        Ok(Arc::new(Self {
            id: Uuid::new_v4(),
            shared,
            own_signal,
            workers: Mutex::new(vec![movement, delivery]),
        }))
    }

    /// Register a stop, as a passenger pressing a cabin button would.
    ///
    /// The unit is not moved here; the movement thread picks the stop up on its
    /// next tick.
    ///
    /// # Errors
    ///
    /// - `ElevatorError::InvalidFloor` if `floor` is outside this unit's range
    /// - `ElevatorError::Shutdown` if the unit has been shut down
    pub fn request_floor(&self, floor: Floor) -> Result<(), ElevatorError> {
        ElevatorError::check_floor(floor, self.shared.min_floor, self.shared.top_floor)?;
        if self.is_shut_down() {
            return Err(ElevatorError::Shutdown(self.shared.name.clone()));
        }

        {
            let mut cabin = self.shared.cabin.lock();
            let started = cabin.enqueue(floor);
            self.shared.mirror(&cabin);
            debug!(
                unit = %self.shared.name,
                floor,
                current = cabin.floor(),
                direction = %cabin.direction(),
                started,
                "floor requested"
            );
        }
        self.shared.publish();
        Ok(())
    }

    /// Direct movement to a floor. Not supported: units only move through
    /// requested stops.
    ///
    /// # Errors
    ///
    /// Always returns `ElevatorError::Unsupported`.
    pub const fn move_elevator(&self, _to_floor: Floor) -> Result<(), ElevatorError> {
        Err(ElevatorError::Unsupported("move_elevator"))
    }

    /// Whether any stop is pending.
    #[must_use]
    pub fn is_busy(&self) -> bool {
        self.shared.busy.load(Ordering::Acquire)
    }

    /// Floor the unit is currently at.
    #[must_use]
    pub fn current_floor(&self) -> Floor {
        self.shared.current_floor.load(Ordering::Acquire)
    }

    /// Current travel direction.
    #[must_use]
    pub fn direction(&self) -> Direction {
        Direction::from_u8(self.shared.direction.load(Ordering::Acquire))
    }

    /// Unit name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.shared.name
    }

    /// Stable identifier assigned at construction.
    #[must_use]
    pub const fn id(&self) -> Uuid {
        self.id
    }

    /// Lowest floor this unit serves.
    #[must_use]
    pub fn min_floor(&self) -> Floor {
        self.shared.min_floor
    }

    /// Highest floor this unit serves.
    #[must_use]
    pub fn top_floor(&self) -> Floor {
        self.shared.top_floor
    }

    /// Whether `floor` lies within this unit's range.
    #[must_use]
    pub fn serves(&self, floor: Floor) -> bool {
        (self.shared.min_floor..=self.shared.top_floor).contains(&floor)
    }

    /// Pending stops in ascending order. Takes the unit lock.
    #[must_use]
    pub fn pending_stops(&self) -> Vec<Floor> {
        self.shared.cabin.lock().stops()
    }

    /// Replace the floor observer. Takes effect from the next tick.
    pub fn set_floor_listener(&self, observer: Arc<dyn FloorVisitObserver>) {
        *self.shared.observer.write() = Some(observer);
    }

    /// Remove the floor observer.
    pub fn clear_floor_listener(&self) {
        *self.shared.observer.write() = None;
    }

    /// Also publish state changes on `signal`.
    ///
    /// The unit keeps only a weak reference; once every other handle to
    /// `signal` is dropped it stops being published to.
    pub fn subscribe(&self, signal: Arc<StateSignal>) {
        let signal = Arc::downgrade(&signal);
        let mut signals = self.shared.signals.write();
        signals.retain(|s| s.strong_count() > 0);
        if !signals.iter().any(|s| Weak::ptr_eq(s, &signal)) {
            signals.push(signal);
        }
    }

    /// Block until the unit is idle or `timeout` elapses.
    ///
    /// Returns `true` if the unit was idle on return.
    pub fn wait_until_idle(&self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        loop {
            let seen = self.own_signal.generation();
            if !self.is_busy() {
                return true;
            }
            let now = Instant::now();
            if now >= deadline || self.is_shut_down() {
                return false;
            }
            self.own_signal.wait_past(seen, deadline - now);
        }
    }

    /// Consistent snapshot taken under the unit lock.
    #[must_use]
    pub fn snapshot(&self) -> ElevatorSnapshot {
        let cabin = self.shared.cabin.lock();
        ElevatorSnapshot {
            id: self.id,
            name: self.shared.name.clone(),
            current_floor: cabin.floor(),
            direction: cabin.direction(),
            busy: cabin.is_busy(),
            pending_stops: cabin.stops(),
            min_floor: self.shared.min_floor,
            top_floor: self.shared.top_floor,
            dropped_events: self.shared.dropped_events.load(Ordering::Relaxed),
        }
    }

    /// Whether the unit has stopped, through [`ElevatorUnit::shutdown`] or
    /// because its movement thread panicked.
    #[must_use]
    pub fn is_shut_down(&self) -> bool {
        self.shared.stopped.load(Ordering::Acquire)
    }

    /// Stop the movement and delivery threads and wait for them to exit.
    ///
    /// Pending stops are abandoned. Calling this from an observer callback only
    /// signals shutdown; the threads are then left to exit on their own.
    pub fn shutdown(&self) {
        if self.shared.request_shutdown() {
            info!(unit = %self.shared.name, "shutting down elevator unit");
            self.shared.publish();
        }

        let current = thread::current().id();
        let workers: Vec<_> = self.workers.lock().drain(..).collect();
        if workers.is_empty() {
            return;
        }
        for worker in workers {
            if worker.thread().id() == current {
                continue;
            }
            if worker.join().is_err() {
                warn!(unit = %self.shared.name, "elevator thread panicked");
            }
        }
        info!(unit = %self.shared.name, "elevator unit shut down");
    }
}

impl Drop for ElevatorUnit {
    fn drop(&mut self) {
        // Signal only; joining here could hang if dropped on one of our own threads.
        if self.shared.request_shutdown() {
            debug!(unit = %self.shared.name, "elevator unit dropped without explicit shutdown");
        }
    }
}

impl fmt::Debug for ElevatorUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ElevatorUnit")
            .field("id", &self.id)
            .field("name", &self.shared.name)
            .field("current_floor", &self.current_floor())
            .field("direction", &self.direction())
            .field("busy", &self.is_busy())
            .finish_non_exhaustive()
    }
}

/// Marks the unit stopped when the movement thread unwinds.
struct StopOnPanic<'a>(&'a UnitShared);

impl Drop for StopOnPanic<'_> {
    fn drop(&mut self) {
        if thread::panicking() {
            error!(unit = %self.0.name, "movement thread panicked; unit stopped");
            self.0.request_shutdown();
            self.0.publish();
        }
    }
}

/// Spawn the movement thread.
fn spawn_movement(
    shared: Arc<UnitShared>,
    publisher: EventPublisher,
    tick: Duration,
) -> Result<JoinHandle<()>, ElevatorError> {
    let name = shared.name.clone();
    thread::Builder::new()
        .name(format!("elevator-{name}"))
        .spawn(move || {
            let _stop_on_panic = StopOnPanic(&shared);
            debug!(unit = %shared.name, "movement loop started");
            loop {
                let (step, observer) = {
                    let mut cabin = shared.cabin.lock();
                    let step = cabin.step();
                    shared.mirror(&cabin);
                    if step.changed_state() {
                        debug!(
                            unit = %shared.name,
                            ?step,
                            direction = %cabin.direction(),
                            pending = ?cabin.stops(),
                            "tick"
                        );
                    }
                    // Observer is read once per tick, inside the critical section.
                    (step, shared.observer.read().clone())
                };

                if step.changed_state() {
                    shared.publish();
                }
                if let Some(observer) = observer {
                    match step {
                        Step::Moved(floor) => publisher.publish(observer, FloorEvent::Visited(floor)),
                        Step::Served(floor) => publisher.publish(observer, FloorEvent::Served(floor)),
                        Step::Idle | Step::Blocked(_) => {}
                    }
                }

                if !shared.sleep_tick(tick) {
                    break;
                }
            }
            debug!(unit = %shared.name, "movement loop stopped");
        })
        .map_err(|e| ElevatorError::Internal(format!("failed to spawn movement thread: {e}")))
}
