//! Shared fixtures for integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crossbeam_channel::{unbounded, Receiver, Sender};
use elevator_fleet::config::{ElevatorConfig, TimingConfig};
use elevator_fleet::core::{ElevatorUnit, FleetDispatcher, FloorEvent, FloorVisitObserver, Floor};

pub const NUMBER_OF_FLOORS: Floor = 100;

/// Generous upper bound for anything that should finish in milliseconds.
pub const WAIT: Duration = Duration::from_secs(20);

/// Fast ticks so floor-by-floor tests finish quickly.
pub fn fast_timing() -> TimingConfig {
    TimingConfig {
        tick_ms: 2,
        poll_interval_ms: 10,
        event_queue_capacity: 65_536,
    }
}

/// Observer that forwards every event into a channel.
pub struct ChannelObserver {
    tx: Sender<FloorEvent>,
}

impl ChannelObserver {
    pub fn new() -> (Arc<Self>, Receiver<FloorEvent>) {
        let (tx, rx) = unbounded();
        (Arc::new(Self { tx }), rx)
    }
}

impl FloorVisitObserver for ChannelObserver {
    fn floor_visited(&self, floor: Floor) {
        let _ = self.tx.send(FloorEvent::Visited(floor));
    }

    fn stop_served(&self, floor: Floor) {
        let _ = self.tx.send(FloorEvent::Served(floor));
    }
}

/// Collect `count` visited floors, skipping served events.
pub fn collect_visits(rx: &Receiver<FloorEvent>, count: usize) -> Vec<Floor> {
    let deadline = Instant::now() + WAIT;
    let mut visits = Vec::with_capacity(count);
    while visits.len() < count {
        let remaining = deadline.saturating_duration_since(Instant::now());
        match rx.recv_timeout(remaining) {
            Ok(FloorEvent::Visited(floor)) => visits.push(floor),
            Ok(FloorEvent::Served(_)) => {}
            Err(_) => break,
        }
    }
    visits
}

/// Assert that no further floor moves arrive within a short grace period.
pub fn assert_no_more_visits(rx: &Receiver<FloorEvent>) {
    let deadline = Instant::now() + Duration::from_millis(50);
    loop {
        let remaining = deadline.saturating_duration_since(Instant::now());
        match rx.recv_timeout(remaining) {
            Ok(FloorEvent::Visited(floor)) => panic!("unexpected visit to floor {floor}"),
            Ok(FloorEvent::Served(_)) => {}
            Err(_) => return,
        }
    }
}

pub fn start_unit(name: &str, floor: Floor, timing: &TimingConfig) -> Arc<ElevatorUnit> {
    let config = ElevatorConfig {
        name: name.to_owned(),
        initial_floor: floor,
        min_floor: 1,
        top_floor: NUMBER_OF_FLOORS,
    };
    ElevatorUnit::start_with(&config, timing).expect("unit should start")
}

pub fn wait_idle(unit: &ElevatorUnit) {
    assert!(
        unit.wait_until_idle(WAIT),
        "{} still busy at floor {} with stops {:?}",
        unit.name(),
        unit.current_floor(),
        unit.pending_stops()
    );
}

/// A building of `NUMBER_OF_FLOORS` with one recorder per unit.
///
/// Units are named "Elevator 1", "Elevator 2", ... in the order given.
pub struct Building {
    pub fleet: FleetDispatcher,
    events: HashMap<String, Receiver<FloorEvent>>,
}

impl Building {
    pub fn with_units_at(floors: &[Floor]) -> Self {
        Self::with_timing(floors, &fast_timing())
    }

    pub fn with_timing(floors: &[Floor], timing: &TimingConfig) -> Self {
        let mut events = HashMap::new();
        let units: Vec<_> = floors
            .iter()
            .enumerate()
            .map(|(idx, &floor)| {
                let unit = start_unit(&format!("Elevator {}", idx + 1), floor, timing);
                let (observer, rx) = ChannelObserver::new();
                unit.set_floor_listener(observer);
                events.insert(unit.name().to_owned(), rx);
                unit
            })
            .collect();
        let fleet = FleetDispatcher::with_poll_interval(NUMBER_OF_FLOORS, units, timing.poll_interval())
            .expect("valid building");
        Self { fleet, events }
    }

    pub fn events_for(&self, unit: &ElevatorUnit) -> &Receiver<FloorEvent> {
        &self.events[unit.name()]
    }

    pub fn unit(&self, name: &str) -> Arc<ElevatorUnit> {
        self.fleet
            .units()
            .iter()
            .find(|u| u.name() == name)
            .cloned()
            .expect("unit exists")
    }
}

impl Drop for Building {
    fn drop(&mut self) {
        self.fleet.shutdown();
    }
}
