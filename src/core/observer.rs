//! Floor-visit observer contract and off-lock event delivery.
//!
//! The movement tick never calls an observer directly. It pushes the event,
//! bound to whichever observer was registered at that tick, onto a bounded
//! channel. A dedicated delivery thread per unit drains the channel in order and
//! invokes the observer, so a slow or panicking observer cannot stall the
//! elevator.

use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};
use tracing::{debug, error, warn};

use super::direction::Floor;
use super::error::ElevatorError;

/// Receives floor events from an elevator unit.
///
/// Callbacks run on the unit's delivery thread, one at a time and in the order
/// the events happened.
pub trait FloorVisitObserver: Send + Sync + 'static {
    /// The unit moved and is now at `floor`.
    fn floor_visited(&self, floor: Floor);

    /// The unit stopped at `floor` to serve a pending stop.
    fn stop_served(&self, _floor: Floor) {}
}

impl<F> FloorVisitObserver for F
where
    F: Fn(Floor) + Send + Sync + 'static,
{
    fn floor_visited(&self, floor: Floor) {
        self(floor);
    }
}

/// A floor event emitted by one movement tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FloorEvent {
    /// The unit moved to this floor.
    Visited(Floor),
    /// The unit served a stop at this floor.
    Served(Floor),
}

pub(crate) type ObserverHandle = Arc<dyn FloorVisitObserver>;

struct Delivery {
    observer: ObserverHandle,
    event: FloorEvent,
}

/// Sending half owned by the movement thread.
///
/// Dropping it closes the channel, which ends the delivery thread once the
/// remaining events are drained.
pub(crate) struct EventPublisher {
    tx: Sender<Delivery>,
    dropped: Arc<AtomicU64>,
    unit: String,
}

impl EventPublisher {
    /// Queue an event without blocking. A full queue drops the event.
    pub(crate) fn publish(&self, observer: ObserverHandle, event: FloorEvent) {
        match self.tx.try_send(Delivery { observer, event }) {
            Ok(()) => {}
            Err(TrySendError::Full(_)) => {
                let total = self.dropped.fetch_add(1, Ordering::Relaxed) + 1;
                warn!(unit = %self.unit, ?event, dropped = total, "observer queue full, event dropped");
            }
            Err(TrySendError::Disconnected(_)) => {
                debug!(unit = %self.unit, ?event, "delivery thread gone, event discarded");
            }
        }
    }
}

/// Start the delivery thread for one unit.
pub(crate) fn spawn_delivery(
    unit: &str,
    capacity: usize,
    dropped: Arc<AtomicU64>,
) -> Result<(EventPublisher, JoinHandle<()>), ElevatorError> {
    let (tx, rx) = bounded::<Delivery>(capacity);
    let name = unit.to_owned();
    let handle = thread::Builder::new()
        .name(format!("elevator-events-{unit}"))
        .spawn(move || delivery_loop(&name, &rx))
        .map_err(|e| ElevatorError::Internal(format!("failed to spawn delivery thread: {e}")))?;

    Ok((
        EventPublisher {
            tx,
            dropped,
            unit: unit.to_owned(),
        },
        handle,
    ))
}

fn delivery_loop(unit: &str, rx: &Receiver<Delivery>) {
    debug!(unit, "event delivery started");
    // recv fails once the publisher is dropped and the queue is empty.
    while let Ok(Delivery { observer, event }) = rx.recv() {
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| match event {
            FloorEvent::Visited(floor) => observer.floor_visited(floor),
            FloorEvent::Served(floor) => observer.stop_served(floor),
        }));
        if outcome.is_err() {
            error!(unit, ?event, "floor observer panicked; event skipped");
        }
    }
    debug!(unit, "event delivery finished");
}
