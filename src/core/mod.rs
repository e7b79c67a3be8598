//! Elevator state machines, fleet dispatch and their concurrency plumbing.

pub mod cabin;
pub mod cancel;
pub mod direction;
pub mod dispatcher;
pub mod elevator;
pub mod error;
pub mod observer;
pub mod signal;

pub use cabin::{Cabin, Step};
pub use cancel::CancelToken;
pub use direction::{Direction, Floor};
pub use dispatcher::{select_nearest, FleetDispatcher, UnitView};
pub use elevator::{ElevatorSnapshot, ElevatorUnit};
pub use error::{AppResult, ElevatorError};
pub use observer::{FloorEvent, FloorVisitObserver};
pub use signal::StateSignal;
