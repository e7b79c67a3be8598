//! Error types for elevator and dispatcher operations.

use thiserror::Error;

use super::direction::{Direction, Floor};

/// Errors produced by elevator units and the fleet dispatcher.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ElevatorError {
    /// Requested floor lies outside the serviceable range.
    #[error("floor {floor} is outside the serviceable range [{min}, {max}]")]
    InvalidFloor {
        /// Floor that was requested.
        floor: Floor,
        /// Lowest floor accepted.
        min: Floor,
        /// Highest floor accepted.
        max: Floor,
    },
    /// Calls must be made going up or down.
    #[error("invalid call direction: {0}")]
    InvalidDirection(Direction),
    /// Operation exists on the interface but is intentionally not implemented.
    #[error("unsupported operation: {0}")]
    Unsupported(&'static str),
    /// Construction or configuration values were rejected.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    /// A pending call was abandoned through its cancel token.
    #[error("call cancelled")]
    Cancelled,
    /// The unit has stopped its movement process.
    #[error("elevator `{0}` has been shut down")]
    Shutdown(String),
    /// Thread spawn or join failure.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ElevatorError {
    /// Build an `InvalidFloor` error when `floor` is outside `[min, max]`.
    pub(crate) fn check_floor(floor: Floor, min: Floor, max: Floor) -> Result<(), Self> {
        if (min..=max).contains(&floor) {
            Ok(())
        } else {
            Err(Self::InvalidFloor { floor, min, max })
        }
    }
}

/// Application-facing result using anyhow for higher-level contexts.
pub type AppResult<T> = Result<T, anyhow::Error>;
