//! Builder to construct a running fleet from configuration.

use std::sync::Arc;

use tracing::info;

use crate::config::BuildingConfig;
use crate::core::{ElevatorError, ElevatorUnit, FleetDispatcher};

/// Validate `cfg`, start every elevator and wrap them in a dispatcher.
///
/// Units are scanned in the order they appear in the configuration. If any unit
/// fails to start, the ones already running are shut down.
///
/// # Errors
///
/// Returns `ElevatorError::InvalidConfig` for invalid configuration and
/// `ElevatorError::Internal` if a unit's threads cannot be spawned.
pub fn build_fleet(cfg: &BuildingConfig) -> Result<FleetDispatcher, ElevatorError> {
    cfg.validate().map_err(ElevatorError::InvalidConfig)?;

    let mut units: Vec<Arc<ElevatorUnit>> = Vec::with_capacity(cfg.elevators.len());
    for elevator in &cfg.elevators {
        match ElevatorUnit::start_with(elevator, &cfg.timing) {
            Ok(unit) => units.push(unit),
            Err(e) => {
                for unit in &units {
                    unit.shutdown();
                }
                return Err(e);
            }
        }
    }

    info!(
        number_of_floors = cfg.number_of_floors,
        units = units.len(),
        "fleet built from configuration"
    );
    FleetDispatcher::with_poll_interval(cfg.number_of_floors, units, cfg.timing.poll_interval())
}
