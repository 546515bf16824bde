//! Waypoint-graph error type.

use thiserror::Error;

use fl_core::WaypointId;

/// Errors produced by `fl-graph`.  Path search never errors; see
/// [`HopPlanner`](crate::HopPlanner).
#[derive(Debug, Error)]
pub enum GraphError {
    #[error("edge references unknown waypoint {0}")]
    UnknownWaypoint(WaypointId),

    #[error("{0} is bound to more than one waypoint")]
    DuplicateStation(String),

    #[error("{0} is not a storage slot")]
    NotAStorageSlot(WaypointId),

    #[error("storage slot {0} already holds a tote")]
    SlotOccupied(WaypointId),
}

pub type GraphResult<T> = Result<T, GraphError>;
