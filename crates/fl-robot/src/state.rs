//! Locomotion sub-states held in a robot's state queue.

use fl_core::{LetterStationId, TileId, ToteId, Vec2, WaypointId, WordId, WordStationId};

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct MoveState {
    /// Point currently steered at: the current waypoint, or the free point.
    pub target: Vec2,
    /// Final waypoint, or `None` for a point move.
    pub destination: Option<WaypointId>,
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum DriveState {
    Move(MoveState),
    PickupTote(ToteId),
    SetdownTote(WaypointId),
    RequestLetterFromStation { station: LetterStationId, tile: TileId, requested: bool },
    RequestLetterToStation { station: WordStationId, tile: TileId, word: WordId, requested: bool },
    Evade,
}

impl DriveState {
    pub fn name(&self) -> &'static str {
        match self {
            DriveState::Move(_) => "Move",
            DriveState::PickupTote(_) => "PickupTote",
            DriveState::SetdownTote(_) => "SetdownTote",
            DriveState::RequestLetterFromStation { .. } => "RequestLetterFromStation",
            DriveState::RequestLetterToStation { .. } => "RequestLetterToStation",
            DriveState::Evade => "Evade",
        }
    }
}
