//! Tasks issued to robots by the allocator.

use fl_core::{LetterStationId, TileId, ToteId, Vec2, WaypointId, WordId, WordStationId};
use fl_stock::Letter;

/// Where a move ends.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Destination {
    /// A free point on the floor; the robot leaves the graph to reach it.
    Point(Vec2),
    Waypoint(WaypointId),
}

/// One unit of work.  Immutable once issued.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Task {
    Move(Destination),
    /// Carry `tote` to the storage slot `slot` and set it down.
    StoreTote { tote: ToteId, slot: WaypointId },
    /// Bring `tote` to a letter station and receive the bundle headed by
    /// `tile`.
    PickupAtLetterStation { tote: ToteId, tile: TileId, letter: Letter, station: LetterStationId },
    /// Bring `tote` to a word station and hand over `tile` for `word`.
    DeliverToWordStation {
        tote: ToteId,
        tile: TileId,
        letter: Letter,
        station: WordStationId,
        word: WordId,
    },
}

impl Task {
    /// Stable label used for per-task time accounting.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Task::Move(_) => "Move",
            Task::StoreTote { .. } => "StoreTote",
            Task::PickupAtLetterStation { .. } => "PickupAtLetterStation",
            Task::DeliverToWordStation { .. } => "DeliverToWordStation",
        }
    }

    /// The tote this task is about, if any.
    pub fn tote(&self) -> Option<ToteId> {
        match *self {
            Task::Move(_) => None,
            Task::StoreTote { tote, .. }
            | Task::PickupAtLetterStation { tote, .. }
            | Task::DeliverToWordStation { tote, .. } => Some(tote),
        }
    }
}
