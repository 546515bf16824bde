//! Plain data rows written by every backend.

/// Sentinel for "no tote" in [`RobotSnapshotRow::carried_tote`].
pub const NO_TOTE: u32 = u32::MAX;

/// One robot's kinematic and task state at a snapshot instant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RobotSnapshotRow {
    pub robot_id:     u32,
    pub time:         f64,
    pub x:            f32,
    pub y:            f32,
    /// Radians in `[0, 2π)`.
    pub heading:      f32,
    pub speed:        f32,
    /// Front of the sub-state queue, or `"Idle"`.
    pub state:        &'static str,
    /// Current task kind, or `"Idle"`.
    pub task:         &'static str,
    pub carried_tote: u32,
}

/// Fleet-level counters at the end of one macro-step.
///
/// Counters are cumulative since the last statistics reset.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepSummaryRow {
    pub time:              f64,
    pub step_secs:         f64,
    pub moving_robots:     u32,
    pub pickups:           u64,
    pub setdowns:          u64,
    pub collisions:        u64,
    pub words_completed:   u64,
    pub pickup_requests:   u32,
    pub delivery_requests: u32,
}
