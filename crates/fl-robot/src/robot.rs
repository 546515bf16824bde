//! Per-robot state: kinematics, the state queue, and statistics.

use std::collections::{BTreeMap, VecDeque};

use fl_core::{FleetConfig, RobotId, SimTime, ToteId, Vec2, WaypointId, normalize_angle};

use crate::state::DriveState;
use crate::task::Task;

/// Cumulative counters, cleared by `reset_statistics` at the end of warm-up.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RobotStats {
    pub pickups: u64,
    pub setdowns: u64,
    pub collisions: u64,
    pub evasions: u64,
    pub distance: f64,
    /// Seconds spent per task kind.
    pub task_time: BTreeMap<&'static str, f64>,
    /// Seconds spent per sub-state.
    pub state_time: BTreeMap<&'static str, f64>,
}

/// A tote handoff that completes once the pickup/setdown block ends.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Handoff {
    Carry(ToteId),
    Rest(ToteId, WaypointId),
}

#[derive(Clone, Debug)]
pub struct Robot {
    pub id: RobotId,
    pub radius: f32,
    pub max_acceleration: f32,
    pub max_velocity: f32,

    /// Mirrors the robot's body in the floor's robot index.
    pub pos: Vec2,
    pub velocity: Vec2,
    pub target_velocity: Vec2,
    /// Radians in `[0, 2π)`.
    pub heading: f32,

    pub carried: Option<ToteId>,
    pub handoff: Option<Handoff>,
    pub states: VecDeque<DriveState>,
    pub task: Option<Task>,
    pub current_waypoint: Option<WaypointId>,

    pub blocked_until: SimTime,
    pub accelerate_until: SimTime,
    pub cruise_until: SimTime,

    /// 0 = calm, approaching 1 under sustained braking.
    pub frustration: f32,
    pub stuck_count: u32,

    pub stats: RobotStats,
    accounted_until: SimTime,
}

impl Robot {
    pub fn new(id: RobotId, pos: Vec2, cfg: &FleetConfig) -> Self {
        Self {
            id,
            radius: cfg.radius,
            max_acceleration: cfg.max_acceleration,
            max_velocity: cfg.max_velocity,
            pos,
            velocity: Vec2::ZERO,
            target_velocity: Vec2::ZERO,
            heading: 0.0,
            carried: None,
            handoff: None,
            states: VecDeque::new(),
            task: None,
            current_waypoint: None,
            blocked_until: SimTime::ZERO,
            accelerate_until: SimTime::ZERO,
            cruise_until: SimTime::ZERO,
            frustration: 0.0,
            stuck_count: 0,
            stats: RobotStats::default(),
            accounted_until: SimTime::ZERO,
        }
    }

    // ── Kinematic accessors ───────────────────────────────────────────────

    #[inline]
    pub fn speed(&self) -> f32 {
        self.velocity.length()
    }

    #[inline]
    pub fn target_speed(&self) -> f32 {
        self.target_velocity.length()
    }

    #[inline]
    pub fn target_speed_difference(&self) -> f32 {
        (self.target_velocity - self.velocity).length()
    }

    pub fn is_blocked(&self, now: SimTime) -> bool {
        now < self.blocked_until
    }

    pub fn is_idle(&self) -> bool {
        self.states.is_empty()
    }

    /// Set the speed along the current heading, clamped to `[0, max]`.
    pub fn set_target_speed(&mut self, speed: f32, now: SimTime) {
        let speed = speed.clamp(0.0, self.max_velocity);
        self.target_velocity = Vec2::from_angle(self.heading) * speed;
        self.accelerate_until = now + (self.target_speed_difference() / self.max_acceleration) as f64;
    }

    /// Turn in place; the target speed carries over to the new heading.
    pub fn set_heading(&mut self, heading: f32, now: SimTime) {
        self.heading = normalize_angle(heading);
        self.set_target_speed(self.target_speed(), now);
    }

    /// Extend the current block to at least `until`.
    pub fn wait_until(&mut self, until: SimTime) {
        self.blocked_until = self.blocked_until.max(until);
    }

    /// Earliest pending timer after `now`, or `NEVER`.
    pub fn next_event_time(&self, now: SimTime) -> SimTime {
        [self.blocked_until, self.accelerate_until, self.cruise_until]
            .into_iter()
            .filter(|t| *t > now)
            .fold(SimTime::NEVER, SimTime::min)
    }

    /// Time for an evasive dash at full speed across one radius.
    pub fn evade_cruise_time(&self) -> f64 {
        let (a, v, r) = (self.max_acceleration, self.max_velocity, self.radius);
        (((2.0 * a * r + v * v).sqrt() - v) / a / 2.0) as f64
    }

    // ── Statistics ────────────────────────────────────────────────────────

    /// Attribute the time since the last call to the current task and
    /// front sub-state.
    pub(crate) fn account_time(&mut self, now: SimTime) {
        let dt = now - self.accounted_until;
        if dt > 0.0 {
            if let Some(task) = &self.task {
                *self.stats.task_time.entry(task.kind_name()).or_insert(0.0) += dt;
            }
            if let Some(front) = self.states.front() {
                *self.stats.state_time.entry(front.name()).or_insert(0.0) += dt;
            }
        }
        self.accounted_until = now;
    }

    pub fn reset_statistics(&mut self, now: SimTime) {
        self.stats = RobotStats::default();
        self.accounted_until = now;
    }
}
