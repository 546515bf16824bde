//! The robot driver: kinematics plus the sub-state machine.
//!
//! # Per-step flow
//!
//! [`advance`] is called once per macro-step for every robot, in id order:
//!
//! 1. A blocked robot does nothing.
//! 2. A pending tote handoff (pickup/setdown) is finalised.
//! 3. Velocity is moved toward the target velocity under the acceleration
//!    and speed limits, and the resulting move is validated against the
//!    floor.  A rejected move is a collision: the robot stops and is blocked
//!    for the collision penalty.
//! 4. The front sub-state acts.  An empty queue means the robot is idle and
//!    the caller should ask the allocator for work (see [`Step::Idle`]).
//!
//! # State queue
//!
//! The front state is popped, acted on, and reports a [`Flow`] telling the
//! driver whether to put it back, interrupt it with a new front state, move
//! on to the next state, or abort the whole task.
//!
//! Everything the driver changes outside the robot (tote pickups and
//! setdowns, aborted tasks) is reported through [`DriverEvent`]s so the
//! allocator can reconcile its pools in the same step.

use std::f32::consts::{FRAC_PI_2, FRAC_PI_4, PI, TAU};

use fl_core::{
    Circle, DriverTuning, LetterStationId, RobotId, SimRng, SimTime, TileId, TimingConfig, ToteId, Vec2,
    WaypointId, WordId, WordStationId, angle_difference, normalize_angle,
};
use fl_graph::{HopPlanner, HopQuery, WaypointGraph};
use fl_spatial::Floor;
use fl_stock::{LetterStation, ToteOwner, ToteStore, WordStation};

use crate::robot::{Handoff, Robot};
use crate::state::{DriveState, MoveState};
use crate::task::{Destination, Task};

/// Look-ahead interval used when the robot has no pending timer.
const MIN_LOOKAHEAD_SECS: f64 = 0.05;

/// Half-width of the cone, around the heading, in which nearby bodies
/// trigger an evasion.
const EVADE_CONE: f32 = FRAC_PI_4 + 0.5;

// ── Context & events ──────────────────────────────────────────────────────────

/// Something the allocator must hear about.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum DriverEvent {
    /// `slot` is the storage slot the tote rested on, if it was on one.
    TotePickedUp { robot: RobotId, tote: ToteId, slot: Option<WaypointId> },
    ToteSetDown { robot: RobotId, tote: ToteId, slot: WaypointId },
    TaskAborted { robot: RobotId, task: Task },
}

/// The parts of the world a robot touches while acting.
pub struct DriveCtx<'a> {
    pub now: SimTime,
    pub floor: &'a mut Floor,
    pub graph: &'a mut WaypointGraph,
    pub planner: &'a dyn HopPlanner,
    pub totes: &'a mut ToteStore,
    pub letter_stations: &'a mut [LetterStation],
    pub word_stations: &'a mut [WordStation],
    pub rng: &'a mut SimRng,
    pub tuning: &'a DriverTuning,
    pub timing: &'a TimingConfig,
    pub events: &'a mut Vec<DriverEvent>,
}

/// Outcome of one [`advance`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Step {
    Blocked,
    Collided,
    Acted,
    /// The state queue is empty; the robot wants a task.
    Idle,
}

enum Flow {
    /// Put the state back at the front and stop.
    Stay(DriveState),
    /// Put the state back, then push `front` ahead of it, and stop.
    Interrupt(DriveState, DriveState),
    /// The state is done; stop for this step.
    Pop,
    /// The state is done; act on the next one now.
    Next,
    /// Drop the task and every remaining state.
    Abort,
}

// ── Step entry points ─────────────────────────────────────────────────────────

/// Advance `robot` over the window `(last, ctx.now]`.
pub fn advance(robot: &mut Robot, last: SimTime, ctx: &mut DriveCtx<'_>) -> Step {
    let now = ctx.now;
    if robot.is_blocked(now) {
        return Step::Blocked;
    }
    finish_handoff(robot, ctx.totes);

    let dt = now - last;
    if dt > 0.0 && !integrate(robot, dt, ctx) {
        return Step::Collided;
    }
    robot.account_time(now);

    if robot.is_idle() {
        return Step::Idle;
    }
    act(robot, ctx);
    Step::Acted
}

/// Run the state queue until a state stays put, pauses, or aborts.
pub fn act(robot: &mut Robot, ctx: &mut DriveCtx<'_>) {
    while let Some(state) = robot.states.pop_front() {
        match act_state(robot, state, ctx) {
            Flow::Stay(state) => {
                robot.states.push_front(state);
                return;
            }
            Flow::Interrupt(state, front) => {
                robot.states.push_front(state);
                robot.states.push_front(front);
                return;
            }
            Flow::Pop => return,
            Flow::Next => continue,
            Flow::Abort => {
                abort(robot, ctx);
                return;
            }
        }
    }
}

/// Replace the robot's task and state queue.  `None` leaves it idle.
pub fn assign_task(robot: &mut Robot, task: Option<Task>, ctx: &mut DriveCtx<'_>) {
    robot.states.clear();
    robot.task = task;
    let Some(task) = task else { return };

    match plan(robot, task, ctx) {
        Some(states) => robot.states.extend(states),
        None => abort(robot, ctx),
    }
}

/// Keep the graph's en-route sets in step with the robot's waypoint.
pub fn set_current_waypoint(robot: &mut Robot, waypoint: Option<WaypointId>, graph: &mut WaypointGraph) {
    if let Some(old) = robot.current_waypoint {
        graph.leave(old, robot.id);
    }
    if let Some(new) = waypoint {
        graph.enter(new, robot.id);
    }
    robot.current_waypoint = waypoint;
}

fn abort(robot: &mut Robot, ctx: &mut DriveCtx<'_>) {
    robot.states.clear();
    if let Some(task) = robot.task.take() {
        log::debug!("{} aborted {} at {}", robot.id, task.kind_name(), ctx.now);
        ctx.events.push(DriverEvent::TaskAborted { robot: robot.id, task });
    }
}

fn finish_handoff(robot: &mut Robot, totes: &mut ToteStore) {
    let Some(handoff) = robot.handoff.take() else { return };
    match handoff {
        Handoff::Carry(tote) => {
            if let Some(t) = totes.get_mut(tote) {
                t.owner = ToteOwner::Robot(robot.id);
            }
        }
        Handoff::Rest(tote, slot) => {
            if let Some(t) = totes.get_mut(tote) {
                t.owner = ToteOwner::Slot(slot);
            }
        }
    }
}

// ── Task planning ─────────────────────────────────────────────────────────────

fn plan(robot: &mut Robot, task: Task, ctx: &mut DriveCtx<'_>) -> Option<Vec<DriveState>> {
    let mut states = Vec::with_capacity(4);
    match task {
        Task::Move(Destination::Point(p)) => states.push(point_move(robot, p, ctx.graph)),
        Task::Move(Destination::Waypoint(w)) => states.push(waypoint_move(ctx.graph, w)?),
        Task::StoreTote { tote, slot } => {
            match robot.carried {
                Some(held) if held != tote => return None,
                Some(_) => {}
                None => fetch(&mut states, tote, ctx.graph)?,
            }
            states.push(waypoint_move(ctx.graph, slot)?);
            states.push(DriveState::SetdownTote(slot));
        }
        Task::PickupAtLetterStation { tote, tile, station, .. } => {
            fetch_unless_carried(robot, &mut states, tote, ctx.graph)?;
            let wp = ctx.graph.letter_station_waypoint(station)?;
            states.push(waypoint_move(ctx.graph, wp)?);
            states.push(DriveState::RequestLetterFromStation { station, tile, requested: false });
        }
        Task::DeliverToWordStation { tote, tile, station, word, .. } => {
            fetch_unless_carried(robot, &mut states, tote, ctx.graph)?;
            let wp = ctx.graph.word_station_waypoint(station)?;
            states.push(waypoint_move(ctx.graph, wp)?);
            states.push(DriveState::RequestLetterToStation { station, tile, word, requested: false });
        }
    }
    Some(states)
}

fn fetch_unless_carried(
    robot: &Robot,
    states: &mut Vec<DriveState>,
    tote: ToteId,
    graph: &WaypointGraph,
) -> Option<()> {
    match robot.carried {
        Some(held) if held == tote => Some(()),
        Some(_) => None,
        None => fetch(states, tote, graph),
    }
}

fn fetch(states: &mut Vec<DriveState>, tote: ToteId, graph: &WaypointGraph) -> Option<()> {
    let wp = graph.tote_waypoint(tote)?;
    states.push(waypoint_move(graph, wp)?);
    states.push(DriveState::PickupTote(tote));
    Some(())
}

fn waypoint_move(graph: &WaypointGraph, w: WaypointId) -> Option<DriveState> {
    graph
        .contains(w)
        .then(|| DriveState::Move(MoveState { target: graph.position(w), destination: Some(w) }))
}

/// A move to a free point takes the robot off the graph.
fn point_move(robot: &mut Robot, target: Vec2, graph: &mut WaypointGraph) -> DriveState {
    set_current_waypoint(robot, None, graph);
    DriveState::Move(MoveState { target, destination: None })
}

// ── Kinematics ────────────────────────────────────────────────────────────────

/// Integrate one window.  `false` if the move was rejected.
fn integrate(robot: &mut Robot, dt: f64, ctx: &mut DriveCtx<'_>) -> bool {
    let dt = dt as f32;
    let old = robot.velocity;

    let mut v = robot.target_velocity;
    let speed = v.length();
    if speed > robot.max_velocity {
        v = v * (robot.max_velocity / speed);
    }
    let dv = v - old;
    let max_dv = robot.max_acceleration * dt;
    let dv_len = dv.length();
    if dv_len > max_dv {
        v = old + dv * (max_dv / dv_len);
    }
    robot.velocity = v;

    if v == Vec2::ZERO {
        ctx.floor.set_moving(robot.id, robot.carried, false);
        return true;
    }

    let next = robot.pos + v * dt;
    if !ctx.floor.move_robot(robot.id, robot.carried, next.x, next.y) {
        robot.velocity = Vec2::ZERO;
        robot.target_velocity = Vec2::ZERO;
        robot.wait_until(ctx.now + ctx.timing.collision_penalty_time);
        robot.stats.collisions += 1;
        ctx.floor.set_moving(robot.id, robot.carried, false);
        log::trace!("{} collided at ({:.2}, {:.2}) {}", robot.id, robot.pos.x, robot.pos.y, ctx.now);
        return false;
    }
    robot.stats.distance += robot.pos.distance(next) as f64;
    robot.pos = next;
    ctx.floor.set_moving(robot.id, robot.carried, true);
    true
}

// ── States ────────────────────────────────────────────────────────────────────

fn act_state(robot: &mut Robot, state: DriveState, ctx: &mut DriveCtx<'_>) -> Flow {
    match state {
        DriveState::Move(mv) => act_move(robot, mv, ctx),
        DriveState::PickupTote(tote) => {
            if pickup(robot, tote, ctx) { Flow::Pop } else { Flow::Abort }
        }
        DriveState::SetdownTote(slot) => {
            if setdown(robot, slot, ctx) { Flow::Pop } else { Flow::Abort }
        }
        DriveState::RequestLetterFromStation { station, tile, requested } => {
            act_letter_from_station(robot, station, tile, requested, ctx)
        }
        DriveState::RequestLetterToStation { station, tile, word, requested } => {
            act_letter_to_station(robot, station, tile, word, requested, ctx)
        }
        DriveState::Evade => act_evade(robot, ctx),
    }
}

fn act_move(robot: &mut Robot, mut mv: MoveState, ctx: &mut DriveCtx<'_>) -> Flow {
    let now = ctx.now;

    if now < robot.cruise_until {
        return if check_evade(robot, ctx) {
            Flow::Interrupt(DriveState::Move(mv), DriveState::Evade)
        } else {
            Flow::Stay(DriveState::Move(mv))
        };
    }

    match mv.destination {
        Some(_) => {
            if robot.current_waypoint.is_none() {
                let closest = ctx.graph.closest_waypoint(robot.pos);
                set_current_waypoint(robot, closest, ctx.graph);
            }
            if let Some(w) = robot.current_waypoint {
                mv.target = ctx.graph.position(w);
            }
        }
        None => {
            if robot.current_waypoint.is_some() {
                set_current_waypoint(robot, None, ctx.graph);
            }
        }
    }

    let tol = ctx.floor.tolerance() / 3.0;
    let goal = robot.pos.distance(mv.target);
    let speed = robot.speed();

    // Arrived at the current target.
    if goal <= tol && speed == 0.0 {
        robot.frustration = 0.0;
        if robot.current_waypoint == mv.destination {
            return Flow::Next;
        }
        let (Some(from), Some(to)) = (robot.current_waypoint, mv.destination) else {
            return Flow::Abort;
        };
        let query = HopQuery::new(robot.carried.is_some(), ctx.tuning.congestion_penalty_factor * robot.radius);
        return match ctx.planner.next_hop(ctx.graph, from, to, query) {
            Some(hop) => {
                set_current_waypoint(robot, Some(hop), ctx.graph);
                mv.target = ctx.graph.position(hop);
                Flow::Stay(DriveState::Move(mv))
            }
            None => {
                // Dropping the task hands its reservations back to the
                // allocator, which re-tasks the robot from where it stands.
                log::debug!("{} has no hop from {} to {}", robot.id, from, to);
                Flow::Abort
            }
        };
    }

    if check_evade(robot, ctx) {
        return Flow::Interrupt(DriveState::Move(mv), DriveState::Evade);
    }

    // Turn in place rather than arc when the heading misses the target or
    // runs off the floor.
    let projected = robot.pos + Vec2::from_angle(robot.heading) * goal;
    let r = robot.radius;
    if projected.distance_sq(mv.target) >= tol * tol
        || projected.x + r > ctx.floor.width()
        || projected.x - r < 0.0
        || projected.y + r > ctx.floor.height()
        || projected.y - r < 0.0
    {
        robot.set_heading(robot.pos.angle_to(mv.target), now);
        if speed > 0.0 {
            robot.set_target_speed(0.0, now);
        }
        robot.cruise_until = robot.accelerate_until;
        return Flow::Stay(DriveState::Move(mv));
    }

    let accel = robot.max_acceleration;
    let stopping = speed * speed / (2.0 * accel);
    if speed > 0.0 && stopping > goal {
        robot.set_target_speed(0.0, now);
        robot.cruise_until = robot.accelerate_until;
        robot.frustration = (robot.frustration + 1.0) / 2.0;
        return Flow::Stay(DriveState::Move(mv));
    }

    let scale = (1.0 - robot.frustration).max(ctx.tuning.frustration_floor);
    let cruise_speed = robot.max_velocity * scale;
    robot.set_target_speed(cruise_speed, now);
    let scaled_accel = accel * scale;

    let accel_time = robot.target_speed_difference() / scaled_accel;
    let accel_dist = speed * accel_time + scaled_accel / 2.0 * accel_time * accel_time;
    let decel_dist = cruise_speed * cruise_speed / (2.0 * accel);
    robot.cruise_until = if accel_dist + decel_dist <= goal {
        robot.accelerate_until
    } else {
        // Accelerate across half the remaining distance, then re-plan.
        let half = (goal - tol).max(0.0) / 2.0;
        let t = ((speed * speed + 2.0 * scaled_accel * half).sqrt() - speed) / scaled_accel;
        now + t as f64
    };
    Flow::Stay(DriveState::Move(mv))
}

fn pickup(robot: &mut Robot, tote: ToteId, ctx: &mut DriveCtx<'_>) -> bool {
    if robot.carried.is_some() || robot.speed() > 0.0 {
        return false;
    }
    let resting = ctx.totes.get(tote).is_some_and(|t| matches!(t.owner, ToteOwner::Slot(_)));
    let Some(body) = ctx.floor.tote(tote).copied() else { return false };
    let tol = ctx.floor.tolerance();
    if !resting || robot.pos.distance_sq(body.center) > tol * tol {
        return false;
    }
    if !ctx.floor.move_robot(robot.id, None, body.x(), body.y()) {
        return false;
    }
    robot.pos = body.center;
    robot.carried = Some(tote);
    robot.handoff = Some(Handoff::Carry(tote));
    robot.wait_until(ctx.now + ctx.timing.tote_pickup_setdown_time);
    robot.stats.pickups += 1;
    if let Some(t) = ctx.totes.get_mut(tote) {
        t.owner = ToteOwner::Transit(robot.id);
    }
    let slot = ctx.graph.tote_picked_up(tote);
    ctx.events.push(DriverEvent::TotePickedUp { robot: robot.id, tote, slot });
    true
}

fn setdown(robot: &mut Robot, slot: WaypointId, ctx: &mut DriveCtx<'_>) -> bool {
    let Some(tote) = robot.carried else { return false };
    if robot.speed() > 0.0 || !ctx.graph.is_storage_slot(slot) {
        return false;
    }
    if ctx.graph.resident_tote(slot).is_some_and(|t| t != tote) {
        return false;
    }
    let target = ctx.graph.position(slot);
    let tol = ctx.floor.tolerance();
    if robot.pos.distance_sq(target) > tol * tol
        || !ctx.floor.is_valid_storage_location(tote, target.x, target.y)
        || !ctx.floor.move_robot(robot.id, Some(tote), target.x, target.y)
    {
        return false;
    }
    if ctx.graph.tote_set_down(tote, slot).is_err() {
        return false;
    }
    robot.pos = target;
    robot.carried = None;
    robot.handoff = Some(Handoff::Rest(tote, slot));
    robot.wait_until(ctx.now + ctx.timing.tote_pickup_setdown_time);
    robot.stats.setdowns += 1;
    if let Some(t) = ctx.totes.get_mut(tote) {
        t.owner = ToteOwner::Transit(robot.id);
    }
    ctx.floor.set_moving(robot.id, None, false);
    ctx.events.push(DriverEvent::ToteSetDown { robot: robot.id, tote, slot });
    true
}

fn act_letter_from_station(
    robot: &mut Robot,
    station: LetterStationId,
    tile: TileId,
    requested: bool,
    ctx: &mut DriveCtx<'_>,
) -> Flow {
    let Some(st) = ctx.letter_stations.get_mut(station.index()) else { return Flow::Abort };
    let center = st.body.center;
    let this = |requested| DriveState::RequestLetterFromStation { station, tile, requested };
    if robot.pos.distance(center) > ctx.floor.tolerance() {
        let mv = point_move(robot, center, ctx.graph);
        return Flow::Interrupt(this(requested), mv);
    }
    let Some(tote) = robot.carried else { return Flow::Abort };
    if !requested {
        st.request(robot.id, tile, robot.carried);
    }
    if ctx.totes.contains_tile(tote, tile) {
        return Flow::Next;
    }
    if !st.is_pending(robot.id, tile) {
        return Flow::Abort;
    }
    Flow::Stay(this(true))
}

fn act_letter_to_station(
    robot: &mut Robot,
    station: WordStationId,
    tile: TileId,
    word: WordId,
    requested: bool,
    ctx: &mut DriveCtx<'_>,
) -> Flow {
    let Some(st) = ctx.word_stations.get_mut(station.index()) else { return Flow::Abort };
    let center = st.body.center;
    let this = |requested| DriveState::RequestLetterToStation { station, tile, word, requested };
    if robot.pos.distance(center) > ctx.floor.tolerance() {
        let mv = point_move(robot, center, ctx.graph);
        return Flow::Interrupt(this(requested), mv);
    }
    let Some(tote) = robot.carried else { return Flow::Abort };
    if !requested {
        st.request(robot.id, tile, Some(word), robot.carried);
    }
    if !ctx.totes.contains_tile(tote, tile) {
        return Flow::Next;
    }
    if !st.is_pending(robot.id, tile) {
        return Flow::Abort;
    }
    Flow::Stay(this(true))
}

fn act_evade(robot: &mut Robot, ctx: &mut DriveCtx<'_>) -> Flow {
    let now = ctx.now;
    if now < robot.cruise_until {
        return Flow::Stay(DriveState::Evade);
    }

    // Blocked only by the spot we want next: usually just wait.
    if let Some(DriveState::Move(next)) = robot.states.front() {
        let target = next.target;
        if !ctx.floor.is_valid_robot_move(robot.id, robot.carried, target.x, target.y)
            && ctx.rng.gen_bool(ctx.tuning.evade_wait_probability)
        {
            return Flow::Stay(DriveState::Evade);
        }
    }

    robot.set_target_speed(robot.max_velocity, now);
    robot.cruise_until = now + robot.evade_cruise_time();
    let heading = best_evade_heading(robot, evade_distance(robot, ctx.tuning), ctx.floor);
    robot.set_heading(heading, now);

    if ctx.rng.gen_bool(ctx.tuning.evade_exit_probability) {
        let closest = ctx.graph.closest_waypoint(robot.pos);
        set_current_waypoint(robot, closest, ctx.graph);
        return Flow::Next;
    }
    Flow::Stay(DriveState::Evade)
}

// ── Evasion ───────────────────────────────────────────────────────────────────

#[inline]
fn evade_distance(robot: &Robot, tuning: &DriverTuning) -> f32 {
    tuning.evade_distance_factor * robot.radius
}

/// Bodies near the robot, excluding itself and its own tote.  Other totes
/// only matter while carrying.
fn visible(robot: &Robot, distance: f32, floor: &Floor) -> Vec<Circle> {
    let mut out: Vec<Circle> = floor
        .robots_within(robot.pos, distance)
        .into_iter()
        .filter(|id| *id != robot.id)
        .filter_map(|id| floor.robot(id).copied())
        .collect();
    if let Some(own) = robot.carried {
        out.extend(
            floor
                .totes_within(robot.pos, distance)
                .into_iter()
                .filter(|id| *id != own)
                .filter_map(|id| floor.tote(id).copied()),
        );
    }
    out
}

/// Decide whether to evade; on `true` the caller pushes [`DriveState::Evade`].
fn check_evade(robot: &mut Robot, ctx: &mut DriveCtx<'_>) -> bool {
    let now = ctx.now;
    let speed = robot.speed();
    let evade = evade_distance(robot, ctx.tuning);

    let pending = robot.next_event_time(now);
    let interval = if pending.is_never() { MIN_LOOKAHEAD_SECS } else { (pending - now).max(MIN_LOOKAHEAD_SECS) };
    let reach = speed.max(robot.target_speed()) as f64 * interval;
    let look = (reach as f32 + 2.0 * robot.radius).max(evade);

    let others = visible(robot, look, ctx.floor);
    if others.is_empty() {
        return false;
    }

    let nearest_ahead = others
        .iter()
        .filter(|c| angle_difference(robot.pos.angle_to(c.center), robot.heading).abs() <= EVADE_CONE)
        .map(|c| robot.pos.distance_sq(c.center))
        .fold(f32::INFINITY, f32::min);

    if nearest_ahead < evade * evade {
        let heading = best_evade_heading(robot, evade, ctx.floor);
        robot.set_heading(heading, now);
        robot.set_target_speed(robot.max_velocity, now);
        robot.cruise_until = now + robot.evade_cruise_time();
        robot.frustration = 0.0;
        robot.stats.evasions += 1;
        log::trace!("{} evading toward {:.2} rad {}", robot.id, robot.heading, now);
        return true;
    }

    if speed > 0.0 {
        robot.stuck_count = 0;
    } else {
        robot.stuck_count += 1;
        if robot.stuck_count > ctx.tuning.stuck_limit {
            robot.frustration = 0.0;
            robot.stats.evasions += 1;
            return true;
        }
    }
    false
}

#[derive(Copy, Clone)]
struct Obstacle {
    size: f32,
    distance: f32,
    direction: f32,
}

/// Heading through the least crowded angular gap around the robot.
///
/// Bodies and the floor edges within `visible_distance` become angular
/// obstacles.  A gap's weight is the mean obstacle size over the product of
/// mean distance and angular width; the bisector of the lightest gap wins.
pub fn best_evade_heading(robot: &Robot, visible_distance: f32, floor: &Floor) -> f32 {
    let pos = robot.pos;
    let mut obstacles: Vec<Obstacle> = visible(robot, visible_distance, floor)
        .into_iter()
        .map(|c| Obstacle {
            size: 2.0 * c.radius,
            distance: pos.distance(c.center),
            direction: normalize_angle(pos.angle_to(c.center)),
        })
        .collect();

    let vd = visible_distance;
    let wall = |d: f32, direction: f32| Obstacle {
        size: 2.0 * (vd * vd - d * d).max(0.0).sqrt(),
        distance: d,
        direction,
    };
    let (w, h) = (floor.width(), floor.height());
    if pos.x < vd {
        obstacles.push(wall(pos.x, PI));
    }
    if w - pos.x < vd {
        obstacles.push(wall(w - pos.x, 0.0));
    }
    if pos.y < vd {
        obstacles.push(wall(pos.y, 3.0 * FRAC_PI_2));
    }
    if h - pos.y < vd {
        obstacles.push(wall(h - pos.y, FRAC_PI_2));
    }

    if obstacles.is_empty() {
        return robot.heading;
    }
    obstacles.sort_by(|a, b| a.direction.total_cmp(&b.direction));
    let first = obstacles[0];
    obstacles.push(Obstacle { direction: first.direction + TAU, ..first });

    let mut best_weight = f32::INFINITY;
    let mut best_heading = robot.heading;
    for (i, pair) in obstacles.windows(2).enumerate() {
        let (a, b) = (pair[0], pair[1]);
        let gap = b.direction - a.direction;
        let weight = ((a.size + b.size) / 2.0) / (((a.distance + b.distance) / 2.0) * gap);
        if i == 0 || weight < best_weight {
            best_weight = weight;
            best_heading = (a.direction + b.direction) / 2.0;
        }
    }
    normalize_angle(best_heading)
}
