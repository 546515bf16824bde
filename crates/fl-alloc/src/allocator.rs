//! Per-robot agents and the greedy selection that drives them.
//!
//! # Selection
//!
//! An idle robot's agent tries its current mode first (delivery or pickup),
//! then the other one; a success in the other mode flips the agent to it.
//! If neither yields a task the robot vacates: it stores any carried tote at
//! the closest free slot, or shuffles a little out of the way.
//!
//! Candidates are scored by optimistic straight-line travel time, with a
//! quadratic penalty for robots already heading to the same station:
//!
//! ```text
//! cost        = max(travel, station_wait)
//! travel      = distance / max_velocity
//! station_wait = ((transfer_time + 10 r) / max_velocity) · n²
//! ```
//!
//! The cheapest candidate wins; ties go to the first one found.

use fl_core::{RobotId, SimConfig, SimRng, TileId, ToteId, Vec2, WaypointId};
use fl_graph::WaypointGraph;
use fl_robot::{Destination, DriverEvent, Robot, Task};
use fl_stock::ToteStore;

use crate::pools::{DeliveryRequest, PickupRequest, ResourcePools};

/// Edge margin for vacate moves, in robot radii.
const VACATE_EDGE_RADII: f32 = 8.0;

/// Constants the scoring needs, copied out of the run configuration.
#[derive(Clone, Debug, PartialEq)]
pub struct AllocParams {
    pub width: f32,
    pub height: f32,
    pub radius: f32,
    pub max_velocity: f32,
    pub bundle_size: usize,
    pub letter_transfer_time: f32,
    pub word_transfer_time: f32,
    pub pickup_setdown_time: f32,
}

impl AllocParams {
    pub fn from_config(cfg: &SimConfig) -> Self {
        Self {
            width: cfg.arena.width,
            height: cfg.arena.height,
            radius: cfg.fleet.radius,
            max_velocity: cfg.fleet.max_velocity,
            bundle_size: cfg.stations.bundle_size,
            letter_transfer_time: cfg.stations.letter_to_tote_time as f32,
            word_transfer_time: cfg.stations.tote_to_letter_time as f32,
            pickup_setdown_time: cfg.timing.tote_pickup_setdown_time as f32,
        }
    }
}

/// What the allocator reads (and the RNG it draws from) while choosing.
pub struct AllocCtx<'a> {
    pub graph: &'a WaypointGraph,
    pub totes: &'a ToteStore,
    pub rng: &'a mut SimRng,
}

/// Allocation state held on behalf of one robot.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Agent {
    /// `true` → try deliveries first.
    pub deliver_mode: bool,
    pub reserved_tote: Option<ToteId>,
    pub reserved_slot: Option<WaypointId>,
    pub pickup: Option<PickupRequest>,
    pub delivery: Option<DeliveryRequest>,
    /// The tile in the tote that will satisfy `delivery`.
    pub drop_tile: Option<TileId>,
}

impl Agent {
    fn new() -> Self {
        Self { deliver_mode: true, ..Self::default() }
    }
}

/// Outcome of scoring deliveries.
struct DeliveryChoice {
    request: DeliveryRequest,
    tote: Option<ToteId>,
    tile: Option<TileId>,
    /// Where to park the carried tote before fetching `tote`.
    store_at: Option<WaypointId>,
}

pub struct Allocator {
    pub pools: ResourcePools,
    agents: Vec<Agent>,
    params: AllocParams,
}

impl Allocator {
    pub fn new(params: AllocParams, pools: ResourcePools, num_robots: usize) -> Self {
        Self { pools, agents: vec![Agent::new(); num_robots], params }
    }

    pub fn agent(&self, robot: RobotId) -> Option<&Agent> {
        self.agents.get(robot.index())
    }

    pub fn agents(&self) -> &[Agent] {
        &self.agents
    }

    pub fn params(&self) -> &AllocParams {
        &self.params
    }

    // ── Entry points ──────────────────────────────────────────────────────

    /// Choose the next task for an idle robot.  Always yields a task: when
    /// no work scores the robot vacates.
    pub fn request_new_task(&mut self, robot: &Robot, ctx: &mut AllocCtx<'_>) -> Task {
        let deliver_first = self.agents.get(robot.id.index()).is_some_and(|a| a.deliver_mode);
        let task = if deliver_first {
            self.try_deliver(robot, ctx).or_else(|| {
                let t = self.try_pickup(robot, ctx)?;
                self.set_mode(robot.id, false);
                Some(t)
            })
        } else {
            self.try_pickup(robot, ctx).or_else(|| {
                let t = self.try_deliver(robot, ctx)?;
                self.set_mode(robot.id, true);
                Some(t)
            })
        };
        let task = task.unwrap_or_else(|| self.vacate(robot, ctx));
        log::debug!("{} assigned {:?}", robot.id, task);
        task
    }

    /// The robot finished `task` normally.
    pub fn task_complete(&mut self, robot: RobotId, task: &Task) {
        let Some(agent) = self.agents.get_mut(robot.index()) else { return };
        match task {
            Task::DeliverToWordStation { .. } => {
                agent.delivery = None;
                agent.drop_tile = None;
            }
            Task::PickupAtLetterStation { .. } => agent.pickup = None,
            Task::Move(_) | Task::StoreTote { .. } => {}
        }
    }

    /// The robot gave up on `task`.  Requests are requeued only when the
    /// tote shows the work was not done.
    pub fn task_aborted(&mut self, robot: RobotId, task: &Task, carried: Option<ToteId>, totes: &ToteStore) {
        let Some(agent) = self.agents.get_mut(robot.index()) else { return };
        if let Some(held) = agent.reserved_tote {
            if carried != Some(held) {
                self.pools.release_tote(held);
            }
        }
        agent.reserved_tote = carried;
        if let Some(slot) = agent.reserved_slot.take() {
            self.pools.release_slot(slot);
        }

        match *task {
            Task::PickupAtLetterStation { tote, tile, .. } => {
                if let Some(req) = agent.pickup.take() {
                    if !totes.contains_tile(tote, tile) {
                        self.pools.requeue_pickup(req);
                    }
                }
            }
            Task::DeliverToWordStation { tote, tile, .. } => {
                agent.drop_tile = None;
                if let Some(req) = agent.delivery.take() {
                    if totes.contains_tile(tote, tile) {
                        self.pools.requeue_delivery(req);
                    }
                }
            }
            Task::Move(_) | Task::StoreTote { .. } => {}
        }
    }

    /// The slot a picked-up tote rested on becomes free.
    pub fn tote_picked_up(&mut self, _robot: RobotId, _tote: ToteId, slot: Option<WaypointId>) {
        if let Some(slot) = slot {
            self.pools.release_slot(slot);
        }
    }

    /// A set-down tote is no longer reserved.
    pub fn tote_set_down(&mut self, robot: RobotId, tote: ToteId, slot: WaypointId) {
        self.pools.mark_occupied(slot, tote);
        let Some(agent) = self.agents.get_mut(robot.index()) else { return };
        if agent.reserved_tote == Some(tote) {
            self.pools.release_tote(tote);
            agent.reserved_tote = None;
        }
        if agent.reserved_slot == Some(slot) {
            agent.reserved_slot = None;
        }
    }

    /// Route one driver event.  `carried` is the emitting robot's tote
    /// after the event.
    pub fn apply(&mut self, event: &DriverEvent, carried: Option<ToteId>, totes: &ToteStore) {
        match *event {
            DriverEvent::TotePickedUp { robot, tote, slot } => self.tote_picked_up(robot, tote, slot),
            DriverEvent::ToteSetDown { robot, tote, slot } => self.tote_set_down(robot, tote, slot),
            DriverEvent::TaskAborted { robot, task } => self.task_aborted(robot, &task, carried, totes),
        }
    }

    fn set_mode(&mut self, robot: RobotId, deliver: bool) {
        if let Some(a) = self.agents.get_mut(robot.index()) {
            a.deliver_mode = deliver;
        }
    }

    // ── Scoring helpers ───────────────────────────────────────────────────

    #[inline]
    fn travel(&self, from: Vec2, to: Vec2) -> f32 {
        from.distance(to) / self.params.max_velocity
    }

    fn station_wait(&self, graph: &WaypointGraph, station_wp: WaypointId, transfer: f32) -> f32 {
        let n = graph.en_route_count(station_wp) as f32;
        (transfer + 10.0 * self.params.radius) / self.params.max_velocity * n * n
    }

    /// Cheapest delivery that `tote`, sitting at `from`, can serve.
    fn best_delivery_for(
        &self,
        tote: ToteId,
        from: Vec2,
        ctx: &AllocCtx<'_>,
    ) -> Option<(usize, TileId, f32)> {
        let t = ctx.totes.get(tote)?;
        let mut best: Option<(usize, TileId, f32)> = None;
        for (i, req) in self.pools.delivery_requests().iter().enumerate() {
            let Some(tile) = t.find_matching(req.letter) else { continue };
            let Some(wp) = ctx.graph.word_station_waypoint(req.station) else { continue };
            let cost = self
                .travel(from, ctx.graph.position(wp))
                .max(self.station_wait(ctx.graph, wp, self.params.word_transfer_time));
            if best.is_none_or(|(_, _, c)| cost < c) {
                best = Some((i, tile, cost));
            }
        }
        best
    }

    fn choose_delivery(&mut self, robot: &Robot, ctx: &AllocCtx<'_>) -> Option<DeliveryChoice> {
        let mut best: Option<(usize, TileId, f32)> = None;
        let mut best_tote = None;
        let mut best_store = None;

        if let Some(held) = robot.carried {
            if let Some(found) = self.best_delivery_for(held, robot.pos, ctx) {
                best = Some(found);
                best_tote = Some(held);
            }
        }

        let psd = self.params.pickup_setdown_time;
        let base = if robot.carried.is_some() { 2.0 * psd } else { psd };
        for tote in self.pools.unreserved() {
            let Some(tote_wp) = ctx.graph.tote_waypoint(tote) else { continue };
            let tote_pos = ctx.graph.position(tote_wp);

            let mut fetch = base;
            let mut store_at = None;
            if robot.carried.is_some() {
                // Park the carried tote first, at the slot that makes the
                // detour cheapest.
                let mut detour = f32::INFINITY;
                for slot in self.pools.free() {
                    let p = ctx.graph.position(slot);
                    let t = 2.0 * psd + self.travel(robot.pos, p) + self.travel(p, tote_pos);
                    if t < detour {
                        detour = t;
                        store_at = Some(slot);
                    }
                }
                fetch += detour;
            } else {
                fetch += self.travel(robot.pos, tote_pos);
            }

            let Some((i, tile, cost)) = self.best_delivery_for(tote, tote_pos, ctx) else { continue };
            let total = fetch + cost;
            if best.is_none_or(|(_, _, c)| total < c) {
                best = Some((i, tile, total));
                best_tote = Some(tote);
                best_store = store_at;
            }
        }

        match best {
            Some((i, tile, _)) => {
                let request = self.pools.take_delivery(i)?;
                Some(DeliveryChoice { request, tote: best_tote, tile: Some(tile), store_at: best_store })
            }
            // Nothing scores: hold the oldest request without a tote.
            None => {
                let request = self.pools.take_delivery(0)?;
                log::debug!("{} falls back to the oldest delivery request", robot.id);
                Some(DeliveryChoice { request, tote: None, tile: None, store_at: None })
            }
        }
    }

    // ── Modes ─────────────────────────────────────────────────────────────

    fn try_deliver(&mut self, robot: &Robot, ctx: &mut AllocCtx<'_>) -> Option<Task> {
        if self.pools.delivery_requests().is_empty() {
            return None;
        }
        let choice = self.choose_delivery(robot, ctx)?;
        let idx = robot.id.index();
        let held = self.agents.get(idx)?.reserved_tote;

        let held = match held {
            Some(h) if Some(h) != choice.tote && robot.carried == Some(h) => {
                // The carried tote is not the best one: park it.
                self.pools.requeue_delivery(choice.request);
                return Some(match choice.store_at {
                    Some(slot) => self.store_at(robot, h, slot),
                    None => self.store_closest(robot, h, ctx)?,
                });
            }
            Some(h) if Some(h) != choice.tote => {
                // Reserved but never picked up: just hand it back.
                self.pools.release_tote(h);
                None
            }
            other => other,
        };

        let tote = match held {
            Some(h) => h,
            None => {
                let Some(t) = choice.tote else {
                    self.pools.requeue_delivery(choice.request);
                    self.agents[idx].reserved_tote = None;
                    return None;
                };
                self.pools.reserve_tote(t);
                t
            }
        };
        let Some(tile) = choice.tile else {
            self.pools.requeue_delivery(choice.request);
            return None;
        };
        let agent = &mut self.agents[idx];
        agent.reserved_tote = Some(tote);
        agent.delivery = Some(choice.request);
        agent.drop_tile = Some(tile);
        Some(Task::DeliverToWordStation {
            tote,
            tile,
            letter: choice.request.letter,
            station: choice.request.station,
            word: choice.request.word,
        })
    }

    fn try_pickup(&mut self, robot: &Robot, ctx: &mut AllocCtx<'_>) -> Option<Task> {
        if self.pools.pickup_requests().is_empty() {
            return None;
        }
        let idx = robot.id.index();
        let held = robot.carried.or(self.agents.get(idx)?.reserved_tote);

        let (req_index, tote) = match held {
            Some(h) => {
                let room = ctx.totes.get(h).is_some_and(|t| t.has_room_for(self.params.bundle_size));
                if !room {
                    // Too full for another bundle: get rid of it.
                    if robot.carried == Some(h) {
                        return self.store_closest(robot, h, ctx);
                    }
                    self.pools.release_tote(h);
                    self.agents[idx].reserved_tote = None;
                    return self.try_pickup(robot, ctx);
                }
                let from = match robot.carried {
                    Some(_) => robot.pos,
                    None => ctx.graph.tote_waypoint(h).map_or(robot.pos, |w| ctx.graph.position(w)),
                };
                (self.best_pickup_from(from, ctx)?.0, h)
            }
            None => {
                let mut best: Option<(usize, ToteId, f32)> = None;
                for tote in self.pools.unreserved() {
                    let Some(t) = ctx.totes.get(tote) else { continue };
                    if !t.has_room_for(self.params.bundle_size) {
                        continue;
                    }
                    let Some(wp) = ctx.graph.tote_waypoint(tote) else { continue };
                    let tote_pos = ctx.graph.position(wp);
                    let fetch = self.travel(robot.pos, tote_pos);
                    let Some((i, cost)) = self.best_pickup_from(tote_pos, ctx) else { continue };
                    if best.is_none_or(|(_, _, c)| fetch + cost < c) {
                        best = Some((i, tote, fetch + cost));
                    }
                }
                let (i, tote, _) = best?;
                self.pools.reserve_tote(tote);
                (i, tote)
            }
        };

        let req = self.pools.take_pickup(req_index)?;
        let agent = &mut self.agents[idx];
        agent.reserved_tote = Some(tote);
        agent.pickup = Some(req);
        Some(Task::PickupAtLetterStation { tote, tile: req.tile, letter: req.letter, station: req.station })
    }

    /// Cheapest queued pickup for a tote at `from`.
    fn best_pickup_from(&self, from: Vec2, ctx: &AllocCtx<'_>) -> Option<(usize, f32)> {
        let mut best: Option<(usize, f32)> = None;
        for (i, req) in self.pools.pickup_requests().iter().enumerate() {
            let Some(wp) = ctx.graph.letter_station_waypoint(req.station) else { continue };
            let cost = self
                .travel(from, ctx.graph.position(wp))
                .max(self.station_wait(ctx.graph, wp, self.params.letter_transfer_time));
            if best.is_none_or(|(_, c)| cost < c) {
                best = Some((i, cost));
            }
        }
        best
    }

    // ── Storing & vacating ────────────────────────────────────────────────

    /// Cancel held requests, then park the carried tote or step aside.
    fn vacate(&mut self, robot: &Robot, ctx: &mut AllocCtx<'_>) -> Task {
        self.cancel_requests(robot.id);
        if let Some(tote) = robot.carried {
            if let Some(task) = self.store_closest(robot, tote, ctx) {
                return task;
            }
        }
        let r = self.params.radius;
        let margin = VACATE_EDGE_RADII * r;
        let x = (robot.pos.x + ctx.rng.gen_range(-r..r)).max(margin).min(self.params.width - margin);
        let y = (robot.pos.y + ctx.rng.gen_range(-r..r)).max(margin).min(self.params.height - margin);
        Task::Move(Destination::Point(Vec2::new(x, y)))
    }

    fn cancel_requests(&mut self, robot: RobotId) {
        let Some(agent) = self.agents.get_mut(robot.index()) else { return };
        if let Some(req) = agent.delivery.take() {
            self.pools.requeue_delivery(req);
        }
        if let Some(req) = agent.pickup.take() {
            self.pools.requeue_pickup(req);
        }
        agent.drop_tile = None;
    }

    fn store_closest(&mut self, robot: &Robot, tote: ToteId, ctx: &AllocCtx<'_>) -> Option<Task> {
        let slot = match self.agents.get(robot.id.index())?.reserved_slot {
            Some(slot) => slot,
            None => self
                .pools
                .free()
                .map(|s| (s, robot.pos.distance_sq(ctx.graph.position(s))))
                .min_by(|a, b| a.1.total_cmp(&b.1))
                .map(|(s, _)| s)?,
        };
        Some(self.store_at(robot, tote, slot))
    }

    fn store_at(&mut self, robot: &Robot, tote: ToteId, slot: WaypointId) -> Task {
        let idx = robot.id.index();
        if let Some(old) = self.agents[idx].reserved_slot {
            if old != slot {
                self.pools.release_slot(old);
                self.agents[idx].reserved_slot = None;
            }
        }
        if self.agents[idx].reserved_slot.is_none() {
            self.pools.reserve_slot(slot, tote);
            self.agents[idx].reserved_slot = Some(slot);
        }
        log::debug!("{} storing {} at {}", robot.id, tote, slot);
        Task::StoreTote { tote, slot }
    }
}
