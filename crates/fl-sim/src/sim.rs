//! The `Sim` struct and its macro-step loop.

use fl_alloc::{AllocCtx, Allocator};
use fl_core::{RobotId, SimTime};
use fl_graph::HopPlanner;
use fl_robot::{DriveCtx, Robot, Step, driver};
use fl_stock::WordStationEvent;

use crate::clock::{Clock, Component};
use crate::{SimError, SimObserver, SimResult, World};

/// The main simulation runner.
///
/// `Sim<P>` owns the [`World`] and the next-hop planner and drives the
/// macro-step loop:
///
/// 1. **Size** the step from every component's next event time (see
///    [`Clock::next_step`]).
/// 2. **Advance** every component over the same `(now, next]` window, in
///    registration order: robots, floor, word orders, letter supply, word
///    stations, letter stations.
/// 3. **Reconcile** after each robot: driver events go to the allocator
///    before the next robot moves, and an idle robot gets its next task
///    within its own advance.
///
/// Create via [`SimBuilder`][crate::SimBuilder].
pub struct Sim<P: HopPlanner> {
    /// Every piece of simulation state.
    pub world: World,

    /// Next-hop engine shared by all robots.
    pub planner: P,

    /// Step bounds from the fleet kinematics.
    pub clock: Clock,

    /// Components in advance order; fixed at build time.
    pub components: Vec<Component>,
}

impl<P: HopPlanner> Sim<P> {
    // ── Public API ────────────────────────────────────────────────────────

    #[inline]
    pub fn now(&self) -> SimTime {
        self.world.now
    }

    /// Run for `duration` simulated seconds from now.
    pub fn run_for<O: SimObserver>(&mut self, duration: f64, observer: &mut O) -> SimResult<()> {
        if !(duration >= 0.0 && duration.is_finite()) {
            return Err(SimError::Config(format!("cannot run for {duration} seconds")));
        }
        self.run_until(self.world.now + duration, observer)
    }

    /// Step until the clock reaches `end` exactly.
    ///
    /// Calls observer hooks around every macro-step.  Use
    /// [`NoopObserver`][crate::NoopObserver] if you don't need callbacks.
    pub fn run_until<O: SimObserver>(&mut self, end: SimTime, observer: &mut O) -> SimResult<()> {
        if end < self.world.now || end.is_never() {
            return Err(SimError::Config(format!("cannot run from {} to {end}", self.world.now)));
        }
        while self.world.now < end {
            observer.on_step_start(self.world.now, &self.world);
            self.step(end);
            observer.on_step_end(self.world.now, &self.world);
        }
        observer.on_run_end(self.world.now, &self.world);
        Ok(())
    }

    /// Warm up for `timing.warmup_time`, reset statistics, then measure for
    /// `timing.duration`.
    pub fn run_configured<O: SimObserver>(&mut self, observer: &mut O) -> SimResult<()> {
        let (warmup, duration) = (self.world.config.timing.warmup_time, self.world.config.timing.duration);
        log::info!("warm-up: {warmup} s");
        self.run_for(warmup, observer)?;
        self.reset_statistics();
        observer.on_reset(self.world.now, &self.world);
        log::info!("measurement: {duration} s");
        self.run_for(duration, observer)
    }

    /// Clear every cumulative counter and start a new statistics window.
    pub fn reset_statistics(&mut self) {
        let now = self.world.now;
        log::info!("statistics reset at {now}");
        self.world.robots.reset_statistics(now);
        for s in &mut self.world.letter_stations {
            s.reset_statistics();
        }
        for s in &mut self.world.word_stations {
            s.reset_statistics();
        }
        self.world.orders.reset_statistics();
        self.world.supply.bundles_issued = 0;
        self.world.stats_since = now;
    }

    // ── Core step processing ──────────────────────────────────────────────

    fn step(&mut self, end: SimTime) {
        let now = self.world.now;
        let earliest = self
            .components
            .iter()
            .map(|c| c.next_event_time(&self.world, now))
            .fold(SimTime::NEVER, SimTime::min);
        let next = self.clock.next_step(now, earliest, end);

        for i in 0..self.components.len() {
            let component = self.components[i];
            self.advance(component, now, next);
        }
        self.world.now = next;
    }

    fn advance(&mut self, component: Component, last: SimTime, now: SimTime) {
        let w = &mut self.world;
        match component {
            Component::Robot(id) => self.advance_robot(id, last, now),
            Component::Floor => w.floor.rebalance(),
            Component::WordOrders => {
                w.orders.advance(
                    &mut w.word_stations,
                    &mut w.supply,
                    &mut w.allocator.pools,
                    w.content.as_mut(),
                    &mut w.rng,
                );
            }
            Component::LetterSupply => {
                w.supply.advance(&mut w.letter_stations, &mut w.mint, &mut w.allocator.pools, &mut w.rng);
            }
            Component::WordStation(id) => {
                let Some(station) = w.word_stations.get_mut(id.index()) else { return };
                match station.advance(last, now, &mut w.totes, &mut w.robots) {
                    Some(WordStationEvent::Delivered { robot, tile, word, .. }) => {
                        log::trace!("{robot} delivered {tile} into word {word} at {id}");
                        w.orders.letter_delivered();
                    }
                    Some(WordStationEvent::Completed(word)) => w.orders.word_completed(word),
                    None => {}
                }
            }
            Component::LetterStation(id) => {
                let Some(station) = w.letter_stations.get_mut(id.index()) else { return };
                if let Some(t) = station.advance(last, now, &mut w.totes, &mut w.robots) {
                    log::trace!("{id} loaded bundle {} into {} on {}", t.tile, t.tote, t.robot);
                }
            }
        }
    }

    /// Drive one robot, reconcile what it did, and re-task it if idle.
    fn advance_robot(&mut self, id: RobotId, last: SimTime, now: SimTime) {
        let (robots, allocator, mut ctx) = self.world.split(&self.planner, now);
        let Some(robot) = robots.get_mut(id) else { return };

        let step = driver::advance(robot, last, &mut ctx);
        reconcile(allocator, robot, &mut ctx);
        if step != Step::Idle {
            return;
        }

        if let Some(done) = robot.task.take() {
            allocator.task_complete(id, &done);
        }
        let task = {
            let mut alloc_ctx = AllocCtx { graph: &*ctx.graph, totes: &*ctx.totes, rng: &mut *ctx.rng };
            allocator.request_new_task(robot, &mut alloc_ctx)
        };
        driver::assign_task(robot, Some(task), &mut ctx);
        if !robot.is_idle() {
            driver::act(robot, &mut ctx);
        }
        reconcile(allocator, robot, &mut ctx);
    }
}

/// Hand every pending driver event to the allocator.
fn reconcile(allocator: &mut Allocator, robot: &Robot, ctx: &mut DriveCtx<'_>) {
    for event in ctx.events.drain(..) {
        allocator.apply(&event, robot.carried, &*ctx.totes);
    }
}
