//! `SimOutputObserver<W>` — bridges `SimObserver` to an `OutputWriter`.

use fl_core::{SimConfig, SimTime};
use fl_robot::{DriveState, Robot, Task};
use fl_sim::{SimObserver, World};

use crate::row::{NO_TOTE, RobotSnapshotRow, StepSummaryRow};
use crate::writer::OutputWriter;
use crate::{OutputError, OutputResult};

/// A [`SimObserver`] that writes a step-summary row after every macro-step
/// and a snapshot of every robot once per `output.snapshot_interval`.
///
/// Snapshots fall on the first step end at or after each multiple of the
/// interval, starting at the first step.  Writer errors are stored because
/// observer hooks cannot fail; read them back with
/// [`take_error`][Self::take_error].  Rows are flushed at the end of every
/// run; call [`finish`][Self::finish] once the last run is over.
pub struct SimOutputObserver<W: OutputWriter> {
    writer:        W,
    interval:      f64,
    next_snapshot: SimTime,
    step_start:    SimTime,
    last_error:    Option<OutputError>,
}

impl<W: OutputWriter> SimOutputObserver<W> {
    pub fn new(writer: W, config: &SimConfig) -> Self {
        Self {
            writer,
            interval:      config.output.snapshot_interval,
            next_snapshot: SimTime::ZERO,
            step_start:    SimTime::ZERO,
            last_error:    None,
        }
    }

    /// The first write error since the last call, if any.
    pub fn take_error(&mut self) -> Option<OutputError> {
        self.last_error.take()
    }

    /// Close the writer and report the first error of the whole run.
    pub fn finish(mut self) -> OutputResult<W> {
        let closed = self.writer.finish();
        if let Some(e) = self.last_error.take() {
            return Err(e);
        }
        closed.map(|()| self.writer)
    }

    fn store_err(&mut self, result: OutputResult<()>) {
        if let Err(e) = result {
            if self.last_error.is_none() {
                log::error!("output write failed: {e}");
                self.last_error = Some(e);
            }
        }
    }

    fn snapshot_due(&mut self, now: SimTime) -> bool {
        if self.interval <= 0.0 || now < self.next_snapshot {
            return false;
        }
        self.next_snapshot = SimTime(((now.0 / self.interval).floor() + 1.0) * self.interval);
        true
    }
}

fn snapshot(robot: &Robot, now: SimTime) -> RobotSnapshotRow {
    RobotSnapshotRow {
        robot_id:     robot.id.0,
        time:         now.0,
        x:            robot.pos.x,
        y:            robot.pos.y,
        heading:      robot.heading,
        speed:        robot.speed(),
        state:        robot.states.front().map_or("Idle", DriveState::name),
        task:         robot.task.as_ref().map_or("Idle", Task::kind_name),
        carried_tote: robot.carried.map_or(NO_TOTE, |t| t.0),
    }
}

fn step_summary(world: &World, now: SimTime, step_secs: f64) -> StepSummaryRow {
    let mut row = StepSummaryRow {
        time: now.0,
        step_secs,
        moving_robots: 0,
        pickups: 0,
        setdowns: 0,
        collisions: 0,
        words_completed: world.orders.stats.words_completed,
        pickup_requests: world.allocator.pools.pickup_requests().len() as u32,
        delivery_requests: world.allocator.pools.delivery_requests().len() as u32,
    };
    for r in world.robots.iter() {
        row.moving_robots += u32::from(r.speed() > 0.0);
        row.pickups += r.stats.pickups;
        row.setdowns += r.stats.setdowns;
        row.collisions += r.stats.collisions;
    }
    row
}

impl<W: OutputWriter> SimObserver for SimOutputObserver<W> {
    fn on_step_start(&mut self, now: SimTime, _world: &World) {
        self.step_start = now;
    }

    fn on_step_end(&mut self, now: SimTime, world: &World) {
        let row = step_summary(world, now, now - self.step_start);
        let result = self.writer.write_step_summary(&row);
        self.store_err(result);

        if self.snapshot_due(now) {
            let rows: Vec<RobotSnapshotRow> = world.robots.iter().map(|r| snapshot(r, now)).collect();
            if !rows.is_empty() {
                let result = self.writer.write_snapshots(&rows);
                self.store_err(result);
            }
        }
    }

    fn on_reset(&mut self, now: SimTime, _world: &World) {
        log::debug!("output: statistics reset at {now}");
    }

    fn on_run_end(&mut self, _now: SimTime, _world: &World) {
        let result = self.writer.flush();
        self.store_err(result);
    }
}
