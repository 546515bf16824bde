//! The robot arena.

use fl_core::{RobotId, SimTime, ToteId, Vec2};
use fl_stock::Fleet;

use crate::robot::Robot;

/// All robots, indexed by [`RobotId`].
#[derive(Clone, Debug, Default)]
pub struct RobotStore {
    pub robots: Vec<Robot>,
}

impl RobotStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a robot; ids must be dense and in order.
    pub fn push(&mut self, robot: Robot) -> RobotId {
        debug_assert_eq!(robot.id.index(), self.robots.len());
        let id = robot.id;
        self.robots.push(robot);
        id
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.robots.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.robots.is_empty()
    }

    #[inline]
    pub fn get(&self, id: RobotId) -> Option<&Robot> {
        self.robots.get(id.index())
    }

    #[inline]
    pub fn get_mut(&mut self, id: RobotId) -> Option<&mut Robot> {
        self.robots.get_mut(id.index())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Robot> {
        self.robots.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Robot> {
        self.robots.iter_mut()
    }

    pub fn reset_statistics(&mut self, now: SimTime) {
        for r in &mut self.robots {
            r.reset_statistics(now);
        }
    }
}

impl Fleet for RobotStore {
    fn carried_tote(&self, robot: RobotId) -> Option<ToteId> {
        self.get(robot).and_then(|r| r.carried)
    }

    fn position(&self, robot: RobotId) -> Option<Vec2> {
        self.get(robot).map(|r| r.pos)
    }

    fn block_until(&mut self, robot: RobotId, until: SimTime) {
        if let Some(r) = self.get_mut(robot) {
            r.wait_until(until);
        }
    }
}
