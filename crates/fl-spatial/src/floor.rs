//! The arena floor: bounds, station footprints, and the two collision
//! indices (robots and totes).
//!
//! Robots and totes live in separate [`Quadtree`]s because a robot without
//! a tote drives underneath resting totes; only a robot *carrying* a tote
//! has its tote checked against the other totes.  Every committed robot
//! move goes through [`Floor::move_robot`], which validates the robot and
//! its carried tote before touching either index.

use fl_core::{Circle, RobotId, ToteId, Vec2};

use crate::quadtree::Quadtree;
use crate::{SpatialError, SpatialResult};

pub struct Floor {
    width: f32,
    height: f32,
    tolerance: f32,
    robots: Quadtree<RobotId>,
    totes: Quadtree<ToteId>,
    stations: Vec<Circle>,
}

impl Floor {
    /// An empty floor with the given quadtree thresholds for both indices.
    pub fn new(width: f32, height: f32, tolerance: f32, division: usize, combine: usize) -> Self {
        Self {
            width,
            height,
            tolerance,
            robots: Quadtree::with_thresholds(width, height, division, combine),
            totes: Quadtree::with_thresholds(width, height, division, combine),
            stations: Vec::new(),
        }
    }

    #[inline]
    pub fn width(&self) -> f32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> f32 {
        self.height
    }

    #[inline]
    pub fn tolerance(&self) -> f32 {
        self.tolerance
    }

    pub fn robots(&self) -> &Quadtree<RobotId> {
        &self.robots
    }

    pub fn totes(&self) -> &Quadtree<ToteId> {
        &self.totes
    }

    pub fn stations(&self) -> &[Circle] {
        &self.stations
    }

    pub fn robot(&self, id: RobotId) -> Option<&Circle> {
        self.robots.get(id)
    }

    pub fn tote(&self, id: ToteId) -> Option<&Circle> {
        self.totes.get(id)
    }

    /// `true` if a body of `radius` at `(x, y)` lies entirely on the floor.
    #[inline]
    pub fn in_bounds(&self, x: f32, y: f32, radius: f32) -> bool {
        x - radius >= 0.0 && x + radius <= self.width && y - radius >= 0.0 && y + radius <= self.height
    }

    // ── Placement ─────────────────────────────────────────────────────────

    pub fn add_station(&mut self, footprint: Circle) {
        self.stations.push(footprint);
    }

    /// Place a robot; it must be in bounds and clear of every other robot.
    pub fn add_robot(&mut self, id: RobotId, body: Circle) -> SpatialResult<()> {
        if !self.in_bounds(body.x(), body.y(), body.radius) {
            return Err(SpatialError::OutOfBounds { what: "robot", x: body.x(), y: body.y() });
        }
        if !self.robots.is_clear(body.x(), body.y(), body.radius, None) {
            return Err(SpatialError::Overlap { what: "robot", x: body.x(), y: body.y() });
        }
        if !self.robots.insert(id, body) {
            return Err(SpatialError::Duplicate(id.to_string()));
        }
        Ok(())
    }

    /// Place a tote; the location must be a valid storage location.
    pub fn add_tote(&mut self, id: ToteId, body: Circle) -> SpatialResult<()> {
        if !self.in_bounds(body.x(), body.y(), body.radius) {
            return Err(SpatialError::OutOfBounds { what: "tote", x: body.x(), y: body.y() });
        }
        if !self.is_clear_of_stations(body.center, body.radius)
            || !self.totes.is_clear(body.x(), body.y(), body.radius, None)
        {
            return Err(SpatialError::Overlap { what: "tote", x: body.x(), y: body.y() });
        }
        if !self.totes.insert(id, body) {
            return Err(SpatialError::Duplicate(id.to_string()));
        }
        Ok(())
    }

    fn is_clear_of_stations(&self, p: Vec2, radius: f32) -> bool {
        self.stations.iter().all(|s| !s.collides_at(p.x, p.y, radius))
    }

    /// `true` if `tote` could rest at `(x, y)`: in bounds, clear of other
    /// totes, and off every station footprint.
    pub fn is_valid_storage_location(&self, tote: ToteId, x: f32, y: f32) -> bool {
        let Some(body) = self.totes.get(tote) else {
            return false;
        };
        self.in_bounds(x, y, body.radius)
            && self.totes.validate_move(tote, x, y)
            && self.is_clear_of_stations(Vec2::new(x, y), body.radius)
    }

    // ── Motion ────────────────────────────────────────────────────────────

    /// `true` if `robot` (and `carried`, if any) could move to `(x, y)`.
    pub fn is_valid_robot_move(&self, robot: RobotId, carried: Option<ToteId>, x: f32, y: f32) -> bool {
        let Some(body) = self.robots.get(robot) else {
            return false;
        };
        if !self.in_bounds(x, y, body.radius) || !self.robots.validate_move(robot, x, y) {
            return false;
        }
        match carried {
            None => true,
            Some(tote) => match self.totes.get(tote) {
                Some(t) => self.in_bounds(x, y, t.radius) && self.totes.validate_move(tote, x, y),
                None => false,
            },
        }
    }

    /// Validate, then commit, a robot move.  Nothing changes on rejection.
    pub fn move_robot(&mut self, robot: RobotId, carried: Option<ToteId>, x: f32, y: f32) -> bool {
        if !self.is_valid_robot_move(robot, carried, x, y) {
            return false;
        }
        self.robots.move_to(robot, x, y);
        if let Some(tote) = carried {
            self.totes.move_to(tote, x, y);
        }
        true
    }

    pub fn set_moving(&mut self, robot: RobotId, carried: Option<ToteId>, moving: bool) {
        self.robots.set_moving(robot, moving);
        if let Some(tote) = carried {
            self.totes.set_moving(tote, moving);
        }
    }

    // ── Queries ───────────────────────────────────────────────────────────

    pub fn robots_within(&self, point: Vec2, distance: f32) -> Vec<RobotId> {
        self.robots.query_within(point, distance)
    }

    pub fn totes_within(&self, point: Vec2, distance: f32) -> Vec<ToteId> {
        self.totes.query_within(point, distance)
    }

    /// Structural upkeep for both indices; called once per step.
    pub fn rebalance(&mut self) {
        self.robots.rebalance();
        self.totes.rebalance();
    }
}
