//! Planar geometry: vectors, circular bodies, and angle helpers.
//!
//! The arena uses a y-down screen convention: `y = 0` is the top edge.
//! Headings are radians measured from the +x axis.

use std::f32::consts::{PI, TAU};
use std::ops::{Add, AddAssign, Mul, Sub};

// ── Vec2 ──────────────────────────────────────────────────────────────────────

/// A 2-D point or displacement in arena units.
#[derive(Copy, Clone, PartialEq, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };

    #[inline]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Unit vector pointing along `heading`.
    #[inline]
    pub fn from_angle(heading: f32) -> Self {
        Self { x: heading.cos(), y: heading.sin() }
    }

    #[inline]
    pub fn length_sq(self) -> f32 {
        self.x * self.x + self.y * self.y
    }

    #[inline]
    pub fn length(self) -> f32 {
        self.length_sq().sqrt()
    }

    #[inline]
    pub fn distance(self, other: Vec2) -> f32 {
        (other - self).length()
    }

    #[inline]
    pub fn distance_sq(self, other: Vec2) -> f32 {
        (other - self).length_sq()
    }

    /// Angle of the direction from `self` toward `other`, in `(-π, π]`.
    #[inline]
    pub fn angle_to(self, other: Vec2) -> f32 {
        (other.y - self.y).atan2(other.x - self.x)
    }
}

impl Add for Vec2 {
    type Output = Vec2;
    #[inline]
    fn add(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl AddAssign for Vec2 {
    #[inline]
    fn add_assign(&mut self, rhs: Vec2) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl Sub for Vec2 {
    type Output = Vec2;
    #[inline]
    fn sub(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f32> for Vec2 {
    type Output = Vec2;
    #[inline]
    fn mul(self, rhs: f32) -> Vec2 {
        Vec2::new(self.x * rhs, self.y * rhs)
    }
}

// ── Circle ────────────────────────────────────────────────────────────────────

/// The body of every located object: robots, totes, stations, waypoints.
#[derive(Copy, Clone, PartialEq, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Circle {
    pub center: Vec2,
    pub radius: f32,
    /// Set while the owning entity moved during the last step.
    pub moving: bool,
}

impl Circle {
    pub fn new(x: f32, y: f32, radius: f32) -> Self {
        Self { center: Vec2::new(x, y), radius, moving: false }
    }

    #[inline]
    pub fn x(&self) -> f32 {
        self.center.x
    }

    #[inline]
    pub fn y(&self) -> f32 {
        self.center.y
    }

    /// Inclusive overlap test against a circle of `radius` centred at
    /// `(x, y)`: touching circles collide.
    #[inline]
    pub fn collides_at(&self, x: f32, y: f32, radius: f32) -> bool {
        let dx = x - self.center.x;
        let dy = y - self.center.y;
        let reach = radius + self.radius;
        dx * dx + dy * dy <= reach * reach
    }

    #[inline]
    pub fn collides(&self, other: &Circle) -> bool {
        self.collides_at(other.center.x, other.center.y, other.radius)
    }

    #[inline]
    pub fn distance_to(&self, point: Vec2) -> f32 {
        self.center.distance(point)
    }
}

// ── Angles ────────────────────────────────────────────────────────────────────

/// Wrap an angle into `[0, 2π)`.
#[inline]
pub fn normalize_angle(angle: f32) -> f32 {
    let a = angle.rem_euclid(TAU);
    // rem_euclid can round up to exactly TAU for tiny negative inputs.
    if a >= TAU { 0.0 } else { a }
}

/// Signed difference `a - b` wrapped into `(-π, π]`.
#[inline]
pub fn angle_difference(a: f32, b: f32) -> f32 {
    let mut d = (a - b).rem_euclid(TAU);
    if d > PI {
        d -= TAU;
    }
    d
}
