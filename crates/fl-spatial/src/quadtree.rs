//! Balancing quadtree over circular bodies.
//!
//! # Layout
//!
//! The tree owns one [`Circle`] per key in a flat `FxHashMap`; nodes only
//! hold keys.  A leaf keeps an unordered `Vec<K>`.  Interior nodes have
//! exactly four children in the order top-left, top-right, bottom-left,
//! bottom-right (y grows downward).  An entity is routed by its centre: it
//! goes left/top when its coordinate is strictly less than the node's
//! midpoint.
//!
//! # Hysteresis
//!
//! A leaf splits once it holds `division_threshold` entities; four sibling
//! leaves fold back into their parent once their combined count drops below
//! `combine_threshold`.  The gap between the two keeps a node hovering near
//! one threshold from flapping.  `insert` and `remove` rebalance
//! immediately; `move_to` does not, so callers that move many entities per
//! step call [`Quadtree::rebalance`] once afterwards.
//!
//! # Padding
//!
//! Each node caches the largest radius in its subtree.  Queries widen the
//! quadrant test by that radius so an entity whose body straddles a boundary
//! is still found from the neighbouring quadrant.

use std::hash::Hash;

use fl_core::{Circle, Vec2};
use rustc_hash::FxHashMap;

/// Leaf size that triggers a split.
pub const DEFAULT_DIVISION_THRESHOLD: usize = 12;

/// Combined sibling size below which four leaves merge.
pub const DEFAULT_COMBINE_THRESHOLD: usize = 8;

/// Splits stop at this depth so coincident entities cannot recurse forever.
const MAX_DEPTH: u32 = 16;

// ── Node ──────────────────────────────────────────────────────────────────────

struct Node<K> {
    min: Vec2,
    max: Vec2,
    depth: u32,
    items: Vec<K>,
    children: Option<Box<[Node<K>; 4]>>,
    max_radius: f32,
}

impl<K: Copy + Eq + Hash> Node<K> {
    fn new(min: Vec2, max: Vec2, depth: u32) -> Self {
        Self { min, max, depth, items: Vec::new(), children: None, max_radius: 0.0 }
    }

    #[inline]
    fn mid(&self) -> Vec2 {
        Vec2::new((self.min.x + self.max.x) * 0.5, (self.min.y + self.max.y) * 0.5)
    }

    #[inline]
    fn quadrant_of(&self, p: Vec2) -> usize {
        let mid = self.mid();
        let col = if p.x < mid.x { 0 } else { 1 };
        let row = if p.y < mid.y { 0 } else { 2 };
        row + col
    }

    /// Indices of the children whose quadrant intersects the square of
    /// half-width `pad` around `p`.
    fn quadrants_near(&self, p: Vec2, pad: f32) -> [bool; 4] {
        let mid = self.mid();
        let left = p.x - pad < mid.x;
        let right = p.x + pad >= mid.x;
        let top = p.y - pad < mid.y;
        let bottom = p.y + pad >= mid.y;
        [top && left, top && right, bottom && left, bottom && right]
    }

    fn count(&self) -> usize {
        match &self.children {
            None => self.items.len(),
            Some(children) => children.iter().map(Node::count).sum(),
        }
    }

    fn leaf_count(&self) -> usize {
        match &self.children {
            None => 1,
            Some(children) => children.iter().map(Node::leaf_count).sum(),
        }
    }

    fn insert(&mut self, key: K, shape: &Circle) {
        self.max_radius = self.max_radius.max(shape.radius);
        let q = self.quadrant_of(shape.center);
        match &mut self.children {
            None => self.items.push(key),
            Some(children) => children[q].insert(key, shape),
        }
    }

    /// Remove `key`, routing by `shape` (its position when it was inserted).
    fn remove(&mut self, key: K, shape: &Circle, shapes: &FxHashMap<K, Circle>) -> bool {
        let q = self.quadrant_of(shape.center);
        let removed = match &mut self.children {
            None => match self.items.iter().position(|&k| k == key) {
                Some(i) => {
                    self.items.swap_remove(i);
                    true
                }
                None => false,
            },
            Some(children) => children[q].remove(key, shape, shapes),
        };
        if removed {
            self.recompute_max_radius(shapes);
        }
        removed
    }

    fn recompute_max_radius(&mut self, shapes: &FxHashMap<K, Circle>) {
        self.max_radius = match &self.children {
            None => self
                .items
                .iter()
                .filter_map(|k| shapes.get(k))
                .map(|c| c.radius)
                .fold(0.0, f32::max),
            Some(children) => children.iter().map(|c| c.max_radius).fold(0.0, f32::max),
        };
    }

    fn is_clear(
        &self,
        ignore: Option<K>,
        p: Vec2,
        radius: f32,
        shapes: &FxHashMap<K, Circle>,
    ) -> bool {
        match &self.children {
            None => self.items.iter().all(|k| {
                Some(*k) == ignore
                    || shapes.get(k).is_none_or(|c| !c.collides_at(p.x, p.y, radius))
            }),
            Some(children) => {
                let pad = (4.0 * radius).max(radius + self.max_radius);
                let near = self.quadrants_near(p, pad);
                children
                    .iter()
                    .zip(near)
                    .all(|(child, hit)| !hit || child.is_clear(ignore, p, radius, shapes))
            }
        }
    }

    fn query(&self, p: Vec2, radius: f32, shapes: &FxHashMap<K, Circle>, out: &mut Vec<K>) {
        match &self.children {
            None => out.extend(
                self.items
                    .iter()
                    .copied()
                    .filter(|k| shapes.get(k).is_some_and(|c| c.collides_at(p.x, p.y, radius))),
            ),
            Some(children) => {
                let near = self.quadrants_near(p, radius + self.max_radius);
                for (child, hit) in children.iter().zip(near) {
                    if hit {
                        child.query(p, radius, shapes, out);
                    }
                }
            }
        }
    }

    fn rebalance(&mut self, shapes: &FxHashMap<K, Circle>, division: usize, combine: usize) {
        if self.children.is_none() && self.items.len() >= division && self.depth < MAX_DEPTH {
            self.split(shapes);
        }

        let Some(children) = &mut self.children else {
            return;
        };
        for child in children.iter_mut() {
            child.rebalance(shapes, division, combine);
        }

        let all_leaves = children.iter().all(|c| c.children.is_none());
        let total: usize = children.iter().map(|c| c.items.len()).sum();
        if all_leaves && total < combine {
            let mut items = Vec::with_capacity(total);
            for child in children.iter_mut() {
                items.append(&mut child.items);
            }
            self.items = items;
            self.children = None;
        }
    }

    fn split(&mut self, shapes: &FxHashMap<K, Circle>) {
        let mid = self.mid();
        let (min, max, d) = (self.min, self.max, self.depth + 1);
        let mut children = Box::new([
            Node::new(min, mid, d),
            Node::new(Vec2::new(mid.x, min.y), Vec2::new(max.x, mid.y), d),
            Node::new(Vec2::new(min.x, mid.y), Vec2::new(mid.x, max.y), d),
            Node::new(mid, max, d),
        ]);
        for key in std::mem::take(&mut self.items) {
            if let Some(shape) = shapes.get(&key) {
                children[self.quadrant_of(shape.center)].insert(key, shape);
            }
        }
        self.children = Some(children);
    }
}

// ── Quadtree ──────────────────────────────────────────────────────────────────

/// Collision index over circular bodies keyed by a typed handle.
///
/// Overlap is inclusive: two bodies collide when the distance between their
/// centres is at most the sum of their radii.
pub struct Quadtree<K> {
    root: Node<K>,
    shapes: FxHashMap<K, Circle>,
    division_threshold: usize,
    combine_threshold: usize,
}

impl<K: Copy + Eq + Hash> Quadtree<K> {
    /// An empty index covering `[0, width] × [0, height]` with the default
    /// thresholds.
    pub fn new(width: f32, height: f32) -> Self {
        Self::with_thresholds(width, height, DEFAULT_DIVISION_THRESHOLD, DEFAULT_COMBINE_THRESHOLD)
    }

    pub fn with_thresholds(width: f32, height: f32, division: usize, combine: usize) -> Self {
        Self {
            root: Node::new(Vec2::ZERO, Vec2::new(width, height), 0),
            shapes: FxHashMap::default(),
            division_threshold: division.max(1),
            combine_threshold: combine,
        }
    }

    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }

    /// Number of leaves; `1` means the tree is a single unsplit node.
    pub fn leaf_count(&self) -> usize {
        self.root.leaf_count()
    }

    pub fn get(&self, key: K) -> Option<&Circle> {
        self.shapes.get(&key)
    }

    pub fn contains(&self, key: K) -> bool {
        self.shapes.contains_key(&key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (K, &Circle)> + '_ {
        self.shapes.iter().map(|(k, c)| (*k, c))
    }

    /// Register `key` with `shape`.  Returns `false` (and changes nothing)
    /// if the key is already present.  Overlap is not checked here; use
    /// [`is_clear`][Self::is_clear] first when it matters.
    pub fn insert(&mut self, key: K, shape: Circle) -> bool {
        if self.shapes.contains_key(&key) {
            return false;
        }
        self.shapes.insert(key, shape);
        self.root.insert(key, &shape);
        self.rebalance();
        debug_assert_eq!(self.root.count(), self.shapes.len());
        true
    }

    /// Unregister `key`, returning its last shape.
    pub fn remove(&mut self, key: K) -> Option<Circle> {
        let shape = *self.shapes.get(&key)?;
        self.root.remove(key, &shape, &self.shapes);
        self.shapes.remove(&key);
        self.rebalance();
        Some(shape)
    }

    /// Relocate `key` without checking for overlap and without rebalancing.
    pub fn move_to(&mut self, key: K, x: f32, y: f32) -> bool {
        let Some(&old) = self.shapes.get(&key) else {
            return false;
        };
        self.root.remove(key, &old, &self.shapes);
        let new = Circle { center: Vec2::new(x, y), ..old };
        self.shapes.insert(key, new);
        self.root.insert(key, &new);
        true
    }

    pub fn set_moving(&mut self, key: K, moving: bool) {
        if let Some(c) = self.shapes.get_mut(&key) {
            c.moving = moving;
        }
    }

    /// `true` if `key`, moved to `(x, y)`, would overlap no other entity.
    /// Unknown keys are never valid.
    pub fn validate_move(&self, key: K, x: f32, y: f32) -> bool {
        match self.shapes.get(&key) {
            Some(shape) => self.root.is_clear(Some(key), Vec2::new(x, y), shape.radius, &self.shapes),
            None => false,
        }
    }

    /// `true` if a body of `radius` at `(x, y)` would overlap no entity other
    /// than `ignore`.
    pub fn is_clear(&self, x: f32, y: f32, radius: f32, ignore: Option<K>) -> bool {
        self.root.is_clear(ignore, Vec2::new(x, y), radius, &self.shapes)
    }

    /// Every entity whose body overlaps the circle of `radius` at `point`.
    pub fn query_within(&self, point: Vec2, radius: f32) -> Vec<K> {
        let mut out = Vec::new();
        self.root.query(point, radius, &self.shapes, &mut out);
        out
    }

    /// Split full leaves and fold sparse sibling groups.
    pub fn rebalance(&mut self) {
        self.root.rebalance(&self.shapes, self.division_threshold, self.combine_threshold);
    }
}
