//! Waypoint graph representation and builder.
//!
//! # Data layout
//!
//! Outgoing edges are stored in **Compressed Sparse Row** form.  The edges
//! of waypoint `w` occupy `EdgeId`s `node_out_start[w] .. node_out_start[w+1]`
//! and keep the order in which they were added, which is what makes the
//! planner's "first discovered wins" tie-break reproducible.
//!
//! # Live state
//!
//! The topology is frozen at build time.  Two pieces of state change during
//! a run and are kept in side tables rather than on the nodes:
//!
//! - tote residency: which storage slot holds which tote (both directions);
//! - en-route sets: which robots are currently heading for each waypoint.
//!
//! # Spatial index
//!
//! An R-tree (via `rstar`) answers "closest waypoint" and "waypoints within
//! distance" so a robot that has left the graph can rejoin it.

use rstar::{PointDistance, RTree, RTreeObject, AABB};
use rustc_hash::{FxHashMap, FxHashSet};

use fl_core::{EdgeId, LetterStationId, RobotId, ToteId, Vec2, WaypointId, WordStationId};

use crate::{GraphError, GraphResult};

// ── Kinds ─────────────────────────────────────────────────────────────────────

/// What a waypoint is bound to.  A waypoint carries at most one binding.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum WaypointKind {
    Transit,
    LetterStation(LetterStationId),
    WordStation(WordStationId),
    /// A place a tote may rest; the resident tote is tracked separately.
    StorageSlot,
}

// ── R-tree entry ──────────────────────────────────────────────────────────────

#[derive(Clone)]
struct WaypointEntry {
    point: [f32; 2],
    id: WaypointId,
}

impl RTreeObject for WaypointEntry {
    type Envelope = AABB<[f32; 2]>;
    fn envelope(&self) -> Self::Envelope {
        AABB::from_point(self.point)
    }
}

impl PointDistance for WaypointEntry {
    fn distance_2(&self, point: &[f32; 2]) -> f32 {
        let dx = self.point[0] - point[0];
        let dy = self.point[1] - point[1];
        dx * dx + dy * dy
    }
}

// ── WaypointGraph ─────────────────────────────────────────────────────────────

/// Directed weighted waypoint graph in CSR format.
///
/// Topology fields are `pub` for direct indexed access by planners.  Build
/// with [`WaypointGraphBuilder`].
pub struct WaypointGraph {
    /// Position of each waypoint.  Indexed by `WaypointId`.
    pub node_pos: Vec<Vec2>,

    /// Binding of each waypoint.  Indexed by `WaypointId`.
    pub node_kind: Vec<WaypointKind>,

    /// CSR row pointer; length = `node_count + 1`.
    pub node_out_start: Vec<u32>,

    pub edge_from: Vec<WaypointId>,
    pub edge_to: Vec<WaypointId>,
    pub edge_weight: Vec<f32>,

    letter_station_wp: Vec<WaypointId>,
    word_station_wp: Vec<WaypointId>,

    resident: Vec<Option<ToteId>>,
    tote_slot: FxHashMap<ToteId, WaypointId>,
    en_route: Vec<FxHashSet<RobotId>>,

    spatial_idx: RTree<WaypointEntry>,
}

impl WaypointGraph {
    // ── Topology ──────────────────────────────────────────────────────────

    pub fn node_count(&self) -> usize {
        self.node_pos.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edge_to.len()
    }

    pub fn is_empty(&self) -> bool {
        self.node_pos.is_empty()
    }

    #[inline]
    pub fn contains(&self, w: WaypointId) -> bool {
        w.index() < self.node_pos.len()
    }

    /// Outgoing edges of `w`, in insertion order.
    #[inline]
    pub fn out_edges(&self, w: WaypointId) -> impl Iterator<Item = EdgeId> + '_ {
        let (start, end) = if self.contains(w) {
            (self.node_out_start[w.index()], self.node_out_start[w.index() + 1])
        } else {
            (0, 0)
        };
        (start..end).map(EdgeId)
    }

    /// Weight of the edge `from → to`, if it exists.
    pub fn edge_between(&self, from: WaypointId, to: WaypointId) -> Option<f32> {
        self.out_edges(from)
            .find(|e| self.edge_to[e.index()] == to)
            .map(|e| self.edge_weight[e.index()])
    }

    #[inline]
    pub fn position(&self, w: WaypointId) -> Vec2 {
        self.node_pos[w.index()]
    }

    #[inline]
    pub fn kind(&self, w: WaypointId) -> WaypointKind {
        self.node_kind[w.index()]
    }

    #[inline]
    pub fn is_storage_slot(&self, w: WaypointId) -> bool {
        self.contains(w) && self.node_kind[w.index()] == WaypointKind::StorageSlot
    }

    /// Every storage slot, in id order.
    pub fn storage_slots(&self) -> impl Iterator<Item = WaypointId> + '_ {
        self.node_kind
            .iter()
            .enumerate()
            .filter(|(_, k)| **k == WaypointKind::StorageSlot)
            .map(|(i, _)| WaypointId(i as u32))
    }

    pub fn letter_station_waypoint(&self, s: LetterStationId) -> Option<WaypointId> {
        self.letter_station_wp.get(s.index()).copied().filter(|w| *w != WaypointId::INVALID)
    }

    pub fn word_station_waypoint(&self, s: WordStationId) -> Option<WaypointId> {
        self.word_station_wp.get(s.index()).copied().filter(|w| *w != WaypointId::INVALID)
    }

    // ── Spatial lookups ───────────────────────────────────────────────────

    /// The waypoint nearest to `pos`.  `None` only for an empty graph.
    pub fn closest_waypoint(&self, pos: Vec2) -> Option<WaypointId> {
        self.spatial_idx.nearest_neighbor(&[pos.x, pos.y]).map(|e| e.id)
    }

    /// Waypoints whose position lies within `distance` of `pos`.
    pub fn waypoints_within(&self, pos: Vec2, distance: f32) -> Vec<WaypointId> {
        let mut out: Vec<WaypointId> = self
            .spatial_idx
            .locate_within_distance([pos.x, pos.y], distance * distance)
            .map(|e| e.id)
            .collect();
        out.sort_unstable();
        out
    }

    // ── Tote residency ────────────────────────────────────────────────────

    pub fn resident_tote(&self, slot: WaypointId) -> Option<ToteId> {
        self.resident.get(slot.index()).copied().flatten()
    }

    /// The slot `tote` currently rests on.
    pub fn tote_waypoint(&self, tote: ToteId) -> Option<WaypointId> {
        self.tote_slot.get(&tote).copied()
    }

    /// Unbind `tote` from its slot, returning the slot it rested on.
    pub fn tote_picked_up(&mut self, tote: ToteId) -> Option<WaypointId> {
        let slot = self.tote_slot.remove(&tote)?;
        self.resident[slot.index()] = None;
        Some(slot)
    }

    /// Bind `tote` to `slot`.  Fails if `slot` is not a storage slot or
    /// already holds a different tote.
    pub fn tote_set_down(&mut self, tote: ToteId, slot: WaypointId) -> GraphResult<()> {
        if !self.is_storage_slot(slot) {
            return Err(GraphError::NotAStorageSlot(slot));
        }
        match self.resident[slot.index()] {
            Some(other) if other != tote => return Err(GraphError::SlotOccupied(slot)),
            _ => {}
        }
        if let Some(prev) = self.tote_slot.insert(tote, slot) {
            if prev != slot {
                self.resident[prev.index()] = None;
            }
        }
        self.resident[slot.index()] = Some(tote);
        Ok(())
    }

    // ── En-route sets ─────────────────────────────────────────────────────

    pub fn enter(&mut self, w: WaypointId, robot: RobotId) {
        if let Some(set) = self.en_route.get_mut(w.index()) {
            set.insert(robot);
        }
    }

    pub fn leave(&mut self, w: WaypointId, robot: RobotId) {
        if let Some(set) = self.en_route.get_mut(w.index()) {
            set.remove(&robot);
        }
    }

    #[inline]
    pub fn en_route_count(&self, w: WaypointId) -> usize {
        self.en_route.get(w.index()).map_or(0, FxHashSet::len)
    }

    pub fn is_en_route(&self, w: WaypointId, robot: RobotId) -> bool {
        self.en_route.get(w.index()).is_some_and(|s| s.contains(&robot))
    }
}

// ── WaypointGraphBuilder ──────────────────────────────────────────────────────

/// Incrementally collects waypoints and edges, then freezes them into a
/// [`WaypointGraph`].
pub struct WaypointGraphBuilder {
    nodes: Vec<(Vec2, WaypointKind)>,
    raw_edges: Vec<RawEdge>,
}

struct RawEdge {
    from: WaypointId,
    to: WaypointId,
    weight: f32,
}

impl WaypointGraphBuilder {
    pub fn new() -> Self {
        Self { nodes: Vec::new(), raw_edges: Vec::new() }
    }

    /// Add a waypoint and return its `WaypointId` (sequential from 0).
    pub fn add_waypoint(&mut self, pos: Vec2, kind: WaypointKind) -> WaypointId {
        let id = WaypointId(self.nodes.len() as u32);
        self.nodes.push((pos, kind));
        id
    }

    /// Add a **directed** edge.  Adding the same pair again replaces the
    /// earlier weight.
    pub fn add_edge(&mut self, from: WaypointId, to: WaypointId, weight: f32) {
        self.raw_edges.push(RawEdge { from, to, weight });
    }

    /// Directed edge weighted by Euclidean distance.
    pub fn add_path(&mut self, from: WaypointId, to: WaypointId) {
        let weight = self.distance(from, to);
        self.add_edge(from, to, weight);
    }

    /// Two directed edges of equal Euclidean weight.
    pub fn add_bidirectional(&mut self, a: WaypointId, b: WaypointId) {
        self.add_path(a, b);
        self.add_path(b, a);
    }

    pub fn position(&self, w: WaypointId) -> Vec2 {
        self.nodes[w.index()].0
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    fn distance(&self, a: WaypointId, b: WaypointId) -> f32 {
        match (self.nodes.get(a.index()), self.nodes.get(b.index())) {
            (Some((pa, _)), Some((pb, _))) => pa.distance(*pb),
            _ => 0.0,
        }
    }

    /// Consume the builder and produce a [`WaypointGraph`].
    pub fn build(self) -> GraphResult<WaypointGraph> {
        let node_count = self.nodes.len();

        // Collapse duplicate pairs, last weight wins, first position kept.
        let mut seen: FxHashMap<(u32, u32), usize> = FxHashMap::default();
        let mut raw: Vec<RawEdge> = Vec::with_capacity(self.raw_edges.len());
        for e in self.raw_edges {
            for w in [e.from, e.to] {
                if w.index() >= node_count {
                    return Err(GraphError::UnknownWaypoint(w));
                }
            }
            match seen.get(&(e.from.0, e.to.0)) {
                Some(&i) => raw[i].weight = e.weight,
                None => {
                    seen.insert((e.from.0, e.to.0), raw.len());
                    raw.push(e);
                }
            }
        }

        // Stable sort keeps per-node insertion order.
        raw.sort_by_key(|e| e.from.0);

        let edge_from: Vec<WaypointId> = raw.iter().map(|e| e.from).collect();
        let edge_to: Vec<WaypointId> = raw.iter().map(|e| e.to).collect();
        let edge_weight: Vec<f32> = raw.iter().map(|e| e.weight).collect();

        let mut node_out_start = vec![0u32; node_count + 1];
        for e in &raw {
            node_out_start[e.from.index() + 1] += 1;
        }
        for i in 1..=node_count {
            node_out_start[i] += node_out_start[i - 1];
        }

        let mut letter_station_wp: Vec<WaypointId> = Vec::new();
        let mut word_station_wp: Vec<WaypointId> = Vec::new();
        for (i, (_, kind)) in self.nodes.iter().enumerate() {
            let (table, idx, label) = match *kind {
                WaypointKind::LetterStation(s) => (&mut letter_station_wp, s.index(), s.to_string()),
                WaypointKind::WordStation(s) => (&mut word_station_wp, s.index(), s.to_string()),
                _ => continue,
            };
            if table.len() <= idx {
                table.resize(idx + 1, WaypointId::INVALID);
            }
            if table[idx] != WaypointId::INVALID {
                return Err(GraphError::DuplicateStation(label));
            }
            table[idx] = WaypointId(i as u32);
        }

        let entries: Vec<WaypointEntry> = self
            .nodes
            .iter()
            .enumerate()
            .map(|(i, (pos, _))| WaypointEntry { point: [pos.x, pos.y], id: WaypointId(i as u32) })
            .collect();
        let spatial_idx = RTree::bulk_load(entries);

        let (node_pos, node_kind): (Vec<Vec2>, Vec<WaypointKind>) = self.nodes.into_iter().unzip();

        Ok(WaypointGraph {
            node_pos,
            node_kind,
            node_out_start,
            edge_from,
            edge_to,
            edge_weight,
            letter_station_wp,
            word_station_wp,
            resident: vec![None; node_count],
            tote_slot: FxHashMap::default(),
            en_route: vec![FxHashSet::default(); node_count],
            spatial_idx,
        })
    }
}

impl Default for WaypointGraphBuilder {
    fn default() -> Self {
        Self::new()
    }
}
