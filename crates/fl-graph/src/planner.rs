//! Next-hop planning trait and default A* implementation.
//!
//! # Pluggability
//!
//! Robot drivers ask for the next hop through the [`HopPlanner`] trait so
//! the search strategy can be swapped without touching the driver.  Only the
//! first waypoint of the best path is returned: drivers replan at every
//! waypoint, which lets routing react to where other robots are heading.
//!
//! # Congestion
//!
//! A candidate waypoint's *priority* (not its path cost) is raised by
//! `congestion_penalty × en_route_count(w)`.  The goal itself is never
//! penalised, so a busy station is still reachable.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use fl_core::WaypointId;

use crate::graph::{WaypointGraph, WaypointKind};

/// Default number of node expansions before a search gives up.
pub const DEFAULT_SEARCH_BUDGET: usize = 1000;

// ── Query ─────────────────────────────────────────────────────────────────────

/// Per-robot search parameters.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct HopQuery {
    /// A carrying robot may not pass through storage slots other than `to`.
    pub carrying: bool,
    /// Priority added per robot en route to a candidate waypoint.
    pub congestion_penalty: f32,
}

impl HopQuery {
    pub fn new(carrying: bool, congestion_penalty: f32) -> Self {
        Self { carrying, congestion_penalty }
    }
}

// ── HopPlanner trait ──────────────────────────────────────────────────────────

/// Pluggable next-hop engine.
pub trait HopPlanner: Send + Sync {
    /// The waypoint to head for next on the way from `from` to `to`.
    ///
    /// `None` when `from == to`, when `to` is unreachable, or when the search
    /// budget runs out.  Callers treat `None` as non-fatal.
    fn next_hop(
        &self,
        graph: &WaypointGraph,
        from: WaypointId,
        to: WaypointId,
        query: HopQuery,
    ) -> Option<WaypointId>;
}

// ── AStarPlanner ──────────────────────────────────────────────────────────────

/// A* over the CSR graph with a Euclidean heuristic and a bounded number of
/// expansions.
#[derive(Clone, Debug)]
pub struct AStarPlanner {
    pub budget: usize,
}

impl AStarPlanner {
    pub fn new(budget: usize) -> Self {
        Self { budget }
    }
}

impl Default for AStarPlanner {
    fn default() -> Self {
        Self::new(DEFAULT_SEARCH_BUDGET)
    }
}

impl HopPlanner for AStarPlanner {
    fn next_hop(
        &self,
        graph: &WaypointGraph,
        from: WaypointId,
        to: WaypointId,
        query: HopQuery,
    ) -> Option<WaypointId> {
        astar(graph, from, to, query, self.budget)
    }
}

// ── A* internals ──────────────────────────────────────────────────────────────

/// Frontier entry.  Ordered so the max-heap pops the lowest priority first,
/// and among equal priorities the earliest discovered.
struct Open {
    priority: f32,
    seq: u64,
    node: WaypointId,
    g: f32,
}

impl PartialEq for Open {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Open {}

impl PartialOrd for Open {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Open {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .priority
            .total_cmp(&self.priority)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

fn astar(
    graph: &WaypointGraph,
    from: WaypointId,
    to: WaypointId,
    query: HopQuery,
    budget: usize,
) -> Option<WaypointId> {
    if from == to || !graph.contains(from) || !graph.contains(to) {
        return None;
    }

    let n = graph.node_count();
    let goal = graph.position(to);
    // best_g[v] = cheapest path cost found so far to v.
    let mut best_g = vec![f32::INFINITY; n];
    // first_hop[v] = the neighbour of `from` that the best path to v starts with.
    let mut first_hop = vec![WaypointId::INVALID; n];
    let mut closed = vec![false; n];

    let mut seq = 0u64;
    let mut heap = BinaryHeap::new();
    best_g[from.index()] = 0.0;
    heap.push(Open { priority: graph.position(from).distance(goal), seq, node: from, g: 0.0 });

    let mut expansions = 0usize;
    while let Some(Open { node, g, .. }) = heap.pop() {
        if node == to {
            return Some(first_hop[to.index()]);
        }
        if closed[node.index()] || g > best_g[node.index()] {
            continue;
        }
        closed[node.index()] = true;

        expansions += 1;
        if expansions > budget {
            return None;
        }

        for edge in graph.out_edges(node) {
            let next = graph.edge_to[edge.index()];
            if closed[next.index()] {
                continue;
            }
            if query.carrying && next != to && graph.kind(next) == WaypointKind::StorageSlot {
                continue;
            }
            let next_g = g + graph.edge_weight[edge.index()];
            if next_g >= best_g[next.index()] {
                continue;
            }
            best_g[next.index()] = next_g;
            first_hop[next.index()] = if node == from { next } else { first_hop[node.index()] };

            let penalty = if next == to {
                0.0
            } else {
                query.congestion_penalty * graph.en_route_count(next) as f32
            };
            seq += 1;
            heap.push(Open {
                priority: next_g + graph.position(next).distance(goal) + penalty,
                seq,
                node: next,
                g: next_g,
            });
        }
    }

    None
}
