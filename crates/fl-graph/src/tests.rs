//! Unit tests for fl-graph.
//!
//! All tests use small hand-built graphs.

#[cfg(test)]
mod helpers {
    use fl_core::{Vec2, WaypointId};

    use crate::{WaypointGraphBuilder, WaypointKind};

    /// Two parallel lanes joined at both ends:
    ///
    /// ```text
    ///   0 ── 1 ── 2        y = 0
    ///   │         │
    ///   3 ── 4 ── 5        y = 1
    /// ```
    ///
    /// All edges bidirectional.  The shortest path 0→2 is through 1.
    pub fn two_lanes(middle: WaypointKind) -> (WaypointGraphBuilder, [WaypointId; 6]) {
        let mut b = WaypointGraphBuilder::new();
        let w0 = b.add_waypoint(Vec2::new(0.0, 0.0), WaypointKind::Transit);
        let w1 = b.add_waypoint(Vec2::new(1.0, 0.0), middle);
        let w2 = b.add_waypoint(Vec2::new(2.0, 0.0), WaypointKind::Transit);
        let w3 = b.add_waypoint(Vec2::new(0.0, 1.0), WaypointKind::Transit);
        let w4 = b.add_waypoint(Vec2::new(1.0, 1.0), WaypointKind::Transit);
        let w5 = b.add_waypoint(Vec2::new(2.0, 1.0), WaypointKind::Transit);
        b.add_bidirectional(w0, w1);
        b.add_bidirectional(w1, w2);
        b.add_bidirectional(w0, w3);
        b.add_bidirectional(w3, w4);
        b.add_bidirectional(w4, w5);
        b.add_bidirectional(w5, w2);
        (b, [w0, w1, w2, w3, w4, w5])
    }
}

// ── Builder & structure ───────────────────────────────────────────────────────

#[cfg(test)]
mod builder {
    use fl_core::{LetterStationId, Vec2, WaypointId};

    use crate::{GraphError, WaypointGraphBuilder, WaypointKind};

    #[test]
    fn empty_build() {
        let g = WaypointGraphBuilder::new().build().unwrap();
        assert!(g.is_empty());
        assert_eq!(g.edge_count(), 0);
        assert_eq!(g.closest_waypoint(Vec2::ZERO), None);
    }

    #[test]
    fn csr_keeps_insertion_order_per_node() {
        let (b, [w0, w1, _, w3, ..]) = super::helpers::two_lanes(WaypointKind::Transit);
        let g = b.build().unwrap();
        assert_eq!(g.node_count(), 6);
        assert_eq!(g.edge_count(), 12);
        let out: Vec<WaypointId> = g.out_edges(w0).map(|e| g.edge_to[e.index()]).collect();
        assert_eq!(out, vec![w1, w3]);
        for e in g.out_edges(w0) {
            assert_eq!(g.edge_from[e.index()], w0);
        }
    }

    #[test]
    fn duplicate_edge_last_weight_wins() {
        let mut b = WaypointGraphBuilder::new();
        let a = b.add_waypoint(Vec2::new(0.0, 0.0), WaypointKind::Transit);
        let c = b.add_waypoint(Vec2::new(3.0, 4.0), WaypointKind::Transit);
        b.add_path(a, c);
        b.add_edge(a, c, 2.0);
        let g = b.build().unwrap();
        assert_eq!(g.edge_count(), 1);
        assert_eq!(g.edge_between(a, c), Some(2.0));
        assert_eq!(g.edge_between(c, a), None, "edges are directed");
    }

    #[test]
    fn euclidean_default_weight() {
        let mut b = WaypointGraphBuilder::new();
        let a = b.add_waypoint(Vec2::new(0.0, 0.0), WaypointKind::Transit);
        let c = b.add_waypoint(Vec2::new(3.0, 4.0), WaypointKind::Transit);
        b.add_bidirectional(a, c);
        let g = b.build().unwrap();
        assert_eq!(g.edge_between(a, c), Some(5.0));
        assert_eq!(g.edge_between(c, a), Some(5.0));
    }

    #[test]
    fn unknown_endpoint_rejected() {
        let mut b = WaypointGraphBuilder::new();
        let a = b.add_waypoint(Vec2::ZERO, WaypointKind::Transit);
        b.add_edge(a, WaypointId(9), 1.0);
        assert!(matches!(b.build(), Err(GraphError::UnknownWaypoint(WaypointId(9)))));
    }

    #[test]
    fn station_bound_once() {
        let mut b = WaypointGraphBuilder::new();
        b.add_waypoint(Vec2::ZERO, WaypointKind::LetterStation(LetterStationId(0)));
        b.add_waypoint(Vec2::new(1.0, 0.0), WaypointKind::LetterStation(LetterStationId(0)));
        assert!(matches!(b.build(), Err(GraphError::DuplicateStation(_))));
    }

    #[test]
    fn station_lookup() {
        let mut b = WaypointGraphBuilder::new();
        b.add_waypoint(Vec2::ZERO, WaypointKind::Transit);
        let s = b.add_waypoint(Vec2::new(1.0, 0.0), WaypointKind::LetterStation(LetterStationId(1)));
        let g = b.build().unwrap();
        assert_eq!(g.letter_station_waypoint(LetterStationId(1)), Some(s));
        assert_eq!(g.letter_station_waypoint(LetterStationId(0)), None);
        assert_eq!(g.letter_station_waypoint(LetterStationId(5)), None);
    }
}

// ── Spatial lookups ───────────────────────────────────────────────────────────

#[cfg(test)]
mod spatial {
    use fl_core::Vec2;

    use crate::WaypointKind;

    #[test]
    fn closest_waypoint_snaps() {
        let (b, [_, w1, _, _, w4, _]) = super::helpers::two_lanes(WaypointKind::Transit);
        let g = b.build().unwrap();
        assert_eq!(g.closest_waypoint(Vec2::new(1.1, 0.2)), Some(w1));
        assert_eq!(g.closest_waypoint(Vec2::new(0.9, 0.8)), Some(w4));
    }

    #[test]
    fn waypoints_within_radius() {
        let (b, [w0, w1, _, w3, ..]) = super::helpers::two_lanes(WaypointKind::Transit);
        let g = b.build().unwrap();
        assert_eq!(g.waypoints_within(Vec2::new(0.0, 0.0), 1.01), vec![w0, w1, w3]);
        assert!(g.waypoints_within(Vec2::new(0.5, 0.5), 0.1).is_empty());
    }
}

// ── Residency & en-route sets ─────────────────────────────────────────────────

#[cfg(test)]
mod residency {
    use fl_core::{RobotId, ToteId};

    use crate::{GraphError, WaypointKind};

    #[test]
    fn set_down_and_pick_up() {
        let (b, [w0, w1, ..]) = super::helpers::two_lanes(WaypointKind::StorageSlot);
        let mut g = b.build().unwrap();
        assert_eq!(g.storage_slots().collect::<Vec<_>>(), vec![w1]);

        assert!(matches!(g.tote_set_down(ToteId(0), w0), Err(GraphError::NotAStorageSlot(_))));
        g.tote_set_down(ToteId(0), w1).unwrap();
        assert_eq!(g.resident_tote(w1), Some(ToteId(0)));
        assert_eq!(g.tote_waypoint(ToteId(0)), Some(w1));
        assert!(matches!(g.tote_set_down(ToteId(1), w1), Err(GraphError::SlotOccupied(_))));

        assert_eq!(g.tote_picked_up(ToteId(0)), Some(w1));
        assert_eq!(g.resident_tote(w1), None);
        assert_eq!(g.tote_waypoint(ToteId(0)), None);
        assert_eq!(g.tote_picked_up(ToteId(0)), None, "second pickup is a no-op");
    }

    #[test]
    fn en_route_is_a_set() {
        let (b, [w0, ..]) = super::helpers::two_lanes(WaypointKind::Transit);
        let mut g = b.build().unwrap();
        g.enter(w0, RobotId(1));
        g.enter(w0, RobotId(1));
        g.enter(w0, RobotId(2));
        assert_eq!(g.en_route_count(w0), 2);
        assert!(g.is_en_route(w0, RobotId(1)));
        g.leave(w0, RobotId(1));
        g.leave(w0, RobotId(7));
        assert_eq!(g.en_route_count(w0), 1);
        assert!(!g.is_en_route(w0, RobotId(1)));
    }
}

// ── Planner ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod planner {
    use fl_core::{RobotId, Vec2};

    use crate::{AStarPlanner, HopPlanner, HopQuery, WaypointGraphBuilder, WaypointKind};

    const FREE: HopQuery = HopQuery { carrying: false, congestion_penalty: 10.0 };
    const CARRYING: HopQuery = HopQuery { carrying: true, congestion_penalty: 10.0 };

    #[test]
    fn shortest_first_hop() {
        let (b, [w0, w1, w2, ..]) = super::helpers::two_lanes(WaypointKind::Transit);
        let g = b.build().unwrap();
        let p = AStarPlanner::default();
        assert_eq!(p.next_hop(&g, w0, w2, FREE), Some(w1));
        assert_eq!(p.next_hop(&g, w1, w2, FREE), Some(w2), "adjacent goal is the hop");
    }

    #[test]
    fn same_waypoint_has_no_hop() {
        let (b, [w0, ..]) = super::helpers::two_lanes(WaypointKind::Transit);
        let g = b.build().unwrap();
        assert_eq!(AStarPlanner::default().next_hop(&g, w0, w0, FREE), None);
    }

    #[test]
    fn repeated_query_is_stable() {
        let (b, [w0, _, _, _, _, w5]) = super::helpers::two_lanes(WaypointKind::Transit);
        let g = b.build().unwrap();
        let p = AStarPlanner::default();
        let first = p.next_hop(&g, w0, w5, FREE);
        assert!(first.is_some());
        for _ in 0..5 {
            assert_eq!(p.next_hop(&g, w0, w5, FREE), first);
        }
    }

    #[test]
    fn congestion_reroutes() {
        let (b, [w0, w1, w2, w3, ..]) = super::helpers::two_lanes(WaypointKind::Transit);
        let mut g = b.build().unwrap();
        g.enter(w1, RobotId(4));
        let p = AStarPlanner::default();
        assert_eq!(p.next_hop(&g, w0, w2, FREE), Some(w3));
        assert_eq!(
            p.next_hop(&g, w0, w2, HopQuery::new(false, 0.0)),
            Some(w1),
            "zero penalty ignores traffic"
        );
    }

    #[test]
    fn congestion_never_penalises_the_goal() {
        let (b, [w0, w1, ..]) = super::helpers::two_lanes(WaypointKind::Transit);
        let mut g = b.build().unwrap();
        for r in 0..5 {
            g.enter(w1, RobotId(r));
        }
        assert_eq!(AStarPlanner::default().next_hop(&g, w0, w1, FREE), Some(w1));
    }

    #[test]
    fn carrying_robot_avoids_storage_slots() {
        let (b, [w0, w1, w2, w3, ..]) = super::helpers::two_lanes(WaypointKind::StorageSlot);
        let g = b.build().unwrap();
        let p = AStarPlanner::default();
        assert_eq!(p.next_hop(&g, w0, w2, FREE), Some(w1));
        assert_eq!(p.next_hop(&g, w0, w2, CARRYING), Some(w3));
        assert_eq!(p.next_hop(&g, w0, w1, CARRYING), Some(w1), "the goal slot is allowed");
    }

    #[test]
    fn one_way_edges_make_goal_unreachable() {
        let mut b = WaypointGraphBuilder::new();
        let a = b.add_waypoint(Vec2::new(0.0, 0.0), WaypointKind::Transit);
        let c = b.add_waypoint(Vec2::new(1.0, 0.0), WaypointKind::Transit);
        b.add_path(a, c);
        let g = b.build().unwrap();
        let p = AStarPlanner::default();
        assert_eq!(p.next_hop(&g, a, c, FREE), Some(c));
        assert_eq!(p.next_hop(&g, c, a, FREE), None);
    }

    #[test]
    fn budget_exhaustion_gives_no_hop() {
        let (b, [w0, _, _, _, _, w5]) = super::helpers::two_lanes(WaypointKind::Transit);
        let g = b.build().unwrap();
        assert_eq!(AStarPlanner::new(1).next_hop(&g, w0, w5, FREE), None);
        assert!(AStarPlanner::new(100).next_hop(&g, w0, w5, FREE).is_some());
    }

    #[test]
    fn ties_go_to_first_discovered() {
        // Diamond: two equal-cost routes from `s` to `t`.
        let diamond = |upper_first: bool| {
            let mut b = WaypointGraphBuilder::new();
            let s = b.add_waypoint(Vec2::new(0.0, 0.0), WaypointKind::Transit);
            let up = b.add_waypoint(Vec2::new(1.0, 1.0), WaypointKind::Transit);
            let down = b.add_waypoint(Vec2::new(1.0, -1.0), WaypointKind::Transit);
            let t = b.add_waypoint(Vec2::new(2.0, 0.0), WaypointKind::Transit);
            if upper_first {
                b.add_path(s, up);
                b.add_path(s, down);
            } else {
                b.add_path(s, down);
                b.add_path(s, up);
            }
            b.add_path(up, t);
            b.add_path(down, t);
            (b.build().unwrap(), s, up, down, t)
        };
        let p = AStarPlanner::default();

        let (g, s, up, _, t) = diamond(true);
        assert_eq!(p.next_hop(&g, s, t, FREE), Some(up));
        let (g, s, _, down, t) = diamond(false);
        assert_eq!(p.next_hop(&g, s, t, FREE), Some(down));
    }
}
