//! Unit and property tests for fl-spatial.

#[cfg(test)]
mod helpers {
    use fl_core::Circle;

    use crate::Quadtree;

    /// Twelve unit circles, three per quadrant of a 100 × 100 square.
    pub fn twelve_spread() -> Vec<(u32, Circle)> {
        let mut out = Vec::new();
        let corners = [(10.0, 10.0), (60.0, 10.0), (10.0, 60.0), (60.0, 60.0)];
        let mut id = 0;
        for (cx, cy) in corners {
            for k in 0..3 {
                out.push((id, Circle::new(cx + 10.0 * k as f32, cy + 5.0, 1.0)));
                id += 1;
            }
        }
        out
    }

    pub fn tree_with(items: &[(u32, Circle)]) -> Quadtree<u32> {
        let mut qt = Quadtree::new(100.0, 100.0);
        for (k, c) in items {
            assert!(qt.insert(*k, *c));
        }
        qt
    }
}

#[cfg(test)]
mod quadtree {
    use fl_core::{Circle, Vec2};

    use super::helpers::{tree_with, twelve_spread};
    use crate::Quadtree;

    #[test]
    fn splits_at_division_threshold() {
        let items = twelve_spread();
        let mut qt = tree_with(&items[..11]);
        assert_eq!(qt.leaf_count(), 1, "11 entities stay in one leaf");
        qt.insert(items[11].0, items[11].1);
        assert_eq!(qt.leaf_count(), 4, "the 12th entity splits the root");
        assert_eq!(qt.len(), 12);
    }

    #[test]
    fn merges_below_combine_threshold() {
        let items = twelve_spread();
        let mut qt = tree_with(&items);
        assert_eq!(qt.leaf_count(), 4);

        for (k, _) in &items[..4] {
            qt.remove(*k).unwrap();
        }
        assert_eq!(qt.len(), 8);
        assert_eq!(qt.leaf_count(), 4, "8 is not below the combine threshold");

        qt.remove(items[4].0).unwrap();
        assert_eq!(qt.len(), 7);
        assert_eq!(qt.leaf_count(), 1, "7 remaining entities fold back into one leaf");
    }

    #[test]
    fn duplicate_insert_rejected() {
        let mut qt = Quadtree::new(10.0, 10.0);
        assert!(qt.insert(1u32, Circle::new(5.0, 5.0, 1.0)));
        assert!(!qt.insert(1u32, Circle::new(2.0, 2.0, 1.0)));
        assert_eq!(qt.get(1).unwrap().center, Vec2::new(5.0, 5.0));
    }

    #[test]
    fn validate_move_is_inclusive_and_ignores_self() {
        let mut qt = Quadtree::new(20.0, 20.0);
        qt.insert(0u32, Circle::new(5.0, 5.0, 1.0));
        qt.insert(1u32, Circle::new(10.0, 5.0, 1.0));

        assert!(qt.validate_move(0, 5.5, 5.0), "overlapping its own old body is fine");
        assert!(!qt.validate_move(0, 8.0, 5.0), "touching (distance == 2r) collides");
        assert!(qt.validate_move(0, 7.9, 5.0));
        assert!(!qt.validate_move(7, 1.0, 1.0), "unknown keys are never valid");
    }

    #[test]
    fn validate_move_sees_across_quadrants() {
        let items = twelve_spread();
        let mut qt = tree_with(&items);
        // Entity 0 sits near (10, 15); put a neighbour right across the
        // vertical midline from a target spot.
        qt.insert(100, Circle::new(50.5, 40.0, 1.0));
        assert!(qt.leaf_count() >= 4);
        assert!(!qt.validate_move(0, 49.0, 40.0));
        assert!(qt.validate_move(0, 46.0, 40.0));
    }

    #[test]
    fn query_pads_by_largest_radius() {
        let mut qt = Quadtree::with_thresholds(100.0, 100.0, 2, 1);
        qt.insert(0u32, Circle::new(10.0, 10.0, 1.0));
        qt.insert(1u32, Circle::new(80.0, 80.0, 1.0));
        // A large body centred just right of the midline reaches back left.
        qt.insert(2u32, Circle::new(52.0, 20.0, 5.0));
        assert!(qt.leaf_count() > 1);

        let hits = qt.query_within(Vec2::new(46.0, 20.0), 1.5);
        assert_eq!(hits, vec![2]);
    }

    #[test]
    fn move_to_keeps_entity_findable() {
        let items = twelve_spread();
        let mut qt = tree_with(&items);
        assert!(qt.move_to(0, 90.0, 90.0));
        assert_eq!(qt.get(0).unwrap().center, Vec2::new(90.0, 90.0));
        assert!(qt.query_within(Vec2::new(90.0, 90.0), 0.5).contains(&0));
        assert!(!qt.query_within(Vec2::new(10.0, 15.0), 0.5).contains(&0));
        qt.rebalance();
        assert_eq!(qt.remove(0).unwrap().center, Vec2::new(90.0, 90.0));
        assert_eq!(qt.len(), 11);
    }

    #[test]
    fn coincident_entities_do_not_recurse_forever() {
        let mut qt = Quadtree::new(10.0, 10.0);
        for k in 0..20u32 {
            qt.insert(k, Circle::new(3.0, 3.0, 0.1));
        }
        assert_eq!(qt.len(), 20);
        assert_eq!(qt.query_within(Vec2::new(3.0, 3.0), 0.0).len(), 20);
    }
}

#[cfg(test)]
mod brute_force {
    use fl_core::{Circle, Vec2};
    use proptest::prelude::*;

    use crate::Quadtree;

    proptest! {
        #[test]
        fn query_matches_linear_scan(
            bodies in prop::collection::vec((1.0f32..99.0, 1.0f32..99.0, 0.2f32..1.5), 1..80),
            probe in (0.0f32..100.0, 0.0f32..100.0, 0.0f32..10.0),
        ) {
            let mut qt = Quadtree::new(100.0, 100.0);
            for (i, (x, y, r)) in bodies.iter().enumerate() {
                qt.insert(i as u32, Circle::new(*x, *y, *r));
            }
            let (px, py, pr) = probe;
            let mut got = qt.query_within(Vec2::new(px, py), pr);
            got.sort_unstable();
            let expected: Vec<u32> = bodies
                .iter()
                .enumerate()
                .filter(|(_, (x, y, r))| Circle::new(*x, *y, *r).collides_at(px, py, pr))
                .map(|(i, _)| i as u32)
                .collect();
            prop_assert_eq!(got, expected);
        }

        #[test]
        fn committed_moves_never_overlap(
            starts in prop::collection::vec((2.0f32..98.0, 2.0f32..98.0), 2..40),
            steps in prop::collection::vec((0usize..40, -3.0f32..3.0, -3.0f32..3.0), 1..200),
        ) {
            let mut qt = Quadtree::new(100.0, 100.0);
            for (i, (x, y)) in starts.iter().enumerate() {
                if qt.is_clear(*x, *y, 1.0, None) {
                    qt.insert(i as u32, Circle::new(*x, *y, 1.0));
                }
            }
            for (who, dx, dy) in steps {
                let key = (who % starts.len()) as u32;
                let Some(c) = qt.get(key).copied() else { continue };
                let (nx, ny) = (c.x() + dx, c.y() + dy);
                if qt.validate_move(key, nx, ny) {
                    qt.move_to(key, nx, ny);
                }
                qt.rebalance();
            }
            let all: Vec<(u32, Circle)> = qt.iter().map(|(k, c)| (k, *c)).collect();
            for (i, (ka, a)) in all.iter().enumerate() {
                for (kb, b) in &all[i + 1..] {
                    prop_assert!(!a.collides(b), "{} overlaps {}", ka, kb);
                }
            }
        }
    }
}

#[cfg(test)]
mod floor {
    use fl_core::{Circle, RobotId, ToteId};

    use crate::{Floor, SpatialError};

    fn floor() -> Floor {
        Floor::new(20.0, 10.0, 0.1, 12, 8)
    }

    #[test]
    fn placement_rejects_out_of_bounds_and_overlap() {
        let mut f = floor();
        f.add_robot(RobotId(0), Circle::new(1.0, 1.0, 0.5)).unwrap();
        assert!(matches!(
            f.add_robot(RobotId(1), Circle::new(0.2, 5.0, 0.5)),
            Err(SpatialError::OutOfBounds { .. })
        ));
        assert!(matches!(
            f.add_robot(RobotId(1), Circle::new(1.9, 1.0, 0.5)),
            Err(SpatialError::Overlap { .. })
        ));
    }

    #[test]
    fn totes_avoid_station_footprints() {
        let mut f = floor();
        f.add_station(Circle::new(5.0, 5.0, 1.0));
        assert!(f.add_tote(ToteId(0), Circle::new(5.5, 5.0, 0.3)).is_err());
        f.add_tote(ToteId(0), Circle::new(8.0, 5.0, 0.3)).unwrap();
        assert!(!f.is_valid_storage_location(ToteId(0), 6.0, 5.0));
        assert!(f.is_valid_storage_location(ToteId(0), 9.0, 5.0));
    }

    #[test]
    fn carried_tote_is_validated_before_commit() {
        let mut f = floor();
        f.add_robot(RobotId(0), Circle::new(2.0, 5.0, 0.4)).unwrap();
        f.add_tote(ToteId(0), Circle::new(2.0, 5.0, 0.3)).unwrap();
        f.add_tote(ToteId(1), Circle::new(4.0, 5.0, 0.3)).unwrap();

        // The robot alone could drive over tote 1, but not while carrying.
        assert!(f.is_valid_robot_move(RobotId(0), None, 3.6, 5.0));
        assert!(!f.move_robot(RobotId(0), Some(ToteId(0)), 3.6, 5.0));
        assert_eq!(f.robot(RobotId(0)).unwrap().x(), 2.0, "rejected move changes nothing");
        assert_eq!(f.tote(ToteId(0)).unwrap().x(), 2.0);

        assert!(f.move_robot(RobotId(0), Some(ToteId(0)), 3.0, 5.0));
        assert_eq!(f.robot(RobotId(0)).unwrap().x(), 3.0);
        assert_eq!(f.tote(ToteId(0)).unwrap().x(), 3.0);
    }

    #[test]
    fn robots_cannot_leave_the_floor() {
        let mut f = floor();
        f.add_robot(RobotId(0), Circle::new(1.0, 1.0, 0.5)).unwrap();
        assert!(!f.move_robot(RobotId(0), None, 0.4, 1.0));
        assert!(f.move_robot(RobotId(0), None, 0.5, 1.0));
    }
}
