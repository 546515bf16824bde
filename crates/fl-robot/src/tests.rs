//! Unit tests for fl-robot.
//!
//! Every test runs on the same small floor:
//!
//! ```text
//!   w0 ── w1 ── w2 ── w4 (letter station)     y = 5
//!         │     │
//!         w5    w3                            y = 7 (storage slots)
//! ```
//!
//! Tote 0 rests on w3.

#[cfg(test)]
mod fixture {
    use fl_core::{
        Circle, DriverTuning, FleetConfig, LetterStationId, RobotId, SimRng, SimTime, StationConfig, TimingConfig,
        ToteId, Vec2, WaypointId,
    };
    use fl_graph::{AStarPlanner, WaypointGraph, WaypointGraphBuilder, WaypointKind};
    use fl_spatial::Floor;
    use fl_stock::{LetterStation, Tote, ToteStore, WordStation};

    use crate::{DriveCtx, DriverEvent, Robot};

    pub const TOL: f32 = 0.5;

    pub struct Fixture {
        pub floor: Floor,
        pub graph: WaypointGraph,
        pub planner: AStarPlanner,
        pub totes: ToteStore,
        pub letters: Vec<LetterStation>,
        pub words: Vec<WordStation>,
        pub rng: SimRng,
        pub tuning: DriverTuning,
        pub timing: TimingConfig,
        pub fleet: FleetConfig,
        pub events: Vec<DriverEvent>,
        pub w: [WaypointId; 6],
    }

    impl Fixture {
        pub fn new() -> Self {
            let mut b = WaypointGraphBuilder::new();
            let w0 = b.add_waypoint(Vec2::new(2.0, 5.0), WaypointKind::Transit);
            let w1 = b.add_waypoint(Vec2::new(4.0, 5.0), WaypointKind::Transit);
            let w2 = b.add_waypoint(Vec2::new(6.0, 5.0), WaypointKind::Transit);
            let w3 = b.add_waypoint(Vec2::new(6.0, 7.0), WaypointKind::StorageSlot);
            let w4 = b.add_waypoint(Vec2::new(8.0, 5.0), WaypointKind::LetterStation(LetterStationId(0)));
            let w5 = b.add_waypoint(Vec2::new(4.0, 7.0), WaypointKind::StorageSlot);
            b.add_bidirectional(w0, w1);
            b.add_bidirectional(w1, w2);
            b.add_bidirectional(w2, w3);
            b.add_bidirectional(w2, w4);
            b.add_bidirectional(w1, w5);
            let mut graph = b.build().unwrap();

            let mut floor = Floor::new(20.0, 10.0, TOL, 12, 8);
            let mut totes = ToteStore::new();
            totes.push(Tote::new(ToteId(0), 12, w3)).unwrap();
            graph.tote_set_down(ToteId(0), w3).unwrap();
            floor.add_tote(ToteId(0), Circle::new(6.0, 7.0, 0.25)).unwrap();

            let stations = StationConfig::default();
            let letters = vec![LetterStation::new(LetterStationId(0), Circle::new(8.0, 5.0, 0.5), &stations)];

            Self {
                floor,
                graph,
                planner: AStarPlanner::default(),
                totes,
                letters,
                words: Vec::new(),
                rng: SimRng::new(7),
                tuning: DriverTuning::default(),
                timing: TimingConfig::default(),
                fleet: FleetConfig { num_robots: 1, radius: 0.25, max_acceleration: 1.0, max_velocity: 1.0 },
                events: Vec::new(),
                w: [w0, w1, w2, w3, w4, w5],
            }
        }

        /// A robot placed on the floor at `(x, y)`.
        pub fn robot(&mut self, id: u32, x: f32, y: f32) -> Robot {
            self.floor.add_robot(RobotId(id), Circle::new(x, y, self.fleet.radius)).unwrap();
            Robot::new(RobotId(id), Vec2::new(x, y), &self.fleet)
        }

        /// Hand tote 0 to `robot` as if it had been picked up earlier.
        pub fn give_tote(&mut self, robot: &mut Robot) {
            self.graph.tote_picked_up(ToteId(0));
            self.totes.get_mut(ToteId(0)).unwrap().owner = fl_stock::ToteOwner::Robot(robot.id);
            robot.carried = Some(ToteId(0));
            assert!(self.floor.move_robot(robot.id, Some(ToteId(0)), robot.pos.x, robot.pos.y));
        }

        pub fn ctx(&mut self, now: f64) -> DriveCtx<'_> {
            DriveCtx {
                now: SimTime(now),
                floor: &mut self.floor,
                graph: &mut self.graph,
                planner: &self.planner,
                totes: &mut self.totes,
                letter_stations: &mut self.letters,
                word_stations: &mut self.words,
                rng: &mut self.rng,
                tuning: &self.tuning,
                timing: &self.timing,
                events: &mut self.events,
            }
        }
    }
}

// ── Robot timers ──────────────────────────────────────────────────────────────

#[cfg(test)]
mod timers {
    use fl_core::{FleetConfig, RobotId, SimTime, Vec2};

    use crate::Robot;

    fn robot() -> Robot {
        let cfg = FleetConfig { num_robots: 1, radius: 0.25, max_acceleration: 2.0, max_velocity: 1.0 };
        Robot::new(RobotId(0), Vec2::new(1.0, 1.0), &cfg)
    }

    #[test]
    fn next_event_is_earliest_future_timer() {
        let mut r = robot();
        r.blocked_until = SimTime(5.0);
        r.accelerate_until = SimTime(2.0);
        r.cruise_until = SimTime(3.0);
        assert_eq!(r.next_event_time(SimTime(1.0)), SimTime(2.0));
        assert_eq!(r.next_event_time(SimTime(2.0)), SimTime(3.0), "timers at `now` are not pending");
        assert!(r.next_event_time(SimTime(6.0)).is_never());
    }

    #[test]
    fn target_speed_is_clamped_and_sets_acceleration_deadline() {
        let mut r = robot();
        r.set_target_speed(5.0, SimTime(1.0));
        assert_eq!(r.target_speed(), 1.0);
        // |Δv| = 1 at 2 units/s² takes half a second.
        assert_eq!(r.accelerate_until, SimTime(1.5));
    }

    #[test]
    fn heading_change_keeps_target_speed() {
        let mut r = robot();
        r.set_target_speed(0.5, SimTime::ZERO);
        r.set_heading(std::f32::consts::FRAC_PI_2, SimTime::ZERO);
        assert!((r.target_speed() - 0.5).abs() < 1e-6);
        assert!(r.target_velocity.x.abs() < 1e-6);
        assert!((r.target_velocity.y - 0.5).abs() < 1e-6);
    }

    #[test]
    fn wait_until_only_extends() {
        let mut r = robot();
        r.wait_until(SimTime(4.0));
        r.wait_until(SimTime(2.0));
        assert_eq!(r.blocked_until, SimTime(4.0));
        assert!(r.is_blocked(SimTime(3.9)));
        assert!(!r.is_blocked(SimTime(4.0)));
    }
}

// ── Kinematics & collisions ───────────────────────────────────────────────────

#[cfg(test)]
mod kinematics {
    use fl_core::{SimTime, Vec2};

    use super::fixture::Fixture;
    use crate::{Step, advance};

    #[test]
    fn acceleration_limits_velocity_change() {
        let mut fx = Fixture::new();
        let mut r = fx.robot(0, 2.0, 2.0);
        r.target_velocity = Vec2::new(1.0, 0.0);
        let step = advance(&mut r, SimTime::ZERO, &mut fx.ctx(0.5));
        assert_eq!(step, Step::Idle);
        assert!((r.velocity.x - 0.5).abs() < 1e-6);
        assert!((r.pos.x - 2.25).abs() < 1e-5);
        assert_eq!(fx.floor.robot(r.id).unwrap().center, r.pos);
        assert!(fx.floor.robot(r.id).unwrap().moving);
    }

    #[test]
    fn speed_is_clamped_to_maximum() {
        let mut fx = Fixture::new();
        let mut r = fx.robot(0, 2.0, 2.0);
        r.velocity = Vec2::new(1.0, 0.0);
        r.target_velocity = Vec2::new(5.0, 0.0);
        advance(&mut r, SimTime::ZERO, &mut fx.ctx(0.5));
        assert!((r.speed() - 1.0).abs() < 1e-6);
        assert!((r.stats.distance - 0.5).abs() < 1e-5);
    }

    #[test]
    fn rejected_move_stops_and_blocks() {
        let mut fx = Fixture::new();
        let mut r = fx.robot(0, 2.0, 2.0);
        let _other = fx.robot(1, 2.6, 2.0);
        r.velocity = Vec2::new(1.0, 0.0);
        r.target_velocity = Vec2::new(1.0, 0.0);

        let step = advance(&mut r, SimTime::ZERO, &mut fx.ctx(0.2));
        assert_eq!(step, Step::Collided);
        assert_eq!(r.velocity, Vec2::ZERO);
        assert_eq!(r.target_velocity, Vec2::ZERO);
        assert_eq!(r.pos, Vec2::new(2.0, 2.0), "nothing moves on rejection");
        assert_eq!(r.stats.collisions, 1);
        let penalty = fx.timing.collision_penalty_time;
        assert_eq!(r.blocked_until, SimTime(0.2 + penalty));

        assert_eq!(advance(&mut r, SimTime(0.2), &mut fx.ctx(0.3)), Step::Blocked);
    }
}

// ── Tote pickup & setdown ─────────────────────────────────────────────────────

#[cfg(test)]
mod handling {
    use fl_core::{SimTime, ToteId, Vec2};
    use fl_stock::ToteOwner;

    use super::fixture::{Fixture, TOL};
    use crate::driver::act;
    use crate::{DriveState, DriverEvent, Step, Task, advance};

    #[test]
    fn pickup_within_inclusive_tolerance() {
        let mut fx = Fixture::new();
        let slot = fx.w[3];
        let mut r = fx.robot(0, 6.0 + TOL, 7.0);
        r.task = Some(Task::StoreTote { tote: ToteId(0), slot: fx.w[5] });
        r.states.push_back(DriveState::PickupTote(ToteId(0)));

        act(&mut r, &mut fx.ctx(1.0));

        assert_eq!(r.carried, Some(ToteId(0)));
        assert_eq!(r.pos, Vec2::new(6.0, 7.0), "robot snaps onto the tote");
        assert_eq!(r.stats.pickups, 1);
        assert_eq!(r.blocked_until, SimTime(1.0 + fx.timing.tote_pickup_setdown_time));
        assert_eq!(fx.totes.get(ToteId(0)).unwrap().owner, ToteOwner::Transit(r.id));
        assert_eq!(fx.graph.resident_tote(slot), None);
        assert_eq!(fx.events, vec![DriverEvent::TotePickedUp { robot: r.id, tote: ToteId(0), slot: Some(slot) }]);

        // The handoff completes once the block ends.
        assert_eq!(advance(&mut r, SimTime(1.0), &mut fx.ctx(1.5)), Step::Blocked);
        advance(&mut r, SimTime(1.0), &mut fx.ctx(3.0));
        assert_eq!(fx.totes.get(ToteId(0)).unwrap().owner, ToteOwner::Robot(r.id));
    }

    fn assert_pickup_aborts(fx: &mut Fixture, r: &mut crate::Robot) {
        let task = Task::StoreTote { tote: ToteId(0), slot: fx.w[5] };
        r.task = Some(task);
        r.states.push_back(DriveState::PickupTote(ToteId(0)));
        r.states.push_back(DriveState::SetdownTote(fx.w[5]));
        act(r, &mut fx.ctx(1.0));
        assert!(r.is_idle());
        assert_eq!(r.task, None);
        assert_eq!(fx.events.last(), Some(&DriverEvent::TaskAborted { robot: r.id, task }));
        assert_eq!(fx.graph.resident_tote(fx.w[3]), Some(ToteId(0)), "tote stays put");
    }

    #[test]
    fn pickup_out_of_range_aborts() {
        let mut fx = Fixture::new();
        let mut r = fx.robot(0, 6.0 + 1.5 * TOL, 7.0);
        assert_pickup_aborts(&mut fx, &mut r);
    }

    #[test]
    fn pickup_while_moving_aborts() {
        let mut fx = Fixture::new();
        let mut r = fx.robot(0, 6.0, 7.0);
        r.velocity = Vec2::new(0.1, 0.0);
        assert_pickup_aborts(&mut fx, &mut r);
    }

    #[test]
    fn pickup_while_carrying_aborts() {
        let mut fx = Fixture::new();
        let mut r = fx.robot(0, 6.0, 7.0);
        r.carried = Some(ToteId(9));
        assert_pickup_aborts(&mut fx, &mut r);
    }

    #[test]
    fn setdown_on_free_slot() {
        let mut fx = Fixture::new();
        let target = fx.w[5];
        let mut r = fx.robot(0, 6.0, 7.0);
        fx.give_tote(&mut r);
        // Carry the tote over to the free slot.
        assert!(fx.floor.move_robot(r.id, Some(ToteId(0)), 4.0, 7.0));
        r.pos = Vec2::new(4.0, 7.0);
        r.task = Some(Task::StoreTote { tote: ToteId(0), slot: target });
        r.states.push_back(DriveState::SetdownTote(target));

        act(&mut r, &mut fx.ctx(2.0));

        assert_eq!(r.carried, None);
        assert_eq!(r.stats.setdowns, 1);
        assert_eq!(fx.graph.resident_tote(target), Some(ToteId(0)));
        assert_eq!(fx.graph.tote_waypoint(ToteId(0)), Some(target));
        assert_eq!(fx.events, vec![DriverEvent::ToteSetDown { robot: r.id, tote: ToteId(0), slot: target }]);

        advance(&mut r, SimTime(2.0), &mut fx.ctx(10.0));
        assert_eq!(fx.totes.get(ToteId(0)).unwrap().owner, ToteOwner::Slot(target));
    }
}

// ── Task planning ─────────────────────────────────────────────────────────────

#[cfg(test)]
mod planning {
    use fl_core::{LetterStationId, TileId, ToteId, WaypointId, WordId, WordStationId};
    use fl_stock::Letter;

    use super::fixture::Fixture;
    use crate::{Destination, DriveState, DriverEvent, MoveState, Task, assign_task};

    fn destinations(states: &std::collections::VecDeque<DriveState>) -> Vec<String> {
        states
            .iter()
            .map(|s| match s {
                DriveState::Move(MoveState { destination: Some(w), .. }) => format!("Move {}", w.0),
                other => other.name().to_owned(),
            })
            .collect()
    }

    #[test]
    fn store_tote_fetches_then_stores() {
        let mut fx = Fixture::new();
        let mut r = fx.robot(0, 2.0, 5.0);
        let task = Task::StoreTote { tote: ToteId(0), slot: fx.w[5] };
        assign_task(&mut r, Some(task), &mut fx.ctx(0.0));
        assert_eq!(r.task, Some(task));
        assert_eq!(destinations(&r.states), vec!["Move 3", "PickupTote", "Move 5", "SetdownTote"]);
    }

    #[test]
    fn letter_pickup_plan() {
        let mut fx = Fixture::new();
        let mut r = fx.robot(0, 2.0, 5.0);
        let task = Task::PickupAtLetterStation {
            tote: ToteId(0),
            tile: TileId(0),
            letter: Letter::new('a', 0),
            station: LetterStationId(0),
        };
        assign_task(&mut r, Some(task), &mut fx.ctx(0.0));
        assert_eq!(destinations(&r.states), vec!["Move 3", "PickupTote", "Move 4", "RequestLetterFromStation"]);
    }

    #[test]
    fn carried_tote_skips_fetch() {
        let mut fx = Fixture::new();
        let mut r = fx.robot(0, 6.0, 7.0);
        fx.give_tote(&mut r);
        let task = Task::StoreTote { tote: ToteId(0), slot: fx.w[5] };
        assign_task(&mut r, Some(task), &mut fx.ctx(0.0));
        assert_eq!(destinations(&r.states), vec!["Move 5", "SetdownTote"]);
    }

    #[test]
    fn carrying_another_tote_aborts() {
        let mut fx = Fixture::new();
        let mut r = fx.robot(0, 2.0, 5.0);
        r.carried = Some(ToteId(4));
        let task = Task::StoreTote { tote: ToteId(0), slot: fx.w[5] };
        assign_task(&mut r, Some(task), &mut fx.ctx(0.0));
        assert!(r.is_idle());
        assert_eq!(r.task, None);
        assert_eq!(fx.events, vec![DriverEvent::TaskAborted { robot: r.id, task }]);
    }

    #[test]
    fn station_without_waypoint_aborts() {
        let mut fx = Fixture::new();
        let mut r = fx.robot(0, 2.0, 5.0);
        let task = Task::DeliverToWordStation {
            tote: ToteId(0),
            tile: TileId(0),
            letter: Letter::new('a', 0),
            station: WordStationId(0),
            word: WordId(0),
        };
        assign_task(&mut r, Some(task), &mut fx.ctx(0.0));
        assert_eq!(r.task, None);
        assert_eq!(fx.events.len(), 1);
    }

    #[test]
    fn unknown_waypoint_aborts_and_none_idles() {
        let mut fx = Fixture::new();
        let mut r = fx.robot(0, 2.0, 5.0);
        assign_task(&mut r, Some(Task::Move(Destination::Waypoint(WaypointId(99)))), &mut fx.ctx(0.0));
        assert!(r.is_idle());
        assign_task(&mut r, None, &mut fx.ctx(0.0));
        assert!(r.is_idle());
        assert_eq!(fx.events.len(), 1, "an empty assignment is not an abort");
    }
}

// ── Move state ────────────────────────────────────────────────────────────────

#[cfg(test)]
mod moving {
    use fl_core::Vec2;

    use fl_graph::AStarPlanner;

    use super::fixture::Fixture;
    use crate::driver::act;
    use crate::{Destination, DriveState, DriverEvent, MoveState, Task, assign_task, set_current_waypoint};

    fn waypoint_move(fx: &Fixture, to: usize) -> DriveState {
        DriveState::Move(MoveState { target: fx.graph.position(fx.w[to]), destination: Some(fx.w[to]) })
    }

    #[test]
    fn arrival_at_destination_completes() {
        let mut fx = Fixture::new();
        let mut r = fx.robot(0, 4.0, 5.0);
        set_current_waypoint(&mut r, Some(fx.w[1]), &mut fx.graph);
        r.frustration = 0.5;
        r.states.push_back(waypoint_move(&fx, 1));
        act(&mut r, &mut fx.ctx(0.0));
        assert!(r.is_idle());
        assert_eq!(r.frustration, 0.0);
    }

    #[test]
    fn arrival_at_intermediate_takes_next_hop() {
        let mut fx = Fixture::new();
        let mut r = fx.robot(0, 2.0, 5.0);
        set_current_waypoint(&mut r, Some(fx.w[0]), &mut fx.graph);
        r.states.push_back(waypoint_move(&fx, 2));
        act(&mut r, &mut fx.ctx(0.0));

        assert_eq!(r.current_waypoint, Some(fx.w[1]));
        assert_eq!(fx.graph.en_route_count(fx.w[0]), 0);
        assert_eq!(fx.graph.en_route_count(fx.w[1]), 1);
        match r.states.front() {
            Some(DriveState::Move(mv)) => assert_eq!(mv.target, Vec2::new(4.0, 5.0)),
            other => panic!("expected a move, got {other:?}"),
        }
    }

    #[test]
    fn off_graph_robot_snaps_to_closest_waypoint() {
        let mut fx = Fixture::new();
        let mut r = fx.robot(0, 4.2, 5.3);
        r.states.push_back(waypoint_move(&fx, 2));
        act(&mut r, &mut fx.ctx(0.0));
        assert_eq!(r.current_waypoint, Some(fx.w[1]));
        assert!(fx.graph.is_en_route(fx.w[1], r.id));
    }

    #[test]
    fn no_route_drops_the_task() {
        let mut fx = Fixture::new();
        fx.planner = AStarPlanner::new(0);
        let mut r = fx.robot(0, 2.0, 5.0);
        set_current_waypoint(&mut r, Some(fx.w[0]), &mut fx.graph);
        let task = Task::Move(Destination::Waypoint(fx.w[2]));
        assign_task(&mut r, Some(task), &mut fx.ctx(0.0));
        act(&mut r, &mut fx.ctx(0.0));

        assert!(r.is_idle());
        assert_eq!(r.task, None);
        assert_eq!(r.current_waypoint, Some(fx.w[0]));
        assert_eq!(fx.events, vec![DriverEvent::TaskAborted { robot: r.id, task }]);
    }

    #[test]
    fn misaligned_heading_turns_in_place() {
        let mut fx = Fixture::new();
        let mut r = fx.robot(0, 2.0, 2.0);
        r.states.push_back(DriveState::Move(MoveState { target: Vec2::new(2.0, 6.0), destination: None }));
        act(&mut r, &mut fx.ctx(0.0));
        assert!((r.heading - std::f32::consts::FRAC_PI_2).abs() < 1e-5);
        assert_eq!(r.target_speed(), 0.0);
        assert_eq!(r.states.len(), 1);
    }

    #[test]
    fn aligned_heading_accelerates_toward_target() {
        let mut fx = Fixture::new();
        let mut r = fx.robot(0, 2.0, 2.0);
        r.states.push_back(DriveState::Move(MoveState { target: Vec2::new(8.0, 2.0), destination: None }));
        act(&mut r, &mut fx.ctx(0.0));
        assert_eq!(r.target_speed(), r.max_velocity);
        assert!(r.cruise_until > fl_core::SimTime::ZERO);
    }
}

// ── Station requests ──────────────────────────────────────────────────────────

#[cfg(test)]
mod stations {
    use fl_core::{LetterStationId, RobotId, SimTime, ToteId};
    use fl_stock::{Letter, TileMint};

    use super::fixture::Fixture;
    use crate::driver::act;
    use crate::{DriveState, DriverEvent, RobotStore, Task};

    fn from_station(tile: fl_core::TileId, requested: bool) -> DriveState {
        DriveState::RequestLetterFromStation { station: LetterStationId(0), tile, requested }
    }

    #[test]
    fn request_waits_for_transfer_then_finishes() {
        let mut fx = Fixture::new();
        let mut mint = TileMint::new();
        let bundle = mint.mint_bundle(Letter::new('q', 0), 3);
        let head = bundle[0].id;
        assert!(fx.letters[0].add_bundle(bundle));

        let mut r = fx.robot(0, 8.0, 5.0);
        fx.give_tote(&mut r);
        r.states.push_back(from_station(head, false));
        act(&mut r, &mut fx.ctx(0.0));
        assert_eq!(r.states.front(), Some(&from_station(head, true)));
        assert_eq!(fx.letters[0].queue_len(), 1);

        let mut store = RobotStore::new();
        store.push(r);
        let transfer = fx.letters[0].advance(SimTime::ZERO, SimTime(0.1), &mut fx.totes, &mut store);
        assert!(transfer.is_some());
        assert_eq!(fx.totes.get(ToteId(0)).unwrap().len(), 3);

        let r = store.get_mut(RobotId(0)).unwrap();
        assert!(r.is_blocked(SimTime(0.5)));
        act(r, &mut fx.ctx(2.0));
        assert!(r.is_idle());
    }

    #[test]
    fn dropped_request_aborts() {
        let mut fx = Fixture::new();
        let mut r = fx.robot(0, 8.0, 5.0);
        fx.give_tote(&mut r);
        let task = Task::PickupAtLetterStation {
            tote: ToteId(0),
            tile: fl_core::TileId(42),
            letter: Letter::new('z', 0),
            station: LetterStationId(0),
        };
        r.task = Some(task);
        r.states.push_back(from_station(fl_core::TileId(42), true));
        act(&mut r, &mut fx.ctx(1.0));
        assert!(r.is_idle());
        assert_eq!(fx.events, vec![DriverEvent::TaskAborted { robot: r.id, task }]);
    }

    #[test]
    fn far_from_station_moves_to_center_first() {
        let mut fx = Fixture::new();
        let mut r = fx.robot(0, 7.0, 5.0);
        fx.give_tote(&mut r);
        r.states.push_back(from_station(fl_core::TileId(0), false));
        act(&mut r, &mut fx.ctx(0.0));
        assert_eq!(r.states.len(), 2);
        match r.states.front() {
            Some(DriveState::Move(mv)) => {
                assert_eq!(mv.destination, None);
                assert_eq!(mv.target, fl_core::Vec2::new(8.0, 5.0));
            }
            other => panic!("expected a point move, got {other:?}"),
        }
        assert_eq!(r.states.get(1), Some(&from_station(fl_core::TileId(0), false)));
        assert_eq!(fx.letters[0].queue_len(), 0, "no request from afar");
    }
}

// ── Evasion ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod evasion {
    use std::f32::consts::PI;

    use fl_core::{Vec2, angle_difference};

    use super::fixture::Fixture;
    use crate::driver::act;
    use crate::{DriveState, MoveState, best_evade_heading};

    #[test]
    fn single_neighbour_flee_opposite() {
        let mut fx = Fixture::new();
        let r = fx.robot(0, 10.0, 5.0);
        let _other = fx.robot(1, 11.0, 5.0);
        let h = best_evade_heading(&r, 2.0, &fx.floor);
        assert!(angle_difference(h, PI).abs() < 1e-4, "heading {h}");
    }

    #[test]
    fn wall_only_points_away_from_wall() {
        let mut fx = Fixture::new();
        let r = fx.robot(0, 1.0, 5.0);
        let h = best_evade_heading(&r, 2.0, &fx.floor);
        assert!(angle_difference(h, 0.0).abs() < 1e-4, "heading {h}");
    }

    #[test]
    fn nothing_visible_keeps_heading() {
        let mut fx = Fixture::new();
        let mut r = fx.robot(0, 10.0, 5.0);
        r.heading = 1.0;
        assert_eq!(best_evade_heading(&r, 2.0, &fx.floor), 1.0);
    }

    #[test]
    fn robot_ahead_triggers_evade_state() {
        let mut fx = Fixture::new();
        fx.tuning.evade_distance_factor = 4.0;
        let mut r = fx.robot(0, 10.0, 5.0);
        let _other = fx.robot(1, 10.8, 5.0);
        r.states.push_back(DriveState::Move(MoveState { target: Vec2::new(16.0, 5.0), destination: None }));
        act(&mut r, &mut fx.ctx(0.0));

        assert_eq!(r.states.front(), Some(&DriveState::Evade));
        assert_eq!(r.states.len(), 2);
        assert_eq!(r.stats.evasions, 1);
        assert!(angle_difference(r.heading, PI).abs() < 1e-4);
        assert_eq!(r.target_speed(), r.max_velocity);
    }

    #[test]
    fn robot_behind_is_ignored() {
        let mut fx = Fixture::new();
        fx.tuning.evade_distance_factor = 4.0;
        let mut r = fx.robot(0, 10.0, 5.0);
        let _other = fx.robot(1, 9.2, 5.0);
        r.states.push_back(DriveState::Move(MoveState { target: Vec2::new(16.0, 5.0), destination: None }));
        act(&mut r, &mut fx.ctx(0.0));
        assert!(matches!(r.states.front(), Some(DriveState::Move(_))));
        assert_eq!(r.stats.evasions, 0);
    }
}
