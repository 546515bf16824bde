//! Macro-step sizing and the component registry.
//!
//! # Step rule
//!
//! ```text
//! next = min(end, earliest next_event_time, now + collision_horizon)
//! next = min(end, max(next, now + min_granularity))
//! ```
//!
//! The horizon keeps two robots from passing through each other within one
//! step; the granularity keeps a burst of near-simultaneous events from
//! stalling the clock.

use fl_core::{LetterStationId, RobotId, SimConfig, SimTime, WordStationId};

use crate::World;

/// Step bounds derived from the fleet kinematics.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Clock {
    pub min_granularity: f64,
    pub collision_horizon: f64,
}

impl Clock {
    pub fn from_config(cfg: &SimConfig) -> Self {
        Self { min_granularity: cfg.min_granularity(), collision_horizon: cfg.collision_horizon() }
    }

    /// End of the step that starts at `now`.
    pub fn next_step(&self, now: SimTime, earliest_event: SimTime, end: SimTime) -> SimTime {
        let next = end.min(earliest_event).min(now + self.collision_horizon);
        next.max(now + self.min_granularity).min(end)
    }
}

/// One tickable part of the world.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Component {
    Robot(RobotId),
    /// Index upkeep for the robot and tote quadtrees.
    Floor,
    WordOrders,
    LetterSupply,
    WordStation(WordStationId),
    LetterStation(LetterStationId),
}

impl Component {
    /// When this component next needs to act, or `NEVER`.
    pub fn next_event_time(self, world: &World, now: SimTime) -> SimTime {
        match self {
            Component::Robot(id) => world.robots.get(id).map_or(SimTime::NEVER, |r| r.next_event_time(now)),
            Component::Floor => SimTime::NEVER,
            Component::WordOrders => world.orders.next_event_time(now),
            Component::LetterSupply => world.supply.next_event_time(now),
            Component::WordStation(id) => {
                world.word_stations.get(id.index()).map_or(SimTime::NEVER, |s| s.next_event_time(now))
            }
            Component::LetterStation(id) => {
                world.letter_stations.get(id.index()).map_or(SimTime::NEVER, |s| s.next_event_time(now))
            }
        }
    }
}

/// Every component of `world` in the order they advance within a step:
/// robots, floor, word orders, letter supply, word stations, letter
/// stations.
pub fn registration_order(world: &World) -> Vec<Component> {
    let mut order = Vec::with_capacity(world.robots.len() + world.word_stations.len() + world.letter_stations.len() + 3);
    order.extend(world.robots.iter().map(|r| Component::Robot(r.id)));
    order.push(Component::Floor);
    order.push(Component::WordOrders);
    order.push(Component::LetterSupply);
    order.extend(world.word_stations.iter().map(|s| Component::WordStation(s.id)));
    order.extend(world.letter_stations.iter().map(|s| Component::LetterStation(s.id)));
    order
}
