//! Run summary: report data for the current statistics window.

use std::collections::BTreeMap;

use crate::World;

/// Allocator pool sizes at the moment of collection.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct PoolSizes {
    pub unreserved_totes: usize,
    pub reserved_totes: usize,
    pub free_slots: usize,
    pub occupied_slots: usize,
    pub pickup_requests: usize,
    pub delivery_requests: usize,
}

/// Fleet-wide totals and rates since the last statistics reset.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Summary {
    /// Length of the statistics window in seconds.
    pub elapsed: f64,
    pub robots: usize,

    pub pickups: u64,
    pub setdowns: u64,
    pub collisions: u64,
    pub evasions: u64,
    pub distance: f64,

    /// Share of robot-time spent in each sub-state.
    pub state_fractions: BTreeMap<&'static str, f64>,
    /// Share of robot-time spent on each task kind.
    pub task_fractions: BTreeMap<&'static str, f64>,

    pub words_completed: u64,
    /// Words completed per second.
    pub word_rate: f64,
    pub letters_delivered: u64,
    pub bundles_issued: u64,

    /// Mean fraction of the window each station was free to work.
    pub letter_station_idle: f64,
    pub word_station_idle: f64,

    pub tote_utilization: f64,
    pub pools: PoolSizes,
}

impl Summary {
    pub fn collect(world: &World) -> Self {
        let elapsed = world.measured_time();
        let robots = world.robots.len();
        let per = |x: f64, d: f64| if d > 0.0 { x / d } else { 0.0 };

        let mut s = Summary { elapsed, robots, ..Summary::default() };
        for r in world.robots.iter() {
            s.pickups += r.stats.pickups;
            s.setdowns += r.stats.setdowns;
            s.collisions += r.stats.collisions;
            s.evasions += r.stats.evasions;
            s.distance += r.stats.distance;
            for (name, t) in &r.stats.state_time {
                *s.state_fractions.entry(*name).or_insert(0.0) += *t;
            }
            for (name, t) in &r.stats.task_time {
                *s.task_fractions.entry(*name).or_insert(0.0) += *t;
            }
        }
        let robot_time = elapsed * robots as f64;
        for v in s.state_fractions.values_mut().chain(s.task_fractions.values_mut()) {
            *v = per(*v, robot_time);
        }

        let orders = &world.orders.stats;
        s.words_completed = orders.words_completed;
        s.word_rate = per(orders.words_completed as f64, elapsed);
        s.letters_delivered = orders.letters_delivered;
        s.bundles_issued = world.supply.bundles_issued;

        let idle = |times: Vec<f64>| per(times.iter().sum::<f64>(), elapsed * times.len() as f64);
        s.letter_station_idle = idle(world.letter_stations.iter().map(|st| st.stats.idle_time).collect());
        s.word_station_idle = idle(world.word_stations.iter().map(|st| st.stats.idle_time).collect());

        s.tote_utilization = world.totes.utilization();
        let pools = &world.allocator.pools;
        s.pools = PoolSizes {
            unreserved_totes: pools.unreserved_totes(),
            reserved_totes: pools.reserved_totes(),
            free_slots: pools.free_slots(),
            occupied_slots: pools.occupied_slots(),
            pickup_requests: pools.pickup_requests().len(),
            delivery_requests: pools.delivery_requests().len(),
        };
        s
    }
}
