//! The world arena: every piece of simulation state, in one place.

use fl_alloc::Allocator;
use fl_core::{SimConfig, SimRng, SimTime};
use fl_graph::{HopPlanner, WaypointGraph};
use fl_robot::{DriveCtx, DriverEvent, RobotStore};
use fl_spatial::Floor;
use fl_stock::{LetterStation, TileMint, ToteStore, WordStation};

use crate::content::ContentSource;
use crate::orders::{LetterSupply, WordOrders};

/// All simulation state.  Entities live in arena `Vec`s addressed by typed
/// ids; nothing holds a reference to anything else.
///
/// Built by [`SimBuilder`][crate::SimBuilder]; observers see it read-only.
pub struct World {
    /// Run configuration, validated once at build time.
    pub config: SimConfig,

    /// Current simulated time.
    pub now: SimTime,

    /// Start of the statistics window (`0`, or the last reset).
    pub stats_since: SimTime,

    /// Arena bounds, station footprints, and the robot / tote indices.
    pub floor: Floor,

    /// Waypoints, storage-slot residency, and en-route sets.
    pub graph: WaypointGraph,

    pub totes: ToteStore,

    pub robots: RobotStore,

    pub letter_stations: Vec<LetterStation>,

    pub word_stations: Vec<WordStation>,

    /// Resource pools, request queues, and one agent per robot.
    pub allocator: Allocator,

    pub orders: WordOrders,

    pub supply: LetterSupply,

    pub mint: TileMint,

    pub content: Box<dyn ContentSource>,

    /// The run's only random number generator.
    pub rng: SimRng,

    /// Scratch buffer for driver events; empty between robot advances.
    pub(crate) events: Vec<DriverEvent>,
}

impl World {
    /// Split the world into the robot arena, the allocator, and a driver
    /// context over everything else.
    pub(crate) fn split<'a>(
        &'a mut self,
        planner: &'a dyn HopPlanner,
        now: SimTime,
    ) -> (&'a mut RobotStore, &'a mut Allocator, DriveCtx<'a>) {
        let ctx = DriveCtx {
            now,
            floor: &mut self.floor,
            graph: &mut self.graph,
            planner,
            totes: &mut self.totes,
            letter_stations: &mut self.letter_stations,
            word_stations: &mut self.word_stations,
            rng: &mut self.rng,
            tuning: &self.config.tuning,
            timing: &self.config.timing,
            events: &mut self.events,
        };
        (&mut self.robots, &mut self.allocator, ctx)
    }

    /// Seconds in the current statistics window.
    pub fn measured_time(&self) -> f64 {
        self.now - self.stats_since
    }
}
