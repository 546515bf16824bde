//! Run configuration.
//!
//! `SimConfig` is read once by `fl_sim::SimBuilder` and never mutated
//! afterwards.  It is a plain struct so applications can build it in code;
//! with the `serde` feature every section derives `Serialize`/`Deserialize`
//! and the tuning/content/output sections fall back to their defaults when
//! omitted from a config file.
//!
//! Units: distances in arena units, times in simulated seconds, velocities
//! in units per second.

use crate::{FlError, FlResult};

// ── Sections ──────────────────────────────────────────────────────────────────

/// Arena geometry.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ArenaConfig {
    pub width: f32,
    pub height: f32,
    /// Positional tolerance for pickups, setdowns, and station proximity.
    pub tolerance: f32,
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self { width: 24.0, height: 16.0, tolerance: 0.1 }
    }
}

/// Robot count, size, and kinematic limits.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FleetConfig {
    pub num_robots: usize,
    pub radius: f32,
    pub max_acceleration: f32,
    pub max_velocity: f32,
}

impl Default for FleetConfig {
    fn default() -> Self {
        Self { num_robots: 8, radius: 0.25, max_acceleration: 1.0, max_velocity: 1.0 }
    }
}

/// Tote count, size, capacity, and starting inventory.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ToteConfig {
    pub num_totes: usize,
    pub radius: f32,
    pub capacity: usize,
    /// Fraction of total tote capacity filled with random bundles at start.
    pub initial_inventory: f32,
}

impl Default for ToteConfig {
    fn default() -> Self {
        Self { num_totes: 60, radius: 0.25, capacity: 12, initial_inventory: 0.25 }
    }
}

/// Letter and word station parameters.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StationConfig {
    pub num_letter_stations: usize,
    pub num_word_stations: usize,
    pub radius: f32,
    /// Bundles a letter station can hold at once.
    pub letter_station_capacity: usize,
    /// Identical tiles per bundle.
    pub bundle_size: usize,
    /// Words a word station can work on at once.
    pub word_station_capacity: usize,
    /// Seconds to move one bundle from a letter station into a tote.
    pub letter_to_tote_time: f64,
    /// Seconds to move one tile from a tote into a word.
    pub tote_to_letter_time: f64,
    /// Seconds a word station is busy after finishing a word.
    pub word_completion_time: f64,
}

impl Default for StationConfig {
    fn default() -> Self {
        Self {
            num_letter_stations: 2,
            num_word_stations: 3,
            radius: 0.5,
            letter_station_capacity: 4,
            bundle_size: 3,
            word_station_capacity: 2,
            letter_to_tote_time: 1.0,
            tote_to_letter_time: 0.5,
            word_completion_time: 1.0,
        }
    }
}

/// Fixed blocking durations and run phases.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TimingConfig {
    pub tote_pickup_setdown_time: f64,
    pub collision_penalty_time: f64,
    pub warmup_time: f64,
    pub duration: f64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            tote_pickup_setdown_time: 1.0,
            collision_penalty_time: 0.5,
            warmup_time: 60.0,
            duration: 600.0,
        }
    }
}

/// Heuristic constants of the driver, planner, and spatial index.
///
/// These are tuned values rather than derived ones; the defaults reproduce
/// the reference fleet behaviour.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct DriverTuning {
    /// Evade distance as a multiple of the robot radius.
    pub evade_distance_factor: f32,
    /// Probability of waiting in place when only the planned next hop is
    /// blocked.
    pub evade_wait_probability: f64,
    /// Probability of leaving the evade state after a cruise interval.
    pub evade_exit_probability: f64,
    /// Consecutive stationary checks tolerated before a forced evasion.
    pub stuck_limit: u32,
    /// Lower bound on the speed/acceleration scale under frustration.
    pub frustration_floor: f32,
    /// Congestion penalty per en-route robot, as a multiple of the radius.
    pub congestion_penalty_factor: f32,
    /// A* node expansion budget.
    pub path_search_budget: usize,
    pub quadtree_division_threshold: usize,
    pub quadtree_combine_threshold: usize,
}

impl Default for DriverTuning {
    fn default() -> Self {
        Self {
            evade_distance_factor: 2.3,
            evade_wait_probability: 0.9,
            evade_exit_probability: 0.75,
            stuck_limit: 3,
            frustration_floor: 1.0 / 128.0,
            congestion_penalty_factor: 10.0,
            path_search_budget: 1000,
            quadtree_division_threshold: 12,
            quadtree_combine_threshold: 8,
        }
    }
}

/// Word/letter content generation.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ContentConfig {
    /// Registry key of the content source (`"dictionary"` or `"alphabet"`).
    pub source: String,
    /// Word list for the `"dictionary"` source.
    pub words: Vec<String>,
    /// Word length for the `"alphabet"` source.
    pub word_length: usize,
    /// Relative weight of each letter color; its length is the color count.
    pub color_weights: Vec<f32>,
    /// Words kept available for assignment to word stations.
    pub word_buffer: usize,
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            source: "dictionary".to_owned(),
            words: ["tote", "robot", "aisle", "crate", "shelf", "order", "stock", "route"]
                .iter()
                .map(|w| (*w).to_owned())
                .collect(),
            word_length: 5,
            color_weights: vec![1.0],
            word_buffer: 20,
        }
    }
}

/// Output cadence for observers that record snapshots.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct OutputConfig {
    /// Simulated seconds between robot snapshots; `0` disables snapshots.
    pub snapshot_interval: f64,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self { snapshot_interval: 10.0 }
    }
}

// ── SimConfig ─────────────────────────────────────────────────────────────────

/// The complete configuration of one run.
#[derive(Clone, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SimConfig {
    pub seed: u64,
    pub arena: ArenaConfig,
    pub fleet: FleetConfig,
    pub totes: ToteConfig,
    pub stations: StationConfig,
    pub timing: TimingConfig,
    #[cfg_attr(feature = "serde", serde(default))]
    pub tuning: DriverTuning,
    #[cfg_attr(feature = "serde", serde(default))]
    pub content: ContentConfig,
    #[cfg_attr(feature = "serde", serde(default))]
    pub output: OutputConfig,
}

impl SimConfig {
    /// Finest macro-step the clock will take.
    #[inline]
    pub fn min_granularity(&self) -> f64 {
        (self.arena.tolerance / 3.0 / self.fleet.max_velocity) as f64
    }

    /// Longest step over which two robots cannot tunnel through each other.
    #[inline]
    pub fn collision_horizon(&self) -> f64 {
        (1.8 * self.fleet.radius / self.fleet.max_velocity) as f64
    }

    #[inline]
    pub fn evade_distance(&self) -> f32 {
        self.tuning.evade_distance_factor * self.fleet.radius
    }

    /// Reject configurations the simulation cannot run with.
    pub fn validate(&self) -> FlResult<()> {
        fn positive(name: &str, v: f64) -> FlResult<()> {
            if v > 0.0 && v.is_finite() {
                Ok(())
            } else {
                Err(FlError::Config(format!("{name} must be positive, got {v}")))
            }
        }
        fn nonzero(name: &str, v: usize) -> FlResult<()> {
            if v > 0 { Ok(()) } else { Err(FlError::Config(format!("{name} must be non-zero"))) }
        }
        fn probability(name: &str, p: f64) -> FlResult<()> {
            if (0.0..=1.0).contains(&p) {
                Ok(())
            } else {
                Err(FlError::Config(format!("{name} must lie in [0, 1], got {p}")))
            }
        }

        positive("arena.width", self.arena.width as f64)?;
        positive("arena.height", self.arena.height as f64)?;
        positive("arena.tolerance", self.arena.tolerance as f64)?;
        positive("fleet.radius", self.fleet.radius as f64)?;
        positive("fleet.max_acceleration", self.fleet.max_acceleration as f64)?;
        positive("fleet.max_velocity", self.fleet.max_velocity as f64)?;
        positive("totes.radius", self.totes.radius as f64)?;
        positive("stations.radius", self.stations.radius as f64)?;
        nonzero("fleet.num_robots", self.fleet.num_robots)?;
        nonzero("totes.capacity", self.totes.capacity)?;
        nonzero("stations.num_letter_stations", self.stations.num_letter_stations)?;
        nonzero("stations.num_word_stations", self.stations.num_word_stations)?;
        nonzero("stations.bundle_size", self.stations.bundle_size)?;
        nonzero("stations.letter_station_capacity", self.stations.letter_station_capacity)?;
        nonzero("stations.word_station_capacity", self.stations.word_station_capacity)?;
        nonzero("content.color_weights", self.content.color_weights.len())?;
        nonzero("tuning.path_search_budget", self.tuning.path_search_budget)?;
        probability("totes.initial_inventory", self.totes.initial_inventory as f64)?;
        probability("tuning.evade_wait_probability", self.tuning.evade_wait_probability)?;
        probability("tuning.evade_exit_probability", self.tuning.evade_exit_probability)?;
        positive("tuning.frustration_floor", self.tuning.frustration_floor as f64)?;
        if self.tuning.frustration_floor > 1.0 {
            return Err(FlError::Config(format!(
                "tuning.frustration_floor must not exceed 1, got {}",
                self.tuning.frustration_floor
            )));
        }

        if self.stations.bundle_size > self.totes.capacity {
            return Err(FlError::Config(format!(
                "bundle size {} exceeds tote capacity {}",
                self.stations.bundle_size, self.totes.capacity
            )));
        }
        if self.tuning.quadtree_combine_threshold >= self.tuning.quadtree_division_threshold {
            return Err(FlError::Config(format!(
                "quadtree combine threshold {} must be below division threshold {}",
                self.tuning.quadtree_combine_threshold, self.tuning.quadtree_division_threshold
            )));
        }
        if self.timing.warmup_time < 0.0 || self.timing.duration < 0.0 {
            return Err(FlError::Config("run phases must not be negative".into()));
        }
        Ok(())
    }
}
