//! `fl-core` — foundational types for the `rust_fleet` warehouse simulator.
//!
//! Every other `fl-*` crate depends on this one.  It has no `fl-*`
//! dependencies and only `rand` and `thiserror` externally, plus optional
//! `serde`.
//!
//! # What lives here
//!
//! | Module       | Contents                                                   |
//! |--------------|------------------------------------------------------------|
//! | [`ids`]      | `RobotId`, `ToteId`, `WaypointId`, `EdgeId`, station ids, … |
//! | [`geo`]      | `Vec2`, `Circle`, angle helpers                            |
//! | [`time`]     | `SimTime`                                                  |
//! | [`rng`]      | `SimRng` (one shared generator per run)                    |
//! | [`config`]   | `SimConfig` and its nested sections                        |
//! | [`error`]    | `FlError`, `FlResult`                                      |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to ids, geometry, time and  |
//! |         | configuration.                                             |

pub mod config;
pub mod error;
pub mod geo;
pub mod ids;
pub mod rng;
pub mod time;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use config::{
    ArenaConfig, ContentConfig, DriverTuning, FleetConfig, OutputConfig, SimConfig,
    StationConfig, TimingConfig, ToteConfig,
};
pub use error::{FlError, FlResult};
pub use geo::{Circle, Vec2, angle_difference, normalize_angle};
pub use ids::{
    EdgeId, LetterStationId, RobotId, TileId, ToteId, WaypointId, WordId, WordStationId,
};
pub use rng::SimRng;
pub use time::SimTime;
