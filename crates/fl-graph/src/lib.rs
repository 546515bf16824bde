//! `fl-graph` — waypoint graph and next-hop planning.
//!
//! # Crate layout
//!
//! | Module      | Contents                                                     |
//! |-------------|--------------------------------------------------------------|
//! | [`graph`]   | `WaypointGraph` (CSR + R-tree), `WaypointGraphBuilder`       |
//! | [`planner`] | `HopPlanner` trait, `HopQuery`, `AStarPlanner`               |
//! | [`error`]   | `GraphError`, `GraphResult<T>`                               |

pub mod error;
pub mod graph;
pub mod planner;

#[cfg(test)]
mod tests;

pub use error::{GraphError, GraphResult};
pub use graph::{WaypointGraph, WaypointGraphBuilder, WaypointKind};
pub use planner::{AStarPlanner, DEFAULT_SEARCH_BUDGET, HopPlanner, HopQuery};
