//! `fl-spatial` — collision indexing for the `rust_fleet` simulator.
//!
//! | Module        | Contents                                                |
//! |---------------|---------------------------------------------------------|
//! | [`quadtree`]  | `Quadtree<K>`: balancing quadtree over circular bodies  |
//! | [`floor`]     | `Floor`: arena bounds, stations, robot and tote indices |
//! | [`error`]     | `SpatialError`, `SpatialResult`                         |

pub mod error;
pub mod floor;
pub mod quadtree;

#[cfg(test)]
mod tests;

pub use error::{SpatialError, SpatialResult};
pub use floor::Floor;
pub use quadtree::{DEFAULT_COMBINE_THRESHOLD, DEFAULT_DIVISION_THRESHOLD, Quadtree};
