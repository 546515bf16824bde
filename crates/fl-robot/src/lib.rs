//! `fl-robot` — robots and the driver that moves them.
//!
//! A robot holds one [`Task`] at a time and expands it into a queue of
//! [`DriveState`]s.  The [`driver`] advances each robot once per step:
//! kinematics first, then the front state.
//!
//! # Crate layout
//!
//! | Module     | Contents                                                    |
//! |------------|-------------------------------------------------------------|
//! | [`task`]   | `Task`, `Destination`                                       |
//! | [`state`]  | `DriveState`, `MoveState`                                   |
//! | [`robot`]  | `Robot`, `RobotStats`, `Handoff`                            |
//! | [`store`]  | `RobotStore` (also the stations' view of the fleet)         |
//! | [`driver`] | `advance`, `assign_task`, evasion, `DriveCtx`, `DriverEvent`|

pub mod driver;
pub mod robot;
pub mod state;
pub mod store;
pub mod task;

#[cfg(test)]
mod tests;

pub use driver::{DriveCtx, DriverEvent, Step, advance, assign_task, best_evade_heading, set_current_waypoint};
pub use robot::{Handoff, Robot, RobotStats};
pub use state::{DriveState, MoveState};
pub use store::RobotStore;
pub use task::{Destination, Task};
