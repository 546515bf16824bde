//! `fl-alloc` — greedy task allocation.
//!
//! Robots are passive consumers: when one goes idle the simulation asks the
//! [`Allocator`] for its next [`Task`](fl_robot::Task), and feeds every
//! [`DriverEvent`](fl_robot::DriverEvent) back through
//! [`Allocator::apply`] within the same robot advance.
//!
//! # Crate layout
//!
//! | Module        | Contents                                                  |
//! |---------------|-----------------------------------------------------------|
//! | [`pools`]     | `ResourcePools`, `PickupRequest`, `DeliveryRequest`       |
//! | [`allocator`] | `Allocator`, `Agent`, `AllocParams`, `AllocCtx`           |
//! | [`error`]     | `AllocError`, `AllocResult<T>`                            |

pub mod allocator;
pub mod error;
pub mod pools;


pub use allocator::{AllocCtx, AllocParams, Agent, Allocator};
pub use error::{AllocError, AllocResult};
pub use pools::{DeliveryRequest, PickupRequest, ResourcePools};
