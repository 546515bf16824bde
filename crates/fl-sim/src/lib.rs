//! `fl-sim` — world arena and macro-step loop for the rust_fleet simulator.
//!
//! # Macro-step loop
//!
//! ```text
//! while now < end:
//!   ① Size    — next = min(end, earliest next_event_time, now + horizon),
//!               floored at now + min_granularity, capped at end.
//!   ② Robots  — driver::advance over (now, next]; driver events go to the
//!               allocator at once; an idle robot is re-tasked in place.
//!   ③ Floor   — quadtree split / merge upkeep.
//!   ④ Orders  — word orders assign words and queue deliveries; letter
//!               supply fills letter stations and queues pickups.
//!   ⑤ Stations — word stations, then letter stations, serve one transfer.
//! ```
//!
//! Everything is single-threaded and driven by one seeded RNG, so a run is
//! reproducible from its [`SimConfig`](fl_core::SimConfig) alone.
//!
//! # Cargo features
//!
//! | Feature | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | `Serialize` on [`Summary`] and serde on the config types.   |
//!
//! # Quick-start
//!
//! ```rust,ignore
//! use fl_core::SimConfig;
//! use fl_sim::{NoopObserver, SimBuilder, Summary};
//!
//! let mut sim = SimBuilder::from_config(SimConfig::default()).build()?;
//! sim.run_configured(&mut NoopObserver)?;
//! println!("{} words", Summary::collect(&sim.world).words_completed);
//! ```

pub mod builder;
pub mod clock;
pub mod content;
pub mod error;
pub mod layout;
pub mod observer;
pub mod orders;
pub mod sim;
pub mod summary;
pub mod world;


pub use builder::SimBuilder;
pub use clock::{Clock, Component};
pub use content::{AlphabetSource, ContentSource, DictionarySource, Palette};
pub use error::{SimError, SimResult};
pub use layout::Layout;
pub use observer::{NoopObserver, SimObserver};
pub use orders::{LetterSupply, OrderStats, WordOrders};
pub use sim::Sim;
pub use summary::{PoolSizes, Summary};
pub use world::World;
