//! Simulation observer trait for progress reporting and data collection.

use fl_core::SimTime;

use crate::World;

/// Callbacks invoked by [`Sim::run_until`][crate::Sim::run_until] around
/// every macro-step.
///
/// All methods have default no-op implementations so implementors only need
/// to override what they care about.  Every hook gets read-only access to
/// the whole [`World`]; output writers pull robot and station state from it
/// without the simulation knowing about any output format.
///
/// # Example — progress printer
///
/// ```rust,ignore
/// struct ProgressPrinter { every: f64, next: f64 }
///
/// impl SimObserver for ProgressPrinter {
///     fn on_step_end(&mut self, now: SimTime, world: &World) {
///         if now.secs() >= self.next {
///             println!("{now}: {} words done", world.orders.stats.words_completed);
///             self.next += self.every;
///         }
///     }
/// }
/// ```
pub trait SimObserver {
    /// Called before a macro-step starting at `now`.
    fn on_step_start(&mut self, _now: SimTime, _world: &World) {}

    /// Called after every component has advanced to `now`.
    fn on_step_end(&mut self, _now: SimTime, _world: &World) {}

    /// Called right after statistics were cleared at the end of warm-up.
    fn on_reset(&mut self, _now: SimTime, _world: &World) {}

    /// Called once when a `run_*` call reaches its end time.
    fn on_run_end(&mut self, _now: SimTime, _world: &World) {}
}

/// A [`SimObserver`] that does nothing.
pub struct NoopObserver;

impl SimObserver for NoopObserver {}
