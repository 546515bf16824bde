//! Fluent builder for constructing a [`Sim`].

use fl_alloc::{AllocParams, Allocator, ResourcePools};
use fl_core::{SimConfig, SimRng, SimTime};
use fl_graph::{AStarPlanner, HopPlanner};
use fl_stock::TileMint;

use crate::clock::{self, Clock};
use crate::content::{self, ContentSource};
use crate::layout;
use crate::orders::{LetterSupply, WordOrders};
use crate::{Sim, SimResult, World};

/// Fluent builder for [`Sim<P>`].
///
/// # Required inputs
///
/// - [`SimConfig`]: arena, fleet, totes, stations, timing, tuning, content
/// - `P: HopPlanner`: the next-hop engine (e.g. [`AStarPlanner`])
///
/// # Optional inputs (have defaults)
///
/// | Method          | Default                                        |
/// |-----------------|------------------------------------------------|
/// | `.content(src)` | [`content::from_config`] on `config.content`   |
///
/// # Example
///
/// ```rust,ignore
/// let mut sim = SimBuilder::from_config(config).build()?;
/// sim.run_configured(&mut NoopObserver)?;
/// let summary = Summary::collect(&sim.world);
/// ```
pub struct SimBuilder<P: HopPlanner> {
    config: SimConfig,
    planner: P,
    content: Option<Box<dyn ContentSource>>,
}

impl SimBuilder<AStarPlanner> {
    /// Builder with the default A* planner, budgeted by
    /// `tuning.path_search_budget`.
    pub fn from_config(config: SimConfig) -> Self {
        let planner = AStarPlanner::new(config.tuning.path_search_budget);
        Self::new(config, planner)
    }
}

impl<P: HopPlanner> SimBuilder<P> {
    pub fn new(config: SimConfig, planner: P) -> Self {
        Self { config, planner, content: None }
    }

    /// Supply a content source instead of the one named in the config.
    pub fn content(mut self, source: Box<dyn ContentSource>) -> Self {
        self.content = Some(source);
        self
    }

    /// Validate the config, lay out the warehouse, stock the totes, and
    /// return a ready-to-run [`Sim`] at time zero.
    pub fn build(self) -> SimResult<Sim<P>> {
        let config = self.config;

        // ── Validate ──────────────────────────────────────────────────────
        config.validate()?;
        let mut content = match self.content {
            Some(c) => c,
            None => content::from_config(&config.content)?,
        };

        // ── Place everything ──────────────────────────────────────────────
        let mut rng = SimRng::new(config.seed);
        let mut layout = layout::compact(&config, &mut rng)?;

        let mut mint = TileMint::new();
        let bundles =
            layout::stock_initial_inventory(&config, &mut layout.totes, &mut mint, content.as_mut(), &mut rng);
        log::info!("initial inventory: {bundles} bundles from the {} source", content.name());

        // ── Allocation ────────────────────────────────────────────────────
        let pools = ResourcePools::from_graph(&layout.graph, &layout.totes)?;
        let allocator = Allocator::new(AllocParams::from_config(&config), pools, layout.robots.len());

        let world = World {
            now: SimTime::ZERO,
            stats_since: SimTime::ZERO,
            floor: layout.floor,
            graph: layout.graph,
            totes: layout.totes,
            robots: layout.robots,
            letter_stations: layout.letter_stations,
            word_stations: layout.word_stations,
            allocator,
            orders: WordOrders::new(config.content.word_buffer),
            supply: LetterSupply::new(config.stations.bundle_size),
            mint,
            content,
            rng,
            events: Vec::new(),
            config,
        };
        let components = clock::registration_order(&world);

        Ok(Sim { clock: Clock::from_config(&world.config), world, planner: self.planner, components })
    }
}
