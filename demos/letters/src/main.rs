//! letters — runs one warehouse configuration end to end and prints the
//! run summary.
//!
//! ```text
//! letters [CONFIG.json] [OUTPUT_DIR]
//! ```
//!
//! Without a config path the built-in default is used (8 robots, 60 totes,
//! 2 letter stations, 3 word stations, a 24 × 16 arena).  With an output
//! directory, robot snapshots and step summaries are written there as CSV.
//! Set `RUST_LOG=debug` for allocator and order traffic.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};

use fl_core::SimConfig;
use fl_output::{CsvWriter, SimOutputObserver};
use fl_sim::{NoopObserver, SimBuilder, Summary};

fn load_config(path: Option<&Path>) -> Result<SimConfig> {
    let Some(path) = path else {
        return Ok(SimConfig::default());
    };
    let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    let config = serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("parsing {}", path.display()))?;
    Ok(config)
}

fn print_summary(s: &Summary) {
    println!("Measured {:.1} s with {} robots", s.elapsed, s.robots);
    println!("  words completed   : {} ({:.4}/s)", s.words_completed, s.word_rate);
    println!("  letters delivered : {}", s.letters_delivered);
    println!("  bundles issued    : {}", s.bundles_issued);
    println!("  pickups/setdowns  : {} / {}", s.pickups, s.setdowns);
    println!("  collisions        : {}", s.collisions);
    println!("  evasions          : {}", s.evasions);
    println!("  distance          : {:.1} m", s.distance);
    println!("  tote utilization  : {:.3}", s.tote_utilization);
    println!(
        "  station idle      : letter {:.3}, word {:.3}",
        s.letter_station_idle, s.word_station_idle
    );
    println!();

    println!("{:<28} {:>8}", "Sub-state", "Share");
    println!("{}", "-".repeat(37));
    for (name, share) in &s.state_fractions {
        println!("{name:<28} {share:>8.3}");
    }
    println!();
    println!("{:<28} {:>8}", "Task", "Share");
    println!("{}", "-".repeat(37));
    for (name, share) in &s.task_fractions {
        println!("{name:<28} {share:>8.3}");
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut args = std::env::args().skip(1);
    let config_path = args.next().map(PathBuf::from);
    let output_dir = args.next().map(PathBuf::from);

    // 1. Configuration.
    let config = load_config(config_path.as_deref())?;
    println!("=== letters — rust_fleet warehouse simulator ===");
    println!(
        "Robots: {}  |  Totes: {}  |  Warm-up: {} s  |  Measure: {} s  |  Seed: {}",
        config.fleet.num_robots,
        config.totes.num_totes,
        config.timing.warmup_time,
        config.timing.duration,
        config.seed
    );
    println!();

    // 2. Build.
    let mut sim = SimBuilder::from_config(config.clone()).build()?;
    println!(
        "Layout: {} waypoints, {} storage slots",
        sim.world.graph.node_count(),
        sim.world.graph.storage_slots().count()
    );

    // 3. Run warm-up, reset, and measurement.
    let t0 = Instant::now();
    match &output_dir {
        Some(dir) => {
            let mut obs = SimOutputObserver::new(CsvWriter::new(dir)?, &config);
            sim.run_configured(&mut obs)?;
            obs.finish()?;
            log::info!("output written to {}", dir.display());
        }
        None => sim.run_configured(&mut NoopObserver)?,
    }
    println!("Simulation complete in {:.3} s", t0.elapsed().as_secs_f64());
    println!();

    // 4. Report.
    let summary = Summary::collect(&sim.world);
    print_summary(&summary);
    println!();
    println!("{}", serde_json::to_string_pretty(&summary)?);

    Ok(())
}
