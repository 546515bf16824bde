//! `fl-output` — run output writers for the rust_fleet simulator.
//!
//! | Feature   | Backend | Files created                                          |
//! |-----------|---------|--------------------------------------------------------|
//! | *(none)*  | CSV     | `robot_snapshots.csv`, `step_summaries.csv`            |
//! | `sqlite`  | SQLite  | `output.db`                                            |
//! | `parquet` | Parquet | `robot_snapshots.parquet`, `step_summaries.parquet`    |
//!
//! Every backend implements [`OutputWriter`] and is driven by
//! [`SimOutputObserver`], an `fl_sim::SimObserver`.
//!
//! # Usage
//!
//! ```rust,ignore
//! use fl_output::{CsvWriter, SimOutputObserver};
//!
//! let writer = CsvWriter::new(Path::new("./output"))?;
//! let mut obs = SimOutputObserver::new(writer, &config);
//! sim.run_configured(&mut obs)?;
//! obs.finish()?;
//! ```

pub mod csv;
pub mod error;
pub mod observer;
pub mod row;
pub mod writer;

#[cfg(feature = "sqlite")]
pub mod sqlite;

#[cfg(feature = "parquet")]
pub mod parquet;


pub use csv::CsvWriter;
pub use error::{OutputError, OutputResult};
pub use observer::SimOutputObserver;
pub use row::{NO_TOTE, RobotSnapshotRow, StepSummaryRow};
pub use writer::OutputWriter;

#[cfg(feature = "sqlite")]
pub use sqlite::SqliteWriter;

#[cfg(feature = "parquet")]
pub use parquet::ParquetWriter;
