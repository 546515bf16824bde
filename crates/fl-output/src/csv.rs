//! CSV backend: `robot_snapshots.csv` and `step_summaries.csv`.

use std::fs::File;
use std::path::Path;

use csv::Writer;

use crate::writer::{OutputWriter, prepare_dir};
use crate::{OutputResult, RobotSnapshotRow, StepSummaryRow};

pub const SNAPSHOT_HEADER: [&str; 9] =
    ["robot_id", "time", "x", "y", "heading", "speed", "state", "task", "carried_tote"];

pub const SUMMARY_HEADER: [&str; 9] = [
    "time",
    "step_secs",
    "moving_robots",
    "pickups",
    "setdowns",
    "collisions",
    "words_completed",
    "pickup_requests",
    "delivery_requests",
];

pub struct CsvWriter {
    snapshots: Writer<File>,
    summaries: Writer<File>,
    finished:  bool,
}

impl CsvWriter {
    /// Create `dir` if needed, then both files (truncating old ones) with
    /// their headers.
    pub fn new(dir: &Path) -> OutputResult<Self> {
        prepare_dir(dir)?;
        let mut snapshots = Writer::from_path(dir.join("robot_snapshots.csv"))?;
        snapshots.write_record(SNAPSHOT_HEADER)?;

        let mut summaries = Writer::from_path(dir.join("step_summaries.csv"))?;
        summaries.write_record(SUMMARY_HEADER)?;

        log::debug!("CSV output in {}", dir.display());
        Ok(Self { snapshots, summaries, finished: false })
    }
}

impl OutputWriter for CsvWriter {
    fn write_snapshots(&mut self, rows: &[RobotSnapshotRow]) -> OutputResult<()> {
        for row in rows {
            self.snapshots.write_record(&[
                row.robot_id.to_string(),
                row.time.to_string(),
                row.x.to_string(),
                row.y.to_string(),
                row.heading.to_string(),
                row.speed.to_string(),
                row.state.to_owned(),
                row.task.to_owned(),
                row.carried_tote.to_string(),
            ])?;
        }
        Ok(())
    }

    fn write_step_summary(&mut self, row: &StepSummaryRow) -> OutputResult<()> {
        self.summaries.write_record(&[
            row.time.to_string(),
            row.step_secs.to_string(),
            row.moving_robots.to_string(),
            row.pickups.to_string(),
            row.setdowns.to_string(),
            row.collisions.to_string(),
            row.words_completed.to_string(),
            row.pickup_requests.to_string(),
            row.delivery_requests.to_string(),
        ])?;
        Ok(())
    }

    fn flush(&mut self) -> OutputResult<()> {
        self.snapshots.flush()?;
        self.summaries.flush()?;
        Ok(())
    }

    fn finish(&mut self) -> OutputResult<()> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;
        self.flush()
    }
}
