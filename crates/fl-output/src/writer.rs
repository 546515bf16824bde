//! The `OutputWriter` trait implemented by all backend writers.

use std::path::Path;

use crate::{OutputError, OutputResult, RobotSnapshotRow, StepSummaryRow};

/// Sink for run output.
///
/// The observer never propagates these errors itself; it keeps the first one
/// for [`SimOutputObserver::take_error`][crate::SimOutputObserver::take_error].
pub trait OutputWriter {
    fn write_snapshots(&mut self, rows: &[RobotSnapshotRow]) -> OutputResult<()>;

    fn write_step_summary(&mut self, row: &StepSummaryRow) -> OutputResult<()>;

    /// Push buffered rows to disk; the writer stays usable.
    fn flush(&mut self) -> OutputResult<()>;

    /// Flush and close every underlying handle.  Safe to call twice.
    fn finish(&mut self) -> OutputResult<()>;
}

/// Create `dir` and any missing parents.
pub(crate) fn prepare_dir(dir: &Path) -> OutputResult<()> {
    std::fs::create_dir_all(dir).map_err(|source| OutputError::Directory { path: dir.to_path_buf(), source })
}
