//! Parquet backend (feature `parquet`): `robot_snapshots.parquet` and
//! `step_summaries.parquet`.

use std::fs::File;
use std::path::Path;
use std::sync::Arc;

use arrow::array::{ArrayRef, Float32Builder, Float64Builder, StringBuilder, UInt32Builder, UInt64Builder};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;
use parquet::basic::Compression;
use parquet::file::properties::WriterProperties;

use crate::writer::{OutputWriter, prepare_dir};
use crate::{OutputResult, RobotSnapshotRow, StepSummaryRow};

/// Summary rows are buffered and written in batches of this many.
const SUMMARY_BATCH: usize = 1024;

fn snapshot_schema() -> Arc<Schema> {
    Arc::new(Schema::new(vec![
        Field::new("robot_id",     DataType::UInt32,  false),
        Field::new("time",         DataType::Float64, false),
        Field::new("x",            DataType::Float32, false),
        Field::new("y",            DataType::Float32, false),
        Field::new("heading",      DataType::Float32, false),
        Field::new("speed",        DataType::Float32, false),
        Field::new("state",        DataType::Utf8,    false),
        Field::new("task",         DataType::Utf8,    false),
        Field::new("carried_tote", DataType::UInt32,  false),
    ]))
}

fn summary_schema() -> Arc<Schema> {
    Arc::new(Schema::new(vec![
        Field::new("time",              DataType::Float64, false),
        Field::new("step_secs",         DataType::Float64, false),
        Field::new("moving_robots",     DataType::UInt32,  false),
        Field::new("pickups",           DataType::UInt64,  false),
        Field::new("setdowns",          DataType::UInt64,  false),
        Field::new("collisions",        DataType::UInt64,  false),
        Field::new("words_completed",   DataType::UInt64,  false),
        Field::new("pickup_requests",   DataType::UInt32,  false),
        Field::new("delivery_requests", DataType::UInt32,  false),
    ]))
}

fn snappy_props() -> WriterProperties {
    WriterProperties::builder().set_compression(Compression::SNAPPY).build()
}

/// Writes run output to two Parquet files.
///
/// Files only become readable once [`finish`][OutputWriter::finish] writes
/// their footers.
pub struct ParquetWriter {
    snapshots:   Option<ArrowWriter<File>>,
    summaries:   Option<ArrowWriter<File>>,
    snap_schema: Arc<Schema>,
    summ_schema: Arc<Schema>,
    pending:     Vec<StepSummaryRow>,
}

impl ParquetWriter {
    pub fn new(dir: &Path) -> OutputResult<Self> {
        prepare_dir(dir)?;
        let snap_schema = snapshot_schema();
        let summ_schema = summary_schema();

        let snap_file = File::create(dir.join("robot_snapshots.parquet"))?;
        let snapshots = ArrowWriter::try_new(snap_file, Arc::clone(&snap_schema), Some(snappy_props()))?;

        let summ_file = File::create(dir.join("step_summaries.parquet"))?;
        let summaries = ArrowWriter::try_new(summ_file, Arc::clone(&summ_schema), Some(snappy_props()))?;

        Ok(Self {
            snapshots: Some(snapshots),
            summaries: Some(summaries),
            snap_schema,
            summ_schema,
            pending: Vec::with_capacity(SUMMARY_BATCH),
        })
    }

    fn write_pending(&mut self) -> OutputResult<()> {
        if self.pending.is_empty() {
            return Ok(());
        }
        let Some(writer) = self.summaries.as_mut() else {
            self.pending.clear();
            return Ok(());
        };

        let mut time = Float64Builder::new();
        let mut step = Float64Builder::new();
        let mut moving = UInt32Builder::new();
        let mut pickups = UInt64Builder::new();
        let mut setdowns = UInt64Builder::new();
        let mut collisions = UInt64Builder::new();
        let mut words = UInt64Builder::new();
        let mut pickup_reqs = UInt32Builder::new();
        let mut delivery_reqs = UInt32Builder::new();
        for row in self.pending.drain(..) {
            time.append_value(row.time);
            step.append_value(row.step_secs);
            moving.append_value(row.moving_robots);
            pickups.append_value(row.pickups);
            setdowns.append_value(row.setdowns);
            collisions.append_value(row.collisions);
            words.append_value(row.words_completed);
            pickup_reqs.append_value(row.pickup_requests);
            delivery_reqs.append_value(row.delivery_requests);
        }

        let columns: Vec<ArrayRef> = vec![
            Arc::new(time.finish()),
            Arc::new(step.finish()),
            Arc::new(moving.finish()),
            Arc::new(pickups.finish()),
            Arc::new(setdowns.finish()),
            Arc::new(collisions.finish()),
            Arc::new(words.finish()),
            Arc::new(pickup_reqs.finish()),
            Arc::new(delivery_reqs.finish()),
        ];
        writer.write(&RecordBatch::try_new(Arc::clone(&self.summ_schema), columns)?)?;
        Ok(())
    }
}

impl OutputWriter for ParquetWriter {
    fn write_snapshots(&mut self, rows: &[RobotSnapshotRow]) -> OutputResult<()> {
        if rows.is_empty() {
            return Ok(());
        }
        let Some(writer) = self.snapshots.as_mut() else {
            return Ok(());
        };

        let mut ids = UInt32Builder::new();
        let mut time = Float64Builder::new();
        let mut xs = Float32Builder::new();
        let mut ys = Float32Builder::new();
        let mut headings = Float32Builder::new();
        let mut speeds = Float32Builder::new();
        let mut states = StringBuilder::new();
        let mut tasks = StringBuilder::new();
        let mut carried = UInt32Builder::new();
        for row in rows {
            ids.append_value(row.robot_id);
            time.append_value(row.time);
            xs.append_value(row.x);
            ys.append_value(row.y);
            headings.append_value(row.heading);
            speeds.append_value(row.speed);
            states.append_value(row.state);
            tasks.append_value(row.task);
            carried.append_value(row.carried_tote);
        }

        let columns: Vec<ArrayRef> = vec![
            Arc::new(ids.finish()),
            Arc::new(time.finish()),
            Arc::new(xs.finish()),
            Arc::new(ys.finish()),
            Arc::new(headings.finish()),
            Arc::new(speeds.finish()),
            Arc::new(states.finish()),
            Arc::new(tasks.finish()),
            Arc::new(carried.finish()),
        ];
        writer.write(&RecordBatch::try_new(Arc::clone(&self.snap_schema), columns)?)?;
        Ok(())
    }

    fn write_step_summary(&mut self, row: &StepSummaryRow) -> OutputResult<()> {
        self.pending.push(*row);
        if self.pending.len() >= SUMMARY_BATCH {
            self.write_pending()?;
        }
        Ok(())
    }

    fn flush(&mut self) -> OutputResult<()> {
        self.write_pending()?;
        if let Some(w) = self.snapshots.as_mut() {
            w.flush()?;
        }
        if let Some(w) = self.summaries.as_mut() {
            w.flush()?;
        }
        Ok(())
    }

    fn finish(&mut self) -> OutputResult<()> {
        self.write_pending()?;
        if let Some(w) = self.snapshots.take() {
            w.close()?;
        }
        if let Some(w) = self.summaries.take() {
            w.close()?;
        }
        Ok(())
    }
}
