//! SQLite backend (feature `sqlite`): one `output.db` with the tables
//! `robot_snapshots` and `step_summaries`.

use std::path::Path;

use rusqlite::{Connection, params};

use crate::writer::{OutputWriter, prepare_dir};
use crate::{OutputResult, RobotSnapshotRow, StepSummaryRow};

pub struct SqliteWriter {
    conn:     Connection,
    finished: bool,
}

impl SqliteWriter {
    pub fn new(dir: &Path) -> OutputResult<Self> {
        prepare_dir(dir)?;
        let conn = Connection::open(dir.join("output.db"))?;
        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous  = NORMAL;
             CREATE TABLE IF NOT EXISTS robot_snapshots (
                 robot_id     INTEGER NOT NULL,
                 time         REAL    NOT NULL,
                 x            REAL    NOT NULL,
                 y            REAL    NOT NULL,
                 heading      REAL    NOT NULL,
                 speed        REAL    NOT NULL,
                 state        TEXT    NOT NULL,
                 task         TEXT    NOT NULL,
                 carried_tote INTEGER NOT NULL
             );
             CREATE TABLE IF NOT EXISTS step_summaries (
                 time              REAL PRIMARY KEY,
                 step_secs         REAL    NOT NULL,
                 moving_robots     INTEGER NOT NULL,
                 pickups           INTEGER NOT NULL,
                 setdowns          INTEGER NOT NULL,
                 collisions        INTEGER NOT NULL,
                 words_completed   INTEGER NOT NULL,
                 pickup_requests   INTEGER NOT NULL,
                 delivery_requests INTEGER NOT NULL
             );",
        )?;
        Ok(Self { conn, finished: false })
    }
}

impl OutputWriter for SqliteWriter {
    fn write_snapshots(&mut self, rows: &[RobotSnapshotRow]) -> OutputResult<()> {
        if rows.is_empty() {
            return Ok(());
        }
        let tx = self.conn.unchecked_transaction()?;
        {
            let mut stmt = tx.prepare_cached(
                "INSERT INTO robot_snapshots \
                 (robot_id, time, x, y, heading, speed, state, task, carried_tote) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            )?;
            for row in rows {
                stmt.execute(params![
                    row.robot_id,
                    row.time,
                    row.x as f64,
                    row.y as f64,
                    row.heading as f64,
                    row.speed as f64,
                    row.state,
                    row.task,
                    row.carried_tote,
                ])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    fn write_step_summary(&mut self, row: &StepSummaryRow) -> OutputResult<()> {
        self.conn.execute(
            "INSERT INTO step_summaries \
             (time, step_secs, moving_robots, pickups, setdowns, collisions, \
              words_completed, pickup_requests, delivery_requests) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                row.time,
                row.step_secs,
                row.moving_robots,
                row.pickups as i64,
                row.setdowns as i64,
                row.collisions as i64,
                row.words_completed as i64,
                row.pickup_requests,
                row.delivery_requests,
            ],
        )?;
        Ok(())
    }

    fn flush(&mut self) -> OutputResult<()> {
        self.conn.execute_batch("PRAGMA wal_checkpoint(PASSIVE);")?;
        Ok(())
    }

    fn finish(&mut self) -> OutputResult<()> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;
        self.conn.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")?;
        Ok(())
    }
}
