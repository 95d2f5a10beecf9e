use crate::errors::{AppError, AppResult};
use crate::models::{NewSprintRecord, SprintRecord, POINTS_NOT_FOUND};
use rusqlite::{params, Connection};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

const SCHEMA_SQL: &str = include_str!("schema.sql");

const SELECT_COLUMNS: &str = "SELECT id, name, sprint_number, days_available, capacity_per_day, days_off,
        points_completed, efficiency_ratio, avg_efficiency_ratio, forecasted_completed
   FROM iteration_capacity";

/// Durable table of processed sprints for a single run.
#[derive(Debug)]
pub struct SprintStore {
    conn: Mutex<Connection>,
    db_path: Option<PathBuf>,
}

impl SprintStore {
    /// Discards any previous database at `path` and opens an empty one.
    pub fn create_fresh(path: &Path) -> AppResult<Self> {
        if path.exists() {
            fs::remove_file(path)
                .map_err(|err| AppError::Io(format!("failed to remove {}: {}", path.display(), err)))?;
        }
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|err| AppError::Io(err.to_string()))?;
            }
        }
        let conn = Connection::open(path)?;
        let store = Self {
            conn: Mutex::new(conn),
            db_path: Some(path.to_path_buf()),
        };
        store.create_schema()?;
        Ok(store)
    }

    pub fn in_memory() -> AppResult<Self> {
        let store = Self {
            conn: Mutex::new(Connection::open_in_memory()?),
            db_path: None,
        };
        store.create_schema()?;
        Ok(store)
    }

    pub fn path(&self) -> Option<&Path> {
        self.db_path.as_deref()
    }

    pub fn create_schema(&self) -> AppResult<()> {
        let conn = self.lock()?;
        conn.execute_batch(SCHEMA_SQL)?;
        Ok(())
    }

    pub fn insert(&self, record: &NewSprintRecord) -> AppResult<i64> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO iteration_capacity (
               name, sprint_number, days_available, capacity_per_day, days_off, points_completed, efficiency_ratio
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                record.name,
                record.sprint_number,
                record.days_available,
                record.capacity_per_day,
                record.days_off,
                record.points_completed.unwrap_or(POINTS_NOT_FOUND),
                record.efficiency_ratio,
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    /// Writes the same average into every row in one transaction. `None`
    /// clears the column.
    pub fn update_average(&self, average: Option<f64>) -> AppResult<usize> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        let affected = tx.execute(
            "UPDATE iteration_capacity SET avg_efficiency_ratio = ?1",
            params![average],
        )?;
        tx.commit()?;
        Ok(affected)
    }

    /// Reads a snapshot of all rows, then stores `forecaster(row)` for each of
    /// them inside a single transaction. Any failure rolls the whole pass back.
    pub fn apply_forecasts<F>(&self, mut forecaster: F) -> AppResult<usize>
    where
        F: FnMut(&SprintRecord) -> Option<i64>,
    {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        let rows = {
            let mut stmt = tx.prepare(&format!("{SELECT_COLUMNS} ORDER BY id ASC"))?;
            let rows = stmt.query_map([], parse_sprint_row)?.collect::<Result<Vec<_>, _>>()?;
            rows
        };

        let mut forecasted = 0usize;
        for row in &rows {
            let value = forecaster(row);
            if value.is_some() {
                forecasted += 1;
            }
            tx.execute(
                "UPDATE iteration_capacity SET forecasted_completed = ?1 WHERE id = ?2",
                params![value, row.id],
            )?;
        }
        tx.commit()?;
        Ok(forecasted)
    }

    pub fn read_all(&self) -> AppResult<Vec<SprintRecord>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(&format!("{SELECT_COLUMNS} ORDER BY id ASC"))?;
        let rows = stmt.query_map([], parse_sprint_row)?.collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    fn lock(&self) -> AppResult<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| AppError::Internal("database mutex poisoned".to_string()))
    }
}

fn parse_sprint_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<SprintRecord> {
    let points_raw: i64 = row.get(6)?;
    Ok(SprintRecord {
        id: row.get(0)?,
        name: row.get(1)?,
        sprint_number: row.get(2)?,
        days_available: row.get(3)?,
        capacity_per_day: row.get(4)?,
        days_off: row.get(5)?,
        points_completed: parse_points(points_raw),
        efficiency_ratio: row.get(7)?,
        avg_efficiency_ratio: row.get(8)?,
        forecasted_completed: row.get(9)?,
    })
}

fn parse_points(raw: i64) -> Option<i64> {
    if raw == POINTS_NOT_FOUND {
        None
    } else {
        Some(raw)
    }
}
