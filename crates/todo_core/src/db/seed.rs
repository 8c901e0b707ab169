//! Sample rows inserted into a fresh database.
//!
//! # Invariants
//! - Seeding only happens when the `todo` table is empty.
//! - Seed rows satisfy the same enum/date domains as client writes.

use super::DbResult;
use log::info;
use rusqlite::{params, Connection};

const SEED_ROWS: &[(&str, &str, &str, &str, &str)] = &[
    ("Watch Movie", "LOW", "TO DO", "WORK", "2021-09-22"),
    ("Complete Homework", "HIGH", "IN PROGRESS", "HOME", "2021-03-21"),
    ("Exercise", "MEDIUM", "DONE", "LEARNING", "2021-08-13"),
];

/// Inserts the sample rows when the table holds no todos.
///
/// Returns the number of inserted rows (0 when data already exists).
pub fn seed_if_empty(conn: &mut Connection) -> DbResult<usize> {
    let count: i64 = conn.query_row("SELECT COUNT(*) FROM todo;", [], |row| row.get(0))?;
    if count > 0 {
        return Ok(0);
    }

    let tx = conn.transaction()?;
    {
        let mut stmt = tx.prepare(
            "INSERT INTO todo (todo, priority, status, category, dueDate)
             VALUES (?1, ?2, ?3, ?4, ?5);",
        )?;
        for (todo, priority, status, category, due_date) in SEED_ROWS {
            stmt.execute(params![todo, priority, status, category, due_date])?;
        }
    }
    tx.commit()?;

    info!(
        "event=db_seed module=db status=ok rows={}",
        SEED_ROWS.len()
    );
    Ok(SEED_ROWS.len())
}
