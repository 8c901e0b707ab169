//! Shared store client owning the single SQLite connection.
//!
//! # Responsibility
//! - Own the connection for the process lifetime and hand it to one caller
//!   at a time.
//! - Build a ready repository + service per call.
//! - Release the connection explicitly at shutdown.
//!
//! # Invariants
//! - The connection is only reachable through `with_service`.
//! - The schema is checked once, when the store is built.
//! - A poisoned lock is reported as `RepoError::StorePoisoned`, never unwrapped.

use crate::db::{open_db, open_db_in_memory, DbError, DbResult};
use crate::repo::todo_repo::{RepoError, RepoResult, SqliteTodoRepository};
use crate::service::todo_service::TodoService;
use log::{error, info};
use rusqlite::Connection;
use std::path::Path;
use std::sync::Mutex;

/// Explicitly constructed handle to the todo database.
pub struct TodoStore {
    conn: Mutex<Connection>,
}

impl TodoStore {
    /// Opens (migrating and seeding) the database file at `path`.
    pub fn open(path: impl AsRef<Path>) -> RepoResult<Self> {
        Self::from_connection(open_db(path)?)
    }

    /// Opens a private in-memory database, migrated and seeded.
    pub fn open_in_memory() -> RepoResult<Self> {
        Self::from_connection(open_db_in_memory()?)
    }

    /// Wraps an already bootstrapped connection.
    ///
    /// # Errors
    /// - The same schema errors as `SqliteTodoRepository::try_new`.
    pub fn from_connection(conn: Connection) -> RepoResult<Self> {
        SqliteTodoRepository::try_new(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Runs `f` with a service bound to the shared connection.
    ///
    /// Blocks the calling thread while another caller holds the connection.
    pub fn with_service<T>(
        &self,
        f: impl FnOnce(&TodoService<SqliteTodoRepository<'_>>) -> RepoResult<T>,
    ) -> RepoResult<T> {
        let conn = self.conn.lock().map_err(|_| RepoError::StorePoisoned)?;
        let repo = SqliteTodoRepository::new_unchecked(&conn);
        let service = TodoService::new(repo);
        f(&service)
    }

    /// Closes the connection, flushing SQLite state.
    ///
    /// # Errors
    /// - Returns the SQLite close failure; the connection is dropped anyway.
    pub fn close(self) -> DbResult<()> {
        let conn = self
            .conn
            .into_inner()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        match conn.close() {
            Ok(()) => {
                info!("event=store_close module=store status=ok");
                Ok(())
            }
            Err((_conn, err)) => {
                error!("event=store_close module=store status=error error={err}");
                Err(DbError::Sqlite(err))
            }
        }
    }
}
