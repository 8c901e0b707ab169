//! Todo repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide CRUD and filtered listing over the `todo` table.
//! - Keep SQL details inside the core persistence boundary.
//!
//! # Invariants
//! - Every statement is parameterized; client text never reaches SQL verbatim.
//! - Read paths reject invalid persisted state instead of masking it.
//! - Listing order is `id ASC`.

use crate::db::migrations::{latest_version, schema_version};
use crate::db::DbError;
use crate::model::due_date::{format_due_date, parse_due_date};
use crate::model::todo::{
    Category, Priority, Status, Todo, TodoDraft, TodoId, TodoSummary, TodoValidationError,
};
use chrono::NaiveDate;
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

const TODO_TABLE: &str = "todo";
const TODO_COLUMNS: &[&str] = &["id", "todo", "priority", "status", "category", "dueDate"];

const TODO_SELECT_SQL: &str = "SELECT
    id,
    todo,
    priority,
    status,
    category,
    dueDate
FROM todo";

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for todo persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Validation(TodoValidationError),
    Db(DbError),
    NotFound(TodoId),
    InvalidData(String),
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    MissingRequiredTable(&'static str),
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
    /// A request panicked while holding the shared connection.
    StorePoisoned,
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "todo not found: {id}"),
            Self::InvalidData(message) => write!(f, "invalid persisted todo data: {message}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "connection schema version {actual_version} does not match expected {expected_version}"
            ),
            Self::MissingRequiredTable(table) => write!(f, "missing required table `{table}`"),
            Self::MissingRequiredColumn { table, column } => {
                write!(f, "missing required column `{table}.{column}`")
            }
            Self::StorePoisoned => write!(f, "todo store lock poisoned"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<TodoValidationError> for RepoError {
    fn from(value: TodoValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Exact-match filters plus a literal substring search, combined with AND.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TodoListQuery {
    pub status: Option<Status>,
    pub priority: Option<Priority>,
    pub category: Option<Category>,
    pub search: Option<String>,
}

impl TodoListQuery {
    /// Builds a query from raw filter values.
    ///
    /// Empty values are ignored. Filters are validated in the order status,
    /// priority, category; the first invalid one is returned.
    pub fn from_raw(
        status: Option<&str>,
        priority: Option<&str>,
        category: Option<&str>,
        search: Option<&str>,
    ) -> Result<Self, TodoValidationError> {
        Ok(Self {
            status: non_empty(status).map(Status::from_str).transpose()?,
            priority: non_empty(priority).map(Priority::from_str).transpose()?,
            category: non_empty(category).map(Category::from_str).transpose()?,
            search: non_empty(search).map(str::to_owned),
        })
    }
}

/// Repository interface for todo CRUD operations.
pub trait TodoRepository {
    fn create_todo(&self, draft: &TodoDraft) -> RepoResult<TodoId>;
    fn update_todo(&self, todo: &Todo) -> RepoResult<()>;
    fn get_todo(&self, id: TodoId) -> RepoResult<Option<Todo>>;
    fn list_todos(&self, query: &TodoListQuery) -> RepoResult<Vec<Todo>>;
    /// Exact `priority`, substring `status`; neither is validated.
    fn list_summaries(&self, priority: &str, status_fragment: &str)
        -> RepoResult<Vec<TodoSummary>>;
    fn list_due_on(&self, date: NaiveDate) -> RepoResult<Vec<Todo>>;
    /// Deletes unconditionally; returns the number of removed rows.
    fn delete_todo(&self, id: TodoId) -> RepoResult<usize>;
}

/// SQLite-backed todo repository.
pub struct SqliteTodoRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteTodoRepository<'conn> {
    /// Constructs a repository from a migrated/ready connection.
    ///
    /// # Errors
    /// - `UninitializedConnection` when migrations have not been applied.
    /// - `MissingRequiredTable` / `MissingRequiredColumn` when the schema was
    ///   tampered with after migration.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn)?;
        Ok(Self { conn })
    }

    /// Wraps a connection whose schema the caller has already checked.
    pub(crate) fn new_unchecked(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl TodoRepository for SqliteTodoRepository<'_> {
    fn create_todo(&self, draft: &TodoDraft) -> RepoResult<TodoId> {
        self.conn.execute(
            "INSERT INTO todo (id, todo, priority, status, category, dueDate)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6);",
            params![
                draft.id,
                draft.todo.as_str(),
                draft.priority.as_str(),
                draft.status.as_str(),
                draft.category.as_str(),
                format_due_date(draft.due_date),
            ],
        )?;

        Ok(draft.id.unwrap_or_else(|| self.conn.last_insert_rowid()))
    }

    fn update_todo(&self, todo: &Todo) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE todo
             SET
                todo = ?1,
                priority = ?2,
                status = ?3,
                category = ?4,
                dueDate = ?5
             WHERE id = ?6;",
            params![
                todo.todo.as_str(),
                todo.priority.as_str(),
                todo.status.as_str(),
                todo.category.as_str(),
                format_due_date(todo.due_date),
                todo.id,
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound(todo.id));
        }

        Ok(())
    }

    fn get_todo(&self, id: TodoId) -> RepoResult<Option<Todo>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{TODO_SELECT_SQL} WHERE id = ?1;"))?;

        let mut rows = stmt.query([id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_todo_row(row)?));
        }

        Ok(None)
    }

    fn list_todos(&self, query: &TodoListQuery) -> RepoResult<Vec<Todo>> {
        let mut sql = format!("{TODO_SELECT_SQL} WHERE 1 = 1");
        let mut bind_values: Vec<Value> = Vec::new();

        if let Some(status) = query.status {
            sql.push_str(" AND status = ?");
            bind_values.push(Value::Text(status.as_str().to_string()));
        }
        if let Some(priority) = query.priority {
            sql.push_str(" AND priority = ?");
            bind_values.push(Value::Text(priority.as_str().to_string()));
        }
        if let Some(category) = query.category {
            sql.push_str(" AND category = ?");
            bind_values.push(Value::Text(category.as_str().to_string()));
        }
        if let Some(search) = query.search.as_deref() {
            sql.push_str(" AND todo LIKE ? ESCAPE '\\'");
            bind_values.push(Value::Text(contains_pattern(search)));
        }

        sql.push_str(" ORDER BY id ASC;");

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut todos = Vec::new();

        while let Some(row) = rows.next()? {
            todos.push(parse_todo_row(row)?);
        }

        Ok(todos)
    }

    fn list_summaries(
        &self,
        priority: &str,
        status_fragment: &str,
    ) -> RepoResult<Vec<TodoSummary>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, todo, priority, status
             FROM todo
             WHERE priority = ?1
               AND status LIKE ?2 ESCAPE '\\'
             ORDER BY id ASC;",
        )?;

        let mut rows = stmt.query(params![priority, contains_pattern(status_fragment)])?;
        let mut summaries = Vec::new();

        while let Some(row) = rows.next()? {
            summaries.push(TodoSummary {
                id: row.get("id")?,
                todo: row.get("todo")?,
                priority: parse_column(row, "priority")?,
                status: parse_column(row, "status")?,
            });
        }

        Ok(summaries)
    }

    fn list_due_on(&self, date: NaiveDate) -> RepoResult<Vec<Todo>> {
        let mut stmt = self.conn.prepare(&format!(
            "{TODO_SELECT_SQL}
             WHERE dueDate = ?1
             ORDER BY id ASC;"
        ))?;

        let mut rows = stmt.query([format_due_date(date)])?;
        let mut todos = Vec::new();

        while let Some(row) = rows.next()? {
            todos.push(parse_todo_row(row)?);
        }

        Ok(todos)
    }

    fn delete_todo(&self, id: TodoId) -> RepoResult<usize> {
        let removed = self.conn.execute("DELETE FROM todo WHERE id = ?1;", [id])?;
        Ok(removed)
    }
}

fn ensure_connection_ready(conn: &Connection) -> RepoResult<()> {
    let expected_version = latest_version();
    let actual_version = schema_version(conn)?;
    if actual_version < expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    let table_exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1
        );",
        [TODO_TABLE],
        |row| row.get(0),
    )?;
    if table_exists == 0 {
        return Err(RepoError::MissingRequiredTable(TODO_TABLE));
    }

    let mut stmt = conn.prepare("SELECT name FROM pragma_table_info(?1);")?;
    let columns = stmt
        .query_map([TODO_TABLE], |row| row.get::<_, String>(0))?
        .collect::<Result<Vec<_>, _>>()?;
    for &column in TODO_COLUMNS {
        if !columns.iter().any(|name| name.eq_ignore_ascii_case(column)) {
            return Err(RepoError::MissingRequiredColumn {
                table: TODO_TABLE,
                column,
            });
        }
    }

    Ok(())
}

fn parse_todo_row(row: &Row<'_>) -> RepoResult<Todo> {
    let due_text: String = row.get("dueDate")?;
    let due_date = parse_due_date(&due_text).map_err(|_| {
        RepoError::InvalidData(format!("invalid due date `{due_text}` in todo.dueDate"))
    })?;

    Ok(Todo {
        id: row.get("id")?,
        todo: row.get("todo")?,
        priority: parse_column(row, "priority")?,
        status: parse_column(row, "status")?,
        category: parse_column(row, "category")?,
        due_date,
    })
}

fn parse_column<T: FromStr>(row: &Row<'_>, column: &str) -> RepoResult<T> {
    let text: String = row.get(column)?;
    text.parse()
        .map_err(|_| RepoError::InvalidData(format!("invalid {column} `{text}` in todo.{column}")))
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|value| !value.is_empty())
}

/// Builds a LIKE pattern matching `needle` literally anywhere in the column.
fn contains_pattern(needle: &str) -> String {
    let mut pattern = String::with_capacity(needle.len() + 2);
    pattern.push('%');
    for ch in needle.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(ch);
    }
    pattern.push('%');
    pattern
}
