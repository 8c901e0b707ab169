//! Core domain logic for the todo service.
//! This crate is the single source of truth for business invariants.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod store;

pub use db::{DbError, DbResult};
pub use logging::{default_log_level, init_logging};
pub use model::due_date::{format_due_date, parse_due_date};
pub use model::todo::{
    Category, NewTodo, Priority, Status, Todo, TodoDraft, TodoId, TodoPatch, TodoSummary,
    TodoValidationError,
};
pub use repo::todo_repo::{
    RepoError, RepoResult, SqliteTodoRepository, TodoListQuery, TodoRepository,
};
pub use service::todo_service::{TodoFilterParams, TodoService};
pub use store::TodoStore;

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
