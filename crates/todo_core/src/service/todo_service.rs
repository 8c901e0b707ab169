//! Todo use-case service.
//!
//! # Responsibility
//! - Turn raw client inputs into validated repository calls.
//! - Own use-case rules: partial-update merging, change labels, defaults.
//!
//! # Invariants
//! - Validation always runs before any store access.
//! - Service layer remains storage-agnostic.

use crate::model::due_date::parse_due_date;
use crate::model::todo::{NewTodo, Todo, TodoId, TodoPatch, TodoSummary};
use crate::repo::todo_repo::{RepoError, RepoResult, TodoListQuery, TodoRepository};
use log::debug;

/// Default `priority` for the priority/status listing.
pub const DEFAULT_SUMMARY_PRIORITY: &str = "HIGH";

/// Raw listing filters as received from a client.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TodoFilterParams {
    pub status: Option<String>,
    pub priority: Option<String>,
    pub category: Option<String>,
    pub search: Option<String>,
}

/// Use-case service wrapper for todo operations.
pub struct TodoService<R: TodoRepository> {
    repo: R,
}

impl<R: TodoRepository> TodoService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Lists todos matching every supplied filter.
    ///
    /// # Errors
    /// - `RepoError::Validation` for the first invalid enum filter; the store
    ///   is not queried in that case.
    pub fn list_todos(&self, params: &TodoFilterParams) -> RepoResult<Vec<Todo>> {
        let query = TodoListQuery::from_raw(
            params.status.as_deref(),
            params.priority.as_deref(),
            params.category.as_deref(),
            params.search.as_deref(),
        )?;
        self.repo.list_todos(&query)
    }

    /// Lists the reduced projection by exact priority and status substring.
    ///
    /// `priority` defaults to `HIGH` and `status` to the empty string. No
    /// validation is applied. Underscores in `status` match the stored space,
    /// so `TO_DO` finds `TO DO`.
    pub fn list_by_priority_and_status(
        &self,
        priority: Option<&str>,
        status: Option<&str>,
    ) -> RepoResult<Vec<TodoSummary>> {
        let status_fragment = status.unwrap_or_default().replace('_', " ");
        self.repo.list_summaries(
            priority.unwrap_or(DEFAULT_SUMMARY_PRIORITY),
            &status_fragment,
        )
    }

    /// Gets one todo by id.
    ///
    /// # Errors
    /// - `RepoError::NotFound` when no row has this id.
    pub fn get_todo(&self, id: TodoId) -> RepoResult<Todo> {
        self.repo.get_todo(id)?.ok_or(RepoError::NotFound(id))
    }

    /// Lists todos due on the given (raw, unnormalized) date.
    pub fn agenda(&self, date: Option<&str>) -> RepoResult<Vec<Todo>> {
        let date = parse_due_date(date.unwrap_or_default())?;
        self.repo.list_due_on(date)
    }

    /// Validates and inserts a new todo, returning its id.
    pub fn create_todo(&self, payload: &NewTodo) -> RepoResult<TodoId> {
        let draft = payload.to_draft()?;
        let id = self.repo.create_todo(&draft)?;
        debug!("event=todo_create module=service status=ok id={id}");
        Ok(id)
    }

    /// Applies a partial update and returns the comma-joined change labels.
    ///
    /// # Contract
    /// - Supplied fields are validated before the current row is loaded.
    /// - Omitted or empty fields keep their current value.
    /// - Returns an empty string when nothing was supplied.
    pub fn update_todo(&self, id: TodoId, patch: &TodoPatch) -> RepoResult<String> {
        let validated = patch.validate()?;
        let mut current = self.get_todo(id)?;

        let labels = validated.apply_to(&mut current);
        self.repo.update_todo(&current)?;
        debug!(
            "event=todo_update module=service status=ok id={id} fields={}",
            labels.len()
        );

        Ok(labels.join(", "))
    }

    /// Deletes a todo; absent ids are not an error.
    pub fn delete_todo(&self, id: TodoId) -> RepoResult<()> {
        let removed = self.repo.delete_todo(id)?;
        debug!("event=todo_delete module=service status=ok id={id} removed={removed}");
        Ok(())
    }
}
