//! Todo domain model.
//!
//! # Responsibility
//! - Define the canonical todo record and its closed enum domains.
//! - Parse raw client payloads into typed values (field validation).
//!
//! # Invariants
//! - A constructed `Todo` always carries valid enum values and a calendar date.
//! - Validation checks fields in the order status, priority, category, due date
//!   and reports only the first violation.
//! - Empty strings in raw payloads are treated as absent fields, except the
//!   `todo` text on create.

use super::due_date::parse_due_date;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Store-assigned (or client-supplied) row identifier.
pub type TodoId = i64;

/// Field validation failure surfaced to clients verbatim.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TodoValidationError {
    InvalidStatus,
    InvalidPriority,
    InvalidCategory,
    InvalidDueDate,
    /// Required on create, but absent or empty.
    MissingField(&'static str),
}

impl Display for TodoValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidStatus => write!(f, "Invalid Todo Status"),
            Self::InvalidPriority => write!(f, "Invalid Todo Priority"),
            Self::InvalidCategory => write!(f, "Invalid Todo Category"),
            Self::InvalidDueDate => write!(f, "Invalid Due Date"),
            Self::MissingField(field) => write!(f, "Missing Todo Field: {field}"),
        }
    }
}

impl Error for TodoValidationError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Priority {
    #[serde(rename = "HIGH")]
    High,
    #[serde(rename = "MEDIUM")]
    Medium,
    #[serde(rename = "LOW")]
    Low,
}

impl Priority {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::High => "HIGH",
            Self::Medium => "MEDIUM",
            Self::Low => "LOW",
        }
    }
}

impl FromStr for Priority {
    type Err = TodoValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "HIGH" => Ok(Self::High),
            "MEDIUM" => Ok(Self::Medium),
            "LOW" => Ok(Self::Low),
            _ => Err(TodoValidationError::InvalidPriority),
        }
    }
}

/// Work state of a todo.
///
/// The wire form uses a space (`"TO DO"`); underscore spellings are accepted
/// on input and normalized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Status {
    #[serde(rename = "TO DO", alias = "TO_DO")]
    ToDo,
    #[serde(rename = "IN PROGRESS", alias = "IN_PROGRESS")]
    InProgress,
    #[serde(rename = "DONE")]
    Done,
}

impl Status {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ToDo => "TO DO",
            Self::InProgress => "IN PROGRESS",
            Self::Done => "DONE",
        }
    }
}

impl FromStr for Status {
    type Err = TodoValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "TO DO" | "TO_DO" => Ok(Self::ToDo),
            "IN PROGRESS" | "IN_PROGRESS" => Ok(Self::InProgress),
            "DONE" => Ok(Self::Done),
            _ => Err(TodoValidationError::InvalidStatus),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    #[serde(rename = "WORK")]
    Work,
    #[serde(rename = "HOME")]
    Home,
    #[serde(rename = "LEARNING")]
    Learning,
}

impl Category {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Work => "WORK",
            Self::Home => "HOME",
            Self::Learning => "LEARNING",
        }
    }
}

impl FromStr for Category {
    type Err = TodoValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "WORK" => Ok(Self::Work),
            "HOME" => Ok(Self::Home),
            "LEARNING" => Ok(Self::Learning),
            _ => Err(TodoValidationError::InvalidCategory),
        }
    }
}

/// Canonical todo record, also the formatted response shape.
///
/// `due_date` serializes as `dueDate` in `yyyy-MM-dd` form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Todo {
    pub id: TodoId,
    pub todo: String,
    pub priority: Priority,
    pub status: Status,
    pub category: Category,
    #[serde(rename = "dueDate")]
    pub due_date: NaiveDate,
}

/// Reduced projection returned by the priority/status listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodoSummary {
    pub id: TodoId,
    pub todo: String,
    pub priority: Priority,
    pub status: Status,
}

/// Fully validated record ready for insertion.
///
/// `id = None` lets the store assign the identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TodoDraft {
    pub id: Option<TodoId>,
    pub todo: String,
    pub priority: Priority,
    pub status: Status,
    pub category: Category,
    pub due_date: NaiveDate,
}

/// Raw partial payload as received from a client.
///
/// Every field is optional so the same shape serves update requests and the
/// field portion of create requests.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct TodoPatch {
    #[serde(default)]
    pub todo: Option<String>,
    #[serde(default)]
    pub priority: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default, rename = "dueDate")]
    pub due_date: Option<String>,
}

/// Raw create payload: optional client id plus the field set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct NewTodo {
    #[serde(default)]
    pub id: Option<TodoId>,
    #[serde(flatten)]
    pub fields: TodoPatch,
}

/// Typed result of validating a `TodoPatch`; `None` means "not supplied".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidatedPatch {
    pub todo: Option<String>,
    pub priority: Option<Priority>,
    pub status: Option<Status>,
    pub category: Option<Category>,
    pub due_date: Option<NaiveDate>,
}

impl TodoPatch {
    /// Validates present fields and returns their typed values.
    ///
    /// # Errors
    /// - Returns the first violation in the order status, priority, category,
    ///   due date.
    pub fn validate(&self) -> Result<ValidatedPatch, TodoValidationError> {
        let status = supplied(&self.status).map(Status::from_str).transpose()?;
        let priority = supplied(&self.priority)
            .map(Priority::from_str)
            .transpose()?;
        let category = supplied(&self.category)
            .map(Category::from_str)
            .transpose()?;
        let due_date = supplied(&self.due_date).map(parse_due_date).transpose()?;

        Ok(ValidatedPatch {
            todo: supplied(&self.todo).map(str::to_owned),
            priority,
            status,
            category,
            due_date,
        })
    }
}

impl NewTodo {
    /// Validates the payload and requires every field to be present.
    ///
    /// `todo` text only has to be present; an empty string is stored as is.
    pub fn to_draft(&self) -> Result<TodoDraft, TodoValidationError> {
        let validated = self.fields.validate()?;

        Ok(TodoDraft {
            id: self.id,
            todo: self
                .fields
                .todo
                .clone()
                .ok_or(TodoValidationError::MissingField("todo"))?,
            priority: validated
                .priority
                .ok_or(TodoValidationError::MissingField("priority"))?,
            status: validated
                .status
                .ok_or(TodoValidationError::MissingField("status"))?,
            category: validated
                .category
                .ok_or(TodoValidationError::MissingField("category"))?,
            due_date: validated
                .due_date
                .ok_or(TodoValidationError::MissingField("dueDate"))?,
        })
    }
}

impl ValidatedPatch {
    /// Merges supplied fields over `target`.
    ///
    /// Returns one label per supplied field, in the fixed order status,
    /// priority, todo, category, due date.
    pub fn apply_to(self, target: &mut Todo) -> Vec<&'static str> {
        let mut labels = Vec::new();

        if let Some(status) = self.status {
            target.status = status;
            labels.push("Status Updated");
        }
        if let Some(priority) = self.priority {
            target.priority = priority;
            labels.push("Priority Updated");
        }
        if let Some(todo) = self.todo {
            target.todo = todo;
            labels.push("Todo Updated");
        }
        if let Some(category) = self.category {
            target.category = category;
            labels.push("Category Updated");
        }
        if let Some(due_date) = self.due_date {
            target.due_date = due_date;
            labels.push("Due Date Updated");
        }

        labels
    }
}

fn supplied(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|value| !value.is_empty())
}
