//! Todo domain model.
//!
//! # Responsibility
//! - Define canonical data structures used by core business logic.
//! - Own field validation so every layer rejects the same inputs.
//!
//! # Invariants
//! - Every stored todo is identified by a stable `TodoId`.
//! - Deletion is a hard delete; there are no tombstones.

pub mod due_date;
pub mod todo;
