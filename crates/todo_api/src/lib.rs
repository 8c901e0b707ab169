//! HTTP surface for the todo service.
//!
//! `todo_core` owns validation and persistence; this crate only maps REST
//! requests onto it.

pub mod api;
pub mod config;
pub mod error;

pub use api::{router, AppState};
pub use config::ServerConfig;
pub use error::{ApiError, ApiResult};
