//! Command-line and environment options for `todo-server`.

use clap::Parser;
use std::path::PathBuf;
use todo_api::config::{DEFAULT_HOST, DEFAULT_PORT};
use todo_api::ServerConfig;

/// Default SQLite file, relative to the working directory.
pub const DEFAULT_DB_PATH: &str = "todoApplication.db";

#[derive(Parser, Debug)]
#[command(name = "todo-server", version, about = "Todo CRUD service over SQLite")]
pub struct Args {
    /// Host to bind the HTTP listener to.
    #[arg(long, env = "TODO_HOST", default_value = DEFAULT_HOST)]
    pub host: String,

    /// Port to bind the HTTP listener to.
    #[arg(long, env = "TODO_PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// SQLite database file; created, migrated and seeded when missing.
    #[arg(long, env = "TODO_DB_PATH", default_value = DEFAULT_DB_PATH)]
    pub db_path: PathBuf,

    /// One of trace|debug|info|warn|error. Defaults by build mode.
    #[arg(long, env = "TODO_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Absolute directory for rolling log files. Logs go to stderr when unset.
    #[arg(long, env = "TODO_LOG_DIR")]
    pub log_dir: Option<String>,
}

impl Args {
    pub fn server_config(&self) -> ServerConfig {
        ServerConfig {
            host: self.host.clone(),
            port: self.port,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let args = Args::try_parse_from(["todo-server"]).unwrap();

        assert_eq!(args.server_config(), ServerConfig::default());
        assert_eq!(args.db_path, PathBuf::from("todoApplication.db"));
        assert!(args.log_level.is_none());
        assert!(args.log_dir.is_none());
    }

    #[test]
    fn flags_override_defaults() {
        let args = Args::try_parse_from([
            "todo-server",
            "--host",
            "127.0.0.1",
            "--port",
            "8081",
            "--db-path",
            "/tmp/todos.db",
            "--log-level",
            "warn",
        ])
        .unwrap();

        assert_eq!(args.server_config().socket_addr(), "127.0.0.1:8081");
        assert_eq!(args.db_path, PathBuf::from("/tmp/todos.db"));
        assert_eq!(args.log_level.as_deref(), Some("warn"));
    }

    #[test]
    fn rejects_out_of_range_port() {
        assert!(Args::try_parse_from(["todo-server", "--port", "70000"]).is_err());
    }
}
