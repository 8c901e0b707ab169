//! Todo HTTP server entry point.
//!
//! # Responsibility
//! - Resolve options, start logging, open the store and serve the router.
//! - Shut down gracefully and close the store explicitly.
//!
//! # Invariants
//! - Startup failures are logged, printed to stderr and exit non-zero.

mod args;

use args::Args;
use clap::Parser;
use log::{error, info, warn};
use std::process::ExitCode;
use std::sync::Arc;
use todo_api::router;
use todo_core::{core_version, default_log_level, init_logging, TodoStore};
use tokio::net::TcpListener;
use tokio::signal;

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("todo-server: {message}");
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> Result<(), String> {
    let level = args.log_level.as_deref().unwrap_or(default_log_level());
    init_logging(level, args.log_dir.as_deref())?;

    let store = TodoStore::open(&args.db_path).map_err(|err| {
        error!(
            "event=server_start module=server status=error stage=store_open db_path={} error={err}",
            args.db_path.display()
        );
        format!("failed to open database `{}`: {err}", args.db_path.display())
    })?;
    let store = Arc::new(store);

    let config = args.server_config();
    let addr = config.socket_addr();
    let listener = TcpListener::bind(&addr).await.map_err(|err| {
        error!("event=server_start module=server status=error stage=bind addr={addr} error={err}");
        format!("failed to bind `{addr}`: {err}")
    })?;

    info!(
        "event=server_start module=server status=ok addr={addr} db_path={} version={}",
        args.db_path.display(),
        core_version()
    );

    let served = axum::serve(listener, router(Arc::clone(&store)))
        .with_graceful_shutdown(shutdown_signal())
        .await;
    if let Err(err) = &served {
        error!("event=server_stop module=server status=error error={err}");
    } else {
        info!("event=server_stop module=server status=ok");
    }

    let closed = close_store(store);
    served.map_err(|err| format!("server error: {err}"))?;
    closed
}

fn close_store(store: Arc<TodoStore>) -> Result<(), String> {
    match Arc::try_unwrap(store) {
        Ok(store) => store
            .close()
            .map_err(|err| format!("failed to close database: {err}")),
        Err(_) => {
            warn!("event=store_close module=server status=skipped reason=still_shared");
            Ok(())
        }
    }
}

/// Resolves on SIGINT (Ctrl-C) or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            error!("event=signal_install module=server status=error signal=SIGINT error={err}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(err) => {
                error!(
                    "event=signal_install module=server status=error signal=SIGTERM error={err}"
                );
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("event=shutdown module=server status=start signal=SIGINT"),
        _ = terminate => info!("event=shutdown module=server status=start signal=SIGTERM"),
    }
}
