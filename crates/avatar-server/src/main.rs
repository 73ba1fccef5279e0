//! Avatar server binary.
//!
//! Starts an axum HTTP server with structured logging and graceful shutdown
//! on SIGTERM/SIGINT.

use avatar_server::{app, build_state, config};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

fn resolve_config_path() -> (Option<String>, &'static str) {
    config_path_from(std::env::args().nth(1), std::env::var("AVATAR_CONFIG_PATH").ok())
}

/// Picks the config path: CLI argument first, then the environment variable.
fn config_path_from(
    cli_arg: Option<String>,
    env_var: Option<String>,
) -> (Option<String>, &'static str) {
    if let Some(path) = cli_arg.filter(|value| !value.trim().is_empty()) {
        return (Some(path), "cli-arg");
    }
    if let Some(path) = env_var.filter(|value| !value.trim().is_empty()) {
        return (Some(path), "env-var");
    }
    (None, "default")
}

#[tokio::main]
async fn main() {
    let (resolved_config_path, config_source) = resolve_config_path();
    let selected_config_path = resolved_config_path.as_deref().or(Some("config.toml"));

    let config = config::load_config(selected_config_path)
        .expect("failed to load configuration, the server cannot start without valid config");

    let filter =
        EnvFilter::try_new(&config.logging.level).unwrap_or_else(|_| EnvFilter::new("info"));

    if config.logging.json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }

    tracing::info!(
        source = config_source,
        path = selected_config_path.unwrap_or("<none>"),
        "resolved startup configuration path"
    );

    let state = build_state(&config).expect("failed to initialize the response pipeline");

    let missing = state.responder.fallback().missing_files();
    if !missing.is_empty() {
        tracing::warn!(
            ?missing,
            "fallback clips missing, fallback replies will fail until they are provided"
        );
    }

    let app = app(state);
    let addr = SocketAddr::new(config.server.host, config.server.port);

    tracing::info!(%addr, "starting avatar server");

    let listener = TcpListener::bind(addr)
        .await
        .expect("failed to bind to address, is another process using this port?");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("server error");

    tracing::info!("avatar server shut down");
}

/// Waits for a SIGINT (Ctrl+C) or SIGTERM signal for graceful shutdown.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => { tracing::info!("received SIGINT, initiating graceful shutdown"); }
        () = terminate => { tracing::info!("received SIGTERM, initiating graceful shutdown"); }
    }
}
