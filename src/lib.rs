//! HTTP service for polls.
//!
//! Clients create polls, attach choices to them and vote on those choices
//! until the poll expires. The most voted choice is reported as the poll's
//! result.
//!
//! | Method | Path | Success |
//! |---|---|---|
//! | GET | `/poll` | 200, all polls |
//! | GET | `/poll/{id}/choice` | 200, choices of a poll |
//! | GET | `/poll/{id}/result` | 200, winning choice (`null` before the first vote) |
//! | POST | `/poll` | 201, `{title, expireAt?}` |
//! | POST | `/choice` | 201, `{title, pollId}` |
//! | POST | `/choice/{id}/vote` | 201 |
//!
//! Failures answer with `{"kind": ..., "message": ...}`, see [`error::AppError`].
use std::{net::SocketAddr, sync::Arc, time::Duration};

use axum::Router;
use axum_server::Handle;
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod models;
pub mod poll;
pub mod routes;
pub mod store;
pub mod timestamp;

use config::Config;
use poll::PollService;
use store::PollStore;

/// Shared by every handler.
#[derive(Clone)]
pub struct AppState {
    pub polls: PollService,
    pub config: Arc<Config>,
}

pub fn build_app(store: Arc<dyn PollStore>, config: Config) -> Router {
    let state = AppState {
        polls: PollService::new(store),
        config: Arc::new(config),
    };

    routes::create_routes(state)
}

pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("poll_service=info,tower_http=info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(false).compact())
        .init();
}

/// Serves `app` on all interfaces until Ctrl+C or SIGTERM.
pub async fn serve(app: Router, port: u16) -> std::io::Result<()> {
    let address = SocketAddr::from(([0, 0, 0, 0], port));
    let handle = Handle::new();

    tokio::spawn(shutdown_signal(handle.clone()));

    info!("Server running on {address}");
    axum_server::bind(address)
        .handle(handle)
        .serve(app.into_make_service())
        .await?;

    info!("Server shut down");
    Ok(())
}

async fn shutdown_signal(handle: Handle) {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {e}");
            std::future::pending::<()>().await;
        }

        info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    handle.graceful_shutdown(Some(Duration::from_secs(10)));
}
