//! Documentation of a head-to-head voting event.
//!
//! An admin sets up paired-option battles, each with a deadline. Anyone can vote once per battle,
//! and each battle's winner is revealed once its deadline passes.
//!
//!
//!
//! # General Infrastructure
//! - Single process, single JSON file as the store (see [`store`])
//! - Static frontend served from `public/` by the same server
//! - Reverse proxy in front sets `X-Forwarded-For`, which is how voters are told apart (see
//!   [`voter`])
//! - No background jobs, every request does load, check, mutate, save, respond
//!
//!
//!
//! # Request Flow
//!
//! Vote
//! - [`routes::vote_handler`] pulls the voter id from the request
//! - [`arena::Arena::cast_vote`] takes the store lock and loads the event
//! - [`vote::apply_vote`] checks battle, option, deadline, duplicate voter, then counts
//! - Event saved, lock released, [`project`] view returned
//!
//! Read
//! - [`arena::Arena::event`] takes the store lock and loads the event
//! - [`settle::settle`] fixes up any cached winner that no longer matches the counts, saved if
//!   changed
//! - [`project::project_event`] strips voter ids and hides winners of open battles
//!
//!
//!
//! # API
//!
//! Public
//! - `GET /api/event` title and projected battles
//! - `GET /api/battles`, `GET /api/battles/{id}`
//! - `POST /api/battles/{id}/vote` with `{ "optionKey": "optionA" }`
//!
//! Admin, `x-admin-password` header required
//! - `POST /api/admin/battles` with `{ optionAName, optionBName, imageReferenceA,
//!   imageReferenceB, deadline }`
//! - `DELETE /api/admin/battles/{id}`
//! - `POST /api/admin/title` with `{ newTitle }`
//!
//!
//!
//! # Notes
//!
//! ## Winner as a view
//! The first version of this service recomputed the winner on every vote and had a copy-paste bug
//! where option B was compared against itself, so B-only wins showed as ties. Now there is one
//! resolver ([`settle::resolve`]) used by both reads and writes, and the counts always win over
//! whatever is stored.
//!
//! ## Duplicate voters
//! Voter ids are client IPs. Shared networks share a vote. This is a speed bump, not a security
//! boundary.
//!
//!
//!
//! # Setup
//!
//! Run locally.
//! ```sh
//! RUST_LOG=info ADMIN_PASSWORD=secret cargo run -p arena-backend
//! ```
//!
//! Create a battle.
//! ```sh
//! cargo run -p arena-admin -- --password secret create Cat Dog \
//!     --image-a /uploads/cat.png --image-b /uploads/dog.png --closes-in 60
//! ```
//!
//! View current docs.
//! ```sh
//! cargo doc --open
//! ```
use std::{net::SocketAddr, sync::Arc, time::Duration};

use anyhow::Error;
use axum::{
    Router,
    http::{HeaderName, Method, header::CONTENT_TYPE},
    routing::{delete, get, post},
};

use signal::{
    ctrl_c,
    unix::{SignalKind, signal},
};
use tokio::{net::TcpListener, signal};
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt};

pub mod arena;
pub mod auth;
pub mod battle;
pub mod clock;
pub mod config;
pub mod error;
pub mod project;
pub mod routes;
pub mod settle;
pub mod state;
pub mod store;
pub mod vote;
pub mod voter;

use auth::ADMIN_HEADER;
use config::Config;
use routes::{
    battle_handler, battles_handler, create_battle_handler, event_handler, remove_battle_handler,
    title_handler, vote_handler,
};
use state::AppState;

pub fn app(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE, HeaderName::from_static(ADMIN_HEADER)])
        .max_age(Duration::from_secs(60 * 60));

    Router::new()
        .route("/api/event", get(event_handler))
        .route("/api/battles", get(battles_handler))
        .route("/api/battles/{id}", get(battle_handler))
        .route("/api/battles/{id}/vote", post(vote_handler))
        .route("/api/admin/battles", post(create_battle_handler))
        .route("/api/admin/battles/{id}", delete(remove_battle_handler))
        .route("/api/admin/title", post(title_handler))
        .fallback_service(ServeDir::new(&state.config.public_dir))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

pub async fn start_server() -> Result<(), Error> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    info!("Initializing state...");
    let config = Config::load()?;
    let state = AppState::new(config)?;

    info!("Starting server...");

    let address = format!("0.0.0.0:{}", state.config.port);
    info!("Binding to {address}");

    let listener = TcpListener::bind(&address).await?;
    info!("Server running on {address}");

    axum::serve(
        listener,
        app(state).into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    info!("Server shutting down...");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        ctrl_c().await.expect("Failed to install Ctrl+C handler");

        info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        signal(SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;

        info!("Received terminate signal, shutting down");
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
