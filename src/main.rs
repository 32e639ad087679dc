#![warn(clippy::pedantic, clippy::all, clippy::nursery)]
#![allow(clippy::single_match_else)]

use crate::{config::RuntimeConfiguration, state::StudentsState};
use sqlx::postgres::PgPoolOptions;
use tokio::{net::TcpListener, signal};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[macro_use]
extern crate tracing;

mod cache;
mod config;
mod dashboard;
mod data;
mod error;
mod maud_conveniences;
mod routes;
mod service;
mod state;
mod view;

async fn shutdown_signal(state: StudentsState) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    warn!("signal received, starting graceful shutdown");
    state.sensible_shutdown().await;
}

#[tokio::main]
async fn main() {
    // a missing .env is fine, everything can come from the real environment
    let dotenv_result = dotenvy::dotenv();

    tracing::subscriber::set_global_default(
        FmtSubscriber::builder()
            .with_env_filter(EnvFilter::from_default_env())
            .finish(),
    )
    .expect("unable to set tracing subscriber");

    info!("`tracing` online");
    if let Err(e) = dotenv_result {
        debug!(?e, "No .env file loaded");
    }

    let options = PgPoolOptions::new().max_connections(15);
    let config = RuntimeConfiguration::new().expect("unable to create config");
    let server_ip = config.server_ip().to_string();
    let state = StudentsState::new(options, config)
        .await
        .expect("unable to create state");

    let app = routes::router(state.clone());

    let listener = TcpListener::bind(&server_ip)
        .await
        .expect("unable to listen on server ip");

    info!(?server_ip, "Listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(state))
        .await
        .expect("unable to serve app");
}
