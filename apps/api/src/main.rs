mod analytics;
mod config;
mod errors;
mod graphql;
mod interview;
mod models;
mod pages;
mod positions;
mod routes;
mod session;
mod state;
mod wizard;

use anyhow::Result;
use std::net::SocketAddr;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::routes::build_router;
use crate::state::{AppState, Collaborators};

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={}",
                env!("CARGO_PKG_NAME").replace('-', "_"),
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting board API v{}", env!("CARGO_PKG_VERSION"));

    // One connection pool for GraphQL, auth, storage, revalidation and analytics
    let client = reqwest::Client::new();
    info!("GraphQL endpoint: {}", config.graphql_url);
    if config.mixpanel_token.is_none() {
        info!("MIXPANEL_TOKEN not set, analytics events are only logged");
    }

    let collaborators = Collaborators::over_http(&config, client);
    let state = AppState::new(config.clone(), collaborators);

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict origins to SITE_URL once the boards share a domain

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
