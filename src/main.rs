//! Location ingest server.
//!
//! Accepts batches of device location reports on `POST /api/locations`,
//! validates them and appends the accepted ones to a day-partitioned NDJSON
//! log. Run with
//! ```not_rust
//! LOCATION_LOG_DIR=/var/lib/locations REFERENCE_TIMEZONE=America/Guayaquil cargo run
//! ```

mod config;
mod handlers;
mod models;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Server;
use tower_http::cors::CorsLayer;
use tower_http::trace::{DefaultMakeSpan, TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::AppConfig;
use crate::handlers::location_logger::{DayLog, LocationLogger};
use crate::handlers::routes::{router, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "location_ingest=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::from_env();
    let zone = config.reference_zone();

    let logger = LocationLogger::spawn(DayLog::new(config.log_dir.clone()));

    let app = router(AppState::new(Arc::new(logger), zone))
        .layer(CorsLayer::permissive())
        // logging so we can see whats going on
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::default().include_headers(true)),
        );

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    info!(
        "listening on {} (timezone {}, host fallback: {})",
        addr,
        zone.name(),
        zone.is_degraded()
    );

    Server::bind(&addr)
        .serve(app.into_make_service())
        .await?;

    Ok(())
}
