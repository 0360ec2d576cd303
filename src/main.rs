use axum::Router;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod alexa;
mod cache;
mod config;
mod error;
mod limits;
mod locations;
mod orchestrator;
mod recommend;
mod routes;
mod sun;
mod timeslot;
mod upstream;

use config::Config;
use limits::FetchLimits;
use orchestrator::Aggregator;
use routes::{create_router, AppState};
use upstream::LiveConditions;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables from .env file
    dotenv::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "shorecast_server=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Arc::new(Config::from_env()?);
    let limits = Arc::new(FetchLimits::new());

    let source = Arc::new(LiveConditions::new(config.clone(), limits.clone()));
    let aggregator = Arc::new(Aggregator::new(source));

    let state = AppState {
        config: config.clone(),
        aggregator,
        limits,
    };

    let app: Router = create_router(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Shorecast running on http://{}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
