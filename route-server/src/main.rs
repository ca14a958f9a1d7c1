use std::process::ExitCode;

use route_server::config::AppConfig;
use route_server::directions::DirectionsClient;
use route_server::sequencer::Planner;
use route_server::tracking::SessionRegistry;
use route_server::web::{AppState, create_router};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("route_server=info,tower_http=info")),
        )
        .init();

    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "invalid configuration");
            return ExitCode::FAILURE;
        }
    };

    let provider = match config.directions.clone().map(DirectionsClient::new).transpose() {
        Ok(provider) => provider,
        Err(e) => {
            error!(error = %e, "failed to create directions client");
            return ExitCode::FAILURE;
        }
    };

    let planner = Planner::new(provider, config.sequencer.clone(), config.eta.clone());
    if !planner.has_remote() {
        warn!("DIRECTIONS_API_KEY not set; routes will be optimized internally");
    }

    let sessions = SessionRegistry::new(config.geofence.clone(), &config.registry);
    let app = create_router(AppState::new(planner, sessions));

    let listener = match tokio::net::TcpListener::bind(config.bind_addr).await {
        Ok(listener) => listener,
        Err(e) => {
            error!(addr = %config.bind_addr, error = %e, "failed to bind");
            return ExitCode::FAILURE;
        }
    };

    info!(addr = %config.bind_addr, "route server listening");
    info!("  GET    /health");
    info!("  POST   /optimize");
    info!("  POST   /tracking/sessions");
    info!("  PUT    /tracking/sessions/:id/stops");
    info!("  PUT    /tracking/sessions/:id/active");
    info!("  POST   /tracking/sessions/:id/positions");
    info!("  DELETE /tracking/sessions/:id");

    if let Err(e) = axum::serve(listener, app).await {
        error!(error = %e, "server error");
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}
