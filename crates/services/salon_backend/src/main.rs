// --- File: crates/services/salon_backend/src/main.rs ---
mod app_state;

use axum::Router;
use salon_booking::routes::routes;
use salon_common::logging;
use salon_config::load_config;
use std::process::ExitCode;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

#[tokio::main]
async fn main() -> ExitCode {
    let config = match load_config() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load config: {}", e);
            return ExitCode::FAILURE;
        }
    };
    // keeps the file writer flushing until shutdown
    let _log_guard = logging::init_from_config(&config.logging);

    let state = match app_state::build_state(&config).await {
        Ok(state) => state,
        Err(e) => {
            error!(error = %e, "Startup failed");
            return ExitCode::FAILURE;
        }
    };

    #[allow(unused_mut)] // mutated only with the openapi feature
    let mut app = Router::new().nest("/api", routes(state));

    #[cfg(feature = "openapi")]
    {
        use salon_booking::doc::BookingApiDoc;
        use utoipa::OpenApi;
        use utoipa_swagger_ui::SwaggerUi;

        info!("Adding Swagger UI at /api/docs");
        app = app.merge(SwaggerUi::new("/api/docs").url("/api/docs/openapi.json", BookingApiDoc::openapi()));
    }

    let app = app.layer(TraceLayer::new_for_http());

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = match TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(e) => {
            error!(addr = %addr, error = %e, "Could not bind");
            return ExitCode::FAILURE;
        }
    };
    info!("Listening on http://{}/api", addr);

    if let Err(e) = axum::serve(listener, app.into_make_service()).await {
        error!(error = %e, "Server stopped");
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}
