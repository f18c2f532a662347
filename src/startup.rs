use crate::components::bridge::LookupBridge;
use crate::components::calendar_feed::CalendarFeedHandle;
use crate::components::shifts::ShiftEngine;
use crate::config::Config;
use crate::error::{BoardResult, Error};
use crate::handlers::{
    health_handler, search_handler, shifts_handler, tickets_handler, today_shifts_handler,
    AppState,
};
use crate::shutdown;
use axum::{routing::get, Router};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Initialize logging with environment-based configuration
pub fn init_logging() -> miette::Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,tower_http=debug")),
        )
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| Error::Other(format!("Failed to set up logging: {}", e)))?;

    Ok(())
}

/// Load and initialize the application config
pub fn load_config() -> miette::Result<Arc<Config>> {
    match Config::load() {
        Ok(config) => Ok(Arc::new(config)),
        Err(e) => {
            error!("Failed to load configuration: {:?}", e);
            Err(e.into())
        }
    }
}

/// Wire the engine, bridge and a live feed together
pub fn build_state(config: Arc<Config>) -> BoardResult<(AppState, CalendarFeedHandle)> {
    let engine = ShiftEngine::from_config(&config)?;
    info!("Shift engine ready: {:?}", engine);

    let feed = CalendarFeedHandle::new(Arc::clone(&config))?;
    let bridge = LookupBridge::from_config(&config);

    let state = AppState {
        config,
        feed: Arc::new(feed.clone()),
        engine: Arc::new(engine),
        bridge: Arc::new(bridge),
    };

    Ok((state, feed))
}

/// Build the router; route groups disabled in config are left out
pub fn build_router(state: AppState) -> Router {
    let config = Arc::clone(&state.config);
    let mut app = Router::new().route("/health", get(health_handler));

    if config.is_component_enabled("shifts") {
        app = app
            .route("/api/shifts", get(shifts_handler))
            .route("/api/shifts/today", get(today_shifts_handler));
    }
    if config.is_component_enabled("asset_search") {
        app = app.route("/api/search", get(search_handler));
    }
    if config.is_component_enabled("tickets") {
        app = app.route("/api/tickets", get(tickets_handler));
    }

    app.fallback_service(ServeDir::new(&config.static_dir))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Start the HTTP server and run until a shutdown signal arrives
pub async fn start_server(config: Arc<Config>) -> miette::Result<()> {
    let (state, feed) = build_state(Arc::clone(&config))?;
    let app = build_router(state);

    let addr: SocketAddr = format!("{}:{}", config.bind_address, config.port)
        .parse()
        .map_err(|e| Error::Config(format!("Invalid bind address: {}", e)))?;
    info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(Error::from)?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown::handle_signals(feed))
        .await
        .map_err(Error::from)?;

    info!("Server stopped");
    Ok(())
}
