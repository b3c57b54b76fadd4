use anyhow::Context;
use axum::http::{header, Method};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use marquee::{build_router, config::Config, services::TmdbClient, AppState};

fn init_tracing() {
    // RUST_LOG overrides; default is debug for our crate, info for axum, warn for dependencies
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("marquee=debug,tower_http=debug,axum=info,warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn cors_layer(config: &Config) -> CorsLayer {
    // If no origins configured, only same-origin requests are allowed
    let base = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
        .max_age(Duration::from_secs(3600));

    if config.server.cors_origins.is_empty() {
        tracing::info!("CORS: No origins configured, same-origin only");
        base
    } else {
        use tower_http::cors::AllowOrigin;
        let origins: Vec<_> = config
            .server
            .cors_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        tracing::info!("CORS: Allowing origins {:?}", config.server.cors_origins);
        base.allow_origin(AllowOrigin::list(origins))
            .allow_credentials(true)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing first so we can log configuration loading
    init_tracing();

    tracing::info!("Starting Marquee v{}", env!("CARGO_PKG_VERSION"));

    let config = Config::load().context("Failed to load configuration")?;
    tracing::info!("Configuration loaded successfully");
    tracing::debug!("Server: {}:{}", config.server.host, config.server.port);

    // Create TMDB client if API key is configured
    let tmdb_client = match &config.tmdb.api_key {
        Some(api_key) if !api_key.trim().is_empty() => {
            match TmdbClient::new_shared(api_key.clone(), &config.tmdb) {
                Ok(client) => {
                    tracing::info!("TMDB client initialized");
                    Some(client)
                }
                Err(e) => {
                    tracing::error!("Failed to create TMDB client: {}", e);
                    None
                }
            }
        }
        _ => None,
    };

    let cors = cors_layer(&config);
    let addr = config.server_addr();
    let sweep_every = Duration::from_secs(config.session.sweep_interval_secs.max(1));

    let state = AppState::new(config, tmdb_client).context("Failed to build application state")?;

    let shutdown = CancellationToken::new();
    let sweeper = state.sessions.spawn_sweeper(sweep_every, shutdown.clone());

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    tracing::info!("Marquee listening on {}", addr);

    let signal = shutdown.clone();
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!("Failed to listen for shutdown signal: {}", e);
            }
            tracing::info!("Shutting down");
            signal.cancel();
        })
        .await
        .context("Server error")?;

    shutdown.cancel();
    let _ = sweeper.await;
    Ok(())
}
