use axum::{Extension, Router};
use std::sync::Arc;
use tower_http::cors::CorsLayer;

mod collector;
mod config;
mod error;
mod handlers;
mod middleware;
mod models;
mod resolver;
mod youtube_client;

/// Shared per-process state. All request state stays local to the handler;
/// this only carries the optional upstream client and the tunable limits.
pub struct AppState {
    pub youtube: Option<youtube_client::YouTubeClient>,
    pub resolver_limits: config::ResolverLimits,
    pub collector_limits: config::CollectorLimits,
}

#[tokio::main]
async fn main() {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    init_logging().expect("Failed to initialize logging");

    let app_config = config::AppConfig::from_env();

    let youtube = match app_config.youtube.clone() {
        Some(youtube_config) => {
            tracing::info!("Initializing YouTube Data API client...");
            Some(youtube_client::YouTubeClient::new(youtube_config))
        }
        None => {
            tracing::warn!("YOUTUBE_API_KEY not found. Upstream requests will be rejected.");
            tracing::info!("To enable the YouTube Data API, set: YOUTUBE_API_KEY");
            None
        }
    };

    let shared_state = Arc::new(AppState {
        youtube,
        resolver_limits: config::ResolverLimits::default(),
        collector_limits: config::CollectorLimits::default(),
    });

    let app = Router::new()
        .merge(handlers::channels::channel_routes())
        .layer(axum::middleware::from_fn(
            middleware::logging::request_logging_middleware,
        ))
        .layer(CorsLayer::permissive())
        .layer(Extension(shared_state));

    let addr = format!("0.0.0.0:{}", app_config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("Failed to bind server address");
    tracing::info!("listening on {}", listener.local_addr().unwrap());
    axum::serve(listener, app).await.unwrap();
}

// Logging configuration: env-filter driven, JSON output opt-in
fn init_logging() -> Result<(), Box<dyn std::error::Error>> {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

    let log_level = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if cfg!(debug_assertions) {
            "debug,channel_fetcher=trace,reqwest=info,hyper=info,tower=info".to_string()
        } else {
            "info,channel_fetcher=info,reqwest=warn,hyper=warn,tower=warn".to_string()
        }
    });

    let env_filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(&log_level))?;

    let fmt_layer = if std::env::var("LOG_FORMAT").as_deref() == Ok("json") {
        // JSON logging for production (easier for log aggregation)
        fmt::layer()
            .json()
            .with_current_span(true)
            .with_span_list(false)
            .with_target(true)
            .boxed()
    } else {
        // Human-readable logging for development
        fmt::layer()
            .with_target(true)
            .with_file(true)
            .with_line_number(true)
            .boxed()
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();

    tracing::info!("YouTube Channel Fetcher starting up...");
    tracing::info!("Version: {}", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        "Build mode: {}",
        if cfg!(debug_assertions) { "development" } else { "production" }
    );

    Ok(())
}
