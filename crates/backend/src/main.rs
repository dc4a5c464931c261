mod assets;
mod config;

use std::path::Path;
use std::sync::Arc;

use axum::extract::State;
use axum::http::{header, HeaderValue};
use axum::response::{Html, IntoResponse};
use axum::{routing::get, Router};
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::set_header::SetResponseHeaderLayer;
use tracing_subscriber::EnvFilter;

use assets::Assets;
use config::Config;

type AppState = Arc<Assets>;

/// Plain-text bearer token for map tile requests.
async fn access_token(State(assets): State<AppState>) -> impl IntoResponse {
    (
        [
            (header::CONTENT_TYPE, "text/plain; charset=utf-8"),
            (header::CACHE_CONTROL, CACHE_NONE),
        ],
        assets.access_token.clone(),
    )
}

async fn dataset(State(assets): State<AppState>) -> impl IntoResponse {
    (
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
            (header::CACHE_CONTROL, CACHE_1DAY),
        ],
        assets.dataset_csv.clone(),
    )
}

async fn geojson(State(assets): State<AppState>) -> impl IntoResponse {
    (
        [
            (header::CONTENT_TYPE, "application/geo+json"),
            (header::CACHE_CONTROL, CACHE_1DAY),
        ],
        assets.geojson.clone(),
    )
}

/// Build a cache-controlled static file router.
///
/// Separated so tests can exercise the caching layer with arbitrary directories.
fn cached_static_router(dir: &Path, cache_header: &'static str) -> Router {
    let layer = SetResponseHeaderLayer::overriding(
        header::CACHE_CONTROL,
        HeaderValue::from_static(cache_header),
    );
    Router::new()
        .fallback_service(ServeDir::new(dir))
        .layer(layer)
}

const CACHE_NONE: &str = "no-store";
const CACHE_1DAY: &str = "public, max-age=86400, must-revalidate";
const CACHE_IMMUTABLE: &str = "public, max-age=31536000, immutable";

/// Build the full application router.
fn build_app(assets: AppState, dist_dir: &Path) -> Router {
    let static_files = Router::new()
        .nest(
            "/dist",
            cached_static_router(dist_dir, CACHE_IMMUTABLE),
        )
        .nest(
            "/assets",
            cached_static_router(&dist_dir.join("assets"), CACHE_IMMUTABLE),
        );

    let index_path = dist_dir.join("index.html");
    Router::new()
        .route("/access-token", get(access_token))
        .route("/data/listings.csv", get(dataset))
        .route("/data/listings.geojson", get(geojson))
        .route("/", get(move || serve_index(index_path)))
        .with_state(assets)
        .merge(static_files)
        .layer(CompressionLayer::new())
        .layer(CorsLayer::permissive())
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = match Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            tracing::error!(error = %e, "Invalid configuration");
            std::process::exit(1);
        }
    };

    // Without a token or a dataset the map can never initialize, so refuse to start.
    let loaded_assets = match Assets::load(&config) {
        Ok(a) => Arc::new(a),
        Err(e) => {
            tracing::error!(error = %e, "Failed to load startup assets");
            std::process::exit(1);
        }
    };

    let listing_count = loaded_assets.listing_count;
    let app = build_app(loaded_assets, &config.dist_dir);

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(l) => l,
        Err(e) => {
            tracing::error!(error = %e, %addr, "Failed to bind");
            std::process::exit(1);
        }
    };
    tracing::info!(
        listings = listing_count,
        "Server running at http://localhost:{}",
        config.port
    );

    if let Err(e) = axum::serve(listener, app).await {
        tracing::error!(error = %e, "Server error");
    }
}

async fn serve_index(index_path: std::path::PathBuf) -> Html<String> {
    // Try to serve the built frontend, fall back to a simple message
    match tokio::fs::read_to_string(&index_path).await {
        Ok(html) => Html(html),
        Err(_) => Html(
            r#"<!DOCTYPE html>
<html>
<head><title>Listing Map</title></head>
<body>
<h1>Listing Map</h1>
<p>Frontend not built yet. The dataset is available at <a href="/data/listings.csv">/data/listings.csv</a>.</p>
</body>
</html>"#
                .to_string(),
        ),
    }
}
