use axum::{
    Router,
    http::{StatusCode, Uri},
};
use tower_http::{services::ServeDir, trace::TraceLayer};

use crate::BackendSettings;

/// Request prefix under which `assets_dir` is exposed.
pub const ASSETS_MOUNT: &str = "/assets";

/// The transport requests fall through to: static files from the assets
/// directory, 404 for anything else.
pub fn asset_transport(settings: &BackendSettings) -> Router {
    Router::new()
        .nest_service(ASSETS_MOUNT, ServeDir::new(&settings.assets_dir))
        .fallback(not_found)
        .layer(TraceLayer::new_for_http())
}

async fn not_found(uri: Uri) -> (StatusCode, String) {
    (StatusCode::NOT_FOUND, format!("no resource at {}", uri.path()))
}
