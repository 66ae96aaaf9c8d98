pub mod pages;

use axum::Router;
use std::path::PathBuf;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub type SiteRoot = Arc<PathBuf>;

pub fn router(root: SiteRoot) -> Router {
    Router::new()
        .fallback(pages::serve_path)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(root)
}
