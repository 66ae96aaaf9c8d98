use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

mod routes;
mod utils;

use routes::router;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter("static_server=info,tower_http=info")
        .init();

    let root = std::env::var("STATIC_ROOT").unwrap_or_else(|_| ".".to_string());
    let root = Arc::new(PathBuf::from(root));

    let app = router(root.clone());

    let port = std::env::var("PORT").unwrap_or_else(|_| "8000".to_string());
    let addr = format!("0.0.0.0:{}", port);

    info!("Serving {} at http://{}/", root.display(), addr);
    info!("Routing:");
    info!("  / → index.html");
    info!("  /bd → book-details.html");
    info!("  /bd/* → book-details.html");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
