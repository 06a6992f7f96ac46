//! Inkboard Persistence Server
//!
//! Stores pages and their shapes in memory and serves them as JSON under
//! `/api`. Starts with a single page, `Project 1`.
//!
//! ## Routes
//!
//! ```text
//! GET    /api/health
//! GET    /api/pages
//! POST   /api/pages                              { "name": "..." }
//! DELETE /api/pages/{id}
//! GET    /api/pages/{pageId}/shapes
//! POST   /api/pages/{pageId}/shapes              shape JSON with a string "id"
//! PUT    /api/pages/{pageId}/shapes/{shapeId}    partial shape JSON
//! DELETE /api/pages/{pageId}/shapes/{shapeId}
//! ```

mod config;
mod routes;
mod store;

use config::ServerConfig;
use std::{net::SocketAddr, sync::Arc};
use store::MemoryStore;
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "inkboard_server=info,tower_http=info".into()),
        )
        .init();

    let config = ServerConfig::from_env()?;
    let state = Arc::new(MemoryStore::seeded());
    let app = routes::router(state, &config);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    info!("Inkboard server listening on {}", addr);
    if let Some(frontend) = &config.frontend_url {
        info!("Accepting requests from {}", frontend);
    }

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
