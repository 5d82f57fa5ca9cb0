use axum::{
    routing::{get, post},
    Router,
};
use nb_core::{Error, Result};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::info;

pub mod handlers;
pub mod state;

pub use state::AppState;

pub fn create_app(state: AppState) -> Router {
    let cors = CorsLayer::permissive();

    Router::new()
        .route("/scrape", get(handlers::scrape))
        .route("/save-articles", post(handlers::save_articles))
        .route("/random-article", get(handlers::random_article))
        .route("/random-db-article", get(handlers::random_db_article))
        .layer(cors)
        .with_state(Arc::new(state))
}

pub async fn serve(state: AppState, addr: SocketAddr) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("🚀 Server is running on http://{}", listener.local_addr()?);
    axum::serve(listener, create_app(state))
        .await
        .map_err(Error::Io)
}
