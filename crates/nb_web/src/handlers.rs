use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use std::sync::Arc;
use nb_core::Article;
use tracing::error;
use crate::AppState;

/// A status plus a fixed message. Internal error details stay in the log.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: &'static str,
}

impl ApiError {
    fn not_found(message: &'static str) -> Self {
        Self { status: StatusCode::NOT_FOUND, message }
    }

    fn internal(message: &'static str) -> Self {
        Self { status: StatusCode::INTERNAL_SERVER_ERROR, message }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, self.message).into_response()
    }
}

pub async fn scrape(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Article>>, ApiError> {
    let articles = state.ingestor.scrape().await.map_err(|e| {
        error!("Scraping error: {}", e);
        ApiError::internal("An error occurred while fetching the data.")
    })?;
    Ok(Json(articles))
}

pub async fn save_articles(
    State(state): State<Arc<AppState>>,
) -> Result<(StatusCode, Json<Vec<Article>>), ApiError> {
    let saved = state.ingestor.save_current().await.map_err(|e| {
        error!("Saving articles error: {}", e);
        ApiError::internal("An error occurred while saving the data.")
    })?;
    Ok((StatusCode::CREATED, Json(saved)))
}

pub async fn random_article(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Article>, ApiError> {
    state
        .ingestor
        .random_current()
        .await
        .map(Json)
        .ok_or_else(|| ApiError::not_found("No articles available. Please scrape first."))
}

pub async fn random_db_article(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Article>, ApiError> {
    match state.articles.random_one().await {
        Ok(Some(article)) => Ok(Json(article)),
        Ok(None) => Err(ApiError::not_found("No articles in the database.")),
        Err(e) => {
            error!("Fetching random article error: {}", e);
            Err(ApiError::internal("An error occurred while fetching a random article."))
        }
    }
}
