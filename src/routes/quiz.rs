use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;

use crate::response::AppError;
use crate::services::quiz::{self, QuizError, QuizQuestion};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct QuizQuery {
    pub level: Option<String>,
    pub exclude: Option<String>,
}

pub async fn next_question(
    State(state): State<AppState>,
    Query(query): Query<QuizQuery>,
) -> Result<Json<QuizQuestion>, AppError> {
    let exclude = query
        .exclude
        .as_deref()
        .map(quiz::parse_exclude)
        .unwrap_or_default();

    match quiz::next_question(state.db_proxy(), query.level.as_deref(), &exclude).await {
        Ok(question) => Ok(Json(question)),
        Err(err @ QuizError::Exhausted { .. }) => Err(AppError::not_found(err.to_string())),
        Err(QuizError::Timeout) => {
            tracing::warn!("quiz pool fetch timed out");
            Err(AppError::service_unavailable("Quiz pool fetch timed out"))
        }
        Err(QuizError::Sql(err)) => {
            tracing::error!(error = %err, "quiz pool fetch failed");
            Err(AppError::internal("Internal server error"))
        }
    }
}
