use axum::extract::{Extension, State};
use axum::Json;
use chrono::NaiveDate;
use serde::Deserialize;

use crate::auth::TelegramIdentity;
use crate::db::operations::study_sessions::StudySessionRow;
use crate::response::AppError;
use crate::routes::require_store;
use crate::services::study_time::{self, StudySummary, StudyTimeError};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordSessionBody {
    pub activity: String,
    pub duration_minutes: i32,
    pub session_date: Option<NaiveDate>,
}

fn map_study_error(err: StudyTimeError) -> AppError {
    match err {
        StudyTimeError::Validation(message) => AppError::validation(message),
        StudyTimeError::Sql(err) => {
            tracing::error!(error = %err, "study session query failed");
            AppError::internal("Internal server error")
        }
    }
}

pub async fn record(
    State(state): State<AppState>,
    Extension(identity): Extension<TelegramIdentity>,
    Json(body): Json<RecordSessionBody>,
) -> Result<Json<StudySessionRow>, AppError> {
    let proxy = require_store(&state)?;
    let row = study_time::record_session(
        proxy,
        identity.telegram_id,
        &body.activity,
        body.duration_minutes,
        body.session_date,
    )
    .await
    .map_err(map_study_error)?;
    Ok(Json(row))
}

pub async fn summary(
    State(state): State<AppState>,
    Extension(identity): Extension<TelegramIdentity>,
) -> Result<Json<StudySummary>, AppError> {
    let Some(proxy) = state.db_proxy() else {
        return Ok(Json(StudySummary::empty(chrono::Utc::now().date_naive())));
    };

    let summary = study_time::summarize(proxy, identity.telegram_id)
        .await
        .map_err(map_study_error)?;
    Ok(Json(summary))
}
