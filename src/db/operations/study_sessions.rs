use chrono::NaiveDate;
use serde::Serialize;
use sqlx::postgres::PgRow;
use sqlx::Row;

use crate::db::DatabaseProxy;

/// Append-only session log; aggregates are derived by scanning at read time.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StudySessionRow {
    pub id: i32,
    pub user_id: i64,
    pub activity: String,
    pub duration_minutes: i32,
    pub session_date: NaiveDate,
}

fn map_row(row: &PgRow) -> Result<StudySessionRow, sqlx::Error> {
    Ok(StudySessionRow {
        id: row.try_get("id")?,
        user_id: row.try_get("user_id")?,
        activity: row.try_get("activity")?,
        duration_minutes: row.try_get("duration_minutes")?,
        session_date: row.try_get("session_date")?,
    })
}

pub async fn insert_session(
    proxy: &DatabaseProxy,
    user_id: i64,
    activity: &str,
    duration_minutes: i32,
    session_date: NaiveDate,
) -> Result<StudySessionRow, sqlx::Error> {
    let row = sqlx::query(
        r#"
        INSERT INTO study_sessions (user_id, activity, duration_minutes, session_date)
        VALUES ($1, $2, $3, $4)
        RETURNING id, user_id, activity, duration_minutes, session_date
        "#,
    )
    .bind(user_id)
    .bind(activity)
    .bind(duration_minutes)
    .bind(session_date)
    .fetch_one(proxy.pool())
    .await?;

    map_row(&row)
}

pub async fn list_sessions(
    proxy: &DatabaseProxy,
    user_id: i64,
) -> Result<Vec<StudySessionRow>, sqlx::Error> {
    let rows = sqlx::query(
        r#"
        SELECT id, user_id, activity, duration_minutes, session_date
        FROM study_sessions
        WHERE user_id = $1
        ORDER BY session_date, id
        "#,
    )
    .bind(user_id)
    .fetch_all(proxy.pool())
    .await?;

    rows.iter().map(map_row).collect()
}
