use serde::{Deserialize, Serialize};
use sqlx::postgres::PgRow;
use sqlx::Row;

use crate::db::DatabaseProxy;

#[derive(Debug, Clone, Serialize)]
pub struct LessonRecord {
    pub id: i32,
    pub hsk_level: i32,
    pub lesson_number: i32,
    pub title: String,
    pub description: Option<String>,
    pub audio_url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LessonInput {
    pub hsk_level: i32,
    pub lesson_number: i32,
    pub title: String,
    pub description: Option<String>,
    pub audio_url: Option<String>,
}

fn map_row(row: &PgRow) -> Result<LessonRecord, sqlx::Error> {
    Ok(LessonRecord {
        id: row.try_get("id")?,
        hsk_level: row.try_get("hsk_level")?,
        lesson_number: row.try_get("lesson_number")?,
        title: row.try_get("title")?,
        description: row.try_get("description")?,
        audio_url: row.try_get("audio_url")?,
    })
}

const SELECT_COLUMNS: &str =
    "SELECT id, hsk_level, lesson_number, title, description, audio_url FROM lessons";

/// Lessons degrade to an empty list when the store is unconfigured or errors.
pub async fn list_lessons(
    proxy: Option<&DatabaseProxy>,
    hsk_level: Option<i32>,
) -> Vec<LessonRecord> {
    let Some(proxy) = proxy else {
        return Vec::new();
    };

    let result = match hsk_level {
        Some(level) => {
            sqlx::query(&format!(
                "{SELECT_COLUMNS} WHERE hsk_level = $1 ORDER BY lesson_number"
            ))
            .bind(level)
            .fetch_all(proxy.pool())
            .await
        }
        None => {
            sqlx::query(&format!(
                "{SELECT_COLUMNS} ORDER BY hsk_level, lesson_number"
            ))
            .fetch_all(proxy.pool())
            .await
        }
    };

    match result.and_then(|rows| rows.iter().map(map_row).collect()) {
        Ok(lessons) => lessons,
        Err(err) => {
            tracing::warn!(error = %err, "lesson fetch failed, serving empty list");
            Vec::new()
        }
    }
}

pub async fn get_lesson(
    proxy: &DatabaseProxy,
    id: i32,
) -> Result<Option<LessonRecord>, sqlx::Error> {
    let row = sqlx::query(&format!("{SELECT_COLUMNS} WHERE id = $1"))
        .bind(id)
        .fetch_optional(proxy.pool())
        .await?;
    row.as_ref().map(map_row).transpose()
}

pub async fn add_lesson(
    proxy: &DatabaseProxy,
    input: &LessonInput,
) -> Result<LessonRecord, sqlx::Error> {
    let row = sqlx::query(
        r#"
        INSERT INTO lessons (hsk_level, lesson_number, title, description, audio_url)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING id, hsk_level, lesson_number, title, description, audio_url
        "#,
    )
    .bind(input.hsk_level)
    .bind(input.lesson_number)
    .bind(&input.title)
    .bind(&input.description)
    .bind(&input.audio_url)
    .fetch_one(proxy.pool())
    .await?;

    map_row(&row)
}

pub async fn update_lesson(
    proxy: &DatabaseProxy,
    id: i32,
    input: &LessonInput,
) -> Result<Option<LessonRecord>, sqlx::Error> {
    let row = sqlx::query(
        r#"
        UPDATE lessons SET
            hsk_level = $2,
            lesson_number = $3,
            title = $4,
            description = $5,
            audio_url = $6
        WHERE id = $1
        RETURNING id, hsk_level, lesson_number, title, description, audio_url
        "#,
    )
    .bind(id)
    .bind(input.hsk_level)
    .bind(input.lesson_number)
    .bind(&input.title)
    .bind(&input.description)
    .bind(&input.audio_url)
    .fetch_optional(proxy.pool())
    .await?;

    row.as_ref().map(map_row).transpose()
}

pub async fn delete_lesson(proxy: &DatabaseProxy, id: i32) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM lessons WHERE id = $1")
        .bind(id)
        .execute(proxy.pool())
        .await?;
    Ok(result.rows_affected() > 0)
}
