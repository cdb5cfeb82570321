use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::postgres::PgRow;
use sqlx::Row;

use crate::db::DatabaseProxy;

/// One row per (user, lesson) pair; `section_progress` is the five-key
/// boolean map stored as JSONB.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LessonProgressRow {
    pub user_id: i64,
    pub lesson_id: i32,
    pub section_progress: serde_json::Value,
    pub completed: bool,
    pub completed_at: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
}

/// Per-vocabulary attempt counters, one row per (user, vocabulary) pair.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VocabProgressRow {
    pub user_id: i64,
    pub vocabulary_id: i32,
    pub correct_count: i32,
    pub incorrect_count: i32,
    pub mastery_level: i32,
    pub last_reviewed: DateTime<Utc>,
}

fn map_lesson_row(row: &PgRow) -> Result<LessonProgressRow, sqlx::Error> {
    Ok(LessonProgressRow {
        user_id: row.try_get("user_id")?,
        lesson_id: row.try_get("lesson_id")?,
        section_progress: row.try_get("section_progress")?,
        completed: row.try_get("completed")?,
        completed_at: row.try_get("completed_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn map_vocab_row(row: &PgRow) -> Result<VocabProgressRow, sqlx::Error> {
    Ok(VocabProgressRow {
        user_id: row.try_get("user_id")?,
        vocabulary_id: row.try_get("vocabulary_id")?,
        correct_count: row.try_get("correct_count")?,
        incorrect_count: row.try_get("incorrect_count")?,
        mastery_level: row.try_get("mastery_level")?,
        last_reviewed: row.try_get("last_reviewed")?,
    })
}

const LESSON_COLUMNS: &str =
    "user_id, lesson_id, section_progress, completed, completed_at, updated_at";

/// Merge-upsert of a single section flag. `initial_sections` is the full
/// five-key map for a first insert; the conflict path merges field-level
/// (`section_progress || {section: true}`) inside one statement, so two
/// concurrent updates to different sections both land.
pub async fn upsert_section(
    proxy: &DatabaseProxy,
    user_id: i64,
    lesson_id: i32,
    section: &str,
    initial_sections: &serde_json::Value,
) -> Result<LessonProgressRow, sqlx::Error> {
    let row = sqlx::query(&format!(
        r#"
        INSERT INTO user_lesson_progress
            (user_id, lesson_id, section_progress, completed, updated_at)
        VALUES ($1, $2, $3::jsonb, FALSE, now())
        ON CONFLICT (user_id, lesson_id) DO UPDATE SET
            section_progress =
                user_lesson_progress.section_progress || jsonb_build_object($4::text, TRUE),
            updated_at = now()
        RETURNING {LESSON_COLUMNS}
        "#
    ))
    .bind(user_id)
    .bind(lesson_id)
    .bind(initial_sections)
    .bind(section)
    .fetch_one(proxy.pool())
    .await?;

    map_lesson_row(&row)
}

/// Marks the lesson complete. `completed_at` is set only on the false-to-true
/// transition; re-completing keeps the original timestamp.
pub async fn mark_complete(
    proxy: &DatabaseProxy,
    user_id: i64,
    lesson_id: i32,
    default_sections: &serde_json::Value,
) -> Result<LessonProgressRow, sqlx::Error> {
    let row = sqlx::query(&format!(
        r#"
        INSERT INTO user_lesson_progress
            (user_id, lesson_id, section_progress, completed, completed_at, updated_at)
        VALUES ($1, $2, $3::jsonb, TRUE, now(), now())
        ON CONFLICT (user_id, lesson_id) DO UPDATE SET
            completed = TRUE,
            completed_at = COALESCE(user_lesson_progress.completed_at, now()),
            updated_at = now()
        RETURNING {LESSON_COLUMNS}
        "#
    ))
    .bind(user_id)
    .bind(lesson_id)
    .bind(default_sections)
    .fetch_one(proxy.pool())
    .await?;

    map_lesson_row(&row)
}

pub async fn get_lesson_progress(
    proxy: &DatabaseProxy,
    user_id: i64,
    lesson_id: i32,
) -> Result<Option<LessonProgressRow>, sqlx::Error> {
    let row = sqlx::query(&format!(
        "SELECT {LESSON_COLUMNS} FROM user_lesson_progress WHERE user_id = $1 AND lesson_id = $2"
    ))
    .bind(user_id)
    .bind(lesson_id)
    .fetch_optional(proxy.pool())
    .await?;

    row.as_ref().map(map_lesson_row).transpose()
}

pub async fn list_lesson_progress(
    proxy: &DatabaseProxy,
    user_id: i64,
) -> Result<Vec<LessonProgressRow>, sqlx::Error> {
    let rows = sqlx::query(&format!(
        "SELECT {LESSON_COLUMNS} FROM user_lesson_progress WHERE user_id = $1 ORDER BY lesson_id"
    ))
    .bind(user_id)
    .fetch_all(proxy.pool())
    .await?;

    rows.iter().map(map_lesson_row).collect()
}

/// Records one quiz attempt against a vocabulary item. Counter bumps and the
/// 0..=5 mastery clamp are done in SQL so the row update is atomic.
pub async fn update_vocab_progress(
    proxy: &DatabaseProxy,
    user_id: i64,
    vocabulary_id: i32,
    correct: bool,
) -> Result<VocabProgressRow, sqlx::Error> {
    let row = sqlx::query(
        r#"
        INSERT INTO user_progress
            (user_id, vocabulary_id, correct_count, incorrect_count, mastery_level, last_reviewed)
        VALUES ($1, $2,
                CASE WHEN $3 THEN 1 ELSE 0 END,
                CASE WHEN $3 THEN 0 ELSE 1 END,
                CASE WHEN $3 THEN 1 ELSE 0 END,
                now())
        ON CONFLICT (user_id, vocabulary_id) DO UPDATE SET
            correct_count = user_progress.correct_count + CASE WHEN $3 THEN 1 ELSE 0 END,
            incorrect_count = user_progress.incorrect_count + CASE WHEN $3 THEN 0 ELSE 1 END,
            mastery_level = CASE
                WHEN $3 THEN LEAST(user_progress.mastery_level + 1, 5)
                ELSE GREATEST(user_progress.mastery_level - 1, 0)
            END,
            last_reviewed = now()
        RETURNING user_id, vocabulary_id, correct_count, incorrect_count,
                  mastery_level, last_reviewed
        "#,
    )
    .bind(user_id)
    .bind(vocabulary_id)
    .bind(correct)
    .fetch_one(proxy.pool())
    .await?;

    map_vocab_row(&row)
}

pub async fn list_vocab_progress(
    proxy: &DatabaseProxy,
    user_id: i64,
) -> Result<Vec<VocabProgressRow>, sqlx::Error> {
    let rows = sqlx::query(
        r#"
        SELECT user_id, vocabulary_id, correct_count, incorrect_count,
               mastery_level, last_reviewed
        FROM user_progress
        WHERE user_id = $1
        ORDER BY last_reviewed DESC
        "#,
    )
    .bind(user_id)
    .fetch_all(proxy.pool())
    .await?;

    rows.iter().map(map_vocab_row).collect()
}

/// Raw (correct, incorrect) counters for the stats aggregation.
pub async fn attempt_counts(
    proxy: &DatabaseProxy,
    user_id: i64,
) -> Result<Vec<(i32, i32)>, sqlx::Error> {
    let rows = sqlx::query(
        "SELECT correct_count, incorrect_count FROM user_progress WHERE user_id = $1",
    )
    .bind(user_id)
    .fetch_all(proxy.pool())
    .await?;

    rows.iter()
        .map(|row| Ok((row.try_get("correct_count")?, row.try_get("incorrect_count")?)))
        .collect()
}
