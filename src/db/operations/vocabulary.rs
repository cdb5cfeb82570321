use serde::{Deserialize, Serialize};
use sqlx::postgres::PgRow;
use sqlx::Row;

use crate::db::fallback::fallback_vocabulary;
use crate::db::DatabaseProxy;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VocabularyEntry {
    pub id: i32,
    pub chinese: String,
    pub pinyin: String,
    pub english: String,
    pub difficulty: String,
    pub hsk_level: i32,
}

#[derive(Debug, Deserialize)]
pub struct VocabularyInput {
    pub chinese: String,
    pub pinyin: String,
    pub english: String,
    pub hsk_level: Option<i32>,
    pub difficulty: Option<String>,
    pub lesson_id: Option<i32>,
}

fn map_row(row: &PgRow) -> Result<VocabularyEntry, sqlx::Error> {
    Ok(VocabularyEntry {
        id: row.try_get("id")?,
        chinese: row.try_get("chinese")?,
        pinyin: row.try_get("pinyin")?,
        english: row.try_get("english")?,
        difficulty: row.try_get("difficulty")?,
        hsk_level: row.try_get("hsk_level")?,
    })
}

/// Propagating read, optionally filtered by HSK level and lesson. Used by
/// the admin surface, where a store failure must stay visible.
pub async fn fetch_vocabulary(
    proxy: &DatabaseProxy,
    hsk_level: Option<i32>,
    lesson_id: Option<i32>,
) -> Result<Vec<VocabularyEntry>, sqlx::Error> {
    let mut sql = String::from(
        "SELECT id, chinese, pinyin, english, difficulty, hsk_level FROM vocabulary",
    );
    let mut clauses: Vec<&str> = Vec::new();
    if hsk_level.is_some() {
        clauses.push("hsk_level = $1");
    }
    if lesson_id.is_some() {
        clauses.push(if hsk_level.is_some() {
            "lesson_id = $2"
        } else {
            "lesson_id = $1"
        });
    }
    if !clauses.is_empty() {
        sql.push_str(" WHERE ");
        sql.push_str(&clauses.join(" AND "));
    }
    sql.push_str(" ORDER BY id");

    let mut query = sqlx::query(&sql);
    if let Some(level) = hsk_level {
        query = query.bind(level);
    }
    if let Some(lesson) = lesson_id {
        query = query.bind(lesson);
    }

    let rows = query.fetch_all(proxy.pool()).await?;
    rows.iter().map(map_row).collect()
}

/// Learner-facing listing. Unlike the other entities this never fails toward
/// the caller: an unconfigured or erroring store yields the static fallback
/// list.
pub async fn list_vocabulary(
    proxy: Option<&DatabaseProxy>,
    hsk_level: Option<i32>,
    lesson_id: Option<i32>,
) -> Vec<VocabularyEntry> {
    let Some(proxy) = proxy else {
        return fallback_vocabulary();
    };

    match fetch_vocabulary(proxy, hsk_level, lesson_id).await {
        Ok(entries) => entries,
        Err(err) => {
            tracing::warn!(error = %err, "vocabulary fetch failed, serving fallback");
            fallback_vocabulary()
        }
    }
}

pub async fn add_vocabulary(
    proxy: &DatabaseProxy,
    input: &VocabularyInput,
) -> Result<VocabularyEntry, sqlx::Error> {
    let row = sqlx::query(
        r#"
        INSERT INTO vocabulary (chinese, pinyin, english, hsk_level, difficulty, lesson_id)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING id, chinese, pinyin, english, difficulty, hsk_level
        "#,
    )
    .bind(&input.chinese)
    .bind(&input.pinyin)
    .bind(&input.english)
    .bind(input.hsk_level.unwrap_or(1))
    .bind(input.difficulty.as_deref().unwrap_or("beginner"))
    .bind(input.lesson_id)
    .fetch_one(proxy.pool())
    .await?;

    map_row(&row)
}

pub async fn update_vocabulary(
    proxy: &DatabaseProxy,
    id: i32,
    input: &VocabularyInput,
) -> Result<Option<VocabularyEntry>, sqlx::Error> {
    let row = sqlx::query(
        r#"
        UPDATE vocabulary SET
            chinese = $2,
            pinyin = $3,
            english = $4,
            hsk_level = COALESCE($5, hsk_level),
            difficulty = COALESCE($6, difficulty)
        WHERE id = $1
        RETURNING id, chinese, pinyin, english, difficulty, hsk_level
        "#,
    )
    .bind(id)
    .bind(&input.chinese)
    .bind(&input.pinyin)
    .bind(&input.english)
    .bind(input.hsk_level)
    .bind(input.difficulty.as_deref())
    .fetch_optional(proxy.pool())
    .await?;

    row.as_ref().map(map_row).transpose()
}

pub async fn delete_vocabulary(proxy: &DatabaseProxy, id: i32) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM vocabulary WHERE id = $1")
        .bind(id)
        .execute(proxy.pool())
        .await?;
    Ok(result.rows_affected() > 0)
}
