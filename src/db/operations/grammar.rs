use serde::{Deserialize, Serialize};
use sqlx::postgres::PgRow;
use sqlx::Row;

use crate::db::DatabaseProxy;

#[derive(Debug, Clone, Serialize)]
pub struct GrammarPoint {
    pub id: i32,
    pub lesson_id: Option<i32>,
    pub title: String,
    pub structure: Option<String>,
    pub explanation: Option<String>,
    pub example_chinese: Option<String>,
    pub example_pinyin: Option<String>,
    pub example_english: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct GrammarInput {
    pub lesson_id: Option<i32>,
    pub title: String,
    pub structure: Option<String>,
    pub explanation: Option<String>,
    pub example_chinese: Option<String>,
    pub example_pinyin: Option<String>,
    pub example_english: Option<String>,
}

fn map_row(row: &PgRow) -> Result<GrammarPoint, sqlx::Error> {
    Ok(GrammarPoint {
        id: row.try_get("id")?,
        lesson_id: row.try_get("lesson_id")?,
        title: row.try_get("title")?,
        structure: row.try_get("structure")?,
        explanation: row.try_get("explanation")?,
        example_chinese: row.try_get("example_chinese")?,
        example_pinyin: row.try_get("example_pinyin")?,
        example_english: row.try_get("example_english")?,
    })
}

const SELECT_COLUMNS: &str = "SELECT id, lesson_id, title, structure, explanation, \
     example_chinese, example_pinyin, example_english FROM grammar_points";

pub async fn list_grammar(
    proxy: Option<&DatabaseProxy>,
    lesson_id: Option<i32>,
) -> Vec<GrammarPoint> {
    let Some(proxy) = proxy else {
        return Vec::new();
    };

    let result = match lesson_id {
        Some(lesson) => {
            sqlx::query(&format!("{SELECT_COLUMNS} WHERE lesson_id = $1 ORDER BY id"))
                .bind(lesson)
                .fetch_all(proxy.pool())
                .await
        }
        None => {
            sqlx::query(&format!("{SELECT_COLUMNS} ORDER BY id"))
                .fetch_all(proxy.pool())
                .await
        }
    };

    match result.and_then(|rows| rows.iter().map(map_row).collect()) {
        Ok(points) => points,
        Err(err) => {
            tracing::warn!(error = %err, "grammar fetch failed, serving empty list");
            Vec::new()
        }
    }
}

pub async fn add_grammar(
    proxy: &DatabaseProxy,
    input: &GrammarInput,
) -> Result<GrammarPoint, sqlx::Error> {
    let row = sqlx::query(
        r#"
        INSERT INTO grammar_points
            (lesson_id, title, structure, explanation,
             example_chinese, example_pinyin, example_english)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        RETURNING id, lesson_id, title, structure, explanation,
                  example_chinese, example_pinyin, example_english
        "#,
    )
    .bind(input.lesson_id)
    .bind(&input.title)
    .bind(&input.structure)
    .bind(&input.explanation)
    .bind(&input.example_chinese)
    .bind(&input.example_pinyin)
    .bind(&input.example_english)
    .fetch_one(proxy.pool())
    .await?;

    map_row(&row)
}

pub async fn update_grammar(
    proxy: &DatabaseProxy,
    id: i32,
    input: &GrammarInput,
) -> Result<Option<GrammarPoint>, sqlx::Error> {
    let row = sqlx::query(
        r#"
        UPDATE grammar_points SET
            lesson_id = $2,
            title = $3,
            structure = $4,
            explanation = $5,
            example_chinese = $6,
            example_pinyin = $7,
            example_english = $8
        WHERE id = $1
        RETURNING id, lesson_id, title, structure, explanation,
                  example_chinese, example_pinyin, example_english
        "#,
    )
    .bind(id)
    .bind(input.lesson_id)
    .bind(&input.title)
    .bind(&input.structure)
    .bind(&input.explanation)
    .bind(&input.example_chinese)
    .bind(&input.example_pinyin)
    .bind(&input.example_english)
    .fetch_optional(proxy.pool())
    .await?;

    row.as_ref().map(map_row).transpose()
}

pub async fn delete_grammar(proxy: &DatabaseProxy, id: i32) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM grammar_points WHERE id = $1")
        .bind(id)
        .execute(proxy.pool())
        .await?;
    Ok(result.rows_affected() > 0)
}
