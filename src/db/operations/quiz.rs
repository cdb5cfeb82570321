use serde::{Deserialize, Serialize};
use sqlx::postgres::PgRow;
use sqlx::Row;

use crate::db::DatabaseProxy;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizQuestionRow {
    pub id: i32,
    pub question_type: String,
    pub hsk_level: String,
    pub question: String,
    pub pinyin: Option<String>,
    pub correct_answer: String,
    pub options: Option<serde_json::Value>,
    pub acceptable_answers: Option<serde_json::Value>,
    pub audio_url: Option<String>,
    pub image_url: Option<String>,
    pub lesson_id: Option<i32>,
}

#[derive(Debug, Deserialize)]
pub struct QuizQuestionInput {
    pub question_type: String,
    pub hsk_level: String,
    pub question: String,
    pub pinyin: Option<String>,
    pub correct_answer: String,
    pub options: Option<serde_json::Value>,
    pub acceptable_answers: Option<serde_json::Value>,
    pub audio_url: Option<String>,
    pub image_url: Option<String>,
    pub lesson_id: Option<i32>,
    pub difficulty: Option<String>,
    pub explanation: Option<String>,
}

fn map_row(row: &PgRow) -> Result<QuizQuestionRow, sqlx::Error> {
    Ok(QuizQuestionRow {
        id: row.try_get("id")?,
        question_type: row.try_get("question_type")?,
        hsk_level: row.try_get("hsk_level")?,
        question: row.try_get("question")?,
        pinyin: row.try_get("pinyin")?,
        correct_answer: row.try_get("correct_answer")?,
        options: row.try_get("options")?,
        acceptable_answers: row.try_get("acceptable_answers")?,
        audio_url: row.try_get("audio_url")?,
        image_url: row.try_get("image_url")?,
        lesson_id: row.try_get("lesson_id")?,
    })
}

const SELECT_COLUMNS: &str = "SELECT id, question_type, hsk_level, question, pinyin, \
     correct_answer, options, acceptable_answers, audio_url, image_url, lesson_id \
     FROM quiz_questions";

/// Full active pool for the selector; re-fetched on every call, no cursor.
pub async fn fetch_question_pool(
    proxy: &DatabaseProxy,
    hsk_level: Option<&str>,
) -> Result<Vec<QuizQuestionRow>, sqlx::Error> {
    let rows = match hsk_level {
        Some(level) => {
            sqlx::query(&format!(
                "{SELECT_COLUMNS} WHERE status = 'active' AND hsk_level = $1"
            ))
            .bind(level)
            .fetch_all(proxy.pool())
            .await?
        }
        None => {
            sqlx::query(&format!("{SELECT_COLUMNS} WHERE status = 'active'"))
                .fetch_all(proxy.pool())
                .await?
        }
    };

    rows.iter().map(map_row).collect()
}

pub async fn list_questions(proxy: &DatabaseProxy) -> Result<Vec<QuizQuestionRow>, sqlx::Error> {
    let rows = sqlx::query(&format!("{SELECT_COLUMNS} ORDER BY id"))
        .fetch_all(proxy.pool())
        .await?;
    rows.iter().map(map_row).collect()
}

pub async fn add_question(
    proxy: &DatabaseProxy,
    input: &QuizQuestionInput,
) -> Result<QuizQuestionRow, sqlx::Error> {
    let row = sqlx::query(
        r#"
        INSERT INTO quiz_questions
            (question_type, hsk_level, question, pinyin, correct_answer, options,
             acceptable_answers, audio_url, image_url, lesson_id, difficulty,
             explanation, status)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, 'active')
        RETURNING id, question_type, hsk_level, question, pinyin, correct_answer,
                  options, acceptable_answers, audio_url, image_url, lesson_id
        "#,
    )
    .bind(&input.question_type)
    .bind(&input.hsk_level)
    .bind(&input.question)
    .bind(&input.pinyin)
    .bind(&input.correct_answer)
    .bind(&input.options)
    .bind(&input.acceptable_answers)
    .bind(&input.audio_url)
    .bind(&input.image_url)
    .bind(input.lesson_id)
    .bind(input.difficulty.as_deref().unwrap_or("medium"))
    .bind(&input.explanation)
    .fetch_one(proxy.pool())
    .await?;

    map_row(&row)
}

pub async fn update_question(
    proxy: &DatabaseProxy,
    id: i32,
    input: &QuizQuestionInput,
) -> Result<Option<QuizQuestionRow>, sqlx::Error> {
    let row = sqlx::query(
        r#"
        UPDATE quiz_questions SET
            question_type = $2,
            hsk_level = $3,
            question = $4,
            pinyin = $5,
            correct_answer = $6,
            options = $7,
            acceptable_answers = $8,
            audio_url = $9,
            image_url = $10,
            lesson_id = $11,
            difficulty = COALESCE($12, difficulty),
            explanation = $13,
            updated_at = now()
        WHERE id = $1
        RETURNING id, question_type, hsk_level, question, pinyin, correct_answer,
                  options, acceptable_answers, audio_url, image_url, lesson_id
        "#,
    )
    .bind(id)
    .bind(&input.question_type)
    .bind(&input.hsk_level)
    .bind(&input.question)
    .bind(&input.pinyin)
    .bind(&input.correct_answer)
    .bind(&input.options)
    .bind(&input.acceptable_answers)
    .bind(&input.audio_url)
    .bind(&input.image_url)
    .bind(input.lesson_id)
    .bind(input.difficulty.as_deref())
    .bind(&input.explanation)
    .fetch_optional(proxy.pool())
    .await?;

    row.as_ref().map(map_row).transpose()
}

pub async fn delete_question(proxy: &DatabaseProxy, id: i32) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM quiz_questions WHERE id = $1")
        .bind(id)
        .execute(proxy.pool())
        .await?;
    Ok(result.rows_affected() > 0)
}
