use serde::{Deserialize, Serialize};
use sqlx::postgres::PgRow;
use sqlx::Row;

use crate::db::DatabaseProxy;

#[derive(Debug, Clone, Serialize)]
pub struct DialogueLine {
    pub id: i32,
    pub speaker: Option<String>,
    pub chinese: String,
    pub pinyin: Option<String>,
    pub english: Option<String>,
    pub line_order: i32,
}

#[derive(Debug, Clone, Serialize)]
pub struct DialogueRecord {
    pub id: i32,
    pub lesson_id: i32,
    pub title: Option<String>,
    pub display_order: i32,
    pub lines: Vec<DialogueLine>,
}

#[derive(Debug, Deserialize)]
pub struct DialogueInput {
    pub lesson_id: i32,
    pub title: Option<String>,
    pub display_order: Option<i32>,
    pub visible: Option<bool>,
}

fn map_line(row: &PgRow) -> Result<DialogueLine, sqlx::Error> {
    Ok(DialogueLine {
        id: row.try_get("id")?,
        speaker: row.try_get("speaker")?,
        chinese: row.try_get("chinese")?,
        pinyin: row.try_get("pinyin")?,
        english: row.try_get("english")?,
        line_order: row.try_get("line_order")?,
    })
}

/// Two-phase listing: visible dialogues in display order, then the ordered
/// lines of each attached as a nested sequence. A dialogue with no lines is
/// kept with an empty sequence, not omitted.
pub async fn list_dialogues_for_lesson(
    proxy: Option<&DatabaseProxy>,
    lesson_id: i32,
) -> Vec<DialogueRecord> {
    let Some(proxy) = proxy else {
        return Vec::new();
    };

    let dialogue_rows = match sqlx::query(
        r#"
        SELECT id, lesson_id, title, display_order
        FROM dialogues
        WHERE lesson_id = $1 AND visible = TRUE
        ORDER BY display_order
        "#,
    )
    .bind(lesson_id)
    .fetch_all(proxy.pool())
    .await
    {
        Ok(rows) => rows,
        Err(err) => {
            tracing::warn!(error = %err, "dialogue fetch failed, serving empty list");
            return Vec::new();
        }
    };

    let mut dialogues = Vec::with_capacity(dialogue_rows.len());
    for row in &dialogue_rows {
        let Ok(id) = row.try_get::<i32, _>("id") else {
            continue;
        };

        let lines = match sqlx::query(
            r#"
            SELECT id, speaker, chinese, pinyin, english, line_order
            FROM dialogue_lines
            WHERE dialogue_id = $1
            ORDER BY line_order
            "#,
        )
        .bind(id)
        .fetch_all(proxy.pool())
        .await
        {
            Ok(line_rows) => line_rows.iter().filter_map(|r| map_line(r).ok()).collect(),
            Err(err) => {
                tracing::warn!(error = %err, dialogue_id = id, "dialogue line fetch failed");
                Vec::new()
            }
        };

        dialogues.push(DialogueRecord {
            id,
            lesson_id: row.try_get("lesson_id").unwrap_or(lesson_id),
            title: row.try_get("title").ok().flatten(),
            display_order: row.try_get("display_order").unwrap_or(0),
            lines,
        });
    }

    dialogues
}

pub async fn add_dialogue(
    proxy: &DatabaseProxy,
    input: &DialogueInput,
) -> Result<DialogueRecord, sqlx::Error> {
    let row = sqlx::query(
        r#"
        INSERT INTO dialogues (lesson_id, title, display_order, visible)
        VALUES ($1, $2, $3, $4)
        RETURNING id, lesson_id, title, display_order
        "#,
    )
    .bind(input.lesson_id)
    .bind(&input.title)
    .bind(input.display_order.unwrap_or(0))
    .bind(input.visible.unwrap_or(true))
    .fetch_one(proxy.pool())
    .await?;

    Ok(DialogueRecord {
        id: row.try_get("id")?,
        lesson_id: row.try_get("lesson_id")?,
        title: row.try_get("title")?,
        display_order: row.try_get("display_order")?,
        lines: Vec::new(),
    })
}

pub async fn update_dialogue(
    proxy: &DatabaseProxy,
    id: i32,
    input: &DialogueInput,
) -> Result<Option<DialogueRecord>, sqlx::Error> {
    let row = sqlx::query(
        r#"
        UPDATE dialogues SET
            lesson_id = $2,
            title = $3,
            display_order = COALESCE($4, display_order),
            visible = COALESCE($5, visible)
        WHERE id = $1
        RETURNING id, lesson_id, title, display_order
        "#,
    )
    .bind(id)
    .bind(input.lesson_id)
    .bind(&input.title)
    .bind(input.display_order)
    .bind(input.visible)
    .fetch_optional(proxy.pool())
    .await?;

    match row {
        Some(row) => Ok(Some(DialogueRecord {
            id: row.try_get("id")?,
            lesson_id: row.try_get("lesson_id")?,
            title: row.try_get("title")?,
            display_order: row.try_get("display_order")?,
            lines: Vec::new(),
        })),
        None => Ok(None),
    }
}

pub async fn delete_dialogue(proxy: &DatabaseProxy, id: i32) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM dialogues WHERE id = $1")
        .bind(id)
        .execute(proxy.pool())
        .await?;
    Ok(result.rows_affected() > 0)
}
