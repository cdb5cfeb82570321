use serde::Serialize;
use sqlx::Row;

use crate::db::DatabaseProxy;

/// Row counts shown on the admin dashboard.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentCounts {
    pub users: i64,
    pub vocabulary: i64,
    pub lessons: i64,
    pub quiz_questions: i64,
}

pub async fn content_counts(proxy: &DatabaseProxy) -> Result<ContentCounts, sqlx::Error> {
    let row = sqlx::query(
        r#"
        SELECT
            (SELECT COUNT(*) FROM users) AS users,
            (SELECT COUNT(*) FROM vocabulary) AS vocabulary,
            (SELECT COUNT(*) FROM lessons) AS lessons,
            (SELECT COUNT(*) FROM quiz_questions) AS quiz_questions
        "#,
    )
    .fetch_one(proxy.pool())
    .await?;

    Ok(ContentCounts {
        users: row.try_get("users")?,
        vocabulary: row.try_get("vocabulary")?,
        lessons: row.try_get("lessons")?,
        quiz_questions: row.try_get("quiz_questions")?,
    })
}
