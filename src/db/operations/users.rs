use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::postgres::PgRow;
use sqlx::Row;

use crate::auth::TelegramIdentity;
use crate::db::DatabaseProxy;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    pub telegram_id: i64,
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub created_at: DateTime<Utc>,
}

fn map_row(row: &PgRow) -> Result<UserRecord, sqlx::Error> {
    Ok(UserRecord {
        telegram_id: row.try_get("telegram_id")?,
        username: row.try_get("username")?,
        first_name: row.try_get("first_name")?,
        created_at: row.try_get("created_at")?,
    })
}

/// Upsert keyed on telegram_id; refreshes the profile fields on every call.
pub async fn get_or_create_user(
    proxy: &DatabaseProxy,
    identity: &TelegramIdentity,
) -> Result<UserRecord, sqlx::Error> {
    let row = sqlx::query(
        r#"
        INSERT INTO users (telegram_id, username, first_name, created_at)
        VALUES ($1, $2, $3, now())
        ON CONFLICT (telegram_id) DO UPDATE SET
            username = EXCLUDED.username,
            first_name = EXCLUDED.first_name
        RETURNING telegram_id, username, first_name, created_at
        "#,
    )
    .bind(identity.telegram_id)
    .bind(&identity.username)
    .bind(&identity.first_name)
    .fetch_one(proxy.pool())
    .await?;

    map_row(&row)
}

pub async fn list_users(proxy: &DatabaseProxy) -> Result<Vec<UserRecord>, sqlx::Error> {
    let rows = sqlx::query(
        "SELECT telegram_id, username, first_name, created_at FROM users ORDER BY created_at",
    )
    .fetch_all(proxy.pool())
    .await?;

    rows.iter().map(map_row).collect()
}
