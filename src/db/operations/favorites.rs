//! Favorites and review-queue membership rows.
//!
//! Both tables behave as unordered sets with insertion-order listing. The
//! (user, vocabulary) pair is deliberately not unique; listing and removal
//! operate on the synthetic row id.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::postgres::PgRow;
use sqlx::Row;

use crate::db::DatabaseProxy;

#[derive(Debug, Clone, Copy)]
pub enum MembershipTable {
    Favorites,
    ReviewQueue,
}

impl MembershipTable {
    fn name(self) -> &'static str {
        match self {
            MembershipTable::Favorites => "user_favorites",
            MembershipTable::ReviewQueue => "user_review_queue",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MembershipEntry {
    pub id: i32,
    pub user_id: i64,
    pub vocabulary_id: i32,
    pub created_at: DateTime<Utc>,
}

fn map_row(row: &PgRow) -> Result<MembershipEntry, sqlx::Error> {
    Ok(MembershipEntry {
        id: row.try_get("id")?,
        user_id: row.try_get("user_id")?,
        vocabulary_id: row.try_get("vocabulary_id")?,
        created_at: row.try_get("created_at")?,
    })
}

pub async fn list_entries(
    proxy: &DatabaseProxy,
    table: MembershipTable,
    user_id: i64,
) -> Result<Vec<MembershipEntry>, sqlx::Error> {
    let rows = sqlx::query(&format!(
        "SELECT id, user_id, vocabulary_id, created_at FROM {} WHERE user_id = $1 ORDER BY id",
        table.name()
    ))
    .bind(user_id)
    .fetch_all(proxy.pool())
    .await?;

    rows.iter().map(map_row).collect()
}

pub async fn add_entry(
    proxy: &DatabaseProxy,
    table: MembershipTable,
    user_id: i64,
    vocabulary_id: i32,
) -> Result<MembershipEntry, sqlx::Error> {
    let row = sqlx::query(&format!(
        r#"
        INSERT INTO {} (user_id, vocabulary_id, created_at)
        VALUES ($1, $2, now())
        RETURNING id, user_id, vocabulary_id, created_at
        "#,
        table.name()
    ))
    .bind(user_id)
    .bind(vocabulary_id)
    .fetch_one(proxy.pool())
    .await?;

    map_row(&row)
}

/// Removal is scoped to the caller's rows; a foreign id deletes nothing.
pub async fn remove_entry(
    proxy: &DatabaseProxy,
    table: MembershipTable,
    user_id: i64,
    entry_id: i32,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(&format!(
        "DELETE FROM {} WHERE id = $1 AND user_id = $2",
        table.name()
    ))
    .bind(entry_id)
    .bind(user_id)
    .execute(proxy.pool())
    .await?;

    Ok(result.rows_affected() > 0)
}
