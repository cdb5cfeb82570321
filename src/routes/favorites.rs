use axum::extract::{Extension, Path, State};
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::auth::TelegramIdentity;
use crate::db::operations::favorites::{self, MembershipEntry, MembershipTable};
use crate::response::AppError;
use crate::routes::{map_sql, require_store};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MembershipBody {
    pub vocabulary_id: i32,
}

async fn list(
    state: &AppState,
    table: MembershipTable,
    identity: &TelegramIdentity,
) -> Result<Json<Vec<MembershipEntry>>, AppError> {
    let Some(proxy) = state.db_proxy() else {
        return Ok(Json(Vec::new()));
    };

    let entries = favorites::list_entries(proxy, table, identity.telegram_id)
        .await
        .map_err(map_sql)?;
    Ok(Json(entries))
}

async fn add(
    state: &AppState,
    table: MembershipTable,
    identity: &TelegramIdentity,
    vocabulary_id: i32,
) -> Result<Json<MembershipEntry>, AppError> {
    let proxy = require_store(state)?;
    let entry = favorites::add_entry(proxy, table, identity.telegram_id, vocabulary_id)
        .await
        .map_err(map_sql)?;
    Ok(Json(entry))
}

async fn remove(
    state: &AppState,
    table: MembershipTable,
    identity: &TelegramIdentity,
    entry_id: i32,
) -> Result<Json<Value>, AppError> {
    let proxy = require_store(state)?;
    let removed = favorites::remove_entry(proxy, table, identity.telegram_id, entry_id)
        .await
        .map_err(map_sql)?;

    if removed {
        Ok(Json(json!({ "success": true })))
    } else {
        Err(AppError::not_found("Entry not found"))
    }
}

pub async fn list_favorites(
    State(state): State<AppState>,
    Extension(identity): Extension<TelegramIdentity>,
) -> Result<Json<Vec<MembershipEntry>>, AppError> {
    list(&state, MembershipTable::Favorites, &identity).await
}

pub async fn add_favorite(
    State(state): State<AppState>,
    Extension(identity): Extension<TelegramIdentity>,
    Json(body): Json<MembershipBody>,
) -> Result<Json<MembershipEntry>, AppError> {
    add(&state, MembershipTable::Favorites, &identity, body.vocabulary_id).await
}

pub async fn remove_favorite(
    State(state): State<AppState>,
    Extension(identity): Extension<TelegramIdentity>,
    Path(id): Path<i32>,
) -> Result<Json<Value>, AppError> {
    remove(&state, MembershipTable::Favorites, &identity, id).await
}

pub async fn list_review_queue(
    State(state): State<AppState>,
    Extension(identity): Extension<TelegramIdentity>,
) -> Result<Json<Vec<MembershipEntry>>, AppError> {
    list(&state, MembershipTable::ReviewQueue, &identity).await
}

pub async fn add_review_item(
    State(state): State<AppState>,
    Extension(identity): Extension<TelegramIdentity>,
    Json(body): Json<MembershipBody>,
) -> Result<Json<MembershipEntry>, AppError> {
    add(&state, MembershipTable::ReviewQueue, &identity, body.vocabulary_id).await
}

pub async fn remove_review_item(
    State(state): State<AppState>,
    Extension(identity): Extension<TelegramIdentity>,
    Path(id): Path<i32>,
) -> Result<Json<Value>, AppError> {
    remove(&state, MembershipTable::ReviewQueue, &identity, id).await
}
