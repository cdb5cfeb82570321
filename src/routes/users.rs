use axum::extract::{Extension, State};
use axum::Json;

use crate::auth::TelegramIdentity;
use crate::db::operations::users::{self, UserRecord};
use crate::response::AppError;
use crate::routes::{map_sql, require_store};
use crate::state::AppState;

/// Registers or refreshes the caller's profile row. Identity comes from the
/// verified layer, never from the request body.
pub async fn sync(
    State(state): State<AppState>,
    Extension(identity): Extension<TelegramIdentity>,
) -> Result<Json<UserRecord>, AppError> {
    let proxy = require_store(&state)?;
    let record = users::get_or_create_user(proxy, &identity)
        .await
        .map_err(map_sql)?;
    Ok(Json(record))
}
