//! Request-identity middleware: resolves the Telegram caller once at the
//! edge and hands it to handlers as an extension.

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use crate::auth::{self, IdentityError};
use crate::response::AppError;
use crate::state::AppState;

/// Rejects the request unless a caller identity can be established. With a
/// bot token configured that means verified initData; without one, the plain
/// `x-telegram-user-id` header.
pub async fn require_identity(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    match auth::resolve_identity(request.headers(), state.config().telegram_bot_token.as_deref()) {
        Ok(identity) => {
            request.extensions_mut().insert(identity);
            next.run(request).await
        }
        Err(IdentityError::Missing) => {
            AppError::unauthorized("Not authenticated").into_response()
        }
        Err(err) => {
            tracing::warn!(error = %err, "rejected request with bad init data");
            AppError::unauthorized("Invalid Telegram init data").into_response()
        }
    }
}
