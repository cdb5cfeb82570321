use axum::Router;

/// Test app wired without a database: DATABASE_URL is blanked so the proxy
/// fails to initialize and the API runs in its degraded mode. Identity runs
/// in trusted-header mode because no bot token is set.
pub async fn create_test_app() -> Router {
    std::env::set_var("DATABASE_URL", "");
    std::env::remove_var("TELEGRAM_BOT_TOKEN");
    std::env::remove_var("ADMIN_SECRET");

    hanyu_backend_rust::create_app().await
}
