//! Profile routes

use axum::{
    routing::{get, patch, post},
    Router,
};

use super::handlers;

/// Creates and returns the profiles router
///
/// # Routes
/// - `POST /api/profiles/sync` - Idempotent get-or-create on sign-in
/// - `GET /api/profiles/:user_id` - Profile lookup by external identifier
/// - `PATCH /api/profiles/:user_id/billing` - Billing-field updates by key
pub fn profiles_routes() -> Router {
    Router::new()
        .route("/api/profiles/sync", post(handlers::sync_profile))
        .route("/api/profiles/:user_id", get(handlers::get_profile))
        .route(
            "/api/profiles/:user_id/billing",
            patch(handlers::update_billing),
        )
}
