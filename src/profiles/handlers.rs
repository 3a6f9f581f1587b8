//! Profile handlers
//!
//! Every handler returns an [`ActionState`] envelope with HTTP 200 in both
//! the success and failure case. The envelope is the contract; no fault is
//! allowed past it.

use axum::extract::{Extension, Path};
use axum::Json;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::info;

use super::models::{Profile, SyncProfileRequest, UpdateBillingRequest};
use super::services::{ProfileError, ProfilesService};
use crate::common::{safe_email_log, ActionState, AppState};

/// POST /api/profiles/sync
/// Idempotent get-or-create for an externally-authenticated identity
///
/// # Request Body
/// ```json
/// { "user_id": "<provider id>", "email": "<verified email>" }
/// ```
pub async fn sync_profile(
    Extension(state): Extension<Arc<RwLock<AppState>>>,
    Json(request): Json<SyncProfileRequest>,
) -> Json<ActionState<Profile>> {
    info!(
        user_id = %request.user_id,
        email = %safe_email_log(&request.email),
        "Received profile sync request"
    );

    let app_state = state.read().await;
    let service = ProfilesService::new(app_state.db.clone());

    let envelope = match service.get_or_create(&request).await {
        Ok((profile, true)) => ActionState::success("Profile created", profile),
        Ok((profile, false)) => ActionState::success("Profile already up to date", profile),
        Err(e) => ActionState::failure(e.client_message()),
    };

    Json(envelope)
}

/// GET /api/profiles/:user_id
/// Point lookup; a missing profile is a failure envelope, not a 404
pub async fn get_profile(
    Extension(state): Extension<Arc<RwLock<AppState>>>,
    Path(user_id): Path<String>,
) -> Json<ActionState<Profile>> {
    let app_state = state.read().await;
    let service = ProfilesService::new(app_state.db.clone());

    let envelope = match service.find_by_user_id(&user_id).await {
        Ok(Some(profile)) => ActionState::success("Profile found", profile),
        Ok(None) => ActionState::failure(ProfileError::NotFound(user_id).client_message()),
        Err(e) => ActionState::failure(e.client_message()),
    };

    Json(envelope)
}

/// PATCH /api/profiles/:user_id/billing
/// Update-by-key surface used by the billing workflow
pub async fn update_billing(
    Extension(state): Extension<Arc<RwLock<AppState>>>,
    Path(user_id): Path<String>,
    Json(request): Json<UpdateBillingRequest>,
) -> Json<ActionState<Profile>> {
    let app_state = state.read().await;
    let service = ProfilesService::new(app_state.db.clone());

    let envelope = match service.update_billing(&user_id, &request).await {
        Ok(profile) => ActionState::success("Billing fields updated", profile),
        Err(e) => ActionState::failure(e.client_message()),
    };

    Json(envelope)
}
