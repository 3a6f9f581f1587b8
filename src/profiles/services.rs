use sqlx::error::ErrorKind;
use sqlx::SqlitePool;
use thiserror::Error;
use tracing::{debug, error, info, warn};

use super::models::{Profile, SyncProfileRequest, UpdateBillingRequest};
use super::validators;
use crate::common::{safe_email_log, Validator};

/// Errors surfaced by profile operations.
///
/// Every variant is converted into a failure envelope at the handler
/// boundary; nothing here escapes as a transport fault.
#[derive(Debug, Error)]
pub enum ProfileError {
    #[error("Validation Error: {0}")]
    Validation(String),
    #[error("Profile not found: {0}")]
    NotFound(String),
    #[error("Email already in use: {0}")]
    EmailTaken(String),
    #[error("Database Error: {0}")]
    Database(#[from] sqlx::Error),
}

impl ProfileError {
    /// Message safe to put in a client-facing envelope. Database detail is
    /// logged server-side only.
    pub fn client_message(&self) -> String {
        match self {
            ProfileError::Validation(msg) => msg.clone(),
            ProfileError::NotFound(user_id) => {
                format!("No profile exists for user {}", user_id)
            }
            ProfileError::EmailTaken(_) => {
                "Email is already in use by another account".to_string()
            }
            ProfileError::Database(_) => "Storage operation failed".to_string(),
        }
    }
}

/// Which uniqueness constraint an insert tripped over.
/// Decides collapse-to-success (user_id) vs a distinct failure (email).
#[derive(Debug, PartialEq)]
enum UniqueViolation {
    UserId,
    Email,
}

fn classify_unique_violation(err: &sqlx::Error) -> Option<UniqueViolation> {
    let db = match err {
        sqlx::Error::Database(db) => db,
        _ => return None,
    };

    let is_unique = matches!(db.kind(), ErrorKind::UniqueViolation)
        || db.message().contains("UNIQUE constraint failed");
    if !is_unique {
        return None;
    }

    // SQLite names the column in the message, e.g.
    // "UNIQUE constraint failed: profiles.user_id"
    if db.message().contains("profiles.user_id") {
        Some(UniqueViolation::UserId)
    } else if db.message().contains("profiles.email") {
        Some(UniqueViolation::Email)
    } else {
        None
    }
}

pub struct ProfilesService {
    db: SqlitePool,
}

impl ProfilesService {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    // ============================================================================
    // Identity Synchronization
    // ============================================================================

    /// Ensure exactly one profile exists for an externally-authenticated
    /// identity, creating it on first sign-in.
    ///
    /// Returns the profile and whether this call created it. Identity is
    /// trusted as pre-verified; inputs are only shape-checked.
    ///
    /// Two concurrent first sign-ins can both miss the lookup and race the
    /// insert; the loser's duplicate-key rejection is collapsed into a
    /// re-fetch of the winner's row, so both callers see success.
    pub async fn get_or_create(
        &self,
        request: &SyncProfileRequest,
    ) -> Result<(Profile, bool), ProfileError> {
        let validation = validators::SyncProfileValidator.validate(request);
        if !validation.is_valid {
            return Err(ProfileError::Validation(validation.summary()));
        }

        if let Some(existing) = self.find_by_user_id(&request.user_id).await? {
            if existing.email != request.email {
                // Email resync on later sign-ins is deliberately not done;
                // the stored email stays authoritative.
                debug!(
                    user_id = %existing.user_id,
                    stored_email = %safe_email_log(&existing.email),
                    supplied_email = %safe_email_log(&request.email),
                    "Supplied email differs from stored profile, keeping stored email"
                );
            }
            debug!(
                user_id = %existing.user_id,
                "Found existing profile, no mutation"
            );
            return Ok((existing, false));
        }

        debug!(
            user_id = %request.user_id,
            email = %safe_email_log(&request.email),
            "No existing profile found, inserting"
        );

        let created_at = chrono::Utc::now().to_rfc3339();
        let insert = sqlx::query(
            r#"
            INSERT INTO profiles (user_id, email, tier, stripe_customer_id, stripe_subscription_id, created_at)
            VALUES (?, ?, 'free', NULL, NULL, ?)
            "#,
        )
        .bind(&request.user_id)
        .bind(&request.email)
        .bind(&created_at)
        .execute(&self.db)
        .await;

        match insert {
            Ok(_) => {
                info!(
                    user_id = %request.user_id,
                    email = %safe_email_log(&request.email),
                    "Created new profile"
                );
                let profile = self.fetch_by_user_id(&request.user_id).await?;
                Ok((profile, true))
            }
            Err(e) => match classify_unique_violation(&e) {
                Some(UniqueViolation::UserId) => {
                    // Lost the first-sign-in race; another request inserted
                    // this identity between our lookup and insert.
                    info!(
                        user_id = %request.user_id,
                        "Concurrent insert detected, returning existing profile"
                    );
                    let profile = self.fetch_by_user_id(&request.user_id).await?;
                    Ok((profile, false))
                }
                Some(UniqueViolation::Email) => {
                    warn!(
                        user_id = %request.user_id,
                        email = %safe_email_log(&request.email),
                        "Email already claimed by a different identity"
                    );
                    Err(ProfileError::EmailTaken(request.email.clone()))
                }
                None => {
                    error!(
                        error = %e,
                        user_id = %request.user_id,
                        "Database error inserting profile"
                    );
                    Err(ProfileError::Database(e))
                }
            },
        }
    }

    // ============================================================================
    // Lookups
    // ============================================================================

    /// Point lookup by external user identifier
    pub async fn find_by_user_id(&self, user_id: &str) -> Result<Option<Profile>, ProfileError> {
        let profile = sqlx::query_as::<_, Profile>(
            r#"
            SELECT user_id, email, tier, stripe_customer_id, stripe_subscription_id, created_at
            FROM profiles
            WHERE user_id = ?
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.db)
        .await?;

        Ok(profile)
    }

    /// Like [`Self::find_by_user_id`] but a missing row is an error.
    /// Used after inserts, where the row must exist.
    async fn fetch_by_user_id(&self, user_id: &str) -> Result<Profile, ProfileError> {
        self.find_by_user_id(user_id)
            .await?
            .ok_or_else(|| ProfileError::NotFound(user_id.to_string()))
    }

    // ============================================================================
    // Billing Updates (written by the external billing workflow)
    // ============================================================================

    /// Update tier and billing identifiers by key. Absent request fields are
    /// left as they are; email is never touched by this path.
    pub async fn update_billing(
        &self,
        user_id: &str,
        request: &UpdateBillingRequest,
    ) -> Result<Profile, ProfileError> {
        let validation = validators::UpdateBillingValidator.validate(request);
        if !validation.is_valid {
            return Err(ProfileError::Validation(validation.summary()));
        }

        let existing = self.fetch_by_user_id(user_id).await?;

        let tier = request.tier.unwrap_or(existing.tier);
        let stripe_customer_id = request
            .stripe_customer_id
            .clone()
            .or(existing.stripe_customer_id);
        let stripe_subscription_id = request
            .stripe_subscription_id
            .clone()
            .or(existing.stripe_subscription_id);

        sqlx::query(
            r#"
            UPDATE profiles
            SET tier = ?, stripe_customer_id = ?, stripe_subscription_id = ?
            WHERE user_id = ?
            "#,
        )
        .bind(tier)
        .bind(&stripe_customer_id)
        .bind(&stripe_subscription_id)
        .bind(user_id)
        .execute(&self.db)
        .await
        .map_err(|e| {
            error!(error = %e, user_id = %user_id, "Database error updating billing fields");
            ProfileError::Database(e)
        })?;

        info!(user_id = %user_id, tier = ?tier, "Updated billing fields");

        self.fetch_by_user_id(user_id).await
    }
}
