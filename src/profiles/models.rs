//! Profile data models

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Subscription tier attached to a profile.
///
/// Stored as lowercase TEXT; the billing workflow moves profiles between
/// tiers, this service only ever assigns the default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum Tier {
    #[default]
    Free,
    Pro,
}

/// Local profile mirroring one externally-authenticated identity
#[derive(FromRow, Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Profile {
    /// Identifier issued by the external identity provider
    pub user_id: String,
    pub email: String,
    pub tier: Tier,
    pub stripe_customer_id: Option<String>,
    pub stripe_subscription_id: Option<String>,
    pub created_at: String,
}

/// Body of `POST /api/profiles/sync`
///
/// Both fields come from an already-verified identity token; this service
/// trusts them and only shape-checks.
#[derive(Deserialize, Debug)]
pub struct SyncProfileRequest {
    pub user_id: String,
    pub email: String,
}

/// Body of `PATCH /api/profiles/:user_id/billing`
///
/// Written by the billing collaborator; absent fields are left untouched.
#[derive(Deserialize, Debug, Default)]
pub struct UpdateBillingRequest {
    pub tier: Option<Tier>,
    pub stripe_customer_id: Option<String>,
    pub stripe_subscription_id: Option<String>,
}
