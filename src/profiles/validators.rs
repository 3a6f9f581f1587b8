use super::models::{SyncProfileRequest, UpdateBillingRequest};
use crate::common::{ValidationResult, Validator};

/// Shape checks on the sync payload. The identity provider has already
/// verified these values; this only rejects obviously broken input.
pub struct SyncProfileValidator;

impl Validator<SyncProfileRequest> for SyncProfileValidator {
    fn validate(&self, data: &SyncProfileRequest) -> ValidationResult {
        let mut result = ValidationResult::new();

        if data.user_id.trim().is_empty() {
            result.add_error("user_id", "User identifier is required");
        }

        if data.user_id.len() > 255 {
            result.add_error("user_id", "User identifier must not exceed 255 characters");
        }

        if data.email.trim().is_empty() {
            result.add_error("email", "Email is required");
        } else if !is_plausible_email(&data.email) {
            result.add_error("email", "Email must contain a local part and a domain");
        }

        result
    }
}

pub struct UpdateBillingValidator;

impl Validator<UpdateBillingRequest> for UpdateBillingValidator {
    fn validate(&self, data: &UpdateBillingRequest) -> ValidationResult {
        let mut result = ValidationResult::new();

        if data.tier.is_none()
            && data.stripe_customer_id.is_none()
            && data.stripe_subscription_id.is_none()
        {
            result.add_error("body", "At least one billing field must be provided");
        }

        if let Some(id) = &data.stripe_customer_id {
            if id.trim().is_empty() {
                result.add_error("stripe_customer_id", "Customer id must not be empty");
            }
        }

        if let Some(id) = &data.stripe_subscription_id {
            if id.trim().is_empty() {
                result.add_error("stripe_subscription_id", "Subscription id must not be empty");
            }
        }

        result
    }
}

fn is_plausible_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => !local.is_empty() && domain.contains('.'),
        None => false,
    }
}
