//! Tests for profiles module
//!
//! These tests verify core profile functionality including:
//! - Get-or-create idempotency and defaults
//! - The concurrent first-sign-in race collapsing to success
//! - Email-collision failures
//! - Billing-field updates

#[cfg(test)]
mod tests {
    use sqlx::sqlite::SqlitePoolOptions;
    use sqlx::SqlitePool;

    use super::super::models::{SyncProfileRequest, Tier, UpdateBillingRequest};
    use super::super::services::{ProfileError, ProfilesService};
    use crate::common::migrations::run_migrations;

    async fn test_pool() -> SqlitePool {
        // A single connection so every query sees the same in-memory database
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .expect("Failed to open in-memory database");
        run_migrations(&pool).await.expect("Failed to run migrations");
        pool
    }

    fn sync_request(user_id: &str, email: &str) -> SyncProfileRequest {
        SyncProfileRequest {
            user_id: user_id.to_string(),
            email: email.to_string(),
        }
    }

    async fn profile_count(pool: &SqlitePool) -> i64 {
        sqlx::query_scalar("SELECT COUNT(*) FROM profiles")
            .fetch_one(pool)
            .await
            .expect("Failed to count profiles")
    }

    // ============================================================================
    // Get-or-Create Tests
    // ============================================================================

    #[tokio::test]
    async fn test_first_sign_in_creates_profile_with_defaults() {
        let pool = test_pool().await;
        let service = ProfilesService::new(pool.clone());

        let (profile, created) = service
            .get_or_create(&sync_request("u1", "a@x.com"))
            .await
            .expect("get_or_create should succeed");

        assert!(created);
        assert_eq!(profile.user_id, "u1");
        assert_eq!(profile.email, "a@x.com");
        assert_eq!(profile.tier, Tier::Free);
        assert_eq!(profile.stripe_customer_id, None);
        assert_eq!(profile.stripe_subscription_id, None);
        assert!(!profile.created_at.is_empty());
        assert_eq!(profile_count(&pool).await, 1);
    }

    #[tokio::test]
    async fn test_multibyte_email_sign_in_succeeds() {
        // The local part starts with a multi-byte character; masking it for
        // the logs must not panic anywhere on the sync path.
        let pool = test_pool().await;
        let service = ProfilesService::new(pool.clone());

        let (profile, created) = service
            .get_or_create(&sync_request("u1", "émail@x.com"))
            .await
            .expect("Multi-byte email should sync cleanly");

        assert!(created);
        assert_eq!(profile.email, "émail@x.com");
    }

    #[tokio::test]
    async fn test_second_sign_in_is_idempotent() {
        let pool = test_pool().await;
        let service = ProfilesService::new(pool.clone());

        let (first, created_first) = service
            .get_or_create(&sync_request("u1", "a@x.com"))
            .await
            .expect("First call should succeed");
        let (second, created_second) = service
            .get_or_create(&sync_request("u1", "a@x.com"))
            .await
            .expect("Second call should succeed");

        assert!(created_first);
        assert!(!created_second);
        assert_eq!(first, second);
        assert_eq!(profile_count(&pool).await, 1);
    }

    #[tokio::test]
    async fn test_returning_user_email_is_not_resynced() {
        // The source material leaves email resync unspecified; we keep the
        // stored email and ignore the newly supplied one.
        let pool = test_pool().await;
        let service = ProfilesService::new(pool.clone());

        service
            .get_or_create(&sync_request("u1", "a@x.com"))
            .await
            .expect("First call should succeed");
        let (profile, created) = service
            .get_or_create(&sync_request("u1", "renamed@x.com"))
            .await
            .expect("Second call should succeed");

        assert!(!created);
        assert_eq!(profile.email, "a@x.com");
    }

    #[tokio::test]
    async fn test_email_claimed_by_other_identity_fails() {
        let pool = test_pool().await;
        let service = ProfilesService::new(pool.clone());

        service
            .get_or_create(&sync_request("u1", "a@x.com"))
            .await
            .expect("First identity should succeed");

        let result = service.get_or_create(&sync_request("u2", "a@x.com")).await;

        let err = result.expect_err("Second identity reusing the email should fail");
        assert!(matches!(&err, ProfileError::EmailTaken(_)));
        // Message must be distinguishable from a generic storage failure
        assert_ne!(err.client_message(), "Storage operation failed");
        assert!(err.client_message().contains("already in use"));

        // No partial row for u2
        let u2 = ProfilesService::new(pool.clone())
            .find_by_user_id("u2")
            .await
            .expect("Lookup should succeed");
        assert!(u2.is_none());
        assert_eq!(profile_count(&pool).await, 1);
    }

    #[tokio::test]
    async fn test_concurrent_first_sign_in_collapses_to_success() {
        let pool = test_pool().await;

        let mut handles = Vec::new();
        for _ in 0..8 {
            let pool = pool.clone();
            handles.push(tokio::spawn(async move {
                ProfilesService::new(pool)
                    .get_or_create(&SyncProfileRequest {
                        user_id: "u1".to_string(),
                        email: "a@x.com".to_string(),
                    })
                    .await
            }));
        }

        let mut created_count = 0;
        for handle in handles {
            let (profile, created) = handle
                .await
                .expect("Task should not panic")
                .expect("No caller should see a failure");
            if created {
                created_count += 1;
            }
            assert_eq!(profile.user_id, "u1");
            assert_eq!(profile.email, "a@x.com");
        }

        assert_eq!(created_count, 1, "Exactly one call should create the row");
        assert_eq!(profile_count(&pool).await, 1);
    }

    // ============================================================================
    // Validation Tests
    // ============================================================================

    #[tokio::test]
    async fn test_sync_rejects_blank_user_id() {
        let pool = test_pool().await;
        let service = ProfilesService::new(pool.clone());

        let err = service
            .get_or_create(&sync_request("  ", "a@x.com"))
            .await
            .expect_err("Blank user id should fail validation");

        assert!(matches!(err, ProfileError::Validation(_)));
        assert_eq!(profile_count(&pool).await, 0);
    }

    #[tokio::test]
    async fn test_sync_rejects_malformed_email() {
        let pool = test_pool().await;
        let service = ProfilesService::new(pool);

        let err = service
            .get_or_create(&sync_request("u1", "not-an-email"))
            .await
            .expect_err("Malformed email should fail validation");

        assert!(matches!(err, ProfileError::Validation(_)));
    }

    // ============================================================================
    // Billing Update Tests
    // ============================================================================

    #[tokio::test]
    async fn test_update_billing_sets_tier_and_customer() {
        let pool = test_pool().await;
        let service = ProfilesService::new(pool.clone());

        service
            .get_or_create(&sync_request("u1", "a@x.com"))
            .await
            .expect("Setup sign-in should succeed");

        let updated = service
            .update_billing(
                "u1",
                &UpdateBillingRequest {
                    tier: Some(Tier::Pro),
                    stripe_customer_id: Some("cus_123".to_string()),
                    stripe_subscription_id: None,
                },
            )
            .await
            .expect("Billing update should succeed");

        assert_eq!(updated.tier, Tier::Pro);
        assert_eq!(updated.stripe_customer_id, Some("cus_123".to_string()));
        // Absent field left untouched
        assert_eq!(updated.stripe_subscription_id, None);
        assert_eq!(updated.email, "a@x.com");
    }

    #[tokio::test]
    async fn test_update_billing_preserves_existing_fields() {
        let pool = test_pool().await;
        let service = ProfilesService::new(pool.clone());

        service
            .get_or_create(&sync_request("u1", "a@x.com"))
            .await
            .expect("Setup sign-in should succeed");
        service
            .update_billing(
                "u1",
                &UpdateBillingRequest {
                    tier: Some(Tier::Pro),
                    stripe_customer_id: Some("cus_123".to_string()),
                    stripe_subscription_id: None,
                },
            )
            .await
            .expect("First billing update should succeed");

        let updated = service
            .update_billing(
                "u1",
                &UpdateBillingRequest {
                    tier: None,
                    stripe_customer_id: None,
                    stripe_subscription_id: Some("sub_456".to_string()),
                },
            )
            .await
            .expect("Second billing update should succeed");

        assert_eq!(updated.tier, Tier::Pro);
        assert_eq!(updated.stripe_customer_id, Some("cus_123".to_string()));
        assert_eq!(updated.stripe_subscription_id, Some("sub_456".to_string()));
    }

    #[tokio::test]
    async fn test_update_billing_missing_profile_fails() {
        let pool = test_pool().await;
        let service = ProfilesService::new(pool);

        let err = service
            .update_billing(
                "ghost",
                &UpdateBillingRequest {
                    tier: Some(Tier::Pro),
                    ..Default::default()
                },
            )
            .await
            .expect_err("Updating a missing profile should fail");

        assert!(matches!(&err, ProfileError::NotFound(_)));
        assert!(err.client_message().contains("ghost"));
    }

    #[tokio::test]
    async fn test_update_billing_empty_body_fails() {
        let pool = test_pool().await;
        let service = ProfilesService::new(pool.clone());

        service
            .get_or_create(&sync_request("u1", "a@x.com"))
            .await
            .expect("Setup sign-in should succeed");

        let err = service
            .update_billing("u1", &UpdateBillingRequest::default())
            .await
            .expect_err("Empty billing body should fail validation");

        assert!(matches!(err, ProfileError::Validation(_)));
    }
}
