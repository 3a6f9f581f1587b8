// src/common/migrations.rs
//! Database migration and schema management

use sqlx::SqlitePool;
use tracing::info;

/// Run all database migrations
///
/// Tables are created only if they don't already exist, so this is safe to
/// run on every startup.
pub async fn run_migrations(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    create_profile_tables(pool).await?;
    create_indexes(pool).await?;

    info!("Database migration completed successfully");

    Ok(())
}

/// Create the profiles table
///
/// `user_id` is the identifier issued by the external identity provider and
/// is the primary key; the uniqueness constraints on `user_id` and `email`
/// are the safety net for the concurrent first-sign-in race.
async fn create_profile_tables(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS profiles (
            user_id TEXT PRIMARY KEY,
            email TEXT NOT NULL UNIQUE,
            tier TEXT NOT NULL DEFAULT 'free' CHECK (tier IN ('free', 'pro')),
            stripe_customer_id TEXT,
            stripe_subscription_id TEXT,
            created_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// Create performance indexes
async fn create_indexes(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    // The billing collaborator looks profiles up by Stripe customer id
    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_profiles_stripe_customer ON profiles(stripe_customer_id)",
    )
    .execute(pool)
    .await?;

    Ok(())
}
