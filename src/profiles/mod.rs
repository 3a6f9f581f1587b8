//! # Profiles Module
//!
//! This module handles all profile-related functionality including:
//! - Identity synchronization (get-or-create on sign-in)
//! - Profile lookup by external identifier
//! - Billing-field updates written by the billing collaborator

pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;
pub mod validators;

#[cfg(test)]
mod tests;

pub use models::{Profile, Tier};
pub use routes::profiles_routes;
