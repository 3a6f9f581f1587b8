// Common module - shared types and utilities across all modules

pub mod config;
pub mod envelope;
pub mod helpers;
pub mod migrations;
pub mod state;
pub mod validation;

// Re-export commonly used types for convenience
pub use config::Config;
pub use envelope::ActionState;
pub use helpers::safe_email_log;
pub use state::AppState;
pub use validation::{ValidationError, ValidationResult, Validator};
