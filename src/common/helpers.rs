// Helper functions for safe logging

/// Masks email addresses for safe logging
/// Prevents sensitive data exposure while preserving debugging utility
///
/// # Example
/// ```
/// let masked = safe_email_log("user@example.com");
/// // Returns: "u***@example.com"
/// ```
pub fn safe_email_log(email: &str) -> String {
    if email.len() > 3 {
        let parts: Vec<&str> = email.split('@').collect();
        if parts.len() == 2 {
            // chars().next() keeps the mask safe for multi-byte first characters
            match parts[0].chars().next() {
                Some(first) => format!("{}***@{}", first, parts[1]),
                None => "***@***.***".to_string(),
            }
        } else {
            "***@***.***".to_string()
        }
    } else {
        "***@***.***".to_string()
    }
}
