// Validation utilities module
// Custom field rules used by the request DTOs

use validator::ValidationError;

/// Validates that a username contains only ASCII letters and digits
pub fn validate_username(username: &str) -> Result<(), ValidationError> {
    if !username.is_empty() && username.chars().all(|c| c.is_ascii_alphanumeric()) {
        Ok(())
    } else {
        let mut error = ValidationError::new("username_not_alphanumeric");
        error.message = Some("Username contains non alphanumeric characters - not allowed.".into());
        Err(error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alphanumeric_usernames_pass() {
        assert!(validate_username("alice123").is_ok());
        assert!(validate_username("ALICE").is_ok());
    }

    #[test]
    fn test_symbols_and_spaces_fail() {
        assert!(validate_username("alice 123").is_err());
        assert!(validate_username("alice-123").is_err());
        assert!(validate_username("älice123").is_err());
        assert!(validate_username("").is_err());
    }
}
