use std::sync::LazyLock;

use regex::Regex;

use crate::constants::limits;

use super::ApiError;

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("email regex is valid")
});

pub fn validate_username(username: &str) -> Result<&str, ApiError> {
    if username.is_empty() {
        return Err(ApiError::validation("Username cannot be empty"));
    }

    if username.chars().count() > limits::USERNAME_MAX_CHARS {
        return Err(ApiError::validation(format!(
            "Username must be {} characters or less",
            limits::USERNAME_MAX_CHARS
        )));
    }

    if !username
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-' || c == '_' || c == '.')
    {
        return Err(ApiError::validation(
            "Username may only contain letters, digits, '-', '_' and '.'",
        ));
    }

    Ok(username)
}

pub fn validate_email(email: &str) -> Result<&str, ApiError> {
    if email.is_empty() {
        return Err(ApiError::validation("Email cannot be empty"));
    }

    if !EMAIL_RE.is_match(email) {
        return Err(ApiError::validation("Email address is not valid"));
    }

    Ok(email)
}

pub fn validate_password(password: &str) -> Result<&str, ApiError> {
    if password.chars().count() < limits::PASSWORD_MIN_CHARS {
        return Err(ApiError::validation(format!(
            "Password must be at least {} characters",
            limits::PASSWORD_MIN_CHARS
        )));
    }

    Ok(password)
}

pub fn validate_message_text(text: &str) -> Result<&str, ApiError> {
    if text.trim().is_empty() {
        return Err(ApiError::validation("Message text cannot be empty"));
    }

    if text.chars().count() > limits::MESSAGE_MAX_CHARS {
        return Err(ApiError::validation(format!(
            "Message text must be {} characters or less",
            limits::MESSAGE_MAX_CHARS
        )));
    }

    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_username() {
        assert!(validate_username("alice").is_ok());
        assert!(validate_username("al-ice_99.x").is_ok());
        assert!(validate_username("").is_err());
        assert!(validate_username("has space").is_err());
        assert!(validate_username("semi;colon").is_err());

        let too_long = "a".repeat(limits::USERNAME_MAX_CHARS + 1);
        assert!(validate_username(&too_long).is_err());
    }

    #[test]
    fn test_validate_email() {
        assert!(validate_email("alice@example.com").is_ok());
        assert!(validate_email("a.b+tag@sub.example.io").is_ok());
        assert!(validate_email("").is_err());
        assert!(validate_email("not-an-email").is_err());
        assert!(validate_email("missing@tld").is_err());
        assert!(validate_email("spaces in@example.com").is_err());
    }

    #[test]
    fn test_validate_password() {
        assert!(validate_password("hunter42").is_ok());
        assert!(validate_password("12345").is_err());
        assert!(validate_password("").is_err());
    }

    #[test]
    fn test_validate_message_text() {
        assert!(validate_message_text("hello").is_ok());
        assert!(validate_message_text("").is_err());
        assert!(validate_message_text("   ").is_err());

        let at_limit = "x".repeat(limits::MESSAGE_MAX_CHARS);
        assert!(validate_message_text(&at_limit).is_ok());

        let over_limit = "x".repeat(limits::MESSAGE_MAX_CHARS + 1);
        assert!(validate_message_text(&over_limit).is_err());
    }
}
