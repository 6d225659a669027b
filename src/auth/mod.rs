pub mod error;
pub mod extractors;
pub mod password;
pub mod service;
pub mod token;

use serde::{Deserialize, Serialize};
use validator::Validate;

pub use error::AuthError;
pub use extractors::AuthenticatedUser;
pub use password::PasswordHasher;
pub use service::{AuthService, Registration};
pub use token::{Claims, SharedClock, TokenIssuer, TokenSecret, TokenVerifier};

/// Represents the payload for a user login request.
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "Enter a valid email"))]
    pub email: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Represents the payload for a new user registration request.
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    /// Optional display name.
    #[validate(length(max = 100, message = "Name must be at most 100 characters"))]
    pub name: Option<String>,
    #[validate(email(message = "Enter a valid email"))]
    pub email: String,
    /// Must be at least 6 characters long.
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,
}

impl From<RegisterRequest> for Registration {
    fn from(request: RegisterRequest) -> Self {
        Registration {
            email: request.email,
            password: request.password,
            name: request.name,
        }
    }
}

/// Response body after a successful registration or login.
#[derive(Debug, Serialize, Deserialize)]
pub struct AuthResponse {
    pub token: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    #[test]
    fn test_login_request_validation() {
        let valid_login = LoginRequest {
            email: "test@example.com".to_string(),
            password: "password123".to_string(),
        };
        assert!(valid_login.validate().is_ok());

        let invalid_email_login = LoginRequest {
            email: "testexample.com".to_string(),
            password: "password123".to_string(),
        };
        assert!(invalid_email_login.validate().is_err());

        let empty_password_login = LoginRequest {
            email: "test@example.com".to_string(),
            password: String::new(),
        };
        assert!(empty_password_login.validate().is_err());
    }

    #[test]
    fn test_register_request_validation() {
        let valid_register = RegisterRequest {
            name: Some("Test User".to_string()),
            email: "test@example.com".to_string(),
            password: "password123".to_string(),
        };
        assert!(valid_register.validate().is_ok());

        let anonymous_register = RegisterRequest {
            name: None,
            email: "test@example.com".to_string(),
            password: "password123".to_string(),
        };
        assert!(anonymous_register.validate().is_ok());

        let short_password_register = RegisterRequest {
            name: None,
            email: "test@example.com".to_string(),
            password: "12345".to_string(),
        };
        assert!(short_password_register.validate().is_err());

        let long_name_register = RegisterRequest {
            name: Some("n".repeat(101)),
            email: "test@example.com".to_string(),
            password: "password123".to_string(),
        };
        assert!(long_name_register.validate().is_err());
    }
}
