//! Password strength validation at registration time.

use saveserve_core::config::auth::AuthConfig;
use saveserve_core::error::AppError;

/// Enforces minimum length and zxcvbn strength score on new passwords.
#[derive(Debug, Clone)]
pub struct PasswordValidator {
    min_length: usize,
    min_score: u8,
}

impl PasswordValidator {
    /// Creates a new validator from auth configuration.
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            min_length: config.password_min_length,
            min_score: config.password_min_score.min(4),
        }
    }

    /// Validates a candidate password, using `user_inputs` (username,
    /// email) as dictionary words the password must not lean on.
    pub fn validate(&self, password: &str, user_inputs: &[&str]) -> Result<(), AppError> {
        if password.len() < self.min_length {
            return Err(AppError::validation(format!(
                "Password must be at least {} characters",
                self.min_length
            )));
        }

        let estimate = zxcvbn::zxcvbn(password, user_inputs);
        if (estimate.score() as u8) < self.min_score {
            return Err(AppError::validation(
                "Password is too weak; add length or variety",
            ));
        }

        Ok(())
    }
}
