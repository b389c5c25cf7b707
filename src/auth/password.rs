use bcrypt::{hash, verify, DEFAULT_COST};
use crate::errors::{AppError, Result};

pub const MIN_PASSWORD_LENGTH: usize = 6;

pub struct PasswordService;

impl PasswordService {
    pub fn hash_password(password: &str) -> Result<String> {
        hash(password, DEFAULT_COST)
            .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to hash password: {}", e)))
    }

    pub fn verify_password(password: &str, hash: &str) -> Result<bool> {
        verify(password, hash)
            .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to verify password: {}", e)))
    }

    pub fn validate_credentials(email: &str, password: &str) -> Result<()> {
        if email.trim().is_empty() || password.is_empty() {
            return Err(AppError::Validation("Email and password are required".to_string()));
        }

        if !email.contains('@') {
            return Err(AppError::Validation("Invalid email format".to_string()));
        }

        if password.chars().count() < MIN_PASSWORD_LENGTH {
            return Err(AppError::Validation(format!(
                "Password must be at least {} characters long",
                MIN_PASSWORD_LENGTH
            )));
        }

        Ok(())
    }

    /// Username shown in the UI when none was chosen: the email's local part.
    pub fn default_username(email: &str) -> String {
        email.split('@').next().unwrap_or(email).to_string()
    }
}
