use argon2::{
    Argon2,
    password_hash::{
        PasswordHash, PasswordHasher as _, PasswordVerifier as _, SaltString, rand_core::OsRng,
    },
};
use validator::ValidateEmail;

use crate::error::{AccountError, AccountResult};
use crate::ports::{
    CodeGenerator, EmailValidator, PasswordComparer, PasswordHasher, PasswordValidator,
};

const MAX_EMAIL_LENGTH: usize = 255;
const MAX_PASSWORD_LENGTH: usize = 128;
const SPECIAL_CHARS: &str = "!@#$%^&*()_+-=[]{}|;:,.<>?";

/// Argon2 password hashing; also compares passwords against stored PHC strings.
#[derive(Debug, Default, Clone)]
pub struct Argon2PasswordHasher;

impl Argon2PasswordHasher {
    pub fn new() -> Self {
        Self
    }
}

impl PasswordHasher for Argon2PasswordHasher {
    fn hash(&self, password: &str) -> AccountResult<String> {
        let salt = SaltString::generate(&mut OsRng);
        let argon2 = Argon2::default();

        argon2
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| AccountError::Internal(format!("Password hash error: {}", e)))
    }
}

impl PasswordComparer for Argon2PasswordHasher {
    fn compare(&self, password: &str, hash: &str) -> AccountResult<bool> {
        let parsed_hash = PasswordHash::new(hash).map_err(|e| {
            AccountError::Internal(format!("Stored password hash is unreadable: {}", e))
        })?;

        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok())
    }
}

/// Syntactic email check.
#[derive(Debug, Default, Clone)]
pub struct SyntaxEmailValidator;

impl EmailValidator for SyntaxEmailValidator {
    fn validate(&self, email: &str) -> AccountResult<()> {
        if email.len() > MAX_EMAIL_LENGTH {
            return Err(AccountError::InvalidData(format!(
                "Email cannot exceed {} characters",
                MAX_EMAIL_LENGTH
            )));
        }
        if email.trim() != email || !email.validate_email() {
            return Err(AccountError::InvalidData(format!(
                "'{}' is not a valid email address",
                email
            )));
        }
        Ok(())
    }
}

/// Password strength rules.
#[derive(Debug, Clone)]
pub struct StrengthPasswordValidator {
    min_length: usize,
}

impl StrengthPasswordValidator {
    pub fn new(min_length: usize) -> Self {
        Self { min_length }
    }
}

impl Default for StrengthPasswordValidator {
    fn default() -> Self {
        Self::new(8)
    }
}

impl PasswordValidator for StrengthPasswordValidator {
    fn validate(&self, password: &str, email: &str) -> AccountResult<()> {
        let length = password.chars().count();
        if length < self.min_length {
            return Err(AccountError::InvalidData(format!(
                "Password must be at least {} characters",
                self.min_length
            )));
        }

        if length > MAX_PASSWORD_LENGTH {
            return Err(AccountError::InvalidData(format!(
                "Password cannot exceed {} characters",
                MAX_PASSWORD_LENGTH
            )));
        }

        if !password.chars().any(|c| c.is_uppercase()) {
            return Err(AccountError::InvalidData(
                "Password must contain at least one uppercase letter".to_string(),
            ));
        }

        if !password.chars().any(|c| c.is_lowercase()) {
            return Err(AccountError::InvalidData(
                "Password must contain at least one lowercase letter".to_string(),
            ));
        }

        if !password.chars().any(|c| c.is_numeric()) {
            return Err(AccountError::InvalidData(
                "Password must contain at least one digit".to_string(),
            ));
        }

        if !password.chars().any(|c| SPECIAL_CHARS.contains(c)) {
            return Err(AccountError::InvalidData(format!(
                "Password must contain at least one special character ({})",
                SPECIAL_CHARS
            )));
        }

        // Local parts shorter than 3 characters match too many passwords by accident
        let local_part = email.split('@').next().unwrap_or_default().to_lowercase();
        if local_part.len() >= 3 && password.to_lowercase().contains(&local_part) {
            return Err(AccountError::InvalidData(
                "Password must not contain the email address".to_string(),
            ));
        }

        Ok(())
    }
}

/// Zero-padded decimal one-time codes.
#[derive(Debug, Clone)]
pub struct NumericCodeGenerator {
    length: usize,
}

impl NumericCodeGenerator {
    pub fn new(length: usize) -> Self {
        Self { length: length.max(1) }
    }
}

impl Default for NumericCodeGenerator {
    fn default() -> Self {
        Self::new(6)
    }
}

impl CodeGenerator for NumericCodeGenerator {
    fn generate(&self) -> String {
        (0..self.length)
            .map(|_| char::from(b'0' + (rand::random::<u32>() % 10) as u8))
            .collect()
    }
}
