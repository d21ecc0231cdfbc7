// ============================
// clawcontrol-backend-lib/src/auth/password.rs
// ============================
//! Password hashing and verification.
use crate::error::AppError;
use scrypt::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Scrypt,
};

/// Minimum password length
pub const MIN_PASSWORD_LENGTH: usize = 6;

/// Hash a password using scrypt
pub fn hash_password(plain: &str) -> anyhow::Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Scrypt.hash_password(plain.as_bytes(), &salt)?.to_string();
    Ok(hash)
}

/// Verify a password against a hash
pub fn verify_password(hash: &str, plain: &str) -> bool {
    let parsed_hash = match PasswordHash::new(hash) {
        Ok(h) => h,
        Err(_) => return false,
    };
    Scrypt.verify_password(plain.as_bytes(), &parsed_hash).is_ok()
}

/// Check the minimum length requirement.
pub fn validate_password_length(plain: &str, min_length: usize) -> Result<(), AppError> {
    if plain.len() < min_length {
        return Err(AppError::WeakPassword(min_length));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let hash = hash_password("secret123").unwrap();
        assert!(verify_password(&hash, "secret123"));
        assert!(!verify_password(&hash, "wrong_password"));
    }

    #[test]
    fn test_verify_garbage_hash() {
        assert!(!verify_password("not-a-phc-string", "secret123"));
    }

    #[test]
    fn test_length_requirement() {
        assert!(validate_password_length("短", MIN_PASSWORD_LENGTH).is_err());
        assert!(validate_password_length("12345", 6).is_err());
        assert!(validate_password_length("123456", 6).is_ok());
    }
}
