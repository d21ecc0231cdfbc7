// ============================
// clawcontrol-backend-lib/src/auth/token.rs
// ============================
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
/** Secure token generation for authentication
Session and recovery tokens are random OS-entropy strings; recovery
tokens carry a prefix marking them as a one-time password-reset
capability rather than a login credential. */
use rand::{rngs::OsRng, RngCore};

/// Default token size in bytes (32 bytes = 256 bits of entropy)
const DEFAULT_TOKEN_BYTES: usize = 32;

/// Prefix marking a recovery credential in the sessions table.
pub const RECOVERY_PREFIX: &str = "rec_";

/** Generate a cryptographically secure random token
This uses OS-provided entropy to create a secure random token
suitable for bearer session tokens.
# Returns
A base64 URL-safe encoded string without padding */
pub fn generate_token() -> String {
    let mut buffer = [0u8; DEFAULT_TOKEN_BYTES];
    OsRng.fill_bytes(&mut buffer);
    URL_SAFE_NO_PAD.encode(buffer)
}

/// Generate a recovery token: a regular token behind the recovery prefix.
pub fn generate_recovery_token() -> String {
    format!("{RECOVERY_PREFIX}{}", generate_token())
}

/// Whether a token string is a recovery credential.
pub fn is_recovery_token(token: &str) -> bool {
    token.starts_with(RECOVERY_PREFIX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_generation() {
        // Generate two tokens and verify they're different
        let token1 = generate_token();
        let token2 = generate_token();

        assert_ne!(token1, token2);

        // 32 bytes of entropy encoded in base64, should be about 43-44 chars
        assert!(token1.len() >= 42);
    }

    #[test]
    fn test_recovery_prefix() {
        let recovery = generate_recovery_token();
        assert!(is_recovery_token(&recovery));
        assert!(!is_recovery_token(&generate_token()));
        assert!(recovery.len() > RECOVERY_PREFIX.len() + 42);
    }
}
