// ============================
// clawcontrol-backend-lib/src/auth/mod.rs
// ============================
//! Authentication module.

pub mod password;
pub mod session;
pub mod token;
mod service;
mod service_impl;

pub use password::{hash_password, validate_password_length, verify_password, MIN_PASSWORD_LENGTH};
pub use service::AuthService;
pub use service_impl::DefaultAuth;
pub use session::{is_live, session_row, spawn_expiry_sweep, RECOVERY_TTL_SECS, SESSION_TTL_SECS};
pub use token::{generate_recovery_token, generate_token, is_recovery_token, RECOVERY_PREFIX};
