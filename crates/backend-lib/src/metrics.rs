// ==============
// crates/backend-lib/src/metrics.rs

//! Central place for metric keys
pub const AUTH_REGISTER: &str = "auth.register";
pub const AUTH_LOGIN_OK: &str = "auth.login.ok";
pub const AUTH_LOGIN_FAILED: &str = "auth.login.failed";
pub const AUTH_RECOVERY_REQUEST: &str = "auth.recovery.request";
pub const AUTH_PASSWORD_RESET: &str = "auth.password_reset";
pub const SESSION_CREATED: &str = "session.created";
pub const SESSION_EXPIRED: &str = "session.expired";
pub const SESSION_ACTIVE: &str = "session.active";
pub const AUDIT_RECORDED: &str = "audit.recorded";
