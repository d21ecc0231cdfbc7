use crate::error::AppError;
use async_trait::async_trait;
use clawcontrol_common::api::{
    LoginResponse, RecoveryResponse, RegisterResponse, ResetPasswordResponse, UserProfile,
};
use clawcontrol_common::{User, UserSession};

/// The auth operations of the backend. Tokens are explicit string
/// arguments at this seam; the HTTP bearer-header convention lives in
/// the handlers.
#[async_trait]
pub trait AuthService: Send + Sync {
    /// Create a user, their personal organization, an owner membership,
    /// and a first session.
    async fn register(
        &self,
        email: &str,
        name: &str,
        password: &str,
    ) -> Result<RegisterResponse, AppError>;

    /// Issue a fresh session. Existing sessions are untouched.
    async fn login(&self, email: &str, password: &str) -> Result<LoginResponse, AppError>;

    /// Delete the session row for this token. Idempotent.
    async fn logout(&self, token: &str) -> Result<(), AppError>;

    /// Resolve a profile for a token, or `None` for an absent, unknown,
    /// or expired token. Never fails on bad credentials.
    async fn me(&self, token: Option<&str>) -> Result<Option<UserProfile>, AppError>;

    /// Rename the authenticated user.
    async fn update_user(&self, token: &str, name: Option<&str>) -> Result<(), AppError>;

    /// Phase 1 of password recovery. Always reports success; the token
    /// is only present when the email is registered.
    async fn request_recovery(&self, email: &str) -> Result<RecoveryResponse, AppError>;

    /// Phase 2: consume a recovery token, set the new password, revoke
    /// every session of the user, and issue one fresh session.
    async fn reset_password(
        &self,
        recovery_token: &str,
        new_password: &str,
    ) -> Result<ResetPasswordResponse, AppError>;

    /// Resolve a live, non-recovery session or fail with `Unauthorized`.
    async fn authenticate(&self, token: &str) -> Result<(User, UserSession), AppError>;
}
