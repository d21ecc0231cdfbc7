// ============================
// clawcontrol-backend-lib/src/handlers/mod.rs
// ============================
//! HTTP handlers: auth endpoints plus the org-scoped CRUD surface.

pub mod auth;
pub mod fleet;
pub mod library;
pub mod orgs;
pub mod sessions;

use crate::error::AppError;
use crate::AppState;
use axum::http::{header::AUTHORIZATION, HeaderMap};
use clawcontrol_common::{OrgMember, Role, User, UserSession};
use uuid::Uuid;

/// Pull the bearer token out of the `Authorization` header, if any.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

/// Resolve the calling user from the bearer header.
pub async fn require_session(
    state: &AppState,
    headers: &HeaderMap,
) -> Result<(User, UserSession), AppError> {
    let token = bearer_token(headers).ok_or(AppError::Unauthorized)?;
    state.auth.authenticate(token).await
}

/// Check that `user_id` belongs to `org_id` with at least `min_role`.
/// Non-members get the same answer as members lacking the role.
pub async fn require_member(
    state: &AppState,
    user_id: Uuid,
    org_id: Uuid,
    min_role: Role,
) -> Result<OrgMember, AppError> {
    let membership = state
        .db
        .org_members
        .find_by("user", &user_id.to_string())
        .await
        .into_iter()
        .find(|m| m.org_id == org_id)
        .ok_or_else(|| AppError::Forbidden("not a member of this organization".to_string()))?;

    if membership.role < min_role {
        return Err(AppError::Forbidden("insufficient role".to_string()));
    }
    Ok(membership)
}
