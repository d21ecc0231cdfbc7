use crate::auth::{password, session, token, AuthService};
use crate::config::Settings;
use crate::error::AppError;
use crate::metrics as keys;
use crate::store::Db;
use crate::validation;
use async_trait::async_trait;
use chrono::Utc;
use clawcontrol_common::api::{
    LoginResponse, OrgSummary, RecoveryResponse, RegisterResponse, ResetPasswordResponse,
    UserProfile,
};
use clawcontrol_common::{OrgMember, Organization, Role, User, UserSession};
use metrics::counter;
use std::sync::Arc;
use uuid::Uuid;

pub struct DefaultAuth {
    db: Db,
    settings: Arc<Settings>,
}

impl DefaultAuth {
    pub fn new(db: Db, settings: Arc<Settings>) -> Self {
        Self { db, settings }
    }

    /// Insert a login session row and return its token.
    async fn issue_session(&self, user_id: Uuid) -> Result<String, AppError> {
        let tok = token::generate_token();
        let row = session::session_row(user_id, tok.clone(), self.settings.session_ttl_secs);
        self.db.user_sessions.insert(row).await?;
        counter!(keys::SESSION_CREATED).increment(1);
        Ok(tok)
    }

    /// Look up a session row for a token and discard it if expired.
    async fn live_session(&self, tok: &str) -> Option<UserSession> {
        let row = self.db.user_sessions.find_one_by("token", tok).await?;
        if session::is_live(&row) {
            Some(row)
        } else {
            None
        }
    }
}

#[async_trait]
impl AuthService for DefaultAuth {
    async fn register(
        &self,
        email: &str,
        name: &str,
        password: &str,
    ) -> Result<RegisterResponse, AppError> {
        let email = validation::normalize_email(email);
        validation::validate_email(&email)?;
        let name = name.trim();
        validation::validate_name(name)?;
        password::validate_password_length(password, self.settings.min_password_length)?;

        // Indexed uniqueness check before any row is written, so a
        // rejected registration leaves nothing behind.
        if self.db.users.find_one_by("email", &email).await.is_some() {
            return Err(AppError::DuplicateEmail);
        }

        let password_hash =
            password::hash_password(password).map_err(|e| AppError::Internal(e.to_string()))?;

        let now = Utc::now();
        let user_id = Uuid::new_v4();
        let org_id = Uuid::new_v4();

        // The user row goes in first. Its unique email index is the real
        // uniqueness gate, so a registration that loses that race fails
        // before any org or membership row exists.
        self.db
            .users
            .insert(User {
                id: user_id,
                email,
                name: name.to_string(),
                password_hash,
                default_org_id: org_id,
                created_at: now,
            })
            .await?;
        self.db
            .organizations
            .insert(Organization {
                id: org_id,
                name: format!("{name}'s Organization"),
                created_at: now,
            })
            .await?;
        self.db
            .org_members
            .insert(OrgMember {
                id: Uuid::new_v4(),
                org_id,
                user_id,
                role: Role::Owner,
                created_at: now,
            })
            .await?;

        let token = self.issue_session(user_id).await?;
        counter!(keys::AUTH_REGISTER).increment(1);
        tracing::info!(%user_id, %org_id, "registered user");

        Ok(RegisterResponse {
            token,
            user_id,
            org_id,
        })
    }

    async fn login(&self, email: &str, password: &str) -> Result<LoginResponse, AppError> {
        let email = validation::normalize_email(email);

        // Unknown email and wrong password take the same exit so the
        // two cases are indistinguishable to the caller.
        let user = self
            .db
            .users
            .find_one_by("email", &email)
            .await
            .ok_or(AppError::InvalidCredentials)?;
        if !password::verify_password(&user.password_hash, password) {
            counter!(keys::AUTH_LOGIN_FAILED).increment(1);
            return Err(AppError::InvalidCredentials);
        }

        let token = self.issue_session(user.id).await?;
        counter!(keys::AUTH_LOGIN_OK).increment(1);

        Ok(LoginResponse {
            token,
            user_id: user.id,
        })
    }

    async fn logout(&self, token: &str) -> Result<(), AppError> {
        if let Some(row) = self.db.user_sessions.find_one_by("token", token).await {
            self.db.user_sessions.remove(row.id).await?;
        }
        Ok(())
    }

    async fn me(&self, token: Option<&str>) -> Result<Option<UserProfile>, AppError> {
        let Some(tok) = token else {
            return Ok(None);
        };
        // A recovery credential authorizes a reset, never a login.
        if token::is_recovery_token(tok) {
            return Ok(None);
        }
        let Some(session) = self.live_session(tok).await else {
            return Ok(None);
        };
        let Some(user) = self.db.users.get(session.user_id).await else {
            return Ok(None);
        };

        let memberships = self
            .db
            .org_members
            .find_by("user", &user.id.to_string())
            .await;
        let mut orgs = Vec::with_capacity(memberships.len());
        for m in memberships {
            if let Some(org) = self.db.organizations.get(m.org_id).await {
                orgs.push(OrgSummary {
                    id: org.id,
                    name: org.name,
                    role: m.role,
                });
            }
        }
        orgs.sort_by(|a, b| a.name.cmp(&b.name));

        Ok(Some(UserProfile {
            user_id: user.id,
            email: user.email,
            name: user.name,
            current_org_id: user.default_org_id,
            orgs,
        }))
    }

    async fn update_user(&self, token: &str, name: Option<&str>) -> Result<(), AppError> {
        let (user, _) = self.authenticate(token).await?;
        if let Some(name) = name {
            let name = name.trim();
            validation::validate_name(name)?;
            self.db
                .users
                .update(user.id, |u| u.name = name.to_string())
                .await?;
        }
        Ok(())
    }

    async fn request_recovery(&self, email: &str) -> Result<RecoveryResponse, AppError> {
        let email = validation::normalize_email(email);

        let recovery_token = match self.db.users.find_one_by("email", &email).await {
            Some(user) => {
                let tok = token::generate_recovery_token();
                let row =
                    session::session_row(user.id, tok.clone(), self.settings.recovery_ttl_secs);
                self.db.user_sessions.insert(row).await?;
                counter!(keys::AUTH_RECOVERY_REQUEST).increment(1);
                Some(tok)
            },
            None => None,
        };

        // The response shape is identical either way; only the token
        // field betrays existence, and only to a dev/OSS caller that is
        // standing in for the email delivery a deployment would use.
        Ok(RecoveryResponse {
            success: true,
            recovery_token,
        })
    }

    async fn reset_password(
        &self,
        recovery_token: &str,
        new_password: &str,
    ) -> Result<ResetPasswordResponse, AppError> {
        if !token::is_recovery_token(recovery_token) {
            return Err(AppError::InvalidRecoveryToken);
        }
        password::validate_password_length(new_password, self.settings.min_password_length)?;

        let session_row = self
            .live_session(recovery_token)
            .await
            .ok_or(AppError::InvalidRecoveryToken)?;
        let user = self
            .db
            .users
            .get(session_row.user_id)
            .await
            .ok_or(AppError::InvalidRecoveryToken)?;

        let password_hash =
            password::hash_password(new_password).map_err(|e| AppError::Internal(e.to_string()))?;
        self.db
            .users
            .update(user.id, |u| u.password_hash = password_hash)
            .await?;

        // Global logout: every session of this user goes, the consumed
        // recovery row included.
        self.db
            .user_sessions
            .remove_where(|s| s.user_id == user.id)
            .await?;

        let token = self.issue_session(user.id).await?;
        counter!(keys::AUTH_PASSWORD_RESET).increment(1);
        tracing::info!(user_id = %user.id, "password reset, all sessions revoked");

        Ok(ResetPasswordResponse { token })
    }

    async fn authenticate(&self, token: &str) -> Result<(User, UserSession), AppError> {
        if token::is_recovery_token(token) {
            return Err(AppError::Unauthorized);
        }
        let session = self.live_session(token).await.ok_or(AppError::Unauthorized)?;
        let user = self
            .db
            .users
            .get(session.user_id)
            .await
            .ok_or(AppError::Unauthorized)?;
        Ok((user, session))
    }
}
