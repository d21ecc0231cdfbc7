// crates/backend-lib/tests/auth_flow.rs
//! End-to-end properties of the auth service against an in-memory store.
use chrono::{Duration, Utc};
use clawcontrol_backend_lib::auth::{AuthService, DefaultAuth, RECOVERY_PREFIX};
use clawcontrol_backend_lib::config::Settings;
use clawcontrol_backend_lib::error::AppError;
use clawcontrol_backend_lib::store::Db;
use clawcontrol_common::Role;
use std::sync::Arc;

fn harness() -> (Db, DefaultAuth) {
    let db = Db::in_memory();
    let auth = DefaultAuth::new(db.clone(), Arc::new(Settings::default()));
    (db, auth)
}

#[tokio::test]
async fn test_register_creates_user_org_and_owner_membership() {
    let (db, auth) = harness();

    let resp = auth.register("a@x.com", "Ada", "secret123").await.unwrap();

    assert_eq!(db.organizations.len().await, 1);
    assert_eq!(db.org_members.len().await, 1);

    let membership = db
        .org_members
        .find_by("user", &resp.user_id.to_string())
        .await;
    assert_eq!(membership.len(), 1);
    assert_eq!(membership[0].role, Role::Owner);
    assert_eq!(membership[0].org_id, resp.org_id);

    // Email lands normalized in the store.
    let user = db.users.get(resp.user_id).await.unwrap();
    assert_eq!(user.email, "a@x.com");
    assert_eq!(user.default_org_id, resp.org_id);
}

#[tokio::test]
async fn test_register_rejects_duplicate_email_case_insensitive() {
    let (_db, auth) = harness();

    auth.register("a@x.com", "Ada", "secret123").await.unwrap();

    let err = auth
        .register("  A@X.COM ", "Someone Else", "different-pw")
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::DuplicateEmail));
}

#[tokio::test]
async fn test_racing_duplicate_registrations_leave_no_ownerless_org() {
    let (db, auth) = harness();
    let auth = Arc::new(auth);

    // Fire both registrations concurrently so either may lose the race
    // on the unique email index rather than the up-front lookup.
    let (a, b) = tokio::join!(
        {
            let auth = Arc::clone(&auth);
            async move { auth.register("a@x.com", "Ada", "secret123").await }
        },
        {
            let auth = Arc::clone(&auth);
            async move { auth.register("A@X.com", "Ada Again", "secret123").await }
        }
    );
    assert_eq!(a.is_ok() as usize + b.is_ok() as usize, 1);

    // The loser must not have written anything: one user, one org, and
    // that org has an owner.
    assert_eq!(db.users.len().await, 1);
    assert_eq!(db.organizations.len().await, 1);
    let orgs = db.organizations.all().await;
    let members = db.org_members.find_by("org", &orgs[0].id.to_string()).await;
    assert_eq!(members.len(), 1);
    assert_eq!(members[0].role, Role::Owner);
}

#[tokio::test]
async fn test_register_rejects_short_password_and_bad_email() {
    let (_db, auth) = harness();

    let err = auth.register("a@x.com", "Ada", "12345").await.unwrap_err();
    assert!(matches!(err, AppError::WeakPassword(6)));

    let err = auth
        .register("not-an-email", "Ada", "secret123")
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::InvalidInput(_)));
}

#[tokio::test]
async fn test_login_error_is_generic_for_both_failure_modes() {
    let (_db, auth) = harness();
    auth.register("a@x.com", "Ada", "secret123").await.unwrap();

    let wrong_pw = auth.login("a@x.com", "wrongpass").await.unwrap_err();
    let no_user = auth.login("nobody@x.com", "secret123").await.unwrap_err();

    // Wrong password and unknown email must be indistinguishable.
    assert_eq!(wrong_pw.to_string(), no_user.to_string());
    assert!(matches!(wrong_pw, AppError::InvalidCredentials));
    assert!(matches!(no_user, AppError::InvalidCredentials));
}

#[tokio::test]
async fn test_login_does_not_invalidate_prior_sessions() {
    let (_db, auth) = harness();
    let reg = auth.register("a@x.com", "Ada", "secret123").await.unwrap();
    let login = auth.login("a@x.com", "secret123").await.unwrap();

    assert!(auth.me(Some(&reg.token)).await.unwrap().is_some());
    assert!(auth.me(Some(&login.token)).await.unwrap().is_some());
}

#[tokio::test]
async fn test_me_returns_none_for_absent_unknown_or_expired_token() {
    let (db, auth) = harness();
    let reg = auth.register("a@x.com", "Ada", "secret123").await.unwrap();

    assert!(auth.me(None).await.unwrap().is_none());
    assert!(auth.me(Some("no-such-token")).await.unwrap().is_none());

    // Expire the session in place; the row still exists but must no
    // longer authenticate.
    let row = db
        .user_sessions
        .find_one_by("token", &reg.token)
        .await
        .unwrap();
    db.user_sessions
        .update(row.id, |s| s.expires_at = Utc::now() - Duration::seconds(1))
        .await
        .unwrap();

    assert!(auth.me(Some(&reg.token)).await.unwrap().is_none());
    assert!(db.user_sessions.get(row.id).await.is_some());
}

#[tokio::test]
async fn test_me_resolves_profile_and_stored_default_org() {
    let (_db, auth) = harness();
    let reg = auth.register("a@x.com", "Ada", "secret123").await.unwrap();

    let profile = auth.me(Some(&reg.token)).await.unwrap().unwrap();
    assert_eq!(profile.user_id, reg.user_id);
    assert_eq!(profile.email, "a@x.com");
    assert_eq!(profile.current_org_id, reg.org_id);
    assert_eq!(profile.orgs.len(), 1);
    assert_eq!(profile.orgs[0].role, Role::Owner);
}

#[tokio::test]
async fn test_logout_is_idempotent() {
    let (_db, auth) = harness();
    let reg = auth.register("a@x.com", "Ada", "secret123").await.unwrap();

    auth.logout(&reg.token).await.unwrap();
    assert!(auth.me(Some(&reg.token)).await.unwrap().is_none());

    // Second logout of the same token is a no-op.
    auth.logout(&reg.token).await.unwrap();
}

#[tokio::test]
async fn test_update_user_renames() {
    let (_db, auth) = harness();
    let reg = auth.register("a@x.com", "Ada", "secret123").await.unwrap();

    auth.update_user(&reg.token, Some("Ada L.")).await.unwrap();
    let profile = auth.me(Some(&reg.token)).await.unwrap().unwrap();
    assert_eq!(profile.name, "Ada L.");

    // Without a name the call is a no-op, not an error.
    auth.update_user(&reg.token, None).await.unwrap();
}

#[tokio::test]
async fn test_request_recovery_masks_existence() {
    let (_db, auth) = harness();
    auth.register("a@x.com", "Ada", "secret123").await.unwrap();

    let known = auth.request_recovery("a@x.com").await.unwrap();
    let unknown = auth.request_recovery("nobody@x.com").await.unwrap();

    assert!(known.success);
    assert!(unknown.success);
    assert!(known.recovery_token.is_some());
    assert!(unknown.recovery_token.is_none());

    let token = known.recovery_token.unwrap();
    assert!(token.starts_with(RECOVERY_PREFIX));

    // A recovery credential never passes as a login session.
    assert!(auth.me(Some(&token)).await.unwrap().is_none());
}

#[tokio::test]
async fn test_reset_password_validates_token_and_password() {
    let (db, auth) = harness();
    let reg = auth.register("a@x.com", "Ada", "secret123").await.unwrap();

    // A plain session token lacks the recovery prefix.
    let err = auth.reset_password(&reg.token, "newpass1").await.unwrap_err();
    assert!(matches!(err, AppError::InvalidRecoveryToken));

    let recovery = auth
        .request_recovery("a@x.com")
        .await
        .unwrap()
        .recovery_token
        .unwrap();

    let err = auth.reset_password(&recovery, "short").await.unwrap_err();
    assert!(matches!(err, AppError::WeakPassword(6)));

    // Expired recovery tokens are rejected like unknown ones.
    let row = db.user_sessions.find_one_by("token", &recovery).await.unwrap();
    db.user_sessions
        .update(row.id, |s| s.expires_at = Utc::now() - Duration::seconds(1))
        .await
        .unwrap();
    let err = auth.reset_password(&recovery, "newpass1").await.unwrap_err();
    assert!(matches!(err, AppError::InvalidRecoveryToken));
}

#[tokio::test]
async fn test_reset_password_revokes_every_session() {
    let (db, auth) = harness();
    let reg = auth.register("a@x.com", "Ada", "secret123").await.unwrap();
    let login = auth.login("a@x.com", "secret123").await.unwrap();

    let recovery = auth
        .request_recovery("a@x.com")
        .await
        .unwrap()
        .recovery_token
        .unwrap();
    let reset = auth.reset_password(&recovery, "newpass1").await.unwrap();

    // Every pre-reset credential is gone, recovery row included.
    assert!(auth.me(Some(&reg.token)).await.unwrap().is_none());
    assert!(auth.me(Some(&login.token)).await.unwrap().is_none());
    assert!(db.user_sessions.find_one_by("token", &recovery).await.is_none());

    // The fresh session works, and so does the new password.
    assert!(auth.me(Some(&reset.token)).await.unwrap().is_some());
    auth.login("a@x.com", "newpass1").await.unwrap();
    let err = auth.login("a@x.com", "secret123").await.unwrap_err();
    assert!(matches!(err, AppError::InvalidCredentials));
}

#[tokio::test]
async fn test_full_recovery_scenario() {
    // register -> bad login -> recover -> reset -> old token dead, new live
    let (_db, auth) = harness();

    let reg = auth.register("a@x.com", "Ada", "secret123").await.unwrap();
    assert!(auth.login("a@x.com", "wrongpass").await.is_err());

    let recovery = auth
        .request_recovery("a@x.com")
        .await
        .unwrap()
        .recovery_token
        .unwrap();
    let reset = auth.reset_password(&recovery, "newpass1").await.unwrap();

    assert!(auth.me(Some(&reg.token)).await.unwrap().is_none());
    let profile = auth.me(Some(&reset.token)).await.unwrap().unwrap();
    assert_eq!(profile.user_id, reg.user_id);
}
