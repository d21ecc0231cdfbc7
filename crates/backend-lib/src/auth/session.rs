// ============================
// clawcontrol-backend-lib/src/auth/session.rs
// ============================
//! Session row construction, validity, and expiry housekeeping.
//!
//! Validity is decided lazily: every use compares `expires_at` against
//! the clock, so the sweep below is housekeeping only and an expired row
//! that is still on disk never authenticates.
use crate::metrics as keys;
use crate::store::Db;
use chrono::{Duration as ChronoDuration, Utc};
use clawcontrol_common::UserSession;
use metrics::{counter, gauge};
use std::time::Duration;
use uuid::Uuid;

/// Session TTL (time to live): 30 days
pub const SESSION_TTL_SECS: u64 = 60 * 60 * 24 * 30;

/// Recovery token TTL: 1 hour
pub const RECOVERY_TTL_SECS: u64 = 60 * 60;

/// How often the expiry sweep runs
const SWEEP_INTERVAL: Duration = Duration::from_secs(60 * 60);

/// Build a session row for a user with the given TTL.
pub fn session_row(user_id: Uuid, token: String, ttl_secs: u64) -> UserSession {
    let now = Utc::now();
    UserSession {
        id: Uuid::new_v4(),
        user_id,
        token,
        expires_at: now + ChronoDuration::seconds(ttl_secs as i64),
        created_at: now,
    }
}

/// Whether a session row is still within its TTL.
pub fn is_live(session: &UserSession) -> bool {
    Utc::now() < session.expires_at
}

/// Spawn the periodic task that prunes expired session rows.
pub fn spawn_expiry_sweep(db: Db) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            tokio::time::sleep(SWEEP_INTERVAL).await;

            match db.user_sessions.remove_where(|s| !is_live(s)).await {
                Ok(removed) => {
                    if removed > 0 {
                        counter!(keys::SESSION_EXPIRED).increment(removed as u64);
                        gauge!(keys::SESSION_ACTIVE).set(db.user_sessions.len().await as f64);
                        tracing::debug!(removed, "pruned expired sessions");
                    }
                },
                Err(e) => {
                    tracing::warn!(error = %e, "session sweep failed");
                },
            }
        }
    })
}
