// ============================
// clawcontrol-backend-lib/src/audit.rs
// ============================
//! Audit trail: one row appended per successful mutation.
use crate::error::AppError;
use crate::metrics as keys;
use crate::store::Db;
use chrono::Utc;
use clawcontrol_common::AuditLog;
use metrics::counter;
use uuid::Uuid;

/// Append an audit row for a mutation performed by `actor_id` in
/// `org_id`. `action` is a verb like `"instance.create"`.
pub async fn record(
    db: &Db,
    org_id: Uuid,
    actor_id: Uuid,
    action: &str,
    entity: &str,
    entity_id: Option<Uuid>,
) -> Result<(), AppError> {
    db.audit_logs
        .insert(AuditLog {
            id: Uuid::new_v4(),
            org_id,
            actor_id,
            action: action.to_string(),
            entity: entity.to_string(),
            entity_id,
            created_at: Utc::now(),
        })
        .await?;

    counter!(keys::AUDIT_RECORDED).increment(1);
    tracing::debug!(%org_id, %actor_id, action, "audit recorded");
    Ok(())
}
