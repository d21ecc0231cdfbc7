// ============================
// clawcontrol-backend-lib/src/handlers/orgs.rs
// ============================
//! Organizations, memberships, audit trail, and the dashboard overview.
use crate::error::AppError;
use crate::handlers::{require_member, require_session};
use crate::{audit, validation, AppState};
use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    Json,
};
use clawcontrol_common::api::{
    AddMemberRequest, MemberView, OrgOverview, OrgSummary, UpdateMemberRequest,
};
use clawcontrol_common::{
    AgentStatus, AuditLog, ChannelStatus, InstanceStatus, OrgMember, Organization, Role,
    SessionStatus,
};
use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

/// GET /api/orgs — the calling user's organizations.
pub async fn list_my_orgs(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<Vec<OrgSummary>>, AppError> {
    let (user, _) = require_session(&state, &headers).await?;

    let memberships = state
        .db
        .org_members
        .find_by("user", &user.id.to_string())
        .await;
    let mut orgs = Vec::with_capacity(memberships.len());
    for m in memberships {
        if let Some(org) = state.db.organizations.get(m.org_id).await {
            orgs.push(OrgSummary {
                id: org.id,
                name: org.name,
                role: m.role,
            });
        }
    }
    orgs.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(Json(orgs))
}

pub async fn get_org(
    State(state): State<Arc<AppState>>,
    Path(org_id): Path<Uuid>,
    headers: HeaderMap,
) -> Result<Json<Organization>, AppError> {
    let (user, _) = require_session(&state, &headers).await?;
    require_member(&state, user.id, org_id, Role::Viewer).await?;

    let org = state
        .db
        .organizations
        .get(org_id)
        .await
        .ok_or_else(|| AppError::NotFound("organization".to_string()))?;
    Ok(Json(org))
}

pub async fn list_members(
    State(state): State<Arc<AppState>>,
    Path(org_id): Path<Uuid>,
    headers: HeaderMap,
) -> Result<Json<Vec<MemberView>>, AppError> {
    let (user, _) = require_session(&state, &headers).await?;
    require_member(&state, user.id, org_id, Role::Viewer).await?;

    let memberships = state.db.org_members.find_by("org", &org_id.to_string()).await;
    let mut views = Vec::with_capacity(memberships.len());
    for m in memberships {
        if let Some(u) = state.db.users.get(m.user_id).await {
            views.push(MemberView {
                id: m.id,
                user_id: u.id,
                email: u.email,
                name: u.name,
                role: m.role,
                created_at: m.created_at,
            });
        }
    }
    views.sort_by_key(|v| v.created_at);
    Ok(Json(views))
}

/// POST /api/orgs/{org_id}/members — invite an existing user (admin+).
pub async fn add_member(
    State(state): State<Arc<AppState>>,
    Path(org_id): Path<Uuid>,
    headers: HeaderMap,
    Json(req): Json<AddMemberRequest>,
) -> Result<(StatusCode, Json<OrgMember>), AppError> {
    let (actor, _) = require_session(&state, &headers).await?;
    require_member(&state, actor.id, org_id, Role::Admin).await?;

    let email = validation::normalize_email(&req.email);
    let invitee = state
        .db
        .users
        .find_one_by("email", &email)
        .await
        .ok_or_else(|| AppError::NotFound("user".to_string()))?;

    let already = state
        .db
        .org_members
        .find_by("org", &org_id.to_string())
        .await
        .into_iter()
        .any(|m| m.user_id == invitee.id);
    if already {
        return Err(AppError::Conflict("user is already a member".to_string()));
    }

    let member = OrgMember {
        id: Uuid::new_v4(),
        org_id,
        user_id: invitee.id,
        role: req.role,
        created_at: Utc::now(),
    };
    state.db.org_members.insert(member.clone()).await?;
    audit::record(
        &state.db,
        org_id,
        actor.id,
        "member.add",
        "member",
        Some(member.id),
    )
    .await?;

    Ok((StatusCode::CREATED, Json(member)))
}

/// PATCH /api/members/{id} — change a role (admin+). An org must keep
/// at least one owner, so the last owner cannot be demoted.
pub async fn update_member(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
    Json(req): Json<UpdateMemberRequest>,
) -> Result<Json<OrgMember>, AppError> {
    let (actor, _) = require_session(&state, &headers).await?;
    let target = state
        .db
        .org_members
        .get(id)
        .await
        .ok_or_else(|| AppError::NotFound("member".to_string()))?;
    require_member(&state, actor.id, target.org_id, Role::Admin).await?;

    if target.role == Role::Owner && req.role != Role::Owner {
        ensure_other_owner(&state, target.org_id, target.id).await?;
    }

    let updated = state
        .db
        .org_members
        .update(id, |m| m.role = req.role)
        .await?;
    audit::record(
        &state.db,
        target.org_id,
        actor.id,
        "member.update",
        "member",
        Some(id),
    )
    .await?;

    Ok(Json(updated))
}

/// DELETE /api/members/{id} — remove a membership (admin+, same
/// last-owner rule).
pub async fn remove_member(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
) -> Result<StatusCode, AppError> {
    let (actor, _) = require_session(&state, &headers).await?;
    let target = state
        .db
        .org_members
        .get(id)
        .await
        .ok_or_else(|| AppError::NotFound("member".to_string()))?;
    require_member(&state, actor.id, target.org_id, Role::Admin).await?;

    if target.role == Role::Owner {
        ensure_other_owner(&state, target.org_id, target.id).await?;
    }

    state.db.org_members.remove(id).await?;
    audit::record(
        &state.db,
        target.org_id,
        actor.id,
        "member.remove",
        "member",
        Some(id),
    )
    .await?;

    Ok(StatusCode::NO_CONTENT)
}

async fn ensure_other_owner(
    state: &AppState,
    org_id: Uuid,
    excluding: Uuid,
) -> Result<(), AppError> {
    let owners = state
        .db
        .org_members
        .find_by("org", &org_id.to_string())
        .await
        .into_iter()
        .filter(|m| m.role == Role::Owner && m.id != excluding)
        .count();
    if owners == 0 {
        return Err(AppError::Conflict(
            "organization must retain an owner".to_string(),
        ));
    }
    Ok(())
}

/// GET /api/orgs/{org_id}/audit — newest first.
pub async fn list_audit(
    State(state): State<Arc<AppState>>,
    Path(org_id): Path<Uuid>,
    headers: HeaderMap,
) -> Result<Json<Vec<AuditLog>>, AppError> {
    let (user, _) = require_session(&state, &headers).await?;
    require_member(&state, user.id, org_id, Role::Viewer).await?;

    let mut rows = state.db.audit_logs.find_by("org", &org_id.to_string()).await;
    rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    Ok(Json(rows))
}

/// GET /api/orgs/{org_id}/overview — the dashboard counts, grouped
/// server-side instead of in frontend data hooks.
pub async fn overview(
    State(state): State<Arc<AppState>>,
    Path(org_id): Path<Uuid>,
    headers: HeaderMap,
) -> Result<Json<OrgOverview>, AppError> {
    let (user, _) = require_session(&state, &headers).await?;
    require_member(&state, user.id, org_id, Role::Viewer).await?;

    let org_key = org_id.to_string();
    let instances = state.db.instances.find_by("org", &org_key).await;
    let agents = state.db.agents.find_by("org", &org_key).await;
    let sessions = state.db.agent_sessions.find_by("org", &org_key).await;
    let channels = state.db.channels.find_by("org", &org_key).await;
    let skills = state.db.skills.find_by("org", &org_key).await;

    let overview = OrgOverview {
        instance_total: instances.len(),
        instances_online: instances
            .iter()
            .filter(|i| i.status == InstanceStatus::Online)
            .count(),
        agent_total: agents.len(),
        agents_idle: agents.iter().filter(|a| a.status == AgentStatus::Idle).count(),
        agents_busy: agents.iter().filter(|a| a.status == AgentStatus::Busy).count(),
        agents_error: agents.iter().filter(|a| a.status == AgentStatus::Error).count(),
        session_total: sessions.len(),
        sessions_active: sessions
            .iter()
            .filter(|s| s.status == SessionStatus::Active)
            .count(),
        channels_connected: channels
            .iter()
            .filter(|c| c.status == ChannelStatus::Connected)
            .count(),
        skills_enabled: skills.iter().filter(|s| s.enabled).count(),
        blueprint_total: state.db.blueprints.find_by("org", &org_key).await.len(),
        swarm_total: state.db.swarms.find_by("org", &org_key).await.len(),
    };

    Ok(Json(overview))
}
