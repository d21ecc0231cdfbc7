// ============================
// clawcontrol-backend-lib/src/handlers/library.rs
// ============================
//! Skills, channels, blueprints, and swarms.
use crate::error::AppError;
use crate::handlers::{require_member, require_session};
use crate::{audit, validation, AppState};
use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    Json,
};
use chrono::Utc;
use clawcontrol_common::api::{
    CreateBlueprintRequest, CreateChannelRequest, CreateSkillRequest, CreateSwarmRequest,
    UpdateBlueprintRequest, UpdateChannelRequest, UpdateSkillRequest, UpdateSwarmRequest,
};
use clawcontrol_common::{Blueprint, Channel, ChannelStatus, Role, Skill, Swarm};
use std::sync::Arc;
use uuid::Uuid;

// ---- skills ----

pub async fn list_skills(
    State(state): State<Arc<AppState>>,
    Path(org_id): Path<Uuid>,
    headers: HeaderMap,
) -> Result<Json<Vec<Skill>>, AppError> {
    let (user, _) = require_session(&state, &headers).await?;
    require_member(&state, user.id, org_id, Role::Viewer).await?;

    let mut rows = state.db.skills.find_by("org", &org_id.to_string()).await;
    rows.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(Json(rows))
}

pub async fn create_skill(
    State(state): State<Arc<AppState>>,
    Path(org_id): Path<Uuid>,
    headers: HeaderMap,
    Json(req): Json<CreateSkillRequest>,
) -> Result<(StatusCode, Json<Skill>), AppError> {
    let (user, _) = require_session(&state, &headers).await?;
    require_member(&state, user.id, org_id, Role::Member).await?;
    validation::validate_label(&req.name)?;

    let row = Skill {
        id: Uuid::new_v4(),
        org_id,
        name: req.name,
        description: req.description,
        version: req.version,
        enabled: true,
        created_at: Utc::now(),
    };
    state.db.skills.insert(row.clone()).await?;
    audit::record(&state.db, org_id, user.id, "skill.create", "skill", Some(row.id)).await?;

    Ok((StatusCode::CREATED, Json(row)))
}

pub async fn update_skill(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
    Json(req): Json<UpdateSkillRequest>,
) -> Result<Json<Skill>, AppError> {
    let (user, _) = require_session(&state, &headers).await?;
    let row = state
        .db
        .skills
        .get(id)
        .await
        .ok_or_else(|| AppError::NotFound("skill".to_string()))?;
    require_member(&state, user.id, row.org_id, Role::Member).await?;
    if let Some(name) = &req.name {
        validation::validate_label(name)?;
    }

    let updated = state
        .db
        .skills
        .update(id, |s| {
            if let Some(name) = req.name {
                s.name = name;
            }
            if let Some(description) = req.description {
                s.description = description;
            }
            if let Some(version) = req.version {
                s.version = version;
            }
            if let Some(enabled) = req.enabled {
                s.enabled = enabled;
            }
        })
        .await?;
    audit::record(&state.db, row.org_id, user.id, "skill.update", "skill", Some(id)).await?;

    Ok(Json(updated))
}

pub async fn delete_skill(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
) -> Result<StatusCode, AppError> {
    let (user, _) = require_session(&state, &headers).await?;
    let row = state
        .db
        .skills
        .get(id)
        .await
        .ok_or_else(|| AppError::NotFound("skill".to_string()))?;
    require_member(&state, user.id, row.org_id, Role::Member).await?;

    state.db.skills.remove(id).await?;
    audit::record(&state.db, row.org_id, user.id, "skill.delete", "skill", Some(id)).await?;

    Ok(StatusCode::NO_CONTENT)
}

// ---- channels ----

pub async fn list_channels(
    State(state): State<Arc<AppState>>,
    Path(org_id): Path<Uuid>,
    headers: HeaderMap,
) -> Result<Json<Vec<Channel>>, AppError> {
    let (user, _) = require_session(&state, &headers).await?;
    require_member(&state, user.id, org_id, Role::Viewer).await?;

    let mut rows = state.db.channels.find_by("org", &org_id.to_string()).await;
    rows.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(Json(rows))
}

pub async fn create_channel(
    State(state): State<Arc<AppState>>,
    Path(org_id): Path<Uuid>,
    headers: HeaderMap,
    Json(req): Json<CreateChannelRequest>,
) -> Result<(StatusCode, Json<Channel>), AppError> {
    let (user, _) = require_session(&state, &headers).await?;
    require_member(&state, user.id, org_id, Role::Member).await?;
    validation::validate_label(&req.name)?;

    let row = Channel {
        id: Uuid::new_v4(),
        org_id,
        name: req.name,
        kind: req.kind,
        status: ChannelStatus::Pending,
        created_at: Utc::now(),
    };
    state.db.channels.insert(row.clone()).await?;
    audit::record(
        &state.db,
        org_id,
        user.id,
        "channel.create",
        "channel",
        Some(row.id),
    )
    .await?;

    Ok((StatusCode::CREATED, Json(row)))
}

pub async fn update_channel(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
    Json(req): Json<UpdateChannelRequest>,
) -> Result<Json<Channel>, AppError> {
    let (user, _) = require_session(&state, &headers).await?;
    let row = state
        .db
        .channels
        .get(id)
        .await
        .ok_or_else(|| AppError::NotFound("channel".to_string()))?;
    require_member(&state, user.id, row.org_id, Role::Member).await?;
    if let Some(name) = &req.name {
        validation::validate_label(name)?;
    }

    let updated = state
        .db
        .channels
        .update(id, |c| {
            if let Some(name) = req.name {
                c.name = name;
            }
            if let Some(status) = req.status {
                c.status = status;
            }
        })
        .await?;
    audit::record(
        &state.db,
        row.org_id,
        user.id,
        "channel.update",
        "channel",
        Some(id),
    )
    .await?;

    Ok(Json(updated))
}

pub async fn delete_channel(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
) -> Result<StatusCode, AppError> {
    let (user, _) = require_session(&state, &headers).await?;
    let row = state
        .db
        .channels
        .get(id)
        .await
        .ok_or_else(|| AppError::NotFound("channel".to_string()))?;
    require_member(&state, user.id, row.org_id, Role::Member).await?;

    state.db.channels.remove(id).await?;
    audit::record(
        &state.db,
        row.org_id,
        user.id,
        "channel.delete",
        "channel",
        Some(id),
    )
    .await?;

    Ok(StatusCode::NO_CONTENT)
}

// ---- blueprints ----

pub async fn list_blueprints(
    State(state): State<Arc<AppState>>,
    Path(org_id): Path<Uuid>,
    headers: HeaderMap,
) -> Result<Json<Vec<Blueprint>>, AppError> {
    let (user, _) = require_session(&state, &headers).await?;
    require_member(&state, user.id, org_id, Role::Viewer).await?;

    let mut rows = state.db.blueprints.find_by("org", &org_id.to_string()).await;
    rows.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(Json(rows))
}

pub async fn create_blueprint(
    State(state): State<Arc<AppState>>,
    Path(org_id): Path<Uuid>,
    headers: HeaderMap,
    Json(req): Json<CreateBlueprintRequest>,
) -> Result<(StatusCode, Json<Blueprint>), AppError> {
    let (user, _) = require_session(&state, &headers).await?;
    require_member(&state, user.id, org_id, Role::Member).await?;
    validation::validate_label(&req.name)?;
    validation::validate_content(&req.system_prompt)?;

    let row = Blueprint {
        id: Uuid::new_v4(),
        org_id,
        name: req.name,
        description: req.description,
        system_prompt: req.system_prompt,
        model: req.model,
        created_at: Utc::now(),
    };
    state.db.blueprints.insert(row.clone()).await?;
    audit::record(
        &state.db,
        org_id,
        user.id,
        "blueprint.create",
        "blueprint",
        Some(row.id),
    )
    .await?;

    Ok((StatusCode::CREATED, Json(row)))
}

pub async fn update_blueprint(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
    Json(req): Json<UpdateBlueprintRequest>,
) -> Result<Json<Blueprint>, AppError> {
    let (user, _) = require_session(&state, &headers).await?;
    let row = state
        .db
        .blueprints
        .get(id)
        .await
        .ok_or_else(|| AppError::NotFound("blueprint".to_string()))?;
    require_member(&state, user.id, row.org_id, Role::Member).await?;
    if let Some(name) = &req.name {
        validation::validate_label(name)?;
    }
    if let Some(prompt) = &req.system_prompt {
        validation::validate_content(prompt)?;
    }

    let updated = state
        .db
        .blueprints
        .update(id, |b| {
            if let Some(name) = req.name {
                b.name = name;
            }
            if let Some(description) = req.description {
                b.description = description;
            }
            if let Some(prompt) = req.system_prompt {
                b.system_prompt = prompt;
            }
            if let Some(model) = req.model {
                b.model = model;
            }
        })
        .await?;
    audit::record(
        &state.db,
        row.org_id,
        user.id,
        "blueprint.update",
        "blueprint",
        Some(id),
    )
    .await?;

    Ok(Json(updated))
}

/// A blueprint still referenced by agents cannot be deleted.
pub async fn delete_blueprint(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
) -> Result<StatusCode, AppError> {
    let (user, _) = require_session(&state, &headers).await?;
    let row = state
        .db
        .blueprints
        .get(id)
        .await
        .ok_or_else(|| AppError::NotFound("blueprint".to_string()))?;
    require_member(&state, user.id, row.org_id, Role::Member).await?;

    let referenced = state
        .db
        .agents
        .find_by("org", &row.org_id.to_string())
        .await
        .into_iter()
        .any(|a| a.blueprint_id == Some(id));
    if referenced {
        return Err(AppError::Conflict(
            "blueprint is still used by agents".to_string(),
        ));
    }

    state.db.blueprints.remove(id).await?;
    audit::record(
        &state.db,
        row.org_id,
        user.id,
        "blueprint.delete",
        "blueprint",
        Some(id),
    )
    .await?;

    Ok(StatusCode::NO_CONTENT)
}

// ---- swarms ----

pub async fn list_swarms(
    State(state): State<Arc<AppState>>,
    Path(org_id): Path<Uuid>,
    headers: HeaderMap,
) -> Result<Json<Vec<Swarm>>, AppError> {
    let (user, _) = require_session(&state, &headers).await?;
    require_member(&state, user.id, org_id, Role::Viewer).await?;

    let mut rows = state.db.swarms.find_by("org", &org_id.to_string()).await;
    rows.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(Json(rows))
}

pub async fn create_swarm(
    State(state): State<Arc<AppState>>,
    Path(org_id): Path<Uuid>,
    headers: HeaderMap,
    Json(req): Json<CreateSwarmRequest>,
) -> Result<(StatusCode, Json<Swarm>), AppError> {
    let (user, _) = require_session(&state, &headers).await?;
    require_member(&state, user.id, org_id, Role::Member).await?;
    validation::validate_label(&req.name)?;
    check_agents_in_org(&state, org_id, &req.agent_ids).await?;

    let row = Swarm {
        id: Uuid::new_v4(),
        org_id,
        name: req.name,
        description: req.description,
        agent_ids: req.agent_ids,
        created_at: Utc::now(),
    };
    state.db.swarms.insert(row.clone()).await?;
    audit::record(&state.db, org_id, user.id, "swarm.create", "swarm", Some(row.id)).await?;

    Ok((StatusCode::CREATED, Json(row)))
}

pub async fn update_swarm(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
    Json(req): Json<UpdateSwarmRequest>,
) -> Result<Json<Swarm>, AppError> {
    let (user, _) = require_session(&state, &headers).await?;
    let row = state
        .db
        .swarms
        .get(id)
        .await
        .ok_or_else(|| AppError::NotFound("swarm".to_string()))?;
    require_member(&state, user.id, row.org_id, Role::Member).await?;
    if let Some(name) = &req.name {
        validation::validate_label(name)?;
    }
    if let Some(agent_ids) = &req.agent_ids {
        check_agents_in_org(&state, row.org_id, agent_ids).await?;
    }

    let updated = state
        .db
        .swarms
        .update(id, |s| {
            if let Some(name) = req.name {
                s.name = name;
            }
            if let Some(description) = req.description {
                s.description = description;
            }
            if let Some(agent_ids) = req.agent_ids {
                s.agent_ids = agent_ids;
            }
        })
        .await?;
    audit::record(&state.db, row.org_id, user.id, "swarm.update", "swarm", Some(id)).await?;

    Ok(Json(updated))
}

pub async fn delete_swarm(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
) -> Result<StatusCode, AppError> {
    let (user, _) = require_session(&state, &headers).await?;
    let row = state
        .db
        .swarms
        .get(id)
        .await
        .ok_or_else(|| AppError::NotFound("swarm".to_string()))?;
    require_member(&state, user.id, row.org_id, Role::Member).await?;

    state.db.swarms.remove(id).await?;
    audit::record(&state.db, row.org_id, user.id, "swarm.delete", "swarm", Some(id)).await?;

    Ok(StatusCode::NO_CONTENT)
}

async fn check_agents_in_org(
    state: &AppState,
    org_id: Uuid,
    agent_ids: &[Uuid],
) -> Result<(), AppError> {
    for agent_id in agent_ids {
        let agent = state
            .db
            .agents
            .get(*agent_id)
            .await
            .ok_or_else(|| AppError::NotFound("agent".to_string()))?;
        if agent.org_id != org_id {
            return Err(AppError::InvalidInput(
                "agent belongs to another organization".to_string(),
            ));
        }
    }
    Ok(())
}
