// ============================
// clawcontrol-backend-lib/src/handlers/fleet.rs
// ============================
//! Instances and agents.
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
    CreateAgentRequest, CreateInstanceRequest, UpdateAgentRequest, UpdateInstanceRequest,
};
use clawcontrol_common::{Agent, AgentStatus, Instance, InstanceStatus, Role};
use std::sync::Arc;
use uuid::Uuid;

// ---- instances ----

pub async fn list_instances(
    State(state): State<Arc<AppState>>,
    Path(org_id): Path<Uuid>,
    headers: HeaderMap,
) -> Result<Json<Vec<Instance>>, AppError> {
    let (user, _) = require_session(&state, &headers).await?;
    require_member(&state, user.id, org_id, Role::Viewer).await?;

    let mut rows = state.db.instances.find_by("org", &org_id.to_string()).await;
    rows.sort_by_key(|i| i.created_at);
    Ok(Json(rows))
}

pub async fn create_instance(
    State(state): State<Arc<AppState>>,
    Path(org_id): Path<Uuid>,
    headers: HeaderMap,
    Json(req): Json<CreateInstanceRequest>,
) -> Result<(StatusCode, Json<Instance>), AppError> {
    let (user, _) = require_session(&state, &headers).await?;
    require_member(&state, user.id, org_id, Role::Member).await?;
    validation::validate_label(&req.name)?;

    let row = Instance {
        id: Uuid::new_v4(),
        org_id,
        name: req.name,
        gateway_url: req.gateway_url,
        version: req.version,
        status: InstanceStatus::Provisioning,
        last_seen_at: None,
        created_at: Utc::now(),
    };
    state.db.instances.insert(row.clone()).await?;
    audit::record(
        &state.db,
        org_id,
        user.id,
        "instance.create",
        "instance",
        Some(row.id),
    )
    .await?;

    Ok((StatusCode::CREATED, Json(row)))
}

pub async fn get_instance(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
) -> Result<Json<Instance>, AppError> {
    let (user, _) = require_session(&state, &headers).await?;
    let row = state
        .db
        .instances
        .get(id)
        .await
        .ok_or_else(|| AppError::NotFound("instance".to_string()))?;
    require_member(&state, user.id, row.org_id, Role::Viewer).await?;
    Ok(Json(row))
}

pub async fn update_instance(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
    Json(req): Json<UpdateInstanceRequest>,
) -> Result<Json<Instance>, AppError> {
    let (user, _) = require_session(&state, &headers).await?;
    let row = state
        .db
        .instances
        .get(id)
        .await
        .ok_or_else(|| AppError::NotFound("instance".to_string()))?;
    require_member(&state, user.id, row.org_id, Role::Member).await?;
    if let Some(name) = &req.name {
        validation::validate_label(name)?;
    }

    let updated = state
        .db
        .instances
        .update(id, |i| {
            if let Some(name) = req.name {
                i.name = name;
            }
            if let Some(url) = req.gateway_url {
                i.gateway_url = url;
            }
            if let Some(version) = req.version {
                i.version = version;
            }
            if let Some(status) = req.status {
                i.status = status;
                if status == InstanceStatus::Online {
                    i.last_seen_at = Some(Utc::now());
                }
            }
        })
        .await?;
    audit::record(
        &state.db,
        row.org_id,
        user.id,
        "instance.update",
        "instance",
        Some(id),
    )
    .await?;

    Ok(Json(updated))
}

/// An instance with agents still on it cannot be deleted.
pub async fn delete_instance(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
) -> Result<StatusCode, AppError> {
    let (user, _) = require_session(&state, &headers).await?;
    let row = state
        .db
        .instances
        .get(id)
        .await
        .ok_or_else(|| AppError::NotFound("instance".to_string()))?;
    require_member(&state, user.id, row.org_id, Role::Member).await?;

    if !state.db.agents.find_by("instance", &id.to_string()).await.is_empty() {
        return Err(AppError::Conflict(
            "instance still has agents".to_string(),
        ));
    }

    state.db.instances.remove(id).await?;
    audit::record(
        &state.db,
        row.org_id,
        user.id,
        "instance.delete",
        "instance",
        Some(id),
    )
    .await?;

    Ok(StatusCode::NO_CONTENT)
}

// ---- agents ----

pub async fn list_agents(
    State(state): State<Arc<AppState>>,
    Path(org_id): Path<Uuid>,
    headers: HeaderMap,
) -> Result<Json<Vec<Agent>>, AppError> {
    let (user, _) = require_session(&state, &headers).await?;
    require_member(&state, user.id, org_id, Role::Viewer).await?;

    let mut rows = state.db.agents.find_by("org", &org_id.to_string()).await;
    rows.sort_by_key(|a| a.created_at);
    Ok(Json(rows))
}

pub async fn create_agent(
    State(state): State<Arc<AppState>>,
    Path(org_id): Path<Uuid>,
    headers: HeaderMap,
    Json(req): Json<CreateAgentRequest>,
) -> Result<(StatusCode, Json<Agent>), AppError> {
    let (user, _) = require_session(&state, &headers).await?;
    require_member(&state, user.id, org_id, Role::Member).await?;
    validation::validate_label(&req.name)?;

    // Both foreign keys must land inside the same org.
    let instance = state
        .db
        .instances
        .get(req.instance_id)
        .await
        .ok_or_else(|| AppError::NotFound("instance".to_string()))?;
    if instance.org_id != org_id {
        return Err(AppError::InvalidInput(
            "instance belongs to another organization".to_string(),
        ));
    }
    if let Some(blueprint_id) = req.blueprint_id {
        let blueprint = state
            .db
            .blueprints
            .get(blueprint_id)
            .await
            .ok_or_else(|| AppError::NotFound("blueprint".to_string()))?;
        if blueprint.org_id != org_id {
            return Err(AppError::InvalidInput(
                "blueprint belongs to another organization".to_string(),
            ));
        }
    }

    let row = Agent {
        id: Uuid::new_v4(),
        org_id,
        instance_id: req.instance_id,
        name: req.name,
        model: req.model,
        status: AgentStatus::Idle,
        blueprint_id: req.blueprint_id,
        created_at: Utc::now(),
    };
    state.db.agents.insert(row.clone()).await?;
    audit::record(&state.db, org_id, user.id, "agent.create", "agent", Some(row.id)).await?;

    Ok((StatusCode::CREATED, Json(row)))
}

pub async fn get_agent(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
) -> Result<Json<Agent>, AppError> {
    let (user, _) = require_session(&state, &headers).await?;
    let row = state
        .db
        .agents
        .get(id)
        .await
        .ok_or_else(|| AppError::NotFound("agent".to_string()))?;
    require_member(&state, user.id, row.org_id, Role::Viewer).await?;
    Ok(Json(row))
}

pub async fn update_agent(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
    Json(req): Json<UpdateAgentRequest>,
) -> Result<Json<Agent>, AppError> {
    let (user, _) = require_session(&state, &headers).await?;
    let row = state
        .db
        .agents
        .get(id)
        .await
        .ok_or_else(|| AppError::NotFound("agent".to_string()))?;
    require_member(&state, user.id, row.org_id, Role::Member).await?;
    if let Some(name) = &req.name {
        validation::validate_label(name)?;
    }
    if let Some(blueprint_id) = req.blueprint_id {
        let blueprint = state
            .db
            .blueprints
            .get(blueprint_id)
            .await
            .ok_or_else(|| AppError::NotFound("blueprint".to_string()))?;
        if blueprint.org_id != row.org_id {
            return Err(AppError::InvalidInput(
                "blueprint belongs to another organization".to_string(),
            ));
        }
    }

    let updated = state
        .db
        .agents
        .update(id, |a| {
            if let Some(name) = req.name {
                a.name = name;
            }
            if let Some(model) = req.model {
                a.model = model;
            }
            if let Some(status) = req.status {
                a.status = status;
            }
            if req.blueprint_id.is_some() {
                a.blueprint_id = req.blueprint_id;
            }
        })
        .await?;
    audit::record(&state.db, row.org_id, user.id, "agent.update", "agent", Some(id)).await?;

    Ok(Json(updated))
}

pub async fn delete_agent(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
) -> Result<StatusCode, AppError> {
    let (user, _) = require_session(&state, &headers).await?;
    let row = state
        .db
        .agents
        .get(id)
        .await
        .ok_or_else(|| AppError::NotFound("agent".to_string()))?;
    require_member(&state, user.id, row.org_id, Role::Member).await?;

    state.db.agents.remove(id).await?;
    audit::record(&state.db, row.org_id, user.id, "agent.delete", "agent", Some(id)).await?;

    Ok(StatusCode::NO_CONTENT)
}
