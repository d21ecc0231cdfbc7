// ============================
// clawcontrol-backend-lib/src/handlers/sessions.rs
// ============================
//! Agent chat sessions and their messages. These are the product-domain
//! sessions, not auth credentials.
use crate::error::AppError;
use crate::handlers::{require_member, require_session};
use crate::{audit, validation, AppState};
use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    Json,
};
use chrono::Utc;
use clawcontrol_common::api::{CreateSessionRequest, PostMessageRequest, UpdateSessionRequest};
use clawcontrol_common::{AgentSession, ChatMessage, Role, SessionStatus};
use std::sync::Arc;
use uuid::Uuid;

pub async fn list_sessions(
    State(state): State<Arc<AppState>>,
    Path(org_id): Path<Uuid>,
    headers: HeaderMap,
) -> Result<Json<Vec<AgentSession>>, AppError> {
    let (user, _) = require_session(&state, &headers).await?;
    require_member(&state, user.id, org_id, Role::Viewer).await?;

    let mut rows = state
        .db
        .agent_sessions
        .find_by("org", &org_id.to_string())
        .await;
    rows.sort_by(|a, b| b.started_at.cmp(&a.started_at));
    Ok(Json(rows))
}

pub async fn create_session(
    State(state): State<Arc<AppState>>,
    Path(org_id): Path<Uuid>,
    headers: HeaderMap,
    Json(req): Json<CreateSessionRequest>,
) -> Result<(StatusCode, Json<AgentSession>), AppError> {
    let (user, _) = require_session(&state, &headers).await?;
    require_member(&state, user.id, org_id, Role::Member).await?;
    validation::validate_label(&req.title)?;

    let agent = state
        .db
        .agents
        .get(req.agent_id)
        .await
        .ok_or_else(|| AppError::NotFound("agent".to_string()))?;
    if agent.org_id != org_id {
        return Err(AppError::InvalidInput(
            "agent belongs to another organization".to_string(),
        ));
    }

    let row = AgentSession {
        id: Uuid::new_v4(),
        org_id,
        agent_id: req.agent_id,
        title: req.title,
        status: SessionStatus::Active,
        started_at: Utc::now(),
        ended_at: None,
    };
    state.db.agent_sessions.insert(row.clone()).await?;
    audit::record(
        &state.db,
        org_id,
        user.id,
        "session.create",
        "session",
        Some(row.id),
    )
    .await?;

    Ok((StatusCode::CREATED, Json(row)))
}

pub async fn get_session(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
) -> Result<Json<AgentSession>, AppError> {
    let (user, _) = require_session(&state, &headers).await?;
    let row = state
        .db
        .agent_sessions
        .get(id)
        .await
        .ok_or_else(|| AppError::NotFound("session".to_string()))?;
    require_member(&state, user.id, row.org_id, Role::Viewer).await?;
    Ok(Json(row))
}

/// Moving a session out of `active` stamps `ended_at`.
pub async fn update_session(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
    Json(req): Json<UpdateSessionRequest>,
) -> Result<Json<AgentSession>, AppError> {
    let (user, _) = require_session(&state, &headers).await?;
    let row = state
        .db
        .agent_sessions
        .get(id)
        .await
        .ok_or_else(|| AppError::NotFound("session".to_string()))?;
    require_member(&state, user.id, row.org_id, Role::Member).await?;
    if let Some(title) = &req.title {
        validation::validate_label(title)?;
    }

    let updated = state
        .db
        .agent_sessions
        .update(id, |s| {
            if let Some(title) = req.title {
                s.title = title;
            }
            if let Some(status) = req.status {
                s.status = status;
                s.ended_at = match status {
                    SessionStatus::Active => None,
                    SessionStatus::Completed | SessionStatus::Failed => Some(Utc::now()),
                };
            }
        })
        .await?;
    audit::record(
        &state.db,
        row.org_id,
        user.id,
        "session.update",
        "session",
        Some(id),
    )
    .await?;

    Ok(Json(updated))
}

/// Deleting a session takes its messages with it.
pub async fn delete_session(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
) -> Result<StatusCode, AppError> {
    let (user, _) = require_session(&state, &headers).await?;
    let row = state
        .db
        .agent_sessions
        .get(id)
        .await
        .ok_or_else(|| AppError::NotFound("session".to_string()))?;
    require_member(&state, user.id, row.org_id, Role::Member).await?;

    state.db.messages.remove_where(|m| m.session_id == id).await?;
    state.db.agent_sessions.remove(id).await?;
    audit::record(
        &state.db,
        row.org_id,
        user.id,
        "session.delete",
        "session",
        Some(id),
    )
    .await?;

    Ok(StatusCode::NO_CONTENT)
}

// ---- messages ----

pub async fn list_messages(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<Uuid>,
    headers: HeaderMap,
) -> Result<Json<Vec<ChatMessage>>, AppError> {
    let (user, _) = require_session(&state, &headers).await?;
    let session = state
        .db
        .agent_sessions
        .get(session_id)
        .await
        .ok_or_else(|| AppError::NotFound("session".to_string()))?;
    require_member(&state, user.id, session.org_id, Role::Viewer).await?;

    let mut rows = state
        .db
        .messages
        .find_by("session", &session_id.to_string())
        .await;
    rows.sort_by_key(|m| m.created_at);
    Ok(Json(rows))
}

pub async fn post_message(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<Uuid>,
    headers: HeaderMap,
    Json(req): Json<PostMessageRequest>,
) -> Result<(StatusCode, Json<ChatMessage>), AppError> {
    let (user, _) = require_session(&state, &headers).await?;
    let session = state
        .db
        .agent_sessions
        .get(session_id)
        .await
        .ok_or_else(|| AppError::NotFound("session".to_string()))?;
    require_member(&state, user.id, session.org_id, Role::Member).await?;
    validation::validate_content(&req.content)?;

    if session.status != SessionStatus::Active {
        return Err(AppError::Conflict("session is not active".to_string()));
    }

    let row = ChatMessage {
        id: Uuid::new_v4(),
        org_id: session.org_id,
        session_id,
        sender: req.sender,
        content: req.content,
        created_at: Utc::now(),
    };
    state.db.messages.insert(row.clone()).await?;
    audit::record(
        &state.db,
        session.org_id,
        user.id,
        "message.create",
        "message",
        Some(row.id),
    )
    .await?;

    Ok((StatusCode::CREATED, Json(row)))
}
