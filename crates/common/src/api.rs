// ================
// common/src/api.rs
// ================
//! Request and response bodies of the HTTP API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entities::{
    AgentStatus, ChannelKind, ChannelStatus, InstanceStatus, Role, Sender, SessionStatus,
};

// ---- auth ----

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct RegisterRequest {
    pub email: String,
    pub name: String,
    pub password: String,
}

/// Returned from a successful registration.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct RegisterResponse {
    pub token: String,
    pub user_id: Uuid,
    pub org_id: Uuid,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct LoginResponse {
    pub token: String,
    pub user_id: Uuid,
}

/// One org the user belongs to, with their role in it.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct OrgSummary {
    pub id: Uuid,
    pub name: String,
    pub role: Role,
}

/// The resolved profile returned by `me`.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct UserProfile {
    pub user_id: Uuid,
    pub email: String,
    pub name: String,
    /// The stored default org, not a positional guess.
    pub current_org_id: Uuid,
    pub orgs: Vec<OrgSummary>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct UpdateUserRequest {
    pub name: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct RecoveryRequest {
    pub email: String,
}

/// Always `success: true`; the token is present only when the email is
/// registered, and returning it here at all is a development shortcut.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct RecoveryResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recovery_token: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ResetPasswordRequest {
    pub recovery_token: String,
    pub new_password: String,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ResetPasswordResponse {
    pub token: String,
}

// ---- members ----

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct AddMemberRequest {
    /// Email of an already-registered user.
    pub email: String,
    pub role: Role,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct UpdateMemberRequest {
    pub role: Role,
}

/// Membership joined with the user it belongs to, for member lists.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct MemberView {
    pub id: Uuid,
    pub user_id: Uuid,
    pub email: String,
    pub name: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

// ---- fleet ----

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct CreateInstanceRequest {
    pub name: String,
    pub gateway_url: String,
    pub version: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct UpdateInstanceRequest {
    pub name: Option<String>,
    pub gateway_url: Option<String>,
    pub version: Option<String>,
    pub status: Option<InstanceStatus>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct CreateAgentRequest {
    pub instance_id: Uuid,
    pub name: String,
    pub model: String,
    pub blueprint_id: Option<Uuid>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct UpdateAgentRequest {
    pub name: Option<String>,
    pub model: Option<String>,
    pub status: Option<AgentStatus>,
    pub blueprint_id: Option<Uuid>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct CreateSessionRequest {
    pub agent_id: Uuid,
    pub title: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct UpdateSessionRequest {
    pub title: Option<String>,
    pub status: Option<SessionStatus>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct PostMessageRequest {
    pub sender: Sender,
    pub content: String,
}

// ---- library ----

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct CreateSkillRequest {
    pub name: String,
    pub description: String,
    pub version: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct UpdateSkillRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub version: Option<String>,
    pub enabled: Option<bool>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct CreateChannelRequest {
    pub name: String,
    pub kind: ChannelKind,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct UpdateChannelRequest {
    pub name: Option<String>,
    pub status: Option<ChannelStatus>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct CreateBlueprintRequest {
    pub name: String,
    pub description: String,
    pub system_prompt: String,
    pub model: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct UpdateBlueprintRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub system_prompt: Option<String>,
    pub model: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct CreateSwarmRequest {
    pub name: String,
    pub description: String,
    pub agent_ids: Vec<Uuid>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct UpdateSwarmRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub agent_ids: Option<Vec<Uuid>>,
}

// ---- dashboard ----

/// Counts backing the org dashboard; the server-side version of what the
/// frontend data hooks used to group in memory.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct OrgOverview {
    pub instance_total: usize,
    pub instances_online: usize,
    pub agent_total: usize,
    pub agents_idle: usize,
    pub agents_busy: usize,
    pub agents_error: usize,
    pub session_total: usize,
    pub sessions_active: usize,
    pub channels_connected: usize,
    pub skills_enabled: usize,
    pub blueprint_total: usize,
    pub swarm_total: usize,
}
