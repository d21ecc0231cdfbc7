// ================
// common/src/entities.rs
// ================
//! Records stored in the `ClawControl` document store. One struct per
//! table; ids are v4 UUIDs and timestamps are UTC.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Membership role within an organization, ordered weakest to strongest.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Viewer,
    Member,
    Admin,
    Owner,
}

/// A registered dashboard user.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct User {
    pub id: Uuid,
    /// Stored trimmed and lowercased; unique across the table.
    pub email: String,
    pub name: String,
    /// scrypt PHC string, never the plaintext.
    pub password_hash: String,
    /// The org shown on login. Set to the personal org at registration.
    pub default_org_id: Uuid,
    pub created_at: DateTime<Utc>,
}

/// A bearer-token credential row. Recovery credentials live in the same
/// table, distinguished by a token prefix and a much shorter expiry.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct UserSession {
    pub id: Uuid,
    pub user_id: Uuid,
    /// Opaque bearer token; unique across the table.
    pub token: String,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

/// Tenant boundary owning instances, agents, and related resources.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Organization {
    pub id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

/// Links a user to an organization with a role.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct OrgMember {
    pub id: Uuid,
    pub org_id: Uuid,
    pub user_id: Uuid,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

/// Health of a tracked gateway instance.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum InstanceStatus {
    Provisioning,
    Online,
    Degraded,
    Offline,
}

/// A deployed `OpenClaw` gateway/runtime tracked by the dashboard.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Instance {
    pub id: Uuid,
    pub org_id: Uuid,
    pub name: String,
    pub gateway_url: String,
    pub version: String,
    pub status: InstanceStatus,
    pub last_seen_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AgentStatus {
    Idle,
    Busy,
    Error,
    Offline,
}

/// An agent running on an instance.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Agent {
    pub id: Uuid,
    pub org_id: Uuid,
    pub instance_id: Uuid,
    pub name: String,
    pub model: String,
    pub status: AgentStatus,
    pub blueprint_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    Active,
    Completed,
    Failed,
}

/// An agent chat session (the product-domain entity, unrelated to the
/// auth [`UserSession`]).
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct AgentSession {
    pub id: Uuid,
    pub org_id: Uuid,
    pub agent_id: Uuid,
    pub title: String,
    pub status: SessionStatus,
    pub started_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Agent,
    System,
}

/// One message inside an agent chat session.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ChatMessage {
    pub id: Uuid,
    pub org_id: Uuid,
    pub session_id: Uuid,
    pub sender: Sender,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

/// A capability that can be attached to agents.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Skill {
    pub id: Uuid,
    pub org_id: Uuid,
    pub name: String,
    pub description: String,
    pub version: String,
    pub enabled: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ChannelKind {
    Whatsapp,
    Telegram,
    Discord,
    Slack,
    Web,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ChannelStatus {
    Pending,
    Connected,
    Disconnected,
}

/// A messaging channel an org has wired to its fleet.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Channel {
    pub id: Uuid,
    pub org_id: Uuid,
    pub name: String,
    pub kind: ChannelKind,
    pub status: ChannelStatus,
    pub created_at: DateTime<Utc>,
}

/// A reusable agent template: prompt plus model choice.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Blueprint {
    pub id: Uuid,
    pub org_id: Uuid,
    pub name: String,
    pub description: String,
    pub system_prompt: String,
    pub model: String,
    pub created_at: DateTime<Utc>,
}

/// A named group of agents operated together.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Swarm {
    pub id: Uuid,
    pub org_id: Uuid,
    pub name: String,
    pub description: String,
    pub agent_ids: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
}

/// One audit trail row, appended on every successful mutation.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct AuditLog {
    pub id: Uuid,
    pub org_id: Uuid,
    pub actor_id: Uuid,
    /// Verb, e.g. "instance.create".
    pub action: String,
    /// Entity kind the action touched, e.g. "instance".
    pub entity: String,
    pub entity_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}
