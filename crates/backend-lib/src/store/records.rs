// ============================
// clawcontrol-backend-lib/src/store/records.rs
// ============================
//! Table and index declarations for every stored record type.
use super::{IndexDef, Record};
use clawcontrol_common::{
    Agent, AgentSession, AuditLog, Blueprint, Channel, ChatMessage, Instance, OrgMember,
    Organization, Skill, Swarm, User, UserSession,
};
use uuid::Uuid;

impl Record for User {
    const TABLE: &'static str = "users";
    const INDEXES: &'static [IndexDef] = &[IndexDef {
        name: "email",
        unique: true,
    }];

    fn id(&self) -> Uuid {
        self.id
    }

    fn index_keys(&self) -> Vec<(&'static str, String)> {
        vec![("email", self.email.clone())]
    }
}

impl Record for UserSession {
    const TABLE: &'static str = "user_sessions";
    const INDEXES: &'static [IndexDef] = &[
        IndexDef {
            name: "token",
            unique: true,
        },
        IndexDef {
            name: "user",
            unique: false,
        },
    ];

    fn id(&self) -> Uuid {
        self.id
    }

    fn index_keys(&self) -> Vec<(&'static str, String)> {
        vec![
            ("token", self.token.clone()),
            ("user", self.user_id.to_string()),
        ]
    }
}

impl Record for Organization {
    const TABLE: &'static str = "organizations";
    const INDEXES: &'static [IndexDef] = &[];

    fn id(&self) -> Uuid {
        self.id
    }

    fn index_keys(&self) -> Vec<(&'static str, String)> {
        Vec::new()
    }
}

impl Record for OrgMember {
    const TABLE: &'static str = "org_members";
    const INDEXES: &'static [IndexDef] = &[
        IndexDef {
            name: "org",
            unique: false,
        },
        IndexDef {
            name: "user",
            unique: false,
        },
    ];

    fn id(&self) -> Uuid {
        self.id
    }

    fn index_keys(&self) -> Vec<(&'static str, String)> {
        vec![
            ("org", self.org_id.to_string()),
            ("user", self.user_id.to_string()),
        ]
    }
}

impl Record for Instance {
    const TABLE: &'static str = "instances";
    const INDEXES: &'static [IndexDef] = &[IndexDef {
        name: "org",
        unique: false,
    }];

    fn id(&self) -> Uuid {
        self.id
    }

    fn index_keys(&self) -> Vec<(&'static str, String)> {
        vec![("org", self.org_id.to_string())]
    }
}

impl Record for Agent {
    const TABLE: &'static str = "agents";
    const INDEXES: &'static [IndexDef] = &[
        IndexDef {
            name: "org",
            unique: false,
        },
        IndexDef {
            name: "instance",
            unique: false,
        },
    ];

    fn id(&self) -> Uuid {
        self.id
    }

    fn index_keys(&self) -> Vec<(&'static str, String)> {
        vec![
            ("org", self.org_id.to_string()),
            ("instance", self.instance_id.to_string()),
        ]
    }
}

impl Record for AgentSession {
    const TABLE: &'static str = "agent_sessions";
    const INDEXES: &'static [IndexDef] = &[
        IndexDef {
            name: "org",
            unique: false,
        },
        IndexDef {
            name: "agent",
            unique: false,
        },
    ];

    fn id(&self) -> Uuid {
        self.id
    }

    fn index_keys(&self) -> Vec<(&'static str, String)> {
        vec![
            ("org", self.org_id.to_string()),
            ("agent", self.agent_id.to_string()),
        ]
    }
}

impl Record for ChatMessage {
    const TABLE: &'static str = "messages";
    const INDEXES: &'static [IndexDef] = &[IndexDef {
        name: "session",
        unique: false,
    }];

    fn id(&self) -> Uuid {
        self.id
    }

    fn index_keys(&self) -> Vec<(&'static str, String)> {
        vec![("session", self.session_id.to_string())]
    }
}

impl Record for Skill {
    const TABLE: &'static str = "skills";
    const INDEXES: &'static [IndexDef] = &[IndexDef {
        name: "org",
        unique: false,
    }];

    fn id(&self) -> Uuid {
        self.id
    }

    fn index_keys(&self) -> Vec<(&'static str, String)> {
        vec![("org", self.org_id.to_string())]
    }
}

impl Record for Channel {
    const TABLE: &'static str = "channels";
    const INDEXES: &'static [IndexDef] = &[IndexDef {
        name: "org",
        unique: false,
    }];

    fn id(&self) -> Uuid {
        self.id
    }

    fn index_keys(&self) -> Vec<(&'static str, String)> {
        vec![("org", self.org_id.to_string())]
    }
}

impl Record for Blueprint {
    const TABLE: &'static str = "blueprints";
    const INDEXES: &'static [IndexDef] = &[IndexDef {
        name: "org",
        unique: false,
    }];

    fn id(&self) -> Uuid {
        self.id
    }

    fn index_keys(&self) -> Vec<(&'static str, String)> {
        vec![("org", self.org_id.to_string())]
    }
}

impl Record for Swarm {
    const TABLE: &'static str = "swarms";
    const INDEXES: &'static [IndexDef] = &[IndexDef {
        name: "org",
        unique: false,
    }];

    fn id(&self) -> Uuid {
        self.id
    }

    fn index_keys(&self) -> Vec<(&'static str, String)> {
        vec![("org", self.org_id.to_string())]
    }
}

impl Record for AuditLog {
    const TABLE: &'static str = "audit_logs";
    const INDEXES: &'static [IndexDef] = &[IndexDef {
        name: "org",
        unique: false,
    }];

    fn id(&self) -> Uuid {
        self.id
    }

    fn index_keys(&self) -> Vec<(&'static str, String)> {
        vec![("org", self.org_id.to_string())]
    }
}
