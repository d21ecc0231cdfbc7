// ============================
// clawcontrol-backend-lib/src/store/mod.rs
// ============================
//! The document store: named tables with secondary indexes.
//!
//! Each [`Table`] keeps its rows in memory behind an async lock and
//! maintains the indexes its record type declares. With a
//! [`FlatFileStore`] attached, every mutation rewrites the table's JSON
//! snapshot; without one the table is purely in-memory (tests).
use crate::error::AppError;
use serde::{de::DeserializeOwned, Serialize};
use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

pub mod persist;
mod records;

pub use persist::FlatFileStore;

use clawcontrol_common::{
    Agent, AgentSession, AuditLog, Blueprint, Channel, ChatMessage, Instance, OrgMember,
    Organization, Skill, Swarm, User, UserSession,
};

/// A secondary index declared by a record type.
pub struct IndexDef {
    pub name: &'static str,
    /// Unique indexes reject a second row with the same key.
    pub unique: bool,
}

/// A row type stored in a [`Table`].
pub trait Record: Clone + Serialize + DeserializeOwned + Send + Sync + 'static {
    /// Table name; doubles as the persistence file stem.
    const TABLE: &'static str;
    /// Secondary indexes maintained for this table.
    const INDEXES: &'static [IndexDef];

    fn id(&self) -> Uuid;

    /// Index keys for this row, one `(index, key)` pair per declared
    /// index the row participates in.
    fn index_keys(&self) -> Vec<(&'static str, String)>;
}

struct Inner<T> {
    rows: HashMap<Uuid, T>,
    /// index name -> key -> row ids
    indexes: HashMap<&'static str, HashMap<String, HashSet<Uuid>>>,
}

/// One named table of the store.
pub struct Table<T: Record> {
    inner: Arc<RwLock<Inner<T>>>,
    persist: Option<Arc<FlatFileStore>>,
}

impl<T: Record> Clone for Table<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            persist: self.persist.clone(),
        }
    }
}

impl<T: Record> Table<T> {
    pub fn new(persist: Option<Arc<FlatFileStore>>) -> Self {
        let mut indexes = HashMap::new();
        for def in T::INDEXES {
            indexes.insert(def.name, HashMap::new());
        }
        Self {
            inner: Arc::new(RwLock::new(Inner {
                rows: HashMap::new(),
                indexes,
            })),
            persist,
        }
    }

    /// Load rows from the attached snapshot, rebuilding indexes.
    pub async fn load(&self) -> Result<(), AppError> {
        let Some(store) = &self.persist else {
            return Ok(());
        };
        let Some(content) = store.read_table(T::TABLE).await? else {
            return Ok(());
        };

        let rows: Vec<T> = serde_json::from_str(&content)?;
        let mut inner = self.inner.write().await;
        for row in rows {
            Self::index_row(&mut inner, &row);
            inner.rows.insert(row.id(), row);
        }
        Ok(())
    }

    pub async fn insert(&self, row: T) -> Result<(), AppError> {
        let mut inner = self.inner.write().await;
        Self::check_unique(&inner, &row, None)?;
        Self::index_row(&mut inner, &row);
        inner.rows.insert(row.id(), row);
        self.flush(&inner).await
    }

    pub async fn get(&self, id: Uuid) -> Option<T> {
        self.inner.read().await.rows.get(&id).cloned()
    }

    /// Apply `f` to the row, reindexing it afterwards. Fails with
    /// `NotFound` if the row does not exist.
    pub async fn update<F>(&self, id: Uuid, f: F) -> Result<T, AppError>
    where
        F: FnOnce(&mut T),
    {
        let mut inner = self.inner.write().await;
        let mut row = inner
            .rows
            .get(&id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(T::TABLE.to_string()))?;

        let old = row.clone();
        f(&mut row);

        Self::check_unique(&inner, &row, Some(id))?;
        Self::unindex_row(&mut inner, &old);
        Self::index_row(&mut inner, &row);
        inner.rows.insert(id, row.clone());
        self.flush(&inner).await?;
        Ok(row)
    }

    /// Remove a row. Returns whether a row was present (removal of an
    /// absent row is not an error).
    pub async fn remove(&self, id: Uuid) -> Result<bool, AppError> {
        let mut inner = self.inner.write().await;
        let Some(row) = inner.rows.remove(&id) else {
            return Ok(false);
        };
        Self::unindex_row(&mut inner, &row);
        self.flush(&inner).await?;
        Ok(true)
    }

    /// Remove every row matching the predicate; returns how many went.
    pub async fn remove_where<F>(&self, pred: F) -> Result<usize, AppError>
    where
        F: Fn(&T) -> bool,
    {
        let mut inner = self.inner.write().await;
        let doomed: Vec<T> = inner.rows.values().filter(|r| pred(r)).cloned().collect();
        for row in &doomed {
            inner.rows.remove(&row.id());
            Self::unindex_row(&mut inner, row);
        }
        if !doomed.is_empty() {
            self.flush(&inner).await?;
        }
        Ok(doomed.len())
    }

    /// All rows whose `index` key equals `key`.
    pub async fn find_by(&self, index: &'static str, key: &str) -> Vec<T> {
        let inner = self.inner.read().await;
        let Some(ids) = inner.indexes.get(index).and_then(|m| m.get(key)) else {
            return Vec::new();
        };
        ids.iter().filter_map(|id| inner.rows.get(id).cloned()).collect()
    }

    /// Lookup against a unique index (or the first match otherwise).
    pub async fn find_one_by(&self, index: &'static str, key: &str) -> Option<T> {
        let inner = self.inner.read().await;
        let ids = inner.indexes.get(index).and_then(|m| m.get(key))?;
        ids.iter().next().and_then(|id| inner.rows.get(id).cloned())
    }

    pub async fn all(&self) -> Vec<T> {
        self.inner.read().await.rows.values().cloned().collect()
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.rows.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    fn check_unique(inner: &Inner<T>, row: &T, exclude: Option<Uuid>) -> Result<(), AppError> {
        for def in T::INDEXES.iter().filter(|d| d.unique) {
            for (index, key) in row.index_keys() {
                if index != def.name {
                    continue;
                }
                let occupied = inner
                    .indexes
                    .get(index)
                    .and_then(|m| m.get(&key))
                    .is_some_and(|ids| ids.iter().any(|id| Some(*id) != exclude));
                if occupied {
                    return Err(AppError::Conflict(format!(
                        "duplicate key in unique index {}.{index}",
                        T::TABLE
                    )));
                }
            }
        }
        Ok(())
    }

    fn index_row(inner: &mut Inner<T>, row: &T) {
        let id = row.id();
        for (index, key) in row.index_keys() {
            if let Some(map) = inner.indexes.get_mut(index) {
                map.entry(key).or_default().insert(id);
            }
        }
    }

    fn unindex_row(inner: &mut Inner<T>, row: &T) {
        let id = row.id();
        for (index, key) in row.index_keys() {
            if let Some(map) = inner.indexes.get_mut(index) {
                if let Some(ids) = map.get_mut(&key) {
                    ids.remove(&id);
                    if ids.is_empty() {
                        map.remove(&key);
                    }
                }
            }
        }
    }

    async fn flush(&self, inner: &Inner<T>) -> Result<(), AppError> {
        let Some(store) = &self.persist else {
            return Ok(());
        };
        // Stable on-disk order so snapshots diff cleanly.
        let mut rows: Vec<&T> = inner.rows.values().collect();
        rows.sort_by_key(|r| r.id());
        let json = serde_json::to_string_pretty(&rows)?;
        store.write_table(T::TABLE, &json).await
    }
}

/// Every table of the ClawControl store.
#[derive(Clone)]
pub struct Db {
    pub users: Table<User>,
    pub user_sessions: Table<UserSession>,
    pub organizations: Table<Organization>,
    pub org_members: Table<OrgMember>,
    pub instances: Table<Instance>,
    pub agents: Table<Agent>,
    pub agent_sessions: Table<AgentSession>,
    pub messages: Table<ChatMessage>,
    pub skills: Table<Skill>,
    pub channels: Table<Channel>,
    pub blueprints: Table<Blueprint>,
    pub swarms: Table<Swarm>,
    pub audit_logs: Table<AuditLog>,
}

impl Db {
    /// A store with no persistence. Used by tests.
    pub fn in_memory() -> Self {
        Self::with_persist(None)
    }

    /// Open (or create) a store persisted under `dir`, loading any
    /// existing table snapshots.
    pub async fn open<P: AsRef<Path>>(dir: P) -> Result<Self, AppError> {
        let store = Arc::new(FlatFileStore::new(dir)?);
        let db = Self::with_persist(Some(store));
        db.load_all().await?;
        Ok(db)
    }

    fn with_persist(persist: Option<Arc<FlatFileStore>>) -> Self {
        Self {
            users: Table::new(persist.clone()),
            user_sessions: Table::new(persist.clone()),
            organizations: Table::new(persist.clone()),
            org_members: Table::new(persist.clone()),
            instances: Table::new(persist.clone()),
            agents: Table::new(persist.clone()),
            agent_sessions: Table::new(persist.clone()),
            messages: Table::new(persist.clone()),
            skills: Table::new(persist.clone()),
            channels: Table::new(persist.clone()),
            blueprints: Table::new(persist.clone()),
            swarms: Table::new(persist.clone()),
            audit_logs: Table::new(persist),
        }
    }

    async fn load_all(&self) -> Result<(), AppError> {
        self.users.load().await?;
        self.user_sessions.load().await?;
        self.organizations.load().await?;
        self.org_members.load().await?;
        self.instances.load().await?;
        self.agents.load().await?;
        self.agent_sessions.load().await?;
        self.messages.load().await?;
        self.skills.load().await?;
        self.channels.load().await?;
        self.blueprints.load().await?;
        self.swarms.load().await?;
        self.audit_logs.load().await?;
        Ok(())
    }
}
