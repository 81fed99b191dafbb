//! Owner and catalog entity records.
//!
//! # Responsibility
//! - Define the opaque entity kinds a project can reference.
//! - Map each kind to its storage and join-table names.
//!
//! # Invariants
//! - Catalog entities carry no attributes beyond a display name; their full
//!   configuration lives outside this registry.
//! - Join-table naming stays in sync with the migration SQL.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier for an owner record.
pub type OwnerId = Uuid;

/// Stable identifier for a catalog entity of any kind.
pub type EntityId = Uuid;

/// The three catalog entity kinds a project aggregates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    /// A machine or execution environment description.
    Target,
    /// An application configuration under study.
    Application,
    /// A stored analysis of collected performance data.
    Analysis,
}

impl EntityKind {
    /// Singular db name, also used in log event fields.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Target => "target",
            Self::Application => "application",
            Self::Analysis => "analysis",
        }
    }

    /// Catalog table holding entities of this kind.
    pub fn table(self) -> &'static str {
        match self {
            Self::Target => "targets",
            Self::Application => "applications",
            Self::Analysis => "analyses",
        }
    }

    /// Join table recording project membership for this kind.
    pub fn join_table(self) -> &'static str {
        match self {
            Self::Target => "project_targets",
            Self::Application => "project_applications",
            Self::Analysis => "project_analyses",
        }
    }

    /// Entity-side column of the join table.
    pub fn join_column(self) -> &'static str {
        match self {
            Self::Target => "target_uuid",
            Self::Application => "application_uuid",
            Self::Analysis => "analysis_uuid",
        }
    }
}

/// External identity that projects belong to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Owner {
    /// Stable global ID referenced from `projects.owner_uuid`.
    pub uuid: OwnerId,
    /// Unique login name.
    pub username: String,
    /// Optional contact address.
    pub email: Option<String>,
}

impl Owner {
    /// Creates an owner with a generated stable ID.
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            username: username.into(),
            email: None,
        }
    }
}

/// Opaque catalog entry for a target, application or analysis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityRecord {
    /// Stable global ID used in project membership rows.
    pub uuid: EntityId,
    pub kind: EntityKind,
    /// Display name; uniqueness across the catalog is not required.
    pub name: String,
}

impl EntityRecord {
    /// Creates a catalog entry with a generated stable ID.
    pub fn new(kind: EntityKind, name: impl Into<String>) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            kind,
            name: name.into(),
        }
    }
}
