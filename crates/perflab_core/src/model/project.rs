//! Project domain model.
//!
//! # Responsibility
//! - Define the project record and its resolved read model.
//! - Enforce project name validation rules.
//!
//! # Invariants
//! - `owner` is set at construction and never becomes null.
//! - `name` is non-empty and matches [`PROJECT_NAME_PATTERN`] after trimming.

use crate::model::entity::{EntityId, OwnerId};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable identifier for a project record.
pub type ProjectId = Uuid;

/// Allowed shape for project names: leading alphanumeric, then word
/// characters, dots, dashes and inner spaces.
pub const PROJECT_NAME_PATTERN: &str = r"^[A-Za-z0-9][A-Za-z0-9_.\- ]*$";

static PROJECT_NAME_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(PROJECT_NAME_PATTERN).expect("project name pattern must compile")
});

/// Validation failures for project construction and mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProjectValidationError {
    EmptyName,
    InvalidName(String),
    UnknownOwner(OwnerId),
}

impl Display for ProjectValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyName => write!(f, "project name cannot be empty"),
            Self::InvalidName(name) => write!(f, "invalid project name `{name}`"),
            Self::UnknownOwner(id) => write!(f, "owner not registered: {id}"),
        }
    }
}

impl Error for ProjectValidationError {}

/// Canonical project record as persisted in `projects`.
///
/// The owner reference serializes as `user` to match the external schema
/// naming of the registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    /// Stable global ID used for membership rows and auditing.
    pub uuid: ProjectId,
    /// Owning identity; serialized as `user`.
    #[serde(rename = "user")]
    pub owner: OwnerId,
    pub name: String,
}

impl Project {
    /// Creates a project record with a generated stable ID.
    ///
    /// Does not validate; write paths call [`Project::validate`] before
    /// touching storage.
    pub fn new(owner: OwnerId, name: impl Into<String>) -> Self {
        Self::with_id(Uuid::new_v4(), owner, name)
    }

    /// Creates a project record with a caller-provided stable ID.
    ///
    /// Used by import paths where identity already exists externally.
    pub fn with_id(uuid: ProjectId, owner: OwnerId, name: impl Into<String>) -> Self {
        Self {
            uuid,
            owner,
            name: name.into(),
        }
    }

    /// Checks record-local invariants.
    ///
    /// # Errors
    /// - `EmptyName` when the name is empty or whitespace-only.
    /// - `InvalidName` when the name fails the allowed pattern.
    pub fn validate(&self) -> Result<(), ProjectValidationError> {
        validate_project_name(&self.name)
    }
}

/// Validates a project name against registry naming rules.
pub fn validate_project_name(name: &str) -> Result<(), ProjectValidationError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(ProjectValidationError::EmptyName);
    }
    if trimmed != name || !PROJECT_NAME_RE.is_match(trimmed) {
        return Err(ProjectValidationError::InvalidName(name.to_string()));
    }
    Ok(())
}

/// Read model for one project with resolved owner and membership sets.
///
/// Serializes to the registry's external shape:
/// `{id, user, name, targets, applications, analyses}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectView {
    pub id: ProjectId,
    /// Owner reference, resolved to a registered identity.
    pub user: OwnerId,
    pub name: String,
    /// Membership id arrays, each sorted for stable output.
    pub targets: Vec<EntityId>,
    pub applications: Vec<EntityId>,
    pub analyses: Vec<EntityId>,
}

#[cfg(test)]
mod tests {
    use super::{validate_project_name, ProjectValidationError};

    #[test]
    fn accepts_plain_and_spaced_names() {
        assert!(validate_project_name("Demo").is_ok());
        assert!(validate_project_name("mpi-bench 2.0").is_ok());
    }

    #[test]
    fn rejects_empty_and_whitespace_names() {
        assert_eq!(
            validate_project_name(""),
            Err(ProjectValidationError::EmptyName)
        );
        assert_eq!(
            validate_project_name("   "),
            Err(ProjectValidationError::EmptyName)
        );
    }

    #[test]
    fn rejects_padded_and_badly_shaped_names() {
        assert!(matches!(
            validate_project_name(" padded"),
            Err(ProjectValidationError::InvalidName(_))
        ));
        assert!(matches!(
            validate_project_name("-leading-dash"),
            Err(ProjectValidationError::InvalidName(_))
        ));
        assert!(matches!(
            validate_project_name("tab\tname"),
            Err(ProjectValidationError::InvalidName(_))
        ));
    }
}
