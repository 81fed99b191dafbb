//! Project registry core for the perflab workspace.
//! This crate is the single source of truth for registry invariants.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use logging::{default_log_level, init_logging, logging_status};
pub use model::entity::{EntityId, EntityKind, EntityRecord, Owner, OwnerId};
pub use model::project::{
    Project, ProjectId, ProjectValidationError, ProjectView, validate_project_name,
};
pub use repo::catalog_repo::{CatalogRepository, SqliteCatalogRepository};
pub use repo::project_repo::{ProjectRepository, SqliteProjectRepository};
pub use repo::{RepoError, RepoResult};
pub use service::catalog_service::CatalogService;
pub use service::project_service::ProjectService;

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
