//! Catalog use-case service.
//!
//! # Responsibility
//! - Provide stable entry points for registering owners and catalog
//!   entities.
//! - Delegate persistence to repository implementations.
//!
//! # Invariants
//! - Service APIs never bypass repository persistence contracts.
//! - Service layer remains storage-agnostic.

use crate::model::entity::{EntityId, EntityKind, EntityRecord, Owner, OwnerId};
use crate::repo::catalog_repo::CatalogRepository;
use crate::repo::RepoResult;

/// Use-case service wrapper for the entity store.
pub struct CatalogService<R: CatalogRepository> {
    repo: R,
}

impl<R: CatalogRepository> CatalogService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Registers a new owner identity by username.
    pub fn register_owner(&self, username: impl Into<String>) -> RepoResult<Owner> {
        let owner = Owner::new(username);
        self.repo.register_owner(&owner)?;
        Ok(owner)
    }

    /// Registers a target description in the catalog.
    pub fn register_target(&self, name: impl Into<String>) -> RepoResult<EntityRecord> {
        self.register(EntityKind::Target, name)
    }

    /// Registers an application configuration in the catalog.
    pub fn register_application(&self, name: impl Into<String>) -> RepoResult<EntityRecord> {
        self.register(EntityKind::Application, name)
    }

    /// Registers a stored analysis in the catalog.
    pub fn register_analysis(&self, name: impl Into<String>) -> RepoResult<EntityRecord> {
        self.register(EntityKind::Analysis, name)
    }

    /// Gets one owner by id.
    pub fn get_owner(&self, id: OwnerId) -> RepoResult<Option<Owner>> {
        self.repo.get_owner(id)
    }

    /// Finds one owner by unique username.
    pub fn find_owner(&self, username: &str) -> RepoResult<Option<Owner>> {
        self.repo.find_owner_by_username(username)
    }

    /// Gets one catalog entity by kind and id.
    pub fn get_entity(&self, kind: EntityKind, id: EntityId) -> RepoResult<Option<EntityRecord>> {
        self.repo.get_entity(kind, id)
    }

    /// Lists all catalog entities of one kind.
    pub fn list_entities(&self, kind: EntityKind) -> RepoResult<Vec<EntityRecord>> {
        self.repo.list_entities(kind)
    }

    fn register(&self, kind: EntityKind, name: impl Into<String>) -> RepoResult<EntityRecord> {
        let record = EntityRecord::new(kind, name);
        self.repo.register_entity(&record)?;
        Ok(record)
    }
}
