//! Project use-case service.
//!
//! # Responsibility
//! - Provide the create/read/update operations of the project aggregate.
//! - Delegate persistence to repository implementations.
//!
//! # Invariants
//! - Service APIs never bypass repository validation/persistence contracts.
//! - Membership adds and removes are idempotent at this layer.

use crate::model::entity::{EntityId, EntityKind, OwnerId};
use crate::model::project::{Project, ProjectId, ProjectView};
use crate::repo::project_repo::ProjectRepository;
use crate::repo::RepoResult;

/// Use-case service wrapper for the project aggregate.
pub struct ProjectService<R: ProjectRepository> {
    repo: R,
}

impl<R: ProjectRepository> ProjectService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Creates a project for a registered owner.
    ///
    /// # Contract
    /// - The new project starts with empty membership sets.
    /// - Fails with the validation family when the name is empty/invalid or
    ///   the owner is not registered.
    pub fn create_project(
        &mut self,
        owner: OwnerId,
        name: impl Into<String>,
    ) -> RepoResult<Project> {
        let project = Project::new(owner, name);
        self.repo.create_project(&project)?;
        Ok(project)
    }

    /// Gets one project with resolved owner and membership sets.
    pub fn get_project(&self, id: ProjectId) -> RepoResult<ProjectView> {
        self.repo.get_project(id)
    }

    /// Lists projects, optionally restricted to one owner.
    pub fn list_projects(&self, owner: Option<OwnerId>) -> RepoResult<Vec<ProjectView>> {
        self.repo.list_projects(owner)
    }

    /// Renames one project.
    pub fn rename_project(&self, id: ProjectId, new_name: &str) -> RepoResult<()> {
        self.repo.rename_project(id, new_name)
    }

    /// Adds one target to a project's membership set. No-op when present.
    pub fn add_target(&mut self, id: ProjectId, target: EntityId) -> RepoResult<()> {
        self.repo.link_entity(id, EntityKind::Target, target)?;
        Ok(())
    }

    /// Adds one application to a project's membership set. No-op when present.
    pub fn add_application(&mut self, id: ProjectId, application: EntityId) -> RepoResult<()> {
        self.repo
            .link_entity(id, EntityKind::Application, application)?;
        Ok(())
    }

    /// Adds one analysis to a project's membership set. No-op when present.
    pub fn add_analysis(&mut self, id: ProjectId, analysis: EntityId) -> RepoResult<()> {
        self.repo.link_entity(id, EntityKind::Analysis, analysis)?;
        Ok(())
    }

    /// Removes one target membership. No-op when absent.
    pub fn remove_target(&mut self, id: ProjectId, target: EntityId) -> RepoResult<()> {
        self.repo.unlink_entity(id, EntityKind::Target, target)?;
        Ok(())
    }

    /// Removes one application membership. No-op when absent.
    pub fn remove_application(&mut self, id: ProjectId, application: EntityId) -> RepoResult<()> {
        self.repo
            .unlink_entity(id, EntityKind::Application, application)?;
        Ok(())
    }

    /// Removes one analysis membership. No-op when absent.
    pub fn remove_analysis(&mut self, id: ProjectId, analysis: EntityId) -> RepoResult<()> {
        self.repo.unlink_entity(id, EntityKind::Analysis, analysis)?;
        Ok(())
    }

    /// Hard-deletes one project; catalog entities survive.
    pub fn delete_project(&self, id: ProjectId) -> RepoResult<()> {
        self.repo.delete_project(id)
    }
}
