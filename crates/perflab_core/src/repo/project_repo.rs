//! Project aggregate repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide CRUD APIs over `projects` and its three membership join tables.
//! - Own membership link/unlink logic with atomic semantics.
//!
//! # Invariants
//! - Write paths call `Project::validate()` before SQL mutations.
//! - A project row is only created when its owner is registered.
//! - Membership is a set: linking twice leaves a single row.
//! - Deleting a project removes membership rows, never catalog entities.

use crate::model::entity::{EntityId, EntityKind, OwnerId};
use crate::model::project::{Project, ProjectId, ProjectValidationError, ProjectView};
use crate::repo::catalog_repo::parse_stored_uuid;
use crate::repo::{ensure_schema_version, ensure_table, RepoError, RepoResult};
use rusqlite::{params, Connection, ErrorCode, Transaction, TransactionBehavior};

/// Repository interface for the project aggregate.
pub trait ProjectRepository {
    /// Persists one project with empty membership sets.
    fn create_project(&mut self, project: &Project) -> RepoResult<ProjectId>;
    /// Gets one project with resolved owner and membership sets.
    ///
    /// # Errors
    /// - `NotFound` when no project has this id.
    fn get_project(&self, id: ProjectId) -> RepoResult<ProjectView>;
    /// Lists projects, optionally restricted to one owner, sorted by name.
    fn list_projects(&self, owner: Option<OwnerId>) -> RepoResult<Vec<ProjectView>>;
    /// Renames one project, keeping `(owner, name)` uniqueness.
    fn rename_project(&self, id: ProjectId, new_name: &str) -> RepoResult<()>;
    /// Adds one membership row; returns `false` when already present.
    fn link_entity(
        &mut self,
        id: ProjectId,
        kind: EntityKind,
        entity: EntityId,
    ) -> RepoResult<bool>;
    /// Removes one membership row; returns `false` when absent.
    fn unlink_entity(
        &mut self,
        id: ProjectId,
        kind: EntityKind,
        entity: EntityId,
    ) -> RepoResult<bool>;
    /// Hard-deletes one project and its membership rows.
    fn delete_project(&self, id: ProjectId) -> RepoResult<()>;
}

/// SQLite-backed project aggregate repository.
pub struct SqliteProjectRepository<'conn> {
    conn: &'conn mut Connection,
}

impl<'conn> SqliteProjectRepository<'conn> {
    /// Constructs a repository from a migrated/ready connection.
    ///
    /// # Errors
    /// - `UninitializedConnection` when migrations have not been applied.
    /// - `MissingRequiredTable`/`MissingRequiredColumn` on schema drift.
    pub fn try_new(conn: &'conn mut Connection) -> RepoResult<Self> {
        ensure_schema_version(conn)?;
        ensure_table(conn, "owners", &["uuid", "username"])?;
        ensure_table(conn, "projects", &["uuid", "owner_uuid", "name", "updated_at"])?;
        ensure_table(conn, "project_targets", &["project_uuid", "target_uuid"])?;
        ensure_table(
            conn,
            "project_applications",
            &["project_uuid", "application_uuid"],
        )?;
        ensure_table(conn, "project_analyses", &["project_uuid", "analysis_uuid"])?;
        Ok(Self { conn })
    }
}

impl ProjectRepository for SqliteProjectRepository<'_> {
    fn create_project(&mut self, project: &Project) -> RepoResult<ProjectId> {
        project.validate()?;

        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        if !owner_exists(&tx, project.owner)? {
            return Err(ProjectValidationError::UnknownOwner(project.owner).into());
        }

        // The owner check holds within this transaction, so a constraint
        // failure here can only be the (owner_uuid, name) uniqueness rule.
        let result = tx.execute(
            "INSERT INTO projects (uuid, owner_uuid, name) VALUES (?1, ?2, ?3);",
            params![
                project.uuid.to_string(),
                project.owner.to_string(),
                project.name.as_str(),
            ],
        );

        match result {
            Ok(_) => {
                tx.commit()?;
                Ok(project.uuid)
            }
            Err(err) => Err(map_constraint_to_duplicate(
                err,
                project.owner,
                &project.name,
            )),
        }
    }

    fn get_project(&self, id: ProjectId) -> RepoResult<ProjectView> {
        load_project_view(self.conn, id)?.ok_or(RepoError::NotFound(id))
    }

    fn list_projects(&self, owner: Option<OwnerId>) -> RepoResult<Vec<ProjectView>> {
        let mut sql = String::from("SELECT uuid FROM projects");
        let mut bind: Vec<String> = Vec::new();
        if let Some(owner_id) = owner {
            sql.push_str(" WHERE owner_uuid = ?1");
            bind.push(owner_id.to_string());
        }
        sql.push_str(" ORDER BY name ASC, uuid ASC;");

        let ids: Vec<ProjectId> = {
            let mut stmt = self.conn.prepare(&sql)?;
            let mut rows = stmt.query(rusqlite::params_from_iter(bind))?;
            let mut ids = Vec::new();
            while let Some(row) = rows.next()? {
                let uuid_text: String = row.get("uuid")?;
                ids.push(parse_stored_uuid(&uuid_text, "projects.uuid")?);
            }
            ids
        };

        let mut views = Vec::with_capacity(ids.len());
        for id in ids {
            // A concurrent delete between the two queries surfaces as NotFound.
            views.push(load_project_view(self.conn, id)?.ok_or(RepoError::NotFound(id))?);
        }
        Ok(views)
    }

    fn rename_project(&self, id: ProjectId, new_name: &str) -> RepoResult<()> {
        crate::model::project::validate_project_name(new_name)?;

        let owner = project_owner(self.conn, id)?.ok_or(RepoError::NotFound(id))?;
        let result = self.conn.execute(
            "UPDATE projects
             SET
                name = ?2,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE uuid = ?1;",
            params![id.to_string(), new_name],
        );

        match result {
            Ok(_) => Ok(()),
            Err(err) => Err(map_constraint_to_duplicate(err, owner, new_name)),
        }
    }

    fn link_entity(
        &mut self,
        id: ProjectId,
        kind: EntityKind,
        entity: EntityId,
    ) -> RepoResult<bool> {
        let project_text = id.to_string();
        let entity_text = entity.to_string();

        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        if !project_exists_in_tx(&tx, &project_text)? {
            return Err(RepoError::NotFound(id));
        }
        if !entity_exists_in_tx(&tx, kind, &entity_text)? {
            return Err(RepoError::EntityNotFound { kind, id: entity });
        }

        let inserted = tx.execute(
            &format!(
                "INSERT OR IGNORE INTO {} (project_uuid, {}) VALUES (?1, ?2);",
                kind.join_table(),
                kind.join_column()
            ),
            params![project_text.as_str(), entity_text.as_str()],
        )?;

        if inserted > 0 {
            touch_project_in_tx(&tx, &project_text)?;
        }
        tx.commit()?;
        Ok(inserted > 0)
    }

    fn unlink_entity(
        &mut self,
        id: ProjectId,
        kind: EntityKind,
        entity: EntityId,
    ) -> RepoResult<bool> {
        let project_text = id.to_string();
        let entity_text = entity.to_string();

        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        if !project_exists_in_tx(&tx, &project_text)? {
            return Err(RepoError::NotFound(id));
        }

        let removed = tx.execute(
            &format!(
                "DELETE FROM {} WHERE project_uuid = ?1 AND {} = ?2;",
                kind.join_table(),
                kind.join_column()
            ),
            params![project_text.as_str(), entity_text.as_str()],
        )?;

        if removed > 0 {
            touch_project_in_tx(&tx, &project_text)?;
        }
        tx.commit()?;
        Ok(removed > 0)
    }

    fn delete_project(&self, id: ProjectId) -> RepoResult<()> {
        // Join rows cascade via the schema; catalog entities are untouched.
        let changed = self.conn.execute(
            "DELETE FROM projects WHERE uuid = ?1;",
            [id.to_string()],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }
        Ok(())
    }
}

fn load_project_view(conn: &Connection, id: ProjectId) -> RepoResult<Option<ProjectView>> {
    let uuid_text = id.to_string();
    let mut stmt =
        conn.prepare("SELECT uuid, owner_uuid, name FROM projects WHERE uuid = ?1;")?;
    let mut rows = stmt.query([uuid_text.as_str()])?;

    let Some(row) = rows.next()? else {
        return Ok(None);
    };

    let owner_text: String = row.get("owner_uuid")?;
    let name: String = row.get("name")?;

    Ok(Some(ProjectView {
        id,
        user: parse_stored_uuid(&owner_text, "projects.owner_uuid")?,
        name,
        targets: load_memberships(conn, EntityKind::Target, &uuid_text)?,
        applications: load_memberships(conn, EntityKind::Application, &uuid_text)?,
        analyses: load_memberships(conn, EntityKind::Analysis, &uuid_text)?,
    }))
}

fn load_memberships(
    conn: &Connection,
    kind: EntityKind,
    project_uuid: &str,
) -> RepoResult<Vec<EntityId>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {column}
         FROM {table}
         WHERE project_uuid = ?1
         ORDER BY {column} ASC;",
        column = kind.join_column(),
        table = kind.join_table(),
    ))?;
    let mut rows = stmt.query([project_uuid])?;
    let mut ids = Vec::new();
    while let Some(row) = rows.next()? {
        let value: String = row.get(0)?;
        let context = format!("{}.{}", kind.join_table(), kind.join_column());
        ids.push(parse_stored_uuid(&value, &context)?);
    }
    Ok(ids)
}

fn owner_exists(conn: &Connection, owner: OwnerId) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM owners WHERE uuid = ?1);",
        [owner.to_string()],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn project_owner(conn: &Connection, id: ProjectId) -> RepoResult<Option<OwnerId>> {
    let mut stmt = conn.prepare("SELECT owner_uuid FROM projects WHERE uuid = ?1;")?;
    let mut rows = stmt.query([id.to_string()])?;
    if let Some(row) = rows.next()? {
        let owner_text: String = row.get(0)?;
        return Ok(Some(parse_stored_uuid(&owner_text, "projects.owner_uuid")?));
    }
    Ok(None)
}

fn project_exists_in_tx(tx: &Transaction<'_>, project_uuid: &str) -> RepoResult<bool> {
    let exists: i64 = tx.query_row(
        "SELECT EXISTS(SELECT 1 FROM projects WHERE uuid = ?1);",
        [project_uuid],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn entity_exists_in_tx(
    tx: &Transaction<'_>,
    kind: EntityKind,
    entity_uuid: &str,
) -> RepoResult<bool> {
    let exists: i64 = tx.query_row(
        &format!("SELECT EXISTS(SELECT 1 FROM {} WHERE uuid = ?1);", kind.table()),
        [entity_uuid],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn touch_project_in_tx(tx: &Transaction<'_>, project_uuid: &str) -> RepoResult<()> {
    tx.execute(
        "UPDATE projects
         SET updated_at = (strftime('%s', 'now') * 1000)
         WHERE uuid = ?1;",
        [project_uuid],
    )?;
    Ok(())
}

fn map_constraint_to_duplicate(err: rusqlite::Error, owner: OwnerId, name: &str) -> RepoError {
    match &err {
        rusqlite::Error::SqliteFailure(failure, _)
            if failure.code == ErrorCode::ConstraintViolation =>
        {
            RepoError::DuplicateName {
                owner,
                name: name.to_string(),
            }
        }
        _ => err.into(),
    }
}
