//! Catalog repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Persist owner identities and opaque catalog entities (targets,
//!   applications, analyses).
//! - Keep per-kind table naming inside the persistence boundary.
//!
//! # Invariants
//! - Owner usernames are unique.
//! - Catalog rows are never deleted by project operations.

use crate::model::entity::{EntityId, EntityKind, EntityRecord, Owner, OwnerId};
use crate::repo::{ensure_schema_version, ensure_table, RepoError, RepoResult};
use rusqlite::{params, Connection, Row};
use uuid::Uuid;

/// Repository interface for the entity store.
pub trait CatalogRepository {
    /// Persists one owner identity and returns its stable id.
    fn register_owner(&self, owner: &Owner) -> RepoResult<OwnerId>;
    /// Gets one owner by id.
    fn get_owner(&self, id: OwnerId) -> RepoResult<Option<Owner>>;
    /// Finds one owner by unique username.
    fn find_owner_by_username(&self, username: &str) -> RepoResult<Option<Owner>>;
    /// Persists one catalog entity and returns its stable id.
    fn register_entity(&self, record: &EntityRecord) -> RepoResult<EntityId>;
    /// Gets one catalog entity by kind and id.
    fn get_entity(&self, kind: EntityKind, id: EntityId) -> RepoResult<Option<EntityRecord>>;
    /// Lists all catalog entities of one kind, sorted by name then id.
    fn list_entities(&self, kind: EntityKind) -> RepoResult<Vec<EntityRecord>>;
}

/// SQLite-backed catalog repository.
pub struct SqliteCatalogRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteCatalogRepository<'conn> {
    /// Constructs a repository from a migrated/ready connection.
    ///
    /// # Errors
    /// - `UninitializedConnection` when migrations have not been applied.
    /// - `MissingRequiredTable`/`MissingRequiredColumn` on schema drift.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_schema_version(conn)?;
        ensure_table(conn, "owners", &["uuid", "username", "email"])?;
        ensure_table(conn, "targets", &["uuid", "name"])?;
        ensure_table(conn, "applications", &["uuid", "name"])?;
        ensure_table(conn, "analyses", &["uuid", "name"])?;
        Ok(Self { conn })
    }
}

impl CatalogRepository for SqliteCatalogRepository<'_> {
    fn register_owner(&self, owner: &Owner) -> RepoResult<OwnerId> {
        self.conn.execute(
            "INSERT INTO owners (uuid, username, email) VALUES (?1, ?2, ?3);",
            params![
                owner.uuid.to_string(),
                owner.username.as_str(),
                owner.email.as_deref(),
            ],
        )?;
        Ok(owner.uuid)
    }

    fn get_owner(&self, id: OwnerId) -> RepoResult<Option<Owner>> {
        let mut stmt = self
            .conn
            .prepare("SELECT uuid, username, email FROM owners WHERE uuid = ?1;")?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_owner_row(row)?));
        }
        Ok(None)
    }

    fn find_owner_by_username(&self, username: &str) -> RepoResult<Option<Owner>> {
        let mut stmt = self
            .conn
            .prepare("SELECT uuid, username, email FROM owners WHERE username = ?1;")?;
        let mut rows = stmt.query([username])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_owner_row(row)?));
        }
        Ok(None)
    }

    fn register_entity(&self, record: &EntityRecord) -> RepoResult<EntityId> {
        // Table names cannot be bound; EntityKind::table() is a closed set.
        self.conn.execute(
            &format!(
                "INSERT INTO {} (uuid, name) VALUES (?1, ?2);",
                record.kind.table()
            ),
            params![record.uuid.to_string(), record.name.as_str()],
        )?;
        Ok(record.uuid)
    }

    fn get_entity(&self, kind: EntityKind, id: EntityId) -> RepoResult<Option<EntityRecord>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT uuid, name FROM {} WHERE uuid = ?1;",
            kind.table()
        ))?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_entity_row(row, kind)?));
        }
        Ok(None)
    }

    fn list_entities(&self, kind: EntityKind) -> RepoResult<Vec<EntityRecord>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT uuid, name FROM {} ORDER BY name ASC, uuid ASC;",
            kind.table()
        ))?;
        let mut rows = stmt.query([])?;
        let mut records = Vec::new();
        while let Some(row) = rows.next()? {
            records.push(parse_entity_row(row, kind)?);
        }
        Ok(records)
    }
}

pub(crate) fn parse_stored_uuid(value: &str, context: &str) -> RepoResult<Uuid> {
    Uuid::parse_str(value)
        .map_err(|_| RepoError::InvalidData(format!("invalid uuid value `{value}` in {context}")))
}

fn parse_owner_row(row: &Row<'_>) -> RepoResult<Owner> {
    let uuid_text: String = row.get("uuid")?;
    Ok(Owner {
        uuid: parse_stored_uuid(&uuid_text, "owners.uuid")?,
        username: row.get("username")?,
        email: row.get("email")?,
    })
}

fn parse_entity_row(row: &Row<'_>, kind: EntityKind) -> RepoResult<EntityRecord> {
    let uuid_text: String = row.get("uuid")?;
    let context = format!("{}.uuid", kind.table());
    Ok(EntityRecord {
        uuid: parse_stored_uuid(&uuid_text, &context)?,
        kind,
        name: row.get("name")?,
    })
}
