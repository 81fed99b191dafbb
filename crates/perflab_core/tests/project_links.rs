use perflab_core::db::open_db_in_memory;
use perflab_core::{
    CatalogRepository, CatalogService, EntityKind, EntityRecord, Owner, ProjectService,
    RepoError, SqliteCatalogRepository, SqliteProjectRepository,
};
use rusqlite::Connection;
use uuid::Uuid;

struct Fixture {
    owner: Owner,
    target: EntityRecord,
    application: EntityRecord,
    analysis: EntityRecord,
}

fn seed_catalog(conn: &Connection) -> Fixture {
    let catalog = CatalogService::new(SqliteCatalogRepository::try_new(conn).unwrap());
    Fixture {
        owner: catalog.register_owner("u1").unwrap(),
        target: catalog.register_target("cluster-a").unwrap(),
        application: catalog.register_application("matmul").unwrap(),
        analysis: catalog.register_analysis("hotspots").unwrap(),
    }
}

#[test]
fn adding_same_target_twice_keeps_single_membership() {
    let mut conn = open_db_in_memory().unwrap();
    let fixture = seed_catalog(&conn);

    let repo = SqliteProjectRepository::try_new(&mut conn).unwrap();
    let mut service = ProjectService::new(repo);
    let project = service.create_project(fixture.owner.uuid, "Demo").unwrap();

    service.add_target(project.uuid, fixture.target.uuid).unwrap();
    service.add_target(project.uuid, fixture.target.uuid).unwrap();

    let view = service.get_project(project.uuid).unwrap();
    assert_eq!(view.targets, vec![fixture.target.uuid]);
}

#[test]
fn membership_arrays_come_back_id_sorted() {
    let mut conn = open_db_in_memory().unwrap();
    let fixture = seed_catalog(&conn);
    let low = target_with_fixed_id("00000000-0000-4000-8000-000000000001", "node-a");
    let high = target_with_fixed_id("ffffffff-0000-4000-8000-000000000002", "node-b");
    {
        let catalog = SqliteCatalogRepository::try_new(&conn).unwrap();
        catalog.register_entity(&high).unwrap();
        catalog.register_entity(&low).unwrap();
    }

    let repo = SqliteProjectRepository::try_new(&mut conn).unwrap();
    let mut service = ProjectService::new(repo);
    let project = service.create_project(fixture.owner.uuid, "Demo").unwrap();

    // Link in reverse id order; the view must not preserve insertion order.
    service.add_target(project.uuid, high.uuid).unwrap();
    service.add_target(project.uuid, low.uuid).unwrap();

    let view = service.get_project(project.uuid).unwrap();
    assert_eq!(view.targets, vec![low.uuid, high.uuid]);
}

fn target_with_fixed_id(id: &str, name: &str) -> EntityRecord {
    EntityRecord {
        uuid: Uuid::parse_str(id).unwrap(),
        kind: EntityKind::Target,
        name: name.to_string(),
    }
}

#[test]
fn memberships_of_all_kinds_resolve_in_the_view() {
    let mut conn = open_db_in_memory().unwrap();
    let fixture = seed_catalog(&conn);

    let repo = SqliteProjectRepository::try_new(&mut conn).unwrap();
    let mut service = ProjectService::new(repo);
    let project = service.create_project(fixture.owner.uuid, "Demo").unwrap();

    service.add_target(project.uuid, fixture.target.uuid).unwrap();
    service
        .add_application(project.uuid, fixture.application.uuid)
        .unwrap();
    service
        .add_analysis(project.uuid, fixture.analysis.uuid)
        .unwrap();

    let view = service.get_project(project.uuid).unwrap();
    assert_eq!(view.targets, vec![fixture.target.uuid]);
    assert_eq!(view.applications, vec![fixture.application.uuid]);
    assert_eq!(view.analyses, vec![fixture.analysis.uuid]);
}

#[test]
fn linking_against_unknown_project_is_not_found() {
    let mut conn = open_db_in_memory().unwrap();
    let fixture = seed_catalog(&conn);

    let repo = SqliteProjectRepository::try_new(&mut conn).unwrap();
    let mut service = ProjectService::new(repo);

    let missing = Uuid::new_v4();
    let err = service
        .add_target(missing, fixture.target.uuid)
        .unwrap_err();
    assert!(matches!(err, RepoError::NotFound(id) if id == missing));
}

#[test]
fn linking_unregistered_entity_is_entity_not_found() {
    let mut conn = open_db_in_memory().unwrap();
    let fixture = seed_catalog(&conn);

    let repo = SqliteProjectRepository::try_new(&mut conn).unwrap();
    let mut service = ProjectService::new(repo);
    let project = service.create_project(fixture.owner.uuid, "Demo").unwrap();

    let ghost = Uuid::new_v4();
    let err = service.add_analysis(project.uuid, ghost).unwrap_err();
    assert!(matches!(
        err,
        RepoError::EntityNotFound {
            kind: EntityKind::Analysis,
            id
        } if id == ghost
    ));
}

#[test]
fn removing_membership_is_idempotent() {
    let mut conn = open_db_in_memory().unwrap();
    let fixture = seed_catalog(&conn);

    let repo = SqliteProjectRepository::try_new(&mut conn).unwrap();
    let mut service = ProjectService::new(repo);
    let project = service.create_project(fixture.owner.uuid, "Demo").unwrap();

    service.add_target(project.uuid, fixture.target.uuid).unwrap();
    service
        .remove_target(project.uuid, fixture.target.uuid)
        .unwrap();
    // Second removal is a no-op, not an error.
    service
        .remove_target(project.uuid, fixture.target.uuid)
        .unwrap();

    let view = service.get_project(project.uuid).unwrap();
    assert!(view.targets.is_empty());
}

#[test]
fn one_entity_can_belong_to_two_projects() {
    let mut conn = open_db_in_memory().unwrap();
    let fixture = seed_catalog(&conn);

    let repo = SqliteProjectRepository::try_new(&mut conn).unwrap();
    let mut service = ProjectService::new(repo);
    let first = service.create_project(fixture.owner.uuid, "first").unwrap();
    let second = service
        .create_project(fixture.owner.uuid, "second")
        .unwrap();

    service.add_application(first.uuid, fixture.application.uuid).unwrap();
    service
        .add_application(second.uuid, fixture.application.uuid)
        .unwrap();

    assert_eq!(
        service.get_project(first.uuid).unwrap().applications,
        vec![fixture.application.uuid]
    );
    assert_eq!(
        service.get_project(second.uuid).unwrap().applications,
        vec![fixture.application.uuid]
    );
}

#[test]
fn deleting_a_project_keeps_catalog_entities() {
    let mut conn = open_db_in_memory().unwrap();
    let fixture = seed_catalog(&conn);

    let project_id = {
        let repo = SqliteProjectRepository::try_new(&mut conn).unwrap();
        let mut service = ProjectService::new(repo);
        let project = service.create_project(fixture.owner.uuid, "Demo").unwrap();
        service.add_target(project.uuid, fixture.target.uuid).unwrap();
        service.delete_project(project.uuid).unwrap();

        let err = service.get_project(project.uuid).unwrap_err();
        assert!(matches!(err, RepoError::NotFound(id) if id == project.uuid));
        project.uuid
    };

    // Membership rows are gone, the catalog entry is not.
    let join_rows: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM project_targets WHERE project_uuid = ?1;",
            [project_id.to_string()],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(join_rows, 0);

    let catalog = CatalogService::new(SqliteCatalogRepository::try_new(&conn).unwrap());
    let survivor = catalog
        .get_entity(EntityKind::Target, fixture.target.uuid)
        .unwrap();
    assert_eq!(survivor, Some(fixture.target));
}

#[test]
fn project_view_serializes_to_external_shape() {
    let mut conn = open_db_in_memory().unwrap();
    let fixture = seed_catalog(&conn);

    let repo = SqliteProjectRepository::try_new(&mut conn).unwrap();
    let mut service = ProjectService::new(repo);
    let project = service.create_project(fixture.owner.uuid, "Demo").unwrap();
    service.add_target(project.uuid, fixture.target.uuid).unwrap();

    let view = service.get_project(project.uuid).unwrap();
    let json = serde_json::to_value(&view).unwrap();

    assert_eq!(json["id"], project.uuid.to_string());
    assert_eq!(json["user"], fixture.owner.uuid.to_string());
    assert_eq!(json["name"], "Demo");
    assert_eq!(json["targets"][0], fixture.target.uuid.to_string());
    assert!(json["applications"].as_array().unwrap().is_empty());
    assert!(json["analyses"].as_array().unwrap().is_empty());
}
