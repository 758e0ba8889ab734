use quire_core::db::open_db_in_memory;
use quire_core::{
    ErrorKind, RepoError, ServiceError, SqliteTagRepository, Tag, TagRepository, TagService,
};
use rusqlite::Connection;
use uuid::Uuid;

fn tag_service(conn: &Connection) -> TagService<SqliteTagRepository<'_>> {
    TagService::new(SqliteTagRepository::try_new(conn).unwrap())
}

#[test]
fn create_with_unused_title_is_found_by_title() {
    let conn = open_db_in_memory().unwrap();
    let service = tag_service(&conn);

    let created = service.create("rust").unwrap();
    let found = service.get_by_title("rust").unwrap().unwrap();

    assert_eq!(found.id, created.id);
    assert_eq!(found.title, "rust");
    assert!(found.is_active());
    assert_eq!(found.created_at, found.updated_at);
}

#[test]
fn create_with_used_title_is_duplicate_and_adds_no_row() {
    let conn = open_db_in_memory().unwrap();
    let service = tag_service(&conn);
    service.create("rust").unwrap();

    let err = service.create("  rust ").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Conflict);
    assert!(matches!(err, ServiceError::Duplicate { field: "title", .. }));
    assert_eq!(service.get_all().unwrap().len(), 1);
}

#[test]
fn blank_title_is_invalid_input() {
    let conn = open_db_in_memory().unwrap();
    let service = tag_service(&conn);

    let err = service.create("   ").unwrap_err();
    assert!(matches!(err, ServiceError::InvalidInput(_)));
    assert!(service.get_all().unwrap().is_empty());
}

#[test]
fn get_missing_tag_is_not_found_with_id() {
    let conn = open_db_in_memory().unwrap();
    let service = tag_service(&conn);
    let id = Uuid::new_v4();

    match service.get(id).unwrap_err() {
        ServiceError::NotFound { id: missing, .. } => assert_eq!(missing, id),
        other => panic!("unexpected error: {other}"),
    }
    assert!(service.get_by_title("nothing").unwrap().is_none());
}

#[test]
fn get_all_orders_by_title() {
    let conn = open_db_in_memory().unwrap();
    let service = tag_service(&conn);
    for title in ["web", "api", "db"] {
        service.create(title).unwrap();
    }

    let titles: Vec<String> = service
        .get_all()
        .unwrap()
        .into_iter()
        .map(|tag| tag.title)
        .collect();
    assert_eq!(titles, vec!["api", "db", "web"]);
}

#[test]
fn update_rechecks_uniqueness_against_other_tags() {
    let conn = open_db_in_memory().unwrap();
    let service = tag_service(&conn);
    let rust = service.create("rust").unwrap();
    service.create("go").unwrap();

    let err = service.update(rust.id, "go").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Conflict);

    let same = service.update(rust.id, "rust").unwrap();
    assert_eq!(same.title, "rust");

    let renamed = service.update(rust.id, "rustlang").unwrap();
    assert_eq!(renamed.title, "rustlang");
    assert!(renamed.updated_at >= renamed.created_at);
    assert!(service.get_by_title("rust").unwrap().is_none());
}

#[test]
fn update_missing_tag_is_not_found() {
    let conn = open_db_in_memory().unwrap();
    let service = tag_service(&conn);

    let err = service.update(Uuid::new_v4(), "anything").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[test]
fn delete_is_idempotent_and_frees_the_title() {
    let conn = open_db_in_memory().unwrap();
    let service = tag_service(&conn);
    let tag = service.create("rust").unwrap();

    service.delete(tag.id).unwrap();
    service.delete(tag.id).unwrap();
    service.delete(Uuid::new_v4()).unwrap();

    assert_eq!(service.get(tag.id).unwrap_err().kind(), ErrorKind::NotFound);
    let reused = service.create("rust").unwrap();
    assert_ne!(reused.id, tag.id);
}

#[test]
fn repository_keeps_tombstone_visible_to_include_deleted() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTagRepository::try_new(&conn).unwrap();
    let tag = Tag::new("archived");
    repo.create_tag(&tag).unwrap();

    assert!(repo.soft_delete_tag(tag.id).unwrap());
    assert!(!repo.soft_delete_tag(tag.id).unwrap());

    assert!(repo.get_tag(tag.id, false).unwrap().is_none());
    let tombstone = repo.get_tag(tag.id, true).unwrap().unwrap();
    assert!(tombstone.deleted_at.is_some());
}

#[test]
fn get_tags_omits_unknown_and_deleted_ids() {
    let conn = open_db_in_memory().unwrap();
    let service = tag_service(&conn);
    let live = service.create("live").unwrap();
    let gone = service.create("gone").unwrap();
    service.delete(gone.id).unwrap();

    let found = service
        .get_multiple(&[live.id, gone.id, Uuid::new_v4()])
        .unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].id, live.id);
}

#[test]
fn repository_unique_index_surfaces_as_unique_violation() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTagRepository::try_new(&conn).unwrap();
    repo.create_tag(&Tag::new("rust")).unwrap();

    let err = repo.create_tag(&Tag::new("rust")).unwrap_err();
    assert!(matches!(err, RepoError::UniqueViolation(_)));
}

#[test]
fn repository_update_of_deleted_tag_is_not_found() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTagRepository::try_new(&conn).unwrap();
    let mut tag = Tag::new("rust");
    repo.create_tag(&tag).unwrap();
    repo.soft_delete_tag(tag.id).unwrap();

    tag.title = "renamed".to_string();
    let err = repo.update_tag(&tag).unwrap_err();
    assert!(matches!(err, RepoError::NotFound(id) if id == tag.id));
}

#[test]
fn try_new_requires_migrated_schema() {
    let conn = Connection::open_in_memory().unwrap();
    let err = SqliteTagRepository::try_new(&conn).err().unwrap();
    assert!(matches!(err, RepoError::MissingRequiredTable("tags")));
}
