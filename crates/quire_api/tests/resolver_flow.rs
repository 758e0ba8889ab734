use quire_api::{
    ApiError, DocumentsArgs, NewAttachment, NewDocument, NewTag, Resolver, UpdateAttachment,
    UpdateDocument, UpdateTag,
};
use quire_core::db::open_db_in_memory;
use quire_core::ErrorKind;

fn new_tag(title: &str) -> NewTag {
    NewTag {
        title: title.to_string(),
    }
}

#[test]
fn tag_mutations_round_trip_through_views() {
    let conn = open_db_in_memory().unwrap();
    let resolver = Resolver::new(&conn).unwrap();

    let created = resolver.create_tag(new_tag("rust")).unwrap();
    assert_eq!(created.title, "rust");
    assert_eq!(resolver.tag(&created.id).unwrap(), created);

    let renamed = resolver
        .update_tag(UpdateTag {
            id: created.id.clone(),
            title: "rustlang".to_string(),
        })
        .unwrap();
    assert_eq!(renamed.title, "rustlang");
    assert_eq!(resolver.tags().unwrap().len(), 1);

    assert!(resolver.delete_tag(&created.id).unwrap());
    assert!(resolver.delete_tag(&created.id).unwrap());
    assert!(resolver.tags().unwrap().is_empty());
}

#[test]
fn duplicate_tag_error_names_the_operation() {
    let conn = open_db_in_memory().unwrap();
    let resolver = Resolver::new(&conn).unwrap();
    resolver.create_tag(new_tag("rust")).unwrap();

    let err = resolver.create_tag(new_tag("rust")).unwrap_err();
    assert!(err.to_string().starts_with("tag_create failed:"));
    assert_eq!(
        err.service_error().map(|source| source.kind()),
        Some(ErrorKind::Conflict)
    );
}

#[test]
fn malformed_ids_fail_before_any_lookup() {
    let conn = open_db_in_memory().unwrap();
    let resolver = Resolver::new(&conn).unwrap();

    assert!(matches!(
        resolver.document("42"),
        Err(ApiError::InvalidId { .. })
    ));
    let err = resolver
        .create_document(NewDocument {
            title: "intro".to_string(),
            tag_ids: Some(vec!["not-a-uuid".to_string()]),
            ..NewDocument::default()
        })
        .unwrap_err();
    assert!(matches!(err, ApiError::InvalidId { .. }));
    assert_eq!(resolver.documents(DocumentsArgs::default()).unwrap().total, 0);
}

#[test]
fn document_flow_with_tags_and_attachments() {
    let conn = open_db_in_memory().unwrap();
    let resolver = Resolver::new(&conn).unwrap();
    let a = resolver.create_tag(new_tag("a")).unwrap();
    let b = resolver.create_tag(new_tag("b")).unwrap();
    let image = resolver
        .create_attachment(NewAttachment {
            url: "https://cdn.example.com/a.png".to_string(),
            title: None,
        })
        .unwrap();

    let doc = resolver
        .create_document(NewDocument {
            title: "intro".to_string(),
            body: "hello".to_string(),
            tag_ids: Some(vec![a.id.clone()]),
            attachment_ids: Some(vec![image.id.clone()]),
        })
        .unwrap();
    assert_eq!(doc.tags, vec![a.clone()]);
    assert_eq!(doc.attachments, vec![image.clone()]);

    let updated = resolver
        .update_document(UpdateDocument {
            id: doc.id.clone(),
            tag_ids: Some(vec![b.id.clone()]),
            ..UpdateDocument::default()
        })
        .unwrap();
    assert_eq!(updated.body, "hello");
    assert_eq!(updated.tags, vec![b.clone()]);
    assert_eq!(updated.attachments.len(), 1);

    let by_tag = resolver
        .documents_by_tag(&[a.id.clone(), b.id.clone()], DocumentsArgs::default())
        .unwrap();
    assert_eq!(by_tag.total, 1);
    assert_eq!(by_tag.items[0].id, doc.id);

    assert!(resolver.delete_document(&doc.id).unwrap());
    let err = resolver.document(&doc.id).unwrap_err();
    assert!(err.to_string().starts_with("document_get failed:"));
}

#[test]
fn documents_page_reports_paging_and_sorting() {
    let conn = open_db_in_memory().unwrap();
    let resolver = Resolver::new(&conn).unwrap();
    for title in ["title1", "title2", "title3", "title4"] {
        resolver
            .create_document(NewDocument {
                title: title.to_string(),
                ..NewDocument::default()
            })
            .unwrap();
    }

    let page = resolver
        .documents(DocumentsArgs {
            limit: Some(2),
            sort_by: Some("title".to_string()),
            ..DocumentsArgs::default()
        })
        .unwrap();
    let titles: Vec<&str> = page.items.iter().map(|doc| doc.title.as_str()).collect();
    assert_eq!(titles, vec!["title4", "title3"]);
    assert_eq!(page.total, 4);
    assert_eq!(page.limit, 2);

    let json = serde_json::to_value(&page).unwrap();
    assert_eq!(json["total"], 4);
    assert!(json["items"][0]["updatedAt"].as_str().unwrap().ends_with('Z'));
}

#[test]
fn attachment_update_keeps_title_when_omitted() {
    let conn = open_db_in_memory().unwrap();
    let resolver = Resolver::new(&conn).unwrap();
    let created = resolver
        .create_attachment(NewAttachment {
            url: "https://cdn.example.com/a.png".to_string(),
            title: Some("cover".to_string()),
        })
        .unwrap();

    let updated = resolver
        .update_attachment(UpdateAttachment {
            id: created.id.clone(),
            url: "https://cdn.example.com/b.png".to_string(),
            title: None,
        })
        .unwrap();
    assert_eq!(updated.title.as_deref(), Some("cover"));
    assert_eq!(resolver.attachment(&created.id).unwrap(), updated);
    assert!(resolver.delete_attachment(&created.id).unwrap());
}

#[test]
fn resolver_refuses_unmigrated_connection() {
    let conn = rusqlite::Connection::open_in_memory().unwrap();
    assert!(matches!(Resolver::new(&conn), Err(ApiError::Setup(_))));
}
