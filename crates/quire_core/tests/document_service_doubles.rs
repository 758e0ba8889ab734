//! Document service rules checked against in-memory doubles, no SQLite involved.

use quire_core::{
    Attachment, AttachmentId, AttachmentLookup, Document, DocumentChanges, DocumentId,
    DocumentListQuery, DocumentRepository, DocumentService, LinkReplacement, NewDocument,
    PageRequest, RepoError, RepoResult, ServiceError, ServiceResult, Tag, TagId, TagLookup,
};
use std::cell::RefCell;
use uuid::Uuid;

#[derive(Default)]
struct MemoryDocuments {
    rows: RefCell<Vec<Document>>,
    last_links: RefCell<Option<LinkReplacement>>,
    writes: RefCell<usize>,
}

impl DocumentRepository for MemoryDocuments {
    fn get_document(&self, id: DocumentId, include_deleted: bool) -> RepoResult<Option<Document>> {
        Ok(self
            .rows
            .borrow()
            .iter()
            .find(|doc| doc.id == id && (include_deleted || doc.is_active()))
            .cloned())
    }

    fn count_documents(&self) -> RepoResult<u64> {
        Ok(self.rows.borrow().iter().filter(|doc| doc.is_active()).count() as u64)
    }

    fn list_documents(&self, query: &DocumentListQuery) -> RepoResult<Vec<Document>> {
        Ok(self
            .rows
            .borrow()
            .iter()
            .filter(|doc| doc.is_active())
            .skip(query.offset as usize)
            .take(query.limit as usize)
            .cloned()
            .collect())
    }

    fn count_documents_with_tags(&self, tag_ids: &[TagId]) -> RepoResult<u64> {
        Ok(self.with_tags(tag_ids).len() as u64)
    }

    fn list_documents_with_tags(
        &self,
        tag_ids: &[TagId],
        _query: &DocumentListQuery,
    ) -> RepoResult<Vec<Document>> {
        Ok(self.with_tags(tag_ids))
    }

    fn create_document(&self, document: &Document) -> RepoResult<DocumentId> {
        *self.writes.borrow_mut() += 1;
        self.rows.borrow_mut().push(document.clone());
        Ok(document.id)
    }

    fn update_document(&self, document: &Document, links: LinkReplacement) -> RepoResult<()> {
        *self.writes.borrow_mut() += 1;
        *self.last_links.borrow_mut() = Some(links);
        let mut rows = self.rows.borrow_mut();
        let row = rows
            .iter_mut()
            .find(|doc| doc.id == document.id && doc.is_active())
            .ok_or(RepoError::NotFound(document.id))?;
        *row = document.clone();
        Ok(())
    }

    fn soft_delete_document(&self, id: DocumentId) -> RepoResult<bool> {
        let mut rows = self.rows.borrow_mut();
        match rows.iter_mut().find(|doc| doc.id == id && doc.is_active()) {
            Some(doc) => {
                doc.deleted_at = Some(quire_core::now_utc());
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

impl MemoryDocuments {
    fn with_tags(&self, tag_ids: &[TagId]) -> Vec<Document> {
        self.rows
            .borrow()
            .iter()
            .filter(|doc| doc.is_active())
            .filter(|doc| doc.tags.iter().any(|tag| tag_ids.contains(&tag.id)))
            .cloned()
            .collect()
    }

    fn write_count(&self) -> usize {
        *self.writes.borrow()
    }
}

/// Lookup double that also records every id batch it was asked for.
#[derive(Default)]
struct KnownTags {
    tags: Vec<Tag>,
    requests: RefCell<Vec<Vec<TagId>>>,
}

impl TagLookup for KnownTags {
    fn get_multiple(&self, ids: &[TagId]) -> ServiceResult<Vec<Tag>> {
        self.requests.borrow_mut().push(ids.to_vec());
        Ok(self
            .tags
            .iter()
            .filter(|tag| ids.contains(&tag.id))
            .cloned()
            .collect())
    }
}

#[derive(Default)]
struct KnownAttachments {
    attachments: Vec<Attachment>,
}

impl AttachmentLookup for KnownAttachments {
    fn get_multiple(&self, ids: &[AttachmentId]) -> ServiceResult<Vec<Attachment>> {
        Ok(self
            .attachments
            .iter()
            .filter(|attachment| ids.contains(&attachment.id))
            .cloned()
            .collect())
    }
}

fn service_with(
    tags: Vec<Tag>,
    attachments: Vec<Attachment>,
) -> DocumentService<MemoryDocuments, KnownTags, KnownAttachments> {
    DocumentService::new(
        MemoryDocuments::default(),
        KnownTags {
            tags,
            ..KnownTags::default()
        },
        KnownAttachments { attachments },
    )
}

#[test]
fn duplicate_tag_ids_are_collapsed_before_lookup() {
    let rust = Tag::new("rust");
    let repo = MemoryDocuments::default();
    let tags = KnownTags {
        tags: vec![rust.clone()],
        ..KnownTags::default()
    };
    let service = DocumentService::new(&repo, &tags, KnownAttachments::default());

    let created = service
        .create(NewDocument {
            title: "intro".to_string(),
            tag_ids: Some(vec![rust.id, rust.id, rust.id]),
            ..NewDocument::default()
        })
        .unwrap();

    assert_eq!(created.tag_ids(), vec![rust.id]);
    assert_eq!(tags.requests.borrow().as_slice(), &[vec![rust.id]]);
}

#[test]
fn missing_references_stop_before_any_write() {
    let repo = MemoryDocuments::default();
    let service = DocumentService::new(&repo, KnownTags::default(), KnownAttachments::default());
    let missing = Uuid::new_v4();

    let err = service
        .create(NewDocument {
            title: "intro".to_string(),
            tag_ids: Some(vec![missing]),
            ..NewDocument::default()
        })
        .unwrap_err();

    match err {
        ServiceError::MissingReferences { missing: ids, .. } => assert_eq!(ids, vec![missing]),
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(repo.write_count(), 0);
}

#[test]
fn omitted_and_empty_lists_do_not_replace_links() {
    let rust = Tag::new("rust");
    let image = Attachment::new("https://cdn.example.com/a.png", None);
    let repo = MemoryDocuments::default();
    let tags = KnownTags {
        tags: vec![rust.clone()],
        ..KnownTags::default()
    };
    let attachments = KnownAttachments {
        attachments: vec![image.clone()],
    };
    let service = DocumentService::new(&repo, &tags, &attachments);
    let doc = service
        .create(NewDocument {
            title: "intro".to_string(),
            tag_ids: Some(vec![rust.id]),
            attachment_ids: Some(vec![image.id]),
            ..NewDocument::default()
        })
        .unwrap();

    service
        .update(
            doc.id,
            DocumentChanges {
                tag_ids: Some(Vec::new()),
                ..DocumentChanges::default()
            },
        )
        .unwrap();
    assert_eq!(*repo.last_links.borrow(), Some(LinkReplacement::default()));

    let updated = service
        .update(
            doc.id,
            DocumentChanges {
                attachment_ids: Some(vec![image.id]),
                ..DocumentChanges::default()
            },
        )
        .unwrap();
    assert_eq!(
        *repo.last_links.borrow(),
        Some(LinkReplacement {
            tags: false,
            attachments: true,
        })
    );
    assert_eq!(updated.tag_ids(), vec![rust.id]);
}

#[test]
fn page_reports_resolved_limit_and_offset() {
    let service = service_with(Vec::new(), Vec::new());
    for title in ["a", "b", "c"] {
        service
            .create(NewDocument {
                title: title.to_string(),
                ..NewDocument::default()
            })
            .unwrap();
    }

    let page = service
        .get_all(&PageRequest {
            limit: Some(0),
            offset: Some(1),
            ..PageRequest::default()
        })
        .unwrap();
    assert_eq!(page.limit, quire_core::DOCUMENTS_DEFAULT_LIMIT);
    assert_eq!(page.offset, 1);
    assert_eq!(page.items.len(), 2);
    assert_eq!(page.total, 3);
}

#[test]
fn delete_of_unknown_document_is_ok() {
    let service = service_with(Vec::new(), Vec::new());
    service.delete(Uuid::new_v4()).unwrap();
}
