//! Document use-case service.
//!
//! # Responsibility
//! - Resolve tag/attachment references before any document write.
//! - Normalize paging and ordering requests for listings.
//! - Apply partial updates with replace semantics for link sets.
//!
//! # Invariants
//! - A write that names an unknown tag or attachment persists nothing.
//! - Duplicate ids in one request are collapsed before resolution.
//! - An omitted or empty id list on update leaves that link set untouched.

use super::error::{EntityKind, ServiceError, ServiceResult};
use super::lookup::{AttachmentLookup, TagLookup};
use crate::model::attachment::{Attachment, AttachmentId};
use crate::model::document::{Document, DocumentId};
use crate::model::tag::{Tag, TagId};
use crate::repo::document_repo::{
    DocumentListQuery, DocumentRepository, LinkReplacement, SortColumn, DOCUMENTS_DEFAULT_LIMIT,
};
use crate::repo::RepoError;
use log::{info, warn};
use std::collections::HashSet;
use uuid::Uuid;

/// Caller-facing paging and ordering request.
///
/// `limit` of `None` or `Some(0)` means the default page size.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageRequest {
    pub limit: Option<u32>,
    pub offset: Option<u32>,
    pub sort_by: Option<String>,
    /// Descending unless explicitly `Some(false)`.
    pub sort_descending: Option<bool>,
}

impl PageRequest {
    fn to_query(&self) -> ServiceResult<DocumentListQuery> {
        let sort_by = match self.sort_by.as_deref() {
            None => SortColumn::default(),
            Some(name) => SortColumn::parse(name).ok_or_else(|| {
                warn!("event=document_list module=document_service status=rejected reason=unknown_sort_column");
                ServiceError::InvalidInput(format!("unknown sort column `{name}`"))
            })?,
        };
        Ok(DocumentListQuery {
            limit: self
                .limit
                .filter(|limit| *limit > 0)
                .unwrap_or(DOCUMENTS_DEFAULT_LIMIT),
            offset: self.offset.unwrap_or(0),
            sort_by,
            descending: self.sort_descending.unwrap_or(true),
        })
    }
}

/// One page of documents plus the unpaginated total.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentPage {
    pub items: Vec<Document>,
    pub total: u64,
    pub limit: u32,
    pub offset: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewDocument {
    pub title: String,
    pub body: String,
    pub tag_ids: Option<Vec<TagId>>,
    pub attachment_ids: Option<Vec<AttachmentId>>,
}

/// Partial update. `None` fields keep the stored value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentChanges {
    pub title: Option<String>,
    pub body: Option<String>,
    pub tag_ids: Option<Vec<TagId>>,
    pub attachment_ids: Option<Vec<AttachmentId>>,
}

pub struct DocumentService<R, T, A>
where
    R: DocumentRepository,
    T: TagLookup,
    A: AttachmentLookup,
{
    repo: R,
    tags: T,
    attachments: A,
}

impl<R, T, A> DocumentService<R, T, A>
where
    R: DocumentRepository,
    T: TagLookup,
    A: AttachmentLookup,
{
    pub fn new(repo: R, tags: T, attachments: A) -> Self {
        Self {
            repo,
            tags,
            attachments,
        }
    }

    pub fn get(&self, id: DocumentId) -> ServiceResult<Document> {
        self.repo
            .get_document(id, false)?
            .ok_or_else(|| ServiceError::not_found(EntityKind::Document, id))
    }

    /// Lists live documents with their associations.
    pub fn get_all(&self, page: &PageRequest) -> ServiceResult<DocumentPage> {
        let query = page.to_query()?;
        let items = self.repo.list_documents(&query)?;
        let total = self.repo.count_documents()?;
        Ok(DocumentPage {
            items,
            total,
            limit: query.limit,
            offset: query.offset,
        })
    }

    /// Lists live documents linked to any of `tag_ids`, each document once.
    pub fn get_all_by_tag(
        &self,
        tag_ids: &[TagId],
        page: &PageRequest,
    ) -> ServiceResult<DocumentPage> {
        let query = page.to_query()?;
        let tag_ids = dedup_ids(tag_ids);
        let items = self.repo.list_documents_with_tags(&tag_ids, &query)?;
        let total = self.repo.count_documents_with_tags(&tag_ids)?;
        Ok(DocumentPage {
            items,
            total,
            limit: query.limit,
            offset: query.offset,
        })
    }

    /// Creates a document after resolving every referenced tag and attachment.
    pub fn create(&self, input: NewDocument) -> ServiceResult<Document> {
        let mut document = Document::new(input.title.trim(), input.body);
        if let Some(ids) = non_empty(input.tag_ids.as_deref()) {
            document.tags = self.resolve_tags(ids)?;
        }
        if let Some(ids) = non_empty(input.attachment_ids.as_deref()) {
            document.attachments = self.resolve_attachments(ids)?;
        }

        let document_id = self.repo.create_document(&document)?;
        info!(
            "event=document_create module=document_service status=ok document_id={document_id} tag_count={} attachment_count={}",
            document.tags.len(),
            document.attachments.len()
        );

        self.repo
            .get_document(document_id, false)?
            .ok_or(ServiceError::InconsistentState(
                "created document not found in read-back",
            ))
    }

    /// Applies supplied fields; non-empty id lists replace the whole link set.
    pub fn update(&self, id: DocumentId, changes: DocumentChanges) -> ServiceResult<Document> {
        let mut document = self.get(id)?;
        let mut links = LinkReplacement::default();

        if let Some(title) = changes.title {
            document.title = title.trim().to_string();
        }
        if let Some(body) = changes.body {
            document.body = body;
        }
        if let Some(ids) = non_empty(changes.tag_ids.as_deref()) {
            document.tags = self.resolve_tags(ids)?;
            links.tags = true;
        }
        if let Some(ids) = non_empty(changes.attachment_ids.as_deref()) {
            document.attachments = self.resolve_attachments(ids)?;
            links.attachments = true;
        }

        document.touch();
        self.repo
            .update_document(&document, links)
            .map_err(|err| match err {
                RepoError::NotFound(id) => ServiceError::not_found(EntityKind::Document, id),
                other => other.into(),
            })?;
        info!(
            "event=document_update module=document_service status=ok document_id={id} replace_tags={} replace_attachments={}",
            links.tags, links.attachments
        );

        self.repo
            .get_document(id, false)?
            .ok_or(ServiceError::InconsistentState(
                "updated document not found in read-back",
            ))
    }

    /// Soft-deletes a document. Tags and attachments are not touched.
    pub fn delete(&self, id: DocumentId) -> ServiceResult<()> {
        let removed = self.repo.soft_delete_document(id)?;
        info!(
            "event=document_delete module=document_service status=ok document_id={id} removed={removed}"
        );
        Ok(())
    }

    fn resolve_tags(&self, ids: &[TagId]) -> ServiceResult<Vec<Tag>> {
        let ids = dedup_ids(ids);
        let tags = self.tags.get_multiple(&ids)?;
        ensure_complete(EntityKind::Tag, &ids, tags.iter().map(|tag| tag.id))?;
        Ok(tags)
    }

    fn resolve_attachments(&self, ids: &[AttachmentId]) -> ServiceResult<Vec<Attachment>> {
        let ids = dedup_ids(ids);
        let attachments = self.attachments.get_multiple(&ids)?;
        ensure_complete(
            EntityKind::Attachment,
            &ids,
            attachments.iter().map(|attachment| attachment.id),
        )?;
        Ok(attachments)
    }
}

fn non_empty<T>(ids: Option<&[T]>) -> Option<&[T]> {
    ids.filter(|ids| !ids.is_empty())
}

/// Collapses repeated ids, keeping first-seen order.
fn dedup_ids(ids: &[Uuid]) -> Vec<Uuid> {
    let mut seen = HashSet::with_capacity(ids.len());
    ids.iter().copied().filter(|id| seen.insert(*id)).collect()
}

fn ensure_complete(
    entity: EntityKind,
    requested: &[Uuid],
    found: impl Iterator<Item = Uuid>,
) -> ServiceResult<()> {
    let found: HashSet<Uuid> = found.collect();
    let missing: Vec<Uuid> = requested
        .iter()
        .copied()
        .filter(|id| !found.contains(id))
        .collect();
    if missing.is_empty() {
        return Ok(());
    }

    warn!(
        "event=document_write module=document_service status=rejected reason=missing_references entity={entity} missing_count={}",
        missing.len()
    );
    Err(ServiceError::MissingReferences { entity, missing })
}
