//! Query and mutation entry points for the gateway.
//!
//! # Responsibility
//! - Parse string ids and gateway inputs into core types.
//! - Call the SQLite-backed services over one borrowed connection.
//! - Map results to views and tag failures with the operation name.
//!
//! # Invariants
//! - A malformed id fails before any service call.
//! - Delete mutations answer `true` whether or not a row changed.

use crate::inputs::{
    DocumentsArgs, NewAttachment, NewDocument, NewTag, UpdateAttachment, UpdateDocument,
    UpdateTag,
};
use crate::transformer::{
    to_attachment_view, to_document_page_view, to_document_view, to_tag_view,
};
use crate::views::{AttachmentView, DocumentPageView, DocumentView, TagView};
use log::warn;
use quire_core::{
    AttachmentService, DocumentChanges, DocumentService, PageRequest, RepoError, ServiceError,
    SqliteAttachmentRepository, SqliteDocumentRepository, SqliteTagRepository, TagService,
};
use rusqlite::Connection;
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug)]
pub enum ApiError {
    /// An id argument is not a UUID.
    InvalidId { value: String, source: uuid::Error },
    /// Repositories could not be built over the connection.
    Setup(RepoError),
    Service {
        operation: &'static str,
        source: ServiceError,
    },
}

impl ApiError {
    /// Underlying service error, when the failure came from a service call.
    pub fn service_error(&self) -> Option<&ServiceError> {
        match self {
            Self::Service { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl Display for ApiError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidId { value, source } => write!(f, "invalid id `{value}`: {source}"),
            Self::Setup(err) => write!(f, "resolver setup failed: {err}"),
            Self::Service { operation, source } => write!(f, "{operation} failed: {source}"),
        }
    }
}

impl Error for ApiError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidId { source, .. } => Some(source),
            Self::Setup(err) => Some(err),
            Self::Service { source, .. } => Some(source),
        }
    }
}

type SqliteDocumentService<'a, 'conn> = DocumentService<
    SqliteDocumentRepository<'conn>,
    &'a TagService<SqliteTagRepository<'conn>>,
    &'a AttachmentService<SqliteAttachmentRepository<'conn>>,
>;

/// Resolver facade bundling the three services over one connection.
pub struct Resolver<'conn> {
    tags: TagService<SqliteTagRepository<'conn>>,
    attachments: AttachmentService<SqliteAttachmentRepository<'conn>>,
    documents: SqliteDocumentRepository<'conn>,
}

impl<'conn> Resolver<'conn> {
    /// Builds the services. The connection must carry the current schema.
    pub fn new(conn: &'conn Connection) -> ApiResult<Self> {
        Ok(Self {
            tags: TagService::new(SqliteTagRepository::try_new(conn).map_err(ApiError::Setup)?),
            attachments: AttachmentService::new(
                SqliteAttachmentRepository::try_new(conn).map_err(ApiError::Setup)?,
            ),
            documents: SqliteDocumentRepository::try_new(conn).map_err(ApiError::Setup)?,
        })
    }

    pub fn tags(&self) -> ApiResult<Vec<TagView>> {
        let tags = self.tags.get_all().map_err(failed("tag_list"))?;
        Ok(tags.into_iter().map(to_tag_view).collect())
    }

    pub fn tag(&self, id: &str) -> ApiResult<TagView> {
        let id = parse_id(id)?;
        self.tags
            .get(id)
            .map(to_tag_view)
            .map_err(failed("tag_get"))
    }

    pub fn create_tag(&self, input: NewTag) -> ApiResult<TagView> {
        self.tags
            .create(&input.title)
            .map(to_tag_view)
            .map_err(failed("tag_create"))
    }

    pub fn update_tag(&self, input: UpdateTag) -> ApiResult<TagView> {
        let id = parse_id(&input.id)?;
        self.tags
            .update(id, &input.title)
            .map(to_tag_view)
            .map_err(failed("tag_update"))
    }

    pub fn delete_tag(&self, id: &str) -> ApiResult<bool> {
        let id = parse_id(id)?;
        self.tags.delete(id).map_err(failed("tag_delete"))?;
        Ok(true)
    }

    pub fn documents(&self, args: DocumentsArgs) -> ApiResult<DocumentPageView> {
        self.document_service()
            .get_all(&page_request(args))
            .map(to_document_page_view)
            .map_err(failed("document_list"))
    }

    /// Lists documents linked to any of `tag_ids`.
    pub fn documents_by_tag(
        &self,
        tag_ids: &[String],
        args: DocumentsArgs,
    ) -> ApiResult<DocumentPageView> {
        let tag_ids = parse_ids(tag_ids)?;
        self.document_service()
            .get_all_by_tag(&tag_ids, &page_request(args))
            .map(to_document_page_view)
            .map_err(failed("document_list_by_tag"))
    }

    pub fn document(&self, id: &str) -> ApiResult<DocumentView> {
        let id = parse_id(id)?;
        self.document_service()
            .get(id)
            .map(to_document_view)
            .map_err(failed("document_get"))
    }

    pub fn create_document(&self, input: NewDocument) -> ApiResult<DocumentView> {
        let draft = quire_core::NewDocument {
            title: input.title,
            body: input.body,
            tag_ids: parse_optional_ids(input.tag_ids.as_deref())?,
            attachment_ids: parse_optional_ids(input.attachment_ids.as_deref())?,
        };
        self.document_service()
            .create(draft)
            .map(to_document_view)
            .map_err(failed("document_create"))
    }

    pub fn update_document(&self, input: UpdateDocument) -> ApiResult<DocumentView> {
        let id = parse_id(&input.id)?;
        let changes = DocumentChanges {
            title: input.title,
            body: input.body,
            tag_ids: parse_optional_ids(input.tag_ids.as_deref())?,
            attachment_ids: parse_optional_ids(input.attachment_ids.as_deref())?,
        };
        self.document_service()
            .update(id, changes)
            .map(to_document_view)
            .map_err(failed("document_update"))
    }

    pub fn delete_document(&self, id: &str) -> ApiResult<bool> {
        let id = parse_id(id)?;
        self.document_service()
            .delete(id)
            .map_err(failed("document_delete"))?;
        Ok(true)
    }

    pub fn attachment(&self, id: &str) -> ApiResult<AttachmentView> {
        let id = parse_id(id)?;
        self.attachments
            .get(id)
            .map(to_attachment_view)
            .map_err(failed("attachment_get"))
    }

    pub fn create_attachment(&self, input: NewAttachment) -> ApiResult<AttachmentView> {
        self.attachments
            .create(&input.url, input.title)
            .map(to_attachment_view)
            .map_err(failed("attachment_create"))
    }

    pub fn update_attachment(&self, input: UpdateAttachment) -> ApiResult<AttachmentView> {
        let id = parse_id(&input.id)?;
        self.attachments
            .update(id, &input.url, input.title)
            .map(to_attachment_view)
            .map_err(failed("attachment_update"))
    }

    pub fn delete_attachment(&self, id: &str) -> ApiResult<bool> {
        let id = parse_id(id)?;
        self.attachments
            .delete(id)
            .map_err(failed("attachment_delete"))?;
        Ok(true)
    }

    fn document_service(&self) -> SqliteDocumentService<'_, 'conn> {
        DocumentService::new(self.documents, &self.tags, &self.attachments)
    }
}

fn page_request(args: DocumentsArgs) -> PageRequest {
    PageRequest {
        limit: args.limit,
        offset: args.offset,
        sort_by: args.sort_by,
        sort_descending: args.sort_descending,
    }
}

fn failed(operation: &'static str) -> impl Fn(ServiceError) -> ApiError {
    move |source| {
        warn!(
            "event={operation} module=resolver status=error kind={:?}",
            source.kind()
        );
        ApiError::Service { operation, source }
    }
}

fn parse_id(value: &str) -> ApiResult<Uuid> {
    Uuid::parse_str(value.trim()).map_err(|source| {
        warn!("event=parse_id module=resolver status=rejected reason=malformed_id");
        ApiError::InvalidId {
            value: value.to_string(),
            source,
        }
    })
}

fn parse_ids(values: &[String]) -> ApiResult<Vec<Uuid>> {
    values.iter().map(|value| parse_id(value)).collect()
}

fn parse_optional_ids(values: Option<&[String]>) -> ApiResult<Option<Vec<Uuid>>> {
    values.map(parse_ids).transpose()
}

#[cfg(test)]
mod tests {
    use super::{parse_id, parse_optional_ids, ApiError};
    use quire_core::{EntityKind, ServiceError};
    use uuid::Uuid;

    #[test]
    fn parse_id_trims_and_rejects_garbage() {
        let id = Uuid::new_v4();
        assert_eq!(parse_id(&format!(" {id} ")).expect("valid id"), id);
        assert!(matches!(
            parse_id("not-a-uuid"),
            Err(ApiError::InvalidId { .. })
        ));
    }

    #[test]
    fn optional_ids_stay_absent() {
        assert_eq!(parse_optional_ids(None).expect("none"), None);
        let bad = vec!["nope".to_string()];
        assert!(parse_optional_ids(Some(&bad)).is_err());
    }

    #[test]
    fn service_failure_message_names_operation() {
        let id = Uuid::new_v4();
        let err = ApiError::Service {
            operation: "tag_create",
            source: ServiceError::NotFound {
                entity: EntityKind::Tag,
                id,
            },
        };
        assert_eq!(err.to_string(), format!("tag_create failed: tag not found: {id}"));
    }
}
