//! Core domain logic for the quire content backend.
//! This crate owns the business invariants for tags, documents and attachments.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use config::{CmsConfig, ConfigError};
pub use db::{open_db, open_db_in_memory, open_db_with, DbError, DbResult};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::attachment::{Attachment, AttachmentId};
pub use model::document::{Document, DocumentId};
pub use model::tag::{Tag, TagId};
pub use model::{now_utc, ModelValidationError};
pub use repo::attachment_repo::{AttachmentRepository, SqliteAttachmentRepository};
pub use repo::document_repo::{
    DocumentListQuery, DocumentRepository, LinkReplacement, SortColumn, SqliteDocumentRepository,
    DOCUMENTS_DEFAULT_LIMIT,
};
pub use repo::tag_repo::{SqliteTagRepository, TagRepository};
pub use repo::{RepoError, RepoResult};
pub use service::attachment_service::AttachmentService;
pub use service::document_service::{
    DocumentChanges, DocumentPage, DocumentService, NewDocument, PageRequest,
};
pub use service::error::{EntityKind, ErrorKind, ServiceError, ServiceResult};
pub use service::lookup::{AttachmentLookup, TagLookup};
pub use service::tag_service::TagService;

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
