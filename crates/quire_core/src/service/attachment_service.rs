//! Attachment use-case service.
//!
//! # Invariants
//! - URLs are trimmed and must be non-blank.
//! - A URL is unique among live attachments on create and on update.
//! - An omitted title on update keeps the stored title.

use super::error::{EntityKind, ServiceError, ServiceResult};
use super::lookup::AttachmentLookup;
use crate::model::attachment::{Attachment, AttachmentId};
use crate::repo::attachment_repo::AttachmentRepository;
use log::{info, warn};

pub struct AttachmentService<R: AttachmentRepository> {
    repo: R,
}

impl<R: AttachmentRepository> AttachmentService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    pub fn get(&self, id: AttachmentId) -> ServiceResult<Attachment> {
        self.repo
            .get_attachment(id, false)?
            .ok_or_else(|| ServiceError::not_found(EntityKind::Attachment, id))
    }

    pub fn get_multiple(&self, ids: &[AttachmentId]) -> ServiceResult<Vec<Attachment>> {
        Ok(self.repo.get_attachments(ids)?)
    }

    /// Registers a new attachment URL.
    pub fn create(&self, url: &str, title: Option<String>) -> ServiceResult<Attachment> {
        let url = normalize_url(url)?;
        if self.repo.get_attachment_by_url(url)?.is_some() {
            warn!("event=attachment_create module=attachment_service status=rejected reason=duplicate_url");
            return Err(duplicate_url(url));
        }

        let attachment = Attachment::new(url, title);
        let attachment_id = self
            .repo
            .create_attachment(&attachment)
            .map_err(|err| ServiceError::from_write(err, EntityKind::Attachment, "url", url))?;
        info!(
            "event=attachment_create module=attachment_service status=ok attachment_id={attachment_id}"
        );

        self.repo
            .get_attachment(attachment_id, false)?
            .ok_or(ServiceError::InconsistentState(
                "created attachment not found in read-back",
            ))
    }

    /// Rewrites the URL and, when supplied, the title of a live attachment.
    pub fn update(
        &self,
        id: AttachmentId,
        url: &str,
        title: Option<String>,
    ) -> ServiceResult<Attachment> {
        let url = normalize_url(url)?;
        let mut attachment = self.get(id)?;

        if let Some(existing) = self.repo.get_attachment_by_url(url)? {
            if existing.id != id {
                warn!(
                    "event=attachment_update module=attachment_service status=rejected reason=duplicate_url attachment_id={id}"
                );
                return Err(duplicate_url(url));
            }
        }

        attachment.url = url.to_string();
        if title.is_some() {
            attachment.title = title;
        }
        attachment.touch();
        self.repo
            .update_attachment(&attachment)
            .map_err(|err| ServiceError::from_write(err, EntityKind::Attachment, "url", url))?;
        info!("event=attachment_update module=attachment_service status=ok attachment_id={id}");

        self.repo
            .get_attachment(id, false)?
            .ok_or(ServiceError::InconsistentState(
                "updated attachment not found in read-back",
            ))
    }

    pub fn delete(&self, id: AttachmentId) -> ServiceResult<()> {
        let removed = self.repo.soft_delete_attachment(id)?;
        info!(
            "event=attachment_delete module=attachment_service status=ok attachment_id={id} removed={removed}"
        );
        Ok(())
    }
}

impl<R: AttachmentRepository> AttachmentLookup for AttachmentService<R> {
    fn get_multiple(&self, ids: &[AttachmentId]) -> ServiceResult<Vec<Attachment>> {
        AttachmentService::get_multiple(self, ids)
    }
}

fn normalize_url(url: &str) -> ServiceResult<&str> {
    let trimmed = url.trim();
    if trimmed.is_empty() {
        warn!("event=attachment_write module=attachment_service status=rejected reason=blank_url");
        return Err(ServiceError::InvalidInput(
            "attachment url must not be blank".to_string(),
        ));
    }
    Ok(trimmed)
}

fn duplicate_url(url: &str) -> ServiceError {
    ServiceError::Duplicate {
        entity: EntityKind::Attachment,
        field: "url",
        value: url.to_string(),
    }
}
