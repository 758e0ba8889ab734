//! Tag use-case service.
//!
//! # Responsibility
//! - Provide tag CRUD entry points with existence and uniqueness checks.
//! - Serve as the `TagLookup` used by the document service.
//!
//! # Invariants
//! - Titles are trimmed before any check or write.
//! - A title is unique among live tags on create AND on update.
//! - `get_multiple` never fails because of unmatched ids.

use super::error::{EntityKind, ServiceError, ServiceResult};
use super::lookup::TagLookup;
use crate::model::tag::{Tag, TagId};
use crate::repo::tag_repo::TagRepository;
use log::{info, warn};

/// Tag service facade over repository implementations.
pub struct TagService<R: TagRepository> {
    repo: R,
}

impl<R: TagRepository> TagService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Lists all live tags.
    pub fn get_all(&self) -> ServiceResult<Vec<Tag>> {
        Ok(self.repo.list_tags()?)
    }

    /// Gets one live tag, failing with `NotFound` when absent.
    pub fn get(&self, id: TagId) -> ServiceResult<Tag> {
        self.repo
            .get_tag(id, false)?
            .ok_or_else(|| ServiceError::not_found(EntityKind::Tag, id))
    }

    /// Finds a live tag by title. Absence is not an error.
    pub fn get_by_title(&self, title: &str) -> ServiceResult<Option<Tag>> {
        Ok(self.repo.get_tag_by_title(title.trim())?)
    }

    /// Returns the live tags matching `ids`; unmatched ids are omitted.
    pub fn get_multiple(&self, ids: &[TagId]) -> ServiceResult<Vec<Tag>> {
        Ok(self.repo.get_tags(ids)?)
    }

    /// Creates a tag with a unique, non-blank title.
    pub fn create(&self, title: &str) -> ServiceResult<Tag> {
        let title = normalize_title(title)?;
        if self.repo.get_tag_by_title(title)?.is_some() {
            warn!("event=tag_create module=tag_service status=rejected reason=duplicate_title");
            return Err(duplicate_title(title));
        }

        let tag = Tag::new(title);
        let tag_id = self
            .repo
            .create_tag(&tag)
            .map_err(|err| ServiceError::from_write(err, EntityKind::Tag, "title", title))?;
        info!("event=tag_create module=tag_service status=ok tag_id={tag_id}");

        self.repo
            .get_tag(tag_id, false)?
            .ok_or(ServiceError::InconsistentState(
                "created tag not found in read-back",
            ))
    }

    /// Renames a live tag. The new title must not belong to another live tag.
    pub fn update(&self, id: TagId, title: &str) -> ServiceResult<Tag> {
        let title = normalize_title(title)?;
        let mut tag = self.get(id)?;

        if let Some(existing) = self.repo.get_tag_by_title(title)? {
            if existing.id != id {
                warn!(
                    "event=tag_update module=tag_service status=rejected reason=duplicate_title tag_id={id}"
                );
                return Err(duplicate_title(title));
            }
        }

        tag.title = title.to_string();
        tag.touch();
        self.repo
            .update_tag(&tag)
            .map_err(|err| ServiceError::from_write(err, EntityKind::Tag, "title", title))?;
        info!("event=tag_update module=tag_service status=ok tag_id={id}");

        self.repo
            .get_tag(id, false)?
            .ok_or(ServiceError::InconsistentState(
                "updated tag not found in read-back",
            ))
    }

    /// Soft-deletes a tag. Missing or already deleted ids are not an error.
    pub fn delete(&self, id: TagId) -> ServiceResult<()> {
        let removed = self.repo.soft_delete_tag(id)?;
        info!("event=tag_delete module=tag_service status=ok tag_id={id} removed={removed}");
        Ok(())
    }
}

impl<R: TagRepository> TagLookup for TagService<R> {
    fn get_multiple(&self, ids: &[TagId]) -> ServiceResult<Vec<Tag>> {
        TagService::get_multiple(self, ids)
    }
}

fn normalize_title(title: &str) -> ServiceResult<&str> {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        warn!("event=tag_write module=tag_service status=rejected reason=blank_title");
        return Err(ServiceError::InvalidInput(
            "tag title must not be blank".to_string(),
        ));
    }
    Ok(trimmed)
}

fn duplicate_title(title: &str) -> ServiceError {
    ServiceError::Duplicate {
        entity: EntityKind::Tag,
        field: "title",
        value: title.to_string(),
    }
}
