//! Document domain model.
//!
//! # Responsibility
//! - Define the primary content record and its association sets.
//!
//! # Invariants
//! - A document does not own its tags or attachments; both sets are
//!   many-to-many references with no meaningful order.
//! - Association sets hold live entities only when read from storage.

use super::attachment::{Attachment, AttachmentId};
use super::tag::{Tag, TagId};
use super::{check_timestamps, now_utc, ModelValidationError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type DocumentId = Uuid;

/// Primary content entity with title/body and associated tags/attachments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub id: DocumentId,
    pub title: String,
    pub body: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
    pub tags: Vec<Tag>,
    pub attachments: Vec<Attachment>,
}

impl Document {
    /// Creates a live document without associations.
    pub fn new(title: impl Into<String>, body: impl Into<String>) -> Self {
        let now = now_utc();
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            body: body.into(),
            created_at: now,
            updated_at: now,
            deleted_at: None,
            tags: Vec::new(),
            attachments: Vec::new(),
        }
    }

    pub fn validate(&self) -> Result<(), ModelValidationError> {
        check_timestamps(self.created_at, self.updated_at)
    }

    pub fn touch(&mut self) {
        self.updated_at = now_utc().max(self.created_at);
    }

    pub fn is_active(&self) -> bool {
        self.deleted_at.is_none()
    }

    pub fn tag_ids(&self) -> Vec<TagId> {
        self.tags.iter().map(|tag| tag.id).collect()
    }

    pub fn attachment_ids(&self) -> Vec<AttachmentId> {
        self.attachments.iter().map(|attachment| attachment.id).collect()
    }
}
