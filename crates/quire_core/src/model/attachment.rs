//! Attachment domain model.
//!
//! # Invariants
//! - `url` is non-blank and unique among live attachments.
//! - `title` is optional; `None` is stored as SQL NULL.

use super::{check_timestamps, now_utc, ModelValidationError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type AttachmentId = Uuid;

/// External resource associable to many documents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    pub id: AttachmentId,
    pub title: Option<String>,
    pub url: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Attachment {
    pub fn new(url: impl Into<String>, title: Option<String>) -> Self {
        let now = now_utc();
        Self {
            id: Uuid::new_v4(),
            title,
            url: url.into(),
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }

    pub fn validate(&self) -> Result<(), ModelValidationError> {
        if self.url.trim().is_empty() {
            return Err(ModelValidationError::BlankAttachmentUrl);
        }
        check_timestamps(self.created_at, self.updated_at)
    }

    pub fn touch(&mut self) {
        self.updated_at = now_utc().max(self.created_at);
    }

    pub fn is_active(&self) -> bool {
        self.deleted_at.is_none()
    }
}
