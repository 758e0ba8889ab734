//! Tag domain model.
//!
//! # Invariants
//! - `title` is non-blank; uniqueness among live tags is enforced by the
//!   service pre-check and a partial unique index.

use super::{check_timestamps, now_utc, ModelValidationError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type TagId = Uuid;

/// Labeled category attachable to many documents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub id: TagId,
    pub title: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Soft-delete tombstone. `None` for live tags.
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Tag {
    /// Creates a live tag with a generated id and current timestamps.
    pub fn new(title: impl Into<String>) -> Self {
        Self::with_id(Uuid::new_v4(), title)
    }

    /// Creates a live tag with a caller-provided id.
    pub fn with_id(id: TagId, title: impl Into<String>) -> Self {
        let now = now_utc();
        Self {
            id,
            title: title.into(),
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }

    pub fn validate(&self) -> Result<(), ModelValidationError> {
        if self.title.trim().is_empty() {
            return Err(ModelValidationError::BlankTagTitle);
        }
        check_timestamps(self.created_at, self.updated_at)
    }

    /// Refreshes `updated_at`, never moving it before `created_at`.
    pub fn touch(&mut self) {
        self.updated_at = now_utc().max(self.created_at);
    }

    pub fn is_active(&self) -> bool {
        self.deleted_at.is_none()
    }
}
