//! Content domain model for tags, documents and attachments.
//!
//! # Responsibility
//! - Define canonical records used by repositories and services.
//! - Provide write-path validation and soft-delete helpers.
//!
//! # Invariants
//! - Every entity is identified by a stable UUID that is never reused.
//! - Deletion is represented by a `deleted_at` tombstone, not hard delete.
//! - Timestamps are UTC and truncated to millisecond precision so they
//!   survive a storage round-trip unchanged.

pub mod attachment;
pub mod document;
pub mod tag;

use chrono::{DateTime, SubsecRound, Utc};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Returns the current UTC time at storage precision (milliseconds).
pub fn now_utc() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(3)
}

/// Write-path validation failures shared by all entity records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelValidationError {
    /// Tag title is empty after trim.
    BlankTagTitle,
    /// Attachment URL is empty after trim.
    BlankAttachmentUrl,
    /// `updated_at` precedes `created_at`.
    TimestampOrder,
}

impl Display for ModelValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankTagTitle => write!(f, "tag title must not be blank"),
            Self::BlankAttachmentUrl => write!(f, "attachment url must not be blank"),
            Self::TimestampOrder => write!(f, "updated_at must not be earlier than created_at"),
        }
    }
}

impl Error for ModelValidationError {}

pub(crate) fn check_timestamps(
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
) -> Result<(), ModelValidationError> {
    if updated_at < created_at {
        return Err(ModelValidationError::TimestampOrder);
    }
    Ok(())
}
