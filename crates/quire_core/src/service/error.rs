//! Service-layer error taxonomy.
//!
//! Every variant maps onto one of four caller-facing kinds (see [`ErrorKind`]):
//! not found, conflict, validation failure and store failure.

use crate::repo::RepoError;
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Entity family named in error messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Tag,
    Document,
    Attachment,
}

impl EntityKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Tag => "tag",
            Self::Document => "document",
            Self::Attachment => "attachment",
        }
    }
}

impl Display for EntityKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Coarse classification callers branch on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    Conflict,
    ValidationFailed,
    StoreFailure,
}

#[derive(Debug)]
pub enum ServiceError {
    /// Requested id does not resolve to a live entity.
    NotFound { entity: EntityKind, id: Uuid },
    /// A live entity already owns the unique value.
    Duplicate {
        entity: EntityKind,
        field: &'static str,
        value: String,
    },
    /// Some referenced ids did not resolve; nothing was written.
    MissingReferences {
        entity: EntityKind,
        missing: Vec<Uuid>,
    },
    /// Input rejected before reaching storage.
    InvalidInput(String),
    /// Persistence-layer failure.
    Repo(RepoError),
    /// Write succeeded but read-back disagrees.
    InconsistentState(&'static str),
}

impl ServiceError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::Duplicate { .. } => ErrorKind::Conflict,
            Self::MissingReferences { .. } | Self::InvalidInput(_) => ErrorKind::ValidationFailed,
            Self::Repo(_) | Self::InconsistentState(_) => ErrorKind::StoreFailure,
        }
    }

    pub(crate) fn not_found(entity: EntityKind, id: Uuid) -> Self {
        Self::NotFound { entity, id }
    }

    /// Maps a repository write failure, attributing unique violations to `field`.
    pub(crate) fn from_write(
        err: RepoError,
        entity: EntityKind,
        field: &'static str,
        value: &str,
    ) -> Self {
        match err {
            RepoError::UniqueViolation(_) => Self::Duplicate {
                entity,
                field,
                value: value.to_string(),
            },
            RepoError::NotFound(id) => Self::NotFound { entity, id },
            other => other.into(),
        }
    }
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound { entity, id } => write!(f, "{entity} not found: {id}"),
            Self::Duplicate {
                entity,
                field,
                value,
            } => write!(f, "{entity} with {field} `{value}` already exists"),
            Self::MissingReferences { entity, missing } => {
                let ids = missing
                    .iter()
                    .map(Uuid::to_string)
                    .collect::<Vec<_>>()
                    .join(", ");
                write!(f, "some {entity}s do not exist: {ids}")
            }
            Self::InvalidInput(message) => write!(f, "invalid input: {message}"),
            Self::Repo(err) => write!(f, "{err}"),
            Self::InconsistentState(details) => write!(f, "inconsistent state: {details}"),
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for ServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::Validation(err) => Self::InvalidInput(err.to_string()),
            other => Self::Repo(other),
        }
    }
}
