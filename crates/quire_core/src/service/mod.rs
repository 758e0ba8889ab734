//! Core use-case services.
//!
//! # Responsibility
//! - Apply business rules on top of repository contracts: existence checks,
//!   uniqueness pre-checks, cross-entity reference validation and
//!   partial-update semantics.
//! - Translate repository "absent" results into explicit `NotFound` errors.
//!
//! # Invariants
//! - Services depend on repository and lookup traits only, never on SQLite.
//! - Validation always completes before the first write of an operation.

pub mod attachment_service;
pub mod document_service;
pub mod error;
pub mod lookup;
pub mod tag_service;
