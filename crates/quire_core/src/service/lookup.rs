//! Capability traits the document service uses to resolve references.
//!
//! Lookups return the subset of live entities matching the given ids. They
//! do not check completeness; the document service does.

use super::error::ServiceResult;
use crate::model::attachment::{Attachment, AttachmentId};
use crate::model::tag::{Tag, TagId};

pub trait TagLookup {
    fn get_multiple(&self, ids: &[TagId]) -> ServiceResult<Vec<Tag>>;
}

pub trait AttachmentLookup {
    fn get_multiple(&self, ids: &[AttachmentId]) -> ServiceResult<Vec<Attachment>>;
}

impl<L: TagLookup + ?Sized> TagLookup for &L {
    fn get_multiple(&self, ids: &[TagId]) -> ServiceResult<Vec<Tag>> {
        (**self).get_multiple(ids)
    }
}

impl<L: AttachmentLookup + ?Sized> AttachmentLookup for &L {
    fn get_multiple(&self, ids: &[AttachmentId]) -> ServiceResult<Vec<Attachment>> {
        (**self).get_multiple(ids)
    }
}
