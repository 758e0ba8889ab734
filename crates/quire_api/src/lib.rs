//! API-facing layer for the quire content backend.
//!
//! The external gateway calls [`Resolver`]; it deals in string ids and
//! serializable view models and never sees storage types.

pub mod inputs;
pub mod resolver;
pub mod transformer;
pub mod views;

pub use inputs::{
    DocumentsArgs, NewAttachment, NewDocument, NewTag, UpdateAttachment, UpdateDocument,
    UpdateTag,
};
pub use resolver::{ApiError, ApiResult, Resolver};
pub use views::{AttachmentView, DocumentPageView, DocumentView, TagView};
