//! Serializable view models returned to the gateway.
//!
//! Field names serialize in camelCase. Ids are hyphenated UUID strings and
//! timestamps are RFC 3339 UTC strings with millisecond precision.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TagView {
    pub id: String,
    pub title: String,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttachmentView {
    pub id: String,
    pub title: Option<String>,
    pub url: String,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentView {
    pub id: String,
    pub title: String,
    pub body: String,
    pub created_at: String,
    pub updated_at: String,
    pub tags: Vec<TagView>,
    pub attachments: Vec<AttachmentView>,
}

/// One listing page. `total` counts every match, not just `items`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentPageView {
    pub items: Vec<DocumentView>,
    pub total: u64,
    pub limit: u32,
    pub offset: u32,
}
