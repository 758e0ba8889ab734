//! Entity to view mapping. Pure and infallible.

use crate::views::{AttachmentView, DocumentPageView, DocumentView, TagView};
use chrono::{DateTime, SecondsFormat, Utc};
use quire_core::{Attachment, Document, DocumentPage, Tag};

/// Renders `2021-05-01T10:55:00.000Z`.
pub fn format_timestamp(value: DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Millis, true)
}

pub fn to_tag_view(tag: Tag) -> TagView {
    TagView {
        id: tag.id.to_string(),
        title: tag.title,
        created_at: format_timestamp(tag.created_at),
        updated_at: format_timestamp(tag.updated_at),
    }
}

pub fn to_attachment_view(attachment: Attachment) -> AttachmentView {
    AttachmentView {
        id: attachment.id.to_string(),
        title: attachment.title,
        url: attachment.url,
        created_at: format_timestamp(attachment.created_at),
        updated_at: format_timestamp(attachment.updated_at),
    }
}

pub fn to_document_view(document: Document) -> DocumentView {
    DocumentView {
        id: document.id.to_string(),
        title: document.title,
        body: document.body,
        created_at: format_timestamp(document.created_at),
        updated_at: format_timestamp(document.updated_at),
        tags: document.tags.into_iter().map(to_tag_view).collect(),
        attachments: document
            .attachments
            .into_iter()
            .map(to_attachment_view)
            .collect(),
    }
}

pub fn to_document_page_view(page: DocumentPage) -> DocumentPageView {
    DocumentPageView {
        items: page.items.into_iter().map(to_document_view).collect(),
        total: page.total,
        limit: page.limit,
        offset: page.offset,
    }
}
