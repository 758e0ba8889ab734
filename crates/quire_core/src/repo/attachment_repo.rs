//! Attachment repository contract and SQLite implementation.
//!
//! # Invariants
//! - All reads are constrained to live rows unless `include_deleted` is set.
//! - `get_attachments` silently omits ids with no live match.

use super::{
    ensure_tables, id_list_json, parse_millis, parse_optional_millis, parse_uuid, to_millis,
    RepoError, RepoResult, ID_LIST_SQL,
};
use crate::model::attachment::{Attachment, AttachmentId};
use crate::model::now_utc;
use rusqlite::{params, Connection, Row};

const ATTACHMENT_SELECT_SQL: &str = "SELECT
    id,
    title,
    url,
    created_at,
    updated_at,
    deleted_at
FROM attachments";

/// Repository interface for attachment persistence.
pub trait AttachmentRepository {
    fn get_attachment(
        &self,
        id: AttachmentId,
        include_deleted: bool,
    ) -> RepoResult<Option<Attachment>>;
    /// Finds the live attachment registered under `url`.
    fn get_attachment_by_url(&self, url: &str) -> RepoResult<Option<Attachment>>;
    fn get_attachments(&self, ids: &[AttachmentId]) -> RepoResult<Vec<Attachment>>;
    fn create_attachment(&self, attachment: &Attachment) -> RepoResult<AttachmentId>;
    fn update_attachment(&self, attachment: &Attachment) -> RepoResult<()>;
    fn soft_delete_attachment(&self, id: AttachmentId) -> RepoResult<bool>;
}

/// SQLite-backed attachment repository.
#[derive(Clone, Copy)]
pub struct SqliteAttachmentRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteAttachmentRepository<'conn> {
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_tables(conn, &["attachments"])?;
        Ok(Self { conn })
    }
}

impl AttachmentRepository for SqliteAttachmentRepository<'_> {
    fn get_attachment(
        &self,
        id: AttachmentId,
        include_deleted: bool,
    ) -> RepoResult<Option<Attachment>> {
        let mut stmt = self.conn.prepare(&format!(
            "{ATTACHMENT_SELECT_SQL}
             WHERE id = ?1
               AND (?2 = 1 OR deleted_at IS NULL);"
        ))?;
        let mut rows = stmt.query(params![id.to_string(), include_deleted])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_attachment_row(row)?));
        }
        Ok(None)
    }

    fn get_attachment_by_url(&self, url: &str) -> RepoResult<Option<Attachment>> {
        let mut stmt = self.conn.prepare(&format!(
            "{ATTACHMENT_SELECT_SQL}
             WHERE url = ?1
               AND deleted_at IS NULL;"
        ))?;
        let mut rows = stmt.query([url])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_attachment_row(row)?));
        }
        Ok(None)
    }

    fn get_attachments(&self, ids: &[AttachmentId]) -> RepoResult<Vec<Attachment>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut stmt = self.conn.prepare(&format!(
            "{ATTACHMENT_SELECT_SQL}
             WHERE deleted_at IS NULL
               AND id IN ({ID_LIST_SQL})
             ORDER BY url ASC, id ASC;"
        ))?;
        let mut rows = stmt.query([id_list_json(ids)?])?;
        let mut attachments = Vec::new();
        while let Some(row) = rows.next()? {
            attachments.push(parse_attachment_row(row)?);
        }
        Ok(attachments)
    }

    fn create_attachment(&self, attachment: &Attachment) -> RepoResult<AttachmentId> {
        attachment.validate()?;

        self.conn.execute(
            "INSERT INTO attachments (
                id,
                title,
                url,
                created_at,
                updated_at,
                deleted_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6);",
            params![
                attachment.id.to_string(),
                attachment.title.as_deref(),
                attachment.url.as_str(),
                to_millis(attachment.created_at),
                to_millis(attachment.updated_at),
                attachment.deleted_at.map(to_millis),
            ],
        )?;

        Ok(attachment.id)
    }

    fn update_attachment(&self, attachment: &Attachment) -> RepoResult<()> {
        attachment.validate()?;

        let changed = self.conn.execute(
            "UPDATE attachments
             SET
                title = ?2,
                url = ?3,
                updated_at = ?4
             WHERE id = ?1
               AND deleted_at IS NULL;",
            params![
                attachment.id.to_string(),
                attachment.title.as_deref(),
                attachment.url.as_str(),
                to_millis(attachment.updated_at),
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound(attachment.id));
        }
        Ok(())
    }

    fn soft_delete_attachment(&self, id: AttachmentId) -> RepoResult<bool> {
        let changed = self.conn.execute(
            "UPDATE attachments
             SET deleted_at = ?2
             WHERE id = ?1
               AND deleted_at IS NULL;",
            params![id.to_string(), to_millis(now_utc())],
        )?;
        Ok(changed > 0)
    }
}

pub(crate) fn parse_attachment_row(row: &Row<'_>) -> RepoResult<Attachment> {
    let id_text: String = row.get("id")?;
    Ok(Attachment {
        id: parse_uuid(&id_text, "attachments.id")?,
        title: row.get("title")?,
        url: row.get("url")?,
        created_at: parse_millis(row.get("created_at")?, "attachments.created_at")?,
        updated_at: parse_millis(row.get("updated_at")?, "attachments.updated_at")?,
        deleted_at: parse_optional_millis(row.get("deleted_at")?, "attachments.deleted_at")?,
    })
}
