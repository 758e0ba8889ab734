//! Document repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Persist documents together with their tag/attachment link sets.
//! - Serve sorted, paginated listings with associations loaded.
//! - Count documents overall and per tag filter.
//!
//! # Invariants
//! - Reads return documents with live tags and attachments only.
//! - Listings order by the requested column, then `id ASC` so pages are stable.
//! - A tag filter matches documents linked to ANY of the tags, and each
//!   document appears once no matter how many of the tags it carries.
//! - Row and link writes for one call run in a single transaction.

use super::attachment_repo::parse_attachment_row;
use super::tag_repo::parse_tag_row;
use super::{
    ensure_tables, id_list_json, parse_millis, parse_optional_millis, parse_uuid, to_millis,
    RepoError, RepoResult, ID_LIST_SQL,
};
use crate::model::attachment::{Attachment, AttachmentId};
use crate::model::document::{Document, DocumentId};
use crate::model::now_utc;
use crate::model::tag::{Tag, TagId};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row};

/// Page size used when the caller does not supply one.
pub const DOCUMENTS_DEFAULT_LIMIT: u32 = 50;

const DOCUMENT_SELECT_SQL: &str = "SELECT
    d.id AS id,
    d.title AS title,
    d.body AS body,
    d.created_at AS created_at,
    d.updated_at AS updated_at,
    d.deleted_at AS deleted_at
FROM documents d";

/// Column a document listing is ordered by.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortColumn {
    #[default]
    CreatedAt,
    UpdatedAt,
    Title,
    Body,
}

impl SortColumn {
    /// Parses a column name in snake_case or camelCase.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "created_at" | "createdAt" => Some(Self::CreatedAt),
            "updated_at" | "updatedAt" => Some(Self::UpdatedAt),
            "title" => Some(Self::Title),
            "body" => Some(Self::Body),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::CreatedAt => "created_at",
            Self::UpdatedAt => "updated_at",
            Self::Title => "title",
            Self::Body => "body",
        }
    }
}

/// Normalized pagination and ordering for document listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DocumentListQuery {
    pub limit: u32,
    pub offset: u32,
    pub sort_by: SortColumn,
    pub descending: bool,
}

impl Default for DocumentListQuery {
    fn default() -> Self {
        Self {
            limit: DOCUMENTS_DEFAULT_LIMIT,
            offset: 0,
            sort_by: SortColumn::default(),
            descending: true,
        }
    }
}

/// Which link sets `update_document` rewrites from the passed document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LinkReplacement {
    pub tags: bool,
    pub attachments: bool,
}

/// Repository interface for documents and their association tables.
pub trait DocumentRepository {
    /// Reads one document with tags and attachments loaded.
    fn get_document(&self, id: DocumentId, include_deleted: bool)
        -> RepoResult<Option<Document>>;
    /// Counts live documents, ignoring pagination.
    fn count_documents(&self) -> RepoResult<u64>;
    fn list_documents(&self, query: &DocumentListQuery) -> RepoResult<Vec<Document>>;
    /// Counts distinct live documents linked to any of `tag_ids`.
    fn count_documents_with_tags(&self, tag_ids: &[TagId]) -> RepoResult<u64>;
    fn list_documents_with_tags(
        &self,
        tag_ids: &[TagId],
        query: &DocumentListQuery,
    ) -> RepoResult<Vec<Document>>;
    /// Inserts the document row and its link sets.
    fn create_document(&self, document: &Document) -> RepoResult<DocumentId>;
    /// Rewrites title, body and `updated_at`, plus the link sets selected by `links`.
    fn update_document(&self, document: &Document, links: LinkReplacement) -> RepoResult<()>;
    /// Tombstones a live document. Links and linked entities are kept.
    fn soft_delete_document(&self, id: DocumentId) -> RepoResult<bool>;
}

/// SQLite-backed document repository.
#[derive(Clone, Copy)]
pub struct SqliteDocumentRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteDocumentRepository<'conn> {
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_tables(
            conn,
            &[
                "documents",
                "tags",
                "attachments",
                "document_tags",
                "document_attachments",
            ],
        )?;
        Ok(Self { conn })
    }

    fn select_documents(
        &self,
        tag_filter: Option<&[TagId]>,
        query: &DocumentListQuery,
    ) -> RepoResult<Vec<Document>> {
        let (where_sql, mut bind_values) = live_documents_filter(tag_filter)?;
        let direction = if query.descending { "DESC" } else { "ASC" };
        let sql = format!(
            "{DOCUMENT_SELECT_SQL}
             {where_sql}
             ORDER BY d.{} {direction}, d.id ASC
             LIMIT ? OFFSET ?;",
            query.sort_by.as_str()
        );
        bind_values.push(Value::Integer(i64::from(query.limit)));
        bind_values.push(Value::Integer(i64::from(query.offset)));

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut documents = Vec::new();
        while let Some(row) = rows.next()? {
            documents.push(self.load_with_associations(row)?);
        }
        Ok(documents)
    }

    fn count_live_documents(&self, tag_filter: Option<&[TagId]>) -> RepoResult<u64> {
        let (where_sql, bind_values) = live_documents_filter(tag_filter)?;
        let count: i64 = self.conn.query_row(
            &format!("SELECT COUNT(*) FROM documents d {where_sql};"),
            params_from_iter(bind_values),
            |row| row.get(0),
        )?;
        u64::try_from(count)
            .map_err(|_| RepoError::InvalidData(format!("negative document count `{count}`")))
    }

    fn load_with_associations(&self, row: &Row<'_>) -> RepoResult<Document> {
        let mut document = parse_document_row(row)?;
        document.tags = load_document_tags(self.conn, document.id)?;
        document.attachments = load_document_attachments(self.conn, document.id)?;
        Ok(document)
    }
}

impl DocumentRepository for SqliteDocumentRepository<'_> {
    fn get_document(
        &self,
        id: DocumentId,
        include_deleted: bool,
    ) -> RepoResult<Option<Document>> {
        let mut stmt = self.conn.prepare(&format!(
            "{DOCUMENT_SELECT_SQL}
             WHERE d.id = ?1
               AND (?2 = 1 OR d.deleted_at IS NULL);"
        ))?;
        let mut rows = stmt.query(params![id.to_string(), include_deleted])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(self.load_with_associations(row)?));
        }
        Ok(None)
    }

    fn count_documents(&self) -> RepoResult<u64> {
        self.count_live_documents(None)
    }

    fn list_documents(&self, query: &DocumentListQuery) -> RepoResult<Vec<Document>> {
        self.select_documents(None, query)
    }

    fn count_documents_with_tags(&self, tag_ids: &[TagId]) -> RepoResult<u64> {
        if tag_ids.is_empty() {
            return Ok(0);
        }
        self.count_live_documents(Some(tag_ids))
    }

    fn list_documents_with_tags(
        &self,
        tag_ids: &[TagId],
        query: &DocumentListQuery,
    ) -> RepoResult<Vec<Document>> {
        if tag_ids.is_empty() {
            return Ok(Vec::new());
        }
        self.select_documents(Some(tag_ids), query)
    }

    fn create_document(&self, document: &Document) -> RepoResult<DocumentId> {
        document.validate()?;

        let tx = self.conn.unchecked_transaction()?;
        tx.execute(
            "INSERT INTO documents (
                id,
                title,
                body,
                created_at,
                updated_at,
                deleted_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6);",
            params![
                document.id.to_string(),
                document.title.as_str(),
                document.body.as_str(),
                to_millis(document.created_at),
                to_millis(document.updated_at),
                document.deleted_at.map(to_millis),
            ],
        )?;
        insert_tag_links(&tx, document.id, &document.tags)?;
        insert_attachment_links(&tx, document.id, &document.attachments)?;
        tx.commit()?;

        Ok(document.id)
    }

    fn update_document(&self, document: &Document, links: LinkReplacement) -> RepoResult<()> {
        document.validate()?;

        let tx = self.conn.unchecked_transaction()?;
        let changed = tx.execute(
            "UPDATE documents
             SET
                title = ?2,
                body = ?3,
                updated_at = ?4
             WHERE id = ?1
               AND deleted_at IS NULL;",
            params![
                document.id.to_string(),
                document.title.as_str(),
                document.body.as_str(),
                to_millis(document.updated_at),
            ],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound(document.id));
        }

        if links.tags {
            tx.execute(
                "DELETE FROM document_tags WHERE document_id = ?1;",
                [document.id.to_string()],
            )?;
            insert_tag_links(&tx, document.id, &document.tags)?;
        }
        if links.attachments {
            tx.execute(
                "DELETE FROM document_attachments WHERE document_id = ?1;",
                [document.id.to_string()],
            )?;
            insert_attachment_links(&tx, document.id, &document.attachments)?;
        }

        tx.commit()?;
        Ok(())
    }

    fn soft_delete_document(&self, id: DocumentId) -> RepoResult<bool> {
        let changed = self.conn.execute(
            "UPDATE documents
             SET deleted_at = ?2
             WHERE id = ?1
               AND deleted_at IS NULL;",
            params![id.to_string(), to_millis(now_utc())],
        )?;
        Ok(changed > 0)
    }
}

impl<R: DocumentRepository + ?Sized> DocumentRepository for &R {
    fn get_document(
        &self,
        id: DocumentId,
        include_deleted: bool,
    ) -> RepoResult<Option<Document>> {
        (**self).get_document(id, include_deleted)
    }

    fn count_documents(&self) -> RepoResult<u64> {
        (**self).count_documents()
    }

    fn list_documents(&self, query: &DocumentListQuery) -> RepoResult<Vec<Document>> {
        (**self).list_documents(query)
    }

    fn count_documents_with_tags(&self, tag_ids: &[TagId]) -> RepoResult<u64> {
        (**self).count_documents_with_tags(tag_ids)
    }

    fn list_documents_with_tags(
        &self,
        tag_ids: &[TagId],
        query: &DocumentListQuery,
    ) -> RepoResult<Vec<Document>> {
        (**self).list_documents_with_tags(tag_ids, query)
    }

    fn create_document(&self, document: &Document) -> RepoResult<DocumentId> {
        (**self).create_document(document)
    }

    fn update_document(&self, document: &Document, links: LinkReplacement) -> RepoResult<()> {
        (**self).update_document(document, links)
    }

    fn soft_delete_document(&self, id: DocumentId) -> RepoResult<bool> {
        (**self).soft_delete_document(id)
    }
}

/// Builds the shared `WHERE` clause for listing and counting live documents.
fn live_documents_filter(tag_filter: Option<&[TagId]>) -> RepoResult<(String, Vec<Value>)> {
    let mut sql = String::from("WHERE d.deleted_at IS NULL");
    let mut bind_values = Vec::new();

    if let Some(tag_ids) = tag_filter {
        sql.push_str(&format!(
            " AND EXISTS (
                SELECT 1
                FROM document_tags dt
                INNER JOIN tags t ON t.id = dt.tag_id
                WHERE dt.document_id = d.id
                  AND t.deleted_at IS NULL
                  AND dt.tag_id IN ({ID_LIST_SQL})
            )"
        ));
        bind_values.push(Value::Text(id_list_json(tag_ids)?));
    }

    Ok((sql, bind_values))
}

fn parse_document_row(row: &Row<'_>) -> RepoResult<Document> {
    let id_text: String = row.get("id")?;
    Ok(Document {
        id: parse_uuid(&id_text, "documents.id")?,
        title: row.get("title")?,
        body: row.get("body")?,
        created_at: parse_millis(row.get("created_at")?, "documents.created_at")?,
        updated_at: parse_millis(row.get("updated_at")?, "documents.updated_at")?,
        deleted_at: parse_optional_millis(row.get("deleted_at")?, "documents.deleted_at")?,
        tags: Vec::new(),
        attachments: Vec::new(),
    })
}

fn load_document_tags(conn: &Connection, document_id: DocumentId) -> RepoResult<Vec<Tag>> {
    let mut stmt = conn.prepare(
        "SELECT
            t.id AS id,
            t.title AS title,
            t.created_at AS created_at,
            t.updated_at AS updated_at,
            t.deleted_at AS deleted_at
         FROM document_tags dt
         INNER JOIN tags t ON t.id = dt.tag_id
         WHERE dt.document_id = ?1
           AND t.deleted_at IS NULL
         ORDER BY t.title ASC, t.id ASC;",
    )?;
    let mut rows = stmt.query([document_id.to_string()])?;
    let mut tags = Vec::new();
    while let Some(row) = rows.next()? {
        tags.push(parse_tag_row(row)?);
    }
    Ok(tags)
}

fn load_document_attachments(
    conn: &Connection,
    document_id: DocumentId,
) -> RepoResult<Vec<Attachment>> {
    let mut stmt = conn.prepare(
        "SELECT
            a.id AS id,
            a.title AS title,
            a.url AS url,
            a.created_at AS created_at,
            a.updated_at AS updated_at,
            a.deleted_at AS deleted_at
         FROM document_attachments da
         INNER JOIN attachments a ON a.id = da.attachment_id
         WHERE da.document_id = ?1
           AND a.deleted_at IS NULL
         ORDER BY a.url ASC, a.id ASC;",
    )?;
    let mut rows = stmt.query([document_id.to_string()])?;
    let mut attachments = Vec::new();
    while let Some(row) = rows.next()? {
        attachments.push(parse_attachment_row(row)?);
    }
    Ok(attachments)
}

fn insert_tag_links(conn: &Connection, document_id: DocumentId, tags: &[Tag]) -> RepoResult<()> {
    let ids: Vec<TagId> = tags.iter().map(|tag| tag.id).collect();
    insert_links(
        conn,
        "INSERT OR IGNORE INTO document_tags (document_id, tag_id) VALUES (?1, ?2);",
        document_id,
        &ids,
    )
}

fn insert_attachment_links(
    conn: &Connection,
    document_id: DocumentId,
    attachments: &[Attachment],
) -> RepoResult<()> {
    let ids: Vec<AttachmentId> = attachments.iter().map(|attachment| attachment.id).collect();
    insert_links(
        conn,
        "INSERT OR IGNORE INTO document_attachments (document_id, attachment_id) VALUES (?1, ?2);",
        document_id,
        &ids,
    )
}

fn insert_links(
    conn: &Connection,
    sql: &str,
    document_id: DocumentId,
    ids: &[uuid::Uuid],
) -> RepoResult<()> {
    if ids.is_empty() {
        return Ok(());
    }
    let document_id = document_id.to_string();
    let mut stmt = conn.prepare(sql)?;
    for id in ids {
        stmt.execute(params![document_id.as_str(), id.to_string()])?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{DocumentListQuery, SortColumn, DOCUMENTS_DEFAULT_LIMIT};

    #[test]
    fn sort_column_accepts_snake_and_camel_case() {
        assert_eq!(SortColumn::parse("created_at"), Some(SortColumn::CreatedAt));
        assert_eq!(SortColumn::parse("updatedAt"), Some(SortColumn::UpdatedAt));
        assert_eq!(SortColumn::parse("title"), Some(SortColumn::Title));
        assert_eq!(SortColumn::parse("title; DROP TABLE documents"), None);
    }

    #[test]
    fn default_query_is_newest_first_with_default_limit() {
        let query = DocumentListQuery::default();
        assert_eq!(query.limit, DOCUMENTS_DEFAULT_LIMIT);
        assert_eq!(query.offset, 0);
        assert_eq!(query.sort_by, SortColumn::CreatedAt);
        assert!(query.descending);
    }
}
