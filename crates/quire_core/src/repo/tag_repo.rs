//! Tag repository contract and SQLite implementation.
//!
//! # Invariants
//! - All reads are constrained to live rows unless `include_deleted` is set.
//! - `get_tags` silently omits ids with no live match; completeness checks
//!   belong to callers.
//! - `soft_delete_tag` is idempotent and keeps association rows.

use super::{
    ensure_tables, id_list_json, parse_millis, parse_optional_millis, parse_uuid, to_millis,
    RepoError, RepoResult, ID_LIST_SQL,
};
use crate::model::now_utc;
use crate::model::tag::{Tag, TagId};
use rusqlite::{params, Connection, Row};

const TAG_SELECT_SQL: &str = "SELECT
    id,
    title,
    created_at,
    updated_at,
    deleted_at
FROM tags";

/// Repository interface for tag persistence.
pub trait TagRepository {
    /// Lists all live tags ordered by title.
    fn list_tags(&self) -> RepoResult<Vec<Tag>>;
    fn get_tag(&self, id: TagId, include_deleted: bool) -> RepoResult<Option<Tag>>;
    /// Finds the live tag with exactly this title.
    fn get_tag_by_title(&self, title: &str) -> RepoResult<Option<Tag>>;
    /// Returns live tags matching any of `ids`.
    fn get_tags(&self, ids: &[TagId]) -> RepoResult<Vec<Tag>>;
    fn create_tag(&self, tag: &Tag) -> RepoResult<TagId>;
    /// Rewrites title and `updated_at` of a live tag.
    fn update_tag(&self, tag: &Tag) -> RepoResult<()>;
    /// Tombstones a live tag. Returns `false` when nothing was live.
    fn soft_delete_tag(&self, id: TagId) -> RepoResult<bool>;
}

/// SQLite-backed tag repository.
#[derive(Clone, Copy)]
pub struct SqliteTagRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteTagRepository<'conn> {
    /// Constructs a repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_tables(conn, &["tags"])?;
        Ok(Self { conn })
    }
}

impl TagRepository for SqliteTagRepository<'_> {
    fn list_tags(&self) -> RepoResult<Vec<Tag>> {
        let mut stmt = self.conn.prepare(&format!(
            "{TAG_SELECT_SQL}
             WHERE deleted_at IS NULL
             ORDER BY title ASC, id ASC;"
        ))?;
        let mut rows = stmt.query([])?;
        let mut tags = Vec::new();
        while let Some(row) = rows.next()? {
            tags.push(parse_tag_row(row)?);
        }
        Ok(tags)
    }

    fn get_tag(&self, id: TagId, include_deleted: bool) -> RepoResult<Option<Tag>> {
        let mut stmt = self.conn.prepare(&format!(
            "{TAG_SELECT_SQL}
             WHERE id = ?1
               AND (?2 = 1 OR deleted_at IS NULL);"
        ))?;
        let mut rows = stmt.query(params![id.to_string(), include_deleted])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_tag_row(row)?));
        }
        Ok(None)
    }

    fn get_tag_by_title(&self, title: &str) -> RepoResult<Option<Tag>> {
        let mut stmt = self.conn.prepare(&format!(
            "{TAG_SELECT_SQL}
             WHERE title = ?1
               AND deleted_at IS NULL;"
        ))?;
        let mut rows = stmt.query([title])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_tag_row(row)?));
        }
        Ok(None)
    }

    fn get_tags(&self, ids: &[TagId]) -> RepoResult<Vec<Tag>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut stmt = self.conn.prepare(&format!(
            "{TAG_SELECT_SQL}
             WHERE deleted_at IS NULL
               AND id IN ({ID_LIST_SQL})
             ORDER BY title ASC, id ASC;"
        ))?;
        let mut rows = stmt.query([id_list_json(ids)?])?;
        let mut tags = Vec::new();
        while let Some(row) = rows.next()? {
            tags.push(parse_tag_row(row)?);
        }
        Ok(tags)
    }

    fn create_tag(&self, tag: &Tag) -> RepoResult<TagId> {
        tag.validate()?;

        self.conn.execute(
            "INSERT INTO tags (
                id,
                title,
                created_at,
                updated_at,
                deleted_at
            ) VALUES (?1, ?2, ?3, ?4, ?5);",
            params![
                tag.id.to_string(),
                tag.title.as_str(),
                to_millis(tag.created_at),
                to_millis(tag.updated_at),
                tag.deleted_at.map(to_millis),
            ],
        )?;

        Ok(tag.id)
    }

    fn update_tag(&self, tag: &Tag) -> RepoResult<()> {
        tag.validate()?;

        let changed = self.conn.execute(
            "UPDATE tags
             SET
                title = ?2,
                updated_at = ?3
             WHERE id = ?1
               AND deleted_at IS NULL;",
            params![
                tag.id.to_string(),
                tag.title.as_str(),
                to_millis(tag.updated_at),
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound(tag.id));
        }
        Ok(())
    }

    fn soft_delete_tag(&self, id: TagId) -> RepoResult<bool> {
        let changed = self.conn.execute(
            "UPDATE tags
             SET deleted_at = ?2
             WHERE id = ?1
               AND deleted_at IS NULL;",
            params![id.to_string(), to_millis(now_utc())],
        )?;
        Ok(changed > 0)
    }
}

/// Maps one `tags` row selected with the canonical column list.
pub(crate) fn parse_tag_row(row: &Row<'_>) -> RepoResult<Tag> {
    let id_text: String = row.get("id")?;
    Ok(Tag {
        id: parse_uuid(&id_text, "tags.id")?,
        title: row.get("title")?,
        created_at: parse_millis(row.get("created_at")?, "tags.created_at")?,
        updated_at: parse_millis(row.get("updated_at")?, "tags.updated_at")?,
        deleted_at: parse_optional_millis(row.get("deleted_at")?, "tags.deleted_at")?,
    })
}
