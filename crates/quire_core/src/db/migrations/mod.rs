//! Versioned schema for the content store.
//!
//! The schema is built in two steps:
//! - `0001_content.sql` creates the `tags`, `attachments` and `documents`
//!   tables. Each carries a `deleted_at` tombstone, and tag titles and
//!   attachment URLs are unique among live rows only (partial indexes).
//! - `0002_associations.sql` adds the `document_tags` and
//!   `document_attachments` join tables, keyed by both ids, with foreign keys
//!   back to the entity tables.
//!
//! The schema version lives in `PRAGMA user_version`. A database newer than
//! this binary is refused rather than touched.

use crate::db::{DbError, DbResult};
use rusqlite::Connection;

/// One schema step; `version` is also the value written to `user_version`.
#[derive(Debug, Clone, Copy)]
struct SchemaStep {
    version: u32,
    name: &'static str,
    sql: &'static str,
}

const SCHEMA_STEPS: [SchemaStep; 2] = [
    SchemaStep {
        version: 1,
        name: "content",
        sql: include_str!("0001_content.sql"),
    },
    SchemaStep {
        version: 2,
        name: "associations",
        sql: include_str!("0002_associations.sql"),
    },
];

/// Returns the schema version this binary migrates to.
pub fn latest_version() -> u32 {
    SCHEMA_STEPS.last().map_or(0, |step| step.version)
}

/// Steps that still have to run on a database at `from` version.
fn pending_steps(from: u32) -> DbResult<&'static [SchemaStep]> {
    let latest = latest_version();
    if from > latest {
        return Err(DbError::UnsupportedSchemaVersion {
            db_version: from,
            latest_supported: latest,
        });
    }
    let applied = SCHEMA_STEPS
        .iter()
        .take_while(|step| step.version <= from)
        .count();
    Ok(&SCHEMA_STEPS[applied..])
}

/// Brings the schema up to [`latest_version`].
///
/// All pending steps share one transaction, so a failing step leaves the
/// database at its previous version.
pub fn apply_migrations(conn: &mut Connection) -> DbResult<()> {
    let from = current_user_version(conn)?;
    let pending = pending_steps(from)?;
    let Some(last) = pending.last() else {
        return Ok(());
    };

    let tx = conn.transaction()?;
    for step in pending {
        log::debug!(
            "event=db_migrate_step module=db status=start version={} name={}",
            step.version,
            step.name
        );
        tx.execute_batch(step.sql)?;
        tx.pragma_update(None, "user_version", step.version)?;
    }
    tx.commit()?;

    log::info!(
        "event=db_migrate module=db status=ok from={from} to={} steps={}",
        last.version,
        pending.len()
    );
    Ok(())
}

pub(crate) fn current_user_version(conn: &Connection) -> DbResult<u32> {
    Ok(conn.pragma_query_value(None, "user_version", |row| row.get::<_, u32>(0))?)
}

#[cfg(test)]
mod tests {
    use super::{latest_version, pending_steps, SCHEMA_STEPS};
    use crate::db::DbError;

    #[test]
    fn step_versions_are_consecutive_from_one() {
        for (index, step) in SCHEMA_STEPS.iter().enumerate() {
            assert_eq!(step.version as usize, index + 1, "step {}", step.name);
        }
        assert_eq!(latest_version(), 2);
    }

    #[test]
    fn pending_steps_skip_applied_versions() {
        let names = |from: u32| -> Vec<&'static str> {
            pending_steps(from)
                .unwrap()
                .iter()
                .map(|step| step.name)
                .collect()
        };
        assert_eq!(names(0), vec!["content", "associations"]);
        assert_eq!(names(1), vec!["associations"]);
        assert!(names(2).is_empty());
    }

    #[test]
    fn pending_steps_refuse_newer_schema() {
        let err = pending_steps(latest_version() + 1).unwrap_err();
        assert!(matches!(
            err,
            DbError::UnsupportedSchemaVersion {
                db_version: 3,
                latest_supported: 2,
            }
        ));
    }
}
