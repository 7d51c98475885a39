//! Ordered schema scripts for the achievements store.
//!
//! `PRAGMA user_version` holds the last applied script. Pending scripts run
//! inside one transaction, so a failing script leaves the store at its
//! previous version.

use crate::db::{DbError, DbResult};
use log::info;
use rusqlite::Connection;

struct Migration {
    version: u32,
    sql: &'static str,
}

const MIGRATIONS: &[Migration] = &[
    // students, events, participations and their natural keys
    Migration {
        version: 1,
        sql: include_str!("0001_init.sql"),
    },
    // report lookups by event start date
    Migration {
        version: 2,
        sql: include_str!("0002_report_indexes.sql"),
    },
];

/// Schema version produced by a fully migrated store.
pub fn latest_version() -> u32 {
    MIGRATIONS.last().map_or(0, |migration| migration.version)
}

/// Brings `conn` up to `latest_version`.
///
/// # Errors
/// - `UnsupportedSchemaVersion` when the store is newer than this build.
/// - `Migration` when a script fails; nothing from this call is kept.
pub fn apply_migrations(conn: &mut Connection) -> DbResult<()> {
    let stored = stored_version(conn)?;
    let latest = latest_version();
    if stored > latest {
        return Err(DbError::UnsupportedSchemaVersion {
            db_version: stored,
            latest_supported: latest,
        });
    }

    let pending: Vec<&Migration> = MIGRATIONS
        .iter()
        .filter(|migration| migration.version > stored)
        .collect();
    if pending.is_empty() {
        return Ok(());
    }

    let tx = conn.transaction()?;
    for migration in &pending {
        let script = format!(
            "{}\nPRAGMA user_version = {};",
            migration.sql, migration.version
        );
        tx.execute_batch(&script)
            .map_err(|source| DbError::Migration {
                version: migration.version,
                source,
            })?;
    }
    tx.commit()?;

    info!(
        "event=db_migrate module=db status=ok from_version={} to_version={} applied={}",
        stored,
        latest,
        pending.len()
    );
    Ok(())
}

fn stored_version(conn: &Connection) -> DbResult<u32> {
    Ok(conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?)
}
