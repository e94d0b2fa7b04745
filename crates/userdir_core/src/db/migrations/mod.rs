//! Ordered schema migrations for the `kv_entries` database.
//!
//! # Invariants
//! - `version` values are strictly increasing.
//! - All pending migrations run inside one transaction; a failure leaves
//!   `PRAGMA user_version` where it was.

use crate::db::{DbError, DbResult};
use log::info;
use rusqlite::Connection;

#[derive(Debug, Clone, Copy)]
struct Migration {
    version: u32,
    sql: &'static str,
}

const MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    sql: include_str!("0001_kv_entries.sql"),
}];

/// Returns the newest schema version this build understands.
pub fn latest_version() -> u32 {
    MIGRATIONS.last().map_or(0, |migration| migration.version)
}

/// Brings `conn` up to `latest_version()`.
///
/// Fails with `SchemaTooNew` when the file was written by a newer build,
/// leaving it untouched.
pub fn apply_migrations(conn: &mut Connection) -> DbResult<()> {
    apply_from(conn, MIGRATIONS)
}

fn schema_version(conn: &Connection) -> DbResult<u32> {
    Ok(conn.query_row("PRAGMA user_version;", [], |row| row.get::<_, u32>(0))?)
}

fn apply_from(conn: &mut Connection, migrations: &[Migration]) -> DbResult<()> {
    let found = schema_version(conn)?;
    let supported = migrations.last().map_or(0, |migration| migration.version);

    if found > supported {
        return Err(DbError::SchemaTooNew { found, supported });
    }
    let pending: Vec<&Migration> = migrations.iter().filter(|m| m.version > found).collect();
    if pending.is_empty() {
        return Ok(());
    }

    let tx = conn.transaction()?;
    for migration in &pending {
        let version = migration.version;
        tx.execute_batch(migration.sql)
            .and_then(|()| tx.execute_batch(&format!("PRAGMA user_version = {version};")))
            .map_err(|source| DbError::Migration { version, source })?;
    }
    tx.commit()?;

    info!(
        "event=db_migrate module=db status=ok from={found} to={supported} applied={}",
        pending.len()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{apply_from, schema_version, Migration, MIGRATIONS};
    use crate::db::DbError;
    use rusqlite::Connection;

    #[test]
    fn failing_migration_rolls_back_every_pending_step() {
        let mut conn = Connection::open_in_memory().unwrap();
        let broken = [
            MIGRATIONS[0],
            Migration {
                version: 2,
                sql: "ALTER TABLE missing_table ADD COLUMN note TEXT;",
            },
        ];

        let err = apply_from(&mut conn, &broken).unwrap_err();
        assert!(matches!(err, DbError::Migration { version: 2, .. }));
        assert!(err.to_string().starts_with("kv_entries migration 2 failed"));

        assert_eq!(schema_version(&conn).unwrap(), 0);
        let tables: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE name = 'kv_entries';",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(tables, 0);
    }
}
