//! Registry table migrations embedded at compile time.
//!
//! A database may hold several registry tables (one per configured table
//! name), so every migration is a template over `{table}` and is recorded
//! in `schema_migrations` as `<table>:<version>`.

use rusqlite::{Connection, Result};
use tracing::{info, warn};

/// A single migration with version identifier and up/down SQL templates.
struct Migration {
    version: &'static str,
    up: &'static str,
    down: &'static str,
}

/// All migrations in order.
const MIGRATIONS: &[Migration] = &[
    Migration {
        version: "001_create_registry_table",
        up: r#"CREATE TABLE IF NOT EXISTS "{table}" (
            "key" TEXT PRIMARY KEY NOT NULL,
            "value" TEXT NOT NULL
        );"#,
        down: r#"DROP TABLE IF EXISTS "{table}";"#,
    },
    Migration {
        version: "002_add_updated_at",
        up: r#"ALTER TABLE "{table}" ADD COLUMN updated_at INTEGER NOT NULL DEFAULT 0;"#,
        down: r#"ALTER TABLE "{table}" DROP COLUMN updated_at;"#,
    },
];

fn render(template: &str, table: &str) -> String {
    template.replace("{table}", table)
}

fn record_key(table: &str, version: &str) -> String {
    format!("{table}:{version}")
}

fn ensure_migrations_table(conn: &Connection) -> Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS schema_migrations (
            version TEXT PRIMARY KEY,
            applied_at INTEGER NOT NULL
        )",
        [],
    )?;
    Ok(())
}

fn applied_versions(conn: &Connection) -> Result<std::collections::HashSet<String>> {
    conn.prepare("SELECT version FROM schema_migrations")?
        .query_map([], |row| row.get(0))?
        .collect()
}

/// Versions applied to `table`, in migration order.
///
/// # Errors
///
/// Returns an error if the bookkeeping table cannot be read.
pub fn applied_migrations(conn: &Connection, table: &str) -> Result<Vec<&'static str>> {
    ensure_migrations_table(conn)?;
    let applied = applied_versions(conn)?;
    Ok(MIGRATIONS
        .iter()
        .filter(|m| applied.contains(&record_key(table, m.version)))
        .map(|m| m.version)
        .collect())
}

/// Run all pending migrations for `table`.
///
/// Already-applied migrations are skipped, so this is safe to call on every
/// open. `table` must already be a validated identifier.
///
/// # Errors
///
/// Returns an error if a migration fails to apply. A duplicate-column error
/// is tolerated (logged as a warning) for tables created outside the
/// migration history.
pub fn run_migrations(conn: &Connection, table: &str) -> Result<()> {
    ensure_migrations_table(conn)?;
    let applied = applied_versions(conn)?;

    for migration in MIGRATIONS {
        let record = record_key(table, migration.version);
        if applied.contains(&record) {
            continue;
        }

        info!(table, version = migration.version, "Applying migration");

        if let Err(e) = conn.execute_batch(&render(migration.up, table)) {
            if e.to_string().contains("duplicate column name") {
                warn!(
                    table,
                    version = migration.version,
                    "Migration partially applied (columns exist), marking complete"
                );
            } else {
                return Err(e);
            }
        }

        conn.execute(
            "INSERT INTO schema_migrations (version, applied_at) VALUES (?1, ?2)",
            rusqlite::params![record, chrono::Utc::now().timestamp_millis()],
        )?;
    }

    Ok(())
}

/// Revert every applied migration for `table`, newest first.
///
/// Reverting the first migration drops the table and all its entries.
/// Returns the number of migrations reverted.
///
/// # Errors
///
/// Returns an error if a down migration fails.
pub fn rollback_migrations(conn: &Connection, table: &str) -> Result<usize> {
    ensure_migrations_table(conn)?;
    let applied = applied_versions(conn)?;
    let mut reverted = 0;

    for migration in MIGRATIONS.iter().rev() {
        let record = record_key(table, migration.version);
        if !applied.contains(&record) {
            continue;
        }

        info!(table, version = migration.version, "Reverting migration");

        conn.execute_batch(&render(migration.down, table))?;
        conn.execute("DELETE FROM schema_migrations WHERE version = ?1", [&record])?;
        reverted += 1;
    }

    Ok(reverted)
}
