//! Store schema migrations.
//!
//! Applied versions are recorded in `_migrations`; anything above the highest
//! recorded version runs in order on open.

use super::Error;
use tokio_rusqlite::{Connection, params};

/// `(version, SQL)` in application order.
const MIGRATIONS: &[(i64, &str)] = &[
    (1, include_str!("../../migrations/001_job_cache.sql")),
    (2, include_str!("../../migrations/002_interactions.sql")),
];

/// Run any pending migrations.
///
/// # Errors
///
/// Returns an error if the version table cannot be read or a migration fails.
pub async fn run(conn: &Connection) -> Result<(), Error> {
    conn.call(|conn| -> Result<(), Error> {
        conn.execute(
            "CREATE TABLE IF NOT EXISTS _migrations (
                version INTEGER PRIMARY KEY,
                applied_at TEXT NOT NULL
            )",
            [],
        )?;

        let current: i64 =
            conn.query_row("SELECT COALESCE(MAX(version), 0) FROM _migrations", [], |row| row.get(0))?;

        for (version, sql) in MIGRATIONS.iter().filter(|(v, _)| *v > current) {
            conn.execute_batch(sql)
                .map_err(|e| Error::MigrationFailed(format!("version {version}: {e}")))?;
            conn.execute(
                "INSERT INTO _migrations (version, applied_at) VALUES (?1, ?2)",
                params![version, chrono::Utc::now().to_rfc3339()],
            )?;
            tracing::debug!(version, "applied store migration");
        }

        Ok(())
    })
    .await
    .map_err(Error::from)
}
