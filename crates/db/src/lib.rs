//! SQLite connection pool factory and migration runner for LIBRIS.

use std::str::FromStr;

use anyhow::Context;
use libris_kernel::settings::DatabaseSettings;
use libris_kernel::Migration;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::SqlitePool;

const MIGRATIONS_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS _migrations (
        id TEXT PRIMARY KEY,
        applied_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
    )
"#;

/// Shared handle to the relational store.
///
/// Cloning is cheap; every clone shares the same pool.
#[derive(Clone, Debug)]
pub struct Db {
    pool: SqlitePool,
}

impl Db {
    /// Open (creating if missing) the database described by `settings`
    pub async fn connect(settings: &DatabaseSettings) -> anyhow::Result<Self> {
        tracing::info!(target: "libris-db", url = %settings.url, "opening database");

        let options = SqliteConnectOptions::from_str(&settings.url)
            .with_context(|| format!("invalid database url '{}'", settings.url))?
            .create_if_missing(true)
            .foreign_keys(true)
            .journal_mode(SqliteJournalMode::Wal);

        let pool = SqlitePoolOptions::new()
            .max_connections(settings.max_connections)
            .connect_with(options)
            .await
            .with_context(|| format!("failed to connect to database at '{}'", settings.url))?;

        Ok(Self { pool })
    }

    /// Private in-memory database, used by tests and throwaway runs.
    ///
    /// Every SQLite `:memory:` connection is its own database, so the pool is
    /// pinned to a single connection that is never recycled.
    pub async fn in_memory() -> anyhow::Result<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")
            .context("invalid in-memory database url")?
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .min_connections(1)
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await
            .context("failed to open in-memory database")?;

        Ok(Self { pool })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Apply every migration not yet recorded in `_migrations`.
    ///
    /// Each migration runs in its own transaction together with its bookkeeping
    /// row. Returns the number of migrations applied by this call.
    pub async fn migrate(&self, migrations: &[(String, Migration)]) -> anyhow::Result<usize> {
        sqlx::query(MIGRATIONS_TABLE)
            .execute(&self.pool)
            .await
            .context("failed to create migrations table")?;

        let mut applied = 0;
        for (module, migration) in migrations {
            let key = format!("{}:{}", module, migration.id);

            let already: Option<(String,)> =
                sqlx::query_as("SELECT id FROM _migrations WHERE id = ?1")
                    .bind(&key)
                    .fetch_optional(&self.pool)
                    .await
                    .with_context(|| format!("failed to look up migration '{}'", key))?;
            if already.is_some() {
                tracing::debug!(target: "libris-db", migration = %key, "migration already applied");
                continue;
            }

            let mut tx = self.pool.begin().await?;
            sqlx::raw_sql(migration.up)
                .execute(&mut *tx)
                .await
                .with_context(|| format!("migration '{}' failed", key))?;
            sqlx::query("INSERT INTO _migrations (id) VALUES (?1)")
                .bind(&key)
                .execute(&mut *tx)
                .await?;
            tx.commit()
                .await
                .with_context(|| format!("failed to commit migration '{}'", key))?;

            tracing::info!(target: "libris-db", migration = %key, "migration applied");
            applied += 1;
        }

        Ok(applied)
    }

    /// Round-trip check that the pool can reach the database
    pub async fn ping(&self) -> anyhow::Result<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .context("database ping failed")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn migrations() -> Vec<(String, Migration)> {
        vec![
            (
                "shelves".to_string(),
                Migration {
                    id: "001_init",
                    up: "CREATE TABLE shelf (id INTEGER PRIMARY KEY, label TEXT NOT NULL);",
                },
            ),
            (
                "shelves".to_string(),
                Migration {
                    id: "002_seed",
                    up: "INSERT INTO shelf (label) VALUES ('a'); INSERT INTO shelf (label) VALUES ('b');",
                },
            ),
        ]
    }

    #[tokio::test]
    async fn migrations_apply_once() {
        let db = Db::in_memory().await.unwrap();

        assert_eq!(db.migrate(&migrations()).await.unwrap(), 2);
        assert_eq!(db.migrate(&migrations()).await.unwrap(), 0);

        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM shelf")
            .fetch_one(db.pool())
            .await
            .unwrap();
        assert_eq!(count, 2);
    }

    #[tokio::test]
    async fn failed_migration_is_not_recorded() {
        let db = Db::in_memory().await.unwrap();
        let broken = vec![(
            "broken".to_string(),
            Migration {
                id: "001_init",
                up: "CREATE TABLE oops (",
            },
        )];

        let err = db.migrate(&broken).await.unwrap_err();
        assert!(err.to_string().contains("broken:001_init"));

        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM _migrations")
            .fetch_one(db.pool())
            .await
            .unwrap();
        assert_eq!(count, 0);
    }

    #[tokio::test]
    async fn in_memory_enforces_foreign_keys() {
        let db = Db::in_memory().await.unwrap();
        sqlx::raw_sql(
            "CREATE TABLE parent (id INTEGER PRIMARY KEY);
             CREATE TABLE child (id INTEGER PRIMARY KEY, parent_id INTEGER NOT NULL REFERENCES parent(id));",
        )
        .execute(db.pool())
        .await
        .unwrap();

        let result = sqlx::query("INSERT INTO child (parent_id) VALUES (42)")
            .execute(db.pool())
            .await;
        assert!(result.is_err());
        db.ping().await.unwrap();
    }

    #[tokio::test]
    async fn ping_fails_once_the_pool_is_closed() {
        let db = Db::in_memory().await.unwrap();
        db.ping().await.unwrap();

        db.pool().close().await;
        let err = db.ping().await.unwrap_err();
        assert!(err.to_string().contains("database ping failed"));
    }
}
