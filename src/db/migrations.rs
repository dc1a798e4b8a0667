//! Database opening and schema versioning.

use sqlx::pool::PoolConnection;
use sqlx::sqlite::{
    Sqlite, SqliteConnectOptions, SqliteConnection, SqlitePool, SqlitePoolOptions,
};
use sqlx::Row;
use std::path::Path;
use tracing::{debug, info, warn};

/// Schema version the crate reads and writes.
pub const DATABASE_VERSION: i64 = 4;

const SCHEMA_SQL: &str = include_str!("schema.sql");

/// A single upgrade step between two schema versions.
#[derive(Debug, PartialEq, Eq)]
pub struct Migration {
    pub from: i64,
    pub to: i64,
    sql: &'static str,
}

pub const MIGRATIONS: &[Migration] = &[
    Migration {
        from: 1,
        to: 2,
        sql: r#"
            CREATE TABLE IF NOT EXISTS `PlanOffers` (
                `id` INTEGER PRIMARY KEY AUTOINCREMENT NOT NULL,
                `internalPlanId` INTEGER NOT NULL,
                `name` TEXT,
                `shortName` TEXT,
                `tagline` TEXT,
                `description` TEXT,
                `icon` TEXT
            );
            CREATE UNIQUE INDEX IF NOT EXISTS `index_PlanOffers_internalPlanId`
                ON `PlanOffers` (`internalPlanId`);
            CREATE TABLE IF NOT EXISTS `PlanOfferIds` (
                `id` INTEGER PRIMARY KEY AUTOINCREMENT NOT NULL,
                `productId` INTEGER NOT NULL,
                `internalPlanId` INTEGER NOT NULL,
                FOREIGN KEY(`internalPlanId`) REFERENCES `PlanOffers`(`internalPlanId`)
                    ON UPDATE NO ACTION ON DELETE CASCADE
            );
            CREATE TABLE IF NOT EXISTS `PlanOfferFeatures` (
                `id` INTEGER PRIMARY KEY AUTOINCREMENT NOT NULL,
                `internalPlanId` INTEGER NOT NULL,
                `stringId` TEXT,
                `name` TEXT,
                `description` TEXT,
                FOREIGN KEY(`internalPlanId`) REFERENCES `PlanOffers`(`internalPlanId`)
                    ON UPDATE NO ACTION ON DELETE CASCADE
            )
        "#,
    },
    Migration {
        from: 2,
        to: 3,
        sql: r#"
            CREATE TABLE IF NOT EXISTS `Comments` (
                `id` INTEGER PRIMARY KEY AUTOINCREMENT NOT NULL,
                `remoteCommentId` INTEGER NOT NULL,
                `remotePostId` INTEGER NOT NULL,
                `remoteParentCommentId` INTEGER NOT NULL,
                `localSiteId` INTEGER NOT NULL,
                `remoteSiteId` INTEGER NOT NULL,
                `authorUrl` TEXT,
                `authorName` TEXT,
                `authorEmail` TEXT,
                `authorProfileImageUrl` TEXT,
                `postTitle` TEXT,
                `status` TEXT,
                `datePublished` TEXT,
                `publishedTimestamp` INTEGER NOT NULL,
                `content` TEXT,
                `url` TEXT,
                `hasParent` INTEGER NOT NULL,
                `parentId` INTEGER NOT NULL,
                `iLike` INTEGER NOT NULL
            )
        "#,
    },
    Migration {
        from: 3,
        to: 4,
        sql: r#"
            ALTER TABLE BloggingReminders ADD COLUMN hour INTEGER DEFAULT 10 NOT NULL;
            ALTER TABLE BloggingReminders ADD COLUMN minute INTEGER DEFAULT 0 NOT NULL
        "#,
    },
];

/// What has to happen to bring a database file to [`DATABASE_VERSION`].
#[derive(Debug, PartialEq, Eq)]
pub enum MigrationPlan {
    UpToDate,
    /// Empty file: create the current schema.
    Create,
    /// Apply these steps in order.
    Migrate(Vec<&'static Migration>),
    /// No upgrade path: drop everything and create the current schema.
    Destructive,
}

impl MigrationPlan {
    /// Decide how to handle a file at `version`. `has_tables` reports whether
    /// the file already holds user tables.
    pub fn for_version(version: i64, has_tables: bool) -> Self {
        if version == DATABASE_VERSION {
            return MigrationPlan::UpToDate;
        }
        if version == 0 {
            return if has_tables {
                MigrationPlan::Destructive
            } else {
                MigrationPlan::Create
            };
        }
        match migration_path(version, DATABASE_VERSION) {
            Some(steps) => MigrationPlan::Migrate(steps),
            None => MigrationPlan::Destructive,
        }
    }
}

/// Chain of steps from `from` to `to`, preferring the longest jump at each
/// version. `None` when the chain is broken or `from > to`.
fn migration_path(from: i64, to: i64) -> Option<Vec<&'static Migration>> {
    if from > to {
        return None;
    }
    let mut steps = Vec::new();
    let mut current = from;
    while current < to {
        let step = MIGRATIONS
            .iter()
            .filter(|m| m.from == current && m.to <= to)
            .max_by_key(|m| m.to)?;
        steps.push(step);
        current = step.to;
    }
    Some(steps)
}

/// Open the pool for the database file at `db_path`, creating the file if missing.
pub async fn open_pool(
    db_path: &Path,
    max_connections: u32,
    busy_timeout_ms: u64,
) -> Result<SqlitePool, sqlx::Error> {
    let options = SqliteConnectOptions::new()
        .filename(db_path)
        .create_if_missing(true);

    SqlitePoolOptions::new()
        .max_connections(max_connections)
        .after_connect(move |conn, _meta| {
            Box::pin(async move { configure_pragmas_conn(conn, busy_timeout_ms).await })
        })
        .connect_with(options)
        .await
}

/// Bring the schema to [`DATABASE_VERSION`], returning the version found on disk.
pub async fn run_migrations(pool: &SqlitePool) -> Result<i64, sqlx::Error> {
    let mut conn = pool.acquire().await?;
    let version = read_user_version(&mut conn).await?;
    let has_tables = !user_tables(&mut conn).await?.is_empty();

    match MigrationPlan::for_version(version, has_tables) {
        MigrationPlan::UpToDate => {
            debug!(version, "Schema up to date");
        }
        MigrationPlan::Create => {
            info!(version = DATABASE_VERSION, "Creating schema");
            let mut tx = sqlx::Connection::begin(&mut *conn).await?;
            execute_script(&mut tx, SCHEMA_SQL).await?;
            set_user_version(&mut tx, DATABASE_VERSION).await?;
            tx.commit().await?;
        }
        MigrationPlan::Migrate(steps) => {
            let mut tx = sqlx::Connection::begin(&mut *conn).await?;
            for step in steps {
                info!(from = step.from, to = step.to, "Applying migration");
                execute_script(&mut tx, step.sql).await?;
            }
            set_user_version(&mut tx, DATABASE_VERSION).await?;
            tx.commit().await?;
        }
        MigrationPlan::Destructive => {
            warn!(
                found = version,
                expected = DATABASE_VERSION,
                "No migration path, recreating database"
            );
            recreate(&mut conn).await?;
        }
    }

    Ok(version)
}

/// Read `PRAGMA user_version`.
pub async fn read_user_version(conn: &mut SqliteConnection) -> Result<i64, sqlx::Error> {
    let row = sqlx::query("PRAGMA user_version")
        .fetch_one(&mut *conn)
        .await?;
    Ok(row.get(0))
}

async fn set_user_version(conn: &mut SqliteConnection, version: i64) -> Result<(), sqlx::Error> {
    // PRAGMA arguments cannot be bound.
    sqlx::query(&format!("PRAGMA user_version = {}", version))
        .execute(&mut *conn)
        .await?;
    Ok(())
}

async fn user_tables(conn: &mut SqliteConnection) -> Result<Vec<String>, sqlx::Error> {
    let rows = sqlx::query(
        "SELECT name FROM sqlite_master WHERE type = 'table' AND name NOT LIKE 'sqlite_%'",
    )
    .fetch_all(&mut *conn)
    .await?;
    Ok(rows.iter().map(|row| row.get::<String, _>("name")).collect())
}

async fn execute_script(conn: &mut SqliteConnection, script: &str) -> Result<(), sqlx::Error> {
    for statement in script.split(';') {
        let trimmed = statement.trim();
        if !trimmed.is_empty() {
            sqlx::query(trimmed).execute(&mut *conn).await?;
        }
    }
    Ok(())
}

async fn recreate(conn: &mut PoolConnection<Sqlite>) -> Result<(), sqlx::Error> {
    // foreign_keys cannot change inside a transaction.
    sqlx::query("PRAGMA foreign_keys = OFF")
        .execute(&mut **conn)
        .await?;

    let result = async {
        let mut tx = sqlx::Connection::begin(&mut **conn).await?;
        for table in user_tables(&mut tx).await? {
            let drop = format!("DROP TABLE IF EXISTS \"{}\"", table.replace('"', "\"\""));
            sqlx::query(&drop).execute(&mut *tx).await?;
        }
        execute_script(&mut tx, SCHEMA_SQL).await?;
        set_user_version(&mut tx, DATABASE_VERSION).await?;
        tx.commit().await
    }
    .await;

    sqlx::query("PRAGMA foreign_keys = ON")
        .execute(&mut **conn)
        .await?;
    result
}

/// Configure SQLite pragmas on every new connection.
async fn configure_pragmas_conn(
    conn: &mut SqliteConnection,
    busy_timeout_ms: u64,
) -> Result<(), sqlx::Error> {
    sqlx::query("PRAGMA foreign_keys = ON")
        .execute(&mut *conn)
        .await?;

    // journal_mode returns the actual mode set; must use fetch to get result
    let row = sqlx::query("PRAGMA journal_mode = WAL")
        .fetch_one(&mut *conn)
        .await?;
    let journal_mode: String = row.get(0);
    debug!(journal_mode = %journal_mode, "SQLite journal_mode set");

    sqlx::query(&format!("PRAGMA busy_timeout = {}", busy_timeout_ms))
        .execute(&mut *conn)
        .await?;
    sqlx::query("PRAGMA synchronous = NORMAL")
        .execute(&mut *conn)
        .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    async fn open_temp(temp_dir: &TempDir) -> SqlitePool {
        open_pool(&temp_dir.path().join("test.db"), 2, 5000)
            .await
            .expect("open_pool failed")
    }

    #[test]
    fn test_plan_up_to_date() {
        assert_eq!(
            MigrationPlan::for_version(DATABASE_VERSION, true),
            MigrationPlan::UpToDate
        );
    }

    #[test]
    fn test_plan_fresh_file_creates() {
        assert_eq!(MigrationPlan::for_version(0, false), MigrationPlan::Create);
    }

    #[test]
    fn test_plan_unversioned_tables_are_destroyed() {
        assert_eq!(MigrationPlan::for_version(0, true), MigrationPlan::Destructive);
    }

    #[test]
    fn test_plan_full_chain_from_v1() {
        match MigrationPlan::for_version(1, true) {
            MigrationPlan::Migrate(steps) => {
                let versions: Vec<(i64, i64)> = steps.iter().map(|m| (m.from, m.to)).collect();
                assert_eq!(versions, vec![(1, 2), (2, 3), (3, 4)]);
            }
            other => panic!("Expected Migrate, got {:?}", other),
        }
    }

    #[test]
    fn test_plan_partial_chain_from_v3() {
        match MigrationPlan::for_version(3, true) {
            MigrationPlan::Migrate(steps) => {
                assert_eq!(steps.len(), 1);
                assert_eq!((steps[0].from, steps[0].to), (3, 4));
            }
            other => panic!("Expected Migrate, got {:?}", other),
        }
    }

    #[test]
    fn test_plan_downgrade_is_destructive() {
        assert_eq!(
            MigrationPlan::for_version(DATABASE_VERSION + 1, true),
            MigrationPlan::Destructive
        );
    }

    #[test]
    fn test_plan_unknown_old_version_is_destructive() {
        assert_eq!(MigrationPlan::for_version(-3, true), MigrationPlan::Destructive);
    }

    #[tokio::test]
    async fn test_open_pool_creates_file() {
        let temp_dir = TempDir::new().unwrap();
        let pool = open_temp(&temp_dir).await;
        assert!(temp_dir.path().join("test.db").exists());

        let result: (i64,) = sqlx::query_as("SELECT 1")
            .fetch_one(&pool)
            .await
            .expect("query failed");
        assert_eq!(result.0, 1);
    }

    #[tokio::test]
    async fn test_fresh_database_gets_current_schema() {
        let temp_dir = TempDir::new().unwrap();
        let pool = open_temp(&temp_dir).await;

        let found = run_migrations(&pool).await.expect("migrations failed");
        assert_eq!(found, 0);

        let result: (i64,) = sqlx::query_as("PRAGMA user_version")
            .fetch_one(&pool)
            .await
            .expect("query failed");
        assert_eq!(result.0, DATABASE_VERSION);

        let result: (String,) = sqlx::query_as(
            "SELECT name FROM sqlite_master WHERE type='table' AND name='Comments'",
        )
        .fetch_one(&pool)
        .await
        .expect("query failed");
        assert_eq!(result.0, "Comments");
    }

    #[tokio::test]
    async fn test_migrations_idempotent() {
        let temp_dir = TempDir::new().unwrap();
        let pool = open_temp(&temp_dir).await;

        run_migrations(&pool).await.expect("first run failed");
        let found = run_migrations(&pool).await.expect("second run failed");
        assert_eq!(found, DATABASE_VERSION);
    }

    #[tokio::test]
    async fn test_pragmas_configured() {
        let temp_dir = TempDir::new().unwrap();
        let pool = open_temp(&temp_dir).await;

        let result: (i64,) = sqlx::query_as("PRAGMA foreign_keys")
            .fetch_one(&pool)
            .await
            .expect("query failed");
        assert_eq!(result.0, 1);

        let result: (i64,) = sqlx::query_as("PRAGMA busy_timeout")
            .fetch_one(&pool)
            .await
            .expect("query failed");
        assert_eq!(result.0, 5000);

        let result: (String,) = sqlx::query_as("PRAGMA journal_mode")
            .fetch_one(&pool)
            .await
            .expect("query failed");
        // `journal_mode=WAL` is best-effort; SQLite can fall back depending on environment.
        assert!(
            matches!(result.0.as_str(), "wal" | "delete"),
            "unexpected journal_mode: {}",
            result.0
        );
    }
}
