//! Local SQLite store.
//!
//! This module provides:
//! - `SqliteDatabaseBuilder`, which opens the database file for a context
//! - Schema creation, migrations and SQLite pragma configuration
//! - `WpDatabase` and the table DAOs it hands out

pub mod blogging_reminders;
pub mod migrations;

pub use blogging_reminders::{BloggingReminders, BloggingRemindersDao};
pub use migrations::{run_migrations, DATABASE_VERSION};

use crate::config::{Config, DEFAULT_DATABASE_NAME};
use crate::context::AppContext;
use crate::error::StoreError;
use crate::graph::{DatabaseBuilder, TableDaoSource};
use async_trait::async_trait;
use sqlx::sqlite::SqlitePool;
use tracing::info;

/// Opens the local database file inside the context's data directory.
#[derive(Debug, Clone)]
pub struct SqliteDatabaseBuilder {
    database_name: String,
    max_connections: u32,
    busy_timeout_ms: u64,
}

impl SqliteDatabaseBuilder {
    pub fn new(database_name: impl Into<String>) -> Self {
        SqliteDatabaseBuilder {
            database_name: database_name.into(),
            max_connections: 5,
            busy_timeout_ms: 5000,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        SqliteDatabaseBuilder {
            database_name: config.database_name.clone(),
            max_connections: config.max_connections,
            busy_timeout_ms: config.busy_timeout_ms,
        }
    }

    pub fn max_connections(mut self, max_connections: u32) -> Self {
        self.max_connections = max_connections;
        self
    }

    pub fn busy_timeout_ms(mut self, busy_timeout_ms: u64) -> Self {
        self.busy_timeout_ms = busy_timeout_ms;
        self
    }

    pub fn database_name(&self) -> &str {
        &self.database_name
    }
}

impl Default for SqliteDatabaseBuilder {
    fn default() -> Self {
        Self::new(DEFAULT_DATABASE_NAME)
    }
}

#[async_trait]
impl DatabaseBuilder for SqliteDatabaseBuilder {
    type Database = WpDatabase;
    type Error = StoreError;

    async fn build(&self, context: &AppContext) -> Result<WpDatabase, StoreError> {
        let name = self.database_name.as_str();
        if name.is_empty() || name.contains(['/', '\\']) || name == "." || name == ".." {
            return Err(StoreError::InvalidName(name.to_string()));
        }

        std::fs::create_dir_all(context.data_dir())?;
        let path = context.database_path(name);

        let pool =
            migrations::open_pool(&path, self.max_connections, self.busy_timeout_ms).await?;
        let found_version = run_migrations(&pool).await?;

        info!(
            path = %path.display(),
            found_version,
            version = DATABASE_VERSION,
            "Database opened"
        );
        Ok(WpDatabase { pool })
    }
}

/// The opened local database.
#[derive(Debug, Clone)]
pub struct WpDatabase {
    pool: SqlitePool,
}

impl WpDatabase {
    pub fn blogging_reminders_dao(&self) -> BloggingRemindersDao {
        BloggingRemindersDao::new(self.pool.clone())
    }

    /// Schema version recorded in the database file.
    ///
    /// # Errors
    /// Returns an error if the query fails.
    pub async fn schema_version(&self) -> Result<i64, sqlx::Error> {
        let mut conn = self.pool.acquire().await?;
        migrations::read_user_version(&mut conn).await
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Close every connection. DAOs obtained earlier fail afterwards.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

impl TableDaoSource for WpDatabase {
    type Dao = BloggingRemindersDao;
    type Error = StoreError;

    fn table_dao(&self) -> Result<BloggingRemindersDao, StoreError> {
        Ok(self.blogging_reminders_dao())
    }
}
