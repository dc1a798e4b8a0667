//! Singleton-scoped resolution of the application bindings.

use super::{AppContextModule, DaoOf, DatabaseBuilder, Singleton};
use crate::context::AppContext;
use std::sync::{Arc, OnceLock};
use tracing::info;

/// Resolves the module's bindings, constructing each one at most once.
///
/// Resolution order is fixed: context, then database, then DAO.
pub struct ObjectGraph<B: DatabaseBuilder> {
    module: AppContextModule<B>,
    context: OnceLock<AppContext>,
    database: Singleton<B::Database>,
    dao: Singleton<DaoOf<B>>,
}

impl<B: DatabaseBuilder> ObjectGraph<B> {
    pub fn new(module: AppContextModule<B>) -> Self {
        ObjectGraph {
            module,
            context: OnceLock::new(),
            database: Singleton::new("database"),
            dao: Singleton::new("table_dao"),
        }
    }

    /// The application context.
    pub fn context(&self) -> AppContext {
        self.context
            .get_or_init(|| self.module.provide_context())
            .clone()
    }

    /// The database, opened on first request.
    ///
    /// # Errors
    /// Returns the builder's error unchanged. Nothing is cached on failure.
    pub async fn database(&self) -> Result<Arc<B::Database>, B::Error> {
        self.database
            .get_or_try_init(|| async {
                let context = self.context();
                let database = self.module.provide_database(&context).await?;
                info!(data_dir = %context.data_dir().display(), "Database provided");
                Ok::<_, B::Error>(database)
            })
            .await
    }

    /// The table DAO, obtained from the database on first request.
    ///
    /// # Errors
    /// Returns the error from opening the database or from obtaining the DAO, unchanged.
    pub async fn dao(&self) -> Result<Arc<DaoOf<B>>, B::Error> {
        let database = self.database().await?;
        self.dao
            .get_or_try_init(|| async move { self.module.provide_dao(&database) })
            .await
    }

    pub fn is_database_initialized(&self) -> bool {
        self.database.is_initialized()
    }

    pub fn is_dao_initialized(&self) -> bool {
        self.dao.is_initialized()
    }

    pub fn module(&self) -> &AppContextModule<B> {
        &self.module
    }
}
