//! Application object graph.
//!
//! This module provides:
//! - The collaborator traits the graph is wired from
//! - `AppContextModule`, the provider functions for context, database and DAO
//! - `ObjectGraph`, which scopes each provider to a single instance

use crate::context::AppContext;
use async_trait::async_trait;

pub mod module;
pub mod resolver;
pub mod scope;

pub use module::AppContextModule;
pub use resolver::ObjectGraph;
pub use scope::Singleton;

/// Builds (opens) the local database for an application context.
#[async_trait]
pub trait DatabaseBuilder: Send + Sync {
    /// The opened database.
    type Database: TableDaoSource<Error = Self::Error> + Send + Sync + 'static;
    /// Failure to open the database.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Open the database for `context`.
    ///
    /// # Errors
    /// Returns an error if the underlying storage cannot be opened or prepared.
    async fn build(&self, context: &AppContext) -> Result<Self::Database, Self::Error>;
}

/// A database that hands out a data-access object scoped to one table.
pub trait TableDaoSource {
    type Dao: Send + Sync + 'static;
    type Error;

    fn table_dao(&self) -> Result<Self::Dao, Self::Error>;
}

/// DAO type produced by the database a builder opens.
pub type DaoOf<B> = <<B as DatabaseBuilder>::Database as TableDaoSource>::Dao;
