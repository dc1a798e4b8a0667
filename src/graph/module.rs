//! Provider functions for the application-scoped bindings.

use super::{DaoOf, DatabaseBuilder, TableDaoSource};
use crate::context::AppContext;

/// Declares how to obtain the context, the database and the table DAO.
///
/// Every provider is a plain function of its inputs. Scoping each binding to a
/// single instance is left to [`super::ObjectGraph`].
#[derive(Debug)]
pub struct AppContextModule<B> {
    context: AppContext,
    builder: B,
}

impl<B: DatabaseBuilder> AppContextModule<B> {
    /// Create the module for `context`, opening databases with `builder`.
    pub fn new(context: AppContext, builder: B) -> Self {
        AppContextModule { context, builder }
    }

    /// The context handle the module was created with.
    pub fn provide_context(&self) -> AppContext {
        self.context.clone()
    }

    /// Open the database for `context`.
    ///
    /// # Errors
    /// Returns the builder's error unchanged.
    pub async fn provide_database(&self, context: &AppContext) -> Result<B::Database, B::Error> {
        self.builder.build(context).await
    }

    /// Obtain the table DAO from `database`.
    ///
    /// # Errors
    /// Returns the database's error unchanged.
    pub fn provide_dao(&self, database: &B::Database) -> Result<DaoOf<B>, B::Error> {
        database.table_dao()
    }

    pub fn builder(&self) -> &B {
        &self.builder
    }
}
