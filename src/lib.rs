pub mod config;
pub mod context;
pub mod db;
pub mod error;
pub mod graph;

pub use config::Config;
pub use context::AppContext;
pub use db::{BloggingReminders, BloggingRemindersDao, SqliteDatabaseBuilder, WpDatabase};
pub use error::StoreError;
pub use graph::{AppContextModule, DatabaseBuilder, ObjectGraph, TableDaoSource};

/// Object graph backed by the local SQLite store.
pub type WpObjectGraph = ObjectGraph<SqliteDatabaseBuilder>;

/// Wire the SQLite-backed graph for `config`.
pub fn object_graph(config: &Config) -> WpObjectGraph {
    let context = AppContext::new(config.data_dir.clone());
    ObjectGraph::new(AppContextModule::new(
        context,
        SqliteDatabaseBuilder::from_config(config),
    ))
}
