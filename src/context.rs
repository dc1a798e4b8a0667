//! Application context handle.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Handle to the host environment the local store runs in.
///
/// Cloning is cheap and yields the same handle: every clone points at the
/// same environment, which `ptr_eq` can check.
#[derive(Clone)]
pub struct AppContext {
    inner: Arc<ContextInner>,
}

struct ContextInner {
    data_dir: PathBuf,
}

impl AppContext {
    /// Create a context whose databases live under `data_dir`.
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        AppContext {
            inner: Arc::new(ContextInner {
                data_dir: data_dir.into(),
            }),
        }
    }

    /// Directory holding the application's database files.
    pub fn data_dir(&self) -> &Path {
        &self.inner.data_dir
    }

    /// Full path of the database file called `name`.
    pub fn database_path(&self, name: &str) -> PathBuf {
        self.inner.data_dir.join(name)
    }

    /// Whether both handles refer to the same context.
    pub fn ptr_eq(&self, other: &AppContext) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl fmt::Debug for AppContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppContext")
            .field("data_dir", &self.inner.data_dir)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clone_keeps_identity() {
        let ctx = AppContext::new("/data/app");
        let clone = ctx.clone();
        assert!(ctx.ptr_eq(&clone));
    }

    #[test]
    fn test_same_dir_is_not_same_context() {
        let a = AppContext::new("/data/app");
        let b = AppContext::new("/data/app");
        assert!(!a.ptr_eq(&b));
        assert_eq!(a.data_dir(), b.data_dir());
    }

    #[test]
    fn test_database_path() {
        let ctx = AppContext::new("/data/app");
        assert_eq!(
            ctx.database_path("wp-android-database"),
            PathBuf::from("/data/app/wp-android-database")
        );
    }
}
