use std::collections::HashMap;
use std::path::PathBuf;
use thiserror::Error;

/// File name of the local database when none is configured.
pub const DEFAULT_DATABASE_NAME: &str = "wp-android-database";

#[derive(Debug, Clone)]
pub struct Config {
    pub data_dir: PathBuf,
    pub database_name: String,
    pub max_connections: u32,
    pub busy_timeout_ms: u64,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnv(String),
    #[error("Invalid value for {0}: {1}")]
    InvalidValue(String, String),
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_env_map(std::env::vars().collect())
    }

    pub fn from_env_map(env_map: HashMap<String, String>) -> Result<Self, ConfigError> {
        let data_dir = env_map
            .get("WPSTORE_DATA_DIR")
            .filter(|s| !s.trim().is_empty())
            .map(PathBuf::from)
            .ok_or_else(|| ConfigError::MissingEnv("WPSTORE_DATA_DIR".to_string()))?;

        let database_name = env_map
            .get("WPSTORE_DB_NAME")
            .cloned()
            .unwrap_or_else(|| DEFAULT_DATABASE_NAME.to_string());
        if database_name.is_empty() || database_name.contains(['/', '\\']) {
            return Err(ConfigError::InvalidValue(
                "WPSTORE_DB_NAME".to_string(),
                format!("must be a bare file name, got {:?}", database_name),
            ));
        }

        let max_connections = env_map
            .get("WPSTORE_MAX_CONNECTIONS")
            .map(|s| s.as_str())
            .unwrap_or("5")
            .parse::<u32>()
            .ok()
            .filter(|n| *n > 0)
            .ok_or_else(|| {
                ConfigError::InvalidValue(
                    "WPSTORE_MAX_CONNECTIONS".to_string(),
                    "must be a positive integer".to_string(),
                )
            })?;

        let busy_timeout_ms = env_map
            .get("WPSTORE_BUSY_TIMEOUT_MS")
            .map(|s| s.as_str())
            .unwrap_or("5000")
            .parse::<u64>()
            .map_err(|_| {
                ConfigError::InvalidValue(
                    "WPSTORE_BUSY_TIMEOUT_MS".to_string(),
                    "must be a valid u64".to_string(),
                )
            })?;

        Ok(Config {
            data_dir,
            database_name,
            max_connections,
            busy_timeout_ms,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup_required_env() -> HashMap<String, String> {
        let mut map = HashMap::new();
        map.insert("WPSTORE_DATA_DIR".to_string(), "/tmp/wpstore".to_string());
        map
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_env_map(setup_required_env()).unwrap();
        assert_eq!(config.data_dir, PathBuf::from("/tmp/wpstore"));
        assert_eq!(config.database_name, DEFAULT_DATABASE_NAME);
        assert_eq!(config.max_connections, 5);
        assert_eq!(config.busy_timeout_ms, 5000);
    }

    #[test]
    fn test_missing_data_dir() {
        let mut env_map = setup_required_env();
        env_map.remove("WPSTORE_DATA_DIR");
        match Config::from_env_map(env_map) {
            Err(ConfigError::MissingEnv(s)) => assert_eq!(s, "WPSTORE_DATA_DIR"),
            _ => panic!("Expected MissingEnv error"),
        }
    }

    #[test]
    fn test_blank_data_dir_is_missing() {
        let mut env_map = setup_required_env();
        env_map.insert("WPSTORE_DATA_DIR".to_string(), "  ".to_string());
        assert!(matches!(
            Config::from_env_map(env_map),
            Err(ConfigError::MissingEnv(_))
        ));
    }

    #[test]
    fn test_database_name_with_separator() {
        let mut env_map = setup_required_env();
        env_map.insert("WPSTORE_DB_NAME".to_string(), "../escape".to_string());
        match Config::from_env_map(env_map) {
            Err(ConfigError::InvalidValue(k, _)) => assert_eq!(k, "WPSTORE_DB_NAME"),
            _ => panic!("Expected InvalidValue error"),
        }
    }

    #[test]
    fn test_zero_max_connections() {
        let mut env_map = setup_required_env();
        env_map.insert("WPSTORE_MAX_CONNECTIONS".to_string(), "0".to_string());
        match Config::from_env_map(env_map) {
            Err(ConfigError::InvalidValue(k, _)) => assert_eq!(k, "WPSTORE_MAX_CONNECTIONS"),
            _ => panic!("Expected InvalidValue error"),
        }
    }

    #[test]
    fn test_invalid_busy_timeout() {
        let mut env_map = setup_required_env();
        env_map.insert("WPSTORE_BUSY_TIMEOUT_MS".to_string(), "soon".to_string());
        match Config::from_env_map(env_map) {
            Err(ConfigError::InvalidValue(k, _)) => assert_eq!(k, "WPSTORE_BUSY_TIMEOUT_MS"),
            _ => panic!("Expected InvalidValue error"),
        }
    }
}
