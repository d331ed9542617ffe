use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::ServiceError;

/// Configuration shared by every front end of the feed backend.
///
/// Read from a TOML file (all keys optional):
///
/// ```toml
/// data_dir = "/var/lib/chirp"
/// db_path = "/var/lib/chirp/chirp.redb"
///
/// [feed]
/// timeline_page_size = 50
/// profile_page_size = 10
/// recent_users = 10
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Directory holding the database file.
    pub data_dir: Option<PathBuf>,

    /// Path to the redb database file.
    /// Defaults to `{data_dir}/chirp.redb` if not specified.
    pub db_path: Option<PathBuf>,

    /// Page sizes for feed reads.
    pub feed: FeedConfig,
}

/// Page sizes used by the page views.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FeedConfig {
    /// Posts per page on the global timeline.
    pub timeline_page_size: u64,
    /// Posts per page on a user's profile.
    pub profile_page_size: u64,
    /// Number of newest users shown next to the timeline.
    pub recent_users: u64,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            timeline_page_size: 50,
            profile_page_size: 10,
            recent_users: 10,
        }
    }
}

impl ServiceConfig {
    /// Load config from disk, or return the defaults if the file doesn't exist.
    pub fn load(path: &Path) -> Result<Self, ServiceError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)
            .map_err(|e| ServiceError::Config(format!("read {}: {}", path.display(), e)))?;
        Self::parse(&content)
            .map_err(|e| ServiceError::Config(format!("parse {}: {}", path.display(), e)))
    }

    /// Parse a TOML document.
    pub fn parse(content: &str) -> Result<Self, ServiceError> {
        toml::from_str(content).map_err(|e| ServiceError::Config(e.to_string()))
    }

    /// Resolve the redb database path, falling back to `{data_dir}/chirp.redb`.
    pub fn resolve_db_path(&self) -> PathBuf {
        self.db_path.clone().unwrap_or_else(|| {
            self.data_dir
                .as_ref()
                .map(|d| d.join("chirp.redb"))
                .unwrap_or_else(|| PathBuf::from("chirp.redb"))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ServiceConfig::default();
        assert_eq!(config.resolve_db_path(), PathBuf::from("chirp.redb"));
        assert_eq!(config.feed.timeline_page_size, 50);
        assert_eq!(config.feed.profile_page_size, 10);
        assert_eq!(config.feed.recent_users, 10);
    }

    #[test]
    fn test_parse_partial() {
        let config = ServiceConfig::parse(
            r#"
            data_dir = "/data"

            [feed]
            profile_page_size = 5
            "#,
        )
        .unwrap();
        assert_eq!(config.resolve_db_path(), PathBuf::from("/data/chirp.redb"));
        assert_eq!(config.feed.profile_page_size, 5);
        assert_eq!(config.feed.timeline_page_size, 50);
    }

    #[test]
    fn test_db_path_overrides_data_dir() {
        let config = ServiceConfig {
            data_dir: Some(PathBuf::from("/data")),
            db_path: Some(PathBuf::from("/elsewhere/x.redb")),
            ..Default::default()
        };
        assert_eq!(config.resolve_db_path(), PathBuf::from("/elsewhere/x.redb"));
    }

    #[test]
    fn test_load_missing_file_is_default() {
        let tmp = tempfile::TempDir::new().unwrap();
        let config = ServiceConfig::load(&tmp.path().join("absent.toml")).unwrap();
        assert!(config.data_dir.is_none());
    }

    #[test]
    fn test_load_rejects_garbage() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("bad.toml");
        std::fs::write(&path, "feed = [").unwrap();
        let err = ServiceConfig::load(&path).unwrap_err();
        assert_eq!(err.error_code(), "INVALID_CONFIG");
    }
}
