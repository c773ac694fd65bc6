//! Configuration for rewa.
//!
//! Configuration sources (highest priority first):
//! 1. Environment variables (REWA_HOME, REWA_DATABASE, REWA_USER,
//!    GOOGLE_BOOKS_API_KEY, IMDB_API_KEY)
//! 2. Config file (.rewa/config.yaml)
//! 3. Defaults (~/.rewa)
//!
//! Config file discovery:
//! - Searches current directory and parents for .rewa/config.yaml
//! - Paths in config file are relative to the .rewa/ directory

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::core::ingest::{LinkFailurePolicy, UnresolvedAuthorPolicy};

/// Global cached configuration (stores Result to handle init errors)
static CONFIG: OnceLock<Result<ResolvedConfig, String>> = OnceLock::new();

pub const DEFAULT_GOOGLE_BOOKS_URL: &str = "https://www.googleapis.com/books/v1";
pub const DEFAULT_IMDB_URL: &str = "https://imdb-api.com";

/// Raw config file schema (matches YAML structure)
#[derive(Debug, Clone, Deserialize)]
pub struct ConfigFile {
    pub version: String,
    #[serde(default)]
    pub user: Option<String>,
    #[serde(default)]
    pub paths: PathsConfig,
    #[serde(default)]
    pub providers: Option<ProvidersConfig>,
    #[serde(default)]
    pub search: Option<SearchConfig>,
    #[serde(default)]
    pub ingest: Option<IngestConfig>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PathsConfig {
    /// State directory (relative to .rewa/)
    pub home: Option<String>,
    /// SQLite database file (relative to home)
    pub database: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProvidersConfig {
    pub google_books_url: Option<String>,
    pub google_books_key: Option<String>,
    pub imdb_url: Option<String>,
    pub imdb_key: Option<String>,
    pub timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchConfig {
    pub book_limit: Option<usize>,
    pub video_limit: Option<usize>,
    pub debounce_ms: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct IngestConfig {
    pub unresolved_authors: Option<UnresolvedAuthorPolicy>,
    pub link_failure: Option<LinkFailurePolicy>,
}

/// Resolved configuration with absolute paths
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    /// Absolute path to rewa home (state)
    pub home: PathBuf,
    /// SQLite database file
    pub database: PathBuf,
    /// Owner of the want list
    pub user: String,
    /// Path to config file (if found)
    pub config_file: Option<PathBuf>,
    pub providers: ProviderSettings,
    pub search: SearchSettings,
    pub ingest: IngestSettings,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderSettings {
    pub google_books_url: String,
    pub google_books_key: Option<String>,
    pub imdb_url: String,
    pub imdb_key: Option<String>,
    pub timeout_seconds: u64,
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            google_books_url: DEFAULT_GOOGLE_BOOKS_URL.to_string(),
            google_books_key: None,
            imdb_url: DEFAULT_IMDB_URL.to_string(),
            imdb_key: None,
            timeout_seconds: 10,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchSettings {
    pub book_limit: usize,
    pub video_limit: usize,
    pub debounce_ms: u64,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            book_limit: 10,
            video_limit: 10,
            debounce_ms: 500,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestSettings {
    pub unresolved_authors: UnresolvedAuthorPolicy,
    pub link_failure: LinkFailurePolicy,
}

/// Find config file by searching current directory and parents
fn find_config_file() -> Option<PathBuf> {
    let mut current = std::env::current_dir().ok()?;

    loop {
        let config_path = current.join(".rewa").join("config.yaml");
        if config_path.exists() {
            return Some(config_path);
        }

        if !current.pop() {
            break;
        }
    }

    None
}

/// Load and parse config file
fn load_config_file(path: &Path) -> Result<ConfigFile> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    serde_yaml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))
}

/// Resolve a path that may be relative to a base directory
fn resolve_path(base: &Path, path_str: &str) -> PathBuf {
    let path = PathBuf::from(path_str);
    if path.is_absolute() {
        path
    } else {
        base.join(path)
            .canonicalize()
            .unwrap_or_else(|_| base.join(path_str))
    }
}

/// Merge defaults, an optional config file and environment lookups
fn resolve_config<F>(
    default_home: PathBuf,
    file: Option<(&Path, ConfigFile)>,
    env: F,
) -> ResolvedConfig
where
    F: Fn(&str) -> Option<String>,
{
    let config_file = file.as_ref().map(|(path, _)| path.to_path_buf());
    let (rewa_dir, config) = match file {
        Some((path, config)) => (path.parent().map(Path::to_path_buf), Some(config)),
        None => (None, None),
    };

    let home = env("REWA_HOME").map(PathBuf::from).unwrap_or_else(|| {
        match (
            rewa_dir.as_deref(),
            config.as_ref().and_then(|c| c.paths.home.as_deref()),
        ) {
            (Some(dir), Some(home)) => resolve_path(dir, home),
            _ => default_home,
        }
    });

    let database = env("REWA_DATABASE").map(PathBuf::from).unwrap_or_else(|| {
        let db = config
            .as_ref()
            .and_then(|c| c.paths.database.as_deref())
            .unwrap_or("rewa.db");
        resolve_path(&home, db)
    });

    let user = env("REWA_USER")
        .or_else(|| config.as_ref().and_then(|c| c.user.clone()))
        .unwrap_or_else(|| "local".to_string());

    let defaults = ProviderSettings::default();
    let providers = config.as_ref().and_then(|c| c.providers.as_ref());
    let providers = ProviderSettings {
        google_books_url: providers
            .and_then(|p| p.google_books_url.clone())
            .unwrap_or(defaults.google_books_url),
        google_books_key: env("GOOGLE_BOOKS_API_KEY")
            .or_else(|| providers.and_then(|p| p.google_books_key.clone())),
        imdb_url: providers
            .and_then(|p| p.imdb_url.clone())
            .unwrap_or(defaults.imdb_url),
        imdb_key: env("IMDB_API_KEY").or_else(|| providers.and_then(|p| p.imdb_key.clone())),
        timeout_seconds: providers
            .and_then(|p| p.timeout_seconds)
            .unwrap_or(defaults.timeout_seconds),
    };

    let defaults = SearchSettings::default();
    let search = config.as_ref().and_then(|c| c.search.as_ref());
    let search = SearchSettings {
        book_limit: search.and_then(|s| s.book_limit).unwrap_or(defaults.book_limit),
        video_limit: search.and_then(|s| s.video_limit).unwrap_or(defaults.video_limit),
        debounce_ms: search.and_then(|s| s.debounce_ms).unwrap_or(defaults.debounce_ms),
    };

    let ingest = config.as_ref().and_then(|c| c.ingest.as_ref());
    let ingest = IngestSettings {
        unresolved_authors: ingest
            .and_then(|i| i.unresolved_authors)
            .unwrap_or_default(),
        link_failure: ingest.and_then(|i| i.link_failure).unwrap_or_default(),
    };

    ResolvedConfig {
        home,
        database,
        user,
        config_file,
        providers,
        search,
        ingest,
    }
}

/// Load configuration from all sources
fn load_config() -> Result<ResolvedConfig> {
    let default_home = dirs::home_dir()
        .context("Failed to determine home directory")?
        .join(".rewa");

    let config_file = find_config_file();
    let parsed = match config_file {
        Some(ref path) => Some((path.as_path(), load_config_file(path)?)),
        None => None,
    };

    Ok(resolve_config(default_home, parsed, |key| std::env::var(key).ok()))
}

/// Get the global configuration (loads once, then cached)
pub fn config() -> Result<&'static ResolvedConfig> {
    let result = CONFIG.get_or_init(|| load_config().map_err(|e| e.to_string()));

    match result {
        Ok(config) => Ok(config),
        Err(e) => anyhow::bail!("{}", e),
    }
}

/// Force reload configuration (useful for testing)
pub fn reload_config() -> Result<ResolvedConfig> {
    load_config()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;
    use tempfile::TempDir;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn test_defaults_without_file() {
        let config = resolve_config(PathBuf::from("/home/u/.rewa"), None, no_env);

        assert_eq!(config.home, PathBuf::from("/home/u/.rewa"));
        assert_eq!(config.database, PathBuf::from("/home/u/.rewa/rewa.db"));
        assert_eq!(config.user, "local");
        assert!(config.config_file.is_none());
        assert_eq!(config.providers, ProviderSettings::default());
        assert_eq!(config.search.debounce_ms, 500);
        assert_eq!(config.search.video_limit, 10);
        assert_eq!(
            config.ingest.unresolved_authors,
            UnresolvedAuthorPolicy::Skip
        );
        assert_eq!(config.ingest.link_failure, LinkFailurePolicy::KeepOrphan);
    }

    #[test]
    fn test_config_file_parsing() {
        let temp = TempDir::new().unwrap();
        let rewa_dir = temp.path().join(".rewa");
        std::fs::create_dir_all(&rewa_dir).unwrap();

        let config_path = rewa_dir.join("config.yaml");
        let mut file = std::fs::File::create(&config_path).unwrap();
        writeln!(
            file,
            r#"
version: "1.0"
user: ada
paths:
  database: lists.db
providers:
  imdb_key: secret
  timeout_seconds: 3
search:
  video_limit: 5
ingest:
  unresolved_authors: reject
  link_failure: compensate
"#
        )
        .unwrap();

        let parsed = load_config_file(&config_path).unwrap();
        assert_eq!(parsed.version, "1.0");
        assert_eq!(parsed.paths.database.as_deref(), Some("lists.db"));

        let config = resolve_config(
            PathBuf::from("/unused"),
            Some((config_path.as_path(), parsed)),
            no_env,
        );
        assert_eq!(config.home, PathBuf::from("/unused"));
        assert_eq!(config.user, "ada");
        assert_eq!(config.database, PathBuf::from("/unused/lists.db"));
        assert_eq!(config.providers.imdb_key.as_deref(), Some("secret"));
        assert_eq!(config.providers.timeout_seconds, 3);
        assert_eq!(config.search.video_limit, 5);
        assert_eq!(config.search.book_limit, 10);
        assert_eq!(
            config.ingest.unresolved_authors,
            UnresolvedAuthorPolicy::Reject
        );
        assert_eq!(config.ingest.link_failure, LinkFailurePolicy::Compensate);
    }

    #[test]
    fn test_env_overrides_file() {
        let file: ConfigFile = serde_yaml::from_str(
            "version: \"1.0\"\nuser: ada\nproviders:\n  imdb_key: from-file\n",
        )
        .unwrap();
        let env: HashMap<&str, &str> = [
            ("REWA_HOME", "/srv/rewa"),
            ("REWA_USER", "grace"),
            ("IMDB_API_KEY", "from-env"),
        ]
        .into_iter()
        .collect();

        let config = resolve_config(
            PathBuf::from("/home/u/.rewa"),
            Some((Path::new("/project/.rewa/config.yaml"), file)),
            |key| env.get(key).map(|v| v.to_string()),
        );

        assert_eq!(config.home, PathBuf::from("/srv/rewa"));
        assert_eq!(config.database, PathBuf::from("/srv/rewa/rewa.db"));
        assert_eq!(config.user, "grace");
        assert_eq!(config.providers.imdb_key.as_deref(), Some("from-env"));
    }

    #[test]
    fn test_resolve_relative_path() {
        let base = PathBuf::from("/home/user/project");

        assert_eq!(
            resolve_path(&base, "./subdir"),
            PathBuf::from("/home/user/project/./subdir")
        );
        assert_eq!(
            resolve_path(&base, "/absolute/path"),
            PathBuf::from("/absolute/path")
        );
    }
}
