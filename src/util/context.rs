//! Global context for ferry operations.
//!
//! Provides centralized access to configuration, paths, and environment.
//! The ferry home directory holds the global `config.toml` and the local
//! artifact cache. It is `$FERRY_HOME` when set, otherwise the platform data
//! directory.

use std::path::PathBuf;
use std::sync::LazyLock;

use anyhow::{Context, Result};
use directories::{BaseDirs, ProjectDirs};

use crate::util::config::{load_config, project_config_path, Config};

/// Environment variable overriding the ferry home directory.
pub const HOME_ENV: &str = "FERRY_HOME";

/// Project directories for ferry
static PROJECT_DIRS: LazyLock<Option<ProjectDirs>> =
    LazyLock::new(|| ProjectDirs::from("com", "ferry", "ferry"));

/// Global context containing configuration and paths.
#[derive(Debug, Clone)]
pub struct GlobalContext {
    /// Current working directory
    cwd: PathBuf,

    /// Home directory for global ferry data
    home: PathBuf,

    /// Merged global and project configuration
    config: Config,
}

fn default_home() -> PathBuf {
    if let Some(home) = std::env::var_os(HOME_ENV).filter(|h| !h.is_empty()) {
        return PathBuf::from(home);
    }

    if let Some(dirs) = PROJECT_DIRS.as_ref() {
        return dirs.data_dir().to_path_buf();
    }

    // Fallback to ~/.ferry
    BaseDirs::new()
        .map(|b| b.home_dir().join(".ferry"))
        .unwrap_or_else(|| PathBuf::from(".ferry"))
}

impl GlobalContext {
    /// Create a context for the current directory.
    pub fn new() -> Result<Self> {
        let cwd = std::env::current_dir().context("failed to get current directory")?;
        Ok(Self::with_home(cwd, default_home()))
    }

    /// Create a context with explicit working and home directories.
    pub fn with_home(cwd: PathBuf, home: PathBuf) -> Self {
        let config = load_config(&home.join("config.toml"), &project_config_path(&cwd));
        GlobalContext {
            cwd,
            home,
            config,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The local artifact cache. A relative `[cache] dir` is resolved
    /// against the working directory.
    pub fn cache_dir(&self) -> PathBuf {
        match &self.config.cache.dir {
            Some(dir) => self.cwd.join(dir),
            None => self.home.join("cache"),
        }
    }
}
