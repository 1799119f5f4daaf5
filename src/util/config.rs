//! Configuration file support for ferry.
//!
//! Two configuration file locations are read:
//! - Global: `config.toml` in the ferry home directory - user-wide defaults
//! - Project: `.ferry/config.toml` - project-specific overrides
//!
//! Project config takes precedence over global config. Command-line flags
//! take precedence over both.
//!
//! ```toml
//! [net]
//! timeout = 60
//! retries = 3
//!
//! [[repositories]]
//! id = "central"
//! url = "https://repo.example.com/public"
//!
//! [target]
//! url = "https://mirror.example.com/releases"
//! username = "deployer"
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::core::{Credential, RepositoryRef, TargetRepository};
use crate::util::diagnostic::suggestions;

/// Default network timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Default number of attempts per network request.
pub const DEFAULT_RETRIES: u32 = 3;

/// ferry configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Network settings
    pub net: NetConfig,

    /// Default source repositories, in lookup order
    pub repositories: Vec<RepositoryConfig>,

    /// Default transfer target
    pub target: Option<TargetConfig>,

    /// Local cache settings
    pub cache: CacheConfig,
}

/// Network-related configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NetConfig {
    /// Request timeout in seconds
    pub timeout: Option<u64>,

    /// Attempts per request (at least one)
    pub retries: Option<u32>,

    /// Offline mode (only the local cache is consulted)
    pub offline: bool,
}

impl NetConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout.unwrap_or(DEFAULT_TIMEOUT_SECS))
    }

    pub fn attempts(&self) -> u32 {
        self.retries.unwrap_or(DEFAULT_RETRIES).max(1)
    }
}

/// A configured source repository.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepositoryConfig {
    pub id: String,
    pub url: String,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

impl RepositoryConfig {
    pub fn to_repository(&self) -> Result<RepositoryRef> {
        let url = Url::parse(&self.url)
            .with_context(|| format!("invalid URL for repository `{}`: {}", self.id, self.url))?;
        let credential = self
            .username
            .as_ref()
            .map(|u| Credential::new(u, self.password.clone()));

        Ok(RepositoryRef::new(self.id.as_str(), url).with_credential(credential))
    }
}

/// The configured default target.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TargetConfig {
    pub url: String,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

/// Command-line values for the transfer target. Each one that is set wins
/// over the matching `[target]` field.
#[derive(Debug, Clone, Copy, Default)]
pub struct TargetOverrides<'a> {
    pub url: Option<&'a str>,
    pub username: Option<&'a str>,
    pub password: Option<&'a str>,
}

/// Local cache configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Override for the cache directory
    pub dir: Option<PathBuf>,
}

impl Config {
    /// Load configuration from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;

        toml::from_str(&contents)
            .with_context(|| format!("failed to parse config file: {}", path.display()))
    }

    /// Load configuration with fallback to defaults if file doesn't exist.
    pub fn load_or_default(path: &Path) -> Self {
        if path.exists() {
            Self::load(path).unwrap_or_else(|e| {
                tracing::warn!("Failed to load config from {}: {:#}", path.display(), e);
                Self::default()
            })
        } else {
            Self::default()
        }
    }

    /// Merge another config into this one (other takes precedence).
    ///
    /// Repositories are appended after the existing ones; an id that is
    /// already configured is overridden in place.
    pub fn merge(&mut self, other: Config) {
        if other.net.timeout.is_some() {
            self.net.timeout = other.net.timeout;
        }
        if other.net.retries.is_some() {
            self.net.retries = other.net.retries;
        }
        if other.net.offline {
            self.net.offline = true;
        }

        for repo in other.repositories {
            match self.repositories.iter_mut().find(|r| r.id == repo.id) {
                Some(existing) => *existing = repo,
                None => self.repositories.push(repo),
            }
        }

        if other.target.is_some() {
            self.target = other.target;
        }

        if other.cache.dir.is_some() {
            self.cache.dir = other.cache.dir;
        }
    }

    /// The effective transfer target.
    ///
    /// URL, username and password are merged field by field. Configured
    /// credentials are only used when the target URL is the configured one,
    /// and a password without a username is an error.
    pub fn target_repository(&self, overrides: &TargetOverrides<'_>) -> Result<TargetRepository> {
        let configured = self
            .target
            .as_ref()
            .map(|t| t.url.parse::<TargetRepository>())
            .transpose()?;

        let target = match (overrides.url, &configured) {
            (Some(url), _) => url.parse::<TargetRepository>()?,
            (None, Some(configured)) => configured.clone(),
            (None, None) => bail!("no target repository given\n{}", suggestions::NO_TARGET),
        };

        let fallback = match (&self.target, &configured) {
            (Some(config), Some(configured)) if configured.url() == target.url() => Some(config),
            _ => None,
        };

        let username = overrides
            .username
            .map(str::to_string)
            .or_else(|| fallback.and_then(|c| c.username.clone()));
        let password = overrides
            .password
            .map(str::to_string)
            .or_else(|| fallback.and_then(|c| c.password.clone()));

        let credential = match (username, password) {
            (Some(username), password) => Some(Credential::new(username, password)),
            (None, Some(_)) => bail!(
                "a password was given for {} without a username\n{}",
                target.url(),
                suggestions::MISSING_USERNAME
            ),
            (None, None) => None,
        };

        Ok(TargetRepository::new(target.url().clone(), credential))
    }

    /// Configured source repositories, in order.
    pub fn source_repositories(&self) -> Result<Vec<RepositoryRef>> {
        self.repositories.iter().map(|r| r.to_repository()).collect()
    }
}

/// Load merged configuration from global and project locations.
///
/// Order of precedence (highest to lowest):
/// 1. Project config (.ferry/config.toml)
/// 2. Global config
/// 3. Defaults
pub fn load_config(global_path: &Path, project_path: &Path) -> Config {
    let mut config = Config::default();

    if global_path.exists() {
        config.merge(Config::load_or_default(global_path));
    }

    if project_path.exists() {
        config.merge(Config::load_or_default(project_path));
    }

    config
}

/// Get the project config path (.ferry/config.toml).
pub fn project_config_path(project_root: &Path) -> PathBuf {
    project_root.join(".ferry").join("config.toml")
}
