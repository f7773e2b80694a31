//! Configuration file loading and parsing.
//!
//! Settings live in a TOML file. The first file found wins:
//! 1. The path given with `--config`
//! 2. `.buganizer/config.toml` in the working directory
//! 3. `buganizer/config.toml` under the user config directory
//!
//! If no file exists, every setting falls back to its default.

use crate::filter::DEFAULT_CURRENT_USER;
use crate::storage::{SortField, SortOrder, DEFAULT_PAGE_SIZE};
use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Default size of the built-in demo data set.
pub const DEFAULT_FIXTURE_COUNT: usize = 50;

const PROJECT_CONFIG: &str = ".buganizer/config.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BuganizerConfig {
    pub filter: Option<FilterConfig>,
    pub search: Option<SearchConfig>,
    pub fixture: Option<FixtureConfig>,
}

/// Filter evaluation settings.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FilterConfig {
    /// User id that `assignee:me` resolves to (default: user-1).
    pub current_user: Option<String>,
}

/// List view defaults.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchConfig {
    /// Query used when none is given (default: empty).
    pub default_query: Option<String>,
    /// Issues per page (default: 10).
    pub page_size: Option<usize>,
    /// Sort field, e.g. `createdAt` or `priority` (default: createdAt).
    pub order_by: Option<SortField>,
    /// `asc` or `desc` (default: desc).
    pub order: Option<SortOrder>,
}

/// Demo data settings.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FixtureConfig {
    /// Number of generated issues (default: 50).
    pub count: Option<usize>,
}

impl BuganizerConfig {
    /// Parse a config file. Errors if it is unreadable or malformed.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: BuganizerConfig = toml::from_str(&content)
            .with_context(|| format!("Invalid config file {}", path.display()))?;
        tracing::debug!(path = %path.display(), "loaded config");
        Ok(config)
    }

    /// Resolve and load configuration.
    ///
    /// An explicit path must exist. Otherwise the project file under `cwd`
    /// is tried, then the user file.
    pub fn load(explicit: Option<&Path>, cwd: &Path) -> Result<Self> {
        if let Some(path) = explicit {
            if !path.exists() {
                bail!("Config file not found: {}", path.display());
            }
            return Self::from_file(path);
        }

        match Self::discover(cwd) {
            Some(path) => Self::from_file(&path),
            None => {
                tracing::debug!("no config file found, using defaults");
                Ok(Self::default())
            }
        }
    }

    fn discover(cwd: &Path) -> Option<PathBuf> {
        let project = cwd.join(PROJECT_CONFIG);
        if project.exists() {
            return Some(project);
        }
        dirs::config_dir()
            .map(|dir| dir.join("buganizer").join("config.toml"))
            .filter(|path| path.exists())
    }

    pub fn current_user(&self) -> String {
        self.filter
            .as_ref()
            .and_then(|f| f.current_user.clone())
            .unwrap_or_else(|| DEFAULT_CURRENT_USER.to_string())
    }

    pub fn default_query(&self) -> String {
        self.search
            .as_ref()
            .and_then(|s| s.default_query.clone())
            .unwrap_or_default()
    }

    pub fn page_size(&self) -> usize {
        self.search
            .as_ref()
            .and_then(|s| s.page_size)
            .unwrap_or(DEFAULT_PAGE_SIZE)
    }

    pub fn order_by(&self) -> SortField {
        self.search
            .as_ref()
            .and_then(|s| s.order_by)
            .unwrap_or_default()
    }

    pub fn order(&self) -> SortOrder {
        self.search.as_ref().and_then(|s| s.order).unwrap_or_default()
    }

    pub fn fixture_count(&self) -> usize {
        self.fixture
            .as_ref()
            .and_then(|f| f.count)
            .unwrap_or(DEFAULT_FIXTURE_COUNT)
    }
}
