//! Configuration Loader
//!
//! Handles loading and merging configuration from multiple sources with proper precedence.

use crate::engine::{EngineLimits, EngineSection, LoggingSection, DEFAULT_LOG_FILTER};
use crate::global::GlobalConfig;
use crate::project::{ProjectConfig, PROJECT_CONFIG_FILE};
use crate::{ConfigError, ConfigResult};
use std::env;
use std::path::{Path, PathBuf};

/// Overrides `engine.call_recursion_limit`
pub const ENV_CALL_RECURSION_LIMIT: &str = "QUILL_CALL_RECURSION_LIMIT";
/// Overrides `engine.value_stack_limit`
pub const ENV_VALUE_STACK_LIMIT: &str = "QUILL_VALUE_STACK_LIMIT";
/// Overrides `logging.filter`
pub const ENV_LOG: &str = "QUILL_LOG";

/// Configuration loader
///
/// Loads configuration from multiple sources and merges them with proper precedence:
/// 1. Global config (~/.quill/config.toml) - lowest priority
/// 2. Project config (./quill.toml) - overrides global
/// 3. Environment variables (QUILL_*) - overrides project
pub struct ConfigLoader {
    /// Cached global config path
    global_config_path: Option<PathBuf>,
}

/// Merged configuration result
#[derive(Debug, Clone)]
pub struct Config {
    /// Project configuration (environment overrides already applied)
    pub project: ProjectConfig,

    /// Global configuration
    pub global: GlobalConfig,

    /// Project root directory (where quill.toml was found)
    pub project_root: Option<PathBuf>,
}

impl ConfigLoader {
    /// Create a new configuration loader
    pub fn new() -> Self {
        Self {
            global_config_path: None,
        }
    }

    /// Create a loader that reads global defaults from `path` instead of ~/.quill
    pub fn with_global_path(path: impl Into<PathBuf>) -> Self {
        Self {
            global_config_path: Some(path.into()),
        }
    }

    /// Load configuration starting from the given directory
    ///
    /// Walks up the directory tree to find quill.toml, then loads and merges
    /// global config if it exists.
    pub fn load_from_directory(&mut self, start_dir: &Path) -> ConfigResult<Config> {
        let (project_root, project_config) = self.find_project_config(start_dir)?;

        let global_config = self.load_global_config()?;

        let project_config = self.apply_env_overrides(project_config)?;

        let config = Config {
            project: project_config,
            global: global_config,
            project_root,
        };
        config.engine_limits().validate()?;
        Ok(config)
    }

    /// Load configuration from a specific project config file
    pub fn load_from_file(&mut self, config_path: &Path) -> ConfigResult<Config> {
        let project_config = ProjectConfig::load_from_file(config_path)?;
        let global_config = self.load_global_config()?;
        let project_config = self.apply_env_overrides(project_config)?;

        let project_root = config_path.parent().map(|p| p.to_path_buf());

        let config = Config {
            project: project_config,
            global: global_config,
            project_root,
        };
        config.engine_limits().validate()?;
        Ok(config)
    }

    /// Find project configuration by walking up directory tree
    ///
    /// Returns (project_root, project_config)
    fn find_project_config(
        &self,
        start_dir: &Path,
    ) -> ConfigResult<(Option<PathBuf>, ProjectConfig)> {
        let mut current = start_dir.to_path_buf();

        loop {
            let config_path = current.join(PROJECT_CONFIG_FILE);

            if config_path.exists() {
                let project_config = ProjectConfig::load_from_file(&config_path)?;
                return Ok((Some(current), project_config));
            }

            match current.parent() {
                Some(parent) => current = parent.to_path_buf(),
                None => return Ok((None, ProjectConfig::default())),
            }
        }
    }

    /// Load global configuration; a missing file or home directory yields defaults
    fn load_global_config(&mut self) -> ConfigResult<GlobalConfig> {
        if self.global_config_path.is_none() {
            match GlobalConfig::global_config_path() {
                Ok(path) => self.global_config_path = Some(path),
                Err(ConfigError::HomeNotFound) => return Ok(GlobalConfig::default()),
                Err(e) => return Err(e),
            }
        }

        match self.global_config_path.as_deref() {
            Some(path) if path.exists() => GlobalConfig::load_from_file(path),
            _ => Ok(GlobalConfig::default()),
        }
    }

    /// Apply environment variable overrides to project config
    fn apply_env_overrides(&self, mut config: ProjectConfig) -> ConfigResult<ProjectConfig> {
        if let Some(limit) = read_usize_var(ENV_CALL_RECURSION_LIMIT)? {
            config
                .engine
                .get_or_insert_with(Default::default)
                .call_recursion_limit = Some(limit);
        }

        if let Some(limit) = read_usize_var(ENV_VALUE_STACK_LIMIT)? {
            config
                .engine
                .get_or_insert_with(Default::default)
                .value_stack_limit = Some(limit);
        }

        if let Ok(filter) = env::var(ENV_LOG) {
            config.logging.get_or_insert_with(Default::default).filter = Some(filter);
        }

        config.validate()?;
        Ok(config)
    }
}

fn read_usize_var(name: &str) -> ConfigResult<Option<usize>> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse::<usize>()
            .map(Some)
            .map_err(|_| ConfigError::InvalidValue {
                field: name.to_string(),
                reason: format!("expected a non-negative integer, got '{}'", raw),
            }),
        Err(_) => Ok(None),
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl Config {
    /// Effective `[engine]` table (global < project)
    pub fn engine_section(&self) -> EngineSection {
        let mut section = self.global.engine.clone().unwrap_or_default();
        if let Some(project) = &self.project.engine {
            section.merge(project);
        }
        section
    }

    /// Resolved engine limits
    pub fn engine_limits(&self) -> EngineLimits {
        EngineLimits::from_section(&self.engine_section())
    }

    /// Effective log filter (project > global > default)
    pub fn log_filter(&self) -> String {
        let mut logging = self.global.logging.clone().unwrap_or_default();
        if let Some(project) = &self.project.logging {
            logging.merge(project);
        }
        let LoggingSection { filter } = logging;
        filter.unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string())
    }

    /// Get the project root directory
    pub fn project_root(&self) -> Option<&Path> {
        self.project_root.as_deref()
    }

    /// Check if this is a project (has quill.toml)
    pub fn is_project(&self) -> bool {
        self.project_root.is_some()
    }
}
