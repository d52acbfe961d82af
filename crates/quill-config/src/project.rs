//! Project Configuration (quill.toml)
//!
//! Handles project-level configuration stored in `quill.toml` at the project root.

use crate::engine::{EngineSection, LoggingSection};
use crate::{ConfigError, ConfigResult};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Name of the project configuration file
pub const PROJECT_CONFIG_FILE: &str = "quill.toml";

/// Project configuration from quill.toml
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct ProjectConfig {
    /// Engine limits
    #[serde(skip_serializing_if = "Option::is_none")]
    pub engine: Option<EngineSection>,

    /// Logging configuration
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logging: Option<LoggingSection>,
}

impl ProjectConfig {
    /// Load project configuration from a file
    pub fn load_from_file(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ConfigError::NotFound(path.to_path_buf())
            } else {
                ConfigError::IoError(e)
            }
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::TomlParseError {
            file: path.to_path_buf(),
            error: e,
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Validate the project configuration
    pub fn validate(&self) -> ConfigResult<()> {
        if let Some(engine) = &self.engine {
            engine.validate()?;
        }

        if let Some(logging) = &self.logging {
            if let Some(filter) = &logging.filter {
                if filter.trim().is_empty() {
                    return Err(ConfigError::InvalidValue {
                        field: "logging.filter".to_string(),
                        reason: "filter cannot be empty".to_string(),
                    });
                }
            }
        }

        Ok(())
    }

    /// Merge another project config into this one
    /// Other config takes precedence for non-None values
    pub fn merge(&mut self, other: &ProjectConfig) {
        if let Some(engine) = &other.engine {
            self.engine.get_or_insert_with(Default::default).merge(engine);
        }
        if let Some(logging) = &other.logging {
            self.logging
                .get_or_insert_with(Default::default)
                .merge(logging);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_engine_section() {
        let config: ProjectConfig = toml::from_str(
            r#"
[engine]
call_recursion_limit = 200
value_stack_limit = 4096
"#,
        )
        .unwrap();

        let engine = config.engine.unwrap();
        assert_eq!(engine.call_recursion_limit, Some(200));
        assert_eq!(engine.value_stack_limit, Some(4096));
        assert_eq!(engine.value_stack_reserve, None);
    }

    #[test]
    fn test_unknown_field_rejected() {
        let result: Result<ProjectConfig, _> = toml::from_str(
            r#"
[engine]
stack_size = 10
"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_empty_filter_rejected() {
        let config = ProjectConfig {
            logging: Some(LoggingSection {
                filter: Some("  ".to_string()),
            }),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_merge_sections() {
        let mut base = ProjectConfig {
            engine: Some(EngineSection {
                call_recursion_limit: Some(10),
                ..Default::default()
            }),
            logging: None,
        };
        let over = ProjectConfig {
            engine: Some(EngineSection {
                value_stack_limit: Some(2048),
                ..Default::default()
            }),
            logging: Some(LoggingSection {
                filter: Some("debug".to_string()),
            }),
        };
        base.merge(&over);

        let engine = base.engine.unwrap();
        assert_eq!(engine.call_recursion_limit, Some(10));
        assert_eq!(engine.value_stack_limit, Some(2048));
        assert_eq!(base.logging.unwrap().filter.as_deref(), Some("debug"));
    }
}
