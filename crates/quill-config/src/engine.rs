//! Engine limits and logging sections
//!
//! The `[engine]` and `[logging]` tables may appear in both the global and the
//! project configuration file. Every field is optional at the file level; the
//! effective values are resolved into [`EngineLimits`] after merging.

use crate::{ConfigError, ConfigResult};
use serde::{Deserialize, Serialize};

/// Maximum nesting depth of native calls.
pub const DEFAULT_CALL_RECURSION_LIMIT: usize = 1000;
/// Slots guaranteed when an execution context is created.
pub const DEFAULT_VALUE_STACK_INITIAL: usize = 256;
/// Slots guaranteed above the arguments when a callable starts running.
pub const DEFAULT_VALUE_STACK_RESERVE: usize = 64;
/// Hard cap on operand stack size.
pub const DEFAULT_VALUE_STACK_LIMIT: usize = 1_000_000;
/// Default log filter handed to the host's subscriber.
pub const DEFAULT_LOG_FILTER: &str = "warn";

/// `[engine]` table
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(deny_unknown_fields)]
pub struct EngineSection {
    /// Maximum nesting depth of native calls
    #[serde(skip_serializing_if = "Option::is_none")]
    pub call_recursion_limit: Option<usize>,

    /// Operand stack capacity guaranteed at context creation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_stack_initial: Option<usize>,

    /// Capacity guaranteed above a callable's arguments
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_stack_reserve: Option<usize>,

    /// Hard operand stack limit
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_stack_limit: Option<usize>,
}

/// `[logging]` table
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(deny_unknown_fields)]
pub struct LoggingSection {
    /// Filter directive (e.g. "quill_runtime=debug")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter: Option<String>,
}

impl EngineSection {
    /// Overlay `other` on top of `self`. Fields set in `other` win.
    pub fn merge(&mut self, other: &EngineSection) {
        if other.call_recursion_limit.is_some() {
            self.call_recursion_limit = other.call_recursion_limit;
        }
        if other.value_stack_initial.is_some() {
            self.value_stack_initial = other.value_stack_initial;
        }
        if other.value_stack_reserve.is_some() {
            self.value_stack_reserve = other.value_stack_reserve;
        }
        if other.value_stack_limit.is_some() {
            self.value_stack_limit = other.value_stack_limit;
        }
    }

    /// Validate the fields that are present
    pub fn validate(&self) -> ConfigResult<()> {
        if self.call_recursion_limit == Some(0) {
            return Err(ConfigError::InvalidValue {
                field: "engine.call_recursion_limit".to_string(),
                reason: "must be greater than zero".to_string(),
            });
        }
        if self.value_stack_reserve == Some(0) {
            return Err(ConfigError::InvalidValue {
                field: "engine.value_stack_reserve".to_string(),
                reason: "must be greater than zero".to_string(),
            });
        }
        if self.value_stack_limit == Some(0) {
            return Err(ConfigError::InvalidValue {
                field: "engine.value_stack_limit".to_string(),
                reason: "must be greater than zero".to_string(),
            });
        }
        Ok(())
    }
}

impl LoggingSection {
    pub fn merge(&mut self, other: &LoggingSection) {
        if other.filter.is_some() {
            self.filter = other.filter.clone();
        }
    }
}

/// Resolved engine limits consumed by the runtime
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineLimits {
    pub call_recursion_limit: usize,
    pub value_stack_initial: usize,
    pub value_stack_reserve: usize,
    pub value_stack_limit: usize,
}

impl Default for EngineLimits {
    fn default() -> Self {
        Self {
            call_recursion_limit: DEFAULT_CALL_RECURSION_LIMIT,
            value_stack_initial: DEFAULT_VALUE_STACK_INITIAL,
            value_stack_reserve: DEFAULT_VALUE_STACK_RESERVE,
            value_stack_limit: DEFAULT_VALUE_STACK_LIMIT,
        }
    }
}

impl EngineLimits {
    /// Resolve a (merged) section against the built-in defaults
    pub fn from_section(section: &EngineSection) -> Self {
        let defaults = Self::default();
        Self {
            call_recursion_limit: section
                .call_recursion_limit
                .unwrap_or(defaults.call_recursion_limit),
            value_stack_initial: section
                .value_stack_initial
                .unwrap_or(defaults.value_stack_initial),
            value_stack_reserve: section
                .value_stack_reserve
                .unwrap_or(defaults.value_stack_reserve),
            value_stack_limit: section
                .value_stack_limit
                .unwrap_or(defaults.value_stack_limit),
        }
    }

    /// Check cross-field consistency
    pub fn validate(&self) -> ConfigResult<()> {
        if self.call_recursion_limit == 0 {
            return Err(ConfigError::InvalidValue {
                field: "engine.call_recursion_limit".to_string(),
                reason: "must be greater than zero".to_string(),
            });
        }
        if self.value_stack_reserve == 0 {
            return Err(ConfigError::InvalidValue {
                field: "engine.value_stack_reserve".to_string(),
                reason: "must be greater than zero".to_string(),
            });
        }
        if self.value_stack_initial > self.value_stack_limit {
            return Err(ConfigError::InvalidValue {
                field: "engine.value_stack_initial".to_string(),
                reason: format!(
                    "{} exceeds value_stack_limit {}",
                    self.value_stack_initial, self.value_stack_limit
                ),
            });
        }
        if self.value_stack_reserve >= self.value_stack_limit {
            return Err(ConfigError::InvalidValue {
                field: "engine.value_stack_reserve".to_string(),
                reason: format!(
                    "{} must be below value_stack_limit {}",
                    self.value_stack_reserve, self.value_stack_limit
                ),
            });
        }
        Ok(())
    }
}
