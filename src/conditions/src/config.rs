//! Engine configuration loading and validation
//!
//! Configuration is read once at startup and handed to the components that
//! need it; nothing here is global.
//!
//! ```toml
//! [engine]
//! default_decision = "DENY"
//!
//! [logging]
//! level = "info"
//!
//! [evaluators.aliases]
//! "__tagsNoneOf" = "tags-none-present"
//! ```

use crate::error::{ConditionError, Result};
use crate::evaluator::EvaluatorRegistry;
use crate::policy::PolicyEffect;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Complete engine configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub engine: EngineSection,

    #[serde(default)]
    pub logging: LoggingSection,

    #[serde(default)]
    pub evaluators: EvaluatorsSection,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EngineSection {
    /// Decision when no policy matches
    #[serde(default = "default_decision")]
    pub default_decision: PolicyEffect,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingSection {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_true")]
    pub with_target: bool,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct EvaluatorsSection {
    /// Authoring name -> built-in condition kind
    #[serde(default)]
    pub aliases: HashMap<String, String>,
}

fn default_decision() -> PolicyEffect {
    PolicyEffect::Deny
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}

impl Default for EngineSection {
    fn default() -> Self {
        Self {
            default_decision: default_decision(),
        }
    }
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            with_target: true,
        }
    }
}

impl EngineConfig {
    /// Load and validate configuration from a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let contents = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&contents)
    }

    /// Parse and validate configuration from TOML text
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config: Self = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if !LOG_LEVELS.contains(&self.logging.level.as_str()) {
            return Err(ConditionError::InvalidConfig(format!(
                "logging.level must be one of {:?}, got '{}'",
                LOG_LEVELS, self.logging.level
            )));
        }

        if self.evaluators.aliases.keys().any(|alias| alias.trim().is_empty()) {
            return Err(ConditionError::InvalidConfig(
                "evaluators.aliases contains an empty alias".to_string(),
            ));
        }

        Ok(())
    }

    /// Build the evaluator registry with configured aliases applied
    pub fn build_registry(&self) -> Result<EvaluatorRegistry> {
        let mut registry = EvaluatorRegistry::new();
        for (alias, kind) in &self.evaluators.aliases {
            registry.register_alias(alias.clone(), kind).map_err(|_| {
                ConditionError::InvalidConfig(format!(
                    "Alias '{}' targets unknown condition kind '{}'",
                    alias, kind
                ))
            })?;
        }
        Ok(registry)
    }
}
