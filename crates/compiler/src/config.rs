// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Compiler configuration
//!
//! Two switches control a compilation:
//!
//! - `allow_undefined_variables`: unresolvable references become `Dynamic`
//!   bindings instead of `UndefinedVariable` problems
//! - `strict`: any reported problem fails the compilation
//!
//! Settings come from a JSON payload, from the environment, or from code.
//!
//! ## Example
//!
//! ```rust
//! use nested_sql_compiler::CompilerConfig;
//! use serde_json::json;
//!
//! let settings = json!({ "nestedSql": { "allowUndefinedVariables": true } });
//! let config = CompilerConfig::from_json(&settings).unwrap();
//! assert!(config.allow_undefined_variables);
//! assert!(!config.strict);
//! ```

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{ConfigError, ConfigResult};

/// Settings key holding the compiler section of a JSON payload
pub const SETTINGS_KEY: &str = "nestedSql";

/// Environment variable for `allow_undefined_variables`
pub const ENV_ALLOW_UNDEFINED: &str = "NESTED_SQL_ALLOW_UNDEFINED";

/// Environment variable for `strict`
pub const ENV_STRICT: &str = "NESTED_SQL_STRICT";

/// Compiler configuration
///
/// The default is permissive: undefined variables are reported as problems
/// and the compilation still completes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct CompilerConfig {
    /// Defer unresolvable references to runtime
    pub allow_undefined_variables: bool,

    /// Fail on the first compilation that reports a problem
    pub strict: bool,
}

impl CompilerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn allow_undefined_variables(mut self, allow: bool) -> Self {
        self.allow_undefined_variables = allow;
        self
    }

    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Validate the configuration
    ///
    /// A strict compilation cannot admit dynamic references.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.strict && self.allow_undefined_variables {
            return Err(ConfigError::StrictWithUndefined);
        }
        Ok(())
    }

    /// Parse the compiler section of a settings payload.
    ///
    /// Expected shape:
    /// {
    ///   "nestedSql": {
    ///     "allowUndefinedVariables": true | false,
    ///     "strict": true | false
    ///   }
    /// }
    ///
    /// A payload without the section yields the default configuration.
    pub fn from_json(settings: &Value) -> ConfigResult<Self> {
        let Some(section) = settings.get(SETTINGS_KEY) else {
            return Ok(Self::default());
        };

        let config: Self = serde_json::from_value(section.clone())
            .map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Read the configuration from the process environment
    pub fn from_env() -> ConfigResult<Self> {
        Self::from_env_with(|key| std::env::var(key).ok())
    }

    /// Read the configuration through `lookup`, which maps a variable name
    /// to its value
    pub fn from_env_with(lookup: impl Fn(&str) -> Option<String>) -> ConfigResult<Self> {
        let mut config = Self::default();

        if let Some(value) = lookup(ENV_ALLOW_UNDEFINED) {
            config.allow_undefined_variables = parse_flag(ENV_ALLOW_UNDEFINED, &value)?;
        }
        if let Some(value) = lookup(ENV_STRICT) {
            config.strict = parse_flag(ENV_STRICT, &value)?;
        }

        config.validate()?;
        Ok(config)
    }
}

fn parse_flag(key: &str, value: &str) -> ConfigResult<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_default_is_permissive() {
        let config = CompilerConfig::default();
        assert!(!config.allow_undefined_variables);
        assert!(!config.strict);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_strict_with_undefined_rejected() {
        let config = CompilerConfig::new()
            .strict(true)
            .allow_undefined_variables(true);
        assert_eq!(config.validate(), Err(ConfigError::StrictWithUndefined));
    }

    #[test]
    fn test_from_json_reads_section() {
        let config = CompilerConfig::from_json(&json!({
            "nestedSql": { "strict": true }
        }))
        .unwrap();
        assert_eq!(config, CompilerConfig::new().strict(true));
    }

    #[test]
    fn test_from_json_without_section_is_default() {
        let config = CompilerConfig::from_json(&json!({ "other": {} })).unwrap();
        assert_eq!(config, CompilerConfig::default());
    }

    #[test]
    fn test_from_json_rejects_unknown_keys() {
        let err = CompilerConfig::from_json(&json!({
            "nestedSql": { "allowUndefined": true }
        }))
        .unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_from_json_rejects_contradiction() {
        let err = CompilerConfig::from_json(&json!({
            "nestedSql": { "strict": true, "allowUndefinedVariables": true }
        }))
        .unwrap_err();
        assert_eq!(err, ConfigError::StrictWithUndefined);
    }

    #[test]
    fn test_from_env_flags() {
        let config = CompilerConfig::from_env_with(env(&[(ENV_ALLOW_UNDEFINED, "Yes")])).unwrap();
        assert!(config.allow_undefined_variables);

        let config = CompilerConfig::from_env_with(env(&[(ENV_STRICT, "1")])).unwrap();
        assert!(config.strict);

        let config = CompilerConfig::from_env_with(env(&[])).unwrap();
        assert_eq!(config, CompilerConfig::default());
    }

    #[test]
    fn test_from_env_rejects_garbage() {
        let err = CompilerConfig::from_env_with(env(&[(ENV_STRICT, "maybe")])).unwrap_err();
        assert_eq!(
            err,
            ConfigError::InvalidValue {
                key: ENV_STRICT.to_string(),
                value: "maybe".to_string(),
            }
        );
        assert_eq!(
            err.to_string(),
            "Invalid value 'maybe' for NESTED_SQL_STRICT (expected true or false)"
        );
    }
}
