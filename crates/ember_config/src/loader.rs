//! Configuration file loading and validation.

use crate::error::ConfigError;
use crate::types::EngineConfig;
use std::path::Path;

/// Conventional configuration file name.
pub const CONFIG_FILE_NAME: &str = "ember.toml";

/// Loads and validates an engine configuration file.
pub fn load_config(path: &Path) -> Result<EngineConfig, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    load_config_from_str(&content)
}

/// Parses and validates an engine configuration from a string.
pub fn load_config_from_str(content: &str) -> Result<EngineConfig, ConfigError> {
    let config: EngineConfig =
        toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
    validate_config(&config)?;
    Ok(config)
}

/// Checks the cross-field constraints that serde cannot express.
pub fn validate_config(config: &EngineConfig) -> Result<(), ConfigError> {
    if config.engine.lazy_compilation {
        return Err(ConfigError::ValidationError(
            "engine.lazy_compilation must be false: artifacts cannot carry uncompiled functions"
                .to_string(),
        ));
    }
    if config.engine.max_call_depth == 0 {
        return Err(ConfigError::ValidationError(
            "engine.max_call_depth must be at least 1".to_string(),
        ));
    }
    if config.cache.generations == 0 {
        return Err(ConfigError::ValidationError(
            "cache.generations must be at least 1".to_string(),
        ));
    }
    if config.artifact.max_functions == 0 {
        return Err(ConfigError::ValidationError(
            "artifact.max_functions must be at least 1".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ember_common::{FingerprintPolicy, LanguageMode};

    #[test]
    fn empty_config_uses_defaults() {
        let config = load_config_from_str("").unwrap();
        assert_eq!(config, EngineConfig::default());
        assert_eq!(config.engine.max_call_depth, 1024);
        assert!(config.cache.enabled);
        assert_eq!(config.cache.generations, 4);
        assert_eq!(config.artifact.placeholder_key, "");
        assert_eq!(
            config.artifact.fingerprint_policy,
            FingerprintPolicy::Permissive
        );
    }

    #[test]
    fn parse_full_config() {
        let toml = r#"
[engine]
language_mode = "strict"
max_call_depth = 64

[cache]
enabled = false
generations = 2

[artifact]
fingerprint_policy = "enforced"
placeholder_key = "<precompiled>"
max_functions = 10
"#;
        let config = load_config_from_str(toml).unwrap();
        assert_eq!(config.engine.language_mode, LanguageMode::Strict);
        assert_eq!(config.engine.max_call_depth, 64);
        assert!(!config.cache.enabled);
        assert_eq!(config.cache.generations, 2);
        assert_eq!(config.artifact.fingerprint_policy, FingerprintPolicy::Enforced);
        assert_eq!(config.artifact.placeholder_key, "<precompiled>");
        assert_eq!(config.artifact.max_functions, 10);
        assert!(config.flags().language_mode.is_strict());
    }

    #[test]
    fn lazy_compilation_rejected() {
        let err = load_config_from_str("[engine]\nlazy_compilation = true\n").unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }

    #[test]
    fn zero_generations_rejected() {
        let err = load_config_from_str("[cache]\ngenerations = 0\n").unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }

    #[test]
    fn unknown_field_is_parse_error() {
        let err = load_config_from_str("[engine]\nturbo = true\n").unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(_)));
    }

    #[test]
    fn bad_enum_value_is_parse_error() {
        let err = load_config_from_str("[engine]\nlanguage_mode = \"loose\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(_)));
    }

    #[test]
    fn load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(&path, "[engine]\nlanguage_mode = \"strict\"\n").unwrap();
        let config = load_config(&path).unwrap();
        assert_eq!(config.engine.language_mode, LanguageMode::Strict);
    }

    #[test]
    fn load_missing_file_is_io_error() {
        let err = load_config(Path::new("/nonexistent/ember.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::IoError(_)));
    }
}
