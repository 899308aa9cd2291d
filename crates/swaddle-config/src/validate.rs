//! Configuration validation.
//!
//! Checks the logging whitelists and that every regex and glob in the
//! filename tests compiles, so a bad pattern fails at load time rather than
//! on the first matching asset.

use crate::error::{ConfigError, ConfigResult};
use crate::types::{Config, TestSection};

/// Validate a deserialized configuration.
///
/// # Errors
///
/// Returns the first validation error found.
pub fn validate(config: &Config) -> ConfigResult<()> {
    validate_tests(config)?;
    validate_logging(config)?;
    Ok(())
}

fn validate_tests(config: &Config) -> ConfigResult<()> {
    let w = &config.wrapper;
    for (field, test) in [
        ("wrapper.test", &w.test),
        ("wrapper.include", &w.include),
        ("wrapper.exclude", &w.exclude),
    ] {
        if let Some(test) = test {
            validate_test(field, test)?;
        }
    }
    Ok(())
}

fn validate_test(field: &str, test: &TestSection) -> ConfigResult<()> {
    match test {
        TestSection::Prefix(_) => Ok(()),
        TestSection::Regex { regex } => regex::Regex::new(regex).map(|_| ()).map_err(|e| {
            ConfigError::ValidationError {
                field: field.to_owned(),
                message: format!("invalid regex '{regex}': {e}"),
            }
        }),
        TestSection::Glob { glob } => globset::Glob::new(glob).map(|_| ()).map_err(|e| {
            ConfigError::ValidationError {
                field: field.to_owned(),
                message: format!("invalid glob '{glob}': {e}"),
            }
        }),
        TestSection::AnyOf(tests) => tests.iter().try_for_each(|t| validate_test(field, t)),
    }
}

fn validate_logging(config: &Config) -> ConfigResult<()> {
    let valid_levels = ["trace", "debug", "info", "warn", "error"];
    if !valid_levels.contains(&config.logging.level.as_str()) {
        return Err(ConfigError::ValidationError {
            field: "logging.level".to_owned(),
            message: format!(
                "unsupported log level '{}'; expected one of: {}",
                config.logging.level,
                valid_levels.join(", ")
            ),
        });
    }

    let valid_formats = ["pretty", "compact", "json", "full"];
    if !valid_formats.contains(&config.logging.format.as_str()) {
        return Err(ConfigError::ValidationError {
            field: "logging.format".to_owned(),
            message: format!(
                "unsupported log format '{}'; expected one of: {}",
                config.logging.format,
                valid_formats.join(", ")
            ),
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate(&Config::default()).is_ok());
    }

    #[test]
    fn test_invalid_regex() {
        let mut config = Config::default();
        config.wrapper.test = Some(TestSection::Regex {
            regex: "(unclosed".to_owned(),
        });
        let err = validate(&config).unwrap_err();
        assert!(
            matches!(err, ConfigError::ValidationError { ref field, .. } if field == "wrapper.test")
        );
    }

    #[test]
    fn test_invalid_glob_nested() {
        let mut config = Config::default();
        config.wrapper.exclude = Some(TestSection::AnyOf(vec![
            TestSection::Prefix("ok".to_owned()),
            TestSection::Glob {
                glob: "[unclosed".to_owned(),
            },
        ]));
        let err = validate(&config).unwrap_err();
        assert!(
            matches!(err, ConfigError::ValidationError { ref field, .. } if field == "wrapper.exclude")
        );
    }

    #[test]
    fn test_invalid_log_level() {
        let mut config = Config::default();
        config.logging.level = "loud".to_owned();
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_invalid_log_format() {
        let mut config = Config::default();
        config.logging.format = "xml".to_owned();
        assert!(validate(&config).is_err());
    }
}
