//! Configuration types for the wrapper stage.
//!
//! Every struct implements [`Default`], so an empty file (or a bare
//! `[wrapper]` header) is a valid configuration that wraps nothing visible.

use serde::{Deserialize, Serialize};

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Header, footer, filename test and phase.
    pub wrapper: WrapperSection,
    /// Logging level, format, and per-crate directives.
    pub logging: LoggingSection,
}

// ---------------------------------------------------------------------------
// WrapperSection
// ---------------------------------------------------------------------------

/// The wrapper stage's options.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct WrapperSection {
    /// Text prepended to each matching file.
    pub header: ContentSection,
    /// Text appended to each matching file.
    pub footer: ContentSection,
    /// Filenames that participate. Absent means every file.
    pub test: Option<TestSection>,
    /// Additional filter every participating filename must also match.
    pub include: Option<TestSection>,
    /// Filenames matching this are left alone even if `test` matches.
    pub exclude: Option<TestSection>,
    /// Wrap after the host's optimizers instead of before.
    pub after_optimizations: bool,
}

/// Header or footer content.
///
/// A plain string is literal text; `{ template = "..." }` substitutes
/// `[name]`, `[file]`, `[hash]`, `[fullhash]` and `[chunkhash]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ContentSection {
    /// Literal text.
    Text(String),
    /// Placeholder template.
    Template {
        /// The template text.
        template: String,
    },
}

impl Default for ContentSection {
    fn default() -> Self {
        Self::Text(String::new())
    }
}

/// Filename test.
///
/// A plain string is a filename prefix, `{ regex = "..." }` and
/// `{ glob = "..." }` are patterns, and an array matches if any element does.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TestSection {
    /// Filename prefix.
    Prefix(String),
    /// Regular expression.
    Regex {
        /// The pattern.
        regex: String,
    },
    /// Glob pattern.
    Glob {
        /// The pattern.
        glob: String,
    },
    /// Any of several tests.
    AnyOf(Vec<TestSection>),
}

// ---------------------------------------------------------------------------
// LoggingSection
// ---------------------------------------------------------------------------

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    /// Global log level filter (`"trace"`, `"debug"`, `"info"`, `"warn"`,
    /// `"error"`).
    pub level: String,
    /// Output format: `"pretty"`, `"compact"`, `"json"` or `"full"`.
    pub format: String,
    /// Per-crate tracing directives (e.g. `["swaddle_plugin=trace"]`).
    pub directives: Vec<String>,
    /// Write logs to files in this directory instead of stderr.
    pub directory: Option<String>,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: "info".to_owned(),
            format: "compact".to_owned(),
            directives: Vec::new(),
            directory: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.wrapper.header, ContentSection::Text(String::new()));
        assert!(config.wrapper.test.is_none());
        assert!(!config.wrapper.after_optimizations);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_content_shapes() {
        let config: Config = toml::from_str(
            r#"
            [wrapper]
            header = "/* start */"
            footer = { template = "/* [chunkhash] */" }
            "#,
        )
        .unwrap();
        assert_eq!(
            config.wrapper.header,
            ContentSection::Text("/* start */".into())
        );
        assert_eq!(
            config.wrapper.footer,
            ContentSection::Template {
                template: "/* [chunkhash] */".into()
            }
        );
    }

    #[test]
    fn test_test_shapes() {
        let config: Config = toml::from_str(
            r#"
            [wrapper]
            test = ["bundle", { regex = "\\.js$" }, { glob = "*.mjs" }]
            exclude = { regex = "vendor" }
            "#,
        )
        .unwrap();
        let Some(TestSection::AnyOf(tests)) = config.wrapper.test else {
            panic!("expected a list of tests");
        };
        assert_eq!(tests[0], TestSection::Prefix("bundle".into()));
        assert_eq!(
            tests[1],
            TestSection::Regex {
                regex: "\\.js$".into()
            }
        );
        assert_eq!(
            tests[2],
            TestSection::Glob {
                glob: "*.mjs".into()
            }
        );
        assert!(matches!(
            config.wrapper.exclude,
            Some(TestSection::Regex { .. })
        ));
    }
}
