//! Wrapper options.
//!
//! Options are validated once, when they are built. Hosts that hand over
//! loosely typed options use [`WrapperOptions::from_value`]; file-based
//! configuration converts through `TryFrom<&WrapperSection>`.

use serde_json::{Map, Value};
use tracing::warn;

use swaddle_config::{ContentSection, TestSection, WrapperSection};
use swaddle_core::{Phase, WrapError, WrapResult};

use crate::content::WrapSpec;
use crate::matcher::{FileFilter, TestSpec};

/// Configuration of one wrapper stage.
#[derive(Debug, Clone, Default)]
pub struct WrapperOptions {
    /// Text put before each matching file. Defaults to nothing.
    pub header: WrapSpec,
    /// Text put after each matching file. Defaults to nothing.
    pub footer: WrapSpec,
    /// Filenames that participate. Defaults to every file.
    pub test: TestSpec,
    /// Filenames must also match this, when set.
    pub include: Option<TestSpec>,
    /// Filenames matching this are skipped, when set.
    pub exclude: Option<TestSpec>,
    /// Wrap after the host's optimizers instead of before.
    pub after_optimizations: bool,
}

impl WrapperOptions {
    /// Options with every field at its default.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the header.
    #[must_use]
    pub fn with_header(mut self, header: impl Into<WrapSpec>) -> Self {
        self.header = header.into();
        self
    }

    /// Set the footer.
    #[must_use]
    pub fn with_footer(mut self, footer: impl Into<WrapSpec>) -> Self {
        self.footer = footer.into();
        self
    }

    /// Set the filename test.
    #[must_use]
    pub fn with_test(mut self, test: impl Into<TestSpec>) -> Self {
        self.test = test.into();
        self
    }

    /// Set the include filter.
    #[must_use]
    pub fn with_include(mut self, include: impl Into<TestSpec>) -> Self {
        self.include = Some(include.into());
        self
    }

    /// Set the exclude filter.
    #[must_use]
    pub fn with_exclude(mut self, exclude: impl Into<TestSpec>) -> Self {
        self.exclude = Some(exclude.into());
        self
    }

    /// Choose the post-optimization phase.
    #[must_use]
    pub fn after_optimizations(mut self, after: bool) -> Self {
        self.after_optimizations = after;
        self
    }

    /// The phase these options select.
    #[must_use]
    pub fn phase(&self) -> Phase {
        Phase::from_after_optimizations(self.after_optimizations)
    }

    /// The filename filter these options describe.
    #[must_use]
    pub fn filter(&self) -> FileFilter {
        FileFilter {
            test: self.test.clone(),
            include: self.include.clone(),
            exclude: self.exclude.clone(),
        }
    }

    /// Build options from a loosely typed host object.
    ///
    /// Recognised keys: `header`, `footer` (string, number, boolean or
    /// `{ "template": ... }`), `test`, `include`, `exclude` (string prefix,
    /// `{ "regex": ... }`, `{ "glob": ... }` or an array of those) and
    /// `afterOptimizations` (boolean). `null` means "use the default".
    ///
    /// # Errors
    ///
    /// Returns [`WrapError::InvalidConfiguration`] if `value` is not an
    /// object, or a recognised key has the wrong shape or an invalid pattern.
    pub fn from_value(value: &Value) -> WrapResult<Self> {
        let Value::Object(map) = value else {
            return Err(WrapError::invalid_configuration(
                "options",
                format!("expected an object, got {}", kind_of(value)),
            ));
        };

        let mut options = Self::default();
        for (key, value) in map {
            match key.as_str() {
                "header" => options.header = content_from_value("header", value)?,
                "footer" => options.footer = content_from_value("footer", value)?,
                "test" => {
                    options.test = test_from_value("test", value)?.unwrap_or_default();
                },
                "include" => options.include = test_from_value("include", value)?,
                "exclude" => options.exclude = test_from_value("exclude", value)?,
                "afterOptimizations" | "after_optimizations" => {
                    options.after_optimizations = match value {
                        Value::Null => false,
                        Value::Bool(b) => *b,
                        other => {
                            return Err(WrapError::invalid_configuration(
                                key,
                                format!("expected a boolean, got {}", kind_of(other)),
                            ));
                        },
                    };
                },
                unknown => warn!(option = unknown, "ignoring unknown wrapper option"),
            }
        }

        Ok(options)
    }
}

impl TryFrom<&WrapperSection> for WrapperOptions {
    type Error = WrapError;

    fn try_from(section: &WrapperSection) -> Result<Self, Self::Error> {
        Ok(Self {
            header: content_from_section(&section.header),
            footer: content_from_section(&section.footer),
            test: section
                .test
                .as_ref()
                .map(|t| test_from_section("wrapper.test", t))
                .transpose()?
                .unwrap_or_default(),
            include: section
                .include
                .as_ref()
                .map(|t| test_from_section("wrapper.include", t))
                .transpose()?,
            exclude: section
                .exclude
                .as_ref()
                .map(|t| test_from_section("wrapper.exclude", t))
                .transpose()?,
            after_optimizations: section.after_optimizations,
        })
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

fn content_from_value(field: &str, value: &Value) -> WrapResult<WrapSpec> {
    match value {
        Value::Null => Ok(WrapSpec::default()),
        Value::String(text) => Ok(WrapSpec::Text(text.clone())),
        Value::Number(n) => Ok(WrapSpec::text(n)),
        Value::Bool(b) => Ok(WrapSpec::text(b)),
        Value::Object(map) => match single_string(map, "template") {
            Some(template) => Ok(WrapSpec::template(template)),
            None => Err(WrapError::invalid_configuration(
                field,
                "expected text or { \"template\": \"...\" }",
            )),
        },
        Value::Array(_) => Err(WrapError::invalid_configuration(
            field,
            "expected text, got an array",
        )),
    }
}

fn test_from_value(field: &str, value: &Value) -> WrapResult<Option<TestSpec>> {
    let spec = match value {
        Value::Null => return Ok(None),
        Value::String(prefix) => TestSpec::prefix(prefix.as_str()),
        Value::Array(items) => TestSpec::AnyOf(
            items
                .iter()
                .filter_map(|item| test_from_value(field, item).transpose())
                .collect::<WrapResult<Vec<_>>>()?,
        ),
        Value::Object(map) => {
            if let Some(pattern) = single_string(map, "regex") {
                TestSpec::regex(pattern).map_err(|e| rename_field(e, field))?
            } else if let Some(pattern) = single_string(map, "glob") {
                TestSpec::glob(pattern).map_err(|e| rename_field(e, field))?
            } else {
                return Err(WrapError::invalid_configuration(
                    field,
                    "expected { \"regex\": \"...\" } or { \"glob\": \"...\" }",
                ));
            }
        },
        other => {
            return Err(WrapError::invalid_configuration(
                field,
                format!("expected a string, pattern or array, got {}", kind_of(other)),
            ));
        },
    };
    Ok(Some(spec))
}

fn single_string<'a>(map: &'a Map<String, Value>, key: &str) -> Option<&'a str> {
    if map.len() != 1 {
        return None;
    }
    map.get(key).and_then(Value::as_str)
}

fn rename_field(error: WrapError, field: &str) -> WrapError {
    match error {
        WrapError::InvalidConfiguration { message, .. } => {
            WrapError::invalid_configuration(field, message)
        },
        other => other,
    }
}

fn content_from_section(section: &ContentSection) -> WrapSpec {
    match section {
        ContentSection::Text(text) => WrapSpec::Text(text.clone()),
        ContentSection::Template { template } => WrapSpec::template(template.as_str()),
    }
}

fn test_from_section(field: &str, section: &TestSection) -> WrapResult<TestSpec> {
    let spec = match section {
        TestSection::Prefix(prefix) => TestSpec::prefix(prefix.as_str()),
        TestSection::Regex { regex } => {
            TestSpec::regex(regex).map_err(|e| rename_field(e, field))?
        },
        TestSection::Glob { glob } => TestSpec::glob(glob).map_err(|e| rename_field(e, field))?,
        TestSection::AnyOf(tests) => TestSpec::AnyOf(
            tests
                .iter()
                .map(|t| test_from_section(field, t))
                .collect::<WrapResult<Vec<_>>>()?,
        ),
    };
    Ok(spec)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use swaddle_core::HashContext;

    use crate::content::resolve;

    #[test]
    fn test_defaults() {
        let options = WrapperOptions::from_value(&json!({})).unwrap();
        assert_eq!(options.phase(), Phase::BeforeOptimization);
        assert!(options.filter().accepts("anything.js"));
        assert_eq!(
            resolve(&options.header, "a.js", &HashContext::empty()).unwrap(),
            ""
        );
    }

    #[test]
    fn test_non_object_rejected() {
        for value in [json!("header"), json!(42), json!(null), json!([1, 2])] {
            let err = WrapperOptions::from_value(&value).unwrap_err();
            assert!(
                matches!(err, WrapError::InvalidConfiguration { ref field, .. } if field == "options")
            );
        }
    }

    #[test]
    fn test_full_object() {
        let options = WrapperOptions::from_value(&json!({
            "header": "/* start */",
            "footer": { "template": "/* [chunkhash] */" },
            "test": ["bundle", { "regex": "\\.mjs$" }],
            "exclude": { "glob": "*.map" },
            "afterOptimizations": true
        }))
        .unwrap();

        assert_eq!(options.phase(), Phase::AfterOptimization);
        let filter = options.filter();
        assert!(filter.accepts("bundle.js"));
        assert!(filter.accepts("lib.mjs"));
        assert!(!filter.accepts("vendor.js"));
        assert!(!filter.accepts("bundle.js.map"));

        let ctx = HashContext::empty().with_chunk_hash("abc");
        assert_eq!(resolve(&options.footer, "a.js", &ctx).unwrap(), "/* abc */");
    }

    #[test]
    fn test_scalar_content_is_coerced() {
        let options = WrapperOptions::from_value(&json!({ "header": 1, "footer": false })).unwrap();
        let ctx = HashContext::empty();
        assert_eq!(resolve(&options.header, "a", &ctx).unwrap(), "1");
        assert_eq!(resolve(&options.footer, "a", &ctx).unwrap(), "false");
    }

    #[test]
    fn test_bad_shapes() {
        let cases = [
            (json!({ "header": ["a"] }), "header"),
            (json!({ "footer": { "text": "a" } }), "footer"),
            (json!({ "test": 3 }), "test"),
            (json!({ "test": { "regex": "(" } }), "test"),
            (json!({ "exclude": { "glob": "[" } }), "exclude"),
            (json!({ "afterOptimizations": "yes" }), "afterOptimizations"),
        ];
        for (value, expected) in cases {
            let err = WrapperOptions::from_value(&value).unwrap_err();
            assert!(
                matches!(err, WrapError::InvalidConfiguration { ref field, .. } if field == expected),
                "{value} -> {err}"
            );
        }
    }

    #[test]
    fn test_unknown_keys_ignored() {
        let options = WrapperOptions::from_value(&json!({ "banner": "x" })).unwrap();
        assert!(matches!(options.header, WrapSpec::Text(ref text) if text.is_empty()));
    }

    #[test]
    fn test_builder() {
        let options = WrapperOptions::new()
            .with_header("<")
            .with_footer(">")
            .with_test("app")
            .with_exclude(TestSpec::regex("legacy").unwrap())
            .after_optimizations(true);

        assert_eq!(options.phase(), Phase::AfterOptimization);
        assert!(options.filter().accepts("app.js"));
        assert!(!options.filter().accepts("app.legacy.js"));
    }

    #[test]
    fn test_from_config_section() {
        let section = WrapperSection {
            header: ContentSection::Template {
                template: "/*! [name] */".to_owned(),
            },
            test: Some(TestSection::Regex {
                regex: r"\.js$".to_owned(),
            }),
            after_optimizations: true,
            ..WrapperSection::default()
        };

        let options = WrapperOptions::try_from(&section).unwrap();
        assert!(options.after_optimizations);
        assert!(options.filter().accepts("main.js"));
        assert!(!options.filter().accepts("main.css"));
        assert_eq!(
            resolve(&options.header, "main.js", &HashContext::empty()).unwrap(),
            "/*! main */"
        );
    }

    #[test]
    fn test_from_config_section_bad_pattern() {
        let section = WrapperSection {
            include: Some(TestSection::Glob {
                glob: "[".to_owned(),
            }),
            ..WrapperSection::default()
        };
        let err = WrapperOptions::try_from(&section).unwrap_err();
        assert!(
            matches!(err, WrapError::InvalidConfiguration { ref field, .. } if field == "wrapper.include")
        );
    }
}
