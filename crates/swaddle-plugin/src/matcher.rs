//! Filename tests.
//!
//! String tests follow the host's own filename convention: they match as a
//! prefix of the output filename, so `"bundle"` selects `bundle.js` and
//! `bundle.css` alike. An empty string matches everything.

use globset::{Glob, GlobMatcher};
use regex::Regex;

use swaddle_core::{WrapError, WrapResult};

/// Decides whether a filename participates in wrapping.
#[derive(Debug, Clone, Default)]
pub enum TestSpec {
    /// Every filename.
    #[default]
    Any,
    /// Filenames starting with this string.
    Prefix(String),
    /// Filenames the regex finds a match in.
    Pattern(Regex),
    /// Filenames matching the glob.
    Glob(GlobMatcher),
    /// Filenames matching any of the tests. An empty list matches nothing.
    AnyOf(Vec<TestSpec>),
}

impl TestSpec {
    /// A prefix test. The empty prefix is [`TestSpec::Any`].
    #[must_use]
    pub fn prefix(prefix: impl Into<String>) -> Self {
        let prefix = prefix.into();
        if prefix.is_empty() {
            Self::Any
        } else {
            Self::Prefix(prefix)
        }
    }

    /// A regex test.
    ///
    /// # Errors
    ///
    /// Returns [`WrapError::InvalidConfiguration`] if the pattern does not
    /// compile.
    pub fn regex(pattern: &str) -> WrapResult<Self> {
        Regex::new(pattern)
            .map(Self::Pattern)
            .map_err(|e| WrapError::invalid_configuration("test", format!("invalid regex: {e}")))
    }

    /// A glob test.
    ///
    /// # Errors
    ///
    /// Returns [`WrapError::InvalidConfiguration`] if the pattern does not
    /// compile.
    pub fn glob(pattern: &str) -> WrapResult<Self> {
        Glob::new(pattern)
            .map(|g| Self::Glob(g.compile_matcher()))
            .map_err(|e| WrapError::invalid_configuration("test", format!("invalid glob: {e}")))
    }

    /// Whether `filename` passes this test.
    #[must_use]
    pub fn is_match(&self, filename: &str) -> bool {
        match self {
            Self::Any => true,
            Self::Prefix(prefix) => filename.starts_with(prefix.as_str()),
            Self::Pattern(re) => re.is_match(filename),
            Self::Glob(glob) => glob.is_match(filename),
            Self::AnyOf(tests) => tests.iter().any(|t| t.is_match(filename)),
        }
    }
}

impl From<&str> for TestSpec {
    fn from(prefix: &str) -> Self {
        Self::prefix(prefix)
    }
}

impl From<String> for TestSpec {
    fn from(prefix: String) -> Self {
        Self::prefix(prefix)
    }
}

impl From<Regex> for TestSpec {
    fn from(re: Regex) -> Self {
        Self::Pattern(re)
    }
}

impl From<Vec<TestSpec>> for TestSpec {
    fn from(tests: Vec<TestSpec>) -> Self {
        Self::AnyOf(tests)
    }
}

/// Whether `filename` passes `test`.
#[must_use]
pub fn matches(filename: &str, test: &TestSpec) -> bool {
    test.is_match(filename)
}

/// The `test`/`include`/`exclude` triple applied to every candidate file.
#[derive(Debug, Clone, Default)]
pub struct FileFilter {
    /// Must match.
    pub test: TestSpec,
    /// Must also match, when set.
    pub include: Option<TestSpec>,
    /// Must not match, when set.
    pub exclude: Option<TestSpec>,
}

impl FileFilter {
    /// A filter with only a `test`.
    #[must_use]
    pub fn new(test: TestSpec) -> Self {
        Self {
            test,
            include: None,
            exclude: None,
        }
    }

    /// Whether `filename` should be wrapped.
    #[must_use]
    pub fn accepts(&self, filename: &str) -> bool {
        if !self.test.is_match(filename) {
            return false;
        }
        if let Some(include) = &self.include
            && !include.is_match(filename)
        {
            return false;
        }
        if let Some(exclude) = &self.exclude
            && exclude.is_match(filename)
        {
            return false;
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_matches_everything() {
        for name in ["bundle.js", "", "css/site.css", "a/b/c.map"] {
            assert!(matches(name, &TestSpec::prefix("")));
            assert!(matches(name, &TestSpec::Any));
        }
    }

    #[test]
    fn test_prefix() {
        let test = TestSpec::from("bundle");
        assert!(test.is_match("bundle.js"));
        assert!(test.is_match("bundle.css"));
        assert!(!test.is_match("vendor.js"));
        assert!(!test.is_match("js/bundle.js"));
    }

    #[test]
    fn test_regex() {
        let test = TestSpec::regex(r"\.js$").unwrap();
        assert!(test.is_match("bundle.js"));
        assert!(test.is_match("chunks/1.js"));
        assert!(!test.is_match("bundle.js.map"));
    }

    #[test]
    fn test_invalid_regex() {
        let err = TestSpec::regex("(unclosed").unwrap_err();
        assert!(matches!(err, WrapError::InvalidConfiguration { .. }));
    }

    #[test]
    fn test_glob() {
        let test = TestSpec::glob("*.min.js").unwrap();
        assert!(test.is_match("app.min.js"));
        assert!(!test.is_match("app.js"));
        assert!(TestSpec::glob("[unclosed").is_err());
    }

    #[test]
    fn test_any_of() {
        let test = TestSpec::from(vec![
            TestSpec::from("main"),
            TestSpec::regex(r"\.mjs$").unwrap(),
        ]);
        assert!(test.is_match("main.js"));
        assert!(test.is_match("lib.mjs"));
        assert!(!test.is_match("lib.js"));
        assert!(!TestSpec::AnyOf(Vec::new()).is_match("main.js"));
    }

    #[test]
    fn test_filter_include_exclude() {
        let filter = FileFilter {
            test: TestSpec::regex(r"\.js$").unwrap(),
            include: Some(TestSpec::from("app")),
            exclude: Some(TestSpec::regex("legacy").unwrap()),
        };
        assert!(filter.accepts("app.js"));
        assert!(!filter.accepts("app.css"));
        assert!(!filter.accepts("vendor.js"));
        assert!(!filter.accepts("app.legacy.js"));
    }

    #[test]
    fn test_default_filter_accepts_all() {
        let filter = FileFilter::default();
        assert!(filter.accepts("anything.txt"));
    }
}
