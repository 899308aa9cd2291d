//! Artifact model.
//!
//! Artifacts are owned by the host and handed around as [`SourceRef`]
//! handles. Their identity is the identity of the `Arc` allocation: two
//! artifacts with identical text are still different artifacts.

use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

/// A host-owned output artifact that can be linearized to text.
pub trait Source: fmt::Debug + Send + Sync {
    /// The full text of the artifact.
    fn source(&self) -> Cow<'_, str>;

    /// Size of the linearized artifact in bytes.
    fn size(&self) -> usize {
        self.source().len()
    }
}

/// Shared handle to an artifact. Pointer identity is artifact identity.
pub type SourceRef = Arc<dyn Source>;

/// An artifact backed by a plain string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawSource {
    value: String,
}

impl RawSource {
    /// Create a raw source.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
        }
    }

    /// Move this source behind a fresh [`SourceRef`].
    #[must_use]
    pub fn into_ref(self) -> SourceRef {
        Arc::new(self)
    }
}

impl Source for RawSource {
    fn source(&self) -> Cow<'_, str> {
        Cow::Borrowed(&self.value)
    }

    fn size(&self) -> usize {
        self.value.len()
    }
}

impl From<&str> for RawSource {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for RawSource {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

/// One piece of a [`ConcatSource`].
#[derive(Debug, Clone)]
pub enum ConcatPart {
    /// Literal text.
    Text(String),
    /// An embedded artifact, referenced rather than copied.
    Source(SourceRef),
}

impl ConcatPart {
    fn size(&self) -> usize {
        match self {
            Self::Text(text) => text.len(),
            Self::Source(source) => source.size(),
        }
    }
}

/// An artifact formed by concatenating text and other artifacts in order.
///
/// Embedded artifacts are held by reference; each `add_source` call keeps
/// exactly one strong reference to the embedded artifact.
#[derive(Debug, Clone, Default)]
pub struct ConcatSource {
    parts: Vec<ConcatPart>,
}

impl ConcatSource {
    /// Create an empty concatenation.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the `header ++ source ++ footer` composite.
    #[must_use]
    pub fn wrap(header: impl Into<String>, source: &SourceRef, footer: impl Into<String>) -> Self {
        Self::new()
            .with_text(header)
            .with_source(Arc::clone(source))
            .with_text(footer)
    }

    /// Append literal text.
    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.add_text(text);
        self
    }

    /// Append an artifact.
    #[must_use]
    pub fn with_source(mut self, source: SourceRef) -> Self {
        self.add_source(source);
        self
    }

    /// Append literal text in place.
    pub fn add_text(&mut self, text: impl Into<String>) {
        self.parts.push(ConcatPart::Text(text.into()));
    }

    /// Append an artifact in place.
    pub fn add_source(&mut self, source: SourceRef) {
        self.parts.push(ConcatPart::Source(source));
    }

    /// The parts in order.
    #[must_use]
    pub fn parts(&self) -> &[ConcatPart] {
        &self.parts
    }

    /// Move this composite behind a fresh [`SourceRef`].
    #[must_use]
    pub fn into_ref(self) -> SourceRef {
        Arc::new(self)
    }
}

impl Source for ConcatSource {
    fn source(&self) -> Cow<'_, str> {
        let mut out = String::with_capacity(self.size());
        for part in &self.parts {
            match part {
                ConcatPart::Text(text) => out.push_str(text),
                ConcatPart::Source(source) => out.push_str(&source.source()),
            }
        }
        Cow::Owned(out)
    }

    fn size(&self) -> usize {
        self.parts.iter().map(ConcatPart::size).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_source() {
        let raw = RawSource::new("console.log(1);");
        assert_eq!(raw.source(), "console.log(1);");
        assert_eq!(raw.size(), 15);
    }

    #[test]
    fn test_wrap_linearization() {
        let original = RawSource::new("var a = 1;").into_ref();
        let composite = ConcatSource::wrap("/* start */", &original, "/* end */");

        assert_eq!(composite.source(), "/* start */var a = 1;/* end */");
        assert_eq!(composite.size(), composite.source().len());
        assert_eq!(original.source(), "var a = 1;");
    }

    #[test]
    fn test_wrap_holds_one_reference() {
        let original = RawSource::new("x").into_ref();
        assert_eq!(Arc::strong_count(&original), 1);

        let composite = ConcatSource::wrap("", &original, "");
        assert_eq!(Arc::strong_count(&original), 2);

        drop(composite);
        assert_eq!(Arc::strong_count(&original), 1);
    }

    #[test]
    fn test_nested_concat() {
        let inner = ConcatSource::new()
            .with_text("a")
            .with_source(RawSource::new("b").into_ref())
            .into_ref();
        let outer = ConcatSource::wrap("<", &inner, ">");
        assert_eq!(outer.source(), "<ab>");
        assert_eq!(outer.parts().len(), 3);
    }
}
