//! Header + artifact + footer composition.

use swaddle_core::{ConcatSource, HashContext, SourceRef, WrapResult};

use crate::cache::IdentityCache;
use crate::content::{self, WrapSpec};

/// Builds wrapped composites, reusing earlier ones for unchanged artifacts.
#[derive(Debug, Default)]
pub struct Wrapper {
    header: WrapSpec,
    footer: WrapSpec,
    cache: IdentityCache,
}

impl Wrapper {
    /// Create a wrapper with an empty cache.
    #[must_use]
    pub fn new(header: WrapSpec, footer: WrapSpec) -> Self {
        Self {
            header,
            footer,
            cache: IdentityCache::new(),
        }
    }

    /// Wrap `source`, the current artifact for `filename`.
    ///
    /// The composite linearizes to `header ++ source ++ footer` with nothing
    /// in between. Installing it in the asset table is up to the caller.
    ///
    /// # Errors
    ///
    /// Returns the header or footer resolution error, if any.
    pub fn wrap(
        &self,
        filename: &str,
        source: &SourceRef,
        ctx: &HashContext,
    ) -> WrapResult<SourceRef> {
        let header = content::resolve(&self.header, filename, ctx)?;
        let footer = content::resolve(&self.footer, filename, ctx)?;

        self.cache.get_or_build(source, &header, &footer, || {
            Ok(ConcatSource::wrap(header.as_str(), source, footer.as_str()).into_ref())
        })
    }

    /// The composite cache.
    #[must_use]
    pub fn cache(&self) -> &IdentityCache {
        &self.cache
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use swaddle_core::{RawSource, WrapError};

    #[test]
    fn test_wrap_concatenates_in_order() {
        let wrapper = Wrapper::new("/* start */".into(), "/* end */".into());
        let source = RawSource::new("main();").into_ref();

        let wrapped = wrapper
            .wrap("bundle.js", &source, &HashContext::empty())
            .unwrap();

        assert_eq!(wrapped.source(), "/* start */main();/* end */");
        assert_eq!(source.source(), "main();");
    }

    #[test]
    fn test_wrap_reuses_composite() {
        let wrapper = Wrapper::new("(function(){".into(), "})();".into());
        let source = RawSource::new("x").into_ref();
        let ctx = HashContext::empty();

        let first = wrapper.wrap("a.js", &source, &ctx).unwrap();
        let second = wrapper.wrap("a.js", &source, &ctx).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn test_hash_dependent_header_changes_composite() {
        let wrapper = Wrapper::new(
            WrapSpec::function(|_, ctx| Ok(format!("/* {} */", ctx.chunk_hash()?))),
            WrapSpec::default(),
        );
        let source = RawSource::new("x").into_ref();

        let first = wrapper
            .wrap("a.js", &source, &HashContext::empty().with_chunk_hash("1"))
            .unwrap();
        let second = wrapper
            .wrap("a.js", &source, &HashContext::empty().with_chunk_hash("2"))
            .unwrap();

        assert!(!Arc::ptr_eq(&first, &second));
        assert_eq!(second.source(), "/* 2 */x");
    }

    #[test]
    fn test_wrap_surfaces_hash_context_error() {
        let wrapper = Wrapper::new(WrapSpec::template("[chunkhash]"), WrapSpec::default());
        let source = RawSource::new("x").into_ref();

        let err = wrapper
            .wrap("a.js", &source, &HashContext::empty())
            .unwrap_err();
        assert!(matches!(err, WrapError::InvalidHashContext { .. }));
        assert!(wrapper.cache().is_empty());
    }
}
