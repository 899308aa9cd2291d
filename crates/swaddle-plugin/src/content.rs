//! Header and footer content.

use std::fmt;
use std::path::Path;
use std::sync::{Arc, LazyLock};

use regex::Regex;
use swaddle_core::{HashContext, WrapResult};

/// Content function: receives the output filename and the hash context.
pub type ContentFn = Arc<dyn Fn(&str, &HashContext) -> WrapResult<String> + Send + Sync>;

/// What to put before or after a file.
#[derive(Clone)]
pub enum WrapSpec {
    /// Literal text.
    Text(String),
    /// Text with `[name]`, `[base]`, `[file]`, `[hash]`, `[fullhash]` and
    /// `[chunkhash]` placeholders.
    Template(String),
    /// Computed from the filename and hash context.
    Function(ContentFn),
}

impl WrapSpec {
    /// Literal text from anything displayable.
    #[must_use]
    pub fn text(text: impl fmt::Display) -> Self {
        Self::Text(text.to_string())
    }

    /// A placeholder template.
    #[must_use]
    pub fn template(template: impl Into<String>) -> Self {
        Self::Template(template.into())
    }

    /// A content function. Its output is converted with `to_string`.
    ///
    /// Use `ctx.chunk_hash()?` / `ctx.build_hash()?` inside the function so
    /// that a hash missing in the current phase becomes an error.
    pub fn function<F, T>(f: F) -> Self
    where
        F: Fn(&str, &HashContext) -> WrapResult<T> + Send + Sync + 'static,
        T: fmt::Display,
    {
        Self::Function(Arc::new(move |filename, ctx| {
            f(filename, ctx).map(|value| value.to_string())
        }))
    }
}

impl Default for WrapSpec {
    fn default() -> Self {
        Self::Text(String::new())
    }
}

impl fmt::Debug for WrapSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(text) => f.debug_tuple("Text").field(text).finish(),
            Self::Template(template) => f.debug_tuple("Template").field(template).finish(),
            Self::Function(_) => f.write_str("Function(..)"),
        }
    }
}

impl From<&str> for WrapSpec {
    fn from(text: &str) -> Self {
        Self::Text(text.to_owned())
    }
}

impl From<String> for WrapSpec {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

/// Produce the concrete text for `spec`.
///
/// # Errors
///
/// Returns [`swaddle_core::WrapError::InvalidHashContext`] when a template
/// references a hash the context lacks, and whatever a content function
/// returns, unchanged.
pub fn resolve(spec: &WrapSpec, filename: &str, ctx: &HashContext) -> WrapResult<String> {
    match spec {
        WrapSpec::Text(text) => Ok(text.clone()),
        WrapSpec::Template(template) => render_template(template, filename, ctx),
        WrapSpec::Function(f) => f(filename, ctx),
    }
}

/// A bracketed word, e.g. `[chunkhash]`. The innermost pair wins, so
/// `[[name]]` and `'[name]'` both expose `[name]`.
static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[(\w+)\]").expect("invalid regex"));

fn render_template(template: &str, filename: &str, ctx: &HashContext) -> WrapResult<String> {
    let mut out = String::with_capacity(template.len());
    let mut last = 0;

    for caps in PLACEHOLDER.captures_iter(template) {
        let (Some(whole), Some(token)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        // Unknown tokens stay in place and are copied with the next literal
        if let Some(value) = placeholder(token.as_str(), filename, ctx)? {
            out.push_str(&template[last..whole.start()]);
            out.push_str(&value);
            last = whole.end();
        }
    }

    out.push_str(&template[last..]);
    Ok(out)
}

fn placeholder(token: &str, filename: &str, ctx: &HashContext) -> WrapResult<Option<String>> {
    let path = Path::new(filename);
    let value = match token {
        "file" => filename.to_owned(),
        "base" => path
            .file_name()
            .map_or_else(|| filename.to_owned(), |s| s.to_string_lossy().into_owned()),
        "name" => path
            .file_stem()
            .map_or_else(String::new, |s| s.to_string_lossy().into_owned()),
        "hash" | "fullhash" => ctx.build_hash()?.to_owned(),
        "chunkhash" => ctx.chunk_hash()?.to_owned(),
        _ => return Ok(None),
    };
    Ok(Some(value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use swaddle_core::WrapError;

    fn full_ctx() -> HashContext {
        HashContext::empty()
            .with_build_hash("b0b0")
            .with_chunk_hash("c4c4")
    }

    #[test]
    fn test_text_verbatim() {
        let spec = WrapSpec::from("/* start */");
        assert_eq!(
            resolve(&spec, "bundle.js", &HashContext::empty()).unwrap(),
            "/* start */"
        );
    }

    #[test]
    fn test_text_coerces_display() {
        let spec = WrapSpec::text(2024);
        assert_eq!(resolve(&spec, "a.js", &HashContext::empty()).unwrap(), "2024");
    }

    #[test]
    fn test_function_receives_filename_and_context() {
        let spec = WrapSpec::function(|file, ctx| Ok(format!("{file}:{}", ctx.chunk_hash()?)));
        assert_eq!(resolve(&spec, "main.js", &full_ctx()).unwrap(), "main.js:c4c4");
    }

    #[test]
    fn test_function_coerces_result() {
        let spec = WrapSpec::function(|file, _| Ok(file.len()));
        assert_eq!(resolve(&spec, "main.js", &full_ctx()).unwrap(), "7");
    }

    #[test]
    fn test_function_missing_hash_is_error() {
        let spec = WrapSpec::function(|_, ctx| Ok(ctx.chunk_hash()?.to_owned()));
        let err = resolve(&spec, "main.js", &HashContext::empty()).unwrap_err();
        assert!(matches!(
            err,
            WrapError::InvalidHashContext { field: "chunkhash" }
        ));
    }

    #[test]
    fn test_function_error_propagates_unchanged() {
        let spec = WrapSpec::function(|_, _| -> WrapResult<String> {
            Err(WrapError::content("license file missing"))
        });
        let err = resolve(&spec, "main.js", &full_ctx()).unwrap_err();
        assert_eq!(err.to_string(), "license file missing");
    }

    #[test]
    fn test_template_placeholders() {
        let spec = WrapSpec::template("/*! [name] ([base]) [file] [hash] [chunkhash] */");
        assert_eq!(
            resolve(&spec, "js/app.min.js", &full_ctx()).unwrap(),
            "/*! app.min (app.min.js) js/app.min.js b0b0 c4c4 */"
        );
    }

    #[test]
    fn test_template_unknown_and_unclosed_tokens() {
        let spec = WrapSpec::template("[id] [fullhash] [open");
        assert_eq!(
            resolve(&spec, "a.js", &full_ctx()).unwrap(),
            "[id] b0b0 [open"
        );
    }

    #[test]
    fn test_template_inside_brackets_and_quotes() {
        let spec = WrapSpec::template("window['[name]'] = ");
        assert_eq!(
            resolve(&spec, "lib.js", &HashContext::empty()).unwrap(),
            "window['lib'] = "
        );

        let spec = WrapSpec::template("[[base]] [x[file]]");
        assert_eq!(
            resolve(&spec, "a.js", &HashContext::empty()).unwrap(),
            "[a.js] [xa.js]"
        );
    }

    #[test]
    fn test_template_nested_missing_hash_is_error() {
        let spec = WrapSpec::template("/* [[chunkhash]] */");
        let err = resolve(&spec, "a.js", &HashContext::empty()).unwrap_err();
        assert!(matches!(
            err,
            WrapError::InvalidHashContext { field: "chunkhash" }
        ));
    }

    #[test]
    fn test_template_missing_chunkhash() {
        let spec = WrapSpec::template("/* [chunkhash] */");
        let err = resolve(&spec, "a.js", &HashContext::empty()).unwrap_err();
        assert!(matches!(err, WrapError::InvalidHashContext { .. }));
    }
}
