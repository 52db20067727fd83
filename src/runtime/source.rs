//! Recover expression text from compiled accessor source

use once_cell::sync::Lazy;
use regex::Regex;

/// `function [name](<params>) { [return] <expr>[;] }`
static FUNCTION_SOURCE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)^\s*function\s*[A-Za-z0-9_$]*\s*\(([^)]*)\)\s*\{\s*(?:return\s+)?(.*?)\s*;?\s*\}\s*$")
        .unwrap()
});

/// `this.` at the start of the text or after a non-identifier character
static THIS_QUALIFIER: Lazy<Regex> = Lazy::new(|| Regex::new(r"(^|[^A-Za-z0-9_$%])this\.").unwrap());

/// The expression inside compiled function source, or `None` if it does not
/// have the accessor shape
pub fn expression_from_source(source: &str) -> Option<&str> {
    FUNCTION_SOURCE
        .captures(source)
        .and_then(|captures| captures.get(2))
        .map(|body| body.as_str())
        .filter(|body| !body.is_empty())
}

/// Drop explicit `this.` qualifiers so names resolve against the instance
pub fn strip_qualifiers(expression: &str) -> String {
    THIS_QUALIFIER.replace_all(expression, "$1").into_owned()
}
