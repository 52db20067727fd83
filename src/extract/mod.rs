//! Expression extraction
//!
//! Finds the expressions and loop sources embedded in template markup,
//! replaces each with a sequential placeholder ID and records what the
//! synthesizer needs to generate a typed accessor for it.
//!
//! Expression IDs are `exp$0`, `exp$1`, ... and collection IDs are `col$0`,
//! `col$1`, ... in source order. The data slot that backs a collection is the
//! collection ID followed by `Array`.

mod scanner;

use std::fmt;

use serde::{Deserialize, Serialize};

pub use scanner::extract;

pub const EXPRESSION_PREFIX: &str = "exp$";
pub const COLLECTION_PREFIX: &str = "col$";
pub const COLLECTION_ARRAY_SUFFIX: &str = "Array";

pub const STRING_TYPE: &str = "String";
pub const BOOLEAN_TYPE: &str = "boolean";
pub const INDEX_TYPE: &str = "int";
pub const EVENT_PARAMETER: &str = "$event";

pub fn expression_id(index: usize) -> String {
    format!("{}{}", EXPRESSION_PREFIX, index)
}

pub fn collection_id(index: usize) -> String {
    format!("{}{}", COLLECTION_PREFIX, index)
}

/// Name of the data slot backing a collection placeholder
pub fn collection_array(id: &str) -> String {
    format!("{}{}", id, COLLECTION_ARRAY_SUFFIX)
}

/// IDs `prefix0`, `prefix1`, ... for as long as `present` reports them
///
/// Scanning stops at the first missing index. Anything numbered after a gap is
/// never visited.
pub fn sequential_ids(prefix: &str, present: impl Fn(&str) -> bool) -> Vec<String> {
    let mut ids = Vec::new();
    loop {
        let id = format!("{}{}", prefix, ids.len());
        if !present(&id) {
            return ids;
        }
        ids.push(id);
    }
}

/// Placeholder tokens `prefix<digits>` in `text`, with their byte ranges
///
/// A token only counts when it is not glued to a preceding identifier
/// character, and its number runs as far as the digits go, so `exp$1` never
/// matches inside `exp$12`.
pub fn find_placeholders<'t>(text: &'t str, prefix: &str) -> Vec<(std::ops::Range<usize>, &'t str)> {
    let mut found = Vec::new();
    let mut from = 0;
    while let Some(pos) = text[from..].find(prefix) {
        let start = from + pos;
        let digits_start = start + prefix.len();
        let digits = text[digits_start..]
            .bytes()
            .take_while(u8::is_ascii_digit)
            .count();
        let glued = text[..start]
            .chars()
            .next_back()
            .is_some_and(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$');
        if digits > 0 && !glued {
            let end = digits_start + digits;
            found.push((start..end, &text[start..end]));
            from = end;
        } else {
            from = digits_start;
        }
    }
    found
}

/// How the template uses an expression
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExpressionKind {
    /// A value read by the template
    Getter,
    /// A `v-model` target written back by the template
    Setter,
    /// An event handler statement
    Event,
    /// A direct read of a declared computed property
    Computed,
}

impl fmt::Display for ExpressionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ExpressionKind::Getter => "GETTER",
            ExpressionKind::Setter => "SETTER",
            ExpressionKind::Event => "EVENT",
            ExpressionKind::Computed => "COMPUTED",
        };
        write!(f, "{}", name)
    }
}

/// A typed accessor parameter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
    #[serde(rename = "type")]
    pub type_name: String,
}

impl Parameter {
    pub fn new(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
        }
    }
}

/// One expression lifted out of the template
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedExpression {
    pub id: String,
    pub kind: ExpressionKind,
    pub parameters: Vec<Parameter>,
    pub return_type: String,
    /// Expression text as authored
    pub body: String,
}

/// The source of a `v-for` loop
///
/// The runtime sees the `<id>Array` data slot, which it can mutate in place.
/// The companion accessor named `<id>` evaluates `body`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionPlaceholder {
    pub id: String,
    pub parameters: Vec<Parameter>,
    pub return_type: String,
    pub body: String,
}

impl CollectionPlaceholder {
    pub fn array_slot(&self) -> String {
        collection_array(&self.id)
    }
}

/// Result of extracting one template
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Extraction {
    /// Template text with placeholders in place of expressions
    pub template: String,
    pub expressions: Vec<ExtractedExpression>,
    pub collections: Vec<CollectionPlaceholder>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids() {
        assert_eq!(expression_id(0), "exp$0");
        assert_eq!(collection_id(3), "col$3");
        assert_eq!(collection_array("col$3"), "col$3Array");
    }

    #[test]
    fn test_sequential_ids_stop_at_gap() {
        let present = ["exp$0", "exp$1", "exp$3"];
        let ids = sequential_ids(EXPRESSION_PREFIX, |id| present.contains(&id));
        assert_eq!(ids, vec!["exp$0", "exp$1"]);
    }

    #[test]
    fn test_sequential_ids_empty() {
        assert!(sequential_ids(COLLECTION_PREFIX, |_| false).is_empty());
    }

    #[test]
    fn test_find_placeholders_respects_boundaries() {
        let text = "{{ exp$1 }} {{ exp$12 }} myexp$3 exp$ col$0Array";
        let found: Vec<_> = find_placeholders(text, EXPRESSION_PREFIX)
            .into_iter()
            .map(|(_, token)| token)
            .collect();
        assert_eq!(found, vec!["exp$1", "exp$12"]);

        let collections = find_placeholders(text, COLLECTION_PREFIX);
        assert_eq!(collections.len(), 1);
        assert_eq!(collections[0].1, "col$0");
    }

    #[test]
    fn test_kind_display_matches_serde() {
        assert_eq!(ExpressionKind::Computed.to_string(), "COMPUTED");
        assert_eq!(
            serde_json::to_string(&ExpressionKind::Event).unwrap(),
            "\"EVENT\""
        );
    }
}
