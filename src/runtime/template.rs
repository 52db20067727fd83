//! The compiled view of a template, as the runtime receives it

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::extract::ExpressionKind;

/// Kind and ID of one accessor, in declaration order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpressionEntry {
    pub kind: ExpressionKind,
    pub id: String,
}

/// Template text plus the externally visible source of every accessor
///
/// `methods` maps an expression or collection ID to function source shaped
/// `function(<params>) { [return] <expr>; }`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CompiledTemplate {
    pub name: String,
    pub text: String,
    #[serde(default)]
    pub methods: IndexMap<String, String>,
    #[serde(default)]
    pub expressions: Vec<ExpressionEntry>,
    /// Style bindings: template name -> style type
    #[serde(default)]
    pub styles: IndexMap<String, String>,
}

impl CompiledTemplate {
    /// A template with no text, for components that declare none
    pub fn empty(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn method_source(&self, id: &str) -> Option<&str> {
        self.methods.get(id).map(String::as_str)
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}
