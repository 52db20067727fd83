//! Syntax types for component template markup

/// Byte range in source text
pub type Span = std::ops::Range<usize>;

/// A node paired with the byte range it came from
#[derive(Debug, Clone, PartialEq)]
pub struct Spanned<T> {
    pub node: T,
    pub span: Span,
}

impl<T> Spanned<T> {
    pub fn new(node: T, span: Span) -> Self {
        Self { node, span }
    }
}

/// HTML elements that never have a closing tag
pub const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param",
    "source", "track", "wbr",
];

/// An opening tag with its attributes
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub name: String,
    pub attributes: Vec<Attribute>,
    /// Written as `<tag ... />`
    pub self_closing: bool,
    pub span: Span,
}

impl Element {
    /// Whether this element opens a scope that a closing tag ends
    pub fn opens_scope(&self) -> bool {
        !self.self_closing && !VOID_ELEMENTS.contains(&self.name.to_ascii_lowercase().as_str())
    }
}

/// A single attribute inside an opening tag
///
/// `value.span` covers the text between the quotes, so rewriting it leaves the
/// quoting untouched.
#[derive(Debug, Clone, PartialEq)]
pub struct Attribute {
    pub name: Spanned<String>,
    pub value: Option<Spanned<String>>,
}

impl Attribute {
    pub fn directive(&self) -> Directive {
        Directive::classify(&self.name.node)
    }
}

/// What a template attribute asks the runtime to do
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Directive {
    /// `:name` or `v-bind:name`
    Bind(String),
    /// `@event` or `v-on:event`
    On(String),
    /// `v-if`, `v-else-if` and `v-show`
    Condition(String),
    /// `v-model`
    Model,
    /// `v-for`
    For,
    /// A static attribute or a directive that carries no expression
    Plain,
}

impl Directive {
    pub fn classify(name: &str) -> Self {
        if let Some(target) = name.strip_prefix(':') {
            return Directive::Bind(target.to_string());
        }
        if let Some(target) = name.strip_prefix("v-bind:") {
            return Directive::Bind(target.to_string());
        }
        if let Some(event) = name.strip_prefix('@') {
            return Directive::On(event.to_string());
        }
        if let Some(event) = name.strip_prefix("v-on:") {
            return Directive::On(event.to_string());
        }
        match name {
            "v-if" | "v-else-if" | "v-show" => Directive::Condition(name.to_string()),
            "v-model" => Directive::Model,
            "v-for" => Directive::For,
            _ => Directive::Plain,
        }
    }
}

/// A variable introduced by a `v-for` clause
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoopVariable {
    /// Declared type, when written as `Type name`
    pub type_name: Option<String>,
    pub name: String,
}

/// A parsed `v-for` clause such as `(Todo todo, index) in todos`
#[derive(Debug, Clone, PartialEq)]
pub struct LoopClause {
    pub variables: Vec<LoopVariable>,
    /// The iterated expression; its span is relative to the clause text
    pub collection: Spanned<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_directives() {
        assert_eq!(Directive::classify(":title"), Directive::Bind("title".into()));
        assert_eq!(Directive::classify("v-bind:href"), Directive::Bind("href".into()));
        assert_eq!(Directive::classify("@click"), Directive::On("click".into()));
        assert_eq!(Directive::classify("v-on:submit.prevent"), Directive::On("submit.prevent".into()));
        assert_eq!(Directive::classify("v-show"), Directive::Condition("v-show".into()));
        assert_eq!(Directive::classify("v-model"), Directive::Model);
        assert_eq!(Directive::classify("v-for"), Directive::For);
        assert_eq!(Directive::classify("class"), Directive::Plain);
        assert_eq!(Directive::classify("v-else"), Directive::Plain);
    }

    #[test]
    fn test_void_and_self_closing_elements_open_no_scope() {
        let element = |name: &str, self_closing| Element {
            name: name.to_string(),
            attributes: Vec::new(),
            self_closing,
            span: 0..0,
        };
        assert!(element("div", false).opens_scope());
        assert!(!element("div", true).opens_scope());
        assert!(!element("BR", false).opens_scope());
        assert!(!element("input", false).opens_scope());
    }
}
