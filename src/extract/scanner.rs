//! Walks template markup and lifts out embedded expressions

use log::{debug, trace};

use crate::error::{ParseError, Span};
use crate::metadata::{ComponentType, TypeHierarchy, OBJECT_TYPE, VOID_TYPE};
use crate::parser::lexer::{lex, MarkupToken};
use crate::parser::{parse_element, parse_loop_clause, Attribute, Directive, Element};

use super::*;

/// Extract every expression and loop source from `template`
///
/// `component` and `hierarchy` are consulted for declared data and computed
/// property types. Syntax problems are collected and returned together.
pub fn extract(
    template: &str,
    component: &ComponentType,
    hierarchy: &TypeHierarchy,
) -> Result<Extraction, Vec<ParseError>> {
    let mut scanner = Scanner::new(template, component, hierarchy);
    scanner.run();

    if !scanner.errors.is_empty() {
        return Err(scanner.errors);
    }

    let template = apply_edits(template, scanner.edits);
    debug!(
        "extracted {} expressions and {} collections from {}",
        scanner.expressions.len(),
        scanner.collections.len(),
        component.name
    );

    Ok(Extraction {
        template,
        expressions: scanner.expressions,
        collections: scanner.collections,
    })
}

/// An element that opened a scope, with the loop variables it introduced
struct Frame {
    tag: String,
    variables: Vec<Parameter>,
}

struct Scanner<'a> {
    source: &'a str,
    component: &'a ComponentType,
    hierarchy: &'a TypeHierarchy,
    frames: Vec<Frame>,
    edits: Vec<(Span, String)>,
    expressions: Vec<ExtractedExpression>,
    collections: Vec<CollectionPlaceholder>,
    errors: Vec<ParseError>,
}

impl<'a> Scanner<'a> {
    fn new(source: &'a str, component: &'a ComponentType, hierarchy: &'a TypeHierarchy) -> Self {
        Self {
            source,
            component,
            hierarchy,
            frames: Vec::new(),
            edits: Vec::new(),
            expressions: Vec::new(),
            collections: Vec::new(),
            errors: Vec::new(),
        }
    }

    fn run(&mut self) {
        for (token, span) in lex(self.source) {
            match token {
                MarkupToken::Interpolation => self.interpolation(span),
                MarkupToken::UnterminatedInterpolation => self
                    .errors
                    .push(ParseError::syntax(span, "unterminated interpolation")),
                MarkupToken::OpenTag => {
                    let element = parse_element(&self.source[span.clone()], span.start);
                    self.element(element);
                }
                MarkupToken::CloseTag(name) => self.close(&name),
                MarkupToken::Comment | MarkupToken::Text | MarkupToken::Stray => {}
            }
        }
    }

    fn interpolation(&mut self, span: Span) {
        let inner = &self.source[span.start + 2..span.end - 2];
        let body = clean_body(inner);
        if body.is_empty() {
            self.errors.push(ParseError::syntax(span, "empty interpolation"));
            return;
        }

        let kind = if self.computed_type(&body).is_some() {
            ExpressionKind::Computed
        } else {
            ExpressionKind::Getter
        };
        let parameters = self.scope_variables(&[]);
        let id = self.push_expression(kind, parameters, STRING_TYPE.to_string(), body);
        self.edits.push((span, format!("{{{{ {} }}}}", id)));
    }

    fn element(&mut self, element: Element) {
        let loop_variables = match element.attributes.iter().find(|a| a.directive() == Directive::For) {
            Some(attribute) => self.loop_source(attribute),
            None => Vec::new(),
        };
        let in_scope = self.scope_variables(&loop_variables);

        for attribute in &element.attributes {
            self.attribute(attribute, &in_scope);
        }

        if element.opens_scope() {
            self.frames.push(Frame {
                tag: element.name,
                variables: loop_variables,
            });
        }
    }

    /// Register the collection a `v-for` iterates and return its loop variables
    fn loop_source(&mut self, attribute: &Attribute) -> Vec<Parameter> {
        let Some(value) = &attribute.value else {
            self.errors.push(ParseError::syntax(
                attribute.name.span.clone(),
                "v-for needs a loop clause",
            ));
            return Vec::new();
        };

        let clause = match parse_loop_clause(&value.node) {
            Ok(clause) => clause,
            Err(errors) => {
                self.errors
                    .extend(errors.into_iter().map(|e| e.offset(value.span.start)));
                return Vec::new();
            }
        };

        let body = clean_body(&clause.collection.node);
        let return_type = self
            .component
            .data_type(&body)
            .unwrap_or(OBJECT_TYPE)
            .to_string();
        let id = collection_id(self.collections.len());
        trace!("{} iterates {}", id, body);

        self.collections.push(CollectionPlaceholder {
            id: id.clone(),
            parameters: self.scope_variables(&[]),
            return_type,
            body,
        });

        // Types only matter to the accessors; the engine sees bare names
        let names = {
            let names: Vec<&str> = clause.variables.iter().map(|v| v.name.as_str()).collect();
            match names.as_slice() {
                [single] => single.to_string(),
                several => format!("({})", several.join(", ")),
            }
        };
        self.edits.push((
            value.span.clone(),
            format!("{} in {}", names, collection_array(&id)),
        ));

        clause
            .variables
            .into_iter()
            .enumerate()
            .map(|(position, variable)| {
                let default_type = if position == 0 { OBJECT_TYPE } else { INDEX_TYPE };
                Parameter::new(
                    variable.name,
                    variable.type_name.unwrap_or_else(|| default_type.to_string()),
                )
            })
            .collect()
    }

    fn attribute(&mut self, attribute: &Attribute, in_scope: &[Parameter]) {
        let directive = attribute.directive();
        if matches!(directive, Directive::Plain | Directive::For) {
            return;
        }

        let Some(value) = &attribute.value else {
            self.errors.push(ParseError::syntax(
                attribute.name.span.clone(),
                format!("{} needs an expression", attribute.name.node),
            ));
            return;
        };
        let body = clean_body(&value.node);
        if body.is_empty() {
            self.errors.push(ParseError::syntax(
                value.span.clone(),
                format!("{} needs an expression", attribute.name.node),
            ));
            return;
        }

        let mut parameters = in_scope.to_vec();
        let (kind, return_type) = match directive {
            Directive::Bind(_) => match self.computed_type(&body) {
                Some(computed) => (ExpressionKind::Computed, computed.to_string()),
                None => (ExpressionKind::Getter, OBJECT_TYPE.to_string()),
            },
            Directive::Condition(_) => (ExpressionKind::Getter, BOOLEAN_TYPE.to_string()),
            Directive::On(_) => {
                parameters.push(Parameter::new(EVENT_PARAMETER, OBJECT_TYPE));
                (ExpressionKind::Event, VOID_TYPE.to_string())
            }
            Directive::Model => {
                let target = self
                    .component
                    .data_type(&body)
                    .or_else(|| self.computed_type(&body))
                    .unwrap_or(OBJECT_TYPE);
                (ExpressionKind::Setter, target.to_string())
            }
            Directive::Plain | Directive::For => return,
        };

        let id = self.push_expression(kind, parameters, return_type, body);
        self.edits.push((value.span.clone(), id));
    }

    fn close(&mut self, name: &str) {
        // Unmatched closing tags are left alone
        if let Some(index) = self
            .frames
            .iter()
            .rposition(|frame| frame.tag.eq_ignore_ascii_case(name))
        {
            self.frames.truncate(index);
        }
    }

    fn push_expression(
        &mut self,
        kind: ExpressionKind,
        parameters: Vec<Parameter>,
        return_type: String,
        body: String,
    ) -> String {
        let id = expression_id(self.expressions.len());
        trace!("{} [{}] {}", id, kind, body);
        self.expressions.push(ExtractedExpression {
            id: id.clone(),
            kind,
            parameters,
            return_type,
            body,
        });
        id
    }

    /// Loop variables visible here, innermost declaration winning
    fn scope_variables(&self, extra: &[Parameter]) -> Vec<Parameter> {
        let mut visible: Vec<Parameter> = Vec::new();
        let declared = self
            .frames
            .iter()
            .flat_map(|frame| frame.variables.iter())
            .chain(extra.iter());
        for variable in declared {
            visible.retain(|v| v.name != variable.name);
            visible.push(variable.clone());
        }
        visible
    }

    fn computed_type(&self, body: &str) -> Option<&'a str> {
        if !is_identifier(body) {
            return None;
        }
        self.component
            .computed_type(body)
            .or_else(|| self.hierarchy.computed_type(&self.component.name, body))
    }
}

/// Trim an expression and drop a trailing statement terminator
fn clean_body(raw: &str) -> String {
    let trimmed = raw.trim();
    trimmed
        .strip_suffix(';')
        .unwrap_or(trimmed)
        .trim_end()
        .to_string()
}

fn is_identifier(text: &str) -> bool {
    let mut chars = text.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' || c == '$' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}

/// Apply non-overlapping replacements to `source`
fn apply_edits(source: &str, mut edits: Vec<(Span, String)>) -> String {
    edits.sort_by_key(|(span, _)| span.start);
    let mut result = String::with_capacity(source.len());
    let mut cursor = 0;
    for (span, replacement) in edits {
        result.push_str(&source[cursor..span.start]);
        result.push_str(&replacement);
        cursor = span.end;
    }
    result.push_str(&source[cursor..]);
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn todo_type() -> ComponentType {
        ComponentType::new("TodoList")
            .with_data("todos", "List<Todo>")
            .with_data("draft", "String")
            .with_computed("remaining", "int")
    }

    fn run(template: &str) -> Extraction {
        extract(template, &todo_type(), &TypeHierarchy::default()).expect("should extract")
    }

    #[test]
    fn test_no_expressions() {
        let extraction = run("<p>static</p>");
        assert_eq!(extraction.template, "<p>static</p>");
        assert!(extraction.expressions.is_empty());
        assert!(extraction.collections.is_empty());
    }

    #[test]
    fn test_interpolation_becomes_string_getter() {
        let extraction = run("<p>Hello {{ this.name }}!</p>");
        assert_eq!(extraction.template, "<p>Hello {{ exp$0 }}!</p>");
        assert_eq!(
            extraction.expressions,
            vec![ExtractedExpression {
                id: "exp$0".to_string(),
                kind: ExpressionKind::Getter,
                parameters: Vec::new(),
                return_type: STRING_TYPE.to_string(),
                body: "this.name".to_string(),
            }]
        );
    }

    #[test]
    fn test_ids_follow_source_order() {
        let extraction = run(r#"<a :href="url" @click="go()">{{ label }}</a>{{ other }}"#);
        assert_eq!(
            extraction.template,
            r#"<a :href="exp$0" @click="exp$1">{{ exp$2 }}</a>{{ exp$3 }}"#
        );
        let ids: Vec<_> = extraction.expressions.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["exp$0", "exp$1", "exp$2", "exp$3"]);
    }

    #[test]
    fn test_directive_kinds_and_types() {
        let extraction = run(
            r#"<input v-model="draft" v-if="visible" v-on:keyup="save($event);" :count="remaining">"#,
        );
        let e = &extraction.expressions;
        assert_eq!((e[0].kind, e[0].return_type.as_str()), (ExpressionKind::Setter, "String"));
        assert_eq!((e[1].kind, e[1].return_type.as_str()), (ExpressionKind::Getter, "boolean"));
        assert_eq!((e[2].kind, e[2].return_type.as_str()), (ExpressionKind::Event, "void"));
        assert_eq!(e[2].body, "save($event)");
        assert_eq!(e[2].parameters, vec![Parameter::new("$event", "Object")]);
        assert_eq!((e[3].kind, e[3].return_type.as_str()), (ExpressionKind::Computed, "int"));
    }

    #[test]
    fn test_computed_interpolation_keeps_string_type() {
        let extraction = run("{{ remaining }}");
        assert_eq!(extraction.expressions[0].kind, ExpressionKind::Computed);
        assert_eq!(extraction.expressions[0].return_type, STRING_TYPE);
    }

    #[test]
    fn test_inherited_computed_resolved_through_hierarchy() {
        let mut hierarchy = TypeHierarchy::default();
        hierarchy
            .insert(ComponentType::new("Base").with_computed("total", "long"))
            .unwrap();
        let child = ComponentType::new("Child").with_superclass("Base");
        hierarchy.insert(child.clone()).unwrap();

        let extraction = extract(r#"<b :n="total"></b>"#, &child, &hierarchy).unwrap();
        assert_eq!(extraction.expressions[0].kind, ExpressionKind::Computed);
        assert_eq!(extraction.expressions[0].return_type, "long");
    }

    #[test]
    fn test_loop_variables_become_parameters() {
        let extraction = run(
            r#"<ul><li v-for="(Todo todo, i) in todos" :key="todo.id">{{ i }}: {{ todo.text }}</li></ul>{{ draft }}"#,
        );
        assert_eq!(
            extraction.template,
            r#"<ul><li v-for="(todo, i) in col$0Array" :key="exp$0">{{ exp$1 }}: {{ exp$2 }}</li></ul>{{ exp$3 }}"#
        );

        let collection = &extraction.collections[0];
        assert_eq!(collection.id, "col$0");
        assert_eq!(collection.body, "todos");
        assert_eq!(collection.return_type, "List<Todo>");
        assert!(collection.parameters.is_empty());
        assert_eq!(collection.array_slot(), "col$0Array");

        let loop_params = vec![Parameter::new("todo", "Todo"), Parameter::new("i", "int")];
        assert_eq!(extraction.expressions[0].parameters, loop_params);
        assert_eq!(extraction.expressions[2].parameters, loop_params);
        // Out of the loop again
        assert!(extraction.expressions[3].parameters.is_empty());
    }

    #[test]
    fn test_loop_clause_loses_types() {
        let extraction = run(r#"<li v-for="(Todo todo, int i) of todos">{{ todo }}</li><p v-for=" Todo t in todos "></p>"#);
        assert_eq!(
            extraction.template,
            r#"<li v-for="(todo, i) in col$0Array">{{ exp$0 }}</li><p v-for="t in col$1Array"></p>"#
        );
    }

    #[test]
    fn test_nested_loops_shadow_outer_variables() {
        let extraction = run(
            r#"<div v-for="row in rows"><span v-for="row in row.cells">{{ row }}</span></div>"#,
        );
        assert_eq!(extraction.collections.len(), 2);
        assert_eq!(extraction.collections[1].parameters, vec![Parameter::new("row", "Object")]);
        assert_eq!(extraction.expressions[0].parameters, vec![Parameter::new("row", "Object")]);
        assert!(extraction.template.contains(r#"v-for="row in col$1Array""#));
    }

    #[test]
    fn test_self_closing_loop_opens_no_scope() {
        let extraction = run(r#"<item v-for="x in xs" :value="x"/>{{ x }}"#);
        assert_eq!(extraction.expressions[0].parameters, vec![Parameter::new("x", "Object")]);
        assert!(extraction.expressions[1].parameters.is_empty());
    }

    #[test]
    fn test_static_attributes_untouched() {
        let extraction = run(r#"<div class="box" v-else id=main></div>"#);
        assert_eq!(extraction.template, r#"<div class="box" v-else id=main></div>"#);
    }

    #[test]
    fn test_unterminated_interpolation_is_an_error() {
        let errors = extract("<p>{{ name</p>", &todo_type(), &TypeHierarchy::default()).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].span(), &(3..5));
    }

    #[test]
    fn test_bad_loop_clause_reports_template_span() {
        let template = r#"<li v-for="in items"></li>"#;
        let errors = extract(template, &todo_type(), &TypeHierarchy::default()).unwrap_err();
        assert!(!errors.is_empty());
        let span = errors[0].span();
        assert!(span.start >= 11 && span.end <= 19, "span {:?}", span);
    }

    #[test]
    fn test_directive_without_value_is_an_error() {
        let errors = extract("<p v-if></p>", &todo_type(), &TypeHierarchy::default()).unwrap_err();
        assert_eq!(errors[0].span(), &(3..7));
    }

    #[test]
    fn test_clean_body() {
        assert_eq!(clean_body("  a();  "), "a()");
        assert_eq!(clean_body(" x ; "), "x");
        assert_eq!(clean_body("a; b"), "a; b");
    }
}
