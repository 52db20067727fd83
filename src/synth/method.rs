//! Typed accessor methods for extracted expressions

use crate::extract::{CollectionPlaceholder, ExtractedExpression, Parameter, STRING_TYPE};
use crate::metadata::VOID_TYPE;

use super::writer::SourceBuilder;

/// A generated accessor in both of its forms
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SynthesizedMethod {
    pub id: String,
    /// Typed declaration placed in the generated resource
    pub declaration: String,
    /// Externally visible function source, `function(<params>) { [return] <expr>; }`
    pub compiled: String,
}

/// How an accessor turns its body into a result
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReturnShape<'t> {
    /// Coerce the value to text
    Text,
    /// Run the body as a statement
    Statement,
    /// Narrow the value to the declared type
    Cast(&'t str),
}

impl<'t> ReturnShape<'t> {
    pub fn of(return_type: &'t str) -> Self {
        if is_void(return_type) {
            ReturnShape::Statement
        } else if is_string(return_type) {
            ReturnShape::Text
        } else {
            ReturnShape::Cast(return_type)
        }
    }
}

fn is_void(type_name: &str) -> bool {
    type_name.eq_ignore_ascii_case(VOID_TYPE)
}

fn is_string(type_name: &str) -> bool {
    type_name == STRING_TYPE || type_name.ends_with(".String")
}

pub fn synthesize(expression: &ExtractedExpression) -> SynthesizedMethod {
    accessor(
        &expression.id,
        &expression.parameters,
        &expression.return_type,
        &expression.body,
    )
}

/// The companion accessor that evaluates a loop source
pub fn synthesize_collection(collection: &CollectionPlaceholder) -> SynthesizedMethod {
    accessor(
        &collection.id,
        &collection.parameters,
        &collection.return_type,
        &collection.body,
    )
}

fn accessor(id: &str, parameters: &[Parameter], return_type: &str, body: &str) -> SynthesizedMethod {
    let shape = ReturnShape::of(return_type);
    let declared_return = match shape {
        ReturnShape::Statement => VOID_TYPE,
        _ => return_type,
    };
    let typed_params = parameters
        .iter()
        .map(|p| format!("{} {}", p.type_name, p.name))
        .collect::<Vec<_>>()
        .join(", ");

    let mut out = SourceBuilder::new();
    out.open(format!("public {} {}({})", declared_return, id, typed_params));
    out.line(match shape {
        ReturnShape::Text => format!("return ({}) + \"\";", body),
        ReturnShape::Statement => format!("{};", body),
        ReturnShape::Cast(type_name) => format!("return ({}) ({});", type_name, body),
    });
    out.close();

    SynthesizedMethod {
        id: id.to_string(),
        declaration: out.finish(),
        compiled: compiled_source(parameters, shape, body),
    }
}

/// Function source as the runtime sees it once types are erased
pub fn compiled_source(parameters: &[Parameter], shape: ReturnShape<'_>, body: &str) -> String {
    let names = parameters
        .iter()
        .map(|p| p.name.as_str())
        .collect::<Vec<_>>()
        .join(", ");
    match shape {
        ReturnShape::Statement => format!("function({}) {{ {}; }}", names, body),
        _ => format!("function({}) {{ return {}; }}", names, body),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::ExpressionKind;

    fn expression(return_type: &str, body: &str, parameters: Vec<Parameter>) -> ExtractedExpression {
        ExtractedExpression {
            id: "exp$0".to_string(),
            kind: ExpressionKind::Getter,
            parameters,
            return_type: return_type.to_string(),
            body: body.to_string(),
        }
    }

    #[test]
    fn test_string_accessor_coerces() {
        let method = synthesize(&expression("String", "this.count + 1", Vec::new()));
        insta::assert_snapshot!(method.declaration.trim_end(), @r###"
        public String exp$0() {
            return (this.count + 1) + "";
        }
        "###);
        assert_eq!(method.compiled, "function() { return this.count + 1; }");
    }

    #[test]
    fn test_void_accessor_is_a_statement() {
        let method = synthesize(&expression(
            "VOID",
            "remove(todo)",
            vec![Parameter::new("todo", "Todo"), Parameter::new("$event", "Object")],
        ));
        assert_eq!(
            method.declaration,
            "public void exp$0(Todo todo, Object $event) {\n    remove(todo);\n}\n"
        );
        assert_eq!(method.compiled, "function(todo, $event) { remove(todo); }");
    }

    #[test]
    fn test_typed_accessor_casts() {
        let method = synthesize(&expression("boolean", "todos.isEmpty()", vec![Parameter::new("i", "int")]));
        assert_eq!(
            method.declaration,
            "public boolean exp$0(int i) {\n    return (boolean) (todos.isEmpty());\n}\n"
        );
        assert_eq!(method.compiled, "function(i) { return todos.isEmpty(); }");
    }

    #[test]
    fn test_collection_accessor() {
        let collection = CollectionPlaceholder {
            id: "col$0".to_string(),
            parameters: Vec::new(),
            return_type: "List<Todo>".to_string(),
            body: "todos".to_string(),
        };
        let method = synthesize_collection(&collection);
        assert_eq!(method.id, "col$0");
        assert!(method.declaration.starts_with("public List<Todo> col$0() {"));
        assert_eq!(method.compiled, "function() { return todos; }");
    }

    #[test]
    fn test_return_shape() {
        assert_eq!(ReturnShape::of("void"), ReturnShape::Statement);
        assert_eq!(ReturnShape::of("String"), ReturnShape::Text);
        assert_eq!(ReturnShape::of("lang.String"), ReturnShape::Text);
        assert_eq!(ReturnShape::of("Strings"), ReturnShape::Cast("Strings"));
    }
}
