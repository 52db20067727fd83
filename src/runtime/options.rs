//! The option object handed to the rendering engine

use std::sync::Arc;

use indexmap::IndexMap;
use serde_json::{Map, Value};

use super::registry::{ComponentDefinition, DirectiveDefinition};
use super::value::Callable;

/// Produces a fresh deep copy of a data object on every call
#[derive(Debug, Clone)]
pub struct DataFactory {
    data: Map<String, Value>,
}

impl DataFactory {
    pub fn new(data: Map<String, Value>) -> Self {
        Self { data }
    }

    pub fn produce(&self) -> Result<Map<String, Value>, serde_json::Error> {
        let serialized = serde_json::to_string(&self.data)?;
        serde_json::from_str(&serialized)
    }
}

/// Reactive data, shared or copied per instance
#[derive(Debug, Clone)]
pub enum ComponentData {
    Object(Map<String, Value>),
    Factory(DataFactory),
}

impl ComponentData {
    /// The data object the engine would observe
    pub fn resolve(&self) -> Result<Map<String, Value>, serde_json::Error> {
        match self {
            ComponentData::Object(data) => Ok(data.clone()),
            ComponentData::Factory(factory) => factory.produce(),
        }
    }
}

impl Default for ComponentData {
    fn default() -> Self {
        ComponentData::Object(Map::new())
    }
}

#[derive(Debug, Clone, Default)]
pub struct ComputedDefinition {
    pub get: Option<Callable>,
    pub set: Option<Callable>,
}

#[derive(Debug, Clone)]
pub enum WatchDefinition {
    Handler(Callable),
    /// Also fires when nested values change
    Deep { handler: Callable },
}

impl WatchDefinition {
    pub fn handler(&self) -> &Callable {
        match self {
            WatchDefinition::Handler(handler) | WatchDefinition::Deep { handler } => handler,
        }
    }

    pub fn is_deep(&self) -> bool {
        matches!(self, WatchDefinition::Deep { .. })
    }
}

/// Runtime type check applied to a prop value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropType {
    String,
    Number,
    Boolean,
    Array,
    Object,
    Function,
}

impl PropType {
    /// Map a declared type name onto the engine's prop types
    pub fn from_type_name(type_name: &str) -> Self {
        let base = type_name.split('<').next().unwrap_or(type_name).trim();
        if base.ends_with("[]") {
            return PropType::Array;
        }
        let simple = base.rsplit('.').next().unwrap_or(base);
        match simple {
            "String" | "char" | "Character" => PropType::String,
            "int" | "long" | "short" | "byte" | "float" | "double" | "Integer" | "Long"
            | "Short" | "Byte" | "Float" | "Double" | "Number" => PropType::Number,
            "boolean" | "Boolean" => PropType::Boolean,
            "List" | "ArrayList" | "Set" | "Collection" | "JsArray" => PropType::Array,
            "Function" | "Runnable" | "Supplier" | "Consumer" => PropType::Function,
            _ => PropType::Object,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct PropDefinition {
    pub required: bool,
    pub default_value: Option<Value>,
    pub prop_type: Option<PropType>,
    pub validator: Option<Callable>,
}

/// Everything the rendering engine needs to construct one component
#[derive(Debug, Clone, Default)]
pub struct ComponentOptions {
    /// Mount point selector
    pub el: Option<String>,
    /// Template text with every placeholder resolved
    pub template: Option<String>,
    pub data: ComponentData,
    pub computed: IndexMap<String, ComputedDefinition>,
    pub methods: IndexMap<String, Callable>,
    pub watch: IndexMap<String, WatchDefinition>,
    pub props: IndexMap<String, PropDefinition>,
    /// Nested components by tag name
    pub components: IndexMap<String, Arc<ComponentDefinition>>,
    pub directives: IndexMap<String, Arc<DirectiveDefinition>>,
    /// Lifecycle hooks by name
    pub hooks: IndexMap<String, Callable>,
    /// Collection IDs, in template order
    pub collections: Vec<String>,
}

impl ComponentOptions {
    pub fn set_el(&mut self, selector: impl Into<String>) {
        self.el = Some(selector.into());
    }
}

/// Tag name a nested component is registered under
///
/// `todo.TodoItemComponent` becomes `todo-item`.
pub fn component_tag_name(type_name: &str) -> String {
    let simple = type_name
        .rsplit(|c| c == '.' || c == ':')
        .next()
        .unwrap_or(type_name);
    let stem = match simple.strip_suffix("Component") {
        Some(stem) if !stem.is_empty() => stem,
        _ => simple,
    };

    let chars: Vec<char> = stem.chars().collect();
    let mut tag = String::with_capacity(stem.len() + 4);
    for (i, &c) in chars.iter().enumerate() {
        if c.is_uppercase() && i > 0 {
            let prev = chars[i - 1];
            let next_is_lower = chars.get(i + 1).is_some_and(|n| n.is_lowercase());
            if prev.is_lowercase() || prev.is_ascii_digit() || (prev.is_uppercase() && next_is_lower) {
                tag.push('-');
            }
        }
        tag.extend(c.to_lowercase());
    }
    tag
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_tag_names() {
        assert_eq!(component_tag_name("TodoItemComponent"), "todo-item");
        assert_eq!(component_tag_name("app.todo.TodoList"), "todo-list");
        assert_eq!(component_tag_name("crate::Header"), "header");
        assert_eq!(component_tag_name("HTMLViewComponent"), "html-view");
        assert_eq!(component_tag_name("Component"), "component");
    }

    #[test]
    fn test_prop_types() {
        assert_eq!(PropType::from_type_name("String"), PropType::String);
        assert_eq!(PropType::from_type_name("java.lang.Integer"), PropType::Number);
        assert_eq!(PropType::from_type_name("boolean"), PropType::Boolean);
        assert_eq!(PropType::from_type_name("List<Todo>"), PropType::Array);
        assert_eq!(PropType::from_type_name("int[]"), PropType::Array);
        assert_eq!(PropType::from_type_name("Todo"), PropType::Object);
    }

    #[test]
    fn test_factory_copies_are_independent() {
        let mut data = Map::new();
        data.insert("todos".to_string(), json!([{"text": "a"}]));
        let factory = DataFactory::new(data);

        let mut first = factory.produce().unwrap();
        first.insert("todos".to_string(), json!([]));
        let second = factory.produce().unwrap();
        assert_eq!(second.get("todos"), Some(&json!([{"text": "a"}])));
    }

    #[test]
    fn test_watch_definition() {
        let handler = Callable::new(|_| Value::Null);
        let deep = WatchDefinition::Deep {
            handler: handler.clone(),
        };
        assert!(deep.is_deep());
        assert!(deep.handler().ptr_eq(&handler));
        assert!(!WatchDefinition::Handler(handler).is_deep());
    }
}
