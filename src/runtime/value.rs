//! Live component instances and the callables they expose

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use serde_json::Value;

/// A function bound to a live instance
#[derive(Clone)]
pub struct Callable(Arc<dyn Fn(&[Value]) -> Value + Send + Sync>);

impl Callable {
    pub fn new(f: impl Fn(&[Value]) -> Value + Send + Sync + 'static) -> Self {
        Self(Arc::new(f))
    }

    pub fn call(&self, args: &[Value]) -> Value {
        (self.0)(args)
    }

    /// Whether two callables share the same underlying function
    pub fn ptr_eq(&self, other: &Callable) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for Callable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Callable(..)")
    }
}

/// Reflective access to a constructed component
pub trait ComponentInstance {
    /// Current value of a field; `None` when the instance holds nothing
    fn property(&self, name: &str) -> Option<Value>;

    /// Method implemented by the instance
    fn method(&self, name: &str) -> Option<Callable>;
}

/// An instance assembled from plain maps
#[derive(Debug, Clone, Default)]
pub struct DynamicInstance {
    properties: IndexMap<String, Value>,
    methods: IndexMap<String, Callable>,
}

impl DynamicInstance {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_property(mut self, name: &str, value: Value) -> Self {
        self.properties.insert(name.to_string(), value);
        self
    }

    pub fn with_method(
        mut self,
        name: &str,
        f: impl Fn(&[Value]) -> Value + Send + Sync + 'static,
    ) -> Self {
        self.methods.insert(name.to_string(), Callable::new(f));
        self
    }

    pub fn set_property(&mut self, name: &str, value: Value) {
        self.properties.insert(name.to_string(), value);
    }
}

impl ComponentInstance for DynamicInstance {
    fn property(&self, name: &str) -> Option<Value> {
        self.properties.get(name).cloned()
    }

    fn method(&self, name: &str) -> Option<Callable> {
        self.methods.get(name).cloned()
    }
}
