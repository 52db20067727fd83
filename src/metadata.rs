//! Component type metadata
//!
//! This is what the annotation layer knows about a component type: its data
//! fields, methods, computed properties, watchers, props and nested
//! components. Manifests describe it in TOML so the compiler can run without
//! that layer.
//!
//! ```toml
//! root_type = "Component"
//!
//! [[component]]
//! name = "TodoList"
//! superclass = "BaseList"
//! template = "todo_list.html"
//! components = ["TodoItemComponent"]
//!
//! [[component.data]]
//! name = "todos"
//! type = "List<Todo>"
//!
//! [[component.computed]]
//! name = "remaining"
//! method = "getRemaining"
//! type = "int"
//! ```

use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Type name used when nothing more specific is declared
pub const OBJECT_TYPE: &str = "Object";
/// Return type of accessors that produce no value
pub const VOID_TYPE: &str = "void";
/// Default root base type shared by every component
pub const DEFAULT_ROOT_TYPE: &str = "Component";

fn object_type() -> String {
    OBJECT_TYPE.to_string()
}

fn void_type() -> String {
    VOID_TYPE.to_string()
}

/// Errors that can occur when loading a manifest
#[derive(Error, Debug)]
pub enum ManifestError {
    #[error("Failed to read manifest file: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse manifest TOML: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("component type declared twice: {name}")]
    Duplicate { name: String },
}

/// A declared data field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataField {
    pub name: String,
    #[serde(rename = "type", default = "object_type")]
    pub type_name: String,
}

/// A declared method exposed to the template
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodDecl {
    pub name: String,
    #[serde(default = "void_type")]
    pub return_type: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComputedKind {
    #[default]
    Getter,
    Setter,
}

/// A computed property accessor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComputedDecl {
    /// Property name seen by the template
    pub name: String,
    /// Instance method implementing the accessor; defaults to `name`
    #[serde(default)]
    pub method: Option<String>,
    #[serde(rename = "type", default = "object_type")]
    pub type_name: String,
    #[serde(default)]
    pub kind: ComputedKind,
}

impl ComputedDecl {
    pub fn method_name(&self) -> &str {
        self.method.as_deref().unwrap_or(&self.name)
    }
}

/// A watcher bound to a property
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WatchDecl {
    pub method: String,
    pub property: String,
    #[serde(default)]
    pub deep: bool,
}

/// A declared prop
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropDecl {
    pub name: String,
    #[serde(rename = "type", default)]
    pub type_name: Option<String>,
    #[serde(default)]
    pub required: bool,
}

/// An instance method validating the value of a prop
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidatorDecl {
    pub method: String,
    pub prop: String,
}

/// Everything the annotation layer declares for one component type
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ComponentType {
    pub name: String,
    #[serde(default)]
    pub superclass: Option<String>,
    /// Template markup file, relative to the manifest
    #[serde(default)]
    pub template: Option<PathBuf>,
    /// Give every instance its own deep copy of the data object
    #[serde(default)]
    pub use_factory: bool,
    /// Style bindings: template name -> style type
    #[serde(default)]
    pub styles: IndexMap<String, String>,
    /// Nested component types, by type name
    #[serde(default)]
    pub components: Vec<String>,
    #[serde(default)]
    pub directives: Vec<String>,
    /// Lifecycle hooks implemented by the instance
    #[serde(default)]
    pub hooks: Vec<String>,
    #[serde(default)]
    pub data: Vec<DataField>,
    #[serde(default)]
    pub methods: Vec<MethodDecl>,
    #[serde(default)]
    pub computed: Vec<ComputedDecl>,
    #[serde(default)]
    pub watch: Vec<WatchDecl>,
    #[serde(default)]
    pub props: Vec<PropDecl>,
    #[serde(default)]
    pub validators: Vec<ValidatorDecl>,
}

impl ComponentType {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_superclass(mut self, superclass: impl Into<String>) -> Self {
        self.superclass = Some(superclass.into());
        self
    }

    pub fn with_data(mut self, name: &str, type_name: &str) -> Self {
        self.data.push(DataField {
            name: name.to_string(),
            type_name: type_name.to_string(),
        });
        self
    }

    pub fn with_method(mut self, name: &str, return_type: &str) -> Self {
        self.methods.push(MethodDecl {
            name: name.to_string(),
            return_type: return_type.to_string(),
        });
        self
    }

    pub fn with_computed(mut self, name: &str, type_name: &str) -> Self {
        self.computed.push(ComputedDecl {
            name: name.to_string(),
            method: None,
            type_name: type_name.to_string(),
            kind: ComputedKind::Getter,
        });
        self
    }

    pub fn with_component(mut self, type_name: &str) -> Self {
        self.components.push(type_name.to_string());
        self
    }

    /// Declared getter type of a computed property on this type
    pub fn computed_type(&self, property: &str) -> Option<&str> {
        self.computed
            .iter()
            .find(|c| c.name == property && c.kind == ComputedKind::Getter)
            .map(|c| c.type_name.as_str())
    }

    /// Declared type of a data field on this type
    pub fn data_type(&self, name: &str) -> Option<&str> {
        self.data
            .iter()
            .find(|d| d.name == name)
            .map(|d| d.type_name.as_str())
    }
}

/// The known component types and where their ancestry ends
#[derive(Debug, Clone)]
pub struct TypeHierarchy {
    types: IndexMap<String, ComponentType>,
    root: String,
}

impl Default for TypeHierarchy {
    fn default() -> Self {
        Self::new(DEFAULT_ROOT_TYPE)
    }
}

impl TypeHierarchy {
    pub fn new(root: impl Into<String>) -> Self {
        Self {
            types: IndexMap::new(),
            root: root.into(),
        }
    }

    pub fn root(&self) -> &str {
        &self.root
    }

    pub fn set_root(&mut self, root: impl Into<String>) {
        self.root = root.into();
    }

    pub fn insert(&mut self, component: ComponentType) -> Result<(), ManifestError> {
        if self.types.contains_key(&component.name) {
            return Err(ManifestError::Duplicate {
                name: component.name,
            });
        }
        self.types.insert(component.name.clone(), component);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&ComponentType> {
        self.types.get(name)
    }

    pub fn types(&self) -> impl Iterator<Item = &ComponentType> {
        self.types.values()
    }

    /// Walk from `name` up through its superclasses
    ///
    /// The walk yields `name` itself first and stops before the root type. It
    /// also stops at a type it does not know, or at one it has already visited.
    pub fn ancestry<'h>(&'h self, name: &str) -> Vec<&'h ComponentType> {
        let mut chain: Vec<&ComponentType> = Vec::new();
        let mut current = Some(name.to_string());

        while let Some(type_name) = current {
            if type_name == self.root {
                break;
            }
            let Some(component) = self.types.get(&type_name) else {
                break;
            };
            if chain.iter().any(|c| c.name == component.name) {
                break;
            }
            chain.push(component);
            current = component.superclass.clone();
        }

        chain
    }

    /// Find the declared type of a computed property, nearest declaration first
    pub fn computed_type(&self, name: &str, property: &str) -> Option<&str> {
        self.ancestry(name)
            .into_iter()
            .find_map(|c| c.computed_type(property))
    }

    /// The type `name` with the members its ancestors declare folded in
    ///
    /// Inherited methods, computed properties, watchers and hooks are appended
    /// after the type's own. A member already declared closer to `name` hides
    /// the ancestor's; computed getters and setters are matched separately.
    pub fn resolved(&self, name: &str) -> Option<ComponentType> {
        let mut chain = self.ancestry(name).into_iter();
        let mut resolved = chain.next()?.clone();

        for ancestor in chain {
            for method in &ancestor.methods {
                if !resolved.methods.iter().any(|m| m.name == method.name) {
                    resolved.methods.push(method.clone());
                }
            }
            for computed in &ancestor.computed {
                let hidden = resolved
                    .computed
                    .iter()
                    .any(|c| c.name == computed.name && c.kind == computed.kind);
                if !hidden {
                    resolved.computed.push(computed.clone());
                }
            }
            for watch in &ancestor.watch {
                if !resolved.watch.iter().any(|w| w.property == watch.property) {
                    resolved.watch.push(watch.clone());
                }
            }
            for hook in &ancestor.hooks {
                if !resolved.hooks.contains(hook) {
                    resolved.hooks.push(hook.clone());
                }
            }
        }
        Some(resolved)
    }
}

/// TOML structure for deserializing manifests
#[derive(Debug, Deserialize)]
struct TomlManifest {
    root_type: Option<String>,
    #[serde(default)]
    component: Vec<ComponentType>,
}

/// A set of component types loaded from TOML
#[derive(Debug, Clone)]
pub struct Manifest {
    pub hierarchy: TypeHierarchy,
    /// Root type named by the manifest itself, if any
    pub root_type: Option<String>,
    /// Directory template paths are resolved against
    pub base_path: Option<PathBuf>,
}

impl Manifest {
    /// Load a manifest from a TOML file
    pub fn from_file(path: &Path) -> Result<Self, ManifestError> {
        let content = std::fs::read_to_string(path)?;
        let mut manifest = Self::from_str(&content)?;
        manifest.base_path = path.parent().map(Path::to_path_buf);
        Ok(manifest)
    }

    /// Load a manifest from a TOML string
    pub fn from_str(content: &str) -> Result<Self, ManifestError> {
        let parsed: TomlManifest = toml::from_str(content)?;
        let mut hierarchy = TypeHierarchy::new(
            parsed
                .root_type
                .clone()
                .unwrap_or_else(|| DEFAULT_ROOT_TYPE.to_string()),
        );
        for component in parsed.component {
            hierarchy.insert(component)?;
        }
        Ok(Self {
            hierarchy,
            root_type: parsed.root_type,
            base_path: None,
        })
    }

    /// Resolve a template path against the manifest's directory
    pub fn resolve_path(&self, relative: &Path) -> PathBuf {
        match &self.base_path {
            Some(base) => base.join(relative),
            None => relative.to_path_buf(),
        }
    }
}
