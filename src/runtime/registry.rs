//! Process-wide definitions, keyed by component type
//!
//! Each generated definition registers itself once. The first successful
//! `get` for a type resolves the definitions of the components it nests,
//! exactly once, before handing the definition out. Mutual references
//! between components are legal: an ensure that re-enters a type already
//! being ensured on the same thread returns without recursing.
//!
//! Ensure work is serialized across threads. One thread at a time owns it;
//! the others wait until the owner is done.

use std::collections::HashMap;
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::thread::{self, ThreadId};

use indexmap::IndexMap;
use log::{debug, trace};
use once_cell::sync::Lazy;
use thiserror::Error;

use crate::metadata::ComponentType;

use super::template::CompiledTemplate;
use super::value::Callable;

/// Errors raised by registry lookups and registration
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("no definition registered for component type {type_name}; was its template compiled?")]
    NotRegistered { type_name: String },
    #[error("component type {type_name} is already registered")]
    Duplicate { type_name: String },
    #[error("no directive registered under {name}")]
    DirectiveNotRegistered { name: String },
    #[error("directive {name} is already registered")]
    DuplicateDirective { name: String },
}

/// The build-time output for one component type
#[derive(Debug, Clone)]
pub struct ComponentDefinition {
    pub type_name: String,
    /// `None` for components without a template
    pub template: Option<CompiledTemplate>,
    pub metadata: ComponentType,
}

impl ComponentDefinition {
    pub fn new(metadata: ComponentType, template: Option<CompiledTemplate>) -> Self {
        Self {
            type_name: metadata.name.clone(),
            template,
            metadata,
        }
    }

    /// Component types this definition nests
    pub fn dependencies(&self) -> &[String] {
        &self.metadata.components
    }
}

/// A custom directive: hook name -> callable
#[derive(Debug, Clone, Default)]
pub struct DirectiveDefinition {
    pub name: String,
    pub hooks: IndexMap<String, Callable>,
}

impl DirectiveDefinition {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            hooks: IndexMap::new(),
        }
    }

    pub fn with_hook(mut self, hook: &str, callable: Callable) -> Self {
        self.hooks.insert(hook.to_string(), callable);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EnsureState {
    Registered,
    Ensuring(ThreadId),
    Ensured,
}

struct Entry {
    definition: Arc<ComponentDefinition>,
    state: EnsureState,
}

#[derive(Default)]
struct Inner {
    entries: HashMap<String, Entry>,
    directives: HashMap<String, Arc<DirectiveDefinition>>,
    /// Thread doing ensure work, and how deeply it is nested
    owner: Option<(ThreadId, usize)>,
}

type EnsureHook = Box<dyn Fn(&ComponentDefinition) + Send + Sync>;

/// Map from component type to its definition
#[derive(Default)]
pub struct Registry {
    inner: Mutex<Inner>,
    ready: Condvar,
    on_ensure: Option<EnsureHook>,
}

static GLOBAL: Lazy<Registry> = Lazy::new(Registry::new);

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `hook` each time an entry finishes its ensure step
    pub fn with_ensure_hook(
        mut self,
        hook: impl Fn(&ComponentDefinition) + Send + Sync + 'static,
    ) -> Self {
        self.on_ensure = Some(Box::new(hook));
        self
    }

    /// The registry shared by the whole process
    pub fn global() -> &'static Registry {
        &GLOBAL
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn wait<'g>(&self, guard: MutexGuard<'g, Inner>) -> MutexGuard<'g, Inner> {
        self.ready.wait(guard).unwrap_or_else(PoisonError::into_inner)
    }

    pub fn register(&self, definition: ComponentDefinition) -> Result<Arc<ComponentDefinition>, RegistryError> {
        let mut inner = self.lock();
        if inner.entries.contains_key(&definition.type_name) {
            return Err(RegistryError::Duplicate {
                type_name: definition.type_name,
            });
        }
        debug!("registered {}", definition.type_name);
        let definition = Arc::new(definition);
        inner.entries.insert(
            definition.type_name.clone(),
            Entry {
                definition: Arc::clone(&definition),
                state: EnsureState::Registered,
            },
        );
        Ok(definition)
    }

    pub fn contains(&self, type_name: &str) -> bool {
        self.lock().entries.contains_key(type_name)
    }

    pub fn is_ensured(&self, type_name: &str) -> bool {
        self.lock()
            .entries
            .get(type_name)
            .is_some_and(|entry| entry.state == EnsureState::Ensured)
    }

    /// Look up a definition, resolving its nested components on first use
    ///
    /// A type that was never registered is an error, not an empty result.
    pub fn get(&self, type_name: &str) -> Result<Arc<ComponentDefinition>, RegistryError> {
        let current = thread::current().id();
        let mut inner = self.lock();

        let definition = loop {
            let owner = inner.owner;
            let entry = inner
                .entries
                .get_mut(type_name)
                .ok_or_else(|| RegistryError::NotRegistered {
                    type_name: type_name.to_string(),
                })?;

            match entry.state {
                EnsureState::Ensured => return Ok(Arc::clone(&entry.definition)),
                EnsureState::Ensuring(thread) if thread == current => {
                    trace!("{} is already being ensured", type_name);
                    return Ok(Arc::clone(&entry.definition));
                }
                EnsureState::Ensuring(_) => {}
                EnsureState::Registered => match owner {
                    Some((thread, _)) if thread != current => {}
                    _ => {
                        entry.state = EnsureState::Ensuring(current);
                        break Arc::clone(&entry.definition);
                    }
                },
            }
            inner = self.wait(inner);
        };

        inner.owner = Some(match inner.owner {
            Some((thread, depth)) => (thread, depth + 1),
            None => (current, 1),
        });
        drop(inner);

        let result = self.ensure(&definition);

        let mut inner = self.lock();
        if let Some(entry) = inner.entries.get_mut(type_name) {
            entry.state = match &result {
                Ok(()) => EnsureState::Ensured,
                Err(err) => {
                    // Dependencies that finished before the failure stay ensured
                    trace!("rolling back {}: {}", type_name, err);
                    EnsureState::Registered
                }
            };
        }
        inner.owner = match inner.owner {
            Some((thread, depth)) if depth > 1 => Some((thread, depth - 1)),
            _ => None,
        };
        drop(inner);
        self.ready.notify_all();

        result.map(|()| definition)
    }

    fn ensure(&self, definition: &ComponentDefinition) -> Result<(), RegistryError> {
        debug!(
            "ensuring {} ({} dependencies)",
            definition.type_name,
            definition.dependencies().len()
        );
        for dependency in definition.dependencies() {
            self.get(dependency)?;
        }
        if let Some(hook) = &self.on_ensure {
            hook(definition);
        }
        Ok(())
    }

    pub fn register_directive(&self, directive: DirectiveDefinition) -> Result<(), RegistryError> {
        let mut inner = self.lock();
        if inner.directives.contains_key(&directive.name) {
            return Err(RegistryError::DuplicateDirective {
                name: directive.name,
            });
        }
        debug!("registered directive {}", directive.name);
        inner
            .directives
            .insert(directive.name.clone(), Arc::new(directive));
        Ok(())
    }

    pub fn get_directive(&self, name: &str) -> Result<Arc<DirectiveDefinition>, RegistryError> {
        self.lock()
            .directives
            .get(name)
            .cloned()
            .ok_or_else(|| RegistryError::DirectiveNotRegistered {
                name: name.to_string(),
            })
    }
}
