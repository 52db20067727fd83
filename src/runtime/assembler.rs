//! Build the option object for one component construction

use std::collections::HashMap;

use log::{debug, warn};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::extract::{
    collection_array, find_placeholders, sequential_ids, COLLECTION_PREFIX, EXPRESSION_PREFIX,
};
use crate::metadata::ComputedKind;

use super::options::{
    component_tag_name, ComponentData, ComponentOptions, DataFactory, PropDefinition, PropType,
    WatchDefinition,
};
use super::registry::{ComponentDefinition, Registry, RegistryError};
use super::source::{expression_from_source, strip_qualifiers};
use super::template::CompiledTemplate;
use super::value::{Callable, ComponentInstance};

/// Errors that abort the construction of a component
#[derive(Error, Debug)]
pub enum AssembleError {
    #[error("source of {id} does not have the accessor shape: {text}")]
    MalformedExpressionSource { id: String, text: String },
    #[error("{component} declares {member} but the instance does not implement it")]
    MissingMember { component: String, member: String },
    #[error("{component} has a validator for undeclared prop {prop}")]
    UnknownProp { component: String, prop: String },
    #[error(transparent)]
    Lookup(#[from] RegistryError),
    #[error("failed to copy data object: {0}")]
    DataCopy(#[from] serde_json::Error),
}

/// Assemble the options for `definition` from a live `instance`
///
/// Nested components are fetched from `registry`. Either every step
/// succeeds or nothing is returned.
pub fn assemble(
    definition: &ComponentDefinition,
    instance: &dyn ComponentInstance,
    registry: &Registry,
) -> Result<ComponentOptions, AssembleError> {
    let mut assembler = Assembler {
        definition,
        instance,
        options: ComponentOptions::default(),
    };

    if let Some(template) = &definition.template {
        assembler.template(template)?;
    }
    assembler.data()?;
    assembler.methods()?;
    assembler.computed()?;
    assembler.watch()?;
    assembler.props()?;
    assembler.hooks()?;
    assembler.components(registry)?;
    assembler.directives(registry)?;

    debug!(
        "assembled {}: {} methods, {} computed, {} props, {} components",
        definition.type_name,
        assembler.options.methods.len(),
        assembler.options.computed.len(),
        assembler.options.props.len(),
        assembler.options.components.len()
    );
    Ok(assembler.options)
}

struct Assembler<'a> {
    definition: &'a ComponentDefinition,
    instance: &'a dyn ComponentInstance,
    options: ComponentOptions,
}

impl Assembler<'_> {
    fn member(&self, name: &str) -> Result<Callable, AssembleError> {
        self.instance
            .method(name)
            .ok_or_else(|| AssembleError::MissingMember {
                component: self.definition.type_name.clone(),
                member: name.to_string(),
            })
    }

    /// Put literal expression text back into the template and bind collections
    fn template(&mut self, template: &CompiledTemplate) -> Result<(), AssembleError> {
        if template.is_empty() {
            return Ok(());
        }

        let ids = sequential_ids(EXPRESSION_PREFIX, |id| template.methods.contains_key(id));
        let declared = template
            .methods
            .keys()
            .filter(|id| id.starts_with(EXPRESSION_PREFIX))
            .count();
        if declared > ids.len() {
            warn!(
                "{}: expression numbering stops at {}{}, {} later expressions stay unresolved",
                self.definition.type_name,
                EXPRESSION_PREFIX,
                ids.len(),
                declared - ids.len()
            );
        }

        let mut expressions = HashMap::with_capacity(ids.len());
        for id in ids {
            let source = template.method_source(&id).unwrap_or_default();
            let expression = expression_from_source(source).ok_or_else(|| {
                AssembleError::MalformedExpressionSource {
                    id: id.clone(),
                    text: source.to_string(),
                }
            })?;
            expressions.insert(id, strip_qualifiers(expression));
        }

        let mut text = String::with_capacity(template.text.len());
        let mut cursor = 0;
        for (range, token) in find_placeholders(&template.text, EXPRESSION_PREFIX) {
            if let Some(expression) = expressions.get(token) {
                text.push_str(&template.text[cursor..range.start]);
                text.push_str(expression);
                cursor = range.end;
            }
        }
        text.push_str(&template.text[cursor..]);
        self.options.template = Some(text);

        for id in sequential_ids(COLLECTION_PREFIX, |id| template.methods.contains_key(id)) {
            let method = self.member(&id)?;
            self.options.methods.insert(id.clone(), method);
            self.options.collections.push(id);
        }
        Ok(())
    }

    fn data(&mut self) -> Result<(), AssembleError> {
        let mut data = Map::new();
        for field in &self.definition.metadata.data {
            let value = match self.instance.property(&field.name) {
                Some(Value::Null) | None => Value::Object(Map::new()),
                Some(value) => value,
            };
            data.insert(field.name.clone(), value);
        }
        for id in &self.options.collections {
            data.insert(collection_array(id), Value::Array(Vec::new()));
        }

        self.options.data = if self.definition.metadata.use_factory {
            let factory = DataFactory::new(data);
            // Copy errors surface during assembly
            factory.produce()?;
            ComponentData::Factory(factory)
        } else {
            ComponentData::Object(data)
        };
        Ok(())
    }

    fn methods(&mut self) -> Result<(), AssembleError> {
        for method in &self.definition.metadata.methods {
            let callable = self.member(&method.name)?;
            self.options.methods.insert(method.name.clone(), callable);
        }
        Ok(())
    }

    fn computed(&mut self) -> Result<(), AssembleError> {
        for computed in &self.definition.metadata.computed {
            let callable = self.member(computed.method_name())?;
            let entry = self
                .options
                .computed
                .entry(computed.name.clone())
                .or_default();
            match computed.kind {
                ComputedKind::Getter => entry.get = Some(callable),
                ComputedKind::Setter => entry.set = Some(callable),
            }
        }
        Ok(())
    }

    fn watch(&mut self) -> Result<(), AssembleError> {
        for watch in &self.definition.metadata.watch {
            let handler = self.member(&watch.method)?;
            let definition = if watch.deep {
                WatchDefinition::Deep { handler }
            } else {
                WatchDefinition::Handler(handler)
            };
            self.options.watch.insert(watch.property.clone(), definition);
        }
        Ok(())
    }

    fn props(&mut self) -> Result<(), AssembleError> {
        for prop in &self.definition.metadata.props {
            self.options.props.insert(
                prop.name.clone(),
                PropDefinition {
                    required: prop.required,
                    default_value: self.instance.property(&prop.name),
                    prop_type: prop.type_name.as_deref().map(PropType::from_type_name),
                    validator: None,
                },
            );
        }

        // Validators are bound once every prop exists
        for validator in &self.definition.metadata.validators {
            let callable = self.member(&validator.method)?;
            let definition = self.options.props.get_mut(&validator.prop).ok_or_else(|| {
                AssembleError::UnknownProp {
                    component: self.definition.type_name.clone(),
                    prop: validator.prop.clone(),
                }
            })?;
            definition.validator = Some(callable);
        }
        Ok(())
    }

    fn hooks(&mut self) -> Result<(), AssembleError> {
        for hook in &self.definition.metadata.hooks {
            let callable = self.member(hook)?;
            self.options.hooks.insert(hook.clone(), callable);
        }
        Ok(())
    }

    fn components(&mut self, registry: &Registry) -> Result<(), AssembleError> {
        for type_name in self.definition.dependencies() {
            let nested = registry.get(type_name)?;
            self.options
                .components
                .insert(component_tag_name(type_name), nested);
        }
        Ok(())
    }

    fn directives(&mut self, registry: &Registry) -> Result<(), AssembleError> {
        for name in &self.definition.metadata.directives {
            let directive = registry.get_directive(name)?;
            self.options.directives.insert(name.clone(), directive);
        }
        Ok(())
    }
}
