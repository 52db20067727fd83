//! Runtime assembly
//!
//! Everything that happens when a component is constructed: recovering
//! expression text from compiled accessors, building the option object from
//! a live instance, and resolving nested components through the registry.

mod assembler;
mod options;
mod registry;
mod source;
mod template;
mod value;

pub use assembler::{assemble, AssembleError};
pub use options::{
    component_tag_name, ComponentData, ComponentOptions, ComputedDefinition, DataFactory,
    PropDefinition, PropType, WatchDefinition,
};
pub use registry::{ComponentDefinition, DirectiveDefinition, Registry, RegistryError};
pub use source::{expression_from_source, strip_qualifiers};
pub use template::{CompiledTemplate, ExpressionEntry};
pub use value::{Callable, ComponentInstance, DynamicInstance};
