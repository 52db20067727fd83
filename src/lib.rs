//! Templar - a template compiler for reactive UI components
//!
//! Templates are compiled in two stages. At build time each component's
//! markup is scanned, its embedded expressions are lifted into typed accessor
//! methods, and a compiled view is produced. At construction time the
//! runtime recovers the expression text from those accessors, puts it back
//! into the template, and assembles the option object the rendering engine
//! consumes.
//!
//! # Example
//!
//! ```rust
//! use templar::{compile_component, CompilerConfig, ComponentType, TypeHierarchy};
//!
//! let counter = ComponentType::new("Counter").with_data("count", "int");
//! let compiled = compile_component(
//!     &counter,
//!     Some("<p>{{ count }}</p>"),
//!     &TypeHierarchy::default(),
//!     &CompilerConfig::default(),
//! )
//! .unwrap();
//!
//! assert_eq!(compiled.compiled.text, "<p>{{ exp$0 }}</p>");
//! assert!(compiled.source.contains("return (count) + \"\";"));
//! ```

pub mod config;
pub mod error;
pub mod extract;
pub mod metadata;
pub mod parser;
pub mod runtime;
pub mod synth;

pub use config::{CompilerConfig, ConfigError};
pub use error::ParseError;
pub use extract::{extract, Extraction, ExpressionKind, ExtractedExpression, CollectionPlaceholder};
pub use metadata::{ComponentType, Manifest, ManifestError, TypeHierarchy};
pub use runtime::{
    assemble, AssembleError, CompiledTemplate, ComponentDefinition, ComponentOptions, Registry,
    RegistryError,
};
pub use synth::ComponentDescriptor;

use std::path::PathBuf;

use log::debug;
use thiserror::Error;

/// Errors that can occur during compilation
#[derive(Debug, Error)]
pub enum CompileError {
    /// Template syntax errors
    #[error("parse errors: {}", format_parse_errors(.0))]
    Parse(Vec<ParseError>),

    /// Template syntax errors, rendered against the template file
    #[error("template errors in {component}:\n{report}")]
    Template { component: String, report: String },

    #[error("failed to read template '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Manifest(#[from] ManifestError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl From<Vec<ParseError>> for CompileError {
    fn from(errors: Vec<ParseError>) -> Self {
        CompileError::Parse(errors)
    }
}

fn format_parse_errors(errors: &[ParseError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

/// Build-time output for one component
#[derive(Debug, Clone)]
pub struct CompiledComponent {
    pub descriptor: ComponentDescriptor,
    /// Resource unit with the typed accessors
    pub source: String,
    pub compiled: CompiledTemplate,
}

impl CompiledComponent {
    /// The definition to register for this component
    pub fn definition(&self, metadata: ComponentType) -> ComponentDefinition {
        let template = self
            .descriptor
            .has_template()
            .then(|| self.compiled.clone());
        ComponentDefinition::new(metadata, template)
    }
}

/// Compile one component; `None` means the component has no template
pub fn compile_component(
    component: &ComponentType,
    template_source: Option<&str>,
    hierarchy: &TypeHierarchy,
    config: &CompilerConfig,
) -> Result<CompiledComponent, CompileError> {
    let extraction = template_source
        .map(|source| extract(source, component, hierarchy))
        .transpose()?;

    let descriptor = synth::describe(component, extraction, hierarchy);
    let source = synth::write_resource(&descriptor, config);
    let compiled = synth::compile_view(&descriptor);
    debug!(
        "compiled {}: {} expressions, {} collections",
        component.name,
        descriptor.expressions.len(),
        descriptor.collections.len()
    );

    Ok(CompiledComponent {
        descriptor,
        source,
        compiled,
    })
}

/// Compile every component a manifest declares, reading template files
///
/// The manifest's own `root_type` wins over the configured one.
pub fn compile_manifest(
    manifest: &Manifest,
    config: &CompilerConfig,
) -> Result<Vec<CompiledComponent>, CompileError> {
    let mut hierarchy = manifest.hierarchy.clone();
    if manifest.root_type.is_none() {
        hierarchy.set_root(config.root_type.clone());
    }

    let mut compiled = Vec::new();
    for component in hierarchy.types() {
        let Some(relative) = &component.template else {
            compiled.push(compile_component(component, None, &hierarchy, config)?);
            continue;
        };

        let path = manifest.resolve_path(relative);
        let source = std::fs::read_to_string(&path).map_err(|source| CompileError::Io {
            path: path.clone(),
            source,
        })?;

        match compile_component(component, Some(&source), &hierarchy, config) {
            Ok(result) => compiled.push(result),
            Err(CompileError::Parse(errors)) => {
                let filename = path.display().to_string();
                let report = errors
                    .iter()
                    .map(|e| e.format(&source, &filename))
                    .collect::<Vec<_>>()
                    .join("\n");
                return Err(CompileError::Template {
                    component: component.name.clone(),
                    report,
                });
            }
            Err(e) => return Err(e),
        }
    }
    Ok(compiled)
}

/// Register the definitions of compiled components
///
/// Each definition carries the members its type inherits, so the assembler
/// binds ancestor computed properties and methods too.
pub fn register_all(
    registry: &Registry,
    manifest: &Manifest,
    compiled: &[CompiledComponent],
) -> Result<(), RegistryError> {
    for component in compiled {
        let Some(metadata) = manifest.hierarchy.resolved(&component.descriptor.type_name) else {
            continue;
        };
        registry.register(component.definition(metadata))?;
    }
    Ok(())
}
