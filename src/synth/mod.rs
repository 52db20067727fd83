//! Method synthesis
//!
//! Turns an [`Extraction`] into the two artifacts the rest of the pipeline
//! consumes: a resource unit declaring one typed accessor per expression, and
//! a [`CompiledTemplate`] carrying the externally visible source of those
//! accessors for the runtime.

mod computed;
mod literal;
mod method;
mod writer;

pub use computed::inherited_computed;
pub use literal::{escape_literal, split_literal, write_text_return, MAX_LITERAL_CHUNK};
pub use method::{compiled_source, synthesize, synthesize_collection, ReturnShape, SynthesizedMethod};
pub use writer::SourceBuilder;

use indexmap::IndexMap;
use log::debug;
use serde::Serialize;

use crate::config::CompilerConfig;
use crate::extract::{CollectionPlaceholder, ExtractedExpression, Extraction};
use crate::metadata::{ComponentType, TypeHierarchy};
use crate::runtime::{CompiledTemplate, ExpressionEntry};

/// Everything known about one component at build time
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComponentDescriptor {
    pub type_name: String,
    /// Path of the template markup, when the component has one
    pub template_path: Option<String>,
    /// Template text with placeholders unresolved
    pub template: String,
    pub expressions: Vec<ExtractedExpression>,
    pub collections: Vec<CollectionPlaceholder>,
    pub styles: IndexMap<String, String>,
    /// Computed property types declared along the ancestry, most derived first
    pub inherited_computed: IndexMap<String, String>,
}

impl ComponentDescriptor {
    pub fn has_template(&self) -> bool {
        !self.template.is_empty()
    }
}

/// Build the descriptor for `component`; `None` means it has no template
pub fn describe(
    component: &ComponentType,
    extraction: Option<Extraction>,
    hierarchy: &TypeHierarchy,
) -> ComponentDescriptor {
    let extraction = extraction.unwrap_or_default();
    ComponentDescriptor {
        type_name: component.name.clone(),
        template_path: component
            .template
            .as_ref()
            .map(|path| path.display().to_string()),
        template: extraction.template,
        expressions: extraction.expressions,
        collections: extraction.collections,
        styles: component.styles.clone(),
        inherited_computed: inherited_computed(hierarchy, &component.name),
    }
}

fn accessors(descriptor: &ComponentDescriptor) -> Vec<SynthesizedMethod> {
    descriptor
        .expressions
        .iter()
        .map(synthesize)
        .chain(descriptor.collections.iter().map(synthesize_collection))
        .collect()
}

/// Write the typed resource unit for a component
pub fn write_resource(descriptor: &ComponentDescriptor, config: &CompilerConfig) -> String {
    let name = &descriptor.type_name;
    let mut out = SourceBuilder::new();

    if config.emit_comments {
        if let Some(path) = &descriptor.template_path {
            out.line(format!("// {}", path));
        }
    }
    out.open(format!("public class {}Template extends {}", name, name));

    if !descriptor.inherited_computed.is_empty() {
        for (property, type_name) in &descriptor.inherited_computed {
            out.line(format!("public {} {};", type_name, property));
        }
        out.line("");
    }

    for (style_name, style_type) in &descriptor.styles {
        out.line(format!(
            "private {} {} = {}Bundle.INSTANCE.style();",
            style_type, style_name, style_type
        ));
    }
    out.open("public Map<String, Object> getTemplateStyles()");
    out.line("Map<String, Object> result = new HashMap<>();");
    for style_name in descriptor.styles.keys() {
        out.line(format!("result.put(\"{}\", {});", style_name, style_name));
    }
    out.line("return result;");
    out.close();
    out.line("");

    out.open("public String getText()");
    write_text_return(&mut out, &descriptor.template, config.chunk_budget);
    out.close();
    out.line("");

    out.open("public String getName()");
    out.line(format!("return \"{}\";", escape_literal(name)));
    out.close();

    let methods = accessors(descriptor);
    for method in &methods {
        out.line("");
        for line in method.declaration.lines() {
            out.line(line);
        }
    }
    out.line("");

    out.open("public List<TemplateExpression> getTemplateExpressions()");
    out.line("List<TemplateExpression> result = new ArrayList<>();");
    for expression in &descriptor.expressions {
        out.line(format!(
            "result.add(new TemplateExpression(TemplateExpressionKind.{}, \"{}\"));",
            expression.kind, expression.id
        ));
    }
    out.line("return result;");
    out.close();

    out.close();
    debug!("wrote resource for {} with {} accessors", name, methods.len());
    out.finish()
}

/// Build the runtime's view of a component's template
pub fn compile_view(descriptor: &ComponentDescriptor) -> CompiledTemplate {
    let mut template = CompiledTemplate::empty(&descriptor.type_name);
    template.text = descriptor.template.clone();
    template.styles = descriptor.styles.clone();
    for method in accessors(descriptor) {
        template.methods.insert(method.id, method.compiled);
    }
    template.expressions = descriptor
        .expressions
        .iter()
        .map(|e| ExpressionEntry {
            kind: e.kind,
            id: e.id.clone(),
        })
        .collect();
    template
}
