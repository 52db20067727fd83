//! End-to-end tests: compile templates, then assemble them at runtime

use std::path::Path;

use pretty_assertions::assert_eq;
use serde_json::{json, Value};

use templar::extract::{find_placeholders, EXPRESSION_PREFIX};
use templar::runtime::{strip_qualifiers, ComponentData, DynamicInstance};
use templar::{
    assemble, compile_component, compile_manifest, register_all, AssembleError, CompileError,
    CompiledTemplate, CompilerConfig, ComponentDefinition, ComponentType, Manifest, Registry,
    TypeHierarchy,
};

fn fixture_manifest() -> Manifest {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/todo/manifest.toml");
    Manifest::from_file(&path).expect("Should load manifest")
}

fn noop(_: &[Value]) -> Value {
    Value::Null
}

#[test]
fn test_round_trip_resolves_every_placeholder() {
    let component = ComponentType::new("Gallery")
        .with_data("photos", "List<Photo>")
        .with_data("title", "String");
    let template = r#"<div :title="this.title">
  <h1>{{ title.toUpperCase() }}</h1>
  <img v-for="Photo p in photos" :src="p.url" @click="select(p, $event)">
  <span v-show="photos.isEmpty()">{{ this.photos.size() + 1 }}</span>
</div>"#;

    let compiled = compile_component(
        &component,
        Some(template),
        &TypeHierarchy::default(),
        &CompilerConfig::default(),
    )
    .expect("Should compile");
    let expressions = compiled.descriptor.expressions.clone();
    assert_eq!(expressions.len(), 6);
    assert_eq!(compiled.descriptor.collections.len(), 1);

    let instance = DynamicInstance::new().with_method("col$0", noop);
    let definition = compiled.definition(component);
    let options = assemble(&definition, &instance, &Registry::new()).expect("Should assemble");
    let text = options.template.expect("Should have a template");

    assert!(find_placeholders(&text, EXPRESSION_PREFIX).is_empty());
    for expression in &expressions {
        assert!(
            text.contains(&strip_qualifiers(&expression.body)),
            "{} missing from {}",
            expression.body,
            text
        );
    }
    assert!(text.contains(r#"<img v-for="p in col$0Array" :src="p.url""#));
    assert!(text.contains(r#"@click="select(p, $event)""#));
}

#[test]
fn test_gap_stops_resolution() {
    let component = ComponentType::new("Gap");
    let compiled = compile_component(
        &component,
        Some("{{ a }} {{ b }} {{ c }}"),
        &TypeHierarchy::default(),
        &CompilerConfig::default(),
    )
    .expect("Should compile");

    let mut template: CompiledTemplate = compiled.compiled.clone();
    template.methods.shift_remove("exp$1");
    let definition = ComponentDefinition::new(component, Some(template));

    let options = assemble(&definition, &DynamicInstance::new(), &Registry::new())
        .expect("Should assemble");
    assert_eq!(options.template.as_deref(), Some("{{ a }} {{ exp$1 }} {{ exp$2 }}"));
}

#[test]
fn test_source_drift_is_fatal() {
    let component = ComponentType::new("Drift");
    let mut template = CompiledTemplate::empty("Drift");
    template.text = "{{ exp$0 }}".to_string();
    template
        .methods
        .insert("exp$0".to_string(), "x => x.count".to_string());
    let definition = ComponentDefinition::new(component, Some(template));

    let err = assemble(&definition, &DynamicInstance::new(), &Registry::new()).unwrap_err();
    assert!(matches!(err, AssembleError::MalformedExpressionSource { .. }));
}

#[test]
fn test_manifest_pipeline() {
    let manifest = fixture_manifest();
    let compiled = compile_manifest(&manifest, &CompilerConfig::default()).expect("Should compile");
    assert_eq!(compiled.len(), 3);

    let list = compiled
        .iter()
        .find(|c| c.descriptor.type_name == "TodoList")
        .expect("TodoList should be compiled");
    assert_eq!(
        list.descriptor.inherited_computed.get("empty").map(String::as_str),
        Some("boolean")
    );
    assert!(list.source.starts_with("// todo_list.html\n"));
    assert!(list.source.contains("    public boolean empty;\n"));
    assert!(list.source.contains("public String getName() {"));
    assert!(list.source.contains("    public String exp$0() {\n        return (draft) + \"\";\n    }\n"));
    assert!(list.source.contains("    public void exp$1(Object $event) {\n        addTodo();\n    }\n"));
    assert!(list.source.contains("    public Object exp$3(Todo todo, int i) {\n"));

    let registry = Registry::new();
    register_all(&registry, &manifest, &compiled).expect("Should register");

    let definition = registry.get("TodoList").expect("Should be registered");
    let instance = DynamicInstance::new()
        .with_property("todos", json!([{"text": "write tests", "done": false}]))
        .with_method("addTodo", noop)
        .with_method("getRemaining", |_| json!(1))
        .with_method("isEmpty", |_| json!(false))
        .with_method("onTodosChanged", noop)
        .with_method("created", noop)
        .with_method("col$0", noop);

    let options = assemble(&definition, &instance, &registry).expect("Should assemble");
    let text = options.template.as_deref().expect("Should have a template");
    assert!(text.contains(r#"<input v-model="draft" @keyup.enter="addTodo()">"#));
    assert!(text.contains("<footer>{{ remaining }} left of {{ todos.size() }}</footer>"));
    assert!(text.contains(
        r#"<todo-item v-for="(todo, i) in col$0Array" :todo="todo" :key="i"></todo-item>"#
    ));
    assert!(text.contains(r#"<p v-if="empty">"#));

    assert!(options.components.contains_key("todo-item"));
    assert!(options.watch["todos"].is_deep());
    assert!(options.computed["remaining"].get.is_some());
    // Declared on BaseList
    let empty = &options.computed["empty"];
    assert_eq!(empty.get.as_ref().map(|g| g.call(&[])), Some(json!(false)));

    let ComponentData::Factory(factory) = &options.data else {
        panic!("TodoList asks for per-instance data");
    };
    let data = factory.produce().expect("Should copy data");
    assert_eq!(data.get("draft"), Some(&json!({})));
    assert_eq!(data.get("col$0Array"), Some(&json!([])));

    assert!(registry.is_ensured("TodoList"));
    assert!(registry.is_ensured("TodoItemComponent"));

    let item = registry.get("TodoItemComponent").expect("Should be registered");
    let instance = DynamicInstance::new()
        .with_property("todo", json!({"text": "write tests", "done": false}))
        .with_method("isValidTodo", |_| json!(true));
    let options = assemble(&item, &instance, &registry).expect("Should assemble");
    assert_eq!(
        options.template.as_deref().map(str::trim_end),
        Some(r#"<li :class="{ done: todo.done }" @click="todo.toggle()">{{ todo.text }}</li>"#)
    );
    assert!(options.props["todo"].validator.is_some());
    assert_eq!(options.components["todo-list"].type_name, "TodoList");
}

#[test]
fn test_manifest_template_errors_are_reported() {
    let mut manifest = Manifest::from_str(
        "[[component]]\nname = \"Broken\"\ntemplate = \"broken.html\"\n",
    )
    .expect("Should parse manifest");
    manifest.base_path = Some(Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures"));

    let err = compile_manifest(&manifest, &CompilerConfig::default()).unwrap_err();
    match err {
        CompileError::Template { component, report } => {
            assert_eq!(component, "Broken");
            assert!(report.contains("broken.html"));
        }
        other => panic!("unexpected error: {other}"),
    }
}
