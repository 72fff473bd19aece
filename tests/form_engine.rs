//! End-to-end behaviour of rendered forms driven through a caller store.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use serde_json::json;
use spark_forms::{
    find_field, Dispatcher, FieldDefinition, FieldKind, FieldProps, Flow, Form, LoadState, Node,
    OptionSource, Schema, SubForm, Ticket, Value, Widget,
};

/// Caller-side store: holds the value and counts `on_change` calls.
struct Store {
    value: RefCell<Value>,
    changes: Cell<usize>,
}

impl Store {
    fn new(value: serde_json::Value) -> Rc<Self> {
        Rc::new(Self { value: RefCell::new(Value::from(value)), changes: Cell::new(0) })
    }

    fn form(self: &Rc<Self>, schema: Schema, flow: Flow) -> Form {
        let store = self.clone();
        Form::new(schema, flow, move |next| {
            store.changes.set(store.changes.get() + 1);
            *store.value.borrow_mut() = next;
        })
    }

    fn value(&self) -> Value {
        self.value.borrow().clone()
    }

    fn json(&self) -> serde_json::Value {
        serde_json::Value::from(&*self.value.borrow())
    }
}

fn text_field<'a>(nodes: &'a [Node], name: &str) -> &'a spark_forms::primitives::TextInput {
    match find_field(nodes, name).map(|f| &f.widget) {
        Some(Widget::Text(input)) => input,
        other => panic!("{name} should render as text, got {other:?}"),
    }
}

#[test]
fn test_edit_preserves_siblings() {
    let store = Store::new(json!({ "name": "x", "owner": { "email": "a@b.c", "tags": ["t"] } }));
    let form = store.form(
        Schema::new()
            .field("name", FieldDefinition::new(FieldKind::String))
            .field("owner.email", FieldDefinition::new(FieldKind::String)),
        Flow::parse(["name", "owner.email"]),
    );
    let before = store.value();

    let nodes = form.render(&before).unwrap();
    text_field(&nodes, "owner.email").input("new@b.c");

    let after = store.value();
    assert_eq!(store.json(), json!({ "name": "x", "owner": { "email": "new@b.c", "tags": ["t"] } }));
    assert!(
        after.get_key("owner").unwrap().get_key("tags").unwrap().ptr_eq(before.get_key("owner").unwrap().get_key("tags").unwrap()),
        "untouched branches keep identity"
    );
    assert!(!after.ptr_eq(&before));
}

#[test]
fn test_collapse_toggle_never_reaches_on_change() {
    let store = Store::new(json!({}));
    let form = store.form(
        Schema::new().field("name", FieldDefinition::new(FieldKind::String)),
        Flow::parse([">>>Details", "name"]),
    );

    let nodes = form.render(&store.value()).unwrap();
    let group = nodes[0].as_collapse().unwrap();
    assert!(group.visible_children().is_empty(), "seeded collapsed");

    group.state.toggle();
    assert_eq!(store.changes.get(), 0);

    let nodes = form.render(&store.value()).unwrap();
    let group = nodes[0].as_collapse().unwrap();
    assert_eq!(group.visible_children().len(), 1, "toggle survives re-render");
}

#[test]
fn test_unknown_tag_leaves_siblings_intact() {
    let store = Store::new(json!({ "a": "1", "b": "2" }));
    let form = store.form(
        Schema::new()
            .field("a", FieldDefinition::new(FieldKind::String))
            .field("mystery", FieldDefinition::new(FieldKind::from_tag("hologram")))
            .field("b", FieldDefinition::new(FieldKind::String)),
        Flow::parse(["a", "mystery", "b"]),
    );

    let nodes = form.render(&store.value()).unwrap();

    assert_eq!(nodes.len(), 2);
    assert_eq!(text_field(&nodes, "a").value, "1");
    assert_eq!(text_field(&nodes, "b").value, "2");
}

#[test]
fn test_unknown_tag_resolves_with_registered_renderer() {
    let store = Store::new(json!({ "mystery": 7 }));
    let dispatcher = Dispatcher::builder()
        .renderer("hologram", Rc::new(|cx: &spark_forms::CustomContext| Node::element("holo", cx.value.to_string())))
        .build();
    let form = store
        .form(
            Schema::new().field("mystery", FieldDefinition::new(FieldKind::from_tag("hologram"))),
            Flow::parse(["mystery"]),
        )
        .with_dispatcher(dispatcher);

    let nodes = form.render(&store.value()).unwrap();
    let widget = &find_field(&nodes, "mystery").unwrap().widget;

    assert_eq!(widget.children(), &[Node::element("holo", "7")]);
}

fn array_schema() -> Schema {
    let record = SubForm::new(
        Schema::new()
            .field("x", FieldDefinition::new(FieldKind::Number))
            .field("y", FieldDefinition::new(FieldKind::Number)),
        Flow::parse(["x", "y"]),
    );
    Schema::new().field(
        "items",
        FieldDefinition::new(FieldKind::NestedArray { form: record, selector: "kind".into() }),
    )
}

fn array_widget(nodes: &[Node]) -> &spark_forms::ArrayForm {
    match find_field(nodes, "items").map(|f| &f.widget) {
        Some(Widget::ArrayForm(array)) => array,
        other => panic!("items should render as an array form, got {other:?}"),
    }
}

#[test]
fn test_array_selector() {
    let store = Store::new(json!({ "items": [{ "kind": "A", "x": 1 }, { "kind": "B", "y": 2 }] }));
    let form = store.form(array_schema(), Flow::parse(["items"]));
    let before = store.value();

    let nodes = form.render(&before).unwrap();
    let array = array_widget(&nodes);
    assert_eq!(array.active(), Some(&Value::from("A")));
    assert_eq!(array.choices(), &[Value::from("A"), Value::from("B")]);

    array.select("B");
    assert_eq!(store.changes.get(), 0, "selection is view state");

    let nodes = form.render(&store.value()).unwrap();
    let array = array_widget(&nodes);
    assert_eq!(array.active(), Some(&Value::from("B")));
    let Some(Widget::Number(y)) = find_field(array.record_nodes(), "y").map(|f| &f.widget) else {
        panic!("y should render as number");
    };
    assert_eq!(y.value, Value::from(2));
    assert!(y.input("5"));

    assert_eq!(store.json(), json!({ "items": [{ "kind": "A", "x": 1 }, { "kind": "B", "y": 5 }] }));
    let old = before.get_key("items").unwrap().get_index(0).unwrap();
    let new = store.value().get_key("items").unwrap().get_index(0).unwrap().clone();
    assert!(new.ptr_eq(old), "the untouched record keeps its reference");
}

#[test]
fn test_array_selection_without_match_shows_nothing() {
    let store = Store::new(json!({ "items": [{ "kind": "A", "x": 1 }] }));
    let form = store.form(array_schema(), Flow::parse(["items"]));

    let nodes = form.render(&store.value()).unwrap();
    array_widget(&nodes).select("Z");

    let nodes = form.render(&store.value()).unwrap();
    let array = array_widget(&nodes);
    assert!(!array.has_record());
    assert_eq!(array.active(), None, "the selection is empty");
    assert_eq!(array.requested(), Some(&Value::from("Z")));
    assert_eq!(store.changes.get(), 0, "the list is untouched");
}

/// Keeps tickets so the test decides when (and whether) they resolve.
#[derive(Default)]
struct SlowOptions {
    tickets: RefCell<Vec<Ticket<Vec<Value>>>>,
}

impl OptionSource for SlowOptions {
    fn fetch(&self, _source: &str, ticket: Ticket<Vec<Value>>) {
        self.tickets.borrow_mut().push(ticket);
    }
}

#[test]
fn test_stale_options_after_unmount_are_ignored() {
    let source = Rc::new(SlowOptions::default());
    let store = Store::new(json!({ "remote": true }));
    let schema = Schema::new().field(
        "plan",
        FieldDefinition::new(FieldKind::SingleSelect)
            .visible(spark_forms::Predicate::when(|v| v.get_key("remote") == Some(&Value::Bool(true))))
            .props(FieldProps { options_from: Some("/plans".into()), ..Default::default() }),
    );
    let form = store
        .form(schema, Flow::parse(["plan"]))
        .with_dispatcher(Dispatcher::builder().option_source(source.clone()).build());

    let nodes = form.render(&store.value()).unwrap();
    let Some(Widget::Select(select)) = find_field(&nodes, "plan").map(|f| &f.widget) else {
        panic!("plan should render as select");
    };
    assert_eq!(select.options, LoadState::Loading);

    // Hide the field: the next pass unmounts it.
    let hidden = Value::from(json!({ "remote": false }));
    assert!(form.render(&hidden).unwrap().is_empty());

    let ticket = source.tickets.borrow_mut().remove(0);
    assert!(!ticket.resolve(Ok(vec![Value::from("gold")])), "result for an unmounted field");

    // Showing it again starts a fresh request.
    form.render(&store.value()).unwrap();
    assert_eq!(source.tickets.borrow().len(), 1);
}

#[test]
fn test_document_form_renders() {
    let store = Store::new(json!({ "name": "ada" }));
    let sink = store.clone();
    let form = Form::from_json(
        r#"{
            "schema": {
                "name": { "type": "string" },
                "bio": { "type": "text", "props": { "rows": 5 } }
            },
            "flow": ["name", "<<<About", "bio"]
        }"#,
        move |next| *sink.value.borrow_mut() = next,
    )
    .unwrap();

    let nodes = form.render(&store.value()).unwrap();

    assert_eq!(text_field(&nodes, "name").value, "ada");
    let group = nodes[1].as_collapse().unwrap();
    assert_eq!(group.visible_children().len(), 1, "<<< opens expanded");
    let Widget::Textarea(bio) = &group.children[0].as_field().unwrap().widget else {
        panic!("bio should render as textarea");
    };
    assert_eq!(bio.rows, 5);
}
