//! Endpoints Example - Array forms, remote options and variant choice
//!
//! This example demonstrates:
//! - Editing a list of records one at a time, switched by a discriminator
//! - A select whose options come from an `OptionSource`
//! - A `Choice` between two authentication forms
//!
//! Run with: RUST_LOG=spark_forms=trace cargo run --example endpoints

use std::cell::RefCell;
use std::rc::Rc;

use serde_json::json;
use spark_forms::{
    find_field, Choice, Dispatcher, FieldDefinition, FieldKind, FieldProps, Flow, Form,
    OptionSource, Schema, SubForm, Ticket, Value, Widget,
};
use tracing_subscriber::EnvFilter;

/// Answers every request immediately from a fixed table.
struct Catalog;

impl OptionSource for Catalog {
    fn fetch(&self, source: &str, ticket: Ticket<Vec<Value>>) {
        let result = match source {
            "/backends" => Ok(vec![Value::from("eu-west"), Value::from("us-east")]),
            other => Err(format!("unknown source {other}")),
        };
        ticket.resolve(result);
    }
}

fn endpoint_form() -> SubForm {
    SubForm::new(
        Schema::new()
            .field("path", FieldDefinition::new(FieldKind::String).label("Path"))
            .field(
                "backend",
                FieldDefinition::new(FieldKind::SingleSelect)
                    .label("Backend")
                    .props(FieldProps { options_from: Some("/backends".into()), ..Default::default() }),
            )
            .field("timeout", FieldDefinition::new(FieldKind::Number).label("Timeout (ms)")),
        Flow::parse(["path", "backend", ">>>Tuning", "timeout"]),
    )
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    println!("=== spark-forms Endpoints Example ===\n");

    let store = Rc::new(RefCell::new(Value::from(json!({
        "endpoints": [
            { "method": "GET", "path": "/users", "timeout": 500 },
            { "method": "POST", "path": "/users" }
        ]
    }))));

    let sink = store.clone();
    let form = Form::new(
        Schema::new().field(
            "endpoints",
            FieldDefinition::new(FieldKind::NestedArray { form: endpoint_form(), selector: "method".into() }),
        ),
        Flow::parse(["endpoints"]),
        move |next| *sink.borrow_mut() = next,
    )
    .with_dispatcher(Dispatcher::builder().option_source(Rc::new(Catalog)).build());

    let nodes = form.render(&store.borrow())?;
    if let Some(Widget::ArrayForm(array)) = find_field(&nodes, "endpoints").map(|f| &f.widget) {
        println!("methods: {:?}, showing {:?}", array.choices(), array.active());
        array.select("POST");
    }

    let nodes = form.render(&store.borrow())?;
    if let Some(Widget::ArrayForm(array)) = find_field(&nodes, "endpoints").map(|f| &f.widget) {
        if let Some(Widget::Select(backend)) = find_field(array.record_nodes(), "backend").map(|f| &f.widget) {
            println!("backends: {:?}", backend.available());
            backend.choose(backend.available().last());
        }
    }
    println!("endpoints: {}\n", store.borrow());

    let auth_store = Rc::new(RefCell::new(Value::object()));
    let auth_sink = auth_store.clone();
    let auth = Choice::new("type", "basic", move |next| *auth_sink.borrow_mut() = next)
        .variant(
            "basic",
            Schema::new()
                .field("user", FieldDefinition::new(FieldKind::String))
                .field("password", FieldDefinition::new(FieldKind::String)),
            Flow::parse(["user", "password"]),
        )
        .variant(
            "token",
            Schema::new().field("token", FieldDefinition::new(FieldKind::MultilineText)),
            Flow::parse(["token"]),
        );

    let view = auth.render(&auth_store.borrow())?;
    println!("auth variants {:?}, active {}", view.keys, view.active);
    view.switch("token");

    let view = auth.render(&auth_store.borrow())?;
    if let Some(Widget::Textarea(token)) = find_field(&view.nodes, "token").map(|f| &f.widget) {
        token.input("s3cr3t");
    }
    println!("auth: {}", auth_store.borrow());
    Ok(())
}
