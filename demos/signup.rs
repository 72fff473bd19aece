//! Signup Example - A form loaded from JSON, edited through its nodes
//!
//! This example demonstrates:
//! - Loading a schema and flow from a document
//! - The caller-owned store loop (render, edit, store, render)
//! - Collapse groups keeping their state across renders
//!
//! Run with: RUST_LOG=spark_forms=debug cargo run --example signup

use std::cell::RefCell;
use std::rc::Rc;

use spark_forms::{Form, Node, Value, Widget};
use tracing_subscriber::EnvFilter;

const SIGNUP: &str = r#"{
    "schema": {
        "name": { "type": "string", "label": "Name", "props": { "placeholder": "Ada Lovelace" } },
        "age": { "type": "number", "label": "Age", "props": { "min": 0 } },
        "newsletter": { "type": "bool", "label": "Newsletter" },
        "plan": {
            "type": "select",
            "label": "Plan",
            "props": { "options": ["free", { "label": "Gold", "value": "gold" }] }
        },
        "headers": { "type": "object", "label": "Extra headers" },
        "notes": { "type": "markdown", "label": "Notes" },
        "theme": { "type": "sparkles" }
    },
    "flow": ["name", "age", ">>>Preferences", "newsletter", "plan", "---", "<<<Advanced", "headers", "notes", "theme"]
}"#;

fn print_nodes(nodes: &[Node], depth: usize) {
    let pad = "  ".repeat(depth);
    for node in nodes {
        match node {
            Node::Field(field) => {
                let shown = match &field.widget {
                    Widget::Text(input) => format!("text {:?}", input.value),
                    Widget::Number(input) => format!("number {}", input.value),
                    Widget::Toggle(input) => format!("toggle {}", input.value),
                    Widget::Select(input) => format!(
                        "select {:?}",
                        input.selected().map(|o| o.label).unwrap_or_default()
                    ),
                    Widget::KeyValue(input) => format!("map {:?}", input.entries()),
                    Widget::RichText(input) => format!("markdown ({} chars)", input.value.len()),
                    other => format!("{other:?}"),
                };
                println!("{pad}{}: {shown}", field.label.as_deref().unwrap_or(&field.name));
            }
            Node::Collapse(group) => {
                let marker = if group.state.is_collapsed() { "▸" } else { "▾" };
                println!("{pad}{marker} {}", group.label);
                print_nodes(group.visible_children(), depth + 1);
                if group.line_end {
                    println!("{pad}────");
                }
            }
            Node::Divider => println!("{pad}────"),
            Node::Element(element) => println!("{pad}<{}> {}", element.tag, element.text.as_deref().unwrap_or("")),
        }
    }
}

fn field<'a>(nodes: &'a [Node], name: &str) -> Option<&'a Widget> {
    spark_forms::find_field(nodes, name).map(|f| &f.widget)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    println!("=== spark-forms Signup Example ===\n");

    let store = Rc::new(RefCell::new(Value::object()));
    let sink = store.clone();
    let form = Form::from_json(SIGNUP, move |next| {
        println!("  on_change → {next}");
        *sink.borrow_mut() = next;
    })?;

    let nodes = form.render(&store.borrow())?;
    print_nodes(&nodes, 0);

    println!("\n--- typing a name and an age ---");
    if let Some(Widget::Text(name)) = field(&nodes, "name") {
        name.input("Ada");
    }
    let nodes = form.render(&store.borrow())?;
    if let Some(Widget::Number(age)) = field(&nodes, "age") {
        age.input("36");
    }

    println!("\n--- opening Preferences, choosing a plan ---");
    let nodes = form.render(&store.borrow())?;
    if let Some(group) = nodes.iter().find_map(Node::as_collapse) {
        group.state.toggle();
    }
    let nodes = form.render(&store.borrow())?;
    if let Some(Widget::Select(plan)) = field(&nodes, "plan") {
        let gold = plan.available().iter().find(|o| o.label == "Gold").cloned();
        plan.choose(gold.as_ref());
    }

    println!("\n--- adding a header ---");
    let nodes = form.render(&store.borrow())?;
    if let Some(Widget::KeyValue(headers)) = field(&nodes, "headers") {
        headers.add_first();
    }
    let nodes = form.render(&store.borrow())?;
    if let Some(Widget::KeyValue(headers)) = field(&nodes, "headers") {
        headers.rename("", "X-Team");
    }

    println!("\n=== Final form ===\n");
    let nodes = form.render(&store.borrow())?;
    print_nodes(&nodes, 0);

    println!("\nValue: {}", store.borrow());
    Ok(())
}
