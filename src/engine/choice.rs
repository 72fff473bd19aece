//! Choice - One value edited by one of several forms.
//!
//! A discriminator key in the value picks the variant; when it is absent the
//! default variant is used. Edits made through the variant's form are written
//! back with the discriminator set, so a value that started without one gains
//! it on the first edit.

use std::fmt;
use std::rc::Rc;

use tracing::warn;

use crate::primitives::{Node, OnChange};
use crate::types::{Flow, Schema, SubForm};
use crate::value::Value;

use super::dispatcher::Dispatcher;
use super::error::FormResult;
use super::interpreter::{interpret, RenderContext};
use super::view_state::ViewState;

/// A form switched by a discriminator key.
pub struct Choice {
    selector: String,
    default: String,
    variants: Vec<(String, SubForm)>,
    dispatcher: Rc<Dispatcher>,
    view: ViewState,
    on_change: OnChange,
}

impl Choice {
    pub fn new(
        selector: impl Into<String>,
        default: impl Into<String>,
        on_change: impl Fn(Value) + 'static,
    ) -> Self {
        Self {
            selector: selector.into(),
            default: default.into(),
            variants: Vec::new(),
            dispatcher: Rc::new(Dispatcher::default()),
            view: ViewState::new(),
            on_change: Rc::new(on_change),
        }
    }

    /// Add a variant.
    pub fn variant(mut self, key: impl Into<String>, schema: Schema, flow: Flow) -> Self {
        self.variants.push((key.into(), SubForm::new(schema, flow)));
        self
    }

    pub fn with_dispatcher(mut self, dispatcher: impl Into<Rc<Dispatcher>>) -> Self {
        self.dispatcher = dispatcher.into();
        self
    }

    /// Variant keys in declaration order.
    pub fn keys(&self) -> Vec<String> {
        self.variants.iter().map(|(key, _)| key.clone()).collect()
    }

    /// The variant `value` selects.
    pub fn active_key(&self, value: &Value) -> String {
        value
            .get_key(&self.selector)
            .and_then(Value::as_str)
            .filter(|key| !key.is_empty())
            .unwrap_or(self.default.as_str())
            .to_string()
    }

    pub fn render(&self, value: &Value) -> FormResult<ChoiceView> {
        let active = self.active_key(value);
        let switch = SwitchHandle {
            selector: self.selector.clone(),
            root: value.clone(),
            on_change: self.on_change.clone(),
        };

        self.view.begin_pass();
        let Some((_, form)) = self.variants.iter().find(|(key, _)| *key == active) else {
            warn!(selector = %self.selector, variant = %active, "no form for variant");
            self.view.end_pass();
            return Ok(ChoiceView { keys: self.keys(), active, nodes: Vec::new(), switch });
        };

        let on_change: OnChange = {
            let parent = self.on_change.clone();
            let selector = self.selector.clone();
            let active = active.clone();
            Rc::new(move |next: Value| parent(next.with_key(selector.clone(), Value::from(active.as_str()))))
        };
        let root = RenderContext::new(&self.dispatcher, &self.view, self.on_change.clone());
        let ctx = root.nested(&format!("variant:{active}"), on_change);
        let nodes = interpret(&form.flow, &form.schema, value, &ctx)?;
        self.view.end_pass();

        Ok(ChoiceView { keys: self.keys(), active, nodes, switch })
    }

    pub fn view_state(&self) -> &ViewState {
        &self.view
    }
}

#[derive(Clone)]
struct SwitchHandle {
    selector: String,
    root: Value,
    on_change: OnChange,
}

/// A rendered [`Choice`].
#[derive(Clone)]
pub struct ChoiceView {
    pub keys: Vec<String>,
    pub active: String,
    /// The active variant's form. Empty if the variant is unknown.
    pub nodes: Vec<Node>,
    switch: SwitchHandle,
}

impl ChoiceView {
    /// Switch variant by writing the discriminator.
    pub fn switch(&self, key: &str) {
        let SwitchHandle { selector, root, on_change } = &self.switch;
        on_change(root.with_key(selector.clone(), Value::from(key)));
    }
}

impl fmt::Debug for ChoiceView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChoiceView")
            .field("keys", &self.keys)
            .field("active", &self.active)
            .field("nodes", &self.nodes)
            .finish()
    }
}

impl PartialEq for ChoiceView {
    fn eq(&self, other: &Self) -> bool {
        self.keys == other.keys && self.active == other.active && self.nodes == other.nodes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    use serde_json::json;

    use crate::primitives::{find_field, Widget};
    use crate::types::{FieldDefinition, FieldKind};

    fn choice(store: Rc<RefCell<Vec<Value>>>) -> Choice {
        Choice::new("type", "basic", move |next| store.borrow_mut().push(next))
            .variant(
                "basic",
                Schema::new()
                    .field("user", FieldDefinition::new(FieldKind::String))
                    .field("password", FieldDefinition::new(FieldKind::String)),
                Flow::parse(["user", "password"]),
            )
            .variant(
                "token",
                Schema::new().field("token", FieldDefinition::new(FieldKind::String)),
                Flow::parse(["token"]),
            )
    }

    #[test]
    fn test_default_variant_and_edit_sets_selector() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let choice = choice(seen.clone());

        let view = choice.render(&Value::object()).unwrap();
        assert_eq!(view.active, "basic");
        assert_eq!(view.keys, vec!["basic", "token"]);

        let Some(Widget::Text(user)) = find_field(&view.nodes, "user").map(|f| &f.widget) else {
            panic!("user should render as text");
        };
        user.input("ada");

        assert_eq!(serde_json::Value::from(&seen.borrow()[0]), json!({ "type": "basic", "user": "ada" }));
    }

    #[test]
    fn test_switch_writes_selector() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let choice = choice(seen.clone());
        let value = Value::from(json!({ "type": "basic", "user": "ada" }));

        choice.render(&value).unwrap().switch("token");
        let switched = seen.borrow()[0].clone();
        assert_eq!(choice.active_key(&switched), "token");

        let view = choice.render(&switched).unwrap();
        assert!(find_field(&view.nodes, "token").is_some());
        assert!(find_field(&view.nodes, "user").is_none());
    }

    #[test]
    fn test_unknown_variant_renders_nothing() {
        let choice = choice(Rc::new(RefCell::new(Vec::new())));
        let view = choice.render(&Value::from(json!({ "type": "oauth" }))).unwrap();

        assert_eq!(view.active, "oauth");
        assert!(view.nodes.is_empty());
    }
}
