//! Form - A schema, a flow and the state that lives between renders.
//!
//! [`Form`] is the entry point most callers want. It owns the view state and
//! brackets each render in a sweep pass, so fields that stop rendering
//! release their state (and outstanding option fetches go stale).
//!
//! # Example
//!
//! ```ignore
//! let store = Rc::new(RefCell::new(Value::object()));
//! let sink = store.clone();
//! let form = Form::new(schema, flow, move |next| *sink.borrow_mut() = next);
//!
//! let nodes = form.render(&store.borrow())?;
//! ```

use std::rc::Rc;

use crate::primitives::{Node, OnChange};
use crate::types::{Flow, Schema};
use crate::value::Value;

use super::dispatcher::Dispatcher;
use super::error::FormResult;
use super::interpreter::{interpret, RenderContext};
use super::view_state::ViewState;

/// A renderable form.
pub struct Form {
    schema: Rc<Schema>,
    flow: Rc<Flow>,
    dispatcher: Rc<Dispatcher>,
    view: ViewState,
    on_change: OnChange,
}

impl Form {
    pub fn new(schema: Schema, flow: Flow, on_change: impl Fn(Value) + 'static) -> Self {
        Self {
            schema: Rc::new(schema),
            flow: Rc::new(flow),
            dispatcher: Rc::new(Dispatcher::default()),
            view: ViewState::new(),
            on_change: Rc::new(on_change),
        }
    }

    /// Build a form from a JSON document (see [`crate::schema`]).
    pub fn from_json(document: &str, on_change: impl Fn(Value) + 'static) -> FormResult<Self> {
        let (schema, flow) = crate::schema::SchemaDocument::from_json(document)?.into_parts()?;
        Ok(Self::new(schema, flow, on_change))
    }

    pub fn with_dispatcher(mut self, dispatcher: impl Into<Rc<Dispatcher>>) -> Self {
        self.dispatcher = dispatcher.into();
        self
    }

    /// Render against `value`.
    ///
    /// On error nothing is swept: the view state stays as the last good pass
    /// left it.
    pub fn render(&self, value: &Value) -> FormResult<Vec<Node>> {
        self.view.begin_pass();
        let ctx = RenderContext::new(&self.dispatcher, &self.view, self.on_change.clone());
        let nodes = interpret(&self.flow, &self.schema, value, &ctx)?;
        self.view.end_pass();
        Ok(nodes)
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn flow(&self) -> &Flow {
        &self.flow
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    pub fn view_state(&self) -> &ViewState {
        &self.view
    }
}
