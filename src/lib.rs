//! # spark-forms
//!
//! Schema-driven form composition.
//!
//! Built on [spark-signals](https://github.com/RLabs-Inc/spark-signals) for the
//! small amount of state that lives between renders.
//!
//! ## Architecture
//!
//! A form is described by a [`Schema`] (what each field is) and a [`Flow`]
//! (which fields appear, in what order, and how they are grouped). Rendering
//! interprets the flow against a caller-owned [`Value`] and produces a plain
//! tree of [`Node`]s:
//!
//! ```text
//! (Schema, Flow, Value) → interpret → Vec<Node> → edit → on_change(Value')
//! ```
//!
//! The value is immutable and reference-counted. An edit builds the next
//! value with structural sharing and hands it to the caller, who re-renders.
//! Ephemeral UI state (collapse disclosure, the active record of an array
//! form, option loaders) lives in the form's [`ViewState`], never in the
//! value.
//!
//! ## Modules
//!
//! - [`value`] - The value tree and path addressing
//! - [`types`] - Schema, flow and field definitions
//! - [`primitives`] - Nodes, bindings, widgets, collapse and array forms
//! - [`engine`] - Interpreter, dispatcher, view state, forms
//! - [`state`] - Explicit loading states for outside work
//! - [`schema`] - Loading schemas and flows from JSON

pub mod engine;
pub mod primitives;
pub mod schema;
pub mod state;
pub mod types;
pub mod value;

// Re-export commonly used items
pub use types::*;

pub use value::{get, get_in, set, set_in, Map, Path, PathError, Segment, Value, MAX_INDEX};

pub use engine::{
    interpret, Choice, ChoiceView, Dispatcher, DispatcherBuilder, EditorKind, EditorLoader,
    Form, FormError, FormResult, OptionSource, RenderContext, ViewState,
};

pub use primitives::{
    find_field, ArrayForm, Binding, Collapse, CollapseNode, CustomContext, CustomRenderer,
    Disclosure, Element, FieldNode, Node, OnChange, Widget,
};

pub use state::{LoadState, Loader, Ticket};

pub use schema::SchemaDocument;
