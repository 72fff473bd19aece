//! Form Engine - From schema, flow and value to nodes.
//!
//! The engine is split by responsibility:
//! - Interpreter: walks a flow, folds group markers into collapse nodes
//! - Dispatcher: renders one field by kind, hosts the outside-work seams
//! - ViewState: ephemeral UI state, swept after every pass
//! - Form / Choice: the entry points that own a view state
//!
//! # Architecture
//!
//! Rendering is a pure function of `(schema, flow, value)`. The value is
//! owned by the caller and only ever replaced:
//!
//! ```text
//! input event → widget op → Binding::set → value::set → on_change(next)
//!     ↑                                                        │
//!     └──────────── caller stores next, calls render ◀─────────┘
//! ```

mod choice;
mod dispatcher;
mod error;
mod form;
mod interpreter;
mod view_state;

pub use choice::{Choice, ChoiceView};
pub use dispatcher::{Dispatcher, DispatcherBuilder, EditorKind, EditorLoader, OptionSource};
pub use error::{FormError, FormResult};
pub use form::Form;
pub use interpreter::{interpret, RenderContext};
pub use view_state::ViewState;
