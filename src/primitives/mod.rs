//! Form Primitives - The building blocks a rendered form is made of.
//!
//! This module provides the output side of the engine:
//! - [`types`] - [`Node`], [`Binding`] and the [`Widget`] enum
//! - [`inputs`] - One widget per built-in field kind, with its edit operations
//! - [`collapse`] - Disclosure state for grouped regions
//! - [`array_form`] - Discriminator-switched editing of record lists
//!
//! # Architecture
//!
//! Rendering produces plain data. Every interactive node holds a [`Binding`]
//! to the value it was rendered from, so an edit computes the next root value
//! and hands it to the caller's `on_change`. The caller stores it and renders
//! again:
//!
//! ```ignore
//! let nodes = form.render(&value)?;
//! if let Some(Widget::Text(input)) = find_field(&nodes, "name").map(|f| &f.widget) {
//!     input.input("Ada");          // on_change receives { name: "Ada", .. }
//! }
//! ```
//!
//! View state (collapse open/closed, the active array record, loading
//! options) is the only thing that persists between renders, and it never
//! goes through `on_change`.

pub mod array_form;
pub mod collapse;
pub mod inputs;
mod types;

pub use array_form::ArrayForm;
pub use collapse::{Collapse, Disclosure};
pub use inputs::{
    EditorInput, KeyValueInput, LabelView, MultiSelectInput, NumberInput, SelectInput,
    TextInput, TextareaInput, ToggleInput,
};
pub use types::*;
