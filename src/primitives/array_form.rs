//! Array Form - A list of records edited one at a time.
//!
//! Each record carries a discriminator under the selector key. The widget
//! offers the distinct discriminator values as choices, shows the first
//! record matching the active choice with the nested form, and writes edits
//! back in place: the edited record replaces the first match, every other
//! entry is carried over untouched (same `Rc`, same position).
//!
//! The requested choice is view state. It lives in a signal owned by the
//! form's view state and defaults to the first record's discriminator. When
//! no record matches it, nothing is active and no record is shown.

use std::fmt;
use std::rc::Rc;

use spark_signals::Signal;

use crate::value::Value;

use super::types::Node;

/// Distinct selector values, in order of first appearance.
pub fn distinct_choices(records: &[Value], selector: &str) -> Vec<Value> {
    let mut choices: Vec<Value> = Vec::new();
    for key in records.iter().filter_map(|record| record.get_key(selector)) {
        if !choices.contains(key) {
            choices.push(key.clone());
        }
    }
    choices
}

/// Index of the first record whose selector equals `active`.
pub fn position(records: &[Value], selector: &str, active: &Value) -> Option<usize> {
    records.iter().position(|record| record.get_key(selector) == Some(active))
}

/// Replace the first record matching `active` with `updated`.
///
/// Other entries are shared with `records`. Without a match the list is
/// returned unchanged.
pub fn replace_first(records: &[Value], selector: &str, active: &Value, updated: Value) -> Value {
    let mut next = records.to_vec();
    if let Some(index) = position(records, selector, active) {
        next[index] = updated;
    }
    Value::Array(Rc::new(next))
}

/// Rendered array form.
#[derive(Clone)]
pub struct ArrayForm {
    pub selector: String,
    pub choices: Vec<Value>,
    /// The choice last selected (or the default), matched or not.
    pub requested: Option<Value>,
    /// The choice being shown. `None` when no record matches `requested`.
    pub active: Option<Value>,
    /// Nested form for the active record. Empty when nothing matches.
    pub record: Vec<Node>,
    selection: Signal<Option<Value>>,
}

impl ArrayForm {
    pub(crate) fn new(
        selector: String,
        choices: Vec<Value>,
        requested: Option<Value>,
        active: Option<Value>,
        record: Vec<Node>,
        selection: Signal<Option<Value>>,
    ) -> Self {
        Self { selector, choices, requested, active, record, selection }
    }

    /// Switch the shown record. Takes effect on the next render.
    pub fn select(&self, choice: impl Into<Value>) {
        self.selection.set(Some(choice.into()));
    }

    pub fn choices(&self) -> &[Value] {
        &self.choices
    }

    pub fn active(&self) -> Option<&Value> {
        self.active.as_ref()
    }

    pub fn requested(&self) -> Option<&Value> {
        self.requested.as_ref()
    }

    pub fn record_nodes(&self) -> &[Node] {
        &self.record
    }

    /// True if a record matches the requested choice.
    pub fn has_record(&self) -> bool {
        self.active.is_some()
    }
}

impl fmt::Debug for ArrayForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArrayForm")
            .field("selector", &self.selector)
            .field("choices", &self.choices)
            .field("requested", &self.requested)
            .field("active", &self.active)
            .field("record", &self.record)
            .finish()
    }
}

impl PartialEq for ArrayForm {
    fn eq(&self, other: &Self) -> bool {
        self.selector == other.selector
            && self.choices == other.choices
            && self.requested == other.requested
            && self.active == other.active
            && self.record == other.record
    }
}
