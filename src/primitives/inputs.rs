//! Input widgets - Data and edit operations for each built-in kind.
//!
//! Every widget is a snapshot of what to draw plus a [`Binding`] to write
//! through. Edit operations compute the field's next value and hand it to the
//! binding; the widget itself never changes. The caller re-renders with the
//! new value and gets fresh widgets.

use std::rc::Rc;

use tracing::debug;

use crate::state::LoadState;
use crate::types::{FieldProps, SelectOption};
use crate::value::{Map, Value};

use super::types::Binding;

/// JavaScript-style truthiness, used by toggles.
fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

// =============================================================================
// Text
// =============================================================================

/// Single-line text input.
#[derive(Clone, Debug, PartialEq)]
pub struct TextInput {
    pub value: String,
    pub placeholder: Option<String>,
    pub prefix: Option<String>,
    pub suffix: Option<String>,
    binding: Binding,
}

impl TextInput {
    pub(crate) fn new(current: &Value, props: &FieldProps, binding: Binding) -> Self {
        Self {
            value: current.to_display_string(),
            placeholder: props.placeholder.clone(),
            prefix: props.prefix.clone(),
            suffix: props.suffix.clone(),
            binding,
        }
    }

    pub fn input(&self, text: &str) {
        self.binding.set(text);
    }
}

/// Multiline text input.
#[derive(Clone, Debug, PartialEq)]
pub struct TextareaInput {
    pub value: String,
    pub placeholder: Option<String>,
    pub rows: u16,
    binding: Binding,
}

impl TextareaInput {
    pub(crate) fn new(current: &Value, props: &FieldProps, binding: Binding) -> Self {
        Self {
            value: current.to_display_string(),
            placeholder: props.placeholder.clone(),
            rows: props.rows.unwrap_or(3),
            binding,
        }
    }

    pub fn input(&self, text: &str) {
        self.binding.set(text);
    }
}

/// Read-only text.
#[derive(Clone, Debug, PartialEq)]
pub struct LabelView {
    pub value: String,
}

impl LabelView {
    pub(crate) fn new(current: &Value) -> Self {
        Self { value: current.to_display_string() }
    }
}

// =============================================================================
// Number
// =============================================================================

/// Numeric input.
#[derive(Clone, Debug, PartialEq)]
pub struct NumberInput {
    pub value: Value,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub step: Option<f64>,
    pub placeholder: Option<String>,
    pub prefix: Option<String>,
    pub suffix: Option<String>,
    binding: Binding,
}

impl NumberInput {
    pub(crate) fn new(current: &Value, props: &FieldProps, binding: Binding) -> Self {
        Self {
            value: current.clone(),
            min: props.min,
            max: props.max,
            step: props.step,
            placeholder: props.placeholder.clone(),
            prefix: props.prefix.clone(),
            suffix: props.suffix.clone(),
            binding,
        }
    }

    /// Parse raw text: a `.` makes it a float, otherwise an integer.
    pub fn parse(raw: &str) -> Option<Value> {
        let raw = raw.trim();
        if raw.contains('.') {
            raw.parse::<f64>().ok().filter(|f| f.is_finite()).map(Value::from)
        } else {
            raw.parse::<i64>().ok().map(Value::from)
        }
    }

    /// Apply raw text typed by the user. Unparsable input is ignored.
    pub fn input(&self, raw: &str) -> bool {
        match Self::parse(raw) {
            Some(number) => {
                self.binding.set(number);
                true
            }
            None => {
                debug!(path = %self.binding.path(), raw, "ignoring unparsable number input");
                false
            }
        }
    }

    pub fn set(&self, number: impl Into<Value>) {
        self.binding.set(number);
    }
}

// =============================================================================
// Toggle
// =============================================================================

/// Boolean switch.
#[derive(Clone, Debug, PartialEq)]
pub struct ToggleInput {
    pub value: bool,
    binding: Binding,
}

impl ToggleInput {
    pub(crate) fn new(current: &Value, binding: Binding) -> Self {
        Self { value: truthy(current), binding }
    }

    pub fn toggle(&self) {
        self.binding.set(!self.value);
    }

    pub fn set(&self, on: bool) {
        self.binding.set(on);
    }
}

// =============================================================================
// Select
// =============================================================================

/// Single choice among options.
#[derive(Clone, Debug, PartialEq)]
pub struct SelectInput {
    pub value: Value,
    /// Static options are always `Ready`; remote ones follow their loader.
    pub options: LoadState<Vec<SelectOption>>,
    pub placeholder: Option<String>,
    binding: Binding,
}

impl SelectInput {
    pub(crate) fn new(
        current: &Value,
        options: LoadState<Vec<SelectOption>>,
        props: &FieldProps,
        binding: Binding,
    ) -> Self {
        Self {
            value: current.clone(),
            options,
            placeholder: props.placeholder.clone(),
            binding,
        }
    }

    /// Options available right now.
    pub fn available(&self) -> &[SelectOption] {
        self.options.ready().map(Vec::as_slice).unwrap_or(&[])
    }

    /// The option matching the current value.
    ///
    /// A value with no matching option still shows as itself, unless the
    /// options are still loading or failed.
    pub fn selected(&self) -> Option<SelectOption> {
        if self.value.is_null() || self.value.as_str() == Some("") {
            return None;
        }
        if let Some(found) = self.available().iter().find(|o| o.value == self.value) {
            return Some(found.clone());
        }
        match self.options {
            LoadState::Loading | LoadState::Failed(_) => None,
            _ => Some(SelectOption::from_value(&self.value)),
        }
    }

    /// Pick an option, or clear with `None`.
    pub fn choose(&self, option: Option<&SelectOption>) {
        self.binding.set(option.map_or(Value::Null, |o| o.value.clone()));
    }
}

/// Several values, optionally free-typed.
#[derive(Clone, Debug, PartialEq)]
pub struct MultiSelectInput {
    pub values: Vec<Value>,
    pub options: LoadState<Vec<SelectOption>>,
    pub creatable: bool,
    binding: Binding,
}

impl MultiSelectInput {
    pub(crate) fn new(
        current: &Value,
        options: LoadState<Vec<SelectOption>>,
        props: &FieldProps,
        binding: Binding,
    ) -> Self {
        Self {
            values: current.as_array().map(<[Value]>::to_vec).unwrap_or_default(),
            options,
            creatable: props.creatable,
            binding,
        }
    }

    /// Selected entries as options.
    ///
    /// With loaded options and no free typing, only values that exist among
    /// the options are shown.
    pub fn selected(&self) -> Vec<SelectOption> {
        match self.options.ready() {
            Some(options) if !self.creatable && !options.is_empty() => options
                .iter()
                .filter(|o| self.values.contains(&o.value))
                .cloned()
                .collect(),
            _ => self.values.iter().map(SelectOption::from_value).collect(),
        }
    }

    pub fn set_values(&self, values: Vec<Value>) {
        self.binding.set(Value::from(values));
    }

    /// Append a typed entry. Empty text is ignored.
    pub fn push_created(&self, text: &str) -> bool {
        if text.is_empty() {
            return false;
        }
        let mut values = self.values.clone();
        values.push(Value::from(text));
        self.set_values(values);
        true
    }

    pub fn remove(&self, index: usize) {
        if index < self.values.len() {
            let mut values = self.values.clone();
            values.remove(index);
            self.set_values(values);
        }
    }

    /// Clearing writes null, not an empty list.
    pub fn clear(&self) {
        self.binding.set(Value::Null);
    }
}

// =============================================================================
// Key/value map
// =============================================================================

/// Free-form string keys mapped to values.
#[derive(Clone, Debug, PartialEq)]
pub struct KeyValueInput {
    pub value: Value,
    pub placeholder_key: Option<String>,
    pub placeholder_value: Option<String>,
    default_entry: Value,
    binding: Binding,
}

impl KeyValueInput {
    pub(crate) fn new(current: &Value, props: &FieldProps, binding: Binding) -> Self {
        Self {
            value: current.clone(),
            placeholder_key: props.placeholder_key.clone(),
            placeholder_value: props.placeholder_value.clone(),
            default_entry: props
                .default_entry
                .clone()
                .unwrap_or_else(|| Value::from_entries([("", "")])),
            binding,
        }
    }

    pub fn entries(&self) -> Vec<(&str, &Value)> {
        self.value
            .as_object()
            .map(|map| map.iter().map(|(k, v)| (k.as_str(), v)).collect())
            .unwrap_or_default()
    }

    fn map(&self) -> Map {
        self.value.as_object().cloned().unwrap_or_default()
    }

    fn commit(&self, map: Map) {
        self.binding.set(Value::Object(Rc::new(map)));
    }

    /// Insert the default entry, only when the map is empty.
    pub fn add_first(&self) -> bool {
        if !self.map().is_empty() {
            return false;
        }
        self.binding.set(self.default_entry.clone());
        true
    }

    /// Merge the default entry into the map.
    pub fn add_next(&self) {
        let mut map = self.map();
        if let Some(entry) = self.default_entry.as_object() {
            map.extend(entry.iter().map(|(k, v)| (k.clone(), v.clone())));
        }
        self.commit(map);
    }

    /// Move the value under `old` to `new`.
    pub fn rename(&self, old: &str, new: &str) {
        let mut map = self.map();
        let moved = map.remove(old).unwrap_or_default();
        map.insert(new.to_string(), moved);
        self.commit(map);
    }

    pub fn set_entry(&self, key: &str, value: impl Into<Value>) {
        let mut map = self.map();
        map.insert(key.to_string(), value.into());
        self.commit(map);
    }

    pub fn remove(&self, key: &str) {
        let mut map = self.map();
        map.remove(key);
        self.commit(map);
    }
}

// =============================================================================
// Editors
// =============================================================================

/// Markdown or code editor. The editor widget itself is external; this node
/// exposes its loading state and the text to edit.
#[derive(Clone, Debug, PartialEq)]
pub struct EditorInput {
    pub value: String,
    pub language: Option<String>,
    pub editor: LoadState<()>,
    binding: Binding,
}

impl EditorInput {
    pub(crate) fn new(
        current: &Value,
        props: &FieldProps,
        editor: LoadState<()>,
        binding: Binding,
    ) -> Self {
        Self {
            value: current.to_display_string(),
            language: props.language.clone(),
            editor,
            binding,
        }
    }

    pub fn is_ready(&self) -> bool {
        self.editor.is_ready()
    }

    pub fn input(&self, text: &str) {
        self.binding.set(text);
    }
}
