//! Primitive types - Nodes, bindings and callbacks.
//!
//! The engine's output is a plain tree of [`Node`]s. Interactive nodes carry
//! a [`Binding`]: the field's path, the root value the node was rendered
//! from, and the caller's change callback. Editing goes through the binding,
//! which builds the next root with [`crate::value::set`] and hands it to the
//! caller. Nothing is ever written in place.
//!
//! Node equality compares structure and data. Closures and ephemeral view
//! state are not part of it, so two renders of the same input compare equal.

use std::fmt;
use std::rc::Rc;

use crate::types::{FieldFlags, FieldProps};
use crate::value::{self, Path, Value};

use super::array_form::ArrayForm;
use super::collapse::Collapse;
use super::inputs::{
    EditorInput, KeyValueInput, LabelView, MultiSelectInput, NumberInput, SelectInput,
    TextInput, TextareaInput, ToggleInput,
};

// =============================================================================
// Callbacks
// =============================================================================

/// Receives the next whole value.
pub type OnChange = Rc<dyn Fn(Value)>;

/// Renders a custom field.
pub type CustomRenderer = Rc<dyn Fn(&CustomContext) -> Node>;

// =============================================================================
// Binding
// =============================================================================

/// Connects a node to its location in the caller's value.
#[derive(Clone)]
pub struct Binding {
    path: Path,
    root: Value,
    on_change: OnChange,
}

impl Binding {
    pub fn new(path: Path, root: Value, on_change: OnChange) -> Self {
        Self { path, root, on_change }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The whole value this node was rendered from.
    pub fn root(&self) -> &Value {
        &self.root
    }

    /// The value at this binding's path (null if absent).
    pub fn current(&self) -> Value {
        value::get(&self.root, &self.path, Value::Null)
    }

    /// Store `leaf` at the path and hand the new root to the caller.
    pub fn set(&self, leaf: impl Into<Value>) {
        let next = value::set(&self.root, &self.path, leaf.into());
        (self.on_change)(next);
    }

    /// Replace the whole value, bypassing the path.
    pub fn set_root(&self, root: Value) {
        (self.on_change)(root);
    }

    /// A change callback scoped to this path, for nested forms.
    pub fn scoped(&self) -> OnChange {
        let binding = self.clone();
        Rc::new(move |leaf| binding.set(leaf))
    }
}

/// Bindings are identified by their path.
impl PartialEq for Binding {
    fn eq(&self, other: &Self) -> bool {
        self.path == other.path
    }
}

impl fmt::Debug for Binding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Binding({})", self.path)
    }
}

// =============================================================================
// Node
// =============================================================================

/// One rendered item of a form.
#[derive(Clone, Debug, PartialEq)]
pub enum Node {
    /// An input bound to a field.
    Field(FieldNode),
    /// A group of nodes under a toggleable label.
    Collapse(CollapseNode),
    /// Horizontal rule.
    Divider,
    /// Caller-provided content.
    Element(Element),
}

impl Node {
    /// Convenience for caller content.
    pub fn element(tag: impl Into<String>, text: impl Into<String>) -> Node {
        Node::Element(Element {
            tag: tag.into(),
            text: Some(text.into()),
            children: Vec::new(),
        })
    }

    pub fn as_field(&self) -> Option<&FieldNode> {
        match self {
            Node::Field(field) => Some(field),
            _ => None,
        }
    }

    pub fn as_collapse(&self) -> Option<&CollapseNode> {
        match self {
            Node::Collapse(group) => Some(group),
            _ => None,
        }
    }

    /// Depth-first search for a field node by name.
    pub fn find_field(&self, name: &str) -> Option<&FieldNode> {
        match self {
            Node::Field(field) if field.name == name => Some(field),
            Node::Field(field) => field.widget.children().iter().find_map(|n| n.find_field(name)),
            Node::Collapse(group) => group.children.iter().find_map(|n| n.find_field(name)),
            Node::Element(element) => element.children.iter().find_map(|n| n.find_field(name)),
            Node::Divider => None,
        }
    }
}

/// Search a rendered sequence for a field node by name.
pub fn find_field<'a>(nodes: &'a [Node], name: &str) -> Option<&'a FieldNode> {
    nodes.iter().find_map(|node| node.find_field(name))
}

/// Opaque caller content: a tag, optional text and children.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Element {
    pub tag: String,
    pub text: Option<String>,
    pub children: Vec<Node>,
}

/// A rendered field.
#[derive(Clone, Debug, PartialEq)]
pub struct FieldNode {
    pub name: String,
    pub label: Option<String>,
    pub help: Option<String>,
    pub flags: FieldFlags,
    pub widget: Widget,
    pub binding: Binding,
}

impl FieldNode {
    pub fn is_disabled(&self) -> bool {
        self.flags.contains(FieldFlags::DISABLED)
    }
}

/// A rendered group.
#[derive(Clone, Debug)]
pub struct CollapseNode {
    pub label: String,
    /// The flag the group was declared with.
    pub collapsed_seed: bool,
    /// Closed by a separator: draw a divider after the group.
    pub line_end: bool,
    pub children: Vec<Node>,
    /// Ephemeral disclosure state, shared across renders.
    pub state: Collapse,
}

impl CollapseNode {
    /// Children to draw right now: none while collapsed.
    pub fn visible_children(&self) -> &[Node] {
        if self.state.is_collapsed() { &[] } else { &self.children }
    }
}

impl PartialEq for CollapseNode {
    fn eq(&self, other: &Self) -> bool {
        self.label == other.label
            && self.collapsed_seed == other.collapsed_seed
            && self.line_end == other.line_end
            && self.children == other.children
    }
}

// =============================================================================
// Widgets
// =============================================================================

/// The concrete input a field renders as.
#[derive(Clone, Debug, PartialEq)]
pub enum Widget {
    Text(TextInput),
    Textarea(TextareaInput),
    Number(NumberInput),
    Toggle(ToggleInput),
    Select(SelectInput),
    MultiSelect(MultiSelectInput),
    KeyValue(KeyValueInput),
    /// A nested object rendered with its own flow.
    Object(Vec<Node>),
    ArrayForm(ArrayForm),
    RichText(EditorInput),
    Code(EditorInput),
    Label(LabelView),
    /// Output of a custom renderer, or a prebuilt node.
    Custom(Box<Node>),
}

impl Widget {
    /// Nested nodes, for widgets that contain a sub-form.
    pub fn children(&self) -> &[Node] {
        match self {
            Widget::Object(children) => children,
            Widget::ArrayForm(array) => array.record_nodes(),
            Widget::Custom(node) => std::slice::from_ref(node.as_ref()),
            _ => &[],
        }
    }
}

// =============================================================================
// Custom field context
// =============================================================================

/// What a custom renderer gets to work with.
pub struct CustomContext {
    pub name: String,
    /// Value at the field's path (the kind's default if absent).
    pub value: Value,
    /// The entire form value.
    pub raw_value: Value,
    pub disabled: bool,
    pub props: FieldProps,
    /// Path-scoped edits.
    pub binding: Binding,
}

impl CustomContext {
    /// Store a value at the field's path.
    pub fn on_change(&self, leaf: impl Into<Value>) {
        self.binding.set(leaf);
    }

    /// Replace the whole form value.
    pub fn on_raw_change(&self, root: Value) {
        self.binding.set_root(root);
    }
}
