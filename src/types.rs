//! Core types - Schema, flow and field definitions.
//!
//! These types are the declarative input of the engine:
//!
//! - [`Schema`] maps field names to [`FieldDefinition`]s.
//! - [`Flow`] lists, in order, which fields appear and how they are grouped.
//! - [`FieldKind`] is the closed set of input kinds the dispatcher knows.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::rc::Rc;

use crate::primitives::{CustomRenderer, Node};
use crate::value::Value;

// =============================================================================
// Predicates
// =============================================================================

/// A flag that is either fixed or computed from the whole form value.
#[derive(Clone)]
pub enum Predicate {
    /// Fixed value.
    Always(bool),
    /// Evaluated against the entire current value on every render.
    When(Rc<dyn Fn(&Value) -> bool>),
}

impl Predicate {
    /// Build a computed predicate.
    pub fn when(f: impl Fn(&Value) -> bool + 'static) -> Self {
        Predicate::When(Rc::new(f))
    }

    pub fn eval(&self, value: &Value) -> bool {
        match self {
            Predicate::Always(flag) => *flag,
            Predicate::When(f) => f(value),
        }
    }
}

impl From<bool> for Predicate {
    fn from(flag: bool) -> Self {
        Predicate::Always(flag)
    }
}

impl fmt::Debug for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Predicate::Always(flag) => write!(f, "Always({flag})"),
            Predicate::When(_) => write!(f, "When(<fn>)"),
        }
    }
}

// =============================================================================
// Select options
// =============================================================================

/// One choice of a select or multi-select.
#[derive(Clone, Debug, PartialEq)]
pub struct SelectOption {
    pub label: String,
    pub value: Value,
}

impl SelectOption {
    pub fn new(label: impl Into<String>, value: impl Into<Value>) -> Self {
        Self { label: label.into(), value: value.into() }
    }

    /// Accepts either `{ "label": .., "value": .. }` or a bare value, which
    /// then serves as its own label.
    pub fn from_value(value: &Value) -> Self {
        if let Some(inner) = value.get_key("value") {
            let label = value
                .get_key("label")
                .map(Value::to_display_string)
                .unwrap_or_else(|| inner.to_display_string());
            return Self { label, value: inner.clone() };
        }
        Self { label: value.to_display_string(), value: value.clone() }
    }
}

/// Maps one raw fetched item to an option.
#[derive(Clone)]
pub struct OptionTransformer(pub Rc<dyn Fn(&Value) -> SelectOption>);

impl fmt::Debug for OptionTransformer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("OptionTransformer(<fn>)")
    }
}

// =============================================================================
// Field props
// =============================================================================

/// Presentation and behaviour knobs. Each kind reads the ones it cares about.
#[derive(Clone, Debug, Default)]
pub struct FieldProps {
    pub placeholder: Option<String>,
    pub prefix: Option<String>,
    pub suffix: Option<String>,

    /// Number bounds and increment.
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub step: Option<f64>,

    /// Visible rows of a multiline text (default 3).
    pub rows: Option<u16>,

    /// Language of a code editor (`json`, `css`, ...).
    pub language: Option<String>,

    /// Fixed choices for selects.
    pub options: Vec<SelectOption>,
    /// Remote source of choices; resolved through the dispatcher's option source.
    pub options_from: Option<String>,
    /// Applied to each fetched item.
    pub transformer: Option<OptionTransformer>,
    /// Remote options are only requested while this holds.
    pub fetch_condition: Option<Predicate>,

    pub clearable: bool,
    /// Multi-select accepts free text entries.
    pub creatable: bool,

    /// Key/value map placeholders.
    pub placeholder_key: Option<String>,
    pub placeholder_value: Option<String>,
    /// Entry inserted by key/value "add" actions (default `{"": ""}`).
    pub default_entry: Option<Value>,

    /// Anything else, passed through to custom renderers.
    pub extra: BTreeMap<String, Value>,
}

impl FieldProps {
    /// Convert a raw item into an option, honouring the transformer.
    pub fn to_option(&self, item: &Value) -> SelectOption {
        match &self.transformer {
            Some(OptionTransformer(transform)) => transform(item),
            None => SelectOption::from_value(item),
        }
    }
}

// =============================================================================
// Field kinds
// =============================================================================

/// A nested schema/flow pair.
#[derive(Clone, Debug)]
pub struct SubForm {
    pub schema: Rc<Schema>,
    pub flow: Rc<Flow>,
}

impl SubForm {
    pub fn new(schema: Schema, flow: Flow) -> Self {
        Self { schema: Rc::new(schema), flow: Rc::new(flow) }
    }
}

/// Caller-supplied field content.
#[derive(Clone)]
pub enum CustomField {
    /// Called on every render with the field's context.
    Render(CustomRenderer),
    /// Inserted as-is.
    Node(Node),
}

impl fmt::Debug for CustomField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CustomField::Render(_) => f.write_str("Render(<fn>)"),
            CustomField::Node(node) => f.debug_tuple("Node").field(node).finish(),
        }
    }
}

/// The closed set of input kinds.
#[derive(Clone, Debug)]
pub enum FieldKind {
    /// Single-line text.
    String,
    /// Textarea.
    MultilineText,
    Number,
    BooleanToggle,
    SingleSelect,
    /// List of scalar values.
    MultiSelect,
    /// Free-form string keys to values.
    KeyValueMap,
    /// An object edited with its own schema and flow.
    NestedObject(SubForm),
    /// A list of records switched by a discriminator key.
    NestedArray { form: SubForm, selector: String },
    /// Markdown editor.
    RichText,
    CodeEditor,
    /// Read-only text.
    Label,
    Custom(CustomField),
    /// A tag outside the built-in set. Resolved against the dispatcher's
    /// named renderers; otherwise the field is skipped.
    Other(String),
}

impl FieldKind {
    /// Resolve a document type tag.
    ///
    /// `object`/`form`/`arrayForm` need sub-forms and are built by the
    /// schema loader, so they are not handled here.
    pub fn from_tag(tag: &str) -> FieldKind {
        match tag {
            "string" => FieldKind::String,
            "text" => FieldKind::MultilineText,
            "number" => FieldKind::Number,
            "bool" => FieldKind::BooleanToggle,
            "select" => FieldKind::SingleSelect,
            "array" => FieldKind::MultiSelect,
            "object" => FieldKind::KeyValueMap,
            "markdown" => FieldKind::RichText,
            "code" => FieldKind::CodeEditor,
            "label" => FieldKind::Label,
            other => FieldKind::Other(other.to_string()),
        }
    }

    /// Tag used in logs and documents.
    pub fn tag(&self) -> &str {
        match self {
            FieldKind::String => "string",
            FieldKind::MultilineText => "text",
            FieldKind::Number => "number",
            FieldKind::BooleanToggle => "bool",
            FieldKind::SingleSelect => "select",
            FieldKind::MultiSelect => "array",
            FieldKind::KeyValueMap => "object",
            FieldKind::NestedObject(_) => "form",
            FieldKind::NestedArray { .. } => "arrayForm",
            FieldKind::RichText => "markdown",
            FieldKind::CodeEditor => "code",
            FieldKind::Label => "label",
            FieldKind::Custom(_) => "custom",
            FieldKind::Other(tag) => tag,
        }
    }

    /// Value used when the field's path holds nothing.
    pub fn default_value(&self) -> Value {
        match self {
            FieldKind::String
            | FieldKind::MultilineText
            | FieldKind::SingleSelect
            | FieldKind::RichText
            | FieldKind::CodeEditor
            | FieldKind::Label => Value::from(""),
            FieldKind::Number => Value::from(0),
            FieldKind::BooleanToggle => Value::Bool(false),
            FieldKind::MultiSelect | FieldKind::NestedArray { .. } => Value::array(),
            FieldKind::KeyValueMap
            | FieldKind::NestedObject(_)
            | FieldKind::Custom(_)
            | FieldKind::Other(_) => Value::object(),
        }
    }
}

// =============================================================================
// Field definition
// =============================================================================

/// Everything the engine knows about one field.
#[derive(Clone)]
pub struct FieldDefinition {
    pub kind: FieldKind,
    pub label: Option<String>,
    pub help: Option<String>,
    pub disabled: Predicate,
    pub visible: Predicate,
    pub props: FieldProps,
    /// Overrides the built-in widget for this field, whatever its kind.
    pub render: Option<CustomRenderer>,
}

impl fmt::Debug for FieldDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldDefinition")
            .field("kind", &self.kind)
            .field("label", &self.label)
            .field("help", &self.help)
            .field("disabled", &self.disabled)
            .field("visible", &self.visible)
            .field("props", &self.props)
            .field("render", &self.render.as_ref().map(|_| "<fn>"))
            .finish()
    }
}

impl FieldDefinition {
    pub fn new(kind: FieldKind) -> Self {
        Self {
            kind,
            label: None,
            help: None,
            disabled: Predicate::Always(false),
            visible: Predicate::Always(true),
            props: FieldProps::default(),
            render: None,
        }
    }

    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    pub fn disabled(mut self, disabled: impl Into<Predicate>) -> Self {
        self.disabled = disabled.into();
        self
    }

    pub fn visible(mut self, visible: impl Into<Predicate>) -> Self {
        self.visible = visible.into();
        self
    }

    pub fn props(mut self, props: FieldProps) -> Self {
        self.props = props;
        self
    }

    pub fn render(mut self, render: CustomRenderer) -> Self {
        self.render = Some(render);
        self
    }
}

// =============================================================================
// Schema
// =============================================================================

/// Field name to definition. Order is irrelevant; the flow decides layout.
#[derive(Clone, Debug, Default)]
pub struct Schema {
    fields: HashMap<String, FieldDefinition>,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn field(mut self, name: impl Into<String>, definition: FieldDefinition) -> Self {
        self.fields.insert(name.into(), definition);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, definition: FieldDefinition) {
        self.fields.insert(name.into(), definition);
    }

    pub fn get(&self, name: &str) -> Option<&FieldDefinition> {
        self.fields.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }
}

impl<K: Into<String>> FromIterator<(K, FieldDefinition)> for Schema {
    fn from_iter<I: IntoIterator<Item = (K, FieldDefinition)>>(iter: I) -> Self {
        Self {
            fields: iter.into_iter().map(|(k, d)| (k.into(), d)).collect(),
        }
    }
}

// =============================================================================
// Flow
// =============================================================================

/// Produces a node on every render.
pub type NodeBuilder = Rc<dyn Fn() -> Node>;

/// One entry of a [`Flow`].
#[derive(Clone)]
pub enum FlowStep {
    /// A schema field, by name (which is also its value path).
    Field(String),
    /// Open a group. `collapsed` seeds its disclosure state.
    CollapseStart { label: String, collapsed: bool },
    /// Close the open group.
    CollapseEnd,
    /// Divider, or closes the open group with a trailing divider.
    Separator,
    /// A literal node.
    Node(Node),
    /// A node built at render time.
    Build(NodeBuilder),
}

impl FlowStep {
    pub fn field(name: impl Into<String>) -> Self {
        FlowStep::Field(name.into())
    }

    pub fn group(label: impl Into<String>, collapsed: bool) -> Self {
        FlowStep::CollapseStart { label: label.into(), collapsed }
    }

    pub fn build(f: impl Fn() -> Node + 'static) -> Self {
        FlowStep::Build(Rc::new(f))
    }

    /// Textual markers: `>>>Label` opens a collapsed group, `<<<Label` an
    /// expanded one, `---` is a separator, anything else is a field name.
    pub fn parse(text: &str) -> Self {
        if let Some(label) = text.strip_prefix(">>>") {
            FlowStep::group(label, true)
        } else if let Some(label) = text.strip_prefix("<<<") {
            FlowStep::group(label, false)
        } else if text == "---" {
            FlowStep::Separator
        } else {
            FlowStep::field(text)
        }
    }
}

impl From<&str> for FlowStep {
    fn from(text: &str) -> Self {
        FlowStep::parse(text)
    }
}

impl From<String> for FlowStep {
    fn from(text: String) -> Self {
        FlowStep::parse(&text)
    }
}

impl From<Node> for FlowStep {
    fn from(node: Node) -> Self {
        FlowStep::Node(node)
    }
}

impl fmt::Debug for FlowStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FlowStep::Field(name) => f.debug_tuple("Field").field(name).finish(),
            FlowStep::CollapseStart { label, collapsed } => f
                .debug_struct("CollapseStart")
                .field("label", label)
                .field("collapsed", collapsed)
                .finish(),
            FlowStep::CollapseEnd => f.write_str("CollapseEnd"),
            FlowStep::Separator => f.write_str("Separator"),
            FlowStep::Node(node) => f.debug_tuple("Node").field(node).finish(),
            FlowStep::Build(_) => f.write_str("Build(<fn>)"),
        }
    }
}

/// Ordered layout of a form.
#[derive(Clone, Debug, Default)]
pub struct Flow {
    steps: Vec<FlowStep>,
}

impl Flow {
    pub fn new(steps: Vec<FlowStep>) -> Self {
        Self { steps }
    }

    /// Parse textual markers (see [`FlowStep::parse`]).
    pub fn parse<'a>(items: impl IntoIterator<Item = &'a str>) -> Self {
        items.into_iter().map(FlowStep::parse).collect()
    }

    pub fn steps(&self) -> &[FlowStep] {
        &self.steps
    }

    pub fn push(&mut self, step: impl Into<FlowStep>) {
        self.steps.push(step.into());
    }

    /// Field names referenced by this flow, in order.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.steps.iter().filter_map(|step| match step {
            FlowStep::Field(name) => Some(name.as_str()),
            _ => None,
        })
    }
}

impl<S: Into<FlowStep>> FromIterator<S> for Flow {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self { steps: iter.into_iter().map(Into::into).collect() }
    }
}

// =============================================================================
// Field flags (bitflags)
// =============================================================================

bitflags::bitflags! {
    /// Per-node flags, resolved at render time.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct FieldFlags: u8 {
        const NONE = 0;
        const DISABLED = 1 << 0;
        const CLEARABLE = 1 << 1;
        const CREATABLE = 1 << 2;
        const READ_ONLY = 1 << 3;
    }
}

impl FieldFlags {
    /// Flags for a definition against the current value.
    pub fn resolve(definition: &FieldDefinition, value: &Value) -> Self {
        let mut flags = FieldFlags::NONE;
        if definition.disabled.eval(value) {
            flags |= FieldFlags::DISABLED;
        }
        if definition.props.clearable {
            flags |= FieldFlags::CLEARABLE;
        }
        if definition.props.creatable {
            flags |= FieldFlags::CREATABLE;
        }
        if matches!(definition.kind, FieldKind::Label) {
            flags |= FieldFlags::READ_ONLY;
        }
        flags
    }
}
