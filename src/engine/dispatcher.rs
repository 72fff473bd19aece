//! Component Dispatcher - Field definition to node.
//!
//! The dispatcher is the only place that knows how each [`FieldKind`] is
//! rendered. It is immutable once built and passed down explicitly; there is
//! no global registry. Two things can be plugged in through
//! [`DispatcherBuilder`]:
//!
//! - named renderers, for type tags outside the built-in set
//! - the seams for outside work: an [`OptionSource`] for remote select
//!   options and an [`EditorLoader`] for deferred editor widgets
//!
//! # Example
//!
//! ```ignore
//! let dispatcher = Dispatcher::builder()
//!     .renderer("rating", Rc::new(|cx: &CustomContext| Node::element("stars", cx.value.to_string())))
//!     .option_source(Rc::new(HttpOptions::new(client)))
//!     .build();
//! ```

use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use tracing::{debug, warn};

use crate::primitives::array_form::{distinct_choices, position, replace_first};
use crate::primitives::{
    ArrayForm, Binding, CustomContext, CustomRenderer, EditorInput, FieldNode, KeyValueInput,
    LabelView, MultiSelectInput, Node, NumberInput, OnChange, SelectInput, TextInput,
    TextareaInput, ToggleInput, Widget,
};
use crate::state::{LoadState, Ticket};
use crate::types::{CustomField, FieldDefinition, FieldFlags, FieldKind, SelectOption, SubForm};
use crate::value::{lookup, Path, Value};

use super::error::FormResult;
use super::interpreter::{interpret, RenderContext};

// =============================================================================
// Seams
// =============================================================================

/// Fetches remote option lists.
///
/// `fetch` is called once per field and source. Resolve the ticket whenever
/// the answer is known, synchronously or later; a ticket whose field has
/// since unmounted is ignored.
pub trait OptionSource {
    fn fetch(&self, source: &str, ticket: Ticket<Vec<Value>>);
}

/// Editor widgets that are loaded on demand.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EditorKind {
    Markdown,
    Code,
}

impl EditorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            EditorKind::Markdown => "markdown",
            EditorKind::Code => "code",
        }
    }
}

/// Loads deferred editor widgets.
pub trait EditorLoader {
    fn load(&self, kind: EditorKind, ticket: Ticket<()>);
}

// =============================================================================
// Dispatcher
// =============================================================================

/// Maps field definitions to nodes.
#[derive(Clone, Default)]
pub struct Dispatcher {
    renderers: HashMap<String, CustomRenderer>,
    option_source: Option<Rc<dyn OptionSource>>,
    editor_loader: Option<Rc<dyn EditorLoader>>,
}

impl fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<_> = self.renderers.keys().collect();
        names.sort();
        f.debug_struct("Dispatcher")
            .field("renderers", &names)
            .field("option_source", &self.option_source.is_some())
            .field("editor_loader", &self.editor_loader.is_some())
            .finish()
    }
}

impl Dispatcher {
    pub fn builder() -> DispatcherBuilder {
        DispatcherBuilder::default()
    }

    /// True if `tag` resolves to a named renderer.
    pub fn has_renderer(&self, tag: &str) -> bool {
        self.renderers.contains_key(tag)
    }

    /// Render one field against the whole form value.
    ///
    /// Returns `Ok(None)` for a kind nothing can render.
    pub fn render(
        &self,
        name: &str,
        definition: &FieldDefinition,
        root: &Value,
        ctx: &RenderContext<'_>,
    ) -> FormResult<Option<Node>> {
        let path = Path::parse(name)?;
        let binding = Binding::new(path.clone(), root.clone(), ctx.on_change.clone());
        let raw = lookup(root, &path).cloned();
        let current = raw.unwrap_or_else(|| definition.kind.default_value());
        let flags = FieldFlags::resolve(definition, root);
        let key = ctx.key(name);

        let custom = |renderer: &CustomRenderer| {
            let context = CustomContext {
                name: name.to_string(),
                value: current.clone(),
                raw_value: root.clone(),
                disabled: flags.contains(FieldFlags::DISABLED),
                props: definition.props.clone(),
                binding: binding.clone(),
            };
            Widget::Custom(Box::new(renderer(&context)))
        };

        let props = &definition.props;
        let widget = if let Some(renderer) = &definition.render {
            custom(renderer)
        } else {
            match &definition.kind {
                FieldKind::String => Widget::Text(TextInput::new(&current, props, binding.clone())),
                FieldKind::MultilineText => {
                    Widget::Textarea(TextareaInput::new(&current, props, binding.clone()))
                }
                FieldKind::Number => Widget::Number(NumberInput::new(&current, props, binding.clone())),
                FieldKind::BooleanToggle => Widget::Toggle(ToggleInput::new(&current, binding.clone())),
                FieldKind::SingleSelect => {
                    let options = self.options(&key, definition, root, ctx);
                    Widget::Select(SelectInput::new(&current, options, props, binding.clone()))
                }
                FieldKind::MultiSelect => {
                    let options = self.options(&key, definition, root, ctx);
                    Widget::MultiSelect(MultiSelectInput::new(&current, options, props, binding.clone()))
                }
                FieldKind::KeyValueMap => {
                    Widget::KeyValue(KeyValueInput::new(&current, props, binding.clone()))
                }
                FieldKind::NestedObject(form) => {
                    let nested = ctx.nested(name, binding.scoped());
                    Widget::Object(interpret(&form.flow, &form.schema, &current, &nested)?)
                }
                FieldKind::NestedArray { form, selector } => {
                    Widget::ArrayForm(self.array_form(name, form, selector, &current, &binding, ctx)?)
                }
                FieldKind::RichText => {
                    let editor = self.editor(&key, EditorKind::Markdown, ctx);
                    Widget::RichText(EditorInput::new(&current, props, editor, binding.clone()))
                }
                FieldKind::CodeEditor => {
                    let editor = self.editor(&key, EditorKind::Code, ctx);
                    Widget::Code(EditorInput::new(&current, props, editor, binding.clone()))
                }
                FieldKind::Label => Widget::Label(LabelView::new(&current)),
                FieldKind::Custom(CustomField::Render(renderer)) => custom(renderer),
                FieldKind::Custom(CustomField::Node(node)) => Widget::Custom(Box::new(node.clone())),
                FieldKind::Other(tag) => match self.renderers.get(tag) {
                    Some(renderer) => custom(renderer),
                    None => {
                        warn!(field = name, tag = %tag, "no renderer for field type, skipping field");
                        return Ok(None);
                    }
                },
            }
        };

        Ok(Some(Node::Field(FieldNode {
            name: name.to_string(),
            label: definition.label.clone(),
            help: definition.help.clone(),
            flags,
            widget,
            binding,
        })))
    }

    /// Options for a select: static ones, or the field's remote loader.
    fn options(
        &self,
        key: &str,
        definition: &FieldDefinition,
        root: &Value,
        ctx: &RenderContext<'_>,
    ) -> LoadState<Vec<SelectOption>> {
        let props = &definition.props;
        let (Some(source), Some(fetcher)) = (&props.options_from, &self.option_source) else {
            return LoadState::Ready(props.options.clone());
        };

        let loader = ctx.view.options(key);
        let allowed = props.fetch_condition.as_ref().is_none_or(|condition| condition.eval(root));
        if allowed {
            if let Some(ticket) = loader.ensure(source) {
                debug!(field = key, source = %source, "fetching options");
                fetcher.fetch(source, ticket);
            }
        }
        loader
            .state()
            .map(|items| items.iter().map(|item| props.to_option(item)).collect())
    }

    /// Loading state of an editor widget. Ready at once without a loader.
    fn editor(&self, key: &str, kind: EditorKind, ctx: &RenderContext<'_>) -> LoadState<()> {
        let Some(editor_loader) = &self.editor_loader else {
            return LoadState::Ready(());
        };
        let loader = ctx.view.editor(key);
        if let Some(ticket) = loader.ensure(kind.as_str()) {
            debug!(field = key, editor = kind.as_str(), "loading editor");
            editor_loader.load(kind, ticket);
        }
        loader.state()
    }

    fn array_form(
        &self,
        name: &str,
        form: &SubForm,
        selector: &str,
        current: &Value,
        binding: &Binding,
        ctx: &RenderContext<'_>,
    ) -> FormResult<ArrayForm> {
        let records = current.as_array().unwrap_or(&[]);
        let choices = distinct_choices(records, selector);
        let selection = ctx.view.selection(&ctx.key(name));
        let requested = selection
            .get()
            .or_else(|| records.first().and_then(|record| record.get_key(selector)).cloned());

        let matched = requested
            .as_ref()
            .and_then(|choice| position(records, selector, choice).map(|index| (index, choice.clone())));
        let Some((index, active)) = matched else {
            return Ok(ArrayForm::new(selector.to_string(), choices, requested, None, Vec::new(), selection));
        };

        let list = records.to_vec();
        let on_change: OnChange = {
            let binding = binding.clone();
            let selector = selector.to_string();
            let active = active.clone();
            Rc::new(move |updated| binding.set(replace_first(&list, &selector, &active, updated)))
        };
        let nested = ctx.nested(&format!("{name}[{active}]"), on_change);
        let record_nodes = interpret(&form.flow, &form.schema, &records[index], &nested)?;

        Ok(ArrayForm::new(selector.to_string(), choices, requested, Some(active), record_nodes, selection))
    }
}

// =============================================================================
// Builder
// =============================================================================

/// Configures a [`Dispatcher`].
#[derive(Default)]
pub struct DispatcherBuilder {
    dispatcher: Dispatcher,
}

impl DispatcherBuilder {
    /// Register a renderer for fields whose type tag is `tag`.
    pub fn renderer(mut self, tag: impl Into<String>, renderer: CustomRenderer) -> Self {
        self.dispatcher.renderers.insert(tag.into(), renderer);
        self
    }

    pub fn option_source(mut self, source: Rc<dyn OptionSource>) -> Self {
        self.dispatcher.option_source = Some(source);
        self
    }

    pub fn editor_loader(mut self, loader: Rc<dyn EditorLoader>) -> Self {
        self.dispatcher.editor_loader = Some(loader);
        self
    }

    pub fn build(self) -> Dispatcher {
        self.dispatcher
    }
}
