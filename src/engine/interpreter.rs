//! Flow Interpreter - Turns a flow into a node sequence.
//!
//! The interpreter walks a [`Flow`] once, left to right. Fields are rendered
//! through the [`Dispatcher`]; group markers are folded into collapse nodes
//! with a single pending buffer:
//!
//! ```text
//! ["name", ">>>Details", "age", "email", "---"]
//!
//! Field(name)
//! Collapse("Details", collapsed, line_end) ─┬─ Field(age)
//!                                           └─ Field(email)
//! ```
//!
//! Groups never nest. Opening a group while one is pending closes the pending
//! one first, with its own label and seed. A separator closes the pending
//! group with a trailing rule (or emits a divider when none is open), and a
//! group still open at the end of the flow is closed implicitly.
//!
//! Output depends only on `(schema, flow, value)`. View state changes what is
//! visible inside a collapse, not the node sequence.

use tracing::trace;

use crate::primitives::{CollapseNode, Node, OnChange};
use crate::types::{Flow, FlowStep, Schema};
use crate::value::Value;

use super::dispatcher::Dispatcher;
use super::error::{FormError, FormResult};
use super::view_state::ViewState;

// =============================================================================
// Render context
// =============================================================================

/// Everything a render pass needs besides the flow, schema and value.
#[derive(Clone)]
pub struct RenderContext<'a> {
    pub dispatcher: &'a Dispatcher,
    pub view: &'a ViewState,
    /// Receives the next value of whatever is being rendered.
    pub on_change: OnChange,
    scope: String,
}

impl<'a> RenderContext<'a> {
    pub fn new(dispatcher: &'a Dispatcher, view: &'a ViewState, on_change: OnChange) -> Self {
        Self { dispatcher, view, on_change, scope: String::new() }
    }

    /// Context for a sub-form rendered under `scope`, reporting its own
    /// value to `on_change`.
    pub fn nested(&self, scope: &str, on_change: OnChange) -> Self {
        Self {
            dispatcher: self.dispatcher,
            view: self.view,
            on_change,
            scope: format!("{}{}/", self.scope, scope),
        }
    }

    /// View state key for `local` within this context.
    pub fn key(&self, local: &str) -> String {
        format!("{}{}", self.scope, local)
    }

    pub fn scope(&self) -> &str {
        &self.scope
    }
}

// =============================================================================
// Interpret
// =============================================================================

struct PendingGroup {
    label: String,
    collapsed: bool,
    /// Flow position of the group start, used as its view state key.
    index: usize,
    children: Vec<Node>,
}

impl PendingGroup {
    fn finish(self, ctx: &RenderContext<'_>, line_end: bool) -> Node {
        let state = ctx.view.collapse(&ctx.key(&format!("collapse:{}", self.index)), self.collapsed);
        Node::Collapse(CollapseNode {
            label: self.label,
            collapsed_seed: self.collapsed,
            line_end,
            children: self.children,
            state,
        })
    }
}

fn emit(out: &mut Vec<Node>, pending: &mut Option<PendingGroup>, node: Node) {
    match pending {
        Some(group) => group.children.push(node),
        None => out.push(node),
    }
}

/// Render `flow` against `value`.
///
/// Fails only when the flow names a field missing from `schema` (or one whose
/// name is not a valid path). Unknown field kinds are skipped with a warning.
pub fn interpret(
    flow: &Flow,
    schema: &Schema,
    value: &Value,
    ctx: &RenderContext<'_>,
) -> FormResult<Vec<Node>> {
    let mut out = Vec::new();
    let mut pending: Option<PendingGroup> = None;

    for (index, step) in flow.steps().iter().enumerate() {
        match step {
            FlowStep::Field(name) => {
                let definition = schema
                    .get(name)
                    .ok_or_else(|| FormError::FieldNotDefined { name: name.clone() })?;
                if !definition.visible.eval(value) {
                    trace!(field = %name, "field hidden");
                    continue;
                }
                if let Some(node) = ctx.dispatcher.render(name, definition, value, ctx)? {
                    emit(&mut out, &mut pending, node);
                }
            }
            FlowStep::CollapseStart { label, collapsed } => {
                if let Some(group) = pending.take() {
                    out.push(group.finish(ctx, false));
                }
                pending = Some(PendingGroup {
                    label: label.clone(),
                    collapsed: *collapsed,
                    index,
                    children: Vec::new(),
                });
            }
            FlowStep::CollapseEnd => {
                if let Some(group) = pending.take() {
                    out.push(group.finish(ctx, false));
                }
            }
            FlowStep::Separator => match pending.take() {
                Some(group) => out.push(group.finish(ctx, true)),
                None => out.push(Node::Divider),
            },
            FlowStep::Node(node) => emit(&mut out, &mut pending, node.clone()),
            FlowStep::Build(build) => emit(&mut out, &mut pending, build()),
        }
    }

    if let Some(group) = pending.take() {
        out.push(group.finish(ctx, false));
    }
    Ok(out)
}
