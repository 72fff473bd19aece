//! View State - Ephemeral UI state owned by a form between renders.
//!
//! Collapse disclosure, the active record of array forms, remote option
//! loaders and deferred editors all live here, keyed by where they were
//! rendered (scope plus field path or flow position). None of it is ever
//! reported through `on_change`.
//!
//! A render pass is bracketed by [`ViewState::begin_pass`] and
//! [`ViewState::end_pass`]. Every entry touched during the pass is marked
//! live; `end_pass` drops the rest. Dropping an entry is how a field
//! unmounts: its loader goes away, and any ticket still out for it turns
//! stale.

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::fmt;

use spark_signals::{signal, Signal};
use tracing::trace;

use crate::primitives::Collapse;
use crate::state::Loader;
use crate::value::Value;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
enum Slot {
    Collapse,
    Options,
    Editor,
    Selection,
}

/// Per-form store of ephemeral state.
#[derive(Default)]
pub struct ViewState {
    collapses: RefCell<HashMap<String, Collapse>>,
    options: RefCell<HashMap<String, Loader<Vec<Value>>>>,
    editors: RefCell<HashMap<String, Loader<()>>>,
    selections: RefCell<HashMap<String, Signal<Option<Value>>>>,
    live: RefCell<HashSet<(Slot, String)>>,
}

impl ViewState {
    pub fn new() -> Self {
        Self::default()
    }

    fn mark(&self, slot: Slot, key: &str) {
        self.live.borrow_mut().insert((slot, key.to_string()));
    }

    /// Start a render pass. Nothing is live until touched again.
    pub fn begin_pass(&self) {
        self.live.borrow_mut().clear();
    }

    /// Finish a render pass, dropping entries that were not touched.
    pub fn end_pass(&self) {
        let live = self.live.borrow();
        let keep = |slot: Slot, key: &String| live.contains(&(slot, key.clone()));

        let before = self.len();
        self.collapses.borrow_mut().retain(|k, _| keep(Slot::Collapse, k));
        self.options.borrow_mut().retain(|k, _| keep(Slot::Options, k));
        self.editors.borrow_mut().retain(|k, _| keep(Slot::Editor, k));
        self.selections.borrow_mut().retain(|k, _| keep(Slot::Selection, k));

        let dropped = before - self.len();
        if dropped > 0 {
            trace!(dropped, "view state swept");
        }
    }

    /// The collapse for `key`, created from `seed` on first use and
    /// resynced when the seed changes.
    pub fn collapse(&self, key: &str, seed: bool) -> Collapse {
        self.mark(Slot::Collapse, key);
        let mut collapses = self.collapses.borrow_mut();
        match collapses.get(key) {
            Some(existing) => {
                existing.sync_seed(seed);
                existing.clone()
            }
            None => {
                let collapse = Collapse::new(seed);
                collapses.insert(key.to_string(), collapse.clone());
                collapse
            }
        }
    }

    /// The remote options loader for `key`.
    pub fn options(&self, key: &str) -> Loader<Vec<Value>> {
        self.mark(Slot::Options, key);
        self.options.borrow_mut().entry(key.to_string()).or_default().clone()
    }

    /// The deferred editor loader for `key`.
    pub fn editor(&self, key: &str) -> Loader<()> {
        self.mark(Slot::Editor, key);
        self.editors.borrow_mut().entry(key.to_string()).or_default().clone()
    }

    /// The active array record choice for `key` (`None` until chosen).
    pub fn selection(&self, key: &str) -> Signal<Option<Value>> {
        self.mark(Slot::Selection, key);
        self.selections
            .borrow_mut()
            .entry(key.to_string())
            .or_insert_with(|| signal(None))
            .clone()
    }

    /// Keys of the stored collapses, sorted.
    pub fn collapse_keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.collapses.borrow().keys().cloned().collect();
        keys.sort();
        keys
    }

    /// Number of stored entries across all kinds.
    pub fn len(&self) -> usize {
        self.collapses.borrow().len()
            + self.options.borrow().len()
            + self.editors.borrow().len()
            + self.selections.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Forget everything.
    pub fn clear(&self) {
        self.collapses.borrow_mut().clear();
        self.options.borrow_mut().clear();
        self.editors.borrow_mut().clear();
        self.selections.borrow_mut().clear();
        self.live.borrow_mut().clear();
    }
}

impl fmt::Debug for ViewState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ViewState")
            .field("collapses", &self.collapses.borrow().len())
            .field("options", &self.options.borrow().len())
            .field("editors", &self.editors.borrow().len())
            .field("selections", &self.selections.borrow().len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::LoadState;

    #[test]
    fn test_collapse_is_reused_across_passes() {
        let view = ViewState::new();

        view.begin_pass();
        view.collapse("c:0", true).toggle();
        view.end_pass();

        view.begin_pass();
        let again = view.collapse("c:0", true);
        view.end_pass();

        assert!(again.is_expanded(), "toggle must survive the next pass");
    }

    #[test]
    fn test_untouched_entries_are_swept() {
        let view = ViewState::new();

        view.begin_pass();
        view.collapse("c:0", false);
        view.selection("items");
        view.end_pass();
        assert_eq!(view.len(), 2);

        view.begin_pass();
        view.collapse("c:0", false);
        view.end_pass();
        assert_eq!(view.len(), 1, "selection was not rendered, so it is dropped");
    }

    #[test]
    fn test_sweep_makes_tickets_stale() {
        let view = ViewState::new();

        view.begin_pass();
        let ticket = view.options("plan").ensure("/plans").unwrap();
        view.end_pass();

        view.begin_pass();
        view.end_pass();

        assert!(ticket.is_stale());
        assert!(!ticket.resolve(Ok(vec![])));
    }

    #[test]
    fn test_collapse_keys_are_sorted() {
        let view = ViewState::new();
        view.collapse("b/collapse:0", true);
        view.collapse("a/collapse:2", true);

        assert_eq!(view.collapse_keys(), vec!["a/collapse:2", "b/collapse:0"]);
    }

    #[test]
    fn test_same_key_in_different_slots_is_distinct() {
        let view = ViewState::new();
        view.options("k");
        view.editor("k");

        assert_eq!(view.len(), 2);
        assert_eq!(view.editor("k").state(), LoadState::NotRequested);
    }
}
