//! Collapse Primitive - Disclosure state for a grouped region of a form.
//!
//! A collapse owns exactly one piece of state: whether its group is open.
//! That state is ephemeral view state. It never travels through the form's
//! `on_change`, and it survives re-renders because the form keeps the
//! [`Collapse`] in its view state between passes.
//!
//! The caller's seed flag is applied edge-triggered: [`Collapse::sync_seed`]
//! only overwrites the local state when the seed differs from the last seed
//! it saw. Re-rendering with an unchanged seed keeps whatever the user
//! toggled.
//!
//! # Example
//!
//! ```ignore
//! let collapse = Collapse::new(true);
//! collapse.toggle();                  // user opens it
//! collapse.sync_seed(true);           // same seed: stays open
//! assert!(collapse.is_expanded());
//!
//! collapse.sync_seed(false);          // seed changed: resynced
//! collapse.sync_seed(true);           // changed again: closed
//! assert!(collapse.is_collapsed());
//! ```

use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

use spark_signals::{signal, Signal};

/// Disclosure state of a group.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Disclosure {
    Expanded,
    Collapsed,
}

impl Disclosure {
    fn from_collapsed(collapsed: bool) -> Self {
        if collapsed { Disclosure::Collapsed } else { Disclosure::Expanded }
    }
}

/// Shared handle to a group's disclosure state.
#[derive(Clone)]
pub struct Collapse {
    collapsed: Signal<bool>,
    seed: Rc<Cell<bool>>,
}

impl Collapse {
    /// Create a collapse seeded from the caller's flag.
    pub fn new(collapsed: bool) -> Self {
        Self {
            collapsed: signal(collapsed),
            seed: Rc::new(Cell::new(collapsed)),
        }
    }

    pub fn state(&self) -> Disclosure {
        Disclosure::from_collapsed(self.collapsed.get())
    }

    pub fn is_collapsed(&self) -> bool {
        self.collapsed.get()
    }

    pub fn is_expanded(&self) -> bool {
        !self.collapsed.get()
    }

    /// Flip the local state.
    pub fn toggle(&self) {
        self.collapsed.set(!self.collapsed.get());
    }

    /// Apply the caller's seed flag.
    ///
    /// Returns `true` if the seed changed and local state was overwritten.
    pub fn sync_seed(&self, collapsed: bool) -> bool {
        if self.seed.get() == collapsed {
            return false;
        }
        self.seed.set(collapsed);
        self.collapsed.set(collapsed);
        true
    }

    /// The reactive state, for hosts that re-render on change.
    pub fn signal(&self) -> Signal<bool> {
        self.collapsed.clone()
    }
}

impl fmt::Debug for Collapse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Collapse")
            .field("state", &self.state())
            .field("seed", &self.seed.get())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seeded_state() {
        assert_eq!(Collapse::new(true).state(), Disclosure::Collapsed);
        assert_eq!(Collapse::new(false).state(), Disclosure::Expanded);
    }

    #[test]
    fn test_toggle_flips() {
        let collapse = Collapse::new(true);
        collapse.toggle();
        assert!(collapse.is_expanded());
        collapse.toggle();
        assert!(collapse.is_collapsed());
    }

    #[test]
    fn test_unchanged_seed_keeps_user_state() {
        let collapse = Collapse::new(true);
        collapse.toggle();

        assert!(!collapse.sync_seed(true), "same seed is not an edge");
        assert!(collapse.is_expanded(), "user toggle must survive re-render");
    }

    #[test]
    fn test_seed_change_resyncs() {
        let collapse = Collapse::new(true);
        collapse.toggle();
        collapse.toggle();

        assert!(collapse.sync_seed(false));
        assert!(collapse.is_expanded());

        collapse.toggle();
        assert!(collapse.sync_seed(true));
        assert!(collapse.is_collapsed());
    }

    #[test]
    fn test_clones_share_state() {
        let collapse = Collapse::new(false);
        let other = collapse.clone();
        other.toggle();

        assert!(collapse.is_collapsed());
        assert!(collapse.signal().get());
    }
}
