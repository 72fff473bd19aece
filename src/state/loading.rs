//! Loading State - Explicit async state for fields that depend on outside work.
//!
//! Some fields can't render fully from the form value alone: selects whose
//! options come from a server, or editor widgets that are loaded on demand.
//! Each of those owns a [`Loader`] whose state moves through
//!
//! ```text
//! NotRequested ──start──▶ Loading ──resolve──▶ Ready(T)
//!                                  └─────────▶ Failed(message)
//! ```
//!
//! The engine never awaits anything. Whoever performs the work receives a
//! [`Ticket`] and resolves it later. Tickets are generation-stamped and hold
//! only a weak reference to their loader, so a result that arrives after the
//! loader restarted (new source) or was dropped (field unmounted) is ignored.
//!
//! # Example
//!
//! ```ignore
//! let loader: Loader<Vec<Value>> = Loader::new();
//! let ticket = loader.start();
//! assert_eq!(loader.state(), LoadState::Loading);
//!
//! ticket.resolve(Ok(vec![Value::from("a")]));
//! assert!(matches!(loader.state(), LoadState::Ready(_)));
//! ```

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use spark_signals::{signal, Signal};
use tracing::debug;

// =============================================================================
// LoadState
// =============================================================================

/// Observable state of a [`Loader`].
#[derive(Clone, Debug, PartialEq)]
pub enum LoadState<T> {
    /// Nothing asked for yet (or the request is gated off).
    NotRequested,
    /// Work handed out, no answer yet.
    Loading,
    /// Finished successfully.
    Ready(T),
    /// Finished with an error message.
    Failed(String),
}

impl<T> LoadState<T> {
    pub fn is_loading(&self) -> bool {
        matches!(self, LoadState::Loading)
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, LoadState::Ready(_))
    }

    /// The ready payload, if any.
    pub fn ready(&self) -> Option<&T> {
        match self {
            LoadState::Ready(value) => Some(value),
            _ => None,
        }
    }

    /// The failure message, if any.
    pub fn error(&self) -> Option<&str> {
        match self {
            LoadState::Failed(message) => Some(message),
            _ => None,
        }
    }

    /// Transform the ready payload, keeping the other states.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> LoadState<U> {
        match self {
            LoadState::NotRequested => LoadState::NotRequested,
            LoadState::Loading => LoadState::Loading,
            LoadState::Ready(value) => LoadState::Ready(f(value)),
            LoadState::Failed(message) => LoadState::Failed(message),
        }
    }
}

// =============================================================================
// Loader
// =============================================================================

struct LoaderInner<T: Clone + PartialEq + fmt::Debug + 'static> {
    state: Signal<LoadState<T>>,
    generation: Cell<u64>,
    /// What the current generation was started for (e.g. an options URL).
    requested: RefCell<Option<String>>,
}

/// Owner of one field's loading state.
///
/// Cloning a loader shares the same state.
pub struct Loader<T: Clone + PartialEq + fmt::Debug + 'static> {
    inner: Rc<LoaderInner<T>>,
}

impl<T: Clone + PartialEq + fmt::Debug + 'static> Clone for Loader<T> {
    fn clone(&self) -> Self {
        Self { inner: self.inner.clone() }
    }
}

impl<T: Clone + PartialEq + fmt::Debug + 'static> Default for Loader<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone + PartialEq + fmt::Debug + 'static> fmt::Debug for Loader<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Loader")
            .field("state", &self.state())
            .field("generation", &self.inner.generation.get())
            .finish()
    }
}

impl<T: Clone + PartialEq + fmt::Debug + 'static> Loader<T> {
    pub fn new() -> Self {
        Self {
            inner: Rc::new(LoaderInner {
                state: signal(LoadState::NotRequested),
                generation: Cell::new(0),
                requested: RefCell::new(None),
            }),
        }
    }

    /// Current state.
    pub fn state(&self) -> LoadState<T> {
        self.inner.state.get()
    }

    /// The reactive state, for hosts that re-render on change.
    pub fn signal(&self) -> Signal<LoadState<T>> {
        self.inner.state.clone()
    }

    /// Begin a new request. Any ticket from an earlier request goes stale.
    pub fn start(&self) -> Ticket<T> {
        let generation = self.inner.generation.get() + 1;
        self.inner.generation.set(generation);
        self.inner.state.set(LoadState::Loading);
        Ticket {
            loader: Rc::downgrade(&self.inner),
            generation,
        }
    }

    /// Start a request for `key` unless one was already started for it.
    ///
    /// Returns `None` when the loader already requested `key`, whatever its
    /// outcome. A different key restarts the loader.
    pub fn ensure(&self, key: &str) -> Option<Ticket<T>> {
        if self.inner.requested.borrow().as_deref() == Some(key) {
            return None;
        }
        *self.inner.requested.borrow_mut() = Some(key.to_string());
        Some(self.start())
    }

    /// Forget everything, invalidating outstanding tickets.
    pub fn reset(&self) {
        self.inner.generation.set(self.inner.generation.get() + 1);
        *self.inner.requested.borrow_mut() = None;
        self.inner.state.set(LoadState::NotRequested);
    }
}

// =============================================================================
// Ticket
// =============================================================================

/// Handle given to whoever performs the work behind a [`Loader`].
pub struct Ticket<T: Clone + PartialEq + fmt::Debug + 'static> {
    loader: Weak<LoaderInner<T>>,
    generation: u64,
}

impl<T: Clone + PartialEq + fmt::Debug + 'static> fmt::Debug for Ticket<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Ticket")
            .field("generation", &self.generation)
            .field("stale", &self.is_stale())
            .finish()
    }
}

impl<T: Clone + PartialEq + fmt::Debug + 'static> Ticket<T> {
    /// True if delivering a result would be ignored.
    pub fn is_stale(&self) -> bool {
        match self.loader.upgrade() {
            Some(inner) => inner.generation.get() != self.generation,
            None => true,
        }
    }

    /// Deliver the outcome. Returns `false` if the result was discarded.
    pub fn resolve(self, result: Result<T, String>) -> bool {
        let Some(inner) = self.loader.upgrade() else {
            debug!(generation = self.generation, "discarding result for dropped loader");
            return false;
        };
        if inner.generation.get() != self.generation {
            debug!(
                generation = self.generation,
                current = inner.generation.get(),
                "discarding stale result"
            );
            return false;
        }
        inner.state.set(match result {
            Ok(value) => LoadState::Ready(value),
            Err(message) => LoadState::Failed(message),
        });
        true
    }
}
