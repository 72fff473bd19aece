//! State Module - Runtime state that outlives a single render.
//!
//! - **Loading** - Explicit loading states and stale-safe tickets

pub mod loading;

pub use loading::{LoadState, Loader, Ticket};
