//! Navigation for devfm.
//!
//! [`pane::Pane`] puts a cursor on a sorted model; [`pane::DualPane`] pairs
//! the local and device panes.

pub mod pane;
