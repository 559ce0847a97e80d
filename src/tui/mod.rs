//! TUI module for scinapse.
//!
//! This module contains reusable TUI application state and logic
//! extracted from `bin/lab_tui.rs` to enable testing.
//!
//! The actual terminal I/O remains in the binary, but all testable
//! state management and business logic lives here.

pub mod lab_app;
pub mod painter;

#[cfg(test)]
mod tests;
