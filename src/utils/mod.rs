//! Utility functions and helpers
//!
//! Currently just the tracing setup; log output goes to stderr for
//! one-shot runs and to a file when the form owns the terminal.

pub mod logging;
