//! User interface layer
//!
//! This module contains the interactive search form.

pub mod form_app;
