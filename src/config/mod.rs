//! Configuration module
//!
//! Resolves API credentials from the process environment and an
//! optional `.env` file.

pub mod credentials;
