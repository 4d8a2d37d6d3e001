//! Twitter/X v2 API client and models
//!
//! This module handles communication with the v2 endpoints
//! and defines the data models for API responses.

pub mod client;
pub mod models;
pub mod oauth;
