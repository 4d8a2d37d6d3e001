//! Data layer: flattening, table assembly and export
//!
//! This module turns raw API tweets into flat rows with a fixed
//! schema, then into a typed table that can be written out as CSV.

pub mod exporter;
pub mod row;
pub mod table;
