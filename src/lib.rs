pub mod api;
pub mod cli;
pub mod config;
pub mod data;
pub mod ui;
pub mod utils;
