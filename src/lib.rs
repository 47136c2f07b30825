//! Model inventory service for the sweet-potato phenotyping tool.
//!
//! Finds the classification executables shipped with the tool, asks each one
//! to describe itself and keeps `models.json` current for the user interface.

pub mod config;
pub mod console;
pub mod inventory;
pub mod server;
