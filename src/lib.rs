//! Library inventory, officer accounts and lending over a JSON HTTP API.
//!
//! `main.rs` wires these modules into the binary; tests drive them directly.

pub mod app;
pub mod auth;
pub mod config;
pub mod error;
pub mod extract;
pub mod routes;
pub mod sql;
pub mod store;
pub mod types;
