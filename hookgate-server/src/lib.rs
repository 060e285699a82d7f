//! hookgate server
//!
//! Receives signed push notifications and runs the configured update
//! script, one run at a time.

pub mod api;
pub mod config;
pub mod server;
pub mod shutdown;
pub mod state;
