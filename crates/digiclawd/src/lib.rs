//! Digiclaw daemon library - exposes modules for testing.

pub mod aggregator;
pub mod cli;
pub mod config;
pub mod error;
pub mod network;
pub mod routes;
pub mod server;
pub mod sources;
