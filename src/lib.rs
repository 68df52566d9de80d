//! Threatmark: a rate-limited URLhaus feed proxy with a categorized
//! bookmark store for threat-intelligence records.
//!
//! This library crate exposes all modules for use by the binary and integration tests.

pub mod app;
pub mod config;
pub mod database;
pub mod managers;
pub mod rpc_handler;
pub mod services;
pub mod types;
