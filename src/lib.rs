//! FUTBOL AI: football statistics and AI analysis aggregation API.
//!
//! Library crate exposing all modules for use by integration tests
//! and the binary entry point.

pub mod cache;
pub mod config;
pub mod data;
pub mod enricher;
pub mod head_to_head;
pub mod llm;
pub mod server;
pub mod types;
