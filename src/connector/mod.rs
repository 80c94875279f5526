//! # Connector Layer
//!
//! External integrations implementing application interfaces:
//! - Completion clients (Gemini over HTTP, deterministic mock)
//! - The HTTP/browser surface (axum)

pub mod adapter;
pub mod api;

pub use adapter::*;
pub use api::*;
