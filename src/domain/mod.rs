//! # Domain Layer
//!
//! Core models, errors, and the response-interpretation service.
//! This layer is independent of external frameworks and infrastructure.

pub mod models;
pub mod services;

mod error;

pub use error::*;
pub use models::*;
pub use services::*;
