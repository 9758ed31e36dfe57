//! Foundational data structures, error types, and reaction templates.

pub mod error;
pub mod models;
pub mod templates;
