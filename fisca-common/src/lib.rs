//! Common types for the fisca workspace
//!
//! Shared vocabulary between the normalization engine and its callers:
//! error types, configuration loading, and the canonical payload model
//! (sections, entity definitions).

pub mod config;
pub mod error;
pub mod model;

pub use error::{Error, Result};
pub use model::SectionKind;
