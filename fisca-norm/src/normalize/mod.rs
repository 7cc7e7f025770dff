//! Payload normalizers
//!
//! - `structure`: coerces raw section shapes into the canonical
//!   entity-id → record mapping
//! - `marital_status`: consolidates marital status aliases and spellings

pub mod marital_status;
pub mod structure;

pub use marital_status::{canonical_marital_status, normalize_marital_status};
pub use structure::normalize_entities;
