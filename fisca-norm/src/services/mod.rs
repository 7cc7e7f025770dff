//! External collaborators of the normalization engine
//!
//! - `authority`: the remote variable metadata authority (source of truth
//!   for which entity type owns which variable)
//! - `metadata_cache`: time-bounded cache over the authority
//! - `calculation`: the calculation service consuming normalized payloads

pub mod authority;
pub mod calculation;
pub mod metadata_cache;

pub use authority::{AuthorityError, HttpMetadataAuthority, MetadataAuthority, VariableMetadata};
pub use calculation::{CalculationClient, CalculationError};
pub use metadata_cache::{Clock, MetadataService, SystemClock, METADATA_CACHE_TTL};
