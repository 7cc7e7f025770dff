//! fisca-norm - entity-aware normalization of OpenFisca calculation payloads
//!
//! Takes a loosely-structured JSON payload describing tax/benefit entities
//! (individuals, households, families, tax households) and their
//! time-indexed variables, and produces a payload the calculation service
//! will accept:
//!
//! 1. **Structural normalization** - each canonical section is coerced from
//!    array/object/missing shapes into a uniform entity-id → record mapping,
//!    and relationship fields into sequences of ids.
//! 2. **Value canonicalization** - marital status spellings across
//!    languages and accents are consolidated under one canonical field and
//!    token.
//! 3. **Reclassification** - every variable is checked against the remote
//!    metadata authority (through a time-bounded cache) and relocated to
//!    the section that owns it, with an audit report of moves and of
//!    placements that could not be resolved.

pub mod normalize;
pub mod pipeline;
pub mod reclassify;
pub mod services;

pub use pipeline::normalize_payload;
pub use reclassify::{
    ensure_variables_match_entities, FetchFailure, MoveRecord, ReclassifyReport,
    UnresolvedRecord, ValidationError,
};
