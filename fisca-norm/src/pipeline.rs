//! End-to-end payload normalization
//!
//! Runs the pipeline stages in order: structural normalization, marital
//! status canonicalization over individuals, then entity-aware
//! reclassification against the metadata cache.

use crate::normalize::{normalize_entities, normalize_marital_status};
use crate::reclassify::{ensure_variables_match_entities, ReclassifyReport, ValidationError};
use crate::services::metadata_cache::MetadataService;
use fisca_common::SectionKind;
use serde_json::Value;
use tracing::info;

/// Normalize a raw payload in place and return the reclassification report.
pub async fn normalize_payload(
    payload: &mut Value,
    metadata: &MetadataService,
    debug_mode: bool,
) -> Result<ReclassifyReport, ValidationError> {
    normalize_entities(payload);

    if let Some(individus) = payload
        .get_mut(SectionKind::Individus.key())
        .and_then(Value::as_object_mut)
    {
        for entity in individus.values_mut() {
            if let Some(record) = entity.as_object_mut() {
                normalize_marital_status(record);
            }
        }
    }

    let report = ensure_variables_match_entities(payload, metadata, debug_mode).await?;
    info!(
        moves = report.moves.len(),
        unresolved = report.unresolved.len(),
        "Payload normalization complete"
    );
    Ok(report)
}
