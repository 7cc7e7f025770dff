//! Entity-aware variable reclassification
//!
//! For every (section, entity, variable) triple, asks the metadata cache
//! which entity type owns the variable and relocates it when it is filed
//! under the wrong section. Relocation targets are resolved within the
//! destination section: an entity with the same id as the source wins,
//! failing that a sole entity wins, and anything else is ambiguous.
//!
//! The pass decides first and applies afterwards: the read-only walk over
//! the pre-pass payload collects planned moves, so iteration never races
//! the mutation. Report ordering is deterministic (canonical section order,
//! then entity insertion order, then variable insertion order).
//!
//! Strictness is the caller's choice. In lenient mode ambiguity and
//! metadata fetch failures are reported but never fail the pass; in debug
//! mode either condition fails it with a typed error carrying the details.

use crate::services::metadata_cache::MetadataService;
use fisca_common::SectionKind;
use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::{debug, warn};

/// Audit record of one successful relocation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveRecord {
    pub variable: String,
    pub from: SectionKind,
    pub to: SectionKind,
    pub original_entity_id: String,
    pub target_entity_id: String,
}

/// A variable whose owning section is known but whose destination entity
/// could not be determined unambiguously
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UnresolvedRecord {
    pub variable: String,
    pub expected_section: SectionKind,
    pub from: SectionKind,
    pub entity_id: String,
}

/// A metadata lookup that failed for a reason other than "not found"
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FetchFailure {
    pub variable: String,
    pub error: String,
}

/// Outcome of a reclassification pass
#[derive(Debug, Clone, Default, Serialize)]
pub struct ReclassifyReport {
    pub moves: Vec<MoveRecord>,
    pub unresolved: Vec<UnresolvedRecord>,
}

/// Debug-mode failures, carrying their cause so callers can branch
#[derive(Debug, Error)]
pub enum ValidationError {
    /// Metadata could not be fetched for some variables
    #[error("could not fetch metadata for {} variable(s)", .0.len())]
    MetadataFetch(Vec<FetchFailure>),

    /// Some variables are not filed under the entity that owns them and no
    /// unambiguous relocation target exists
    #[error("{} variable(s) could not be matched to their entity", .0.len())]
    Unresolved(Vec<UnresolvedRecord>),
}

/// Move every misfiled variable to the section its metadata declares.
///
/// Mutates the payload in place and returns the audit report. Fetch errors
/// never abort the walk; they are collected and, like unresolved
/// placements, only fail the pass in debug mode (fetch errors take
/// precedence, and an error discards the accumulated moves from the return
/// value).
pub async fn ensure_variables_match_entities(
    payload: &mut Value,
    metadata: &MetadataService,
    debug_mode: bool,
) -> Result<ReclassifyReport, ValidationError> {
    let mut planned: Vec<MoveRecord> = Vec::new();
    let mut unresolved: Vec<UnresolvedRecord> = Vec::new();
    let mut fetch_errors: Vec<FetchFailure> = Vec::new();

    if let Some(root) = payload.as_object() {
        for section in SectionKind::ALL {
            let Some(entities) = root.get(section.key()).and_then(Value::as_object) else {
                continue;
            };

            for (entity_id, record) in entities {
                let Some(record) = record.as_object() else {
                    continue;
                };

                for variable in record.keys() {
                    let lookup = match metadata.variable_metadata(variable).await {
                        Ok(lookup) => lookup,
                        Err(err) => {
                            warn!(
                                variable = %variable,
                                error = %err,
                                "Metadata fetch failed, leaving variable in place"
                            );
                            fetch_errors.push(FetchFailure {
                                variable: variable.clone(),
                                error: err.to_string(),
                            });
                            continue;
                        }
                    };

                    // Unknown variables are assumed correctly placed.
                    let Some(label) = lookup.and_then(|m| m.entity) else {
                        continue;
                    };
                    let Some(expected) = SectionKind::from_entity_label(&label) else {
                        continue;
                    };
                    if expected == section {
                        continue;
                    }

                    match find_target_entity_id(root.get(expected.key()), entity_id) {
                        Some(target_entity_id) => planned.push(MoveRecord {
                            variable: variable.clone(),
                            from: section,
                            to: expected,
                            original_entity_id: entity_id.clone(),
                            target_entity_id,
                        }),
                        None => unresolved.push(UnresolvedRecord {
                            variable: variable.clone(),
                            expected_section: expected,
                            from: section,
                            entity_id: entity_id.clone(),
                        }),
                    }
                }
            }
        }
    }

    if let Some(root) = payload.as_object_mut() {
        for mv in &planned {
            apply_move(root, mv);
            debug!(
                variable = %mv.variable,
                from = %mv.from,
                to = %mv.to,
                target = %mv.target_entity_id,
                "Relocated variable"
            );
        }
    }

    if debug_mode && !fetch_errors.is_empty() {
        return Err(ValidationError::MetadataFetch(fetch_errors));
    }
    if debug_mode && !unresolved.is_empty() {
        return Err(ValidationError::Unresolved(unresolved));
    }

    Ok(ReclassifyReport {
        moves: planned,
        unresolved,
    })
}

/// Resolve the destination entity for a relocation: same id as the source
/// if present, else the sole entity of the section, else ambiguous.
fn find_target_entity_id(section_value: Option<&Value>, preferred_id: &str) -> Option<String> {
    let entities = section_value?.as_object()?;
    if entities.contains_key(preferred_id) {
        return Some(preferred_id.to_string());
    }
    if entities.len() == 1 {
        return entities.keys().next().cloned();
    }
    None
}

fn apply_move(root: &mut Map<String, Value>, mv: &MoveRecord) {
    let value = root
        .get_mut(mv.from.key())
        .and_then(Value::as_object_mut)
        .and_then(|entities| entities.get_mut(&mv.original_entity_id))
        .and_then(Value::as_object_mut)
        .and_then(|record| record.remove(&mv.variable));
    let Some(value) = value else {
        return;
    };

    let section = root
        .entry(mv.to.key().to_string())
        .or_insert_with(|| Value::Object(Map::new()));
    if !section.is_object() {
        *section = Value::Object(Map::new());
    }
    let Some(entities) = section.as_object_mut() else {
        return;
    };

    let entity = entities
        .entry(mv.target_entity_id.clone())
        .or_insert_with(|| Value::Object(Map::new()));
    if !entity.is_object() {
        *entity = Value::Object(Map::new());
    }
    if let Some(record) = entity.as_object_mut() {
        // Overwrites any existing value under the same variable name.
        record.insert(mv.variable.clone(), value);
    }
}
