//! Structural normalization of raw payloads
//!
//! Generated payloads arrive with sections in whatever shape the upstream
//! text-to-JSON generator produced: arrays of entities, proper objects, or
//! junk values. After normalization every canonical section is an object
//! mapping entity id to record, and every declared relationship field holds
//! a sequence of entity ids.

use fisca_common::SectionKind;
use serde_json::{Map, Value};

/// Normalize the four canonical sections of a payload in place.
///
/// - An array becomes an object: entity ids are taken from the first
///   non-empty inline id candidate (trimmed), or synthesized as
///   `{prefix}_{n}` over kept items; id-candidate fields are removed from
///   the record. Non-object items are dropped.
/// - An object is kept structurally as-is.
/// - Anything else (null, scalar, missing section) becomes an empty object.
///
/// Relationship fields present on an entity are coerced to sequences:
/// null → `[]`, sequences keep order but drop null and empty-string
/// entries, scalars are wrapped.
pub fn normalize_entities(payload: &mut Value) {
    let Some(root) = payload.as_object_mut() else {
        return;
    };

    for section in SectionKind::ALL {
        let replacement = match root.get(section.key()) {
            Some(Value::Object(_)) => None,
            Some(Value::Array(items)) => Some(Value::Object(entity_array_to_map(items, section))),
            _ => Some(Value::Object(Map::new())),
        };
        if let Some(value) = replacement {
            root.insert(section.key().to_string(), value);
        }

        if let Some(entities) = root.get_mut(section.key()).and_then(Value::as_object_mut) {
            coerce_relationship_fields(entities, section.relationship_fields());
        }
    }
}

fn entity_array_to_map(items: &[Value], section: SectionKind) -> Map<String, Value> {
    let mut result = Map::new();
    let mut position = 0usize;

    for item in items {
        let Some(fields) = item.as_object() else {
            continue;
        };
        position += 1;

        let mut record = fields.clone();
        let id = extract_entity_id(&record, section)
            .unwrap_or_else(|| format!("{}_{}", section.id_prefix(), position));
        for candidate in section.id_candidates() {
            record.remove(*candidate);
        }

        // Later duplicates overwrite earlier ones; synthesized ids are
        // unique by construction.
        result.insert(id, Value::Object(record));
    }

    result
}

fn extract_entity_id(record: &Map<String, Value>, section: SectionKind) -> Option<String> {
    for candidate in section.id_candidates() {
        if let Some(value) = record.get(*candidate).and_then(Value::as_str) {
            let trimmed = value.trim();
            if !trimmed.is_empty() {
                return Some(trimmed.to_string());
            }
        }
    }
    None
}

fn coerce_relationship_fields(entities: &mut Map<String, Value>, fields: &[&str]) {
    if fields.is_empty() {
        return;
    }

    for entity in entities.values_mut() {
        let Some(record) = entity.as_object_mut() else {
            continue;
        };

        for field in fields {
            let Some(value) = record.get_mut(*field) else {
                continue;
            };

            match value {
                Value::Null => *value = Value::Array(Vec::new()),
                Value::Array(items) => {
                    items.retain(|item| {
                        !item.is_null() && item.as_str().map(|s| !s.is_empty()).unwrap_or(true)
                    });
                }
                _ => *value = Value::Array(vec![value.take()]),
            }
        }
    }
}
