//! Marital status canonicalization
//!
//! Generated payloads spell marital status many ways: under several alias
//! field names, and with French accented, unaccented, or English values.
//! This module consolidates the field under `situation_familiale` and maps
//! the value to a canonical token the calculation service understands.

use once_cell::sync::Lazy;
use serde_json::{Map, Value};
use std::collections::HashMap;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Alias field names in priority order. Only the first alias present on a
/// record is consolidated; any others are deliberately left alone
/// (single-pass policy).
const MARITAL_STATUS_KEYS: [&str; 4] = [
    "situation_familiale",
    "statut_marital",
    "situation_matrimoniale",
    "statut_matrimonial",
];

const CANONICAL_KEY: &str = "situation_familiale";

static MARITAL_STATUS_VARIANTS: Lazy<HashMap<String, &'static str>> = Lazy::new(|| {
    let groups: &[(&str, &[&str])] = &[
        ("celibataire", &["celibataire", "célibataire", "single", "seul"]),
        ("marie", &["marie", "marié", "mariee", "mariée", "married"]),
        ("pacse", &["pacse", "pacsé", "pacsée", "pacs"]),
        (
            "concubinage",
            &["concubinage", "concubine", "union libre", "vie maritale"],
        ),
        ("divorce", &["divorce", "divorcé", "divorcee", "divorcée"]),
        ("veuf", &["veuf", "veuve", "widow", "widower"]),
        (
            "separe",
            &["separe", "séparé", "separee", "séparée", "separation", "séparation"],
        ),
    ];

    let mut map = HashMap::new();
    for (canonical, variants) in groups {
        map.insert(fold(canonical), *canonical);
        for variant in *variants {
            map.insert(fold(variant), *canonical);
        }
    }
    map
});

/// Fold a value for lookup: NFD, strip combining marks, lowercase, keep
/// ASCII letters only ("Marié" → "marie", "union libre" → "unionlibre").
fn fold(value: &str) -> String {
    value
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
        .filter(|c| c.is_ascii_alphabetic())
        .collect()
}

/// Map a marital status spelling to its canonical token.
///
/// Unrecognized spellings pass through unchanged.
pub fn canonical_marital_status(value: &str) -> String {
    match MARITAL_STATUS_VARIANTS.get(&fold(value)) {
        Some(canonical) => (*canonical).to_string(),
        None => value.to_string(),
    }
}

/// Consolidate marital status fields on one individual's record.
///
/// The first alias key present (in priority order) is moved to
/// `situation_familiale` unless a non-null canonical value already exists
/// (first writer wins), then the canonical value is mapped through the
/// variant table: every period of a period-indexed value, or the scalar
/// string directly.
pub fn normalize_marital_status(record: &mut Map<String, Value>) {
    for key in MARITAL_STATUS_KEYS {
        if !record.contains_key(key) {
            continue;
        }

        if key != CANONICAL_KEY {
            let value = record.remove(key).unwrap_or(Value::Null);
            let canonical_present = record
                .get(CANONICAL_KEY)
                .map(|existing| !existing.is_null())
                .unwrap_or(false);
            if !canonical_present {
                record.insert(CANONICAL_KEY.to_string(), value);
            }
        }

        match record.get_mut(CANONICAL_KEY) {
            Some(Value::Object(periods)) => {
                for period_value in periods.values_mut() {
                    if let Some(s) = period_value.as_str() {
                        *period_value = Value::String(canonical_marital_status(s));
                    }
                }
            }
            Some(Value::String(s)) => {
                *s = canonical_marital_status(s);
            }
            _ => {}
        }

        // Only the first alias found is consolidated.
        break;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap_or_default()
    }

    #[test]
    fn accented_and_english_spellings_canonicalize() {
        assert_eq!(canonical_marital_status("Marié"), "marie");
        assert_eq!(canonical_marital_status("mariée"), "marie");
        assert_eq!(canonical_marital_status("married"), "marie");
        assert_eq!(canonical_marital_status("Célibataire"), "celibataire");
        assert_eq!(canonical_marital_status("single"), "celibataire");
        assert_eq!(canonical_marital_status("PACSÉ"), "pacse");
        assert_eq!(canonical_marital_status("union libre"), "concubinage");
        assert_eq!(canonical_marital_status("Veuve"), "veuf");
        assert_eq!(canonical_marital_status("widower"), "veuf");
        assert_eq!(canonical_marital_status("séparation"), "separe");
        assert_eq!(canonical_marital_status("Divorcée"), "divorce");
    }

    #[test]
    fn unknown_spellings_pass_through() {
        assert_eq!(canonical_marital_status("fiancé"), "fiancé");
        assert_eq!(canonical_marital_status(""), "");
    }

    #[test]
    fn alias_key_moves_to_canonical_field() {
        let mut rec = record(json!({"statut_marital": {"2024": "Marié"}}));
        normalize_marital_status(&mut rec);

        assert!(!rec.contains_key("statut_marital"));
        assert_eq!(rec["situation_familiale"], json!({"2024": "marie"}));
    }

    #[test]
    fn scalar_value_is_canonicalized_directly() {
        let mut rec = record(json!({"situation_matrimoniale": "Divorcée"}));
        normalize_marital_status(&mut rec);
        assert_eq!(rec["situation_familiale"], json!("divorce"));
    }

    #[test]
    fn existing_canonical_value_wins() {
        let mut rec = record(json!({
            "situation_familiale": "célibataire",
            "statut_marital": "marié"
        }));
        normalize_marital_status(&mut rec);

        // The canonical key is the highest-priority alias, so it is the one
        // processed; the other alias stays untouched.
        assert_eq!(rec["situation_familiale"], json!("celibataire"));
        assert_eq!(rec["statut_marital"], json!("marié"));
    }

    #[test]
    fn only_the_first_alias_is_consolidated() {
        let mut rec = record(json!({
            "statut_marital": "marié",
            "statut_matrimonial": "divorcé"
        }));
        normalize_marital_status(&mut rec);

        assert_eq!(rec["situation_familiale"], json!("marie"));
        assert!(!rec.contains_key("statut_marital"));
        // Lower-priority alias is left in place by the single-pass policy.
        assert_eq!(rec["statut_matrimonial"], json!("divorcé"));
    }

    #[test]
    fn null_canonical_value_short_circuits_the_pass() {
        let mut rec = record(json!({
            "situation_familiale": null,
            "statut_marital": "veuve"
        }));
        // The null canonical key is found first and left as-is by the
        // single-pass policy.
        normalize_marital_status(&mut rec);
        assert_eq!(rec["situation_familiale"], json!(null));
        assert_eq!(rec["statut_marital"], json!("veuve"));
    }

    #[test]
    fn non_string_period_values_are_untouched() {
        let mut rec = record(json!({"statut_marital": {"2024": 3}}));
        normalize_marital_status(&mut rec);
        assert_eq!(rec["situation_familiale"], json!({"2024": 3}));
    }

    #[test]
    fn records_without_marital_fields_are_untouched() {
        let mut rec = record(json!({"age": {"2024": 40}}));
        normalize_marital_status(&mut rec);
        assert_eq!(rec, record(json!({"age": {"2024": 40}})));
    }
}
