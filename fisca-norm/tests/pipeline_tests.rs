//! End-to-end pipeline tests
//!
//! Feed the pipeline the kind of loosely-structured payload the upstream
//! generator produces and check the calculation-ready result.

mod helpers;

use fisca_norm::normalize_payload;
use fisca_norm::services::MetadataService;
use fisca_norm::ValidationError;
use helpers::FakeAuthority;
use serde_json::json;
use std::sync::Arc;

fn service(authority: FakeAuthority) -> MetadataService {
    MetadataService::new(Arc::new(authority))
}

#[tokio::test]
async fn loosely_structured_payload_is_fully_normalized() {
    let metadata = service(
        FakeAuthority::new()
            .with_variable("salaire_de_base", "individu")
            .with_variable("age", "individu")
            .with_variable("loyer", "menage"),
    );

    let mut payload = json!({
        "individus": [
            {"nom": "Jean", "statut_marital": {"2024": "Marié"}, "age": {"2024": 40}}
        ],
        "menages": [
            {
                "personne_de_reference": "Jean",
                "conjoint": null,
                "loyer": {"2024": 800},
                "salaire_de_base": {"2024": 12000}
            }
        ]
    });

    let report = normalize_payload(&mut payload, &metadata, false).await.unwrap();

    // Structural: arrays became maps, all four sections exist as objects.
    assert!(payload["individus"].is_object());
    assert!(payload["menages"].is_object());
    assert!(payload["familles"].is_object());
    assert!(payload["foyers_fiscaux"].is_object());

    // Value canonicalization: alias field and accented spelling.
    assert_eq!(
        payload["individus"]["Jean"]["situation_familiale"],
        json!({"2024": "marie"})
    );
    assert!(payload["individus"]["Jean"].get("statut_marital").is_none());

    // Relationship coercion.
    assert_eq!(payload["menages"]["menage_1"]["personne_de_reference"], json!(["Jean"]));
    assert_eq!(payload["menages"]["menage_1"]["conjoint"], json!([]));

    // Reclassification: the misplaced salary moved to the sole individual.
    assert_eq!(report.moves.len(), 1);
    assert_eq!(report.moves[0].variable, "salaire_de_base");
    assert_eq!(
        payload["individus"]["Jean"]["salaire_de_base"],
        json!({"2024": 12000})
    );
    assert!(payload["menages"]["menage_1"].get("salaire_de_base").is_none());
    assert_eq!(payload["menages"]["menage_1"]["loyer"], json!({"2024": 800}));
}

#[tokio::test]
async fn debug_mode_propagates_engine_failures() {
    let metadata = service(FakeAuthority::new().with_variable("age", "individu"));
    let mut payload = json!({
        "individus": {"jean": {}, "claire": {}},
        "menages": {"menage_1": {"age": {"2024-01": 40}}}
    });

    let err = normalize_payload(&mut payload, &metadata, true).await.unwrap_err();
    assert!(matches!(err, ValidationError::Unresolved(_)));
}

#[tokio::test]
async fn lenient_mode_returns_a_usable_payload_despite_ambiguity() {
    let metadata = service(FakeAuthority::new().with_variable("age", "individu"));
    let mut payload = json!({
        "individus": {"jean": {}, "claire": {}},
        "menages": {"menage_1": {"age": {"2024-01": 40}}}
    });

    let report = normalize_payload(&mut payload, &metadata, false).await.unwrap();
    assert_eq!(report.unresolved.len(), 1);
    assert_eq!(payload["menages"]["menage_1"]["age"], json!({"2024-01": 40}));
}

#[tokio::test]
async fn marital_status_is_normalized_for_every_individual() {
    let metadata = service(FakeAuthority::new());
    let mut payload = json!({
        "individus": {
            "jean": {"situation_matrimoniale": "Pacsé"},
            "claire": {"statut_marital": {"2024": "widow"}}
        }
    });

    normalize_payload(&mut payload, &metadata, false).await.unwrap();

    assert_eq!(payload["individus"]["jean"]["situation_familiale"], json!("pacse"));
    assert_eq!(
        payload["individus"]["claire"]["situation_familiale"],
        json!({"2024": "veuf"})
    );
}
