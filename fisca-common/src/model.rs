//! Canonical payload model
//!
//! An OpenFisca calculation payload has exactly four recognized top-level
//! sections, one per entity type. Each section maps an entity id (a string,
//! unique within the section) to an entity record: a mapping from variable
//! name to either a scalar or a period-indexed object (`"2024"` or
//! `"2024-01"` keys mapping to scalars).
//!
//! `SectionKind` carries everything the normalizers need to know about a
//! section: its payload key, the prefix used when synthesizing entity ids,
//! the ordered list of inline fields an entity id may hide under, and the
//! fields whose values must always be sequences of entity ids.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The four canonical entity sections of a calculation payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SectionKind {
    /// Individuals (`individus`)
    #[serde(rename = "individus")]
    Individus,
    /// Households (`menages`)
    #[serde(rename = "menages")]
    Menages,
    /// Families (`familles`)
    #[serde(rename = "familles")]
    Familles,
    /// Tax households (`foyers_fiscaux`)
    #[serde(rename = "foyers_fiscaux")]
    FoyersFiscaux,
}

impl SectionKind {
    /// All sections in canonical declaration order.
    ///
    /// This order drives payload iteration everywhere, so move and
    /// unresolved reports are deterministic.
    pub const ALL: [SectionKind; 4] = [
        SectionKind::Individus,
        SectionKind::Menages,
        SectionKind::Familles,
        SectionKind::FoyersFiscaux,
    ];

    /// Top-level payload key for this section
    pub fn key(&self) -> &'static str {
        match self {
            SectionKind::Individus => "individus",
            SectionKind::Menages => "menages",
            SectionKind::Familles => "familles",
            SectionKind::FoyersFiscaux => "foyers_fiscaux",
        }
    }

    /// Prefix used when synthesizing an id for an entity supplied without one
    pub fn id_prefix(&self) -> &'static str {
        match self {
            SectionKind::Individus => "individu",
            SectionKind::Menages => "menage",
            SectionKind::Familles => "famille",
            SectionKind::FoyersFiscaux => "foyer_fiscal",
        }
    }

    /// Ordered candidate field names an inline entity id may be found under
    pub fn id_candidates(&self) -> &'static [&'static str] {
        match self {
            SectionKind::Individus => &["id", "identifiant", "identite", "nom", "name"],
            _ => &["id", "identifiant"],
        }
    }

    /// Fields whose values must always be sequences of entity ids
    pub fn relationship_fields(&self) -> &'static [&'static str] {
        match self {
            SectionKind::Individus => &[],
            SectionKind::Menages => &["personne_de_reference", "conjoint", "enfants"],
            SectionKind::Familles => &["parents", "enfants"],
            SectionKind::FoyersFiscaux => &["declarants", "personnes_a_charge"],
        }
    }

    /// Map a free-form entity-type label to its canonical section.
    ///
    /// Case-insensitive, accepts singular/plural and French/English
    /// spellings. Unknown or empty labels return `None`, never an error.
    pub fn from_entity_label(label: &str) -> Option<SectionKind> {
        if label.is_empty() {
            return None;
        }
        match label.to_lowercase().as_str() {
            "individu" | "individus" | "person" | "personne" => Some(SectionKind::Individus),
            "menage" | "menages" => Some(SectionKind::Menages),
            "famille" | "familles" => Some(SectionKind::Familles),
            "foyer_fiscal" | "foyers_fiscaux" => Some(SectionKind::FoyersFiscaux),
            _ => None,
        }
    }
}

impl fmt::Display for SectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}
