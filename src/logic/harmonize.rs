//! Input Vocabulary Harmonization
//!
//! Maps loosely-typed client fields onto the exact Spanish vocabulary the
//! classifiers were trained on (comunas upper-cased, región collapsed to
//! its canonical token, accident labels de-accented and title-cased).
//! Pure functions, no I/O. Harmonizing an already-canonical record is a
//! no-op; every categorical key downstream passes through here exactly once.

use std::collections::{HashMap, HashSet};

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

use crate::constants::DEFAULT_CLASS_LABEL;

// ============================================================================
// CANONICAL VOCABULARY (must match the trained artifacts exactly)
// ============================================================================

/// Canonical token for the Región Metropolitana, as it appears in training data
pub const REGION_METROPOLITANA: &str = "METROPOLITANA";

/// Región spellings collapsed onto [`REGION_METROPOLITANA`]
static REGION_SYNONYMS: Lazy<HashSet<&'static str>> =
    Lazy::new(|| HashSet::from(["RM", "REGION METROPOLITANA", "METROPOLITANA"]));

/// Accident-label synonyms, keyed by accent-stripped lower-case input
static ACCIDENT_SYNONYMS: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        ("colision", "Colision"),
        ("choque", "Colision"),
        ("atropello", "Atropello"),
        ("volcamiento", "Volcamiento"),
        ("incendio", "Incendio"),
        ("despiste", "Despiste"),
    ])
});

// ============================================================================
// RECORD TYPES
// ============================================================================

/// One incident exactly as the caller submitted it.
///
/// Locale-variant casing and accents are expected here; nothing has been
/// validated against the trained vocabulary yet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawRecord {
    /// Location identifier (comuna name or code)
    pub comuna: String,
    /// Región name, any spelling
    #[serde(default)]
    pub region: String,
    /// Accident-type label, free text
    #[serde(default)]
    pub tipo_accidente: String,
    /// Minor-injury count
    #[serde(default)]
    pub leves: f64,
    /// Incident date, "YYYY-MM-DD" expected
    pub fecha: String,
    /// Free-text class label, consulted only when no accident type is given
    #[serde(default)]
    pub clase_accid: Option<String>,
}

/// A [`RawRecord`] after harmonization.
///
/// Every field used as a categorical key later has been normalized here
/// exactly once. The date stays a string; parsing is deferred to the
/// feature builder so a bad date can degrade instead of failing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanonicalRecord {
    pub comuna: String,
    pub region: String,
    pub claseaccid: String,
    pub leves: f64,
    pub fecha: String,
}

// ============================================================================
// NORMALIZATION RULES
// ============================================================================

/// Decompose to NFD and drop combining marks ("Colisión" -> "Colision").
pub fn strip_accents(s: &str) -> String {
    s.nfd().filter(|c| !is_combining_mark(*c)).collect()
}

/// Upper-case, de-accented, trimmed location token.
pub fn normalize_comuna(raw: &str) -> String {
    strip_accents(raw).to_uppercase().trim().to_string()
}

/// Collapse known Metropolitana spellings onto the canonical token.
///
/// Unrecognized regiones pass through upper-cased, never rejected; the
/// alignment step absorbs unknown categories as zero indicator slices.
pub fn normalize_region(raw: &str) -> String {
    let v = strip_accents(raw).to_uppercase().trim().to_string();
    if REGION_SYNONYMS.contains(v.as_str()) {
        REGION_METROPOLITANA.to_string()
    } else {
        v
    }
}

/// Build the class label the schema expects from a free-text accident type.
///
/// De-accented and lower-cased for the synonym lookup; anything the table
/// does not know is title-cased word-wise instead.
pub fn normalize_accident_label(raw: &str) -> String {
    let stripped = strip_accents(raw).to_lowercase();
    let v = stripped.trim();
    match ACCIDENT_SYNONYMS.get(v) {
        Some(canonical) => (*canonical).to_string(),
        None => title_case(v),
    }
}

/// Word-wise title casing ("caida de vehiculo" -> "Caida De Vehiculo").
fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev_alpha = false;
    for c in s.chars() {
        if c.is_alphabetic() {
            if prev_alpha {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            prev_alpha = true;
        } else {
            out.push(c);
            prev_alpha = false;
        }
    }
    out
}

/// Harmonize one record. Pure, idempotent, never fails.
pub fn harmonize(raw: &RawRecord) -> CanonicalRecord {
    CanonicalRecord {
        comuna: normalize_comuna(&raw.comuna),
        region: normalize_region(&raw.region),
        claseaccid: derive_class_label(raw),
        leves: raw.leves,
        fecha: raw.fecha.trim().to_string(),
    }
}

/// Class-label precedence: accident type, then free-text class label,
/// then the fixed default.
fn derive_class_label(raw: &RawRecord) -> String {
    let tipo = raw.tipo_accidente.trim();
    if !tipo.is_empty() {
        return normalize_accident_label(tipo);
    }
    if let Some(clase) = raw.clase_accid.as_deref() {
        if !clase.trim().is_empty() {
            return normalize_accident_label(clase);
        }
    }
    DEFAULT_CLASS_LABEL.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(comuna: &str, region: &str, tipo: &str) -> RawRecord {
        RawRecord {
            comuna: comuna.to_string(),
            region: region.to_string(),
            tipo_accidente: tipo.to_string(),
            leves: 0.0,
            fecha: "2021-06-15".to_string(),
            clase_accid: None,
        }
    }

    #[test]
    fn test_strip_accents_removes_diacritics() {
        assert_eq!(strip_accents("Colisión"), "Colision");
        assert_eq!(strip_accents("Ñuñoa"), "Nunoa");
        assert_eq!(strip_accents("sin acentos"), "sin acentos");
    }

    #[test]
    fn test_comuna_upper_cased_and_trimmed() {
        assert_eq!(normalize_comuna("  Ñuñoa "), "NUNOA");
        assert_eq!(normalize_comuna("maipú"), "MAIPU");
    }

    #[test]
    fn test_region_synonyms_collapse() {
        assert_eq!(normalize_region("rm"), "METROPOLITANA");
        assert_eq!(normalize_region("Región Metropolitana"), "METROPOLITANA");
        assert_eq!(normalize_region("METROPOLITANA"), "METROPOLITANA");
    }

    #[test]
    fn test_unknown_region_passes_through_upper_cased() {
        assert_eq!(normalize_region("Valparaíso"), "VALPARAISO");
    }

    #[test]
    fn test_accident_synonyms() {
        assert_eq!(normalize_accident_label("CHOQUE"), "Colision");
        assert_eq!(normalize_accident_label("Colisión"), "Colision");
        assert_eq!(normalize_accident_label(" atropello "), "Atropello");
    }

    #[test]
    fn test_unmapped_label_title_cased() {
        assert_eq!(
            normalize_accident_label("caida de vehiculo"),
            "Caida De Vehiculo"
        );
    }

    #[test]
    fn test_class_label_precedence() {
        let mut r = raw("NUNOA", "RM", "");
        r.clase_accid = Some("choque".to_string());
        assert_eq!(harmonize(&r).claseaccid, "Colision");

        r.clase_accid = None;
        assert_eq!(harmonize(&r).claseaccid, DEFAULT_CLASS_LABEL);

        r.tipo_accidente = "volcamiento".to_string();
        assert_eq!(harmonize(&r).claseaccid, "Volcamiento");
    }

    #[test]
    fn test_harmonize_is_idempotent() {
        let first = harmonize(&raw(" Peñalolén ", "region metropolitana", "colisión"));
        let again = harmonize(&RawRecord {
            comuna: first.comuna.clone(),
            region: first.region.clone(),
            tipo_accidente: first.claseaccid.clone(),
            leves: first.leves,
            fecha: first.fecha.clone(),
            clase_accid: None,
        });
        assert_eq!(first, again);
    }
}
