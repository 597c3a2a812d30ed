//! Schema-Driven Feature Building
//!
//! Rebuilds the training-time feature matrix from canonical records:
//! rename record fields onto schema columns, derive calendar features,
//! default missing numerics, apply the stored scaler, expand categoricals
//! into indicator columns, then reindex to the exact trained column
//! order. Data-quality problems degrade (and are counted in the returned
//! report); only a missing schema aborts.

use std::collections::{HashMap, HashSet};

use ndarray::Array2;

use crate::constants::UNKNOWN_CATEGORY;
use crate::error::ScoringError;
use crate::logic::artifacts::schema::{ModelSchema, StandardScaler};
use crate::logic::features::calendar::{calendar_features, CalendarFeatures};
use crate::logic::features::matrix::FeatureMatrix;
use crate::logic::harmonize::CanonicalRecord;

// ============================================================================
// RECORD FIELD -> SCHEMA COLUMN NAMES
// ============================================================================

/// Schema column fed by the record's location field
pub const COL_COMUNA: &str = "Comuna";

/// Schema column fed by the record's región field
pub const COL_REGION: &str = "Región";

/// Schema column fed by the harmonized class label
pub const COL_CLASE: &str = "Claseaccid";

/// Schema column fed by the minor-injury count
pub const COL_LEVES: &str = "Leves";

/// Calendar feature columns derived from the incident date
pub const COL_YEAR: &str = "Año";
pub const COL_MONTH: &str = "Mes";
pub const COL_WEEKDAY: &str = "DiaSemana";

// ============================================================================
// BUILD REPORT
// ============================================================================

/// Degradation counts for one build call.
///
/// The builder stays pure; the pipeline folds this into its telemetry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BuildReport {
    /// Records in this build
    pub records: u64,
    /// Dates that failed to parse and took the fixed defaults
    pub date_fallbacks: u64,
    /// Record cells whose indicator column is not in the trained set
    pub unknown_categories: u64,
    /// Numeric cells the record could not supply, defaulted to 0
    pub missing_numeric_defaults: u64,
}

impl BuildReport {
    pub fn has_degradations(&self) -> bool {
        self.date_fallbacks > 0 || self.unknown_categories > 0 || self.missing_numeric_defaults > 0
    }
}

// ============================================================================
// BUILD
// ============================================================================

/// Build the aligned feature matrix for a batch of canonical records.
///
/// The output column list always equals `schema.feature_cols` exactly,
/// whatever categories the records carried. Fails only when the schema
/// is empty.
pub fn build_matrix(
    records: &[CanonicalRecord],
    schema: &ModelSchema,
    scaler: &StandardScaler,
) -> Result<(FeatureMatrix, BuildReport), ScoringError> {
    if schema.is_empty() {
        return Err(ScoringError::SchemaUnavailable);
    }

    let mut report = BuildReport {
        records: records.len() as u64,
        ..BuildReport::default()
    };

    // One date parse per record
    let calendars: Vec<CalendarFeatures> =
        records.iter().map(|r| calendar_features(&r.fecha)).collect();
    report.date_fallbacks = calendars.iter().filter(|c| c.fell_back).count() as u64;

    // Register expanded columns: numerics first, then indicators per
    // categorical column in value first-appearance order
    let mut columns: Vec<String> = schema.num_cols.clone();
    let mut col_index: HashMap<String, usize> = HashMap::with_capacity(columns.len());
    for (i, name) in columns.iter().enumerate() {
        col_index.insert(name.clone(), i);
    }
    for cat in &schema.cat_cols {
        for record in records {
            let name = ModelSchema::indicator_name(cat, &categorical_value(record, cat));
            if !col_index.contains_key(&name) {
                col_index.insert(name.clone(), columns.len());
                columns.push(name);
            }
        }
    }

    let mut values = Array2::zeros((records.len(), columns.len()));

    // Numeric block, scaled in schema order. The scaler is applied to
    // these columns only.
    for (j, name) in schema.num_cols.iter().enumerate() {
        for (i, record) in records.iter().enumerate() {
            let raw = match numeric_value(record, &calendars[i], name) {
                Some(v) => v,
                None => {
                    report.missing_numeric_defaults += 1;
                    0.0
                }
            };
            values[[i, j]] = scaler.transform_value(j, raw);
        }
    }

    // Indicator block
    let trained: HashSet<&str> = schema.feature_cols.iter().map(String::as_str).collect();
    for cat in &schema.cat_cols {
        for (i, record) in records.iter().enumerate() {
            let name = ModelSchema::indicator_name(cat, &categorical_value(record, cat));
            if !trained.contains(name.as_str()) {
                report.unknown_categories += 1;
            }
            if let Some(&j) = col_index.get(&name) {
                values[[i, j]] = 1.0;
            }
        }
    }

    let expanded = FeatureMatrix::new(columns, values);
    let aligned = expanded.reindex(&schema.feature_cols);
    Ok((aligned, report))
}

/// Categorical value a record supplies for a schema column.
///
/// Columns the record has no field for, and empty values, take the
/// unknown placeholder so expansion never sees an all-missing cell.
fn categorical_value(record: &CanonicalRecord, column: &str) -> String {
    let v = match column {
        COL_COMUNA => record.comuna.as_str(),
        COL_REGION => record.region.as_str(),
        COL_CLASE => record.claseaccid.as_str(),
        _ => "",
    };
    if v.is_empty() {
        UNKNOWN_CATEGORY.to_string()
    } else {
        v.to_string()
    }
}

/// Numeric value a record supplies for a schema column, pre-scaling.
/// `None` means the schema wants a column this record shape cannot feed.
fn numeric_value(record: &CanonicalRecord, cal: &CalendarFeatures, column: &str) -> Option<f64> {
    match column {
        COL_LEVES => Some(record.leves),
        COL_YEAR => Some(cal.year),
        COL_MONTH => Some(cal.month),
        COL_WEEKDAY => Some(cal.weekday),
        _ => None,
    }
}
