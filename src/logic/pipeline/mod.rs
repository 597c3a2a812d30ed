//! Pipeline Orchestrator
//!
//! Sequences harmonization, feature building and the ensemble blend for
//! single records, batches and delimited tables, then buckets scores
//! into risk levels. The single place where structural problems (no
//! snapshot, missing required columns) become caller-visible errors;
//! data-quality problems only move counters.

pub mod types;

use std::io::Read;
use std::sync::Arc;

use crate::error::ScoringError;
use crate::logic::artifacts::ArtifactStore;
use crate::logic::features::build_matrix;
use crate::logic::harmonize::{harmonize, CanonicalRecord, RawRecord};
use crate::logic::model::blend;
use crate::logic::telemetry::{ScoringTelemetry, TelemetrySnapshot};

use self::types::{BatchInput, PredictionResult};

/// Columns a delimited table must carry; anything else is optional.
pub const REQUIRED_TABLE_COLUMNS: [&str; 3] = ["comuna", "tipo_accidente", "fecha"];

/// Request-facing scoring front. One instance per process, shared
/// across concurrent requests; all state is the read-only artifact
/// snapshot plus atomic counters.
pub struct Pipeline {
    store: Arc<ArtifactStore>,
    telemetry: ScoringTelemetry,
}

impl Pipeline {
    pub fn new(store: Arc<ArtifactStore>) -> Self {
        Self {
            store,
            telemetry: ScoringTelemetry::new(),
        }
    }

    pub fn store(&self) -> &ArtifactStore {
        &self.store
    }

    pub fn telemetry_snapshot(&self) -> TelemetrySnapshot {
        self.telemetry.snapshot()
    }

    /// Score one record.
    pub fn predict_single(&self, record: &RawRecord) -> Result<PredictionResult, ScoringError> {
        let scores = self.score_records(std::slice::from_ref(record))?;
        Ok(PredictionResult::new(scores[0], record))
    }

    /// Score a batch, echoing each originating record in its result.
    pub fn predict_batch(&self, batch: &BatchInput) -> Result<Vec<PredictionResult>, ScoringError> {
        let scores = self.score_records(&batch.accidents)?;
        Ok(batch
            .accidents
            .iter()
            .zip(scores)
            .map(|(record, score)| PredictionResult::new(score, record))
            .collect())
    }

    /// Score a delimited table from any reader.
    ///
    /// The whole table is rejected before any row is scored when a
    /// required column is absent; unknown extra columns are ignored.
    pub fn predict_table<R: Read>(&self, reader: R) -> Result<Vec<PredictionResult>, ScoringError> {
        let (records, malformed_numeric) = read_table(reader)?;
        if malformed_numeric > 0 {
            self.telemetry.note_missing_numeric(malformed_numeric);
            log::debug!("{malformed_numeric} unparseable numeric cells defaulted to 0");
        }
        let scores = self.score_records(&records)?;
        Ok(records
            .iter()
            .zip(scores)
            .map(|(record, score)| PredictionResult::new(score, record))
            .collect())
    }

    fn score_records(&self, records: &[RawRecord]) -> Result<Vec<f64>, ScoringError> {
        let bundle = self
            .store
            .snapshot()
            .ok_or(ScoringError::ModelsUnavailable)?;

        let canonical: Vec<CanonicalRecord> = records.iter().map(harmonize).collect();
        let (matrix, report) = build_matrix(&canonical, &bundle.schema, &bundle.scaler)?;
        self.telemetry.record_build(&report);
        if report.has_degradations() {
            log::debug!(
                "scored {} records with degradations: {} date fallbacks, {} unknown categories, {} defaulted numerics",
                report.records,
                report.date_fallbacks,
                report.unknown_categories,
                report.missing_numeric_defaults
            );
        }

        Ok(blend(&bundle.lreg, &bundle.rf, matrix.values().view()))
    }
}

// ============================================================================
// DELIMITED INPUT
// ============================================================================

/// Read records out of a delimited table, leniently.
///
/// Returns the records plus the count of numeric cells that failed to
/// parse and were defaulted. Only structural problems error: required
/// columns absent, or the reader itself failing.
fn read_table<R: Read>(reader: R) -> Result<(Vec<RawRecord>, u64), ScoringError> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = rdr.headers()?.clone();
    let position = |name: &str| headers.iter().position(|h| h == name);

    let comuna_col = position("comuna");
    let tipo_col = position("tipo_accidente");
    let fecha_col = position("fecha");

    let (comuna_col, tipo_col, fecha_col) = match (comuna_col, tipo_col, fecha_col) {
        (Some(c), Some(t), Some(f)) => (c, t, f),
        _ => {
            let missing = REQUIRED_TABLE_COLUMNS
                .iter()
                .filter(|name| position(name).is_none())
                .map(|name| name.to_string())
                .collect();
            return Err(ScoringError::MissingColumns(missing));
        }
    };

    let region_col = position("region");
    let leves_col = position("leves");
    let clase_col = position("clase_accid");

    let mut records = Vec::new();
    let mut malformed_numeric = 0u64;
    for row in rdr.records() {
        let row = row?;
        let cell = |col: usize| row.get(col).unwrap_or("");
        let optional_cell = |col: Option<usize>| col.map(cell).unwrap_or("");

        let leves = match leves_col.map(cell) {
            None => 0.0,
            Some(s) if s.is_empty() => 0.0,
            Some(s) => match s.parse::<f64>() {
                Ok(v) => v,
                Err(_) => {
                    malformed_numeric += 1;
                    0.0
                }
            },
        };

        records.push(RawRecord {
            comuna: cell(comuna_col).to_string(),
            region: optional_cell(region_col).to_string(),
            tipo_accidente: cell(tipo_col).to_string(),
            leves,
            fecha: cell(fecha_col).to_string(),
            clase_accid: clase_col.map(cell).filter(|s| !s.is_empty()).map(String::from),
        });
    }

    Ok((records, malformed_numeric))
}

#[cfg(test)]
mod tests {
    use super::types::RiskLevel;
    use super::*;
    use crate::constants::{BUNDLE_FILE, LREG_MODEL_FILE, RF_MODEL_FILE, SCALER_FILE};
    use crate::logic::artifacts::schema::{
        ModelMetrics, ModelSchema, SchemaBundle, StandardScaler,
    };
    use crate::logic::artifacts::ArtifactBundle;
    use crate::logic::model::{DecisionTree, ForestModel, LogisticModel, TreeNode};
    use chrono::Utc;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn cols(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    fn fixture_schema() -> ModelSchema {
        ModelSchema {
            num_cols: cols(&["Leves", "Año", "Mes", "DiaSemana"]),
            cat_cols: cols(&["Comuna", "Región", "Claseaccid"]),
            feature_cols: cols(&[
                "Leves",
                "Año",
                "Mes",
                "DiaSemana",
                "Comuna_NUNOA",
                "Región_METROPOLITANA",
                "Claseaccid_Colision",
            ]),
        }
    }

    fn fixture_lreg() -> LogisticModel {
        // All-zero weights: always 0.5
        LogisticModel {
            model_name: "LogisticRegression".to_string(),
            n_features: 7,
            coefficients: vec![0.0; 7],
            intercept: 0.0,
        }
    }

    fn fixture_rf() -> ForestModel {
        // Single leaf, 3 of 4 positive: always 0.75
        ForestModel {
            model_name: "RandomForestClassifier".to_string(),
            n_features: 7,
            trees: vec![DecisionTree {
                nodes: vec![TreeNode {
                    feature: -1,
                    threshold: 0.0,
                    left: -1,
                    right: -1,
                    value: [1.0, 3.0],
                }],
            }],
        }
    }

    fn fixture_bundle() -> ArtifactBundle {
        ArtifactBundle {
            lreg: fixture_lreg(),
            rf: fixture_rf(),
            scaler: StandardScaler::identity(4),
            schema: fixture_schema(),
            metrics: ModelMetrics {
                auroc: Some(0.88),
                auprc: Some(0.36),
                brier_score: None,
            },
            loaded_at: Utc::now(),
            source_dir: PathBuf::from("models"),
        }
    }

    fn ready_pipeline() -> Pipeline {
        let store = Arc::new(ArtifactStore::new());
        store.publish_for_tests(fixture_bundle());
        Pipeline::new(store)
    }

    fn raw(comuna: &str) -> RawRecord {
        RawRecord {
            comuna: comuna.to_string(),
            region: "RM".to_string(),
            tipo_accidente: "choque".to_string(),
            leves: 1.0,
            fecha: "2021-06-15".to_string(),
            clase_accid: None,
        }
    }

    /// Fixture models blend to 0.5 * 0.5 + 0.5 * 0.75
    const FIXTURE_SCORE: f64 = 0.625;

    #[test]
    fn test_single_prediction_end_to_end() {
        let pipeline = ready_pipeline();
        let result = pipeline.predict_single(&raw("Ñuñoa")).unwrap();
        assert!((result.risk_score - FIXTURE_SCORE).abs() < 1e-12);
        assert_eq!(result.risk_level, RiskLevel::High);
        assert_eq!(result.drivers[0], "Comuna: Ñuñoa");
        assert_eq!(pipeline.telemetry_snapshot().records_scored, 1);
    }

    #[test]
    fn test_single_prediction_is_deterministic() {
        let pipeline = ready_pipeline();
        let a = pipeline.predict_single(&raw("Ñuñoa")).unwrap();
        let b = pipeline.predict_single(&raw("Ñuñoa")).unwrap();
        assert_eq!(a.risk_score, b.risk_score);
    }

    #[test]
    fn test_batch_echoes_each_input() {
        let pipeline = ready_pipeline();
        let batch = BatchInput {
            accidents: vec![raw("Ñuñoa"), raw("Maipú")],
        };
        let results = pipeline.predict_batch(&batch).unwrap();
        assert_eq!(results.len(), 2);
        for (result, record) in results.iter().zip(&batch.accidents) {
            assert_eq!(&result.input_data, record);
            assert!((result.risk_score - FIXTURE_SCORE).abs() < 1e-12);
        }
    }

    #[test]
    fn test_empty_batch_is_empty_result() {
        let pipeline = ready_pipeline();
        let results = pipeline
            .predict_batch(&BatchInput { accidents: vec![] })
            .unwrap();
        assert!(results.is_empty());
    }

    #[test]
    fn test_unavailable_store_fails_fast() {
        let pipeline = Pipeline::new(Arc::new(ArtifactStore::new()));

        let err = pipeline.predict_single(&raw("Ñuñoa")).unwrap_err();
        assert!(matches!(err, ScoringError::ModelsUnavailable));

        let err = pipeline
            .predict_batch(&BatchInput {
                accidents: vec![raw("Ñuñoa")],
            })
            .unwrap_err();
        assert!(matches!(err, ScoringError::ModelsUnavailable));

        let err = pipeline
            .predict_table("comuna,tipo_accidente,fecha\nNUNOA,choque,2021-06-15\n".as_bytes())
            .unwrap_err();
        assert!(matches!(err, ScoringError::ModelsUnavailable));
    }

    #[test]
    fn test_table_scores_with_optional_columns_defaulted() {
        let pipeline = ready_pipeline();
        let csv = "comuna,tipo_accidente,fecha\n\
                   Ñuñoa,choque,2021-06-15\n\
                   Maipú,atropello,2021-07-02\n";
        let results = pipeline.predict_table(csv.as_bytes()).unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].input_data.region, "");
        assert_eq!(results[0].input_data.leves, 0.0);
        assert!((results[1].risk_score - FIXTURE_SCORE).abs() < 1e-12);
    }

    #[test]
    fn test_table_with_extra_columns_accepted() {
        let pipeline = ready_pipeline();
        let csv = "velocidad,comuna,tipo_accidente,region,leves,fecha\n\
                   120,NUNOA,colision,RM,2,2021-06-15\n";
        let results = pipeline.predict_table(csv.as_bytes()).unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].input_data.leves, 2.0);
        assert_eq!(results[0].input_data.region, "RM");
    }

    #[test]
    fn test_table_missing_required_column_rejected_before_scoring() {
        let pipeline = ready_pipeline();
        let csv = "tipo_accidente,fecha\nchoque,2021-06-15\n";
        let err = pipeline.predict_table(csv.as_bytes()).unwrap_err();
        match err {
            ScoringError::MissingColumns(missing) => {
                assert_eq!(missing, vec!["comuna".to_string()]);
            }
            other => panic!("expected MissingColumns, got {other:?}"),
        }
        // Nothing was scored
        assert_eq!(pipeline.telemetry_snapshot().records_scored, 0);
    }

    #[test]
    fn test_table_unparseable_count_defaults_and_is_counted() {
        let pipeline = ready_pipeline();
        let csv = "comuna,tipo_accidente,fecha,leves\n\
                   NUNOA,colision,2021-06-15,tres\n";
        let results = pipeline.predict_table(csv.as_bytes()).unwrap();
        assert_eq!(results[0].input_data.leves, 0.0);
        assert_eq!(pipeline.telemetry_snapshot().missing_numeric_defaults, 1);
    }

    #[test]
    fn test_degradation_counters_reach_telemetry() {
        let pipeline = ready_pipeline();
        let mut record = raw("COMUNA INEXISTENTE");
        record.fecha = "no-date".to_string();
        pipeline.predict_single(&record).unwrap();

        let snap = pipeline.telemetry_snapshot();
        assert_eq!(snap.date_fallbacks, 1);
        // Unknown comuna only; región and clase are in the trained set
        assert_eq!(snap.unknown_categories, 1);
    }

    #[test]
    fn test_load_and_score_from_directory() {
        let dir = TempDir::new().unwrap();
        let write = |name: &str, json: String| {
            std::fs::write(dir.path().join(name), json).unwrap();
        };
        write(LREG_MODEL_FILE, serde_json::to_string(&fixture_lreg()).unwrap());
        write(RF_MODEL_FILE, serde_json::to_string(&fixture_rf()).unwrap());
        write(
            SCALER_FILE,
            serde_json::to_string(&StandardScaler::identity(4)).unwrap(),
        );
        write(
            BUNDLE_FILE,
            serde_json::to_string(&SchemaBundle {
                schema: fixture_schema(),
                metrics: ModelMetrics {
                    auroc: Some(0.88),
                    auprc: Some(0.36),
                    brier_score: None,
                },
                layout_hash: None,
            })
            .unwrap(),
        );

        let store = Arc::new(ArtifactStore::new());
        store.load(dir.path()).unwrap();
        let pipeline = Pipeline::new(store);

        let result = pipeline.predict_single(&raw("Ñuñoa")).unwrap();
        assert!((result.risk_score - FIXTURE_SCORE).abs() < 1e-12);
        assert_eq!(result.risk_level, RiskLevel::High);
    }
}
