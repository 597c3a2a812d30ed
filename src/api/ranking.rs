//! Comuna Fairness Ranking
//!
//! Fixed per-comuna fairness AUROC table, estimated offline from the
//! model evaluation report and shipped with the service. Nothing here
//! is computed at runtime; fairness evaluation itself happens in the
//! training pipeline.

use serde::{Deserialize, Serialize};

/// Default number of entries returned by the ranking query
pub const DEFAULT_RANKING_LIMIT: usize = 5;

/// Offline fairness AUROC per comuna, best first
const FAIRNESS_AUROC: &[(&str, f64)] = &[
    ("CURACAVI", 0.99),
    ("TILTIL", 0.98),
    ("PIRQUE", 0.98),
    ("ISLA DE MAIPO", 0.97),
    ("LO ESPEJO", 0.97),
    ("SAN JOSE DE MAIPO", 0.96),
    ("TALAGANTE", 0.95),
];

/// One comuna's offline fairness figure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComunaRanking {
    pub comuna: String,
    pub auroc: f64,
}

/// Top `limit` comunas by offline fairness AUROC.
pub fn comuna_ranking(limit: usize) -> Vec<ComunaRanking> {
    FAIRNESS_AUROC
        .iter()
        .take(limit)
        .map(|(comuna, auroc)| ComunaRanking {
            comuna: (*comuna).to_string(),
            auroc: *auroc,
        })
        .collect()
}
