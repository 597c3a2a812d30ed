//! Features Module - Training-Schema Reconstruction
//!
//! Turns canonical records into the exact numeric matrix the classifiers
//! were fit on. Calendar derivation, numeric scaling and categorical
//! expansion live in their own files; `builder` sequences them and
//! `matrix::FeatureMatrix::reindex` enforces the trained column order.

pub mod builder;
pub mod calendar;
pub mod matrix;


// Re-export common types
pub use builder::{build_matrix, BuildReport};
pub use calendar::{calendar_features, CalendarFeatures};
pub use matrix::FeatureMatrix;
