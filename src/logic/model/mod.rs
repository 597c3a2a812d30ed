//! Model Module - Ensemble Inference
//!
//! Pure-Rust evaluation of the two exported classifiers plus the fixed
//! ensemble blend. No training, no fitting; parameters come from the
//! artifact files and are immutable after load.

pub mod ensemble;
pub mod forest;
pub mod linear;

// Re-export common types
pub use ensemble::{blend, Classifier};
pub use forest::{DecisionTree, ForestModel, TreeNode};
pub use linear::LogisticModel;
