//! Named-Column Feature Matrix
//!
//! Dense f64 matrix with an ordered column-name header, one row per
//! record. `reindex` is the train/serve parity repair: it forces any
//! expanded matrix into the exact column set and order the classifiers
//! were fit on, zero-filling gaps and dropping extras.

use ndarray::Array2;

/// Dense numeric matrix with named, ordered columns.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureMatrix {
    columns: Vec<String>,
    values: Array2<f64>,
}

impl FeatureMatrix {
    /// Build from parts. Column count must match the value width.
    pub fn new(columns: Vec<String>, values: Array2<f64>) -> Self {
        debug_assert_eq!(columns.len(), values.ncols());
        Self { columns, values }
    }

    pub fn n_rows(&self) -> usize {
        self.values.nrows()
    }

    pub fn n_cols(&self) -> usize {
        self.values.ncols()
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn values(&self) -> &Array2<f64> {
        &self.values
    }

    /// Position of a column by name (O(n), columns are few)
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Cell lookup by row and column name.
    pub fn get(&self, row: usize, column: &str) -> Option<f64> {
        let col = self.column_index(column)?;
        self.values.get((row, col)).copied()
    }

    /// Reindex to the target column order.
    ///
    /// Columns absent from this matrix come out all-zero; columns this
    /// matrix has but the target does not name are dropped. The output
    /// header always equals `target` exactly.
    pub fn reindex(&self, target: &[String]) -> FeatureMatrix {
        let mut out = Array2::zeros((self.n_rows(), target.len()));
        for (dst, name) in target.iter().enumerate() {
            if let Some(src) = self.column_index(name) {
                out.column_mut(dst).assign(&self.values.column(src));
            }
        }
        FeatureMatrix {
            columns: target.to_vec(),
            values: out,
        }
    }
}
