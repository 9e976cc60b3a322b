//! Immutable artifact context
//!
//! Every serving-time structure is loaded together and checked for mutual
//! consistency before the first query. Nothing here is mutated afterwards, so
//! an `Arc<ArtifactSnapshot>` is shared across requests without locking.

use crate::{
    Error, FeatureSchema, FeatureTable, NearestNeighborIndex, Result, ScalerParams,
    SimilarityMatrix, Vocabulary,
};
use ahash::AHashMap;
use tracing::info;

/// Tolerance for `sim[i][j]` vs `sim[j][i]`
const SYMMETRY_TOLERANCE: f32 = 1e-5;

/// Supplier of the offline-built artifacts.
///
/// Implementations return whole snapshots of each artifact; they are called
/// once per process through [`ArtifactSnapshot::load`].
pub trait ArtifactSource {
    type Error: From<Error>;

    fn get_schema(&self) -> std::result::Result<FeatureSchema, Self::Error>;
    fn get_feature_table(&self) -> std::result::Result<FeatureTable, Self::Error>;
    fn get_item_names(&self) -> std::result::Result<Vec<String>, Self::Error>;
    fn get_scaler_params(&self) -> std::result::Result<ScalerParams, Self::Error>;
    fn get_vocabulary(&self) -> std::result::Result<Vocabulary, Self::Error>;
    fn get_similarity_matrix(&self) -> std::result::Result<SimilarityMatrix, Self::Error>;
    fn get_nn_index(&self) -> std::result::Result<NearestNeighborIndex, Self::Error>;
}

/// Unvalidated artifacts as handed over by a loader
#[derive(Debug, Clone)]
pub struct ArtifactParts {
    pub schema: FeatureSchema,
    pub feature_table: FeatureTable,
    pub item_names: Vec<String>,
    pub scaler: ScalerParams,
    pub vocabulary: Vocabulary,
    pub similarity: SimilarityMatrix,
    pub nn_index: NearestNeighborIndex,
}

/// Validated, read-only serving context
#[derive(Debug)]
pub struct ArtifactSnapshot {
    schema: FeatureSchema,
    feature_table: FeatureTable,
    item_names: Vec<String>,
    name_index: AHashMap<String, usize>,
    scaler: ScalerParams,
    vocabulary: Vocabulary,
    similarity: SimilarityMatrix,
    nn_index: NearestNeighborIndex,
}

impl ArtifactSnapshot {
    /// Pull every artifact from `source` and validate them as one unit
    pub fn load<S: ArtifactSource>(source: &S) -> std::result::Result<Self, S::Error> {
        let parts = ArtifactParts {
            schema: source.get_schema()?,
            feature_table: source.get_feature_table()?,
            item_names: source.get_item_names()?,
            scaler: source.get_scaler_params()?,
            vocabulary: source.get_vocabulary()?,
            similarity: source.get_similarity_matrix()?,
            nn_index: source.get_nn_index()?,
        };
        Ok(Self::new(parts)?)
    }

    /// Validate the parts against each other. Any disagreement in item count,
    /// feature width or column ordering is an [`Error::ArtifactMismatch`].
    pub fn new(parts: ArtifactParts) -> Result<Self> {
        let ArtifactParts {
            schema,
            feature_table,
            item_names,
            scaler,
            vocabulary,
            similarity,
            nn_index,
        } = parts;

        let n = feature_table.len();
        let d = feature_table.dim();

        if item_names.len() != n {
            return Err(Error::mismatch(format!(
                "{} item names for {n} feature rows",
                item_names.len()
            )));
        }
        let mut name_index = AHashMap::with_capacity(n);
        for (idx, name) in item_names.iter().enumerate() {
            if name_index.insert(name.clone(), idx).is_some() {
                return Err(Error::mismatch(format!("duplicate item name '{name}'")));
            }
        }

        // Column layout
        if scaler.len() != schema.numeric.len() {
            return Err(Error::mismatch(format!(
                "scaler has {} columns, schema declares {} numeric columns",
                scaler.len(),
                schema.numeric.len()
            )));
        }
        for (pos, (col, expected)) in scaler.columns().iter().zip(&schema.numeric).enumerate() {
            if &col.name != expected {
                return Err(Error::mismatch(format!(
                    "scaler column {pos} is '{}', schema expects '{expected}'",
                    col.name
                )));
            }
            if !col.min.is_finite() || !col.max.is_finite() {
                return Err(Error::mismatch(format!(
                    "scaler column '{}' has a non-finite range",
                    col.name
                )));
            }
        }
        if vocabulary.has_duplicates() {
            return Err(Error::mismatch("vocabulary contains duplicate tokens"));
        }
        if let Some(token) = vocabulary
            .tokens()
            .iter()
            .find(|t| schema.field_of_token(t).is_none())
        {
            return Err(Error::mismatch(format!(
                "vocabulary token '{token}' matches no categorical field"
            )));
        }
        let expected_dim = schema.numeric.len() + vocabulary.len();
        if d != expected_dim {
            return Err(Error::mismatch(format!(
                "feature table has {d} columns, schema and vocabulary describe {expected_dim}"
            )));
        }
        if let Some((row, col)) = feature_table.matrix().first_non_finite() {
            return Err(Error::mismatch(format!(
                "feature table value at ({row}, {col}) is not finite"
            )));
        }

        // Similarity matrix
        if similarity.matrix().rows() != n || similarity.matrix().cols() != n {
            return Err(Error::mismatch(format!(
                "similarity matrix is {}x{}, catalog has {n} items",
                similarity.matrix().rows(),
                similarity.matrix().cols()
            )));
        }
        if let Some((row, col)) = similarity.matrix().first_non_finite() {
            return Err(Error::mismatch(format!(
                "similarity value at ({row}, {col}) is not finite"
            )));
        }
        if let Some((i, j)) = similarity.asymmetry(SYMMETRY_TOLERANCE) {
            return Err(Error::mismatch(format!(
                "similarity matrix is not symmetric at ({i}, {j})"
            )));
        }

        // Nearest-neighbor index must be fitted on exactly these rows, in this order
        if nn_index.len() != n || nn_index.dim() != d {
            return Err(Error::mismatch(format!(
                "nearest-neighbor index is {}x{}, feature table is {n}x{d}",
                nn_index.len(),
                nn_index.dim()
            )));
        }
        if let Some(row) = (0..n).find(|&i| nn_index.vectors().row(i) != feature_table.row(i)) {
            return Err(Error::mismatch(format!(
                "nearest-neighbor index row {row} differs from the feature table"
            )));
        }

        info!(items = n, dimension = d, vocabulary = vocabulary.len(), "artifact snapshot validated");

        Ok(Self {
            schema,
            feature_table,
            item_names,
            name_index,
            scaler,
            vocabulary,
            similarity,
            nn_index,
        })
    }

    pub fn schema(&self) -> &FeatureSchema {
        &self.schema
    }

    pub fn feature_table(&self) -> &FeatureTable {
        &self.feature_table
    }

    pub fn item_names(&self) -> &[String] {
        &self.item_names
    }

    pub fn scaler(&self) -> &ScalerParams {
        &self.scaler
    }

    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }

    pub fn similarity(&self) -> &SimilarityMatrix {
        &self.similarity
    }

    pub fn nn_index(&self) -> &NearestNeighborIndex {
        &self.nn_index
    }

    /// Catalog size N
    pub fn len(&self) -> usize {
        self.item_names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.item_names.is_empty()
    }

    /// Feature width D
    pub fn dim(&self) -> usize {
        self.feature_table.dim()
    }

    /// Catalog index of an item name
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.name_index.get(name).copied()
    }

    /// Hand the validated artifacts back, e.g. for re-serialization
    pub fn to_parts(&self) -> ArtifactParts {
        ArtifactParts {
            schema: self.schema.clone(),
            feature_table: self.feature_table.clone(),
            item_names: self.item_names.clone(),
            scaler: self.scaler.clone(),
            vocabulary: self.vocabulary.clone(),
            similarity: self.similarity.clone(),
            nn_index: self.nn_index.clone(),
        }
    }
}

impl ArtifactParts {
    /// Assemble parts from a schema, scaler, vocabulary and stored rows,
    /// deriving the similarity matrix and nearest-neighbor index from the rows.
    pub fn derive(
        schema: FeatureSchema,
        scaler: ScalerParams,
        vocabulary: Vocabulary,
        item_names: Vec<String>,
        feature_table: FeatureTable,
    ) -> Self {
        let similarity = SimilarityMatrix::from_feature_table(&feature_table);
        let nn_index = NearestNeighborIndex::fit(&feature_table);
        Self {
            schema,
            feature_table,
            item_names,
            scaler,
            vocabulary,
            similarity,
            nn_index,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ColumnScale, Matrix};

    fn parts() -> ArtifactParts {
        let schema = FeatureSchema::new(vec!["x".into()], vec!["Genre".into()]);
        let scaler = ScalerParams::new(vec![ColumnScale::new("x", 0.0, 10.0)]);
        let vocabulary = Vocabulary::new(vec!["Genre_Action".into(), "Genre_Sports".into()]);
        let table = FeatureTable::from_rows(&[
            vec![0.1, 1.0, 0.0],
            vec![0.5, 0.0, 1.0],
            vec![0.9, 1.0, 0.0],
        ])
        .unwrap();
        ArtifactParts::derive(
            schema,
            scaler,
            vocabulary,
            vec!["A".into(), "B".into(), "C".into()],
            table,
        )
    }

    fn mismatch(parts: ArtifactParts) -> String {
        match ArtifactSnapshot::new(parts) {
            Err(Error::ArtifactMismatch(msg)) => msg,
            other => panic!("expected mismatch, got {other:?}"),
        }
    }

    #[test]
    fn test_valid_snapshot() {
        let snapshot = ArtifactSnapshot::new(parts()).unwrap();
        assert_eq!(snapshot.len(), 3);
        assert_eq!(snapshot.dim(), 3);
        assert_eq!(snapshot.index_of("B"), Some(1));
        assert_eq!(snapshot.index_of("Z"), None);
    }

    #[test]
    fn test_name_count_mismatch() {
        let mut p = parts();
        p.item_names.pop();
        assert!(mismatch(p).contains("item names"));
    }

    #[test]
    fn test_duplicate_names() {
        let mut p = parts();
        p.item_names[2] = "A".into();
        assert!(mismatch(p).contains("duplicate item name"));
    }

    #[test]
    fn test_scaler_order_mismatch() {
        let mut p = parts();
        p.scaler = ScalerParams::new(vec![ColumnScale::new("y", 0.0, 1.0)]);
        assert!(mismatch(p).contains("scaler column 0"));
    }

    #[test]
    fn test_dimension_mismatch() {
        let mut p = parts();
        p.vocabulary = Vocabulary::new(vec!["Genre_Action".into()]);
        assert!(mismatch(p).contains("columns"));
    }

    #[test]
    fn test_foreign_token() {
        let mut p = parts();
        p.vocabulary = Vocabulary::new(vec!["Genre_Action".into(), "Platform_Wii".into()]);
        assert!(mismatch(p).contains("Platform_Wii"));
    }

    #[test]
    fn test_similarity_shape() {
        let mut p = parts();
        p.similarity = SimilarityMatrix::new(Matrix::new(2, 2, vec![1.0, 0.0, 0.0, 1.0]).unwrap());
        assert!(mismatch(p).contains("similarity matrix is 2x2"));
    }

    #[test]
    fn test_index_row_order() {
        let mut p = parts();
        let reordered = FeatureTable::from_rows(&[
            vec![0.5, 0.0, 1.0],
            vec![0.1, 1.0, 0.0],
            vec![0.9, 1.0, 0.0],
        ])
        .unwrap();
        p.nn_index = NearestNeighborIndex::fit(&reordered);
        assert!(mismatch(p).contains("row 0"));
    }

    #[test]
    fn test_non_finite_row() {
        let mut p = parts();
        let bad = FeatureTable::from_rows(&[
            vec![f32::INFINITY, 1.0, 0.0],
            vec![0.5, 0.0, 1.0],
            vec![0.9, 1.0, 0.0],
        ])
        .unwrap();
        p.nn_index = NearestNeighborIndex::fit(&bad);
        p.feature_table = bad;
        assert!(mismatch(p).contains("not finite"));
    }
}
