//! # gamerec core
//!
//! Feature vectorization and recommendation over a fixed, offline-built
//! feature space.
//!
//! - [`ArtifactSnapshot`] - validated immutable artifacts (feature table, names,
//!   scaler, vocabulary, similarity matrix, k-NN index)
//! - [`Vectorizer`] - raw attribute record to feature vector
//! - [`Recommender`] - distance or similarity ranking for a catalog item or a profile
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//! use gamerec_core::{
//!     ArtifactParts, ArtifactSnapshot, ColumnScale, FeatureSchema, FeatureTable,
//!     Mode, Recommender, ScalerParams, Vocabulary,
//! };
//!
//! let schema = FeatureSchema::new(vec!["x".into(), "y".into()], vec![]);
//! let scaler = ScalerParams::new(vec![
//!     ColumnScale::new("x", 0.0, 5.0),
//!     ColumnScale::new("y", 0.0, 5.0),
//! ]);
//! let table = FeatureTable::from_rows(&[vec![0.0, 0.0], vec![1.0, 1.0], vec![5.0, 5.0]]).unwrap();
//! let parts = ArtifactParts::derive(
//!     schema,
//!     scaler,
//!     Vocabulary::default(),
//!     vec!["A".into(), "B".into(), "C".into()],
//!     table,
//! );
//! let recommender = Recommender::new(Arc::new(ArtifactSnapshot::new(parts).unwrap()));
//!
//! let results = recommender.recommend_by_name("A", Mode::Distance, 2).unwrap();
//! assert_eq!(results.items[0].name, "B");
//! ```

pub mod engine;
pub mod error;
pub mod kernels;
pub mod knn;
pub mod matrix;
pub mod record;
pub mod schema;
pub mod snapshot;
pub mod vector;
pub mod vectorizer;

pub use engine::{
    CosineRanking, Mode, NearestNeighbors, Query, RankingStrategy, Recommendation,
    Recommendations, Recommender, ScoreOrder,
};
pub use error::{Error, ErrorKind, Result};
pub use knn::NearestNeighborIndex;
pub use matrix::{FeatureTable, Matrix, SimilarityMatrix};
pub use record::{AttributeValue, RawRecord};
pub use schema::{ColumnScale, FeatureSchema, ScalerParams, Vocabulary};
pub use snapshot::{ArtifactParts, ArtifactSnapshot, ArtifactSource};
pub use vector::Vector;
pub use vectorizer::Vectorizer;
