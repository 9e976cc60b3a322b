//! # gamerec
//!
//! Content-based game recommendations over a fixed, offline-built feature space.
//!
//! Two ranking modes share one vector space:
//!
//! - **Distance**: exact Euclidean k-NN; scores are distances, lower is better
//! - **Similarity**: cosine similarity; scores are similarities, higher is better
//!
//! Queries are either a catalog item name (its stored row is reused and the item
//! itself is never returned) or a custom attribute profile vectorized with the
//! training-time scaler and one-hot vocabulary.
//!
//! ## Quick Start
//!
//! ### As a Server
//!
//! ```bash
//! gamerec serve --artifacts ./models --http-port 8080
//! ```
//!
//! ### As a Library
//!
//! ```rust,no_run
//! use gamerec::prelude::*;
//! use std::sync::Arc;
//!
//! let snapshot = FsArtifactStore::load_snapshot("./models").unwrap();
//! let recommender = Recommender::new(Arc::new(snapshot));
//!
//! let similar = recommender.recommend_by_name("Wii Sports", Mode::Similarity, 5).unwrap();
//!
//! let profile = RawRecord::new()
//!     .with("Name", "Custom Game")
//!     .with("Platform", "Wii")
//!     .with("Year_of_Release", 2010i64)
//!     .with("Genre", "Sports")
//!     .with("Publisher", "Nintendo")
//!     .with("NA_Sales", 1.0)
//!     .with("EU_Sales", 1.0)
//!     .with("JP_Sales", 1.0)
//!     .with("Other_Sales", 0.5)
//!     .with("User_Score", 7.5)
//!     .with("Rating", "E");
//! let nearest = recommender.recommend_by_profile(&profile, Mode::Distance, 5).unwrap();
//! ```
//!
//! ## Crate Structure
//!
//! - `gamerec-core` - schema, vectorizer, k-NN index, similarity matrix, recommender
//! - `gamerec-artifacts` - on-disk artifact bundle and load-once snapshot cell
//! - `gamerec-api` - REST API

// Re-export core types
pub use gamerec_core::{
    ArtifactParts, ArtifactSnapshot, ArtifactSource, AttributeValue, ColumnScale, Error,
    ErrorKind, FeatureSchema, FeatureTable, Mode, NearestNeighborIndex, Query, RawRecord,
    Recommendation, Recommendations, Recommender, Result, ScalerParams, ScoreOrder,
    SimilarityMatrix, Vector, Vectorizer, Vocabulary,
};

// Re-export artifact loading
pub use gamerec_artifacts::{write_bundle, FsArtifactStore, LoadError, SnapshotCell};

// Re-export API
pub use gamerec_api::RestApi;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        ArtifactSnapshot, Error, FsArtifactStore, Mode, RawRecord, Recommendations, Recommender,
        RestApi, Result, ScoreOrder, SnapshotCell, Vector,
    };
}
