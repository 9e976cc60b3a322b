//! Recommendation engine
//!
//! Two ranking strategies over the same feature space:
//!
//! - [`Mode::Distance`]: exact Euclidean k-NN, score is a distance (lower is better)
//! - [`Mode::Similarity`]: cosine similarity, score is a similarity (higher is better)
//!
//! A query that resolves to a catalog entry never returns that entry. Exclusion
//! is by catalog index, so near-duplicates with identical scores stay eligible.

use crate::{kernels, ArtifactSnapshot, Error, RawRecord, Result, Vector, Vectorizer};
use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use tracing::debug;

/// Ranking strategy selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    #[serde(alias = "knn", alias = "euclidean")]
    Distance,
    #[serde(alias = "cosine")]
    Similarity,
}

impl Mode {
    pub fn score_order(self) -> ScoreOrder {
        self.strategy().score_order()
    }

    fn strategy(self) -> &'static dyn RankingStrategy {
        match self {
            Mode::Distance => &NearestNeighbors,
            Mode::Similarity => &CosineRanking,
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Distance => f.write_str("distance"),
            Mode::Similarity => f.write_str("similarity"),
        }
    }
}

impl FromStr for Mode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "distance" | "knn" | "euclidean" => Ok(Mode::Distance),
            "similarity" | "cosine" => Ok(Mode::Similarity),
            other => Err(format!("unknown mode '{other}' (expected distance or similarity)")),
        }
    }
}

/// Which direction of score means a better match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreOrder {
    LowerIsBetter,
    HigherIsBetter,
}

/// A resolved query: a catalog entry or a vector in the feature space
#[derive(Debug, Clone, Copy)]
pub enum Query<'a> {
    Item(usize),
    Vector(&'a [f32]),
}

impl Query<'_> {
    fn excluded(&self) -> Option<usize> {
        match self {
            Query::Item(idx) => Some(*idx),
            Query::Vector(_) => None,
        }
    }
}

/// Shared contract of the two ranking modes.
///
/// Returns `(catalog index, score)` pairs, best first, at most `k` long.
pub trait RankingStrategy: Send + Sync {
    fn score_order(&self) -> ScoreOrder;

    fn rank(&self, snapshot: &ArtifactSnapshot, query: Query<'_>, k: usize) -> Vec<(usize, f32)>;
}

/// Euclidean nearest neighbors through the snapshot's k-NN index
#[derive(Debug, Clone, Copy, Default)]
pub struct NearestNeighbors;

impl RankingStrategy for NearestNeighbors {
    fn score_order(&self) -> ScoreOrder {
        ScoreOrder::LowerIsBetter
    }

    fn rank(&self, snapshot: &ArtifactSnapshot, query: Query<'_>, k: usize) -> Vec<(usize, f32)> {
        let index = snapshot.nn_index();
        match query {
            Query::Item(idx) => {
                // One extra neighbor to absorb the self-match
                let mut hits = index.search(
                    snapshot.feature_table().row(idx),
                    k.saturating_add(1).min(index.len()),
                );
                hits.retain(|&(i, _)| i != idx);
                hits.truncate(k);
                hits
            }
            Query::Vector(v) => index.search(v, k),
        }
    }
}

/// Cosine ranking: precomputed matrix rows for catalog items, live scoring otherwise
#[derive(Debug, Clone, Copy, Default)]
pub struct CosineRanking;

impl RankingStrategy for CosineRanking {
    fn score_order(&self) -> ScoreOrder {
        ScoreOrder::HigherIsBetter
    }

    fn rank(&self, snapshot: &ArtifactSnapshot, query: Query<'_>, k: usize) -> Vec<(usize, f32)> {
        let table = snapshot.feature_table();
        let mut scored: Vec<(usize, f32)> = match query {
            Query::Item(idx) => snapshot
                .similarity()
                .row(idx)
                .iter()
                .copied()
                .enumerate()
                .filter(|&(i, _)| i != idx)
                .collect(),
            Query::Vector(v) => (0..table.len())
                .map(|i| (i, kernels::cosine(v, table.row(i))))
                .collect(),
        };

        // Stable sort keeps catalog order among equal similarities
        scored.sort_by_key(|&(_, score)| std::cmp::Reverse(OrderedFloat(score)));
        scored.truncate(k);
        scored
    }
}

/// One ranked result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub name: String,
    pub index: usize,
    pub score: f32,
}

/// Ranked results together with how to read their scores
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendations {
    pub mode: Mode,
    pub order: ScoreOrder,
    pub items: Vec<Recommendation>,
}

impl Recommendations {
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// `(name, score)` pairs in rank order
    pub fn pairs(&self) -> Vec<(&str, f32)> {
        self.items.iter().map(|r| (r.name.as_str(), r.score)).collect()
    }
}

/// Recommender over one immutable artifact snapshot
#[derive(Debug, Clone)]
pub struct Recommender {
    snapshot: Arc<ArtifactSnapshot>,
}

impl Recommender {
    pub fn new(snapshot: Arc<ArtifactSnapshot>) -> Self {
        Self { snapshot }
    }

    pub fn snapshot(&self) -> &ArtifactSnapshot {
        &self.snapshot
    }

    pub fn vectorizer(&self) -> Vectorizer<'_> {
        Vectorizer::new(&self.snapshot)
    }

    /// Catalog item names in catalog order
    pub fn item_names(&self) -> &[String] {
        self.snapshot.item_names()
    }

    /// Rank candidates for a resolved query
    pub fn recommend(&self, query: Query<'_>, mode: Mode, k: usize) -> Result<Recommendations> {
        if k == 0 {
            return Err(Error::InvalidLimit(k));
        }
        match query {
            Query::Item(idx) if idx >= self.snapshot.len() => {
                return Err(Error::ItemNotFound(format!("catalog index {idx}")));
            }
            Query::Vector(v) if v.len() != self.snapshot.dim() => {
                return Err(Error::InvalidDimension {
                    expected: self.snapshot.dim(),
                    actual: v.len(),
                });
            }
            Query::Vector(v) if v.iter().any(|x| !x.is_finite()) => {
                return Err(Error::NonFinite("query vector".to_string()));
            }
            _ => {}
        }

        let strategy = mode.strategy();
        let ranked = strategy.rank(&self.snapshot, query, k);
        debug!(%mode, k, returned = ranked.len(), excluded = ?query.excluded(), "ranked candidates");

        let names = self.snapshot.item_names();
        let items = ranked
            .into_iter()
            .map(|(index, score)| {
                if !score.is_finite() {
                    return Err(Error::NonFinite(format!("score for '{}'", names[index])));
                }
                Ok(Recommendation {
                    name: names[index].clone(),
                    index,
                    score,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Recommendations {
            mode,
            order: strategy.score_order(),
            items,
        })
    }

    /// Recommend items similar to a catalog entry, reusing its stored row
    pub fn recommend_by_name(&self, name: &str, mode: Mode, k: usize) -> Result<Recommendations> {
        let idx = self
            .snapshot
            .index_of(name)
            .ok_or_else(|| Error::ItemNotFound(name.to_string()))?;
        self.recommend(Query::Item(idx), mode, k)
    }

    /// Recommend items for a custom attribute profile
    pub fn recommend_by_profile(
        &self,
        record: &RawRecord,
        mode: Mode,
        k: usize,
    ) -> Result<Recommendations> {
        let vector = self.vectorizer().vectorize(record)?;
        self.recommend_by_vector(&vector, mode, k)
    }

    /// Recommend items for an already vectorized query
    pub fn recommend_by_vector(&self, vector: &Vector, mode: Mode, k: usize) -> Result<Recommendations> {
        self.recommend(Query::Vector(vector.as_slice()), mode, k)
    }
}
