//! Feature space layout
//!
//! Describes the fixed column ordering shared by the stored feature table,
//! the nearest-neighbor index, the similarity matrix and every query vector:
//! numeric columns first (schema order), then one-hot columns (vocabulary order).

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

/// Ordered numeric and categorical fields of a raw record
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FeatureSchema {
    /// Numeric columns, min-max scaled, in vector order
    pub numeric: Vec<String>,
    /// Categorical fields, one-hot encoded through the vocabulary
    pub categorical: Vec<String>,
}

impl FeatureSchema {
    pub fn new(numeric: Vec<String>, categorical: Vec<String>) -> Self {
        Self { numeric, categorical }
    }

    /// Layout of the video game catalog model.
    ///
    /// `Year_of_Release` is a numeric attribute in the raw record but was
    /// one-hot encoded offline from its integer string form.
    pub fn video_games() -> Self {
        let owned = |cols: &[&str]| cols.iter().map(|c| c.to_string()).collect();
        Self {
            numeric: owned(&["NA_Sales", "EU_Sales", "JP_Sales", "Other_Sales", "User_Score"]),
            categorical: owned(&[
                "Name",
                "Platform",
                "Year_of_Release",
                "Genre",
                "Publisher",
                "Rating",
            ]),
        }
    }

    /// Token naming convention for one-hot columns
    pub fn token(field: &str, value: &str) -> String {
        format!("{field}_{value}")
    }

    /// The categorical field a vocabulary token belongs to, if any.
    /// Longest field name wins so `Year` and `Year_of_Release` cannot collide.
    pub fn field_of_token<'a>(&'a self, token: &str) -> Option<&'a str> {
        self.categorical
            .iter()
            .filter(|field| {
                token.len() > field.len()
                    && token.starts_with(field.as_str())
                    && token.as_bytes()[field.len()] == b'_'
            })
            .max_by_key(|field| field.len())
            .map(String::as_str)
    }
}

/// Min-max range of one numeric column
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ColumnScale {
    pub name: String,
    pub min: f32,
    pub max: f32,
}

impl ColumnScale {
    pub fn new(name: impl Into<String>, min: f32, max: f32) -> Self {
        Self { name: name.into(), min, max }
    }

    /// `(v - min) / (max - min)`, unclipped. A zero range scales by 1.
    #[inline]
    pub fn transform(&self, value: f32) -> f32 {
        let range = self.max - self.min;
        let range = if range == 0.0 { 1.0 } else { range };
        (value - self.min) / range
    }
}

/// Scaler parameters, one entry per numeric column in schema order
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(transparent)]
pub struct ScalerParams {
    columns: Vec<ColumnScale>,
}

impl ScalerParams {
    pub fn new(columns: Vec<ColumnScale>) -> Self {
        Self { columns }
    }

    pub fn columns(&self) -> &[ColumnScale] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

/// Ordered one-hot vocabulary of `<field>_<value>` tokens
#[derive(Debug, Clone, Default)]
pub struct Vocabulary {
    tokens: Vec<String>,
    positions: AHashMap<String, usize>,
}

impl Vocabulary {
    /// Build from tokens in training order. Duplicates keep their first position;
    /// snapshot validation rejects them before any query runs.
    pub fn new(tokens: Vec<String>) -> Self {
        let mut positions = AHashMap::with_capacity(tokens.len());
        for (idx, token) in tokens.iter().enumerate() {
            positions.entry(token.clone()).or_insert(idx);
        }
        Self { tokens, positions }
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    /// Column offset of a token within the one-hot block
    #[inline]
    pub fn position(&self, token: &str) -> Option<usize> {
        self.positions.get(token).copied()
    }

    pub(crate) fn has_duplicates(&self) -> bool {
        self.positions.len() != self.tokens.len()
    }
}

impl PartialEq for Vocabulary {
    fn eq(&self, other: &Self) -> bool {
        self.tokens == other.tokens
    }
}

impl Serialize for Vocabulary {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.tokens.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Vocabulary {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Vec::<String>::deserialize(deserializer).map(Vocabulary::new)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_video_games_layout() {
        let schema = FeatureSchema::video_games();
        assert_eq!(schema.numeric.len(), 5);
        assert_eq!(schema.numeric[0], "NA_Sales");
        assert_eq!(schema.categorical.len(), 6);
        assert!(schema.categorical.contains(&"Year_of_Release".to_string()));
    }

    #[test]
    fn test_field_of_token() {
        let schema = FeatureSchema::new(vec![], vec!["Year".into(), "Year_of_Release".into()]);
        assert_eq!(schema.field_of_token("Year_of_Release_2010"), Some("Year_of_Release"));
        assert_eq!(schema.field_of_token("Year_1999"), Some("Year"));
        assert_eq!(schema.field_of_token("Genre_Action"), None);
        assert_eq!(schema.field_of_token("Year_"), Some("Year"));
        assert_eq!(schema.field_of_token("Year"), None);
    }

    #[test]
    fn test_scale_extrapolates() {
        let scale = ColumnScale::new("NA_Sales", 0.0, 5.0);
        assert!((scale.transform(1.0) - 0.2).abs() < 1e-6);
        assert!((scale.transform(10.0) - 2.0).abs() < 1e-6);
        assert!((scale.transform(-5.0) + 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_zero_range_scale() {
        let scale = ColumnScale::new("User_Score", 3.0, 3.0);
        assert_eq!(scale.transform(3.0), 0.0);
        assert_eq!(scale.transform(4.5), 1.5);
    }

    #[test]
    fn test_vocabulary_positions() {
        let vocab = Vocabulary::new(vec!["Platform_Wii".into(), "Genre_Sports".into()]);
        assert_eq!(vocab.position("Genre_Sports"), Some(1));
        assert_eq!(vocab.position("Genre_Racing"), None);
        assert!(!vocab.has_duplicates());

        let dup = Vocabulary::new(vec!["Platform_Wii".into(), "Platform_Wii".into()]);
        assert!(dup.has_duplicates());
        assert_eq!(dup.position("Platform_Wii"), Some(0));
    }

    #[test]
    fn test_vocabulary_serializes_as_list() {
        let vocab = Vocabulary::new(vec!["Rating_E".into(), "Rating_T".into()]);
        let json = serde_json::to_string(&vocab).unwrap();
        assert_eq!(json, r#"["Rating_E","Rating_T"]"#);
        let parsed: Vocabulary = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.position("Rating_T"), Some(1));
    }
}
