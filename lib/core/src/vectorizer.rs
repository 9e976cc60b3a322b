//! Raw record to feature vector
//!
//! Produces vectors in exactly the column order of the stored feature table:
//! scaled numeric columns in schema order, followed by one-hot columns in
//! vocabulary order.

use crate::{AttributeValue, ArtifactSnapshot, Error, FeatureSchema, RawRecord, Result, Vector};
use tracing::warn;

/// Converts raw attribute records into the snapshot's feature space
#[derive(Debug, Clone, Copy)]
pub struct Vectorizer<'a> {
    snapshot: &'a ArtifactSnapshot,
}

impl<'a> Vectorizer<'a> {
    pub fn new(snapshot: &'a ArtifactSnapshot) -> Self {
        Self { snapshot }
    }

    /// Width of every vector this vectorizer emits
    pub fn dim(&self) -> usize {
        self.snapshot.dim()
    }

    /// Vectorize a raw record.
    ///
    /// Every schema field must be present with the right kind. Numeric fields
    /// are min-max scaled without clipping. Categorical values whose token is
    /// not in the vocabulary contribute nothing.
    pub fn vectorize(&self, record: &RawRecord) -> Result<Vector> {
        let schema = self.snapshot.schema();
        let vocabulary = self.snapshot.vocabulary();
        let numeric_width = schema.numeric.len();

        let mut data = vec![0.0f32; self.dim()];

        for (slot, scale) in data.iter_mut().zip(self.snapshot.scaler().columns()) {
            let value = numeric_field(record, &scale.name)?;
            *slot = scale.transform(value as f32);
        }

        for field in &schema.categorical {
            let value = categorical_field(record, field)?;
            let token = FeatureSchema::token(field, &value);
            match vocabulary.position(&token) {
                Some(pos) => data[numeric_width + pos] = 1.0,
                None => warn!(field = %field, token = %token, "unseen category value dropped"),
            }
        }

        let vector = Vector::new(data);
        if !vector.is_finite() {
            return Err(Error::NonFinite("vectorized profile".to_string()));
        }
        Ok(vector)
    }
}

fn numeric_field(record: &RawRecord, field: &str) -> Result<f64> {
    match record.get(field) {
        None => Err(Error::MissingField(field.to_string())),
        Some(AttributeValue::Number(v)) => Ok(*v),
        Some(other) => Err(Error::WrongFieldKind {
            field: field.to_string(),
            expected: "number",
            got: other.kind_name(),
        }),
    }
}

/// Categorical values are text, or whole numbers rendered without a fraction
/// (release years are encoded as `Year_of_Release_2010`). Whole numbers must fit
/// in an `i64`.
fn categorical_field(record: &RawRecord, field: &str) -> Result<String> {
    match record.get(field) {
        None => Err(Error::MissingField(field.to_string())),
        Some(AttributeValue::Text(s)) => Ok(s.clone()),
        Some(AttributeValue::Number(v))
            if v.fract() == 0.0 && v.abs() < i64::MAX as f64 =>
        {
            Ok(format!("{}", *v as i64))
        }
        Some(other) => Err(Error::WrongFieldKind {
            field: field.to_string(),
            expected: "text or whole number",
            got: other.kind_name(),
        }),
    }
}
