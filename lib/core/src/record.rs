use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A single raw attribute value as supplied by a caller
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum AttributeValue {
    Number(f64),
    Text(String),
    /// JSON booleans; not a valid kind for any schema field
    Flag(bool),
}

impl AttributeValue {
    pub fn kind_name(&self) -> &'static str {
        match self {
            AttributeValue::Number(_) => "number",
            AttributeValue::Text(_) => "text",
            AttributeValue::Flag(_) => "boolean",
        }
    }
}

impl From<f64> for AttributeValue {
    fn from(v: f64) -> Self {
        AttributeValue::Number(v)
    }
}

impl From<i64> for AttributeValue {
    fn from(v: i64) -> Self {
        AttributeValue::Number(v as f64)
    }
}

impl From<&str> for AttributeValue {
    fn from(v: &str) -> Self {
        AttributeValue::Text(v.to_string())
    }
}

impl From<String> for AttributeValue {
    fn from(v: String) -> Self {
        AttributeValue::Text(v)
    }
}

/// Raw attribute record for a custom profile, keyed by field name
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct RawRecord {
    fields: BTreeMap<String, AttributeValue>,
}

impl RawRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert
    #[must_use]
    pub fn with(mut self, field: impl Into<String>, value: impl Into<AttributeValue>) -> Self {
        self.insert(field, value);
        self
    }

    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<AttributeValue>) {
        self.fields.insert(field.into(), value.into());
    }

    pub fn get(&self, field: &str) -> Option<&AttributeValue> {
        self.fields.get(field)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_record_from_json() {
        let record: RawRecord = serde_json::from_value(json!({
            "Name": "Custom Game",
            "Platform": "Wii",
            "Year_of_Release": 2010,
            "NA_Sales": 1.0,
            "Online": true
        }))
        .unwrap();

        assert_eq!(record.len(), 5);
        assert_eq!(record.get("Platform"), Some(&AttributeValue::Text("Wii".into())));
        assert_eq!(record.get("Year_of_Release"), Some(&AttributeValue::Number(2010.0)));
        assert_eq!(record.get("Online").map(AttributeValue::kind_name), Some("boolean"));
    }

    #[test]
    fn test_builder() {
        let record = RawRecord::new().with("Genre", "Sports").with("User_Score", 7.5);
        assert_eq!(record.get("User_Score"), Some(&AttributeValue::Number(7.5)));
        assert!(record.get("Rating").is_none());
    }
}
