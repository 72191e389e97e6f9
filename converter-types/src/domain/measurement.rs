//! Measurement records for the time-series metrics backend.

use std::collections::BTreeMap;

/// A single field value of a measurement.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Float(f64),
    Int(i64),
    Bool(bool),
    Str(String),
}

impl From<f64> for FieldValue {
    fn from(v: f64) -> Self {
        FieldValue::Float(v)
    }
}

impl From<i64> for FieldValue {
    fn from(v: i64) -> Self {
        FieldValue::Int(v)
    }
}

impl From<u16> for FieldValue {
    fn from(v: u16) -> Self {
        FieldValue::Int(i64::from(v))
    }
}

impl From<bool> for FieldValue {
    fn from(v: bool) -> Self {
        FieldValue::Bool(v)
    }
}

impl From<String> for FieldValue {
    fn from(v: String) -> Self {
        FieldValue::Str(v)
    }
}

impl From<&str> for FieldValue {
    fn from(v: &str) -> Self {
        FieldValue::Str(v.to_string())
    }
}

/// A named measurement with tags and fields.
///
/// Tags and fields are keyed maps ordered by key, so a record always
/// serializes the same way regardless of insertion order. The timestamp is
/// normally left unset and captured by the encoder.
#[derive(Debug, Clone, PartialEq)]
pub struct MeasurementRecord {
    name: String,
    tags: BTreeMap<String, String>,
    fields: BTreeMap<String, FieldValue>,
    timestamp_nanos: Option<i64>,
}

impl MeasurementRecord {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            tags: BTreeMap::new(),
            fields: BTreeMap::new(),
            timestamp_nanos: None,
        }
    }

    /// Adds a tag. A later tag with the same key replaces the earlier one.
    pub fn tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.tags.insert(key.into(), value.into());
        self
    }

    pub fn field(mut self, key: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    /// Adds a tag only when a value is present.
    pub fn tag_opt(self, key: impl Into<String>, value: Option<impl Into<String>>) -> Self {
        match value {
            Some(v) => self.tag(key, v),
            None => self,
        }
    }

    /// Adds a field only when a value is present.
    pub fn field_opt<V: Into<FieldValue>>(self, key: impl Into<String>, value: Option<V>) -> Self {
        match value {
            Some(v) => self.field(key, v),
            None => self,
        }
    }

    /// Pins the timestamp instead of letting the encoder capture it.
    pub fn at(mut self, timestamp_nanos: i64) -> Self {
        self.timestamp_nanos = Some(timestamp_nanos);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn tags(&self) -> &BTreeMap<String, String> {
        &self.tags
    }

    pub fn fields(&self) -> &BTreeMap<String, FieldValue> {
        &self.fields
    }

    pub fn timestamp_nanos(&self) -> Option<i64> {
        self.timestamp_nanos
    }

    pub fn tag_value(&self, key: &str) -> Option<&str> {
        self.tags.get(key).map(String::as_str)
    }

    pub fn field_value(&self, key: &str) -> Option<&FieldValue> {
        self.fields.get(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_orders_and_dedupes_keys() {
        let record = MeasurementRecord::new("conversion")
            .tag("to", "EUR")
            .tag("from", "USD")
            .tag("to", "GBP")
            .field("b", 1i64)
            .field("a", 2.5);

        let tag_keys: Vec<_> = record.tags().keys().cloned().collect();
        assert_eq!(tag_keys, vec!["from", "to"]);
        assert_eq!(record.tag_value("to"), Some("GBP"));

        let field_keys: Vec<_> = record.fields().keys().cloned().collect();
        assert_eq!(field_keys, vec!["a", "b"]);
    }

    #[test]
    fn test_field_opt_skips_missing_values() {
        let record = MeasurementRecord::new("m")
            .field_opt("present", Some(true))
            .field_opt::<i64>("missing", None);

        assert_eq!(record.field_value("present"), Some(&FieldValue::Bool(true)));
        assert!(record.field_value("missing").is_none());
    }

    #[test]
    fn test_timestamp_is_unset_by_default() {
        let record = MeasurementRecord::new("m");
        assert_eq!(record.timestamp_nanos(), None);
        assert_eq!(record.at(42).timestamp_nanos(), Some(42));
    }
}
