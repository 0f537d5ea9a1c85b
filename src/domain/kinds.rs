//! The kind registry: typed scalar tags for preference values.
//!
//! Every preference value lives in two representations: the serialized
//! string persisted and cached by the stores, and the deserialized JSON
//! value handed to API consumers. A [`Kind`] binds the two together and
//! guarantees `deserialize(serialize(v)) == v` for every value in the
//! kind's domain.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::error::KindError;

/// A named scalar type tag. Tags are ALLCAPS and at most 10 characters,
/// matching the column width of the persisted `kind` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Kind {
    Boolean,
    Integer,
    Number,
    Object,
    String,
}

impl Kind {
    pub const ALL: [Kind; 5] = [
        Kind::Boolean,
        Kind::Integer,
        Kind::Number,
        Kind::Object,
        Kind::String,
    ];

    pub fn tag(self) -> &'static str {
        match self {
            Kind::Boolean => "BOOLEAN",
            Kind::Integer => "INTEGER",
            Kind::Number => "NUMBER",
            Kind::Object => "OBJECT",
            Kind::String => "STRING",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Kind> {
        Self::ALL.into_iter().find(|kind| kind.tag() == tag)
    }

    /// Serialize a JSON value into the persisted string form.
    ///
    /// Fails with [`KindError::Type`] when the value is outside the kind's
    /// domain; this is the enforcement point that keeps ill-typed values out
    /// of the stores.
    pub fn serialize(self, value: &Value) -> Result<String, KindError> {
        match self {
            Kind::Boolean => match value {
                Value::Bool(true) => Ok("true".to_string()),
                Value::Bool(false) => Ok("false".to_string()),
                _ => Err(KindError::type_mismatch(self.tag())),
            },
            Kind::Integer => match value {
                Value::Number(n) if n.is_i64() || n.is_u64() => Ok(n.to_string()),
                _ => Err(KindError::type_mismatch(self.tag())),
            },
            Kind::Number => match value {
                Value::Number(n) => Ok(n.to_string()),
                _ => Err(KindError::type_mismatch(self.tag())),
            },
            // Any JSON value has a structured text encoding.
            Kind::Object => serde_json::to_string(value)
                .map_err(|err| KindError::decode(self.tag(), err.to_string())),
            Kind::String => match value {
                Value::String(s) => Ok(s.clone()),
                _ => Err(KindError::type_mismatch(self.tag())),
            },
        }
    }

    /// Deserialize the persisted string form back into a JSON value.
    ///
    /// BOOLEAN and STRING are total; the rest fail with a typed error on
    /// malformed input.
    pub fn deserialize(self, raw: &str) -> Result<Value, KindError> {
        match self {
            // Anything outside the truthy set is false, never an error.
            Kind::Boolean => {
                let truthy = matches!(raw.to_ascii_lowercase().as_str(), "1" | "on" | "true");
                Ok(Value::Bool(truthy))
            }
            Kind::Integer => raw
                .parse::<i64>()
                .map(Value::from)
                .map_err(|_| KindError::type_mismatch(self.tag())),
            Kind::Number => raw
                .parse::<f64>()
                .map(Value::from)
                .map_err(|_| KindError::type_mismatch(self.tag())),
            Kind::Object => serde_json::from_str(raw)
                .map_err(|err| KindError::decode(self.tag(), err.to_string())),
            Kind::String => Ok(Value::String(raw.to_string())),
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}
