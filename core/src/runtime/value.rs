#![deny(missing_docs)]

//! # Dynamic Values
//!
//! The value model of the emitted code: JSON-like wire values plus the typed values
//! (enum variants, class instances, maps with non-string keys) they decode into.

use crate::runtime::error::{RuntimeError, RuntimeResult};
use indexmap::IndexMap;
use serde_json::{Map as JsonMap, Number, Value as Json};

/// A dynamic value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Absent / `null`.
    Null,
    /// `bool`.
    Bool(bool),
    /// `int`.
    Int(i64),
    /// `double`.
    Double(f64),
    /// `String`.
    Str(String),
    /// `List`.
    List(Vec<Value>),
    /// `Map`; keys are strings on the wire and may be typed after decoding.
    Map(Vec<(Value, Value)>),
    /// An enum variant.
    Enum {
        /// Enum name.
        ty: String,
        /// Variant ordinal.
        ordinal: usize,
    },
    /// A class or extension instance.
    Object {
        /// Class or extension name.
        ty: String,
        /// Field values in declaration order.
        fields: IndexMap<String, Value>,
    },
}

impl Value {
    /// Shorthand for a string value.
    pub fn str(s: impl Into<String>) -> Self {
        Value::Str(s.into())
    }

    /// Shorthand for a string-keyed map.
    pub fn object<I, K>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, Value)>,
        K: Into<String>,
    {
        Value::Map(
            entries
                .into_iter()
                .map(|(k, v)| (Value::Str(k.into()), v))
                .collect(),
        )
    }

    /// Whether this is `Null`.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Short name of the value's shape, for error messages.
    pub fn kind(&self) -> String {
        match self {
            Value::Null => "null".into(),
            Value::Bool(_) => "bool".into(),
            Value::Int(_) => "int".into(),
            Value::Double(_) => "double".into(),
            Value::Str(_) => "String".into(),
            Value::List(_) => "List".into(),
            Value::Map(_) => "Map".into(),
            Value::Enum { ty, .. } => ty.clone(),
            Value::Object { ty, .. } => ty.clone(),
        }
    }

    /// Looks up a string key of a map. Missing keys read as `Null`.
    pub fn get(&self, key: &str) -> RuntimeResult<Value> {
        match self {
            Value::Map(entries) => Ok(entries
                .iter()
                .find(|(k, _)| matches!(k, Value::Str(s) if s == key))
                .map(|(_, v)| v.clone())
                .unwrap_or(Value::Null)),
            other => Err(RuntimeError::TypeMismatch {
                expected: "Map".into(),
                found: other.kind(),
            }),
        }
    }

    /// Converts a parsed JSON document.
    pub fn from_json(json: &Json) -> Self {
        match json {
            Json::Null => Value::Null,
            Json::Bool(b) => Value::Bool(*b),
            Json::Number(n) => match n.as_i64() {
                Some(i) => Value::Int(i),
                None => Value::Double(n.as_f64().unwrap_or(f64::NAN)),
            },
            Json::String(s) => Value::Str(s.clone()),
            Json::Array(items) => Value::List(items.iter().map(Value::from_json).collect()),
            Json::Object(map) => Value::Map(
                map.iter()
                    .map(|(k, v)| (Value::Str(k.clone()), Value::from_json(v)))
                    .collect(),
            ),
        }
    }

    /// Converts to JSON. Only wire values are encodable.
    pub fn to_json(&self) -> RuntimeResult<Json> {
        match self {
            Value::Null => Ok(Json::Null),
            Value::Bool(b) => Ok(Json::Bool(*b)),
            Value::Int(i) => Ok(Json::Number((*i).into())),
            Value::Double(d) => Number::from_f64(*d)
                .map(Json::Number)
                .ok_or_else(|| RuntimeError::NotEncodable(d.to_string())),
            Value::Str(s) => Ok(Json::String(s.clone())),
            Value::List(items) => items
                .iter()
                .map(Value::to_json)
                .collect::<RuntimeResult<Vec<_>>>()
                .map(Json::Array),
            Value::Map(entries) => {
                let mut map = JsonMap::new();
                for (k, v) in entries {
                    match k {
                        Value::Str(key) => {
                            map.insert(key.clone(), v.to_json()?);
                        }
                        other => {
                            return Err(RuntimeError::NotEncodable(format!(
                                "map key of type {}",
                                other.kind()
                            )))
                        }
                    }
                }
                Ok(Json::Object(map))
            }
            Value::Enum { ty, .. } | Value::Object { ty, .. } => {
                Err(RuntimeError::NotEncodable(format!("instance of {}", ty)))
            }
        }
    }

    /// Parses JSON text.
    pub fn parse(text: &str) -> RuntimeResult<Self> {
        serde_json::from_str::<Json>(text)
            .map(|json| Value::from_json(&json))
            .map_err(|e| RuntimeError::MalformedBody(e.to_string()))
    }

    /// Serializes to JSON text, preserving key order.
    pub fn to_json_string(&self) -> RuntimeResult<String> {
        Ok(self.to_json()?.to_string())
    }
}
