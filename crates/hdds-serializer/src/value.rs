// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Dynamic values exchanged with the engine.
//!
//! The same [`Value`] type carries wire data (what a transport hands over)
//! and internal data (what a consumer works with). Record instances produced
//! by deserialization are [`Value::Record`]; opaque payloads are either
//! in-memory [`Value::Bytes`] or single-pass [`Value::Stream`] sources.

use crate::composite::RecordValue;
use crate::error::SerializationError;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use parking_lot::Mutex;
use std::fmt;
use std::io::{self, Read};
use std::sync::Arc;

/// A dynamic value.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    /// Opaque in-memory payload.
    Bytes(Vec<u8>),
    /// Opaque file-like payload, readable once.
    Stream(ByteSource),
    List(Vec<Value>),
    /// Key/value entries in insertion order. Keys are unique.
    Map(Vec<(Value, Value)>),
    Record(RecordValue),
}

impl Value {
    /// Build a map from key/value pairs.
    pub fn map<K, V, I>(entries: I) -> Self
    where
        K: Into<Value>,
        V: Into<Value>,
        I: IntoIterator<Item = (K, V)>,
    {
        let mut map = Self::Map(Vec::new());
        for (key, value) in entries {
            map.insert(key.into(), value.into());
        }
        map
    }

    /// Check if value is null.
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Short label of the variant, for diagnostics.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::Float(_) => "float",
            Self::String(_) => "string",
            Self::Bytes(_) => "bytes",
            Self::Stream(_) => "stream",
            Self::List(_) => "list",
            Self::Map(_) => "map",
            Self::Record(_) => "record",
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int(v) => Some(*v),
            _ => None,
        }
    }

    /// Numeric view; integers widen to `f64`.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Float(v) => Some(*v),
            Self::Int(v) => Some(*v as f64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Self::Bytes(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Self::List(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&[(Value, Value)]> {
        match self {
            Self::Map(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_record(&self) -> Option<&RecordValue> {
        match self {
            Self::Record(v) => Some(v),
            _ => None,
        }
    }

    /// Look up a map entry by key.
    pub fn map_get(&self, key: &Value) -> Option<&Value> {
        match self {
            Self::Map(entries) => entries.iter().find(|(k, _)| k == key).map(|(_, v)| v),
            _ => None,
        }
    }

    /// Look up a string-keyed map entry or a record field.
    pub fn get(&self, name: &str) -> Option<&Value> {
        match self {
            Self::Map(entries) => entries
                .iter()
                .find(|(k, _)| k.as_str() == Some(name))
                .map(|(_, v)| v),
            Self::Record(record) => record.get(name),
            _ => None,
        }
    }

    /// Insert or replace a map entry. Returns `false` if this is not a map.
    pub fn insert(&mut self, key: Value, value: Value) -> bool {
        match self {
            Self::Map(entries) => {
                match entries.iter_mut().find(|(k, _)| *k == key) {
                    Some(entry) => entry.1 = value,
                    None => entries.push((key, value)),
                }
                true
            }
            _ => false,
        }
    }

    /// Convert JSON into a value. Objects keep their key order.
    pub fn from_json(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Self::Null,
            serde_json::Value::Bool(b) => Self::Bool(b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Self::Int(i),
                None => Self::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            serde_json::Value::String(s) => Self::String(s),
            serde_json::Value::Array(items) => {
                Self::List(items.into_iter().map(Self::from_json).collect())
            }
            serde_json::Value::Object(map) => Self::Map(
                map.into_iter()
                    .map(|(k, v)| (Self::String(k), Self::from_json(v)))
                    .collect(),
            ),
        }
    }

    /// Convert into JSON.
    ///
    /// Bytes become base64 text, records become objects in field order and
    /// scalar map keys are rendered as strings. Streams are rejected.
    pub fn to_json(&self) -> Result<serde_json::Value, SerializationError> {
        Ok(match self {
            Self::Null => serde_json::Value::Null,
            Self::Bool(b) => serde_json::Value::Bool(*b),
            Self::Int(i) => serde_json::Value::from(*i),
            Self::Float(f) => serde_json::Number::from_f64(*f)
                .map(serde_json::Value::Number)
                .ok_or_else(|| SerializationError::invalid("json", "non-finite float"))?,
            Self::String(s) => serde_json::Value::String(s.clone()),
            Self::Bytes(b) => serde_json::Value::String(STANDARD.encode(b)),
            Self::Stream(_) => {
                return Err(SerializationError::invalid(
                    "json",
                    "byte streams must be read before JSON conversion",
                ))
            }
            Self::List(items) => serde_json::Value::Array(
                items.iter().map(Self::to_json).collect::<Result<_, _>>()?,
            ),
            Self::Map(entries) => {
                let mut object = serde_json::Map::new();
                for (key, value) in entries {
                    object.insert(json_key(key)?, value.to_json()?);
                }
                serde_json::Value::Object(object)
            }
            Self::Record(record) => {
                let mut object = serde_json::Map::new();
                for (name, value) in record.iter() {
                    object.insert(name.to_string(), value.to_json()?);
                }
                serde_json::Value::Object(object)
            }
        })
    }
}

fn json_key(key: &Value) -> Result<String, SerializationError> {
    match key {
        Value::String(s) => Ok(s.clone()),
        Value::Int(i) => Ok(i.to_string()),
        Value::Float(f) => Ok(f.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        other => Err(SerializationError::invalid(
            "json",
            format!("{} cannot be used as an object key", other.kind_name()),
        )),
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Self::Int(i64::from(v))
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<u32> for Value {
    fn from(v: u32) -> Self {
        Self::Int(i64::from(v))
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::String(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::String(v.to_string())
    }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self {
        Self::Bytes(v)
    }
}

impl From<ByteSource> for Value {
    fn from(v: ByteSource) -> Self {
        Self::Stream(v)
    }
}

impl From<RecordValue> for Value {
    fn from(v: RecordValue) -> Self {
        Self::Record(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Self::Null, Into::into)
    }
}

impl From<Vec<Value>> for Value {
    fn from(v: Vec<Value>) -> Self {
        Self::List(v)
    }
}

impl From<serde_json::Value> for Value {
    fn from(v: serde_json::Value) -> Self {
        Self::from_json(v)
    }
}

// ---------------------------------------------------------------------------
// ByteSource
// ---------------------------------------------------------------------------

/// A file-like binary payload.
///
/// Reading is destructive and single-pass: the first `read_to_end` drains the
/// underlying reader and later reads fail. Clones share the same reader, so a
/// source must not be shared across concurrent calls.
#[derive(Clone)]
pub struct ByteSource {
    reader: Arc<Mutex<Option<Box<dyn Read + Send>>>>,
}

impl ByteSource {
    /// Wrap any reader.
    pub fn new<R: Read + Send + 'static>(reader: R) -> Self {
        Self {
            reader: Arc::new(Mutex::new(Some(Box::new(reader)))),
        }
    }

    /// In-memory source, mostly for tests.
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self::new(io::Cursor::new(bytes.into()))
    }

    /// Read the source to completion.
    pub fn read_to_end(&self) -> io::Result<Vec<u8>> {
        let mut reader = self
            .reader
            .lock()
            .take()
            .ok_or_else(|| io::Error::other("byte source already consumed"))?;
        let mut buf = Vec::new();
        reader.read_to_end(&mut buf)?;
        Ok(buf)
    }

    /// Whether the source has already been read.
    pub fn is_consumed(&self) -> bool {
        self.reader.lock().is_none()
    }
}

impl fmt::Debug for ByteSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ByteSource")
            .field("consumed", &self.is_consumed())
            .finish()
    }
}

impl PartialEq for ByteSource {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.reader, &other.reader)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_map_insert_replaces() {
        let mut map = Value::map([("a", 1), ("b", 2)]);
        assert!(map.insert("a".into(), 3.into()));
        assert_eq!(map.get("a"), Some(&Value::Int(3)));
        assert_eq!(map.as_map().map(<[_]>::len), Some(2));
        assert!(!Value::Int(1).insert("a".into(), Value::Null));
    }

    #[test]
    fn test_map_get_typed_keys() {
        let map = Value::map([(Value::Int(5), Value::from("five"))]);
        assert_eq!(map.map_get(&Value::Int(5)), Some(&Value::from("five")));
        assert_eq!(map.map_get(&Value::from("5")), None);
    }

    #[test]
    fn test_json_round_trip_keeps_order() {
        let json: serde_json::Value =
            serde_json::from_str(r#"{"z": 1, "a": [true, null, 2.5], "m": "x"}"#).unwrap();
        let value = Value::from_json(json.clone());
        let keys: Vec<_> = value
            .as_map()
            .unwrap()
            .iter()
            .filter_map(|(k, _)| k.as_str())
            .collect();
        assert_eq!(keys, vec!["z", "a", "m"]);
        assert_eq!(value.to_json().unwrap(), json);
    }

    #[test]
    fn test_bytes_to_json_is_base64() {
        let value = Value::Bytes(b"hi".to_vec());
        assert_eq!(value.to_json().unwrap(), serde_json::json!("aGk="));
    }

    #[test]
    fn test_stream_read_once() {
        let source = ByteSource::from_bytes(b"payload".to_vec());
        let clone = source.clone();
        assert_eq!(source.read_to_end().unwrap(), b"payload");
        assert!(clone.is_consumed());
        assert!(clone.read_to_end().is_err());
        assert_eq!(source, clone);
    }
}
