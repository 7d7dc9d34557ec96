// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Key/value maps.
//!
//! A map format is either a [`WireFormat::Pair`] of key and value formats or
//! a single format broadcast to both. Each half may itself be keyed per
//! entry. Deserialization looks value formats up by the deserialized key
//! first and falls back to the wire key; serialization only uses the
//! in-memory key.

use crate::descriptor::DictType;
use crate::dispatch;
use crate::error::{Result, SerializationError};
use crate::format::{split_pair, WireFormat};
use crate::value::Value;

/// Per-entry format: looked up when keyed, broadcast otherwise.
fn entry_format<'a>(format: Option<&'a WireFormat>, key: &Value) -> Option<&'a WireFormat> {
    match format {
        Some(keyed @ WireFormat::Keyed(_)) => keyed.lookup(key),
        other => other,
    }
}

/// Every format a keyed half can hand out, or the half itself.
fn all_formats(format: Option<&WireFormat>) -> Vec<Option<&WireFormat>> {
    match format {
        Some(WireFormat::Keyed(entries)) => entries.iter().map(|(_, f)| Some(f)).collect(),
        other => vec![other],
    }
}

fn entries(type_name: &str, data: Value) -> Result<Vec<(Value, Value)>> {
    match data {
        Value::Map(entries) => Ok(entries),
        Value::Null => Ok(Vec::new()),
        Value::Record(record) => match record.to_map() {
            Value::Map(entries) => Ok(entries),
            _ => Ok(Vec::new()),
        },
        other => Err(SerializationError::invalid(
            type_name,
            format!("expected a map, got {}", other.kind_name()),
        )
        .into()),
    }
}

pub(crate) fn choose_wire_format(dict: &DictType, data: &Value) -> Result<Option<WireFormat>> {
    let (keys, values): (Vec<Value>, Vec<Value>) = data
        .as_map()
        .unwrap_or_default()
        .iter()
        .cloned()
        .unzip();
    let key = dict.key.choose_wire_format(&Value::List(keys), true)?;
    let value = dict.value.choose_wire_format(&Value::List(values), true)?;
    if key.is_none() && value.is_none() {
        return Ok(None);
    }
    Ok(Some(WireFormat::pair(key, value)))
}

pub(crate) fn is_binary(dict: &DictType, wire: Option<&WireFormat>) -> bool {
    let (key, value) = split_pair(wire);
    all_formats(key).into_iter().any(|f| dict.key.is_binary(f))
        || all_formats(value).into_iter().any(|f| dict.value.is_binary(f))
}

pub(crate) fn can_deserialize(dict: &DictType, wire: Option<&WireFormat>) -> bool {
    let (key, value) = split_pair(wire);
    all_formats(key).into_iter().all(|f| dict.key.can_deserialize(f))
        && all_formats(value).into_iter().all(|f| dict.value.can_deserialize(f))
}

pub(crate) fn can_serialize(dict: &DictType, data: &Value, wire: Option<&WireFormat>) -> bool {
    let (key_format, value_format) = split_pair(wire);
    data.as_map().unwrap_or_default().iter().all(|(k, v)| {
        dict.key.can_serialize(k, entry_format(key_format, k))
            && dict.value.can_serialize(v, entry_format(value_format, k))
    })
}

pub(crate) fn deserialize(
    type_name: &str,
    dict: &DictType,
    data: Value,
    wire: Option<&WireFormat>,
) -> Result<Value> {
    let (key_format, value_format) = split_pair(wire);
    let mut out = Value::Map(Vec::new());
    for (wire_key, wire_value) in entries(type_name, data)? {
        let key = dispatch::deserialize(&dict.key, wire_key.clone(), entry_format(key_format, &wire_key))?;
        let format = match value_format {
            Some(keyed @ WireFormat::Keyed(_)) => keyed.lookup(&key).or_else(|| keyed.lookup(&wire_key)),
            other => other,
        };
        let value = dispatch::deserialize(&dict.value, wire_value, format)?;
        out.insert(key, value);
    }
    Ok(out)
}

pub(crate) fn serialize(
    type_name: &str,
    dict: &DictType,
    data: Value,
    wire: Option<&WireFormat>,
) -> Result<Value> {
    let (key_format, value_format) = split_pair(wire);
    let mut out = Value::Map(Vec::new());
    for (key, value) in entries(type_name, data)? {
        let format = entry_format(value_format, &key);
        let wire_key = dispatch::serialize(&dict.key, key.clone(), entry_format(key_format, &key))?;
        let wire_value = dispatch::serialize(&dict.value, value, format)?;
        out.insert(wire_key, wire_value);
    }
    Ok(out)
}
