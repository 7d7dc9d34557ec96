// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Binary/text bridge.
//!
//! Opaque byte payloads travel as base64 text. The conversion mirrors the
//! structure of the descriptor: records per field, lists per element, maps
//! per value. Parts whose wire format is not binary are left alone.

use crate::composite::RecordType;
use crate::descriptor::{TypeDescriptor, TypeKind};
use crate::error::BinaryConversionError;
use crate::format::{element_format, field_format, split_pair, WireFormat};
use crate::value::Value;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use std::sync::Arc;

/// Direction of a bridge pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Direction {
    /// Text to bytes. Streams may stay unread when `allow_stream` is set.
    Decode { allow_stream: bool },
    /// Bytes to text.
    Encode,
}

type BridgeResult = Result<Value, BinaryConversionError>;

/// Convert the binary parts of `data` for `ty` in `wire`.
pub(crate) fn binary_convert(
    ty: &TypeDescriptor,
    wire: Option<&WireFormat>,
    data: Value,
    direction: Direction,
) -> BridgeResult {
    if data.is_null() || !ty.is_binary(wire) {
        return Ok(data);
    }
    match ty.kind() {
        TypeKind::Scalar(_) => convert_leaf(data, direction),
        TypeKind::Record(record) => {
            let fields = record.fields();
            match data {
                Value::Map(entries) => {
                    let mut out = Vec::with_capacity(entries.len());
                    for (key, value) in entries {
                        let converted = match key.as_str().and_then(|k| record.field_index(k)) {
                            Some(pos) => {
                                let field = &fields[pos];
                                binary_convert(&field.ty, field_format(wire, &field.name, pos), value, direction)?
                            }
                            None => value,
                        };
                        out.push((key, converted));
                    }
                    Ok(Value::Map(out))
                }
                Value::Record(instance) if !same_record(&instance.record, record) => {
                    binary_convert(ty, wire, instance.to_map(), direction)
                }
                Value::Record(mut instance) => {
                    for (idx, field) in fields.iter().enumerate() {
                        let value = std::mem::take(&mut instance.values[idx]);
                        instance.values[idx] =
                            binary_convert(&field.ty, field_format(wire, &field.name, idx), value, direction)?;
                    }
                    Ok(Value::Record(instance))
                }
                Value::List(items) => {
                    let mut out = Vec::with_capacity(items.len());
                    for (idx, item) in items.into_iter().enumerate() {
                        out.push(match fields.get(idx) {
                            Some(field) => binary_convert(
                                &field.ty,
                                field_format(wire, &field.name, idx),
                                item,
                                direction,
                            )?,
                            None => item,
                        });
                    }
                    Ok(Value::List(out))
                }
                other => Err(BinaryConversionError::NotBinary {
                    found: other.kind_name(),
                }),
            }
        }
        TypeKind::List(list) => convert_axes(&list.element, list.shape.ndims(), wire, data, direction),
        TypeKind::Dict(dict) => {
            let Value::Map(entries) = data else {
                return Err(BinaryConversionError::NotBinary {
                    found: data.kind_name(),
                });
            };
            let (key_format, value_format) = split_pair(wire);
            let mut out = Vec::with_capacity(entries.len());
            for (key, value) in entries {
                let key_wire = match key_format {
                    Some(keyed @ WireFormat::Keyed(_)) => keyed.lookup(&key),
                    other => other,
                };
                let key = binary_convert(&dict.key, key_wire, key, direction)?;
                let value_wire = match value_format {
                    Some(keyed @ WireFormat::Keyed(_)) => keyed.lookup(&key),
                    other => other,
                };
                out.push((key, binary_convert(&dict.value, value_wire, value, direction)?));
            }
            Ok(Value::Map(out))
        }
    }
}

/// Instances of another record type are only safe to address by name.
fn same_record(a: &Arc<RecordType>, b: &Arc<RecordType>) -> bool {
    Arc::ptr_eq(a, b) || **a == **b
}

fn convert_axes(
    element: &TypeDescriptor,
    depth: usize,
    wire: Option<&WireFormat>,
    data: Value,
    direction: Direction,
) -> BridgeResult {
    if depth == 0 {
        return binary_convert(element, wire, data, direction);
    }
    match data {
        Value::List(items) => items
            .into_iter()
            .enumerate()
            .map(|(idx, item)| convert_axes(element, depth - 1, element_format(wire, idx), item, direction))
            .collect::<Result<Vec<_>, _>>()
            .map(Value::List),
        Value::Null => Ok(Value::Null),
        other => Err(BinaryConversionError::NotBinary {
            found: other.kind_name(),
        }),
    }
}

fn convert_leaf(data: Value, direction: Direction) -> BridgeResult {
    match (direction, data) {
        (_, Value::Null) => Ok(Value::Null),
        (Direction::Decode { .. }, Value::String(text)) => Ok(Value::Bytes(STANDARD.decode(text)?)),
        (Direction::Decode { .. }, bytes @ Value::Bytes(_)) => Ok(bytes),
        (Direction::Decode { allow_stream: true }, stream @ Value::Stream(_)) => Ok(stream),
        (Direction::Decode { allow_stream: false }, Value::Stream(source)) => {
            Ok(Value::Bytes(source.read_to_end()?))
        }
        (Direction::Encode, Value::Bytes(bytes)) => Ok(Value::String(STANDARD.encode(bytes))),
        (Direction::Encode, text @ Value::String(_)) => Ok(text),
        (Direction::Encode, Value::Stream(source)) => {
            log::debug!("[bridge] reading stream source for encoding");
            Ok(Value::String(STANDARD.encode(source.read_to_end()?)))
        }
        (_, other) => Err(BinaryConversionError::NotBinary {
            found: other.kind_name(),
        }),
    }
}

/// Base64-encode every byte payload in an arbitrary value.
///
/// Recurses into lists, maps and records; everything else is returned as is.
/// Streams are read to completion.
pub fn binary_to_text(data: Value) -> Result<Value, BinaryConversionError> {
    match data {
        Value::Bytes(_) | Value::Stream(_) => convert_leaf(data, Direction::Encode),
        Value::List(items) => items
            .into_iter()
            .map(binary_to_text)
            .collect::<Result<Vec<_>, _>>()
            .map(Value::List),
        Value::Map(entries) => entries
            .into_iter()
            .map(|(k, v)| Ok((k, binary_to_text(v)?)))
            .collect::<Result<Vec<_>, BinaryConversionError>>()
            .map(Value::Map),
        Value::Record(mut instance) => {
            for value in &mut instance.values {
                *value = binary_to_text(std::mem::take(value))?;
            }
            Ok(Value::Record(instance))
        }
        other => Ok(other),
    }
}
