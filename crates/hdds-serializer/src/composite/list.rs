// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Homogeneous shaped lists.
//!
//! Processing walks one axis per nesting level. At every level a positional
//! wire format is indexed per element, anything else is broadcast. After an
//! axis is processed its element count is checked against the shape.

use crate::descriptor::{ListType, TypeDescriptor, ENTRIES_REQUIRED};
use crate::dispatch;
use crate::error::{format_index, Result, SerializationError};
use crate::format::{element_format, WireFormat};
use crate::value::Value;

/// Apply `func` to every leaf of `data`, checking fixed-size axes.
///
/// `index` is the path to the level being processed; a shape error reports
/// the path of the axis whose count is wrong.
pub(crate) fn process<F>(
    ty: &TypeDescriptor,
    axes: &[Option<usize>],
    data: Value,
    wire: Option<&WireFormat>,
    index: &mut Vec<usize>,
    func: &mut F,
) -> Result<Value>
where
    F: FnMut(Value, Option<&WireFormat>) -> Result<Value>,
{
    let Some((expected, inner)) = axes.split_first() else {
        return func(data, wire);
    };
    let items = match data {
        Value::List(items) => items,
        Value::Null => Vec::new(),
        other => {
            return Err(SerializationError::invalid(
                ty.name(),
                format!(
                    "expected a list at index {}, got {}",
                    format_index(index),
                    other.kind_name()
                ),
            )
            .into())
        }
    };

    let mut processed = Vec::with_capacity(items.len());
    for (idx, item) in items.into_iter().enumerate() {
        index.push(idx);
        let result = process(ty, inner, item, element_format(wire, idx), index, func);
        index.pop();
        processed.push(result?);
    }

    if let Some(expected) = *expected {
        if processed.len() != expected {
            return Err(SerializationError::ShapeMismatch {
                type_name: ty.name(),
                index: index.clone(),
                expected,
                got: processed.len(),
            }
            .into());
        }
    }
    Ok(Value::List(processed))
}

/// Element type, made required under `entries_required`.
fn element_type(ty: &TypeDescriptor, list: &ListType) -> TypeDescriptor {
    if ty.internal_format() == Some(ENTRIES_REQUIRED) {
        list.element.required()
    } else {
        list.element.clone()
    }
}

/// Element formats reachable through the list axes.
fn leaf_formats<'a>(wire: Option<&'a WireFormat>, depth: usize, out: &mut Vec<Option<&'a WireFormat>>) {
    match wire {
        Some(WireFormat::Seq(items)) if depth > 0 => {
            for item in items {
                leaf_formats(item.as_ref(), depth - 1, out);
            }
        }
        other => out.push(other),
    }
}

fn leaves<'a>(list: &ListType, wire: Option<&'a WireFormat>) -> Vec<Option<&'a WireFormat>> {
    let mut out = Vec::new();
    leaf_formats(wire, list.shape.ndims(), &mut out);
    out
}

pub(crate) fn choose_wire_format(list: &ListType, data: &Value) -> Result<Option<WireFormat>> {
    list.element.choose_wire_format(data, true)
}

pub(crate) fn is_binary(list: &ListType, wire: Option<&WireFormat>) -> bool {
    leaves(list, wire)
        .into_iter()
        .any(|leaf| list.element.is_binary(leaf))
}

pub(crate) fn can_deserialize(list: &ListType, wire: Option<&WireFormat>) -> bool {
    leaves(list, wire)
        .into_iter()
        .all(|leaf| list.element.can_deserialize(leaf))
}

pub(crate) fn can_serialize(list: &ListType, data: &Value, wire: Option<&WireFormat>) -> bool {
    fn walk(element: &TypeDescriptor, depth: usize, data: &Value, wire: Option<&WireFormat>) -> bool {
        if depth == 0 {
            return element.can_serialize(data, wire);
        }
        match data {
            Value::List(items) => items
                .iter()
                .enumerate()
                .all(|(idx, item)| walk(element, depth - 1, item, element_format(wire, idx))),
            Value::Null => true,
            _ => false,
        }
    }
    walk(&list.element, list.shape.ndims(), data, wire)
}

pub(crate) fn deserialize(
    ty: &TypeDescriptor,
    list: &ListType,
    data: Value,
    wire: Option<&WireFormat>,
) -> Result<Value> {
    let element = element_type(ty, list);
    process(
        ty,
        list.shape.axes(),
        data,
        wire,
        &mut Vec::new(),
        &mut |item, format| dispatch::deserialize(&element, item, format),
    )
}

pub(crate) fn serialize(
    ty: &TypeDescriptor,
    list: &ListType,
    data: Value,
    wire: Option<&WireFormat>,
) -> Result<Value> {
    let element = element_type(ty, list);
    process(
        ty,
        list.shape.axes(),
        data,
        wire,
        &mut Vec::new(),
        &mut |item, format| dispatch::serialize(&element, item, format),
    )
}
