// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Composite types: records, shaped lists and key/value maps.

pub(crate) mod dict;
pub(crate) mod list;
pub(crate) mod record;

pub use record::{FieldMarker, RecordBuilder, RecordField, RecordType, RecordValue};

use crate::descriptor::{TypeDescriptor, TypeKind};
use crate::error::{Result, SchemaError, SerializationError};
use crate::value::Value;
use std::sync::Arc;

impl TypeDescriptor {
    /// Build an in-memory instance from already-typed values.
    ///
    /// Records accept a name-keyed map or a positional list; lists and maps
    /// instantiate their entries. No format conversion happens here.
    pub fn instantiate(&self, data: impl Into<Value>) -> Result<Value> {
        let data = data.into();
        if data.is_null() {
            return Ok(Value::Null);
        }
        match self.kind() {
            TypeKind::Scalar(_) => Ok(data),
            TypeKind::Record(record) => instantiate_record(record, data),
            TypeKind::List(list) => {
                let element = &list.element;
                list::process(
                    self,
                    list.shape.axes(),
                    data,
                    None,
                    &mut Vec::new(),
                    &mut |item, _| element.instantiate(item),
                )
            }
            TypeKind::Dict(dict) => {
                let Value::Map(entries) = data else {
                    return Err(SerializationError::invalid(
                        self.name(),
                        format!("expected a map, got {}", data.kind_name()),
                    )
                    .into());
                };
                let mut out = Value::Map(Vec::with_capacity(entries.len()));
                for (key, value) in entries {
                    out.insert(dict.key.instantiate(key)?, dict.value.instantiate(value)?);
                }
                Ok(out)
            }
        }
    }
}

fn instantiate_record(record: &Arc<RecordType>, data: Value) -> Result<Value> {
    let mut out = RecordValue::new(Arc::clone(record));
    match data {
        Value::Record(existing)
            if Arc::ptr_eq(&existing.record, record) || *existing.record == **record =>
        {
            return Ok(Value::Record(existing))
        }
        Value::Record(foreign) => return instantiate_record(record, foreign.to_map()),
        Value::Map(entries) => {
            for (key, value) in entries {
                let name = key.as_str().unwrap_or_default().to_string();
                let Some(idx) = record.field_index(&name) else {
                    return Err(SchemaError::UnknownField {
                        type_name: record.qualified_name(),
                        field: name,
                    }
                    .into());
                };
                out.values[idx] = record.fields()[idx].ty.instantiate(value)?;
            }
        }
        Value::List(items) => {
            if items.len() > record.fields().len() {
                return Err(SchemaError::Arity {
                    type_name: record.qualified_name(),
                    expected: record.fields().len(),
                    got: items.len(),
                }
                .into());
            }
            for (idx, value) in items.into_iter().enumerate() {
                out.values[idx] = record.fields()[idx].ty.instantiate(value)?;
            }
        }
        other => {
            return Err(SerializationError::invalid(
                record.qualified_name(),
                format!("cannot build a record from {}", other.kind_name()),
            )
            .into())
        }
    }
    Ok(Value::Record(out))
}
