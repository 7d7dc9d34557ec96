// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Ordered records.
//!
//! Field order is declaration order. Declarations go through
//! [`FieldMarker`]s, which carry a process-wide creation counter, so a
//! record assembled from markers created elsewhere still lists its fields
//! in the order the markers were made.

use crate::descriptor::{Shape, TypeDescriptor, TypeKind};
use crate::dispatch;
use crate::error::{Result, SchemaError, SerializationError};
use crate::format::{field_format, WireFormat};
use crate::value::Value;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

static FIELD_COUNTER: AtomicU64 = AtomicU64::new(0);

/// A type tagged with its declaration position.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldMarker {
    ty: TypeDescriptor,
    counter: u64,
}

impl FieldMarker {
    pub(crate) fn new(ty: TypeDescriptor) -> Self {
        Self {
            ty,
            counter: FIELD_COUNTER.fetch_add(1, Ordering::Relaxed),
        }
    }

    pub fn ty(&self) -> &TypeDescriptor {
        &self.ty
    }

    pub fn counter(&self) -> u64 {
        self.counter
    }
}

impl From<TypeDescriptor> for FieldMarker {
    fn from(ty: TypeDescriptor) -> Self {
        Self::new(ty)
    }
}

/// A named field of a record.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordField {
    pub name: String,
    pub ty: TypeDescriptor,
}

impl RecordField {
    pub fn new(name: impl Into<String>, ty: TypeDescriptor) -> Self {
        Self {
            name: name.into(),
            ty,
        }
    }
}

/// Record schema: a name and an ordered field list.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordType {
    name: String,
    namespace: String,
    fields: Vec<RecordField>,
}

impl RecordType {
    /// Build a record. Field names must be unique.
    pub fn new(name: impl Into<String>, fields: Vec<RecordField>) -> std::result::Result<Self, SchemaError> {
        let name = name.into();
        for (idx, field) in fields.iter().enumerate() {
            if fields[..idx].iter().any(|f| f.name == field.name) {
                return Err(SchemaError::DuplicateField {
                    type_name: name,
                    field: field.name.clone(),
                });
            }
        }
        Ok(Self {
            name,
            namespace: String::new(),
            fields,
        })
    }

    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    pub fn into_descriptor(self) -> TypeDescriptor {
        TypeDescriptor::root(TypeKind::Record(Arc::new(self)))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn qualified_name(&self) -> String {
        if self.namespace.is_empty() {
            self.name.clone()
        } else {
            format!("{}/{}", self.namespace, self.name)
        }
    }

    pub fn fields(&self) -> &[RecordField] {
        &self.fields
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.name.as_str())
    }

    pub fn field_index(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name == name)
    }

    pub fn field_type(&self, name: &str) -> Option<&TypeDescriptor> {
        self.fields.iter().find(|f| f.name == name).map(|f| &f.ty)
    }
}

// ---------------------------------------------------------------------------
// Builder
// ---------------------------------------------------------------------------

enum PendingKind {
    Plain(TypeDescriptor),
    List(TypeDescriptor),
    Dict(TypeDescriptor, TypeDescriptor),
}

struct PendingField {
    name: String,
    kind: PendingKind,
    counter: u64,
}

/// Builder for record types.
///
/// ```rust,ignore
/// let labeled = RecordBuilder::new("LabeledId")
///     .field("id", builtins::int().field())
///     .field("label", builtins::string().field())
///     .build()?;
/// ```
pub struct RecordBuilder {
    name: String,
    namespace: String,
    fields: Vec<PendingField>,
}

impl RecordBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            namespace: String::new(),
            fields: Vec::new(),
        }
    }

    pub fn namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    /// Add a field.
    pub fn field(mut self, name: impl Into<String>, marker: impl Into<FieldMarker>) -> Self {
        let marker = marker.into();
        self.fields.push(PendingField {
            name: name.into(),
            counter: marker.counter,
            kind: PendingKind::Plain(marker.ty),
        });
        self
    }

    /// Add a field holding an unconstrained list of the marker's type.
    pub fn list_field(mut self, name: impl Into<String>, marker: impl Into<FieldMarker>) -> Self {
        let marker = marker.into();
        self.fields.push(PendingField {
            name: name.into(),
            counter: marker.counter,
            kind: PendingKind::List(marker.ty),
        });
        self
    }

    /// Add a map field. Its position is the earlier of the two markers.
    pub fn dict_field(
        mut self,
        name: impl Into<String>,
        key: impl Into<FieldMarker>,
        value: impl Into<FieldMarker>,
    ) -> Self {
        let (key, value) = (key.into(), value.into());
        self.fields.push(PendingField {
            name: name.into(),
            counter: key.counter.min(value.counter),
            kind: PendingKind::Dict(key.ty, value.ty),
        });
        self
    }

    /// Resolve field order and build the record descriptor.
    pub fn build(self) -> std::result::Result<TypeDescriptor, SchemaError> {
        let mut pending = self.fields;
        pending.sort_by_key(|f| f.counter);

        let mut fields = Vec::with_capacity(pending.len());
        for field in pending {
            let ty = match field.kind {
                PendingKind::Plain(ty) => ty,
                PendingKind::List(ty) => ty.as_list(Shape::unconstrained())?,
                PendingKind::Dict(key, value) => TypeDescriptor::dict(key, value),
            };
            fields.push(RecordField::new(field.name, ty));
        }

        let record = RecordType::new(self.name, fields)?.with_namespace(self.namespace);
        log::debug!(
            "[record] built {} with {} fields",
            record.qualified_name(),
            record.fields.len()
        );
        Ok(record.into_descriptor())
    }
}

// ---------------------------------------------------------------------------
// Instances
// ---------------------------------------------------------------------------

/// An instance of a record type. Field values are owned and kept in field
/// order.
#[derive(Debug, Clone)]
pub struct RecordValue {
    pub(crate) record: Arc<RecordType>,
    pub(crate) values: Vec<Value>,
}

impl RecordValue {
    /// Instance with every field `Null`.
    pub fn new(record: Arc<RecordType>) -> Self {
        let values = vec![Value::Null; record.fields.len()];
        Self { record, values }
    }

    pub fn record_type(&self) -> &Arc<RecordType> {
        &self.record
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.record.field_index(name).map(|idx| &self.values[idx])
    }

    /// Set a field. Unknown names are rejected.
    pub fn set(&mut self, name: &str, value: impl Into<Value>) -> std::result::Result<(), SchemaError> {
        let idx = self
            .record
            .field_index(name)
            .ok_or_else(|| SchemaError::UnknownField {
                type_name: self.record.qualified_name(),
                field: name.to_string(),
            })?;
        self.values[idx] = value.into();
        Ok(())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.record.field_index(name).is_some()
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.record.field_names()
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    /// `(name, value)` pairs in field order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.record.field_names().zip(self.values.iter())
    }

    /// Ordered map view of this instance.
    pub fn to_map(&self) -> Value {
        Value::Map(
            self.iter()
                .map(|(name, value)| (Value::from(name), value.clone()))
                .collect(),
        )
    }
}

impl PartialEq for RecordValue {
    fn eq(&self, other: &Self) -> bool {
        (Arc::ptr_eq(&self.record, &other.record) || self.record == other.record)
            && self.values == other.values
    }
}

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

fn fmt_key(name: &str) -> String {
    format!("{}__fmt", name)
}

pub(crate) fn choose_wire_format(
    record: &RecordType,
    data: &Value,
    is_list: bool,
) -> Result<Option<WireFormat>> {
    let data = if is_list {
        match data.as_list().and_then(<[Value]>::first) {
            Some(first) => first,
            None => return Ok(None),
        }
    } else {
        data
    };
    if data.is_null() {
        return Ok(None);
    }

    let mut entries = Vec::new();
    for field in &record.fields {
        let field_data = data.get(&field.name).unwrap_or(&Value::Null);
        if let Some(format) = field.ty.choose_wire_format(field_data, false)? {
            entries.push((Value::from(field.name.as_str()), format));
        }
    }
    if entries.is_empty() {
        Ok(None)
    } else {
        Ok(Some(WireFormat::Keyed(entries)))
    }
}

pub(crate) fn is_binary(record: &RecordType, wire: Option<&WireFormat>) -> bool {
    record
        .fields
        .iter()
        .enumerate()
        .any(|(idx, f)| f.ty.is_binary(field_format(wire, &f.name, idx)))
}

pub(crate) fn can_deserialize(record: &RecordType, wire: Option<&WireFormat>) -> bool {
    record
        .fields
        .iter()
        .enumerate()
        .all(|(idx, f)| f.ty.can_deserialize(field_format(wire, &f.name, idx)))
}

pub(crate) fn can_serialize(record: &RecordType, data: &Value, wire: Option<&WireFormat>) -> bool {
    record.fields.iter().enumerate().all(|(idx, f)| {
        let field_data = field_data(data, &f.name, idx).unwrap_or(&Value::Null);
        f.ty.can_serialize(field_data, field_format(wire, &f.name, idx))
    })
}

/// Field value from a map, record or positional list.
fn field_data<'a>(data: &'a Value, name: &str, idx: usize) -> Option<&'a Value> {
    match data {
        Value::List(items) => items.get(idx),
        other => other.get(name),
    }
}

pub(crate) fn deserialize(
    ty: &TypeDescriptor,
    record: &Arc<RecordType>,
    data: Value,
    wire: Option<&WireFormat>,
) -> Result<Value> {
    if !matches!(
        data,
        Value::Null | Value::Map(_) | Value::List(_) | Value::Record(_)
    ) {
        return Err(SerializationError::invalid(
            ty.name(),
            format!("cannot read fields from {}", data.kind_name()),
        )
        .into());
    }

    let mut out = RecordValue::new(Arc::clone(record));
    for (idx, field) in record.fields.iter().enumerate() {
        let mut field_wire = field_format(wire, &field.name, idx).cloned();
        if let Value::Map(_) = data {
            if let Some(format) = data.get(&fmt_key(&field.name)) {
                field_wire = WireFormat::from_value(format);
            }
        }
        let field_value = field_data(&data, &field.name, idx)
            .cloned()
            .unwrap_or_default();
        out.values[idx] = dispatch::deserialize(&field.ty, field_value, field_wire.as_ref())?;
    }
    Ok(Value::Record(out))
}

pub(crate) fn serialize(
    ty: &TypeDescriptor,
    record: &RecordType,
    data: Value,
    wire: Option<&WireFormat>,
) -> Result<Value> {
    if !matches!(
        data,
        Value::Null | Value::Map(_) | Value::List(_) | Value::Record(_)
    ) {
        return Err(SerializationError::invalid(
            ty.name(),
            format!("cannot read fields from {}", data.kind_name()),
        )
        .into());
    }

    let mut out = Vec::with_capacity(record.fields.len());
    for (idx, field) in record.fields.iter().enumerate() {
        let key = Value::from(field.name.as_str());
        if data.is_null() {
            out.push((key, Value::Null));
            continue;
        }
        let field_value = field_data(&data, &field.name, idx)
            .cloned()
            .unwrap_or_default();
        let field_wire = match wire {
            Some(WireFormat::Keyed(_) | WireFormat::Seq(_)) => {
                field_format(wire, &field.name, idx).cloned()
            }
            _ => match data.as_map().and(data.get(&fmt_key(&field.name))) {
                Some(format) => WireFormat::from_value(format),
                None => wire.cloned(),
            },
        };
        let value = dispatch::serialize(&field.ty, field_value, field_wire.as_ref())?;
        out.push((key, value));
    }
    Ok(Value::Map(out))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builtins::{int, string};

    fn labeled() -> TypeDescriptor {
        RecordBuilder::new("LabeledId")
            .field("id", int().field())
            .field("label", string().field())
            .build()
            .unwrap()
    }

    #[test]
    fn test_markers_order_fields() {
        let label = string().field();
        let id = int().field();
        let ty = RecordBuilder::new("Swapped")
            .field("id", id)
            .field("label", label)
            .build()
            .unwrap();
        let names: Vec<_> = ty.as_record().unwrap().field_names().collect();
        assert_eq!(names, vec!["label", "id"]);
    }

    #[test]
    fn test_duplicate_field_rejected() {
        let err = RecordBuilder::new("Dup")
            .field("a", int())
            .field("a", string())
            .build()
            .unwrap_err();
        assert!(matches!(err, SchemaError::DuplicateField { .. }));
    }

    #[test]
    fn test_list_and_dict_fields() {
        let ty = RecordBuilder::new("Bag")
            .list_field("ids", int().field())
            .dict_field("names", int().field(), string().field())
            .build()
            .unwrap();
        let record = ty.as_record().unwrap();
        assert_eq!(record.field_type("ids").unwrap().name(), "Int[...]");
        assert_eq!(record.field_type("names").unwrap().name(), "Dict(Int,String)");
    }

    #[test]
    fn test_record_value_access() {
        let ty = labeled();
        let mut value = RecordValue::new(ty.as_record().unwrap().clone());
        value.set("id", 7).unwrap();
        assert_eq!(value.get("id"), Some(&Value::Int(7)));
        assert_eq!(value.get("label"), Some(&Value::Null));
        assert!(value.contains("label"));
        assert!(!value.contains("other"));
        assert!(matches!(
            value.set("other", 1),
            Err(SchemaError::UnknownField { .. })
        ));
        assert_eq!(
            value.to_map(),
            Value::map([("id", Value::Int(7)), ("label", Value::Null)])
        );
    }

    #[test]
    fn test_positional_and_keyed_formats() {
        let ty = labeled();
        let record = ty.as_record().unwrap();
        let seq = WireFormat::Seq(vec![None, Some("x".into())]);
        assert!(can_deserialize(record, Some(&WireFormat::keyed([("id", WireFormat::name("y"))]))));
        // Primitives declare no formats and so accept any.
        assert!(can_deserialize(record, Some(&seq)));
    }

    #[test]
    fn test_deserialize_positional_data() {
        let ty = labeled();
        let out = crate::deserialize(&ty, Value::List(vec!["3".into(), 9.into()]), None).unwrap();
        let out = out.as_record().unwrap();
        assert_eq!(out.get("id"), Some(&Value::Int(3)));
        assert_eq!(out.get("label"), Some(&Value::from("9")));
    }

    #[test]
    fn test_serialize_null_record_fields() {
        let ty = labeled();
        let record = ty.as_record().unwrap();
        let out = serialize(&ty, record, Value::Null, None).unwrap();
        assert_eq!(
            out,
            Value::map([("id", Value::Null), ("label", Value::Null)])
        );
    }
}
