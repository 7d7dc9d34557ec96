// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Top-level entry points and per-kind capability dispatch.
//!
//! [`deserialize`] and [`serialize`] apply the none/required policy, check
//! the requested wire format, dispatch to the descriptor's kind and run the
//! binary/text bridge when the resolved wire format carries bytes. Composite
//! kinds re-enter these functions for every field, element or entry.

use crate::bridge::{binary_convert, Direction};
use crate::composite::{dict, list, record};
use crate::descriptor::{TypeDescriptor, TypeKind};
use crate::error::{Result, SerializationError};
use crate::format::{self, FormatPattern, WireFormat};
use crate::scalar;
use crate::value::Value;

fn null_policy(ty: &TypeDescriptor) -> Result<Value> {
    if ty.is_required() {
        return Err(SerializationError::DataRequired {
            type_name: ty.name(),
        }
        .into());
    }
    Ok(Value::Null)
}

/// Convert `data` from `wire` to the descriptor's internal form.
///
/// Without a wire format, the descriptor (or one of its translators) picks
/// or sniffs one.
pub fn deserialize(
    ty: &TypeDescriptor,
    data: impl Into<Value>,
    wire: Option<&WireFormat>,
) -> Result<Value> {
    let mut data = data.into();
    if wire.is_some() && !ty.can_deserialize(wire) {
        return Err(SerializationError::UnsupportedFormat {
            type_name: ty.name(),
            format: format::describe(wire),
        }
        .into());
    }
    if data.is_null() && !ty.is_none_safe() {
        return null_policy(ty);
    }
    if ty.is_binary(wire) {
        data = binary_convert(ty, wire, data, Direction::Decode { allow_stream: true })?;
    }
    ty.deserialize_value(data, wire)
}

/// Convert `data` from the descriptor's internal form to `wire`.
///
/// Without a wire format, one is chosen from the data.
pub fn serialize(
    ty: &TypeDescriptor,
    data: impl Into<Value>,
    wire: Option<&WireFormat>,
) -> Result<Value> {
    let data = data.into();
    if data.is_null() && !ty.is_none_safe() {
        return null_policy(ty);
    }
    if wire.is_some() && !ty.can_serialize(&data, wire) {
        return Err(SerializationError::UnsupportedFormat {
            type_name: ty.name(),
            format: format::describe(wire),
        }
        .into());
    }
    let chosen = match wire {
        Some(wire) => Some(wire.clone()),
        None => ty.choose_wire_format(&data, false)?,
    };
    let out = ty.serialize_value(data, chosen.as_ref())?;
    if ty.is_binary(chosen.as_ref()) {
        return Ok(binary_convert(ty, chosen.as_ref(), out, Direction::Encode)?);
    }
    Ok(out)
}

// ---------------------------------------------------------------------------
// Capability contract
// ---------------------------------------------------------------------------

impl TypeDescriptor {
    /// Declared wire formats. `None` means the type never declared any.
    pub fn known_wire_formats(&self) -> Option<Vec<FormatPattern>> {
        match self.kind() {
            TypeKind::Scalar(s) => scalar::known_wire_formats(self, s),
            _ => None,
        }
    }

    /// Declared internal formats, default first.
    pub fn known_internal_formats(&self) -> Vec<FormatPattern> {
        match self.kind() {
            TypeKind::Scalar(s) => scalar::known_internal_formats(self, s),
            _ => Vec::new(),
        }
    }

    /// Wire format to use when serializing `data` without an explicit one.
    pub fn choose_wire_format(&self, data: &Value, is_list: bool) -> Result<Option<WireFormat>> {
        match self.kind() {
            TypeKind::Scalar(s) => scalar::choose_wire_format(self, s, data, is_list),
            TypeKind::Record(r) => record::choose_wire_format(r, data, is_list),
            TypeKind::List(l) => list::choose_wire_format(l, data),
            TypeKind::Dict(d) => dict::choose_wire_format(d, data),
        }
    }

    /// Whether any part of a value in `wire` carries opaque bytes.
    pub fn is_binary(&self, wire: Option<&WireFormat>) -> bool {
        match self.kind() {
            TypeKind::Scalar(s) => scalar::is_binary(self, s, wire),
            TypeKind::Record(r) => record::is_binary(r, wire),
            TypeKind::List(l) => list::is_binary(l, wire),
            TypeKind::Dict(d) => dict::is_binary(d, wire),
        }
    }

    pub fn can_deserialize(&self, wire: Option<&WireFormat>) -> bool {
        match self.kind() {
            TypeKind::Scalar(s) => scalar::can_deserialize(self, s, wire),
            TypeKind::Record(r) => record::can_deserialize(r, wire),
            TypeKind::List(l) => list::can_deserialize(l, wire),
            TypeKind::Dict(d) => dict::can_deserialize(d, wire),
        }
    }

    pub fn can_serialize(&self, data: &Value, wire: Option<&WireFormat>) -> bool {
        match self.kind() {
            TypeKind::Scalar(s) => scalar::can_serialize(self, s, data, wire),
            TypeKind::Record(r) => record::can_serialize(r, data, wire),
            TypeKind::List(l) => list::can_serialize(l, data, wire),
            TypeKind::Dict(d) => dict::can_serialize(d, data, wire),
        }
    }

    /// Whether `None` input is handed to the codec instead of the
    /// required/optional policy.
    pub fn is_none_safe(&self) -> bool {
        match self.kind() {
            TypeKind::Scalar(s) => s.codec().is_none_safe(self),
            _ => false,
        }
    }

    /// Kind-level deserialization without the entry-point policy checks.
    pub fn deserialize_value(&self, data: Value, wire: Option<&WireFormat>) -> Result<Value> {
        match self.kind() {
            TypeKind::Scalar(s) => scalar::deserialize(self, s, data, wire),
            TypeKind::Record(r) => record::deserialize(self, r, data, wire),
            TypeKind::List(l) => list::deserialize(self, l, data, wire),
            TypeKind::Dict(d) => dict::deserialize(&self.name(), d, data, wire),
        }
    }

    /// Kind-level serialization without the entry-point policy checks.
    pub fn serialize_value(&self, data: Value, wire: Option<&WireFormat>) -> Result<Value> {
        match self.kind() {
            TypeKind::Scalar(s) => scalar::serialize(self, s, data, wire),
            TypeKind::Record(r) => record::serialize(self, r, data, wire),
            TypeKind::List(l) => list::serialize(self, l, data, wire),
            TypeKind::Dict(d) => dict::serialize(&self.name(), d, data, wire),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builtins::{blob, int, string};
    use crate::error::Error;

    #[test]
    fn test_null_policy() {
        assert_eq!(deserialize(&int(), Value::Null, None).unwrap(), Value::Null);
        let err = deserialize(&int().required(), Value::Null, None).unwrap_err();
        assert!(matches!(
            err,
            Error::Serialization(SerializationError::DataRequired { .. })
        ));
        let err = serialize(&int().required(), Value::Null, None).unwrap_err();
        assert!(err.is_serialization());
    }

    #[test]
    fn test_required_ignores_wire_format() {
        use crate::composite::RecordBuilder;
        use crate::descriptor::Shape;

        let record = RecordBuilder::new("Pair")
            .field("a", int().field())
            .field("b", int().field())
            .build()
            .unwrap();
        let cases = [
            (int().required(), WireFormat::name("json")),
            (int().required(), WireFormat::name("hex")),
            (
                int().as_list(Shape::fixed(2)).unwrap().required(),
                WireFormat::Seq(vec![Some("json".into()), Some("hex".into())]),
            ),
            (record.required(), WireFormat::keyed([("a", WireFormat::name("json"))])),
            (record.required(), WireFormat::name("json")),
        ];
        for (ty, wire) in &cases {
            for err in [
                deserialize(ty, Value::Null, Some(wire)).unwrap_err(),
                serialize(ty, Value::Null, Some(wire)).unwrap_err(),
            ] {
                assert!(
                    matches!(
                        err,
                        Error::Serialization(SerializationError::DataRequired { ref type_name })
                            if *type_name == ty.name()
                    ),
                    "{} in {wire}: {err}",
                    ty.name()
                );
            }
        }
    }

    #[test]
    fn test_none_safe_reaches_codec() {
        let ty = string().with_internal_format("default");
        assert!(ty.is_none_safe());
        assert_eq!(deserialize(&ty, Value::Null, None).unwrap(), Value::from(""));
    }

    #[test]
    fn test_binary_decoded_then_encoded() {
        let ty = blob();
        let bytes = deserialize(&ty, "aGVsbG8=", None).unwrap();
        assert_eq!(bytes, Value::Bytes(b"hello".to_vec()));
        let text = serialize(&ty, bytes, None).unwrap();
        assert_eq!(text, Value::from("aGVsbG8="));
    }

    #[test]
    fn test_unsupported_wire_format() {
        let ty = crate::builtins::vector();
        let err = deserialize(&ty, Value::List(vec![]), Some(&"msgpack".into())).unwrap_err();
        assert!(matches!(
            err,
            Error::Serialization(SerializationError::UnsupportedFormat { ref format, .. }) if format == "msgpack"
        ));
    }
}
