// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

#![allow(clippy::needless_pass_by_value)] // Test functions

//! Translator dispatch through the public API: ordering, internal format
//! targets, sniffing and exhaustion.

use hdds_serializer::format::literals;
use hdds_serializer::{
    deserialize, serialize, Error, FormatPattern, Result, ScalarType, SerializationError,
    Translator, TypeDescriptor, Value, WireFormat,
};

/// Tags values with its label so the chosen translator is visible.
struct Tagging {
    label: &'static str,
    wire: &'static [&'static str],
    internal: &'static [&'static str],
}

impl Translator for Tagging {
    fn name(&self) -> &str {
        self.label
    }

    fn known_wire_formats(&self, _parent: &TypeDescriptor) -> Vec<FormatPattern> {
        literals(self.wire)
    }

    fn known_internal_formats(&self, _parent: &TypeDescriptor) -> Vec<FormatPattern> {
        literals(self.internal)
    }

    fn deserialize(
        &self,
        _parent: &TypeDescriptor,
        data: Value,
        wire: &WireFormat,
        internal: Option<&str>,
    ) -> Result<Value> {
        Ok(Value::map([
            ("by", Value::from(self.label)),
            ("wire", Value::from(wire.to_string())),
            ("internal", Value::from(internal)),
            ("data", data),
        ]))
    }

    fn serialize(
        &self,
        _parent: &TypeDescriptor,
        data: Value,
        _internal: Option<&str>,
        wire: Option<&WireFormat>,
    ) -> Result<Value> {
        Ok(Value::map([
            ("by", Value::from(self.label)),
            ("wire", Value::from(wire.map(ToString::to_string))),
            ("data", data),
        ]))
    }
}

/// Recognizes hex strings when no wire format is given.
struct HexSniffer;

impl Translator for HexSniffer {
    fn known_wire_formats(&self, _parent: &TypeDescriptor) -> Vec<FormatPattern> {
        literals(&["hex"])
    }

    fn known_internal_formats(&self, _parent: &TypeDescriptor) -> Vec<FormatPattern> {
        literals(&["int"])
    }

    fn attempt_deserialize(
        &self,
        _parent: &TypeDescriptor,
        data: &Value,
        _internal: Option<&str>,
    ) -> Option<Value> {
        let text = data.as_str()?.strip_prefix("0x")?;
        i64::from_str_radix(text, 16).ok().map(Value::Int)
    }

    fn deserialize(
        &self,
        _parent: &TypeDescriptor,
        data: Value,
        _wire: &WireFormat,
        _internal: Option<&str>,
    ) -> Result<Value> {
        Ok(data)
    }

    fn serialize(
        &self,
        _parent: &TypeDescriptor,
        data: Value,
        _internal: Option<&str>,
        _wire: Option<&WireFormat>,
    ) -> Result<Value> {
        Ok(data)
    }
}

fn tagging(label: &'static str, internal: &'static [&'static str]) -> Tagging {
    Tagging {
        label,
        wire: &["x"],
        internal,
    }
}

#[test]
fn test_first_registered_translator_wins() {
    let ty = ScalarType::new("Sample", NoCodec)
        .with_translator(tagging("A", &["a"]))
        .with_translator(tagging("B", &["b"]))
        .into_descriptor();
    let wire = WireFormat::name("x");

    for _ in 0..3 {
        let out = deserialize(&ty, 1, Some(&wire)).unwrap();
        assert_eq!(out.get("by"), Some(&Value::from("A")));
        let out = serialize(&ty, 1, Some(&wire)).unwrap();
        assert_eq!(out.get("by"), Some(&Value::from("A")));
    }
}

#[test]
fn test_internal_format_selects_translator() {
    let ty = ScalarType::new("Sample", NoCodec)
        .with_translator(tagging("A", &["a"]))
        .with_translator(tagging("B", &["b"]))
        .into_descriptor();
    let wire = WireFormat::name("x");

    let out = deserialize(&ty.with_internal_format("b"), 1, Some(&wire)).unwrap();
    assert_eq!(out.get("by"), Some(&Value::from("B")));
    assert_eq!(out.get("internal"), Some(&Value::from("b")));

    let out = deserialize(&ty, 1, Some(&wire)).unwrap();
    assert_eq!(out.get("internal"), Some(&Value::from("a")));
}

#[test]
fn test_serialize_chooses_translator_wire_format() {
    let ty = ScalarType::new("Sample", NoCodec)
        .with_translator(tagging("A", &["a"]))
        .into_descriptor();
    let out = serialize(&ty, 1, None).unwrap();
    assert_eq!(out.get("wire"), Some(&Value::from("x")));
}

#[test]
fn test_unknown_wire_format_rejected() {
    let ty = ScalarType::new("Sample", NoCodec)
        .with_translator(tagging("A", &["a"]))
        .into_descriptor();
    let err = deserialize(&ty, 1, Some(&"y".into())).unwrap_err();
    assert!(matches!(
        err,
        Error::Serialization(SerializationError::UnsupportedFormat { .. })
    ));
}

#[test]
fn test_sniffing_without_wire_format() {
    let ty = ScalarType::new("Hex", NoCodec)
        .with_translator(HexSniffer)
        .into_descriptor();
    assert_eq!(deserialize(&ty, "0x1f", None).unwrap(), Value::Int(31));

    let err = deserialize(&ty, "31", None).unwrap_err();
    assert_eq!(
        err.to_string(),
        "Hex could not deserialize data from wire format None"
    );

    let err = deserialize(&ty.with_internal_format("float"), "0x1f", None).unwrap_err();
    assert!(matches!(
        err,
        Error::Serialization(SerializationError::DeserializeExhausted { ref internal_format, .. })
            if internal_format.as_deref() == Some("float")
    ));
}

#[test]
fn test_translators_shared_by_derivations() {
    let ty = ScalarType::new("Late", NoCodec).into_descriptor();
    let derived = ty.with_internal_format("a");
    ty.add_translator(tagging("A", &["a"])).unwrap();
    assert_eq!(derived.translators().len(), 1);
    let out = deserialize(&derived, 1, Some(&"x".into())).unwrap();
    assert_eq!(out.get("by"), Some(&Value::from("A")));
}

struct NoCodec;

impl hdds_serializer::TypeCodec for NoCodec {}
