// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Scalar base types and their dispatch.
//!
//! A scalar is a named [`TypeCodec`] plus an ordered list of translators.
//! When translators are attached they drive dispatch and the codec is the
//! fallback; otherwise the codec answers directly.
//!
//! Empty format declarations are read differently depending on the source:
//! an empty list from a codec leaves the type unconstrained, while an empty
//! list from a translator matches nothing.

use crate::codec::{FnCodec, TypeCodec};
use crate::descriptor::{TypeDescriptor, TypeKind, RAW};
use crate::error::{Result, SerializationError};
use crate::format::{self, FormatPattern, WireFormat};
use crate::translator::{first_literal, Translator};
use crate::value::Value;
use parking_lot::RwLock;
use std::fmt;
use std::sync::Arc;

/// A scalar base type.
pub struct ScalarType {
    name: String,
    namespace: String,
    codec: Box<dyn TypeCodec>,
    translators: RwLock<Vec<Arc<dyn Translator>>>,
    vector_eligible: bool,
}

impl ScalarType {
    pub fn new(name: impl Into<String>, codec: impl TypeCodec + 'static) -> Self {
        Self {
            name: name.into(),
            namespace: String::new(),
            codec: Box::new(codec),
            translators: RwLock::new(Vec::new()),
            vector_eligible: false,
        }
    }

    /// Scalar that applies `func` in both directions and accepts every format.
    pub fn from_fn<F>(name: impl Into<String>, func: F) -> Self
    where
        F: Fn(Value) -> Result<Value> + Send + Sync + 'static,
    {
        Self::new(name, FnCodec::new(func))
    }

    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    /// Allow lists of this type to become `Vector`/`Matrix` types.
    pub fn with_vector_specialization(mut self) -> Self {
        self.vector_eligible = true;
        self
    }

    /// Attach a translator before wrapping into a descriptor.
    pub fn with_translator(self, translator: impl Translator + 'static) -> Self {
        self.add_translator(Arc::new(translator));
        self
    }

    /// Root descriptor of this scalar.
    pub fn into_descriptor(self) -> TypeDescriptor {
        TypeDescriptor::root(TypeKind::Scalar(Arc::new(self)))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// `namespace/name`, or the bare name without a namespace.
    pub fn qualified_name(&self) -> String {
        if self.namespace.is_empty() {
            self.name.clone()
        } else {
            format!("{}/{}", self.namespace, self.name)
        }
    }

    pub fn codec(&self) -> &dyn TypeCodec {
        self.codec.as_ref()
    }

    pub fn is_vector_eligible(&self) -> bool {
        self.vector_eligible
    }

    /// Snapshot of the attached translators in registration order.
    pub fn translators(&self) -> Vec<Arc<dyn Translator>> {
        self.translators.read().clone()
    }

    pub(crate) fn add_translator(&self, translator: Arc<dyn Translator>) {
        log::debug!("[scalar] {} += translator {}", self.qualified_name(), translator.name());
        self.translators.write().push(translator);
    }
}

impl fmt::Debug for ScalarType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScalarType")
            .field("name", &self.qualified_name())
            .field("translators", &self.translators.read().len())
            .field("vector_eligible", &self.vector_eligible)
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

fn union(lists: impl Iterator<Item = Vec<FormatPattern>>) -> Vec<FormatPattern> {
    let mut out: Vec<FormatPattern> = Vec::new();
    for pattern in lists.flatten() {
        if !out.contains(&pattern) {
            out.push(pattern);
        }
    }
    out
}

pub(crate) fn known_wire_formats(ty: &TypeDescriptor, scalar: &ScalarType) -> Option<Vec<FormatPattern>> {
    let translators = scalar.translators();
    if translators.is_empty() {
        return scalar.codec.known_wire_formats(ty);
    }
    Some(union(translators.iter().map(|t| t.known_wire_formats(ty))))
}

pub(crate) fn known_internal_formats(ty: &TypeDescriptor, scalar: &ScalarType) -> Vec<FormatPattern> {
    let translators = scalar.translators();
    if translators.is_empty() {
        return scalar.codec.known_internal_formats(ty);
    }
    union(translators.iter().map(|t| t.known_internal_formats(ty)))
}

/// Undeclared or empty codec formats accept anything.
fn open_match(known: Option<Vec<FormatPattern>>, wire: Option<&WireFormat>) -> bool {
    match known {
        None => true,
        Some(known) if known.is_empty() => true,
        Some(known) => format::matches(wire, &known),
    }
}

fn is_internal(wire: Option<&WireFormat>, internal: Option<&str>) -> bool {
    matches!((wire.and_then(WireFormat::as_name), internal), (Some(w), Some(i)) if w == i)
}

pub(crate) fn can_deserialize(ty: &TypeDescriptor, scalar: &ScalarType, wire: Option<&WireFormat>) -> bool {
    let translators = scalar.translators();
    let internal = ty.internal_format();
    if internal.is_none() && translators.is_empty() {
        return scalar
            .codec
            .can_deserialize(ty, wire)
            .unwrap_or_else(|| open_match(scalar.codec.known_wire_formats(ty), wire));
    }
    if internal == Some(RAW) || is_internal(wire, internal) {
        return true;
    }
    if translators.iter().any(|t| t.can_deserialize(ty, wire, internal)) {
        return true;
    }
    scalar.codec.can_deserialize(ty, wire).unwrap_or(false)
}

pub(crate) fn can_serialize(
    ty: &TypeDescriptor,
    scalar: &ScalarType,
    data: &Value,
    wire: Option<&WireFormat>,
) -> bool {
    let translators = scalar.translators();
    let internal = ty.internal_format();
    if internal.is_none() && translators.is_empty() {
        return scalar
            .codec
            .can_serialize(ty, data, wire)
            .unwrap_or_else(|| open_match(scalar.codec.known_wire_formats(ty), wire));
    }
    if internal == Some(RAW) || is_internal(wire, internal) {
        return true;
    }
    if translators
        .iter()
        .any(|t| t.can_serialize(ty, data, internal, wire))
    {
        return true;
    }
    scalar.codec.can_serialize(ty, data, wire).unwrap_or(false)
}

pub(crate) fn choose_wire_format(
    ty: &TypeDescriptor,
    scalar: &ScalarType,
    data: &Value,
    is_list: bool,
) -> Result<Option<WireFormat>> {
    let translators = scalar.translators();
    if translators.is_empty() {
        return scalar.codec.choose_wire_format(ty, data, is_list);
    }
    let internal = ty.internal_format();
    Ok(translators
        .iter()
        .find(|t| t.can_serialize(ty, data, internal, None))
        .and_then(|t| t.choose_wire_format(ty, data, is_list)))
}

pub(crate) fn is_binary(ty: &TypeDescriptor, scalar: &ScalarType, wire: Option<&WireFormat>) -> bool {
    scalar
        .translators()
        .iter()
        .find_map(|t| t.is_binary(ty, wire))
        .or_else(|| scalar.codec.is_binary(ty, wire))
        .unwrap_or(false)
}

pub(crate) fn deserialize(
    ty: &TypeDescriptor,
    scalar: &ScalarType,
    data: Value,
    wire: Option<&WireFormat>,
) -> Result<Value> {
    let internal = ty.internal_format();
    if internal == Some(RAW) {
        return Ok(data);
    }
    let translators = scalar.translators();
    if translators.is_empty() {
        return scalar.codec.deserialize(ty, data, wire);
    }

    if let Some(wire) = wire {
        if let Some(t) = translators
            .iter()
            .find(|t| t.can_deserialize(ty, Some(wire), internal))
        {
            let target = internal
                .map(str::to_string)
                .or_else(|| first_literal(&t.known_internal_formats(ty)));
            log::debug!(
                "[scalar] {} deserialize {} -> {:?} via {}",
                ty.name(),
                wire,
                target,
                t.name()
            );
            return t.deserialize(ty, data, wire, target.as_deref());
        }
    }

    // No translator claims the format: let them sniff the data.
    for t in &translators {
        if let Some(internal) = internal {
            if !format::matches_name(Some(internal), &t.known_internal_formats(ty)) {
                continue;
            }
        }
        if let Some(value) = t.attempt_deserialize(ty, &data, internal) {
            log::debug!("[scalar] {} sniffed by {}", ty.name(), t.name());
            return Ok(value);
        }
    }

    Err(SerializationError::DeserializeExhausted {
        type_name: ty.name(),
        wire_format: format::describe(wire),
        internal_format: internal.map(str::to_string),
    }
    .into())
}

pub(crate) fn serialize(
    ty: &TypeDescriptor,
    scalar: &ScalarType,
    data: Value,
    wire: Option<&WireFormat>,
) -> Result<Value> {
    let internal = ty.internal_format();
    if internal == Some(RAW) {
        return Ok(data);
    }
    let translators = scalar.translators();
    if translators.is_empty() {
        return scalar.codec.serialize(ty, data, wire);
    }

    if let Some(t) = translators
        .iter()
        .find(|t| t.can_serialize(ty, &data, internal, wire))
    {
        let chosen = match wire {
            Some(wire) => Some(wire.clone()),
            None => t.choose_wire_format(ty, &data, false),
        };
        log::debug!(
            "[scalar] {} serialize {:?} -> {} via {}",
            ty.name(),
            internal,
            format::describe(chosen.as_ref()),
            t.name()
        );
        return t.serialize(ty, data, internal, chosen.as_ref());
    }

    Err(SerializationError::SerializeExhausted {
        type_name: ty.name(),
        wire_format: format::describe(wire),
        internal_format: internal.map(str::to_string),
    }
    .into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::literals;

    struct Passthrough;

    impl TypeCodec for Passthrough {
        fn known_wire_formats(&self, _ty: &TypeDescriptor) -> Option<Vec<FormatPattern>> {
            Some(literals(&["text"]))
        }

        fn deserialize(&self, _ty: &TypeDescriptor, data: Value, _wire: Option<&WireFormat>) -> Result<Value> {
            Ok(data)
        }
    }

    struct Upper;

    impl Translator for Upper {
        fn known_wire_formats(&self, _parent: &TypeDescriptor) -> Vec<FormatPattern> {
            literals(&["upper"])
        }

        fn known_internal_formats(&self, _parent: &TypeDescriptor) -> Vec<FormatPattern> {
            literals(&["text"])
        }

        fn attempt_deserialize(
            &self,
            _parent: &TypeDescriptor,
            data: &Value,
            _internal: Option<&str>,
        ) -> Option<Value> {
            let s = data.as_str()?;
            (s.chars().all(|c| c.is_ascii_uppercase())).then(|| Value::from(s.to_lowercase()))
        }

        fn deserialize(
            &self,
            _parent: &TypeDescriptor,
            data: Value,
            _wire: &WireFormat,
            _internal: Option<&str>,
        ) -> Result<Value> {
            Ok(data.as_str().map(str::to_lowercase).into())
        }

        fn serialize(
            &self,
            _parent: &TypeDescriptor,
            data: Value,
            _internal: Option<&str>,
            _wire: Option<&WireFormat>,
        ) -> Result<Value> {
            Ok(data.as_str().map(str::to_uppercase).into())
        }
    }

    #[test]
    fn test_codec_declared_formats_without_translators() {
        let ty = ScalarType::new("Text", Passthrough).into_descriptor();
        let scalar = ty.as_scalar().unwrap().clone();
        assert!(can_deserialize(&ty, &scalar, Some(&"text".into())));
        assert!(!can_deserialize(&ty, &scalar, Some(&"json".into())));
        assert_eq!(
            choose_wire_format(&ty, &scalar, &Value::Null, false).unwrap(),
            Some("text".into())
        );
    }

    #[test]
    fn test_undeclared_choose_is_not_implemented() {
        struct Bare;
        impl TypeCodec for Bare {}
        let ty = ScalarType::new("Bare", Bare).into_descriptor();
        let scalar = ty.as_scalar().unwrap().clone();
        let err = choose_wire_format(&ty, &scalar, &Value::Null, false).unwrap_err();
        assert!(err.is_not_implemented());
        let err = deserialize(&ty, &scalar, Value::Int(1), None).unwrap_err();
        assert!(err.is_not_implemented());
    }

    #[test]
    fn test_translator_dispatch_and_sniffing() {
        let ty = ScalarType::new("Shout", Passthrough)
            .with_translator(Upper)
            .into_descriptor();
        let scalar = ty.as_scalar().unwrap().clone();

        let out = deserialize(&ty, &scalar, "ABC".into(), Some(&"upper".into())).unwrap();
        assert_eq!(out, Value::from("abc"));

        let out = deserialize(&ty, &scalar, "XYZ".into(), None).unwrap();
        assert_eq!(out, Value::from("xyz"));

        let err = deserialize(&ty, &scalar, "mixed".into(), None).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Shout could not deserialize data from wire format None"
        );

        let out = serialize(&ty, &scalar, "abc".into(), None).unwrap();
        assert_eq!(out, Value::from("ABC"));
    }

    #[test]
    fn test_translator_empty_declaration_is_closed() {
        let ty = ScalarType::new("Shout", Passthrough)
            .with_translator(Upper)
            .into_descriptor();
        let formatted = ty.with_internal_format("lower");
        let scalar = ty.as_scalar().unwrap().clone();
        assert!(!can_deserialize(&formatted, &scalar, Some(&"upper".into())));
        assert!(can_deserialize(&formatted, &scalar, Some(&"lower".into())));

        let err = deserialize(&formatted, &scalar, "ABC".into(), None).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Shout could not deserialize data from wire format None to internal format lower"
        );
    }

    #[test]
    fn test_explicit_internal_format_falls_back_to_sniffing() {
        let ty = ScalarType::new("Shout", Passthrough)
            .with_translator(Upper)
            .into_descriptor();
        let text = ty.with_internal_format("text");
        let scalar = ty.as_scalar().unwrap().clone();
        let wire = WireFormat::name("text");

        assert!(can_deserialize(&text, &scalar, Some(&wire)));
        let out = deserialize(&text, &scalar, "ABC".into(), Some(&wire)).unwrap();
        assert_eq!(out, Value::from("abc"));

        let err = deserialize(&text, &scalar, "Mixed".into(), Some(&wire)).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Shout.text could not deserialize data from wire format text to internal format text"
        );
    }

    #[test]
    fn test_raw_passes_through() {
        let ty = ScalarType::new("Shout", Passthrough)
            .with_translator(Upper)
            .into_descriptor()
            .with_internal_format(RAW);
        let scalar = ty.as_scalar().unwrap().clone();
        assert!(can_deserialize(&ty, &scalar, Some(&"anything".into())));
        assert_eq!(
            deserialize(&ty, &scalar, "MiXeD".into(), Some(&"anything".into())).unwrap(),
            Value::from("MiXeD")
        );
        assert_eq!(
            serialize(&ty, &scalar, "MiXeD".into(), None).unwrap(),
            Value::from("MiXeD")
        );
    }
}
