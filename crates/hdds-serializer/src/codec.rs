// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Direct capability overrides of a scalar type.
//!
//! A [`TypeCodec`] is what a simple scalar implements instead of (or in
//! addition to) attaching translators. Every method receives the concrete
//! descriptor being dispatched, so internal format and parameters are
//! visible. Defaults mean "not overridden".

use crate::descriptor::{Parameters, TypeDescriptor};
use crate::error::{Result, SchemaError};
use crate::format::{FormatPattern, WireFormat};
use crate::value::Value;

/// Capability contract of a scalar type.
pub trait TypeCodec: Send + Sync {
    /// Declared wire formats. `None` leaves the type unconstrained.
    fn known_wire_formats(&self, _ty: &TypeDescriptor) -> Option<Vec<FormatPattern>> {
        None
    }

    /// Declared internal formats, default target first.
    fn known_internal_formats(&self, _ty: &TypeDescriptor) -> Vec<FormatPattern> {
        Vec::new()
    }

    /// Pick a wire format for serialization when the caller gave none.
    ///
    /// Defaults to the first declared wire format. Types that declare no
    /// formats, or whose first declaration is a pattern, must override.
    fn choose_wire_format(
        &self,
        ty: &TypeDescriptor,
        _data: &Value,
        _is_list: bool,
    ) -> Result<Option<WireFormat>> {
        let not_implemented = || SchemaError::NotImplemented {
            type_name: ty.name(),
            operation: "choose_wire_format",
        };
        let known = self.known_wire_formats(ty).ok_or_else(not_implemented)?;
        match known.first() {
            None => Ok(None),
            Some(FormatPattern::Literal(name)) => Ok(Some(WireFormat::Name(name.clone()))),
            Some(FormatPattern::Pattern(_)) => Err(not_implemented().into()),
        }
    }

    /// Whether data in `wire` is opaque bytes. `None` when undecided.
    fn is_binary(&self, _ty: &TypeDescriptor, _wire: Option<&WireFormat>) -> Option<bool> {
        None
    }

    /// Whether `None` input maps to a default value instead of `None`.
    fn is_none_safe(&self, _ty: &TypeDescriptor) -> bool {
        false
    }

    fn can_deserialize(&self, _ty: &TypeDescriptor, _wire: Option<&WireFormat>) -> Option<bool> {
        None
    }

    fn can_serialize(
        &self,
        _ty: &TypeDescriptor,
        _data: &Value,
        _wire: Option<&WireFormat>,
    ) -> Option<bool> {
        None
    }

    fn deserialize(&self, ty: &TypeDescriptor, _data: Value, _wire: Option<&WireFormat>) -> Result<Value> {
        Err(SchemaError::NotImplemented {
            type_name: ty.name(),
            operation: "deserialize",
        }
        .into())
    }

    fn serialize(&self, ty: &TypeDescriptor, _data: Value, _wire: Option<&WireFormat>) -> Result<Value> {
        Err(SchemaError::NotImplemented {
            type_name: ty.name(),
            operation: "serialize",
        }
        .into())
    }

    /// Validate and normalize constructor parameters. Accepts anything by default.
    fn check_parameters(
        &self,
        _ty: &TypeDescriptor,
        params: Parameters,
    ) -> std::result::Result<Parameters, SchemaError> {
        Ok(params)
    }
}

/// Codec backed by a plain function, applied in both directions.
pub(crate) struct FnCodec<F> {
    func: F,
}

impl<F> FnCodec<F> {
    pub(crate) fn new(func: F) -> Self {
        Self { func }
    }
}

impl<F> TypeCodec for FnCodec<F>
where
    F: Fn(Value) -> Result<Value> + Send + Sync,
{
    fn choose_wire_format(
        &self,
        _ty: &TypeDescriptor,
        _data: &Value,
        _is_list: bool,
    ) -> Result<Option<WireFormat>> {
        Ok(None)
    }

    fn can_deserialize(&self, _ty: &TypeDescriptor, _wire: Option<&WireFormat>) -> Option<bool> {
        Some(true)
    }

    fn can_serialize(
        &self,
        _ty: &TypeDescriptor,
        _data: &Value,
        _wire: Option<&WireFormat>,
    ) -> Option<bool> {
        Some(true)
    }

    fn deserialize(&self, _ty: &TypeDescriptor, data: Value, _wire: Option<&WireFormat>) -> Result<Value> {
        (self.func)(data)
    }

    fn serialize(&self, _ty: &TypeDescriptor, data: Value, _wire: Option<&WireFormat>) -> Result<Value> {
        (self.func)(data)
    }
}
