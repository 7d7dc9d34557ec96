// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Translator plugins.
//!
//! A translator is a stateless strategy attached to one base scalar. It
//! declares the wire and internal formats it handles and converts between
//! them. Several translators can share a base type; dispatch consults them
//! in registration order and the first match wins.
//!
//! Every method receives the `parent` descriptor being dispatched (the base
//! type or one of its derivations).

use crate::descriptor::TypeDescriptor;
use crate::error::Result;
use crate::format::{self, FormatPattern, WireFormat};
use crate::value::Value;

/// Format conversion plugin for a base scalar type.
pub trait Translator: Send + Sync {
    /// Label used in logs.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }

    fn known_wire_formats(&self, parent: &TypeDescriptor) -> Vec<FormatPattern>;

    /// Supported internal formats; the first is the default target.
    fn known_internal_formats(&self, parent: &TypeDescriptor) -> Vec<FormatPattern>;

    /// Wire format used when serializing without an explicit one.
    /// Defaults to the first literal wire format.
    fn choose_wire_format(
        &self,
        parent: &TypeDescriptor,
        _data: &Value,
        _is_list: bool,
    ) -> Option<WireFormat> {
        first_literal(&self.known_wire_formats(parent)).map(WireFormat::Name)
    }

    /// Whether `wire` carries opaque bytes. `None` defers to the next
    /// translator.
    fn is_binary(&self, _parent: &TypeDescriptor, _wire: Option<&WireFormat>) -> Option<bool> {
        None
    }

    fn can_deserialize(
        &self,
        parent: &TypeDescriptor,
        wire: Option<&WireFormat>,
        internal: Option<&str>,
    ) -> bool {
        format::matches(wire, &self.known_wire_formats(parent))
            && format::matches_name(internal, &self.known_internal_formats(parent))
    }

    fn can_serialize(
        &self,
        parent: &TypeDescriptor,
        _data: &Value,
        internal: Option<&str>,
        wire: Option<&WireFormat>,
    ) -> bool {
        format::matches(wire, &self.known_wire_formats(parent))
            && format::matches_name(internal, &self.known_internal_formats(parent))
    }

    /// Best-effort decode of data in an unknown wire format.
    ///
    /// Must not mutate anything and should only return a value when
    /// reasonably confident.
    fn attempt_deserialize(
        &self,
        _parent: &TypeDescriptor,
        _data: &Value,
        _internal: Option<&str>,
    ) -> Option<Value> {
        None
    }

    fn deserialize(
        &self,
        parent: &TypeDescriptor,
        data: Value,
        wire: &WireFormat,
        internal: Option<&str>,
    ) -> Result<Value>;

    fn serialize(
        &self,
        parent: &TypeDescriptor,
        data: Value,
        internal: Option<&str>,
        wire: Option<&WireFormat>,
    ) -> Result<Value>;
}

/// First literal entry of a declaration.
pub fn first_literal(known: &[FormatPattern]) -> Option<String> {
    known.first().and_then(FormatPattern::as_literal).map(str::to_string)
}
