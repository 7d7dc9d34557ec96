// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! # hdds-serializer - Schema-driven serialization engine
//!
//! Types are declared once as [`TypeDescriptor`]s and the engine converts
//! values between any number of **wire formats** (the representation on a
//! transport) and **internal formats** (the representation a consumer
//! wants), negotiated per call.
//!
//! ## Quick Start
//!
//! ```rust
//! use hdds_serializer::{builtins, deserialize, serialize, RecordBuilder, Value};
//!
//! # fn main() -> hdds_serializer::Result<()> {
//! let tag = RecordBuilder::new("Tag")
//!     .field("id", builtins::int().field())
//!     .field("label", builtins::string().field())
//!     .build()?;
//!
//! let wire = Value::map([("id", "5"), ("label", "x")]);
//! let record = deserialize(&tag, wire, None)?;
//! assert_eq!(record.get("id"), Some(&Value::Int(5)));
//!
//! let back = serialize(&tag, record, None)?;
//! assert_eq!(back, Value::map([("id", Value::Int(5)), ("label", Value::from("x"))]));
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! serialize / deserialize            (none/required policy, format checks)
//!   +-- TypeDescriptor dispatch      (per kind)
//!   |     +-- Scalar: TypeCodec + ordered Translators
//!   |     +-- Record / List / Dict: recurse per field, element, entry
//!   +-- binary/text bridge           (when the wire format carries bytes)
//!
//! TypeRegistry                       (name grammar, catalogues, finders)
//! ```
//!
//! ## Key Types
//!
//! | Type | Description |
//! |------|-------------|
//! | [`TypeDescriptor`] | Immutable schema node and its derivation chain |
//! | [`TypeCodec`] | Direct capability overrides of a scalar |
//! | [`Translator`] | Pluggable wire/internal format conversion |
//! | [`WireFormat`] | Named or structured (per field/element/key) format |
//! | [`TypeRegistry`] | Name-indexed catalogue with fallback finders |
//! | [`EngineConfig`] | Process-wide engine settings |

pub mod bridge;
pub mod builtins;
pub mod codec;
pub mod composite;
pub mod config;
pub mod descriptor;
mod dispatch;
pub mod error;
pub mod format;
pub mod registry;
pub mod scalar;
pub mod translator;
pub mod value;

pub use bridge::binary_to_text;
pub use codec::TypeCodec;
pub use composite::{FieldMarker, RecordBuilder, RecordField, RecordType, RecordValue};
pub use config::EngineConfig;
pub use descriptor::{Derivation, DictType, ListType, Parameters, Shape, TypeDescriptor, TypeKind};
pub use dispatch::{deserialize, serialize};
pub use error::{
    BinaryConversionError, Error, RegistryError, Result, SchemaError, SerializationError,
};
pub use format::{FormatPattern, WireFormat};
pub use registry::{Finder, TypeRegistry};
pub use scalar::ScalarType;
pub use translator::Translator;
pub use value::{ByteSource, Value};
