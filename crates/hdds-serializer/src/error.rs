// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Error taxonomy for the serialization engine.
//!
//! - [`SerializationError`]: data-level failures (format mismatch, missing
//!   required data, dispatch exhausted, shape/arity mismatch).
//! - [`BinaryConversionError`]: a leaf could not be bridged between bytes and text.
//! - [`SchemaError`]: programmer errors in a schema or plugin (unimplemented
//!   capability, lists of lists, bad parameters). Raised immediately.
//! - [`RegistryError`]: name grammar and catalogue failures.
//!
//! None of these are retried by the engine.

use crate::config::ConfigError;
use thiserror::Error;

/// Crate-level result alias.
pub type Result<T> = std::result::Result<T, Error>;

/// Any failure raised by the engine.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Serialization(#[from] SerializationError),

    #[error(transparent)]
    Binary(#[from] BinaryConversionError),

    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl Error {
    /// True for data-level errors, binary conversion included.
    pub fn is_serialization(&self) -> bool {
        matches!(self, Self::Serialization(_) | Self::Binary(_))
    }

    /// True when a type or translator did not supply a required override.
    pub fn is_not_implemented(&self) -> bool {
        matches!(self, Self::Schema(SchemaError::NotImplemented { .. }))
    }
}

/// Data-level (de)serialization failures.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SerializationError {
    #[error("{type_name} does not accept wire format {format}")]
    UnsupportedFormat { type_name: String, format: String },

    #[error("data is required for {type_name}")]
    DataRequired { type_name: String },

    #[error("{type_name} could not deserialize data from wire format {wire_format}{}", internal_suffix(.internal_format))]
    DeserializeExhausted {
        type_name: String,
        wire_format: String,
        internal_format: Option<String>,
    },

    #[error("{type_name} could not serialize data{} to wire format {wire_format}", internal_prefix(.internal_format))]
    SerializeExhausted {
        type_name: String,
        wire_format: String,
        internal_format: Option<String>,
    },

    #[error("{type_name} requires exactly {expected} elements at index {}, got {got}", format_index(.index))]
    ShapeMismatch {
        type_name: String,
        index: Vec<usize>,
        expected: usize,
        got: usize,
    },

    #[error("{type_name}: {message}")]
    InvalidData { type_name: String, message: String },
}

impl SerializationError {
    pub(crate) fn invalid(type_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidData {
            type_name: type_name.into(),
            message: message.into(),
        }
    }
}

fn internal_suffix(internal: &Option<String>) -> String {
    internal
        .as_ref()
        .map(|fmt| format!(" to internal format {}", fmt))
        .unwrap_or_default()
}

fn internal_prefix(internal: &Option<String>) -> String {
    internal
        .as_ref()
        .map(|fmt| format!(" from internal format {}", fmt))
        .unwrap_or_default()
}

/// Render a multi-axis index the way tuples print: `()`, `(1,)`, `(0, 2)`.
pub fn format_index(index: &[usize]) -> String {
    match index {
        [] => "()".to_string(),
        [single] => format!("({},)", single),
        many => {
            let parts: Vec<String> = many.iter().map(ToString::to_string).collect();
            format!("({})", parts.join(", "))
        }
    }
}

/// A leaf value could not be converted between binary and text form.
#[derive(Debug, Error)]
pub enum BinaryConversionError {
    #[error("cannot convert {found} between binary and text form")]
    NotBinary { found: &'static str },

    #[error("invalid base64 payload: {0}")]
    InvalidBase64(#[from] base64::DecodeError),

    #[error("failed to read byte source: {0}")]
    Read(#[from] std::io::Error),
}

/// Schema-authoring and plugin errors.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SchemaError {
    #[error("{operation}() not implemented in {type_name}")]
    NotImplemented {
        type_name: String,
        operation: &'static str,
    },

    #[error("cannot have lists of lists ({type_name})")]
    ListOfLists { type_name: String },

    #[error("{type_name} does not accept parameters")]
    ParametersNotAccepted { type_name: String },

    #[error("invalid parameters for {type_name}: {message}")]
    InvalidParameters { type_name: String, message: String },

    #[error("{type_name} has no field named {field}")]
    UnknownField { type_name: String, field: String },

    #[error("duplicate field {field} in {type_name}")]
    DuplicateField { type_name: String, field: String },

    #[error("{type_name} takes at most {expected} values, got {got}")]
    Arity {
        type_name: String,
        expected: usize,
        got: usize,
    },

    #[error("{type_name} is not a record type")]
    NotARecord { type_name: String },
}

/// Name grammar and catalogue errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("invalid type name: {0}")]
    InvalidName(String),

    #[error("unknown type name {0}")]
    UnknownType(String),

    #[error("a different type named {0} is already registered")]
    Conflict(String),
}
