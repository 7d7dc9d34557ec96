// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Builtin scalar types.
//!
//! | Name     | In memory            | Wire                           |
//! |----------|----------------------|--------------------------------|
//! | `Bool`   | `Value::Bool`        | any, coerced                   |
//! | `Int`    | `Value::Int`         | any, coerced                   |
//! | `Float`  | `Value::Float`       | any, coerced                   |
//! | `String` | `Value::String`      | any, coerced                   |
//! | `Blob`   | `Value::Bytes`       | base64 text                    |
//! | `Json`   | structured value     | JSON text                      |
//! | `Vector` | list of floats       | `list`                         |
//! | `Matrix` | list of float rows   | `list`                         |
//!
//! Primitives derived with internal format `default` turn `None` into the
//! zero value of their type. `Float` lists are eligible for the
//! `Vector`/`Matrix` specialization.

use crate::codec::TypeCodec;
use crate::descriptor::{Parameters, TypeDescriptor};
use crate::error::{Result, SchemaError, SerializationError};
use crate::format::{self, FormatPattern, WireFormat};
use crate::scalar::ScalarType;
use crate::value::Value;
use std::sync::OnceLock;

/// Internal format under which primitives are none-safe.
pub const DEFAULT: &str = "default";

// ---------------------------------------------------------------------------
// Primitives
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Primitive {
    Bool,
    Int,
    Float,
    String,
}

impl Primitive {
    fn zero(self) -> Value {
        match self {
            Self::Bool => Value::Bool(false),
            Self::Int => Value::Int(0),
            Self::Float => Value::Float(0.0),
            Self::String => Value::String(String::new()),
        }
    }

    fn coerce(self, ty: &TypeDescriptor, data: Value) -> Result<Value> {
        if data.is_null() && ty.internal_format() == Some(DEFAULT) {
            return Ok(self.zero());
        }
        let coerced = match (self, &data) {
            (Self::Bool, Value::Bool(_)) | (Self::Int, Value::Int(_)) | (Self::Float, Value::Float(_)) => {
                Some(data.clone())
            }
            (Self::String, Value::String(_)) => Some(data.clone()),

            (Self::Bool, Value::Int(i)) => Some(Value::Bool(*i != 0)),
            (Self::Bool, Value::Float(f)) => Some(Value::Bool(*f != 0.0)),
            (Self::Bool, Value::String(s)) => match s.trim() {
                "true" | "True" | "1" => Some(Value::Bool(true)),
                "false" | "False" | "0" | "" => Some(Value::Bool(false)),
                _ => None,
            },

            (Self::Int, Value::Bool(b)) => Some(Value::Int(i64::from(*b))),
            (Self::Int, Value::Float(f)) if fits_i64(*f) => Some(Value::Int(f.trunc() as i64)),
            (Self::Int, Value::String(s)) => s.trim().parse().ok().map(Value::Int),

            (Self::Float, Value::Bool(b)) => Some(Value::Float(if *b { 1.0 } else { 0.0 })),
            (Self::Float, Value::Int(i)) => Some(Value::Float(*i as f64)),
            (Self::Float, Value::String(s)) => s.trim().parse().ok().map(Value::Float),

            (Self::String, Value::Bool(b)) => Some(Value::String(b.to_string())),
            (Self::String, Value::Int(i)) => Some(Value::String(i.to_string())),
            (Self::String, Value::Float(f)) => Some(Value::String(format!("{:?}", f))),
            (Self::String, Value::Bytes(bytes)) => String::from_utf8(bytes.clone()).ok().map(Value::String),
            _ => None,
        };
        coerced.ok_or_else(|| {
            SerializationError::invalid(
                ty.name(),
                format!("cannot convert {} to {:?}", data.kind_name(), self),
            )
            .into()
        })
    }
}

/// Truncated `f` lies in `[-2^63, 2^63)`.
fn fits_i64(f: f64) -> bool {
    const BOUND: f64 = 9_223_372_036_854_775_808.0;
    f.is_finite() && (-BOUND..BOUND).contains(&f.trunc())
}

struct PrimitiveCodec(Primitive);

impl TypeCodec for PrimitiveCodec {
    fn known_wire_formats(&self, _ty: &TypeDescriptor) -> Option<Vec<FormatPattern>> {
        Some(Vec::new())
    }

    fn is_none_safe(&self, ty: &TypeDescriptor) -> bool {
        ty.internal_format() == Some(DEFAULT)
    }

    fn can_deserialize(&self, _ty: &TypeDescriptor, _wire: Option<&WireFormat>) -> Option<bool> {
        Some(true)
    }

    fn can_serialize(&self, _ty: &TypeDescriptor, _data: &Value, _wire: Option<&WireFormat>) -> Option<bool> {
        Some(true)
    }

    fn deserialize(&self, ty: &TypeDescriptor, data: Value, _wire: Option<&WireFormat>) -> Result<Value> {
        self.0.coerce(ty, data)
    }

    fn serialize(&self, ty: &TypeDescriptor, data: Value, _wire: Option<&WireFormat>) -> Result<Value> {
        self.0.coerce(ty, data)
    }
}

// ---------------------------------------------------------------------------
// Blob / Json
// ---------------------------------------------------------------------------

struct BlobCodec;

impl TypeCodec for BlobCodec {
    fn choose_wire_format(&self, _ty: &TypeDescriptor, _data: &Value, _is_list: bool) -> Result<Option<WireFormat>> {
        Ok(None)
    }

    fn is_binary(&self, _ty: &TypeDescriptor, _wire: Option<&WireFormat>) -> Option<bool> {
        Some(true)
    }

    fn can_deserialize(&self, _ty: &TypeDescriptor, _wire: Option<&WireFormat>) -> Option<bool> {
        Some(true)
    }

    fn can_serialize(&self, _ty: &TypeDescriptor, _data: &Value, _wire: Option<&WireFormat>) -> Option<bool> {
        Some(true)
    }

    fn deserialize(&self, _ty: &TypeDescriptor, data: Value, _wire: Option<&WireFormat>) -> Result<Value> {
        Ok(data)
    }

    fn serialize(&self, _ty: &TypeDescriptor, data: Value, _wire: Option<&WireFormat>) -> Result<Value> {
        Ok(data)
    }
}

struct JsonCodec;

impl TypeCodec for JsonCodec {
    fn choose_wire_format(&self, _ty: &TypeDescriptor, _data: &Value, _is_list: bool) -> Result<Option<WireFormat>> {
        Ok(None)
    }

    fn can_deserialize(&self, _ty: &TypeDescriptor, _wire: Option<&WireFormat>) -> Option<bool> {
        Some(true)
    }

    fn can_serialize(&self, _ty: &TypeDescriptor, _data: &Value, _wire: Option<&WireFormat>) -> Option<bool> {
        Some(true)
    }

    fn deserialize(&self, ty: &TypeDescriptor, data: Value, _wire: Option<&WireFormat>) -> Result<Value> {
        match data {
            Value::Null => Ok(Value::Null),
            Value::String(text) if text.trim().is_empty() => Ok(Value::Null),
            Value::String(text) => serde_json::from_str::<serde_json::Value>(&text)
                .map(Value::from_json)
                .map_err(|e| SerializationError::invalid(ty.name(), e.to_string()).into()),
            other => Err(SerializationError::invalid(
                ty.name(),
                format!("expected JSON text, got {}", other.kind_name()),
            )
            .into()),
        }
    }

    fn serialize(&self, ty: &TypeDescriptor, data: Value, _wire: Option<&WireFormat>) -> Result<Value> {
        let json = data.to_json()?;
        serde_json::to_string(&json)
            .map(Value::String)
            .map_err(|e| SerializationError::invalid(ty.name(), e.to_string()).into())
    }
}

// ---------------------------------------------------------------------------
// Vector / Matrix
// ---------------------------------------------------------------------------

const LIST: &str = "list";
const ROW_FORMATS: [&str; 2] = ["row", "rowmatrix"];
const COL_FORMATS: [&str; 4] = ["col", "column", "colmatrix", "columnmatrix"];

fn dimension(value: Option<&Value>) -> Option<usize> {
    value
        .and_then(Value::as_i64)
        .and_then(|n| usize::try_from(n).ok())
        .filter(|n| *n > 0)
}

fn check_dimension(ty: &TypeDescriptor, value: &Value) -> std::result::Result<(), SchemaError> {
    match value {
        Value::Null => Ok(()),
        Value::Int(n) if *n > 0 => Ok(()),
        other => Err(SchemaError::InvalidParameters {
            type_name: ty.name(),
            message: format!("dimension must be a positive integer or None, got {}", other.kind_name()),
        }),
    }
}

fn to_float(ty: &TypeDescriptor, value: &Value) -> Result<f64> {
    value.as_f64().ok_or_else(|| {
        SerializationError::invalid(ty.name(), format!("expected a number, got {}", value.kind_name())).into()
    })
}

/// Flatten a vector given flat, as a row or as a column.
fn flatten(ty: &TypeDescriptor, data: &Value) -> Result<Vec<f64>> {
    let Some(items) = data.as_list() else {
        return Err(SerializationError::invalid(ty.name(), format!("expected a list, got {}", data.kind_name())).into());
    };
    let mut out = Vec::with_capacity(items.len());
    for item in items {
        match item.as_list() {
            Some(inner) => {
                for value in inner {
                    out.push(to_float(ty, value)?);
                }
            }
            None => out.push(to_float(ty, item)?),
        }
    }
    Ok(out)
}

fn floats(values: impl IntoIterator<Item = f64>) -> Value {
    Value::List(values.into_iter().map(Value::Float).collect())
}

struct VectorCodec;

impl VectorCodec {
    fn checked(&self, ty: &TypeDescriptor, data: &Value) -> Result<Vec<f64>> {
        let values = flatten(ty, data)?;
        if let Some(dim) = dimension(ty.parameter_list().first()) {
            if values.len() != dim {
                return Err(SerializationError::invalid(
                    ty.name(),
                    format!("this vector must have dimension {}, but it is {}", dim, values.len()),
                )
                .into());
            }
        }
        Ok(values)
    }
}

impl TypeCodec for VectorCodec {
    fn known_wire_formats(&self, _ty: &TypeDescriptor) -> Option<Vec<FormatPattern>> {
        Some(format::literals(&[LIST]))
    }

    fn known_internal_formats(&self, _ty: &TypeDescriptor) -> Vec<FormatPattern> {
        format::literals(&["row", "rowmatrix", "col", "column", "colmatrix", "columnmatrix"])
    }

    fn is_binary(&self, _ty: &TypeDescriptor, _wire: Option<&WireFormat>) -> Option<bool> {
        Some(false)
    }

    fn can_deserialize(&self, _ty: &TypeDescriptor, wire: Option<&WireFormat>) -> Option<bool> {
        Some(format::matches(wire, &format::literals(&[LIST])))
    }

    fn can_serialize(&self, ty: &TypeDescriptor, _data: &Value, wire: Option<&WireFormat>) -> Option<bool> {
        self.can_deserialize(ty, wire)
    }

    fn deserialize(&self, ty: &TypeDescriptor, data: Value, _wire: Option<&WireFormat>) -> Result<Value> {
        let values = self.checked(ty, &data)?;
        let internal = ty.internal_format().unwrap_or_default();
        if ROW_FORMATS.contains(&internal) {
            return Ok(Value::List(vec![floats(values)]));
        }
        if COL_FORMATS.contains(&internal) {
            return Ok(Value::List(values.into_iter().map(|v| floats([v])).collect()));
        }
        Ok(floats(values))
    }

    fn serialize(&self, ty: &TypeDescriptor, data: Value, _wire: Option<&WireFormat>) -> Result<Value> {
        Ok(floats(self.checked(ty, &data)?))
    }

    fn check_parameters(
        &self,
        ty: &TypeDescriptor,
        params: Parameters,
    ) -> std::result::Result<Parameters, SchemaError> {
        if !params.named.is_empty() || params.positional.len() != 1 || !ty.parameter_list().is_empty() {
            return Err(SchemaError::InvalidParameters {
                type_name: ty.name(),
                message: "Vector parameter must be the dimension".to_string(),
            });
        }
        check_dimension(ty, &params.positional[0])?;
        Ok(params)
    }
}

struct MatrixCodec;

impl MatrixCodec {
    fn checked(&self, ty: &TypeDescriptor, data: &Value) -> Result<Value> {
        let params = ty.parameter_list();
        let rows = dimension(params.first());
        let cols = dimension(params.get(1));
        let Some(items) = data.as_list() else {
            return Err(SerializationError::invalid(ty.name(), format!("expected a list, got {}", data.kind_name())).into());
        };
        if let Some(rows) = rows {
            if items.len() != rows {
                return Err(SerializationError::invalid(
                    ty.name(),
                    format!("this matrix must have {} rows, but it has {}", rows, items.len()),
                )
                .into());
            }
        }
        let mut out = Vec::with_capacity(items.len());
        for (idx, row) in items.iter().enumerate() {
            let Some(row) = row.as_list() else {
                return Err(SerializationError::invalid(ty.name(), format!("row {} is not a list", idx)).into());
            };
            if let Some(cols) = cols {
                if row.len() != cols {
                    return Err(SerializationError::invalid(
                        ty.name(),
                        format!("this matrix must have {} cols, but row {} has {}", cols, idx, row.len()),
                    )
                    .into());
                }
            }
            let row = row.iter().map(|v| to_float(ty, v)).collect::<Result<Vec<_>>>()?;
            out.push(floats(row));
        }
        Ok(Value::List(out))
    }
}

impl TypeCodec for MatrixCodec {
    fn known_wire_formats(&self, _ty: &TypeDescriptor) -> Option<Vec<FormatPattern>> {
        Some(format::literals(&[LIST]))
    }

    fn is_binary(&self, _ty: &TypeDescriptor, _wire: Option<&WireFormat>) -> Option<bool> {
        Some(false)
    }

    fn can_deserialize(&self, _ty: &TypeDescriptor, wire: Option<&WireFormat>) -> Option<bool> {
        Some(format::matches(wire, &format::literals(&[LIST])))
    }

    fn can_serialize(&self, ty: &TypeDescriptor, _data: &Value, wire: Option<&WireFormat>) -> Option<bool> {
        self.can_deserialize(ty, wire)
    }

    fn deserialize(&self, ty: &TypeDescriptor, data: Value, _wire: Option<&WireFormat>) -> Result<Value> {
        self.checked(ty, &data)
    }

    fn serialize(&self, ty: &TypeDescriptor, data: Value, _wire: Option<&WireFormat>) -> Result<Value> {
        self.checked(ty, &data)
    }

    fn check_parameters(
        &self,
        ty: &TypeDescriptor,
        params: Parameters,
    ) -> std::result::Result<Parameters, SchemaError> {
        if !params.named.is_empty() || params.positional.len() != 2 || !ty.parameter_list().is_empty() {
            return Err(SchemaError::InvalidParameters {
                type_name: ty.name(),
                message: "Matrix parameters must be rows and columns".to_string(),
            });
        }
        for value in &params.positional {
            check_dimension(ty, value)?;
        }
        Ok(params)
    }
}

// ---------------------------------------------------------------------------
// Catalogue
// ---------------------------------------------------------------------------

struct Builtins {
    boolean: TypeDescriptor,
    int: TypeDescriptor,
    float: TypeDescriptor,
    string: TypeDescriptor,
    blob: TypeDescriptor,
    json: TypeDescriptor,
    vector: TypeDescriptor,
    matrix: TypeDescriptor,
}

fn builtins() -> &'static Builtins {
    static BUILTINS: OnceLock<Builtins> = OnceLock::new();
    BUILTINS.get_or_init(|| Builtins {
        boolean: ScalarType::new("Bool", PrimitiveCodec(Primitive::Bool)).into_descriptor(),
        int: ScalarType::new("Int", PrimitiveCodec(Primitive::Int)).into_descriptor(),
        float: ScalarType::new("Float", PrimitiveCodec(Primitive::Float))
            .with_vector_specialization()
            .into_descriptor(),
        string: ScalarType::new("String", PrimitiveCodec(Primitive::String)).into_descriptor(),
        blob: ScalarType::new("Blob", BlobCodec).into_descriptor(),
        json: ScalarType::new("Json", JsonCodec).into_descriptor(),
        vector: ScalarType::new("Vector", VectorCodec).into_descriptor(),
        matrix: ScalarType::new("Matrix", MatrixCodec).into_descriptor(),
    })
}

pub fn boolean() -> TypeDescriptor {
    builtins().boolean.clone()
}

pub fn int() -> TypeDescriptor {
    builtins().int.clone()
}

pub fn float() -> TypeDescriptor {
    builtins().float.clone()
}

pub fn string() -> TypeDescriptor {
    builtins().string.clone()
}

/// Opaque bytes, base64 on text transports.
pub fn blob() -> TypeDescriptor {
    builtins().blob.clone()
}

/// Structured value carried as JSON text.
pub fn json() -> TypeDescriptor {
    builtins().json.clone()
}

/// Float vector; `Vector(n)` fixes the dimension.
pub fn vector() -> TypeDescriptor {
    builtins().vector.clone()
}

/// Float matrix; `Matrix(r, c)` fixes rows and columns, `None` leaves one open.
pub fn matrix() -> TypeDescriptor {
    builtins().matrix.clone()
}

/// Every builtin type.
pub fn all() -> Vec<TypeDescriptor> {
    vec![boolean(), int(), float(), string(), blob(), json(), vector(), matrix()]
}
