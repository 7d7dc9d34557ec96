// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Type descriptors and the derivation algebra.
//!
//! A [`TypeDescriptor`] describes a class of values, not a value. Base types
//! (scalars, records, maps) are roots; every derivation produces a new
//! descriptor that keeps a link to its immediate parent:
//!
//! - `Parameterized`: constructor parameters, validated by the scalar's codec
//! - `Formatted`: a chosen internal format
//! - `Required`: `None` input becomes an error
//! - `Shaped`: wrapped as a list with per-axis size constraints
//!
//! Descriptors are immutable and cheap to clone. Equality is structural and
//! the canonical [`name`](TypeDescriptor::name) is a pure function of the
//! derivation, so the registry can intern derived types by name.
//!
//! # Example
//!
//! ```rust,ignore
//! use hdds_serializer::{builtins, Shape};
//!
//! let ids = builtins::int().required().as_list(Shape::fixed(3))?;
//! assert_eq!(ids.name(), "Int.required[3]");
//! ```

mod params;

pub use params::{Parameters, Shape};

use crate::builtins;
use crate::composite::{FieldMarker, RecordType};
use crate::config;
use crate::error::SchemaError;
use crate::scalar::ScalarType;
use crate::translator::Translator;
use crate::value::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Internal format that marks a type as required instead of binding a format.
pub const REQUIRED: &str = "required";

/// Internal format that passes scalar data through untouched.
pub const RAW: &str = "raw";

/// List internal format that makes every element required.
pub const ENTRIES_REQUIRED: &str = "entries_required";

/// How a descriptor was produced from its parent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Derivation {
    Basic,
    Parameterized,
    Formatted,
    Required,
    Shaped,
}

/// Structural kind of a descriptor.
#[derive(Debug, Clone)]
pub enum TypeKind {
    /// Scalar, implemented by a codec and/or translators.
    Scalar(Arc<ScalarType>),
    /// Ordered record of named fields.
    Record(Arc<RecordType>),
    /// Homogeneous list with a shape.
    List(ListType),
    /// Key/value map.
    Dict(DictType),
}

/// List descriptor payload.
#[derive(Debug, Clone, PartialEq)]
pub struct ListType {
    pub element: TypeDescriptor,
    pub shape: Shape,
}

/// Map descriptor payload.
#[derive(Debug, Clone, PartialEq)]
pub struct DictType {
    pub key: TypeDescriptor,
    pub value: TypeDescriptor,
}

struct TypeNode {
    kind: TypeKind,
    derivation: Derivation,
    parent: Option<TypeDescriptor>,
    internal_format: Option<String>,
    required: bool,
    parameters: Parameters,
}

/// A type-level schema node.
#[derive(Clone)]
pub struct TypeDescriptor {
    node: Arc<TypeNode>,
}

impl TypeDescriptor {
    fn from_node(node: TypeNode) -> Self {
        Self {
            node: Arc::new(node),
        }
    }

    /// New root descriptor. The `required` flag starts from the installed
    /// configuration.
    pub(crate) fn root(kind: TypeKind) -> Self {
        Self::from_node(TypeNode {
            kind,
            derivation: Derivation::Basic,
            parent: None,
            internal_format: None,
            required: config::current().required_by_default,
            parameters: Parameters::default(),
        })
    }

    /// Map type with the given key and value types.
    pub fn dict(key: TypeDescriptor, value: TypeDescriptor) -> Self {
        Self::root(TypeKind::Dict(DictType { key, value }))
    }

    fn derived(&self, derivation: Derivation) -> TypeNode {
        TypeNode {
            kind: self.node.kind.clone(),
            derivation,
            parent: Some(self.clone()),
            internal_format: self.node.internal_format.clone(),
            required: self.node.required,
            parameters: self.node.parameters.clone(),
        }
    }

    // -----------------------------------------------------------------------
    // Derivations
    // -----------------------------------------------------------------------

    /// Bind an internal format. `"required"` marks the type required instead.
    pub fn with_internal_format(&self, internal_format: &str) -> Self {
        if internal_format == REQUIRED {
            return self.required();
        }
        let mut node = self.derived(Derivation::Formatted);
        node.internal_format = Some(internal_format.to_string());
        Self::from_node(node)
    }

    /// Mark the type required: deserializing or serializing `None` fails.
    pub fn required(&self) -> Self {
        let mut node = self.derived(Derivation::Required);
        node.required = true;
        Self::from_node(node)
    }

    /// Add constructor parameters.
    ///
    /// Only scalars accept parameters; the scalar's codec may reject or
    /// normalize them. Parameters accumulate across chained calls.
    pub fn with_parameters(&self, params: Parameters) -> Result<Self, SchemaError> {
        let TypeKind::Scalar(scalar) = &self.node.kind else {
            return Err(SchemaError::ParametersNotAccepted {
                type_name: self.name(),
            });
        };
        let params = scalar.codec().check_parameters(self, params)?;
        let mut node = self.derived(Derivation::Parameterized);
        node.parameters.extend(params);
        Ok(Self::from_node(node))
    }

    /// Positional-parameter shorthand for [`with_parameters`](Self::with_parameters).
    pub fn with_args<I, V>(&self, args: I) -> Result<Self, SchemaError>
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.with_parameters(Parameters::positional(args))
    }

    /// Wrap as a list, honoring the installed list autoconversion setting.
    pub fn as_list(&self, shape: impl Into<Shape>) -> Result<Self, SchemaError> {
        self.as_list_with(shape, config::current().autoconvert_list)
    }

    /// Wrap as a list. With `autoconvert`, lists of vector-eligible scalars
    /// become `Vector` (one axis, or one axis of size 1) or `Matrix` types.
    pub fn as_list_with(&self, shape: impl Into<Shape>, autoconvert: bool) -> Result<Self, SchemaError> {
        if matches!(self.node.kind, TypeKind::List(_)) {
            return Err(SchemaError::ListOfLists {
                type_name: self.name(),
            });
        }
        let shape = shape.into();
        if autoconvert && self.is_vector_eligible() {
            if let Some(special) = self.specialize(&shape)? {
                log::debug!("[descriptor] {}{} specialized to {}", self.name(), shape, special.name());
                return Ok(special);
            }
        }
        Ok(Self::from_node(TypeNode {
            kind: TypeKind::List(ListType {
                element: self.clone(),
                shape,
            }),
            derivation: Derivation::Shaped,
            parent: Some(self.clone()),
            internal_format: None,
            required: config::current().required_by_default,
            parameters: Parameters::default(),
        }))
    }

    fn specialize(&self, shape: &Shape) -> Result<Option<Self>, SchemaError> {
        let special = match *shape.axes() {
            [dim] => vector_of(dim)?,
            [Some(1), cols] if cols != Some(1) => vector_of(cols)?.with_internal_format("row"),
            [rows, Some(1)] if rows != Some(1) => vector_of(rows)?.with_internal_format("col"),
            [None, None] => builtins::matrix(),
            [rows, cols] => builtins::matrix().with_args([dim_value(rows), dim_value(cols)])?,
            _ => return Ok(None),
        };
        if self.node.required && !special.is_required() {
            return Ok(Some(special.required()));
        }
        Ok(Some(special))
    }

    /// Marker for declaring a record field; markers order fields by creation.
    pub fn field(&self) -> FieldMarker {
        FieldMarker::new(self.clone())
    }

    // -----------------------------------------------------------------------
    // Introspection
    // -----------------------------------------------------------------------

    pub fn kind(&self) -> &TypeKind {
        &self.node.kind
    }

    pub fn derivation(&self) -> Derivation {
        self.node.derivation
    }

    pub fn internal_format(&self) -> Option<&str> {
        self.node.internal_format.as_deref()
    }

    pub fn is_required(&self) -> bool {
        self.node.required
    }

    pub fn parameters(&self) -> &Parameters {
        &self.node.parameters
    }

    pub fn parameter_list(&self) -> &[Value] {
        &self.node.parameters.positional
    }

    pub fn parameter_dict(&self) -> &BTreeMap<String, Value> {
        &self.node.parameters.named
    }

    /// True for roots that are not lists.
    pub fn is_basic_type(&self) -> bool {
        self.node.derivation == Derivation::Basic
    }

    /// Immediate derivation source.
    pub fn parent_type(&self) -> Option<&TypeDescriptor> {
        self.node.parent.as_ref()
    }

    /// Root of the parameter/format/required chain. Lists are their own base.
    pub fn base_type(&self) -> TypeDescriptor {
        self.walk_up(|d| {
            matches!(
                d,
                Derivation::Parameterized | Derivation::Formatted | Derivation::Required
            )
        })
    }

    /// This type without its internal-format and required derivations.
    /// Parameters are retained.
    pub fn unformatted_type(&self) -> TypeDescriptor {
        self.walk_up(|d| matches!(d, Derivation::Formatted | Derivation::Required))
    }

    fn walk_up(&self, through: impl Fn(Derivation) -> bool) -> TypeDescriptor {
        let mut current = self;
        while through(current.node.derivation) {
            match &current.node.parent {
                Some(parent) => current = parent,
                None => break,
            }
        }
        current.clone()
    }

    fn has_required_derivation(&self) -> bool {
        let mut current = self;
        loop {
            match current.node.derivation {
                Derivation::Required => return true,
                Derivation::Basic | Derivation::Shaped => return false,
                Derivation::Parameterized | Derivation::Formatted => match &current.node.parent {
                    Some(parent) => current = parent,
                    None => return false,
                },
            }
        }
    }

    pub fn namespace(&self) -> &str {
        match &self.node.kind {
            TypeKind::Scalar(scalar) => scalar.namespace(),
            TypeKind::Record(record) => record.namespace(),
            TypeKind::List(_) | TypeKind::Dict(_) => "",
        }
    }

    /// Canonical name.
    ///
    /// Base name (namespace-qualified), then parameters, then `.format`, then
    /// `.required`. Lists render as the element name plus the shape; maps as
    /// `Dict(K,V)`.
    pub fn name(&self) -> String {
        let mut name = match &self.node.kind {
            TypeKind::Scalar(scalar) => {
                format!("{}{}", scalar.qualified_name(), self.node.parameters.render())
            }
            TypeKind::Record(record) => record.qualified_name(),
            TypeKind::List(list) => format!("{}{}", list.element.name(), list.shape),
            TypeKind::Dict(dict) => format!("Dict({},{})", dict.key.name(), dict.value.name()),
        };
        if let Some(internal_format) = &self.node.internal_format {
            name.push('.');
            name.push_str(internal_format);
        }
        if self.has_required_derivation() {
            name.push('.');
            name.push_str(REQUIRED);
        }
        name
    }

    pub fn as_scalar(&self) -> Option<&Arc<ScalarType>> {
        match &self.node.kind {
            TypeKind::Scalar(scalar) => Some(scalar),
            _ => None,
        }
    }

    pub fn as_record(&self) -> Option<&Arc<RecordType>> {
        match &self.node.kind {
            TypeKind::Record(record) => Some(record),
            _ => None,
        }
    }

    pub fn as_list_type(&self) -> Option<&ListType> {
        match &self.node.kind {
            TypeKind::List(list) => Some(list),
            _ => None,
        }
    }

    pub fn as_dict_type(&self) -> Option<&DictType> {
        match &self.node.kind {
            TypeKind::Dict(dict) => Some(dict),
            _ => None,
        }
    }

    /// Whether lists of this type may become `Vector`/`Matrix`.
    pub fn is_vector_eligible(&self) -> bool {
        matches!(&self.node.kind, TypeKind::Scalar(s) if s.is_vector_eligible())
    }

    // -----------------------------------------------------------------------
    // Translators
    // -----------------------------------------------------------------------

    /// Translators of the base scalar, in registration order.
    pub fn translators(&self) -> Vec<Arc<dyn Translator>> {
        match &self.node.kind {
            TypeKind::Scalar(scalar) => scalar.translators(),
            _ => Vec::new(),
        }
    }

    /// Attach a translator to the base scalar. Visible to every derivation.
    pub fn add_translator<T: Translator + 'static>(&self, translator: T) -> Result<(), SchemaError> {
        match &self.node.kind {
            TypeKind::Scalar(scalar) => {
                scalar.add_translator(Arc::new(translator));
                Ok(())
            }
            _ => Err(SchemaError::NotImplemented {
                type_name: self.name(),
                operation: "add_translator",
            }),
        }
    }
}

fn vector_of(dim: Option<usize>) -> Result<TypeDescriptor, SchemaError> {
    match dim {
        Some(n) => builtins::vector().with_args([dim_value(Some(n))]),
        None => Ok(builtins::vector()),
    }
}

fn dim_value(dim: Option<usize>) -> Value {
    dim.and_then(|n| i64::try_from(n).ok())
        .map_or(Value::Null, Value::Int)
}

impl PartialEq for TypeDescriptor {
    fn eq(&self, other: &Self) -> bool {
        if Arc::ptr_eq(&self.node, &other.node) {
            return true;
        }
        let same_kind = match (&self.node.kind, &other.node.kind) {
            (TypeKind::Scalar(a), TypeKind::Scalar(b)) => Arc::ptr_eq(a, b),
            (TypeKind::Record(a), TypeKind::Record(b)) => Arc::ptr_eq(a, b) || **a == **b,
            (TypeKind::List(a), TypeKind::List(b)) => a == b,
            (TypeKind::Dict(a), TypeKind::Dict(b)) => a == b,
            _ => false,
        };
        same_kind
            && self.node.internal_format == other.node.internal_format
            && self.node.required == other.node.required
            && self.node.parameters == other.node.parameters
    }
}

impl fmt::Debug for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeDescriptor")
            .field("name", &self.name())
            .field("derivation", &self.node.derivation)
            .finish()
    }
}

impl fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}
