// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Constructor parameters and list shapes.

use crate::value::Value;
use std::collections::BTreeMap;
use std::fmt;

/// Constructor parameters of a parameterized scalar.
///
/// Named parameters are kept sorted so that names render deterministically.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Parameters {
    pub positional: Vec<Value>,
    pub named: BTreeMap<String, Value>,
}

impl Parameters {
    /// Positional-only parameters.
    pub fn positional<I, V>(values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Self {
            positional: values.into_iter().map(Into::into).collect(),
            named: BTreeMap::new(),
        }
    }

    /// Add a named parameter.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.named.insert(key.into(), value.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.positional.is_empty() && self.named.is_empty()
    }

    /// Append `other` onto these parameters (chained parameterization).
    pub(crate) fn extend(&mut self, other: Parameters) {
        self.positional.extend(other.positional);
        self.named.extend(other.named);
    }

    /// `(a,b,key=value)`, or an empty string when there are no parameters.
    pub fn render(&self) -> String {
        if self.is_empty() {
            return String::new();
        }
        let parts: Vec<String> = self
            .positional
            .iter()
            .map(render_literal)
            .chain(
                self.named
                    .iter()
                    .map(|(k, v)| format!("{}={}", k, render_literal(v))),
            )
            .collect();
        format!("({})", parts.join(","))
    }
}

/// Render a parameter literal in the form the name grammar reads back.
pub(crate) fn render_literal(value: &Value) -> String {
    match value {
        Value::Null => "None".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Int(i) => i.to_string(),
        Value::Float(f) => format!("{:?}", f),
        Value::String(s) => format!("'{}'", s.replace('\\', "\\\\").replace('\'', "\\'")),
        Value::List(items) => {
            let parts: Vec<String> = items.iter().map(render_literal).collect();
            format!("[{}]", parts.join(","))
        }
        other => other.kind_name().to_string(),
    }
}

// ---------------------------------------------------------------------------
// Shape
// ---------------------------------------------------------------------------

/// Per-axis element counts of a list. `None` is an unconstrained axis.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Shape(Vec<Option<usize>>);

impl Shape {
    /// Build a shape. Zero counts are unconstrained, and an empty shape is a
    /// single unconstrained axis.
    pub fn new(axes: Vec<Option<usize>>) -> Self {
        let axes: Vec<Option<usize>> = axes.into_iter().map(|a| a.filter(|n| *n > 0)).collect();
        if axes.is_empty() {
            Self(vec![None])
        } else {
            Self(axes)
        }
    }

    /// One unconstrained axis.
    pub fn unconstrained() -> Self {
        Self(vec![None])
    }

    /// One axis of exactly `count` elements.
    pub fn fixed(count: usize) -> Self {
        Self::new(vec![Some(count)])
    }

    /// Fixed counts on every axis.
    pub fn of(axes: &[usize]) -> Self {
        Self::new(axes.iter().copied().map(Some).collect())
    }

    /// `ndims` unconstrained axes.
    pub fn with_ndims(ndims: usize) -> Self {
        Self::new(vec![None; ndims])
    }

    pub fn axes(&self) -> &[Option<usize>] {
        &self.0
    }

    pub fn ndims(&self) -> usize {
        self.0.len()
    }
}

impl Default for Shape {
    fn default() -> Self {
        Self::unconstrained()
    }
}

impl From<usize> for Shape {
    fn from(count: usize) -> Self {
        Self::new(vec![Some(count)])
    }
}

impl From<Option<usize>> for Shape {
    fn from(count: Option<usize>) -> Self {
        Self::new(vec![count])
    }
}

impl From<Vec<Option<usize>>> for Shape {
    fn from(axes: Vec<Option<usize>>) -> Self {
        Self::new(axes)
    }
}

impl From<Vec<usize>> for Shape {
    fn from(axes: Vec<usize>) -> Self {
        Self::new(axes.into_iter().map(Some).collect())
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .0
            .iter()
            .map(|axis| axis.map_or_else(|| "...".to_string(), |n| n.to_string()))
            .collect();
        write!(f, "[{}]", parts.join(","))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_parameters() {
        let params = Parameters::positional([Value::Int(3), Value::Float(2.5), Value::Null])
            .with("unit", "m")
            .with("flag", true);
        assert_eq!(params.render(), "(3,2.5,None,flag=true,unit='m')");
        assert_eq!(Parameters::default().render(), "");
    }

    #[test]
    fn test_render_escapes_quotes() {
        let params = Parameters::positional(["it's", "a\\b"]);
        assert_eq!(params.render(), "('it\\'s','a\\\\b')");
    }

    #[test]
    fn test_shape_normalization() {
        assert_eq!(Shape::new(vec![]), Shape::unconstrained());
        assert_eq!(Shape::fixed(0), Shape::unconstrained());
        assert_eq!(Shape::new(vec![Some(3), None]).to_string(), "[3,...]");
        assert_eq!(Shape::of(&[2, 3]).to_string(), "[2,3]");
        assert_eq!(Shape::with_ndims(2).ndims(), 2);
    }
}
