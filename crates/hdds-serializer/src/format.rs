// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Wire formats and format matching.
//!
//! A wire format is either a plain name or a structured value addressing the
//! parts of a composite: positional ([`WireFormat::Seq`]), keyed by field or
//! map key ([`WireFormat::Keyed`]), or split between keys and values of a
//! map ([`WireFormat::Pair`]). Absence of a format is `None` everywhere.

use crate::value::Value;
use regex::Regex;
use std::fmt;

/// A wire format: a name or a structured per-part format.
#[derive(Debug, Clone, PartialEq)]
pub enum WireFormat {
    /// Single named format, broadcast to every part of a composite.
    Name(String),
    /// One format per position.
    Seq(Vec<Option<WireFormat>>),
    /// One format per field name or map key.
    Keyed(Vec<(Value, WireFormat)>),
    /// Separate formats for the keys and the values of a map.
    Pair(Option<Box<WireFormat>>, Option<Box<WireFormat>>),
}

impl WireFormat {
    /// Named format.
    pub fn name(name: impl Into<String>) -> Self {
        Self::Name(name.into())
    }

    /// Keyed format from `(key, format)` pairs.
    pub fn keyed<K, I>(entries: I) -> Self
    where
        K: Into<Value>,
        I: IntoIterator<Item = (K, WireFormat)>,
    {
        Self::Keyed(entries.into_iter().map(|(k, f)| (k.into(), f)).collect())
    }

    /// Key/value format pair for maps.
    pub fn pair(key: Option<WireFormat>, value: Option<WireFormat>) -> Self {
        Self::Pair(key.map(Box::new), value.map(Box::new))
    }

    pub fn as_name(&self) -> Option<&str> {
        match self {
            Self::Name(name) => Some(name),
            _ => None,
        }
    }

    /// Look up a keyed entry.
    pub fn lookup(&self, key: &Value) -> Option<&WireFormat> {
        match self {
            Self::Keyed(entries) => entries.iter().find(|(k, _)| k == key).map(|(_, f)| f),
            _ => None,
        }
    }

    /// Interpret a data value as a format: strings are names, lists are
    /// positional, maps are keyed. Null means no format.
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::String(name) => Some(Self::Name(name.clone())),
            Value::List(items) => Some(Self::Seq(items.iter().map(Self::from_value).collect())),
            Value::Map(entries) => Some(Self::Keyed(
                entries
                    .iter()
                    .filter_map(|(k, v)| Self::from_value(v).map(|f| (k.clone(), f)))
                    .collect(),
            )),
            _ => None,
        }
    }
}

impl From<&str> for WireFormat {
    fn from(name: &str) -> Self {
        Self::Name(name.to_string())
    }
}

impl From<String> for WireFormat {
    fn from(name: String) -> Self {
        Self::Name(name)
    }
}

fn fmt_opt(f: &mut fmt::Formatter<'_>, format: Option<&WireFormat>) -> fmt::Result {
    match format {
        Some(format) => write!(f, "{}", format),
        None => write!(f, "None"),
    }
}

impl fmt::Display for WireFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Name(name) => write!(f, "{}", name),
            Self::Seq(items) => {
                write!(f, "[")?;
                for (idx, item) in items.iter().enumerate() {
                    if idx > 0 {
                        write!(f, ", ")?;
                    }
                    fmt_opt(f, item.as_ref())?;
                }
                write!(f, "]")
            }
            Self::Keyed(entries) => {
                write!(f, "{{")?;
                for (idx, (key, format)) in entries.iter().enumerate() {
                    if idx > 0 {
                        write!(f, ", ")?;
                    }
                    match key.as_str() {
                        Some(key) => write!(f, "{}: {}", key, format)?,
                        None => write!(f, "{:?}: {}", key, format)?,
                    }
                }
                write!(f, "}}")
            }
            Self::Pair(key, value) => {
                write!(f, "(")?;
                fmt_opt(f, key.as_deref())?;
                write!(f, ", ")?;
                fmt_opt(f, value.as_deref())?;
                write!(f, ")")
            }
        }
    }
}

/// Render an optional format for error messages.
pub(crate) fn describe(format: Option<&WireFormat>) -> String {
    format.map_or_else(|| "None".to_string(), ToString::to_string)
}

// ---------------------------------------------------------------------------
// Per-part addressing
// ---------------------------------------------------------------------------

/// Format for a record field: keyed by name, positional by index, otherwise
/// the whole-record format is broadcast.
pub(crate) fn field_format<'a>(
    format: Option<&'a WireFormat>,
    name: &str,
    index: usize,
) -> Option<&'a WireFormat> {
    match format {
        Some(WireFormat::Keyed(_)) => format.and_then(|f| f.lookup(&Value::from(name))),
        Some(WireFormat::Seq(items)) => items.get(index).and_then(Option::as_ref),
        other => other,
    }
}

/// Format for a list element: positional when a sequence, broadcast otherwise.
pub(crate) fn element_format(format: Option<&WireFormat>, index: usize) -> Option<&WireFormat> {
    match format {
        Some(WireFormat::Seq(items)) => items.get(index).and_then(Option::as_ref),
        other => other,
    }
}

/// Split a map format into key and value parts. A non-pair format is
/// broadcast to both.
pub(crate) fn split_pair(
    format: Option<&WireFormat>,
) -> (Option<&WireFormat>, Option<&WireFormat>) {
    match format {
        Some(WireFormat::Pair(key, value)) => (key.as_deref(), value.as_deref()),
        other => (other, other),
    }
}

// ---------------------------------------------------------------------------
// FormatPattern + matching
// ---------------------------------------------------------------------------

/// A declared format: literal name or regular expression.
///
/// Patterns are anchored at the start of the candidate only, so
/// `matrix.float(16|32)` also accepts `matrix.float32.le`.
#[derive(Debug, Clone)]
pub enum FormatPattern {
    Literal(String),
    Pattern(Regex),
}

impl FormatPattern {
    pub fn literal(name: impl Into<String>) -> Self {
        Self::Literal(name.into())
    }

    /// Compile a pattern.
    pub fn pattern(pattern: &str) -> Result<Self, regex::Error> {
        Regex::new(&format!("^(?:{})", pattern)).map(Self::Pattern)
    }

    /// The literal name, if this is not a pattern.
    pub fn as_literal(&self) -> Option<&str> {
        match self {
            Self::Literal(name) => Some(name),
            Self::Pattern(_) => None,
        }
    }

    pub fn matches(&self, candidate: &str) -> bool {
        match self {
            Self::Literal(name) => name == candidate,
            Self::Pattern(re) => re.is_match(candidate),
        }
    }
}

impl PartialEq for FormatPattern {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Literal(a), Self::Literal(b)) => a == b,
            (Self::Pattern(a), Self::Pattern(b)) => a.as_str() == b.as_str(),
            _ => false,
        }
    }
}

impl fmt::Display for FormatPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Literal(name) => write!(f, "{}", name),
            Self::Pattern(re) => write!(f, "/{}/", re.as_str()),
        }
    }
}

impl From<&str> for FormatPattern {
    fn from(name: &str) -> Self {
        Self::Literal(name.to_string())
    }
}

/// Literal patterns from names.
pub fn literals(names: &[&str]) -> Vec<FormatPattern> {
    names.iter().map(|name| FormatPattern::from(*name)).collect()
}

/// Check a candidate wire format against declared formats.
///
/// Absence always matches. An empty declaration accepts nothing but absence.
/// Structured formats never match a flat declaration.
pub fn matches(candidate: Option<&WireFormat>, known: &[FormatPattern]) -> bool {
    match candidate {
        None => true,
        Some(WireFormat::Name(name)) => known.iter().any(|k| k.matches(name)),
        Some(_) => false,
    }
}

/// [`matches`] for plain names (internal formats).
pub fn matches_name(candidate: Option<&str>, known: &[FormatPattern]) -> bool {
    match candidate {
        None => true,
        Some(name) => known.iter().any(|k| k.matches(name)),
    }
}
