// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Type reference grammar.
//!
//! ```text
//! ref     := head formats shape? formats
//! head    := name params? | "Dict(" ref "," ref ")"
//! name    := ident ("/" ident)*
//! params  := "(" literal ("," literal)* ")"
//! formats := ("." ident)*
//! shape   := "[" (dim ("," dim)*)? "]"      dim := digits | "..."
//! ```
//!
//! Formats before the shape apply to the element, formats after it to the
//! list.

use crate::descriptor::{Parameters, Shape};
use crate::error::RegistryError;
use crate::value::Value;
use regex::Regex;
use std::sync::OnceLock;

const SUFFIX: &str = r"(?P<formats>(?:\.[A-Za-z]\w*)*)(?P<array>\[(?:(?:\d+|\.\.\.)(?:,(?:\d+|\.\.\.))*)?\])?(?P<list_formats>(?:\.[A-Za-z]\w*)*)$";

fn compiled(cell: &'static OnceLock<Option<Regex>>, pattern: impl FnOnce() -> String) -> Result<&'static Regex, RegistryError> {
    cell.get_or_init(|| Regex::new(&pattern()).ok())
        .as_ref()
        .ok_or_else(|| RegistryError::InvalidName("name grammar failed to compile".to_string()))
}

fn named_regex() -> Result<&'static Regex, RegistryError> {
    static CELL: OnceLock<Option<Regex>> = OnceLock::new();
    compiled(&CELL, || {
        format!(
            r"^(?P<name>[A-Za-z]\w*(?:/[A-Za-z]\w*)*)(?P<param>\(.*\))?{}",
            SUFFIX
        )
    })
}

fn suffix_regex() -> Result<&'static Regex, RegistryError> {
    static CELL: OnceLock<Option<Regex>> = OnceLock::new();
    compiled(&CELL, || format!("^{}", SUFFIX))
}

/// Head of a parsed reference.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Head {
    Named {
        name: String,
        params: Option<Parameters>,
    },
    Dict {
        key: Box<TypeRef>,
        value: Box<TypeRef>,
    },
}

/// A parsed type reference.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct TypeRef {
    pub head: Head,
    pub formats: Vec<String>,
    pub shape: Option<Shape>,
    pub list_formats: Vec<String>,
}

impl TypeRef {
    /// Base name used for catalogue lookups, `None` for maps.
    pub fn base_name(&self) -> Option<&str> {
        match &self.head {
            Head::Named { name, .. } => Some(name),
            Head::Dict { .. } => None,
        }
    }
}

fn invalid(input: &str) -> RegistryError {
    RegistryError::InvalidName(input.to_string())
}

/// Parse a type reference.
pub(crate) fn parse(input: &str) -> Result<TypeRef, RegistryError> {
    let input = input.trim();
    if let Some(rest) = input.strip_prefix("Dict(") {
        return parse_dict(input, rest);
    }

    let caps = named_regex()?.captures(input).ok_or_else(|| invalid(input))?;
    let name = caps.name("name").map_or("", |m| m.as_str()).to_string();
    let params = match caps.name("param") {
        Some(m) => {
            let inner = &m.as_str()[1..m.as_str().len() - 1];
            Some(parse_parameters(inner).ok_or_else(|| invalid(input))?)
        }
        None => None,
    };
    let mut parsed = suffix(input, &caps)?;
    parsed.head = Head::Named { name, params };
    Ok(parsed)
}

fn parse_dict(input: &str, rest: &str) -> Result<TypeRef, RegistryError> {
    let close = matching_close(rest).ok_or_else(|| invalid(input))?;
    let inner = &rest[..close];
    let parts = split_top_level(inner, ',');
    let [key, value] = parts.as_slice() else {
        return Err(invalid(input));
    };
    let key = parse(key)?;
    let value = parse(value)?;

    let tail = &rest[close + 1..];
    let caps = suffix_regex()?.captures(tail).ok_or_else(|| invalid(input))?;
    let mut parsed = suffix(input, &caps)?;
    parsed.head = Head::Dict {
        key: Box::new(key),
        value: Box::new(value),
    };
    Ok(parsed)
}

fn suffix(input: &str, caps: &regex::Captures<'_>) -> Result<TypeRef, RegistryError> {
    let dotted = |group: &str| -> Vec<String> {
        caps.name(group)
            .map(|m| {
                m.as_str()
                    .split('.')
                    .filter(|s| !s.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default()
    };
    let shape = match caps.name("array") {
        Some(m) => Some(parse_shape(m.as_str()).ok_or_else(|| invalid(input))?),
        None => None,
    };
    Ok(TypeRef {
        head: Head::Named {
            name: String::new(),
            params: None,
        },
        formats: dotted("formats"),
        shape,
        list_formats: dotted("list_formats"),
    })
}

fn parse_shape(array: &str) -> Option<Shape> {
    let inner = &array[1..array.len() - 1];
    if inner.is_empty() {
        return Some(Shape::unconstrained());
    }
    let mut axes = Vec::new();
    for dim in inner.split(',') {
        if dim == "..." {
            axes.push(None);
        } else {
            axes.push(Some(dim.parse::<usize>().ok()?));
        }
    }
    Some(Shape::new(axes))
}

/// Tracks whether a scan is inside a quoted literal. A backslash inside
/// quotes escapes the next character.
#[derive(Default)]
struct QuoteState {
    quote: Option<char>,
    escaped: bool,
}

impl QuoteState {
    /// Feed one character; returns true when it is outside any literal.
    fn outside(&mut self, c: char) -> bool {
        match self.quote {
            Some(_) if self.escaped => self.escaped = false,
            Some(_) if c == '\\' => self.escaped = true,
            Some(q) if c == q => self.quote = None,
            Some(_) => {}
            None if c == '\'' || c == '"' => self.quote = Some(c),
            None => return true,
        }
        false
    }
}

/// Index of the `)` closing an already-opened parenthesis.
fn matching_close(s: &str) -> Option<usize> {
    let mut depth = 0usize;
    let mut quotes = QuoteState::default();
    for (idx, c) in s.char_indices() {
        if !quotes.outside(c) {
            continue;
        }
        match c {
            '(' | '[' => depth += 1,
            ')' | ']' if depth > 0 => depth -= 1,
            ')' => return Some(idx),
            _ => {}
        }
    }
    None
}

/// Split on `sep` outside brackets and quotes.
fn split_top_level(s: &str, sep: char) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut quotes = QuoteState::default();
    let mut start = 0;
    for (idx, c) in s.char_indices() {
        if !quotes.outside(c) {
            continue;
        }
        match c {
            '(' | '[' => depth += 1,
            ')' | ']' => depth = depth.saturating_sub(1),
            c if c == sep && depth == 0 => {
                parts.push(s[start..idx].trim());
                start = idx + c.len_utf8();
            }
            _ => {}
        }
    }
    parts.push(s[start..].trim());
    parts
}

// ---------------------------------------------------------------------------
// Parameter literals
// ---------------------------------------------------------------------------

fn parse_parameters(inner: &str) -> Option<Parameters> {
    let mut params = Parameters::default();
    if inner.trim().is_empty() {
        return Some(params);
    }
    for part in split_top_level(inner, ',') {
        match named_part(part) {
            Some((key, literal)) => {
                params.named.insert(key.to_string(), parse_literal(literal)?);
            }
            None => params.positional.push(parse_literal(part)?),
        }
    }
    Some(params)
}

fn named_part(part: &str) -> Option<(&str, &str)> {
    let (key, value) = part.split_once('=')?;
    let key = key.trim();
    let mut chars = key.chars();
    let starts_ok = chars.next().is_some_and(|c| c.is_ascii_alphabetic() || c == '_');
    if starts_ok && chars.all(|c| c.is_ascii_alphanumeric() || c == '_') {
        Some((key, value.trim()))
    } else {
        None
    }
}

fn parse_literal(text: &str) -> Option<Value> {
    let text = text.trim();
    match text {
        "None" | "null" => return Some(Value::Null),
        "True" | "true" => return Some(Value::Bool(true)),
        "False" | "false" => return Some(Value::Bool(false)),
        _ => {}
    }
    if text.starts_with('\'') || text.starts_with('"') {
        return unquote(text).map(Value::String);
    }
    if let Some(inner) = text.strip_prefix('[').and_then(|t| t.strip_suffix(']')) {
        if inner.trim().is_empty() {
            return Some(Value::List(Vec::new()));
        }
        return split_top_level(inner, ',')
            .into_iter()
            .map(parse_literal)
            .collect::<Option<Vec<_>>>()
            .map(Value::List);
    }
    if let Ok(int) = text.parse::<i64>() {
        return Some(Value::Int(int));
    }
    text.parse::<f64>().ok().map(Value::Float)
}

/// Body of a quoted literal with escapes resolved. The closing quote must
/// end the text.
fn unquote(text: &str) -> Option<String> {
    let mut chars = text.chars();
    let quote = chars.next()?;
    let mut out = String::new();
    while let Some(c) = chars.next() {
        match c {
            '\\' => out.push(chars.next()?),
            c if c == quote => return chars.as_str().is_empty().then_some(out),
            c => out.push(c),
        }
    }
    None
}
