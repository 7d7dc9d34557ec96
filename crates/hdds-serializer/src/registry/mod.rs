// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Type Registry
//!
//! Name-indexed catalogue of builtin and user types, resolved through the
//! [name grammar](grammar). Lookup order is builtins, then user types, then
//! registered finders in registration order. A finder hit is cached in the
//! user catalogue and permanently binds the name.
//!
//! # Thread Safety
//!
//! - catalogues: `DashMap` (concurrent lookups, rare inserts)
//! - finders: `RwLock<Vec<_>>`, snapshotted before being called
//!
//! Two threads resolving the same unknown name may both call the finders;
//! the first insert wins and both observe it.

mod grammar;

use crate::builtins;
use crate::composite::{RecordField, RecordType};
use crate::descriptor::{TypeDescriptor, TypeKind};
use crate::error::{RegistryError, Result, SchemaError};
use crate::value::Value;
use dashmap::DashMap;
use grammar::{Head, TypeRef};
use parking_lot::RwLock;
use std::sync::{Arc, OnceLock};

/// Fallback resolver consulted on catalogue misses.
pub type Finder = Arc<dyn Fn(&str) -> Option<TypeDescriptor> + Send + Sync>;

/// Catalogue of named types.
pub struct TypeRegistry {
    builtins: DashMap<String, TypeDescriptor>,
    types: DashMap<String, TypeDescriptor>,
    /// Interned results of parsed references, keyed by the input string.
    derived: DashMap<String, TypeDescriptor>,
    finders: RwLock<Vec<Finder>>,
}

impl Default for TypeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl TypeRegistry {
    /// Registry preloaded with the builtin types.
    pub fn new() -> Self {
        let registry = Self::empty();
        for ty in builtins::all() {
            let base = ty.base_type();
            registry.builtins.insert(base.name(), base);
        }
        registry
    }

    /// Registry without any types.
    pub fn empty() -> Self {
        Self {
            builtins: DashMap::new(),
            types: DashMap::new(),
            derived: DashMap::new(),
            finders: RwLock::new(Vec::new()),
        }
    }

    /// Process-wide registry.
    pub fn global() -> &'static TypeRegistry {
        static REGISTRY: OnceLock<TypeRegistry> = OnceLock::new();
        REGISTRY.get_or_init(TypeRegistry::new)
    }

    // -----------------------------------------------------------------------
    // Registration
    // -----------------------------------------------------------------------

    /// Add base types to the builtin catalogue.
    pub fn register_builtins<I>(&self, types: I) -> std::result::Result<(), RegistryError>
    where
        I: IntoIterator<Item = TypeDescriptor>,
    {
        for ty in types {
            let base = ty.base_type();
            let name = base.name();
            if let Some(existing) = self.builtins.get(&name) {
                if *existing.value() != base {
                    log::warn!("[registry] builtin conflict on {}", name);
                    return Err(RegistryError::Conflict(name));
                }
                continue;
            }
            log::debug!("[registry] builtin {}", name);
            self.builtins.insert(name, base);
        }
        Ok(())
    }

    /// Register the base type of `ty` under its qualified name.
    ///
    /// Lists and maps register their element types instead; records also
    /// register their field types. Re-registering an equal type is a no-op.
    pub fn register(&self, ty: &TypeDescriptor) -> std::result::Result<(), RegistryError> {
        let base = ty.base_type();
        match base.kind() {
            TypeKind::List(list) => return self.register(&list.element),
            TypeKind::Dict(dict) => {
                self.register(&dict.key)?;
                return self.register(&dict.value);
            }
            TypeKind::Record(record) => {
                for field in record.fields() {
                    self.register(&field.ty)?;
                }
            }
            TypeKind::Scalar(_) => {}
        }

        let name = base.name();
        if let Some(builtin) = self.builtins.get(&name) {
            if *builtin.value() == base {
                return Ok(());
            }
            log::warn!("[registry] {} clashes with a builtin", name);
            return Err(RegistryError::Conflict(name));
        }

        match self.types.entry(name) {
            dashmap::mapref::entry::Entry::Occupied(entry) => {
                if *entry.get() != base {
                    log::warn!("[registry] conflicting registration for {}", entry.key());
                    return Err(RegistryError::Conflict(entry.key().clone()));
                }
            }
            dashmap::mapref::entry::Entry::Vacant(entry) => {
                log::debug!("[registry] registered {}", entry.key());
                entry.insert(base);
            }
        }
        Ok(())
    }

    /// Append a fallback resolver.
    pub fn register_finder<F>(&self, finder: F)
    where
        F: Fn(&str) -> Option<TypeDescriptor> + Send + Sync + 'static,
    {
        self.finders.write().push(Arc::new(finder));
    }

    /// Define and register a record from `(name, type)` fields.
    ///
    /// With a namespace, characters outside `[A-Za-z0-9_]` in `name` become
    /// `_`; otherwise a `ns/Name` name is split at its last `/`. An existing
    /// record of the same name is returned when its fields match.
    pub fn create_record(
        &self,
        name: &str,
        fields: Vec<RecordField>,
        namespace: Option<&str>,
    ) -> Result<TypeDescriptor> {
        let (namespace, name) = match namespace {
            Some(ns) => (
                ns.to_string(),
                name.chars()
                    .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
                    .collect::<String>(),
            ),
            None => match name.rsplit_once('/') {
                Some((ns, short)) => (ns.to_string(), short.to_string()),
                None => (String::new(), name.to_string()),
            },
        };

        let record = RecordType::new(name, fields)?.with_namespace(namespace);
        let qualified = record.qualified_name();
        if let Some(existing) = self.types.get(&qualified) {
            return match existing.value().as_record() {
                Some(found) if found.fields() == record.fields() => Ok(existing.value().clone()),
                _ => Err(RegistryError::Conflict(qualified).into()),
            };
        }

        let ty = record.into_descriptor();
        self.register(&ty)?;
        Ok(ty)
    }

    // -----------------------------------------------------------------------
    // Lookup
    // -----------------------------------------------------------------------

    /// Whether the base name of `name` is a builtin.
    pub fn is_builtin_type(&self, name: &str) -> std::result::Result<bool, RegistryError> {
        let parsed = grammar::parse(name)?;
        Ok(parsed
            .base_name()
            .is_some_and(|base| self.builtins.contains_key(base)))
    }

    /// Whether every base name in `name` resolves. Finders are consulted,
    /// and their hits cached, only with `check_finders`.
    pub fn has_type(&self, name: &str, check_finders: bool) -> std::result::Result<bool, RegistryError> {
        let parsed = grammar::parse(name)?;
        Ok(self.has_ref(&parsed, check_finders))
    }

    fn has_ref(&self, parsed: &TypeRef, check_finders: bool) -> bool {
        match &parsed.head {
            Head::Named { name, .. } => self.resolve_base(name, check_finders).is_some(),
            Head::Dict { key, value } => {
                self.has_ref(key, check_finders) && self.has_ref(value, check_finders)
            }
        }
    }

    /// Resolve a type reference.
    pub fn get(&self, name: &str) -> Result<TypeDescriptor> {
        match self.find(name)? {
            Some(ty) => Ok(ty),
            None => Err(RegistryError::UnknownType(name.trim().to_string()).into()),
        }
    }

    /// Resolve a type reference, `None` when a base name is unknown.
    pub fn find(&self, name: &str) -> Result<Option<TypeDescriptor>> {
        let key = name.trim();
        if let Some(ty) = self.derived.get(key) {
            return Ok(Some(ty.value().clone()));
        }
        let parsed = grammar::parse(key)?;
        let Some(ty) = self.build(&parsed)? else {
            return Ok(None);
        };
        let ty = self.derived.entry(key.to_string()).or_insert(ty).value().clone();
        Ok(Some(ty))
    }

    /// Build an instance of the named record type.
    pub fn instantiate_record(&self, name: &str, values: impl Into<Value>) -> Result<Value> {
        let ty = self.get(name)?;
        if ty.as_record().is_none() {
            return Err(SchemaError::NotARecord { type_name: ty.name() }.into());
        }
        ty.instantiate(values)
    }

    /// Builtin names, sorted.
    pub fn builtin_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.builtins.iter().map(|e| e.key().clone()).collect();
        names.sort();
        names
    }

    /// User type names, sorted.
    pub fn type_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.types.iter().map(|e| e.key().clone()).collect();
        names.sort();
        names
    }

    fn resolve_base(&self, name: &str, use_finders: bool) -> Option<TypeDescriptor> {
        if let Some(ty) = self.builtins.get(name) {
            return Some(ty.value().clone());
        }
        if let Some(ty) = self.types.get(name) {
            return Some(ty.value().clone());
        }
        if !use_finders {
            return None;
        }
        let finders: Vec<Finder> = self.finders.read().clone();
        for finder in finders {
            if let Some(found) = finder(name) {
                log::debug!("[registry] finder resolved {}", name);
                let stored = self.types.entry(name.to_string()).or_insert(found);
                return Some(stored.value().clone());
            }
        }
        None
    }

    fn build(&self, parsed: &TypeRef) -> Result<Option<TypeDescriptor>> {
        let mut ty = match &parsed.head {
            Head::Named { name, params } => {
                let Some(base) = self.resolve_base(name, true) else {
                    return Ok(None);
                };
                match params {
                    Some(params) => base.with_parameters(params.clone())?,
                    None => base,
                }
            }
            Head::Dict { key, value } => {
                let (Some(key), Some(value)) = (self.build(key)?, self.build(value)?) else {
                    return Ok(None);
                };
                TypeDescriptor::dict(key, value)
            }
        };
        for format in &parsed.formats {
            ty = ty.with_internal_format(format);
        }
        if let Some(shape) = &parsed.shape {
            ty = ty.as_list(shape.clone())?;
        }
        for format in &parsed.list_formats {
            ty = ty.with_internal_format(format);
        }
        Ok(Some(ty))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builtins::{int, string};
    use crate::error::Error;
    use crate::scalar::ScalarType;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_builtins_resolve() {
        let registry = TypeRegistry::new();
        assert_eq!(registry.get("Int").unwrap(), int());
        assert!(registry.is_builtin_type("Int.hex[3]").unwrap());
        assert!(!registry.is_builtin_type("Missing").unwrap());
        assert!(registry.builtin_names().contains(&"Vector".to_string()));
    }

    #[test]
    fn test_derived_names_are_interned() {
        let registry = TypeRegistry::new();
        let a = registry.get("Int.hex[2,...]").unwrap();
        let b = registry.get("Int.hex[2,...]").unwrap();
        assert_eq!(a.name(), "Int.hex[2,...]");
        assert_eq!(a, b);
    }

    #[test]
    fn test_unknown_and_invalid() {
        let registry = TypeRegistry::new();
        assert!(matches!(
            registry.get("Nope"),
            Err(Error::Registry(RegistryError::UnknownType(_)))
        ));
        assert!(matches!(
            registry.get("Int[x]"),
            Err(Error::Registry(RegistryError::InvalidName(_)))
        ));
        assert!(registry.find("Dict(Nope,Int)").unwrap().is_none());
    }

    #[test]
    fn test_conflicting_registration() {
        let registry = TypeRegistry::new();
        let a = ScalarType::from_fn("Celsius", Ok).into_descriptor();
        let b = ScalarType::from_fn("Celsius", Ok).into_descriptor();
        registry.register(&a).unwrap();
        registry.register(&a.with_internal_format("x")).unwrap();
        assert_eq!(
            registry.register(&b),
            Err(RegistryError::Conflict("Celsius".to_string()))
        );

        let shadow = ScalarType::from_fn("Int", Ok).into_descriptor();
        assert!(registry.register(&shadow).is_err());
    }

    #[test]
    fn test_finder_hits_are_cached() {
        let registry = TypeRegistry::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let found = ScalarType::from_fn("Remote", Ok).into_descriptor();
        registry.register_finder(move |name| {
            counter.fetch_add(1, Ordering::SeqCst);
            (name == "Remote").then(|| found.clone())
        });

        assert!(!registry.has_type("Remote", false).unwrap());
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert!(registry.has_type("Remote", true).unwrap());
        let listed = registry.get("Remote.fast[2]").unwrap();
        assert_eq!(listed.name(), "Remote.fast[2]");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(registry.type_names().contains(&"Remote".to_string()));
    }

    #[test]
    fn test_create_record() {
        let registry = TypeRegistry::new();
        let fields = vec![RecordField::new("id", int()), RecordField::new("label", string())];
        let ty = registry.create_record("geo/Tag", fields.clone(), None).unwrap();
        assert_eq!(ty.name(), "geo/Tag");
        assert_eq!(registry.get("geo/Tag").unwrap(), ty);

        let again = registry.create_record("geo/Tag", fields, None).unwrap();
        assert_eq!(again, ty);

        let other = vec![RecordField::new("id", string())];
        assert!(registry.create_record("geo/Tag", other, None).is_err());

        let spaced = registry
            .create_record("my tag", vec![RecordField::new("id", int())], Some("geo"))
            .unwrap();
        assert_eq!(spaced.name(), "geo/my_tag");
    }

    #[test]
    fn test_instantiate_record() {
        let registry = TypeRegistry::new();
        registry
            .create_record("Pair", vec![RecordField::new("a", int()), RecordField::new("b", int())], None)
            .unwrap();
        let value = registry
            .instantiate_record("Pair", Value::List(vec![Value::Int(1), Value::Int(2)]))
            .unwrap();
        assert_eq!(value.get("b"), Some(&Value::Int(2)));
        assert!(matches!(
            registry.instantiate_record("Int", Value::Int(1)),
            Err(Error::Schema(SchemaError::NotARecord { .. }))
        ));
    }
}
