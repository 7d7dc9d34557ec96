// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Process-wide configuration installed from a TOML file.
//!
//! Everything runs in a single test because the installed configuration is
//! shared by the whole test binary.

use hdds_serializer::config::{self, EngineConfig};
use hdds_serializer::{builtins, deserialize, Error, SerializationError, Shape, Value};
use std::io::Write;

#[test]
fn test_installed_config_drives_schema_definition() {
    // Builtins are created before any install so their roots stay optional.
    let float = builtins::float();
    let int = builtins::int();

    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "autoconvert_list = false").unwrap();
    writeln!(file, "required_by_default = true").unwrap();
    let loaded = EngineConfig::from_file(file.path()).unwrap();
    config::install(loaded.clone());
    assert_eq!(*config::current(), loaded);

    let list = float.as_list(Shape::fixed(3)).unwrap();
    assert_eq!(list.name(), "Float[3]");
    assert!(list.is_required());
    let err = deserialize(&list, Value::Null, None).unwrap_err();
    assert!(matches!(
        err,
        Error::Serialization(SerializationError::DataRequired { ref type_name }) if type_name == "Float[3]"
    ));

    // Element types keep their own flag.
    assert!(!int.is_required());
    assert_eq!(deserialize(&int, Value::Null, None).unwrap(), Value::Null);

    config::install(EngineConfig::default());
    let list = float.as_list(Shape::fixed(3)).unwrap();
    assert_eq!(list.name(), "Vector(3)");
    assert!(!list.is_required());
    assert_eq!(deserialize(&list, Value::Null, None).unwrap(), Value::Null);
}
