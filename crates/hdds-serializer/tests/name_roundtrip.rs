// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Canonical names parse back to structurally equal descriptors.

use hdds_serializer::{
    builtins, Parameters, RecordField, Shape, TypeDescriptor, TypeRegistry, Value,
};

fn assert_round_trip(registry: &TypeRegistry, ty: &TypeDescriptor) {
    let name = ty.name();
    let parsed = registry
        .get(&name)
        .unwrap_or_else(|e| panic!("{name} failed to parse: {e}"));
    assert_eq!(&parsed, ty, "{name} did not round-trip");
    assert_eq!(parsed.name(), name);
}

#[test]
fn test_scalar_derivation_chains() {
    let registry = TypeRegistry::new();
    let int = builtins::int();
    let chains = [
        int.clone(),
        int.with_internal_format("hex"),
        int.required(),
        int.with_internal_format("hex").required(),
        int.with_args([1, 2]).unwrap(),
        int.with_parameters(Parameters::positional([Value::Float(2.5)]).with("unit", "m"))
            .unwrap()
            .with_internal_format("scaled"),
        int.with_args([Value::Null, Value::Bool(true)]).unwrap(),
    ];
    for ty in &chains {
        assert_round_trip(&registry, ty);
    }
}

#[test]
fn test_list_derivation_chains() {
    let registry = TypeRegistry::new();
    let int = builtins::int();
    let chains = [
        int.as_list(Shape::fixed(3)).unwrap(),
        int.as_list(Shape::new(vec![Some(3), None])).unwrap(),
        int.with_internal_format("hex").required().as_list(Shape::of(&[2, 2])).unwrap(),
        int.as_list(Shape::unconstrained())
            .unwrap()
            .with_internal_format("entries_required"),
        int.as_list(Shape::fixed(2)).unwrap().required(),
    ];
    for ty in &chains {
        assert_round_trip(&registry, ty);
    }
}

#[test]
fn test_vector_names() {
    let registry = TypeRegistry::new();
    let float = builtins::float();
    for shape in [
        Shape::fixed(3),
        Shape::unconstrained(),
        Shape::of(&[1, 4]),
        Shape::of(&[4, 1]),
        Shape::of(&[2, 3]),
        Shape::new(vec![None, Some(3)]),
    ] {
        let ty = float.as_list_with(shape, true).unwrap();
        assert_round_trip(&registry, &ty);
    }
}

#[test]
fn test_dict_and_record_names() {
    let registry = TypeRegistry::new();
    let record = registry
        .create_record(
            "geo/Marker",
            vec![
                RecordField::new("id", builtins::int()),
                RecordField::new("pos", builtins::vector().with_args([3]).unwrap()),
            ],
            None,
        )
        .unwrap();

    let dict = TypeDescriptor::dict(builtins::string(), builtins::int().with_internal_format("hex"));
    assert_round_trip(&registry, &dict);
    assert_round_trip(&registry, &dict.as_list(Shape::fixed(2)).unwrap());
    assert_round_trip(&registry, &record);
    assert_round_trip(&registry, &record.required().as_list(Shape::unconstrained()).unwrap());
    assert_round_trip(
        &registry,
        &TypeDescriptor::dict(builtins::string(), record.as_list(Shape::fixed(4)).unwrap()),
    );
}

#[test]
fn test_string_parameters_with_delimiters() {
    let registry = TypeRegistry::new();
    let int = builtins::int();
    let params = Parameters::positional(["a)b", "it's"])
        .with("sep", "x',y")
        .with("path", "C:\\tmp\\")
        .with("pair", Value::List(vec!["[1,'2']".into(), "\"q\"".into()]));
    let tagged = int.with_parameters(params).unwrap();
    assert_round_trip(&registry, &tagged);
    assert_round_trip(&registry, &tagged.with_internal_format("hex").as_list(Shape::fixed(2)).unwrap());
    assert_round_trip(&registry, &TypeDescriptor::dict(tagged.clone(), builtins::string()));
}
