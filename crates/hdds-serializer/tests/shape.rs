// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

#![allow(clippy::float_cmp)] // Test assertions with constants

//! Shaped lists: axis checks, per-element formats and the Vector/Matrix
//! specializations of Float lists.

use hdds_serializer::{
    builtins, deserialize, serialize, Error, SerializationError, Shape, Value, WireFormat,
};

fn ints(values: &[i64]) -> Value {
    Value::List(values.iter().copied().map(Value::Int).collect())
}

fn floats(values: &[f64]) -> Value {
    Value::List(values.iter().copied().map(Value::Float).collect())
}

#[test]
fn test_fixed_outer_axis() {
    let ty = builtins::int().as_list(Shape::new(vec![Some(3), None])).unwrap();
    assert_eq!(ty.name(), "Int[3,...]");

    let ok = Value::List(vec![ints(&[1]), ints(&[2, 3]), ints(&[])]);
    assert_eq!(deserialize(&ty, ok.clone(), None).unwrap(), ok);

    for rows in [2, 4] {
        let data = Value::List((0..rows).map(|_| ints(&[1])).collect());
        let err = serialize(&ty, data, None).unwrap_err();
        match err {
            Error::Serialization(SerializationError::ShapeMismatch {
                index,
                expected,
                got,
                ..
            }) => {
                assert!(index.is_empty());
                assert_eq!(expected, 3);
                assert_eq!(got, rows);
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}

#[test]
fn test_inner_axis_error_message() {
    let ty = builtins::int().as_list(Shape::of(&[2, 3])).unwrap();
    let data = Value::List(vec![ints(&[1, 2, 3]), ints(&[4, 5])]);
    let err = deserialize(&ty, data, None).unwrap_err();
    assert_eq!(
        err.to_string(),
        "Int[2,3] requires exactly 3 elements at index (1,), got 2"
    );
}

#[test]
fn test_three_axes_report_full_path() {
    let ty = builtins::int().as_list(Shape::of(&[1, 2, 2])).unwrap();
    let data = Value::List(vec![Value::List(vec![ints(&[1, 2]), ints(&[3])])]);
    let err = deserialize(&ty, data, None).unwrap_err();
    assert!(err.to_string().contains("at index (0, 1)"), "{err}");
}

#[test]
fn test_elements_are_coerced() {
    let ty = builtins::int().as_list(Shape::unconstrained()).unwrap();
    let data = Value::List(vec![Value::from("4"), Value::Float(2.9), Value::Null]);
    assert_eq!(
        deserialize(&ty, data, None).unwrap(),
        Value::List(vec![Value::Int(4), Value::Int(2), Value::Null])
    );
}

#[test]
fn test_positional_formats_per_element() {
    let ty = builtins::blob().as_list(Shape::fixed(2)).unwrap();
    let wire = WireFormat::Seq(vec![Some("base64".into()), None]);
    let data = Value::List(vec![Value::Bytes(b"hi".to_vec()), Value::Bytes(b"yo".to_vec())]);
    let out = serialize(&ty, data, Some(&wire)).unwrap();
    assert_eq!(out, Value::List(vec![Value::from("aGk="), Value::from("eW8=")]));
}

#[test]
fn test_float_lists_specialize() {
    let float = builtins::float();
    assert_eq!(float.as_list(Shape::fixed(3)).unwrap().name(), "Vector(3)");
    assert_eq!(float.as_list(Shape::unconstrained()).unwrap().name(), "Vector");
    assert_eq!(float.as_list(Shape::of(&[1, 4])).unwrap().name(), "Vector(4).row");
    assert_eq!(float.as_list(Shape::of(&[4, 1])).unwrap().name(), "Vector(4).col");
    assert_eq!(float.as_list(Shape::of(&[2, 3])).unwrap().name(), "Matrix(2,3)");
    assert_eq!(float.as_list(Shape::with_ndims(2)).unwrap().name(), "Matrix");
    assert_eq!(float.as_list(Shape::of(&[2, 2, 2])).unwrap().name(), "Float[2,2,2]");
    assert_eq!(float.as_list_with(Shape::fixed(3), false).unwrap().name(), "Float[3]");

    let required = float.required().as_list(Shape::fixed(3)).unwrap();
    assert!(required.is_required());
}

#[test]
fn test_vector_layouts() {
    let float = builtins::float();
    let col = float.as_list(Shape::of(&[3, 1])).unwrap();
    assert_eq!(
        deserialize(&col, ints(&[1, 2, 3]), None).unwrap(),
        Value::List(vec![floats(&[1.0]), floats(&[2.0]), floats(&[3.0])])
    );

    let row = float.as_list(Shape::of(&[1, 2])).unwrap();
    let nested = Value::List(vec![ints(&[1, 2])]);
    assert_eq!(
        deserialize(&row, nested.clone(), None).unwrap(),
        Value::List(vec![floats(&[1.0, 2.0])])
    );
    assert_eq!(serialize(&row, nested, None).unwrap(), floats(&[1.0, 2.0]));

    let err = deserialize(&float.as_list(Shape::fixed(3)).unwrap(), ints(&[1, 2]), None).unwrap_err();
    assert!(err.to_string().contains("this vector must have dimension 3, but it is 2"), "{err}");
}

#[test]
fn test_matrix_checks_rows_and_cols() {
    let ty = builtins::float().as_list(Shape::of(&[2, 3])).unwrap();
    let ok = Value::List(vec![ints(&[1, 2, 3]), ints(&[4, 5, 6])]);
    assert_eq!(
        deserialize(&ty, ok, None).unwrap(),
        Value::List(vec![floats(&[1.0, 2.0, 3.0]), floats(&[4.0, 5.0, 6.0])])
    );

    let ragged = Value::List(vec![ints(&[1, 2, 3]), ints(&[4, 5])]);
    let err = deserialize(&ty, ragged, None).unwrap_err();
    assert!(err.to_string().contains("this matrix must have 3 cols, but row 1 has 2"), "{err}");

    let short = Value::List(vec![ints(&[1, 2, 3])]);
    let err = deserialize(&ty, short, None).unwrap_err();
    assert!(err.to_string().contains("this matrix must have 2 rows, but it has 1"), "{err}");

    let err = deserialize(&ty, ints(&[1]), Some(&"msgpack".into())).unwrap_err();
    assert!(matches!(
        err,
        Error::Serialization(SerializationError::UnsupportedFormat { .. })
    ));
}
