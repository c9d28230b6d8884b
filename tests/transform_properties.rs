//! Transformation Property Tests
//!
//! Checked over every subset of a few sample shapes' field names.

use std::collections::BTreeSet;

use shapekit::shape::{
    all_optional, all_required, exclude_from_union, omit, pick, FieldDescriptor, ShapeDescriptor,
    ShapeErrorCode, TypeTag,
};

fn samples() -> Vec<ShapeDescriptor> {
    vec![
        ShapeDescriptor::empty(),
        ShapeDescriptor::new(vec![
            FieldDescriptor::required("x", TypeTag::Number),
            FieldDescriptor::required("y", TypeTag::Number),
        ])
        .unwrap(),
        ShapeDescriptor::new(vec![
            FieldDescriptor::required("name", TypeTag::String),
            FieldDescriptor::required("age", TypeTag::Number),
            FieldDescriptor::optional("location", TypeTag::String),
            FieldDescriptor::optional("active", TypeTag::Boolean),
        ])
        .unwrap(),
    ]
}

/// Every subset of the shape's field names.
fn subsets(shape: &ShapeDescriptor) -> Vec<Vec<String>> {
    let names: Vec<String> = shape.field_names().map(String::from).collect();
    (0..1u32 << names.len())
        .map(|mask| {
            names
                .iter()
                .enumerate()
                .filter(|(i, _)| mask & (1u32 << *i) != 0)
                .map(|(_, n)| n.clone())
                .collect()
        })
        .collect()
}

#[test]
fn test_required_after_optional_keeps_names_and_types() {
    for shape in samples() {
        let round = all_required(&all_optional(&shape));
        assert_eq!(round.len(), shape.len());
        for (before, after) in shape.fields().iter().zip(round.fields()) {
            assert_eq!(before.name(), after.name());
            assert_eq!(before.type_tag(), after.type_tag());
            assert!(after.is_required());
        }
        // Only originally optional fields changed
        assert_eq!(round == shape, shape.required_fields().count() == shape.len());
    }
}

#[test]
fn test_pick_has_exactly_named_fields_in_order() {
    for shape in samples() {
        for subset in subsets(&shape) {
            let picked = pick(&shape, &subset).unwrap();
            let names: Vec<&str> = picked.field_names().collect();
            let expected: Vec<&str> = shape
                .field_names()
                .filter(|n| subset.iter().any(|s| s.as_str() == *n))
                .collect();
            assert_eq!(names, expected);
        }
    }
}

#[test]
fn test_omit_is_idempotent() {
    for shape in samples() {
        for subset in subsets(&shape) {
            let once = omit(&shape, &subset);
            let twice = omit(&once, &subset);
            assert_eq!(once, twice);

            let remaining: Vec<String> = shape
                .field_names()
                .filter(|n| !subset.iter().any(|s| s.as_str() == *n))
                .map(String::from)
                .collect();
            assert_eq!(pick(&shape, &remaining).unwrap(), once);
        }
    }
}

#[test]
fn test_pick_unknown_name_fails() {
    for shape in samples() {
        let err = pick(&shape, ["not_a_field"]).unwrap_err();
        assert_eq!(err.code(), ShapeErrorCode::UnknownField);
    }
}

#[test]
fn test_exclude_string_from_primitive() {
    let primitive: BTreeSet<TypeTag> = TypeTag::ALL.into_iter().collect();
    let result = exclude_from_union(&primitive, &BTreeSet::from([TypeTag::String]));
    assert_eq!(result, BTreeSet::from([TypeTag::Number, TypeTag::Boolean]));
}
