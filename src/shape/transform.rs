//! Shape transformations
//!
//! Runtime counterparts of structural utility types:
//! - `all_optional`: Partial
//! - `all_required`: Required
//! - `pick` / `omit`: Pick / Omit
//! - `map_values`: Record
//! - `exclude_from_union`: Exclude
//! - `extend`: interface extension
//!
//! Every function is pure. The source shape is never modified and field
//! order in a derived shape follows the source.

use std::collections::BTreeSet;

use super::errors::{ShapeError, ShapeResult};
use super::types::{FieldDescriptor, ShapeDescriptor, TypeTag};

/// Field name of the key in a `map_values` shape
pub const MAP_KEY_FIELD: &str = "key";
/// Field name of the value in a `map_values` shape
pub const MAP_VALUE_FIELD: &str = "value";

/// Marks every field optional.
pub fn all_optional(shape: &ShapeDescriptor) -> ShapeDescriptor {
    with_optionality(shape, true)
}

/// Marks every field required.
pub fn all_required(shape: &ShapeDescriptor) -> ShapeDescriptor {
    with_optionality(shape, false)
}

fn with_optionality(shape: &ShapeDescriptor, optional: bool) -> ShapeDescriptor {
    ShapeDescriptor::from_unique(
        shape
            .fields()
            .iter()
            .map(|f| f.with_optional(optional))
            .collect(),
    )
}

/// Restricts a shape to the named fields.
///
/// # Errors
///
/// `UnknownField` for a name the shape does not declare. With several
/// unknown names the alphabetically first one is reported.
pub fn pick<I, S>(shape: &ShapeDescriptor, names: I) -> ShapeResult<ShapeDescriptor>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let names = name_set(names);
    if let Some(unknown) = names.iter().find(|n| !shape.contains(n)) {
        return Err(ShapeError::unknown_field(unknown.as_str()));
    }

    Ok(retain(shape, |f| names.contains(f.name())))
}

/// Removes the named fields. Names the shape does not declare are ignored.
pub fn omit<I, S>(shape: &ShapeDescriptor, names: I) -> ShapeDescriptor
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let names = name_set(names);
    retain(shape, |f| !names.contains(f.name()))
}

/// Key/value pairing shape: `{ key: key_type, value: value_type }`, both
/// required.
///
/// The result depends only on the two tags, never on the fields of some
/// source shape, so no shape is taken. Use [`validate_record`] to check a
/// whole object whose entries all follow this pairing.
///
/// [`validate_record`]: crate::shape::validate_record
pub fn map_values(key_type: TypeTag, value_type: TypeTag) -> ShapeDescriptor {
    ShapeDescriptor::from_unique(vec![
        FieldDescriptor::required(MAP_KEY_FIELD, key_type),
        FieldDescriptor::required(MAP_VALUE_FIELD, value_type),
    ])
}

/// Set difference `allowed - excluded`.
pub fn exclude_from_union(
    allowed: &BTreeSet<TypeTag>,
    excluded: &BTreeSet<TypeTag>,
) -> BTreeSet<TypeTag> {
    allowed.difference(excluded).copied().collect()
}

/// Appends the fields of `extension` after those of `base`.
///
/// # Errors
///
/// `DuplicateField` if both shapes declare the same name, even with the
/// same type.
pub fn extend(
    base: &ShapeDescriptor,
    extension: &ShapeDescriptor,
) -> ShapeResult<ShapeDescriptor> {
    let mut fields = base.fields().to_vec();
    fields.extend_from_slice(extension.fields());
    ShapeDescriptor::new(fields)
}

fn name_set<I, S>(names: I) -> BTreeSet<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    names.into_iter().map(|n| n.as_ref().to_string()).collect()
}

fn retain<F>(shape: &ShapeDescriptor, keep: F) -> ShapeDescriptor
where
    F: Fn(&FieldDescriptor) -> bool,
{
    ShapeDescriptor::from_unique(shape.fields().iter().filter(|&f| keep(f)).cloned().collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn person() -> ShapeDescriptor {
        ShapeDescriptor::new(vec![
            FieldDescriptor::required("name", TypeTag::String),
            FieldDescriptor::required("age", TypeTag::Number),
            FieldDescriptor::optional("location", TypeTag::String),
        ])
        .unwrap()
    }

    #[test]
    fn test_all_optional() {
        let partial = all_optional(&person());
        assert!(partial.fields().iter().all(|f| f.is_optional()));
        assert_eq!(partial.len(), 3);
    }

    #[test]
    fn test_all_required() {
        let required = all_required(&person());
        assert!(required.fields().iter().all(|f| f.is_required()));
        assert_eq!(
            required.field("location").map(|f| f.type_tag()),
            Some(TypeTag::String)
        );
    }

    #[test]
    fn test_source_not_mutated() {
        let shape = person();
        let _ = all_optional(&shape);
        let _ = omit(&shape, ["age"]);
        assert_eq!(shape, person());
    }

    #[test]
    fn test_pick_keeps_source_order() {
        let picked = pick(&person(), ["location", "name"]).unwrap();
        let names: Vec<_> = picked.field_names().collect();
        assert_eq!(names, vec!["name", "location"]);
        assert!(picked.field("location").unwrap().is_optional());
    }

    #[test]
    fn test_pick_unknown_field() {
        let err = pick(&person(), ["name", "zip", "email"]).unwrap_err();
        assert_eq!(err, ShapeError::unknown_field("email"));
    }

    #[test]
    fn test_pick_nothing() {
        let picked = pick(&person(), Vec::<String>::new()).unwrap();
        assert!(picked.is_empty());
    }

    #[test]
    fn test_omit() {
        let bob = omit(&person(), ["age", "location"]);
        let names: Vec<_> = bob.field_names().collect();
        assert_eq!(names, vec!["name"]);
    }

    #[test]
    fn test_omit_ignores_unknown_names() {
        let result = omit(&person(), ["nickname"]);
        assert_eq!(result, person());
    }

    #[test]
    fn test_map_values() {
        let record = map_values(TypeTag::String, TypeTag::Number);
        let names: Vec<_> = record.field_names().collect();
        assert_eq!(names, vec![MAP_KEY_FIELD, MAP_VALUE_FIELD]);
        assert_eq!(record.field("value").unwrap().type_tag(), TypeTag::Number);
        assert!(record.fields().iter().all(|f| f.is_required()));
    }

    #[test]
    fn test_exclude_from_union() {
        let primitive: BTreeSet<_> = TypeTag::ALL.into_iter().collect();
        let excluded: BTreeSet<_> = [TypeTag::String].into_iter().collect();
        let result = exclude_from_union(&primitive, &excluded);
        let expected: BTreeSet<_> = [TypeTag::Number, TypeTag::Boolean].into_iter().collect();
        assert_eq!(result, expected);
    }

    #[test]
    fn test_exclude_everything() {
        let primitive: BTreeSet<_> = TypeTag::ALL.into_iter().collect();
        assert!(exclude_from_union(&primitive, &primitive).is_empty());
    }

    #[test]
    fn test_extend() {
        let rectangle = ShapeDescriptor::new(vec![
            FieldDescriptor::required("height", TypeTag::Number),
            FieldDescriptor::required("width", TypeTag::Number),
        ])
        .unwrap();
        let color = ShapeDescriptor::new(vec![FieldDescriptor::required("color", TypeTag::String)])
            .unwrap();

        let colored = extend(&rectangle, &color).unwrap();
        let names: Vec<_> = colored.field_names().collect();
        assert_eq!(names, vec!["height", "width", "color"]);

        let err = extend(&rectangle, &rectangle).unwrap_err();
        assert_eq!(err, ShapeError::duplicate_field("height"));
    }
}
