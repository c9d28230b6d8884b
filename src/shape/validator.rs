//! Instance validation against shapes
//!
//! Validation semantics:
//! - All required fields are present
//! - Present fields carry their declared type tag
//! - No undeclared fields exist
//! - Null is never a valid field value; optional means absent
//!
//! The first violation wins, in a fixed order: missing fields, then type
//! mismatches (both in shape field order), then undeclared keys (sorted).

use serde_json::{Map, Value};

use super::errors::{ShapeError, ShapeResult};
use super::types::{FieldDescriptor, ShapeDescriptor, TypeTag};

/// Path used when the instance itself is not an object
pub const ROOT_PATH: &str = "$root";

/// Validation state of an instance.
///
/// `Unvalidated` advances exactly once, to `Valid` or `Rejected`. Both are
/// terminal.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum ValidationState {
    #[default]
    Unvalidated,
    Valid,
    Rejected(ShapeError),
}

impl ValidationState {
    /// Runs validation if it has not happened yet.
    pub fn advance(self, shape: &ShapeDescriptor, value: &Value) -> ValidationState {
        match self {
            ValidationState::Unvalidated => match check_instance(shape, value, "") {
                Ok(()) => ValidationState::Valid,
                Err(e) => ValidationState::Rejected(e),
            },
            terminal => terminal,
        }
    }

    pub fn is_valid(&self) -> bool {
        matches!(self, ValidationState::Valid)
    }

    pub fn is_rejected(&self) -> bool {
        matches!(self, ValidationState::Rejected(_))
    }

    /// Returns the violation carried by a rejected state
    pub fn error(&self) -> Option<&ShapeError> {
        match self {
            ValidationState::Rejected(e) => Some(e),
            _ => None,
        }
    }
}

/// Validates a value against a shape.
pub fn validate(shape: &ShapeDescriptor, value: &Value) -> ValidationState {
    ValidationState::Unvalidated.advance(shape, value)
}

/// A JSON object known to conform to a shape.
#[derive(Debug, Clone, PartialEq)]
pub struct ShapeInstance {
    shape: ShapeDescriptor,
    values: Map<String, Value>,
}

impl ShapeInstance {
    /// Validates `value` and wraps it.
    ///
    /// # Errors
    ///
    /// The first violation found, see the module docs for ordering.
    pub fn new(shape: &ShapeDescriptor, value: Value) -> ShapeResult<Self> {
        check_instance(shape, &value, "")?;
        match value {
            Value::Object(values) => Ok(Self {
                shape: shape.clone(),
                values,
            }),
            // check_instance rejects non-objects
            other => Err(ShapeError::type_mismatch(
                ROOT_PATH,
                "object",
                json_type_name(&other),
            )),
        }
    }

    pub fn shape(&self) -> &ShapeDescriptor {
        &self.shape
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    /// Present fields as (descriptor, value) pairs in shape order
    pub fn fields(&self) -> impl Iterator<Item = (&FieldDescriptor, &Value)> {
        self.shape
            .fields()
            .iter()
            .filter_map(|f| self.values.get(f.name()).map(|v| (f, v)))
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.values)
    }
}

/// Validates an index-signature style object where every key has type
/// `key_type` and every value `value_type`.
///
/// Keys are JSON strings; a `number` key must parse as a finite number and a
/// `boolean` key must be `"true"` or `"false"`. Entries are checked in
/// sorted key order.
pub fn validate_record(key_type: TypeTag, value_type: TypeTag, value: &Value) -> ShapeResult<()> {
    let obj = value
        .as_object()
        .ok_or_else(|| ShapeError::type_mismatch(ROOT_PATH, "object", json_type_name(value)))?;

    let mut keys: Vec<&String> = obj.keys().collect();
    keys.sort();

    for key in keys {
        if !key_matches(key_type, key) {
            return Err(ShapeError::type_mismatch(
                key.as_str(),
                format!("{} key", key_type),
                "string key",
            ));
        }
        let entry = &obj[key.as_str()];
        if !value_type.matches(entry) {
            return Err(type_error(key, value_type, entry));
        }
    }

    Ok(())
}

fn key_matches(key_type: TypeTag, key: &str) -> bool {
    match key_type {
        TypeTag::String => true,
        TypeTag::Number => key.parse::<f64>().map_or(false, f64::is_finite),
        TypeTag::Boolean => key == "true" || key == "false",
    }
}

/// Validates `value` as an instance of `shape`, prefixing field paths.
pub(crate) fn check_instance(shape: &ShapeDescriptor, value: &Value, prefix: &str) -> ShapeResult<()> {
    let obj = value.as_object().ok_or_else(|| {
        let path = if prefix.is_empty() { ROOT_PATH } else { prefix };
        ShapeError::type_mismatch(path, "object", json_type_name(value))
    })?;
    check_object(shape, obj, prefix)
}

fn check_object(shape: &ShapeDescriptor, obj: &Map<String, Value>, prefix: &str) -> ShapeResult<()> {
    // Missing required fields
    if let Some(missing) = shape.required_fields().find(|f| !obj.contains_key(f.name())) {
        return Err(ShapeError::missing_field(make_path(prefix, missing.name())));
    }

    // Type tags of present fields
    for field in shape.fields() {
        if let Some(value) = obj.get(field.name()) {
            if !field.type_tag().matches(value) {
                return Err(type_error(&make_path(prefix, field.name()), field.type_tag(), value));
            }
        }
    }

    // Undeclared keys
    let mut extra: Vec<&String> = obj.keys().filter(|k| !shape.contains(k)).collect();
    extra.sort();
    if let Some(key) = extra.first() {
        return Err(ShapeError::unknown_field(make_path(prefix, key)));
    }

    Ok(())
}

/// Returns the JSON type name for error messages.
pub(crate) fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Creates a field path from prefix and field name.
fn make_path(prefix: &str, field: &str) -> String {
    if prefix.is_empty() {
        field.to_string()
    } else {
        format!("{}.{}", prefix, field)
    }
}

/// Creates a type mismatch error.
pub(crate) fn type_error(field_path: &str, expected: TypeTag, actual: &Value) -> ShapeError {
    ShapeError::type_mismatch(field_path, expected.type_name(), json_type_name(actual))
}
