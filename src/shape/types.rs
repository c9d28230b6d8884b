//! Shape type definitions
//!
//! Supported value types:
//! - string: UTF-8 string
//! - number: any JSON number
//! - boolean: true / false

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;
use std::fmt;

use super::errors::{ShapeError, ShapeResult};

/// Semantic value-type tag of a field
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TypeTag {
    String,
    Number,
    Boolean,
}

impl TypeTag {
    /// Every tag, in declaration order
    pub const ALL: [TypeTag; 3] = [TypeTag::String, TypeTag::Number, TypeTag::Boolean];

    /// Returns the type name for error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            TypeTag::String => "string",
            TypeTag::Number => "number",
            TypeTag::Boolean => "boolean",
        }
    }

    /// Returns the tag of a JSON value, or `None` for null, arrays and objects.
    pub fn of(value: &Value) -> Option<TypeTag> {
        match value {
            Value::String(_) => Some(TypeTag::String),
            Value::Number(_) => Some(TypeTag::Number),
            Value::Bool(_) => Some(TypeTag::Boolean),
            Value::Null | Value::Array(_) | Value::Object(_) => None,
        }
    }

    /// Checks whether a JSON value carries this tag
    pub fn matches(&self, value: &Value) -> bool {
        TypeTag::of(value) == Some(*self)
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_name())
    }
}

/// One named, typed field of a shape
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FieldDescriptor {
    name: String,
    #[serde(rename = "type")]
    type_tag: TypeTag,
    #[serde(default)]
    optional: bool,
}

impl FieldDescriptor {
    pub fn new(name: impl Into<String>, type_tag: TypeTag, optional: bool) -> Self {
        Self {
            name: name.into(),
            type_tag,
            optional,
        }
    }

    /// Create a required field
    pub fn required(name: impl Into<String>, type_tag: TypeTag) -> Self {
        Self::new(name, type_tag, false)
    }

    /// Create an optional field
    pub fn optional(name: impl Into<String>, type_tag: TypeTag) -> Self {
        Self::new(name, type_tag, true)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn type_tag(&self) -> TypeTag {
        self.type_tag
    }

    pub fn is_optional(&self) -> bool {
        self.optional
    }

    pub fn is_required(&self) -> bool {
        !self.optional
    }

    /// Returns a copy with the optionality flag replaced
    pub(crate) fn with_optional(&self, optional: bool) -> Self {
        Self {
            optional,
            ..self.clone()
        }
    }
}

impl fmt::Display for FieldDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let marker = if self.optional { "?" } else { "" };
        write!(f, "{}{}: {}", self.name, marker, self.type_tag)
    }
}

/// Ordered declaration of uniquely named fields.
///
/// Field order is kept for enumeration. Equality ignores it: two shapes are
/// equal when they declare the same set of fields.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(try_from = "Vec<FieldDescriptor>", into = "Vec<FieldDescriptor>")]
pub struct ShapeDescriptor {
    fields: Vec<FieldDescriptor>,
}

impl ShapeDescriptor {
    /// Creates a shape, rejecting repeated field names.
    pub fn new(fields: Vec<FieldDescriptor>) -> ShapeResult<Self> {
        let mut seen = HashSet::with_capacity(fields.len());
        for field in &fields {
            if !seen.insert(field.name.as_str()) {
                return Err(ShapeError::duplicate_field(&field.name));
            }
        }
        Ok(Self { fields })
    }

    /// Builds a shape from fields already known to be unique.
    pub(crate) fn from_unique(fields: Vec<FieldDescriptor>) -> Self {
        debug_assert!(Self::new(fields.clone()).is_ok());
        Self { fields }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.field(name).is_some()
    }

    /// Field names in declaration order
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.name.as_str())
    }

    pub fn required_fields(&self) -> impl Iterator<Item = &FieldDescriptor> {
        self.fields.iter().filter(|f| f.is_required())
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl PartialEq for ShapeDescriptor {
    fn eq(&self, other: &Self) -> bool {
        // Names are unique, so equal length plus containment is set equality.
        self.fields.len() == other.fields.len()
            && self
                .fields
                .iter()
                .all(|f| other.field(&f.name) == Some(f))
    }
}

impl Eq for ShapeDescriptor {}

impl TryFrom<Vec<FieldDescriptor>> for ShapeDescriptor {
    type Error = ShapeError;

    fn try_from(fields: Vec<FieldDescriptor>) -> ShapeResult<Self> {
        Self::new(fields)
    }
}

impl From<ShapeDescriptor> for Vec<FieldDescriptor> {
    fn from(shape: ShapeDescriptor) -> Self {
        shape.fields
    }
}

impl fmt::Display for ShapeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.fields.is_empty() {
            return f.write_str("{}");
        }
        f.write_str("{ ")?;
        for (i, field) in self.fields.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}", field)?;
        }
        f.write_str(" }")
    }
}

/// A shape stored under a registry name, as found on disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamedShape {
    /// Unique shape name
    pub name: String,
    /// Optional description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Field declarations
    pub fields: ShapeDescriptor,
}

impl NamedShape {
    pub fn new(name: impl Into<String>, fields: ShapeDescriptor) -> Self {
        Self {
            name: name.into(),
            description: None,
            fields,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}
