//! Function signatures
//!
//! A signature lists typed parameters and a return slot. `return_type` and
//! `parameters` extract those parts the way `ReturnType<F>` and
//! `Parameters<F>` do for function types; `check_arguments` validates a call.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;
use std::fmt;

use super::errors::{ShapeError, ShapeResult};
use super::types::{ShapeDescriptor, TypeTag};
use super::validator::{check_instance, json_type_name, type_error};

/// Type of a parameter or return value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SlotType {
    Primitive(TypeTag),
    Shape(ShapeDescriptor),
    /// Homogeneous JSON array
    Array(Box<SlotType>),
    /// No value; only valid as a return slot
    Void,
}

impl SlotType {
    /// Checks a value against this slot, reporting errors under `path`.
    pub fn check(&self, value: &Value, path: &str) -> ShapeResult<()> {
        match self {
            SlotType::Primitive(tag) => {
                if tag.matches(value) {
                    Ok(())
                } else {
                    Err(type_error(path, *tag, value))
                }
            }
            SlotType::Shape(shape) => check_instance(shape, value, path),
            SlotType::Array(element) => {
                let items = value.as_array().ok_or_else(|| {
                    ShapeError::type_mismatch(path, self.to_string(), json_type_name(value))
                })?;
                for (i, item) in items.iter().enumerate() {
                    element.check(item, &format!("{}[{}]", path, i))?;
                }
                Ok(())
            }
            SlotType::Void => Err(ShapeError::type_mismatch(path, "void", json_type_name(value))),
        }
    }

    /// Wraps this slot in an array slot
    pub fn array_of(self) -> SlotType {
        SlotType::Array(Box::new(self))
    }

    /// True for `void` and arrays of `void`
    fn is_void(&self) -> bool {
        match self {
            SlotType::Void => true,
            SlotType::Array(element) => element.is_void(),
            _ => false,
        }
    }
}

impl From<TypeTag> for SlotType {
    fn from(tag: TypeTag) -> Self {
        SlotType::Primitive(tag)
    }
}

impl From<ShapeDescriptor> for SlotType {
    fn from(shape: ShapeDescriptor) -> Self {
        SlotType::Shape(shape)
    }
}

impl fmt::Display for SlotType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SlotType::Primitive(tag) => write!(f, "{}", tag),
            SlotType::Shape(shape) => write!(f, "{}", shape),
            SlotType::Array(element) => write!(f, "{}[]", element),
            SlotType::Void => f.write_str("void"),
        }
    }
}

/// How a parameter is bound at a call site
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterKind {
    Required,
    Optional,
    /// Optional, with a value used when the argument is omitted
    Default(Value),
    /// Collects every remaining argument into an array slot; must come last
    Rest,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
    pub slot: SlotType,
    pub kind: ParameterKind,
}

impl Parameter {
    pub fn required(name: impl Into<String>, slot: impl Into<SlotType>) -> Self {
        Self::with_kind(name, slot, ParameterKind::Required)
    }

    pub fn optional(name: impl Into<String>, slot: impl Into<SlotType>) -> Self {
        Self::with_kind(name, slot, ParameterKind::Optional)
    }

    pub fn with_default(name: impl Into<String>, slot: impl Into<SlotType>, default: Value) -> Self {
        Self::with_kind(name, slot, ParameterKind::Default(default))
    }

    /// Rest parameter whose arguments each match `element`. The stored slot
    /// is `element[]`.
    pub fn rest(name: impl Into<String>, element: impl Into<SlotType>) -> Self {
        Self::with_kind(name, element.into().array_of(), ParameterKind::Rest)
    }

    fn with_kind(name: impl Into<String>, slot: impl Into<SlotType>, kind: ParameterKind) -> Self {
        Self {
            name: name.into(),
            slot: slot.into(),
            kind,
        }
    }
}

impl fmt::Display for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ParameterKind::Required => write!(f, "{}: {}", self.name, self.slot),
            ParameterKind::Optional => write!(f, "{}?: {}", self.name, self.slot),
            ParameterKind::Default(value) => write!(f, "{}: {} = {}", self.name, self.slot, value),
            ParameterKind::Rest => write!(f, "...{}: {}", self.name, self.slot),
        }
    }
}

/// A validated function type.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FunctionSignature {
    params: Vec<Parameter>,
    returns: SlotType,
}

impl FunctionSignature {
    /// Creates a signature.
    ///
    /// # Errors
    ///
    /// - `DuplicateField` if two parameters share a name
    /// - `InvalidSignature` for a void parameter, a rest parameter that is
    ///   not last or not array-typed, or a required parameter after an
    ///   optional one
    /// - `TypeMismatch` if a default value does not fit its slot
    pub fn new(params: Vec<Parameter>, returns: impl Into<SlotType>) -> ShapeResult<Self> {
        let mut seen = HashSet::with_capacity(params.len());
        let mut saw_optional = false;

        for (i, param) in params.iter().enumerate() {
            if !seen.insert(param.name.as_str()) {
                return Err(ShapeError::duplicate_field(&param.name));
            }
            if param.slot.is_void() {
                return Err(ShapeError::invalid_signature(format!(
                    "parameter '{}' cannot be void",
                    param.name
                )));
            }
            match &param.kind {
                ParameterKind::Required if saw_optional => {
                    return Err(ShapeError::invalid_signature(format!(
                        "required parameter '{}' follows an optional one",
                        param.name
                    )));
                }
                ParameterKind::Required => {}
                ParameterKind::Optional => saw_optional = true,
                ParameterKind::Default(value) => {
                    param.slot.check(value, &param.name)?;
                    saw_optional = true;
                }
                ParameterKind::Rest if i + 1 != params.len() => {
                    return Err(ShapeError::invalid_signature(format!(
                        "rest parameter '{}' must be last",
                        param.name
                    )));
                }
                ParameterKind::Rest if !matches!(param.slot, SlotType::Array(_)) => {
                    return Err(ShapeError::invalid_signature(format!(
                        "rest parameter '{}' must have an array type",
                        param.name
                    )));
                }
                ParameterKind::Rest => {}
            }
        }

        Ok(Self {
            params,
            returns: returns.into(),
        })
    }

    pub fn params(&self) -> &[Parameter] {
        &self.params
    }

    /// The return slot
    pub fn return_type(&self) -> &SlotType {
        &self.returns
    }

    /// Parameter slots in declaration order. A rest parameter contributes
    /// its array slot (`number[]`), not the element slot.
    pub fn parameters(&self) -> Vec<SlotType> {
        self.params.iter().map(|p| p.slot.clone()).collect()
    }

    /// Slot of the parameter at `index`.
    pub fn parameter(&self, index: usize) -> ShapeResult<&SlotType> {
        self.params
            .get(index)
            .map(|p| &p.slot)
            .ok_or(ShapeError::ParameterOutOfRange {
                index,
                count: self.params.len(),
            })
    }

    fn rest(&self) -> Option<&Parameter> {
        self.params.last().filter(|p| p.kind == ParameterKind::Rest)
    }

    /// Slot each rest argument is checked against
    fn rest_element(&self) -> Option<&SlotType> {
        self.rest().and_then(|p| match &p.slot {
            SlotType::Array(element) => Some(element.as_ref()),
            _ => None,
        })
    }

    fn fixed_count(&self) -> usize {
        self.params.len() - usize::from(self.rest().is_some())
    }

    fn required_count(&self) -> usize {
        self.params
            .iter()
            .filter(|p| p.kind == ParameterKind::Required)
            .count()
    }

    /// Checks a call's arguments for arity and type.
    ///
    /// Argument `i` is reported under the path `args[i]`.
    pub fn check_arguments(&self, args: &[Value]) -> ShapeResult<()> {
        let required = self.required_count();
        let fixed = self.fixed_count();
        let rest = self.rest_element();

        if args.len() < required || (rest.is_none() && args.len() > fixed) {
            let expected = match rest {
                Some(_) => format!("at least {}", required),
                None if required == fixed => required.to_string(),
                None => format!("{} to {}", required, fixed),
            };
            return Err(ShapeError::ArityMismatch {
                expected,
                actual: args.len(),
            });
        }

        for (i, arg) in args.iter().enumerate() {
            let slot = match (self.params.get(i), rest) {
                (Some(param), _) if i < fixed => &param.slot,
                (_, Some(element)) => element,
                // Arity check above rules this out
                _ => return Err(ShapeError::ParameterOutOfRange { index: i, count: fixed }),
            };
            slot.check(arg, &format!("args[{}]", i))?;
        }

        Ok(())
    }
}

impl fmt::Display for FunctionSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("(")?;
        for (i, param) in self.params.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}", param)?;
        }
        write!(f, ") => {}", self.returns)
    }
}
