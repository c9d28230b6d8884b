//! Runtime record shapes
//!
//! A shape is an ordered list of named, typed, optionality-flagged fields.
//! Shapes are derived from one another by pure transformations and used to
//! validate JSON instances.
//!
//! # Design Principles
//!
//! - Shapes are immutable once built
//! - Transformations never mutate their input
//! - Validation is deterministic: the same input always reports the same
//!   first violation
//! - No nulls, defaults, or coercion in instances

mod errors;
mod loader;
mod signature;
mod transform;
mod types;
mod validator;

pub use errors::{Severity, ShapeError, ShapeErrorCode, ShapeResult};
pub use loader::ShapeLoader;
pub use signature::{FunctionSignature, Parameter, ParameterKind, SlotType};
pub use transform::{
    all_optional, all_required, exclude_from_union, extend, map_values, omit, pick, MAP_KEY_FIELD,
    MAP_VALUE_FIELD,
};
pub use types::{FieldDescriptor, NamedShape, ShapeDescriptor, TypeTag};
pub use validator::{validate, validate_record, ShapeInstance, ValidationState, ROOT_PATH};
