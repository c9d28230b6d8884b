//! shapekit - runtime record shapes
//!
//! Declare record shapes, derive new ones (all-optional, all-required,
//! pick, omit, key/value record, union exclusion, extension), validate JSON
//! instances against them, and load named shapes from disk.

pub mod observability;
pub mod shape;
