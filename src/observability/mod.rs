//! Observability
//!
//! Structured JSON-line logging with typed events. Only the shape loader
//! logs; transformations and validation are silent.
//!
//! # Usage
//!
//! ```ignore
//! use shapekit::observability::{Logger, Severity};
//!
//! Logger::set_min_severity(Severity::Trace);
//! Logger::info("SHAPES_LOADED", &[("count", "3")]);
//! ```

mod events;
mod logger;

pub use events::Event;
pub use logger::{Logger, Severity};

/// Log a typed event at its own severity
pub fn log_event(event: Event) {
    Logger::log(event.severity(), event.as_str(), &[]);
}

/// Log a typed event with fields
pub fn log_event_with_fields(event: Event, fields: &[(&str, &str)]) {
    Logger::log(event.severity(), event.as_str(), fields);
}

