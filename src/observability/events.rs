//! Observable events
//!
//! Events are explicit and typed.

use std::fmt;

use super::logger::Severity;

/// Events emitted at the shape loading boundary
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    /// One shape file parsed
    ShapeLoaded,
    /// Shape directory fully loaded
    ShapesLoaded,
    /// Shape registered programmatically
    ShapeRegistered,
    /// Shape written to disk
    ShapeSaved,
    /// Shape file could not be loaded
    ShapeLoadFailed,
    /// Missing shape directory created on load
    ShapeDirCreated,
}

impl Event {
    /// Returns the string representation of the event
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::ShapeLoaded => "SHAPE_LOADED",
            Event::ShapesLoaded => "SHAPES_LOADED",
            Event::ShapeRegistered => "SHAPE_REGISTERED",
            Event::ShapeSaved => "SHAPE_SAVED",
            Event::ShapeLoadFailed => "SHAPE_LOAD_FAILED",
            Event::ShapeDirCreated => "SHAPE_DIR_CREATED",
        }
    }

    /// Severity the event is logged at
    pub fn severity(&self) -> Severity {
        match self {
            Event::ShapeLoaded => Severity::Trace,
            Event::ShapeLoadFailed => Severity::Error,
            _ => Severity::Info,
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_names_are_upper_snake() {
        let events = [
            Event::ShapeLoaded,
            Event::ShapesLoaded,
            Event::ShapeRegistered,
            Event::ShapeSaved,
            Event::ShapeLoadFailed,
            Event::ShapeDirCreated,
        ];
        for event in events {
            let s = event.as_str();
            assert!(!s.is_empty());
            assert!(s.chars().all(|c| c.is_uppercase() || c == '_'));
        }
    }

    #[test]
    fn test_event_severity() {
        assert_eq!(Event::ShapeLoadFailed.severity(), Severity::Error);
        assert_eq!(Event::ShapeLoaded.severity(), Severity::Trace);
        assert_eq!(Event::ShapeDirCreated.severity(), Severity::Info);
        assert_eq!(format!("{}", Event::ShapesLoaded), "SHAPES_LOADED");
    }
}
