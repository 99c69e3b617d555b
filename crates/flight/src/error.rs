use std::time::Duration;

use crate::controller::CameraProperty;

/// Error type step actions may fail with.
pub type ActionError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Debug, Clone, PartialEq)]
pub enum ControllerError {
    InvalidTarget {
        property: CameraProperty,
        value: String,
    },
    Unavailable(String),
}

impl std::fmt::Display for ControllerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ControllerError::InvalidTarget { property, value } => {
                write!(f, "invalid {property} target: {value}")
            }
            ControllerError::Unavailable(msg) => write!(f, "camera unavailable: {msg}"),
        }
    }
}

impl std::error::Error for ControllerError {}

/// Why a flight stopped before its last step.
///
/// `step` is the 0-based index of the step that was executing.
#[derive(Debug)]
pub enum FlightError {
    Controller {
        step: usize,
        property: CameraProperty,
        source: ControllerError,
    },
    Action {
        step: usize,
        source: ActionError,
    },
    /// The controller dropped the idle subscription without firing it.
    IdleSignalLost { step: usize },
    IdleTimeout { step: usize, timeout: Duration },
    Cancelled { step: usize },
}

impl FlightError {
    pub fn step(&self) -> usize {
        match self {
            FlightError::Controller { step, .. }
            | FlightError::Action { step, .. }
            | FlightError::IdleSignalLost { step }
            | FlightError::IdleTimeout { step, .. }
            | FlightError::Cancelled { step } => *step,
        }
    }
}

impl std::fmt::Display for FlightError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FlightError::Controller {
                step,
                property,
                source,
            } => write!(f, "step {step}: set {property} failed: {source}"),
            FlightError::Action { step, source } => write!(f, "step {step}: action failed: {source}"),
            FlightError::IdleSignalLost { step } => {
                write!(f, "step {step}: controller dropped the idle subscription")
            }
            FlightError::IdleTimeout { step, timeout } => {
                write!(f, "step {step}: no idle event within {}ms", timeout.as_millis())
            }
            FlightError::Cancelled { step } => write!(f, "step {step}: flight cancelled"),
        }
    }
}

impl std::error::Error for FlightError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            FlightError::Controller { source, .. } => Some(source),
            FlightError::Action { source, .. } => Some(source.as_ref()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::error::Error as _;
    use std::time::Duration;

    use super::{ControllerError, FlightError};
    use crate::controller::CameraProperty;

    #[test]
    fn display_names_step_and_cause() {
        let err = FlightError::Controller {
            step: 3,
            property: CameraProperty::Pitch,
            source: ControllerError::InvalidTarget {
                property: CameraProperty::Pitch,
                value: "NaN".to_string(),
            },
        };
        assert_eq!(
            err.to_string(),
            "step 3: set pitch failed: invalid pitch target: NaN"
        );
        assert!(err.source().is_some());
        assert_eq!(err.step(), 3);
    }

    #[test]
    fn timeout_reports_millis() {
        let err = FlightError::IdleTimeout {
            step: 0,
            timeout: Duration::from_millis(1500),
        };
        assert_eq!(err.to_string(), "step 0: no idle event within 1500ms");
        assert!(err.source().is_none());
    }
}
