use std::time::Duration;

use foundation::geo::LngLat;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};

use crate::controller::{AnimationOptions, CameraProperty};
use crate::easing::Easing;
use crate::error::ActionError;

/// Camera targets and timing of one flight step.
///
/// Every field is optional; a step with nothing set is a zero-length pause.
/// Reuse a base step with struct update syntax:
/// `StepSpec { rotation: Some(75.0), ..base.clone() }`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StepSpec {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zoom: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub center: Option<LngLat>,
    /// Bearing in degrees.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rotation: Option<f64>,
    /// Tilt in degrees.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pitch: Option<f64>,
    /// Animation length for every target of the step (ms, default 0).
    /// Fractional values are rounded to whole milliseconds.
    #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "whole_millis")]
    pub duration: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zoom_easing: Option<Easing>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pitch_easing: Option<Easing>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub center_easing: Option<Easing>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rotation_easing: Option<Easing>,
    /// Wait for the controller's idle event instead of a timer.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub wait_idle: bool,
    /// Timer override (ms); ignored when `wait_idle` is set.
    #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "whole_millis")]
    pub sleep: Option<u64>,
}

/// Accepts any non-negative JSON number of milliseconds.
fn whole_millis<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    let Some(ms) = Option::<f64>::deserialize(deserializer)? else {
        return Ok(None);
    };
    if !ms.is_finite() || ms < 0.0 {
        return Err(D::Error::custom(format!("invalid milliseconds: {ms}")));
    }
    Ok(Some(ms.round() as u64))
}

/// What the player waits for after a step.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Wait {
    Idle,
    Sleep(Duration),
}

impl StepSpec {
    pub fn pause(ms: u64) -> Self {
        Self {
            sleep: Some(ms),
            ..Self::default()
        }
    }

    pub fn duration_ms(&self) -> u64 {
        self.duration.unwrap_or(0)
    }

    pub fn has_motion(&self) -> bool {
        self.zoom.is_some() || self.pitch.is_some() || self.center.is_some() || self.rotation.is_some()
    }

    pub fn easing(&self, property: CameraProperty) -> Option<Easing> {
        match property {
            CameraProperty::Zoom => self.zoom_easing,
            CameraProperty::Pitch => self.pitch_easing,
            CameraProperty::Center => self.center_easing,
            CameraProperty::Rotation => self.rotation_easing,
        }
    }

    /// Options passed along with `property`'s target.
    pub fn animation_options(&self, property: CameraProperty) -> AnimationOptions {
        AnimationOptions {
            duration_ms: self.duration_ms(),
            easing: self.easing(property),
            animate_height: property == CameraProperty::Zoom,
        }
    }

    pub fn wait(&self) -> Wait {
        if self.wait_idle {
            Wait::Idle
        } else {
            Wait::Sleep(Duration::from_millis(self.sleep.unwrap_or(self.duration_ms())))
        }
    }
}

/// Side effect run after a step's targets are issued.
pub type StepAction<'a> = Box<dyn FnMut() -> Result<(), ActionError> + 'a>;

/// A [`StepSpec`] plus an optional action.
pub struct ScenarioStep<'a> {
    pub spec: StepSpec,
    pub(crate) action: Option<StepAction<'a>>,
}

impl<'a> ScenarioStep<'a> {
    pub fn new(spec: StepSpec) -> Self {
        Self { spec, action: None }
    }

    /// An action-only step: no camera targets, no wait.
    pub fn action<F>(f: F) -> Self
    where
        F: FnMut() -> Result<(), ActionError> + 'a,
    {
        Self::new(StepSpec::default()).with_action(f)
    }

    pub fn with_action<F>(mut self, f: F) -> Self
    where
        F: FnMut() -> Result<(), ActionError> + 'a,
    {
        self.action = Some(Box::new(f));
        self
    }

    pub fn has_action(&self) -> bool {
        self.action.is_some()
    }
}

impl From<StepSpec> for ScenarioStep<'_> {
    fn from(spec: StepSpec) -> Self {
        Self::new(spec)
    }
}

impl std::fmt::Debug for ScenarioStep<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScenarioStep")
            .field("spec", &self.spec)
            .field("action", &self.action.as_ref().map(|_| ".."))
            .finish()
    }
}

/// Ordered steps of one flight. Consumed by a single playback.
#[derive(Debug, Default)]
pub struct Scenario<'a> {
    steps: Vec<ScenarioStep<'a>>,
}

impl<'a> Scenario<'a> {
    pub fn new() -> Self {
        Self { steps: Vec::new() }
    }

    pub fn push(&mut self, step: impl Into<ScenarioStep<'a>>) {
        self.steps.push(step.into());
    }

    pub fn then(mut self, step: impl Into<ScenarioStep<'a>>) -> Self {
        self.push(step);
        self
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn steps(&self) -> &[ScenarioStep<'a>] {
        &self.steps
    }
}

impl<'a> FromIterator<ScenarioStep<'a>> for Scenario<'a> {
    fn from_iter<I: IntoIterator<Item = ScenarioStep<'a>>>(iter: I) -> Self {
        Self {
            steps: iter.into_iter().collect(),
        }
    }
}

impl<'a> FromIterator<StepSpec> for Scenario<'a> {
    fn from_iter<I: IntoIterator<Item = StepSpec>>(iter: I) -> Self {
        iter.into_iter().map(ScenarioStep::new).collect()
    }
}

impl<'a> IntoIterator for Scenario<'a> {
    type Item = ScenarioStep<'a>;
    type IntoIter = std::vec::IntoIter<ScenarioStep<'a>>;

    fn into_iter(self) -> Self::IntoIter {
        self.steps.into_iter()
    }
}
