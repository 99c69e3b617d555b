//! Scenario-driven camera flights.
//!
//! A [`Scenario`] is an ordered list of [`ScenarioStep`]s. The player issues
//! each step's camera targets to a [`CameraController`], runs the step's
//! action, then waits either a fixed time or for the controller's idle
//! signal before moving on. Steps never overlap.

pub mod cancel;
pub mod controller;
pub mod easing;
pub mod error;
pub mod player;
pub mod step;

pub use cancel::*;
pub use controller::*;
pub use easing::*;
pub use error::*;
pub use player::*;
pub use step::*;
