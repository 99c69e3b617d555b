//! Headless map camera.
//!
//! Stands in for an interactive map engine: it animates zoom, pitch, center
//! and rotation over frames, draws through a render hook, and emits idle
//! once nothing is left to animate. Flights and tests drive it through
//! [`flight::CameraController`].

pub mod animation;
pub mod camera;
pub mod handle;
pub mod map;

pub use animation::*;
pub use camera::*;
pub use handle::*;
pub use map::*;
