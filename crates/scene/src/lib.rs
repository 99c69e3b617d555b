//! Application state for 3D building overlays: which models exist, which
//! are attached to the scene, and where they sit on the map.

pub mod app_state;
pub mod layer;
pub mod model;
pub mod placement;
pub mod stack;

pub use app_state::*;
pub use layer::*;
pub use model::*;
pub use placement::*;
pub use stack::*;
