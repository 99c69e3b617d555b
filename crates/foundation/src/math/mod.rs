pub mod map_point;

pub use map_point::*;
