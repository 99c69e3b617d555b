use std::f64::consts::PI;

use foundation::geo::LngLat;
use foundation::math::MapPoint;
use serde::{Deserialize, Serialize};

/// Where a model sits on the map, in the terms demo authors tune by hand.
///
/// Meshes are authored Y-up; `tilt_turns` (in half turns) stands them up on
/// the Z-up map plane, `heading_turns` spins them around their own axis.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelPlacement {
    pub coords: LngLat,
    /// Nudge in map-point units, applied after projecting `coords`.
    #[serde(default)]
    pub offset: [f64; 2],
    #[serde(default = "unit_scale")]
    pub scale: f64,
    #[serde(default = "upright")]
    pub tilt_turns: f64,
    #[serde(default)]
    pub heading_turns: f64,
}

fn unit_scale() -> f64 {
    1.0
}

fn upright() -> f64 {
    0.5
}

/// Model-to-map transform: scale, then rotate X, then Y, then translate.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Transform {
    pub position: [f64; 3],
    pub scale: [f64; 3],
    /// Euler angles in radians.
    pub rotation: [f64; 3],
}

impl ModelPlacement {
    pub fn at(coords: LngLat) -> Self {
        Self {
            coords,
            offset: [0.0, 0.0],
            scale: unit_scale(),
            tilt_turns: upright(),
            heading_turns: 0.0,
        }
    }

    pub fn transform(&self) -> Transform {
        let p = MapPoint::from_lng_lat(self.coords) + MapPoint::new(self.offset[0], self.offset[1]);
        Transform {
            position: [p.x, p.y, 0.0],
            scale: [self.scale; 3],
            rotation: [self.tilt_turns * PI, self.heading_turns * PI, 0.0],
        }
    }
}
