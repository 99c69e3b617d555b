use foundation::geo::LngLat;
use foundation::math::MAX_MERCATOR_LAT;

/// Camera pose of the map.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct CameraState {
    pub center: LngLat,
    pub zoom: f64,
    /// Tilt in degrees, 0 looks straight down.
    pub pitch: f64,
    /// Bearing in degrees.
    pub rotation: f64,
}

impl Default for CameraState {
    fn default() -> Self {
        Self {
            center: LngLat::new(0.0, 0.0),
            zoom: 2.0,
            pitch: 0.0,
            rotation: 0.0,
        }
    }
}

/// Ranges the map keeps its camera in.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct MapLimits {
    pub min_zoom: f64,
    pub max_zoom: f64,
    pub max_pitch: f64,
}

impl Default for MapLimits {
    fn default() -> Self {
        Self {
            min_zoom: 2.0,
            max_zoom: 22.0,
            max_pitch: 60.0,
        }
    }
}

impl MapLimits {
    pub fn clamp_zoom(&self, zoom: f64) -> f64 {
        zoom.clamp(self.min_zoom, self.max_zoom)
    }

    pub fn clamp_pitch(&self, pitch: f64) -> f64 {
        pitch.clamp(0.0, self.max_pitch)
    }

    pub fn clamp_center(&self, center: LngLat) -> LngLat {
        LngLat::new(center.lon, center.lat.clamp(-MAX_MERCATOR_LAT, MAX_MERCATOR_LAT))
    }

    pub fn clamp(&self, camera: CameraState) -> CameraState {
        CameraState {
            center: self.clamp_center(camera.center),
            zoom: self.clamp_zoom(camera.zoom),
            pitch: self.clamp_pitch(camera.pitch),
            rotation: camera.rotation,
        }
    }
}
