use crate::geo::LngLat;

/// Side length of the map-point world square.
///
/// Map points are spherical-Mercator coordinates scaled so the whole world is
/// `WORLD_SIZE` units wide, centred on `(0, 0)` with y growing northward.
pub const WORLD_SIZE: f64 = 4_294_967_296.0; // 2^32

/// Latitude beyond which Mercator diverges; inputs are clamped to it.
pub const MAX_MERCATOR_LAT: f64 = 85.051_128_779_806_59;

/// Position in map-point units, the space 3D overlays are placed in.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct MapPoint {
    pub x: f64,
    pub y: f64,
}

impl MapPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn from_lng_lat(p: LngLat) -> Self {
        let half = WORLD_SIZE / 2.0;
        let lat = p.lat.clamp(-MAX_MERCATOR_LAT, MAX_MERCATOR_LAT);
        let sin = lat.to_radians().sin();
        let x = WORLD_SIZE * p.lon / 360.0;
        let y = half * ((1.0 + sin) / (1.0 - sin)).ln() / (2.0 * std::f64::consts::PI);
        Self::new(x, y)
    }

    pub fn to_lng_lat(self) -> LngLat {
        let half = WORLD_SIZE / 2.0;
        let lon = self.x * 360.0 / WORLD_SIZE;
        let merc = self.y * std::f64::consts::PI / half;
        let lat = (2.0 * merc.exp().atan() - std::f64::consts::FRAC_PI_2).to_degrees();
        LngLat::new(lon, lat)
    }
}

impl std::ops::Add for MapPoint {
    type Output = Self;

    fn add(self, other: Self) -> Self::Output {
        Self::new(self.x + other.x, self.y + other.y)
    }
}

impl std::ops::Sub for MapPoint {
    type Output = Self;

    fn sub(self, other: Self) -> Self::Output {
        Self::new(self.x - other.x, self.y - other.y)
    }
}
