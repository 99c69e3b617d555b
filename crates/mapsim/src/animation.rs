use flight::{AnimationOptions, Easing};
use foundation::geo::LngLat;
use foundation::time::{Time, TimeSpan};

/// Interpolation between two values at eased progress `t`.
pub type Interpolate<T> = fn(from: T, to: T, t: f64) -> T;

/// One property animating towards a target.
///
/// A tween has no start time until the first frame samples it, so the
/// whole duration plays out over frames drawn after the setter call.
#[derive(Debug, Copy, Clone)]
pub struct Tween<T> {
    from: T,
    to: T,
    duration_ms: f64,
    span: Option<TimeSpan>,
    easing: Easing,
    interpolate: Interpolate<T>,
}

impl<T: Copy> Tween<T> {
    /// Without an easing the curve is linear.
    pub fn new(from: T, to: T, options: &AnimationOptions, interpolate: Interpolate<T>) -> Self {
        Self {
            from,
            to,
            duration_ms: options.duration_ms as f64,
            span: None,
            easing: options.easing.unwrap_or_default(),
            interpolate,
        }
    }

    /// Pins the start to `now` unless already started.
    pub fn start_at(&mut self, now: Time) {
        if self.span.is_none() {
            self.span = Some(TimeSpan::new(now, self.duration_ms));
        }
    }

    pub fn is_started(&self) -> bool {
        self.span.is_some()
    }

    pub fn sample(&self, now: Time) -> T {
        let Some(span) = self.span else {
            return self.from;
        };
        if span.is_finished(now) {
            return self.to;
        }
        let t = self.easing.apply(span.progress(now));
        (self.interpolate)(self.from, self.to, t)
    }

    pub fn target(&self) -> T {
        self.to
    }

    pub fn is_finished(&self, now: Time) -> bool {
        self.span.is_some_and(|span| span.is_finished(now))
    }
}

pub fn lerp(from: f64, to: f64, t: f64) -> f64 {
    from + (to - from) * t
}

pub fn lerp_center(from: LngLat, to: LngLat, t: f64) -> LngLat {
    from.lerp(to, t)
}

/// Turns the short way round, like a compass needle.
pub fn lerp_bearing(from: f64, to: f64, t: f64) -> f64 {
    let delta = (to - from + 180.0).rem_euclid(360.0) - 180.0;
    from + delta * t
}

/// Interpolates camera height (`2^-zoom`) and converts back to zoom.
///
/// Zooming in this way keeps apparent ground speed steady, the same
/// reason the zoom setter asks for it.
pub fn lerp_height(from_zoom: f64, to_zoom: f64, t: f64) -> f64 {
    let h0 = (-from_zoom).exp2();
    let h1 = (-to_zoom).exp2();
    -(h0 + (h1 - h0) * t).log2()
}
