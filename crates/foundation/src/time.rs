/// Time primitives
#[derive(Copy, Clone, Debug, PartialEq, PartialOrd)]
pub struct Time(pub f64); // milliseconds

impl Time {
    pub const ZERO: Time = Time(0.0);

    pub fn after_ms(self, ms: f64) -> Self {
        Time(self.0 + ms)
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct TimeSpan {
    pub start: Time,
    pub end: Time,
}

impl TimeSpan {
    pub fn new(start: Time, duration_ms: f64) -> Self {
        Self {
            start,
            end: start.after_ms(duration_ms.max(0.0)),
        }
    }

    pub fn instant(t: Time) -> Self {
        Self { start: t, end: t }
    }

    pub fn duration(&self) -> f64 {
        (self.end.0 - self.start.0).max(0.0)
    }

    /// Normalized position of `t` in the span, clamped to `[0, 1]`.
    ///
    /// An empty span is complete as soon as it starts.
    pub fn progress(&self, t: Time) -> f64 {
        let d = self.duration();
        if d <= 0.0 {
            return if t.0 >= self.start.0 { 1.0 } else { 0.0 };
        }
        ((t.0 - self.start.0) / d).clamp(0.0, 1.0)
    }

    pub fn is_finished(&self, t: Time) -> bool {
        t.0 >= self.end.0
    }
}
