use foundation::time::Time;

/// Frame metadata for the map's render loop.
///
/// Time is accumulated from the actual frame deltas so a loop driven by a
/// jittery timer still reports where animations should be.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Frame {
    /// 0-based frame index.
    pub index: u64,
    /// Delta since the previous frame (milliseconds).
    pub dt_ms: f64,
    /// Map time at the end of the frame.
    pub time: Time,
}

impl Frame {
    pub fn first() -> Self {
        Self {
            index: 0,
            dt_ms: 0.0,
            time: Time::ZERO,
        }
    }

    pub fn next(self, dt_ms: f64) -> Self {
        let dt_ms = dt_ms.max(0.0);
        Self {
            index: self.index + 1,
            dt_ms,
            time: self.time.after_ms(dt_ms),
        }
    }
}
