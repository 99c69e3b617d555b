use std::sync::Arc;
use std::time::Duration;

use flight::{AnimationOptions, CameraController, ControllerError, IdleSignal};
use foundation::geo::LngLat;
use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::debug;

use crate::camera::CameraState;
use crate::map::{HeadlessMap, RenderHook};

/// Shared handle to a [`HeadlessMap`].
///
/// Clones refer to the same map, so a flight, a frame loop and UI handlers
/// can all hold one. The lock is never held across an await.
#[derive(Debug, Clone)]
pub struct MapHandle {
    inner: Arc<Mutex<HeadlessMap>>,
}

impl MapHandle {
    pub fn new(map: HeadlessMap) -> Self {
        Self {
            inner: Arc::new(Mutex::new(map)),
        }
    }

    pub fn camera(&self) -> CameraState {
        self.inner.lock().camera()
    }

    pub fn set_render_hook(&self, hook: RenderHook) {
        self.inner.lock().set_render_hook(hook);
    }

    pub fn tick(&self, dt_ms: f64) {
        self.inner.lock().tick(dt_ms);
    }

    pub fn destroy(&self) {
        self.inner.lock().destroy();
    }

    /// Runs `f` with the map locked.
    pub fn with<R>(&self, f: impl FnOnce(&mut HeadlessMap) -> R) -> R {
        f(&mut self.inner.lock())
    }

    /// Drives the map from a timer until it is destroyed.
    ///
    /// Each tick advances the map by the time that actually elapsed, so a
    /// late timer catches animations up instead of slowing them down.
    pub fn spawn_frame_loop(&self, period: Duration) -> JoinHandle<()> {
        let map = self.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            let mut last = Instant::now();
            loop {
                let now = interval.tick().await;
                let dt_ms = now.saturating_duration_since(last).as_secs_f64() * 1000.0;
                last = now;

                let mut guard = map.inner.lock();
                if guard.is_destroyed() {
                    break;
                }
                guard.tick(dt_ms);
            }
            debug!("frame loop stopped");
        })
    }
}

impl CameraController for MapHandle {
    fn set_zoom(&mut self, zoom: f64, options: &AnimationOptions) -> Result<(), ControllerError> {
        self.inner.lock().set_zoom(zoom, options)
    }

    fn set_pitch(&mut self, pitch: f64, options: &AnimationOptions) -> Result<(), ControllerError> {
        self.inner.lock().set_pitch(pitch, options)
    }

    fn set_center(&mut self, center: LngLat, options: &AnimationOptions) -> Result<(), ControllerError> {
        self.inner.lock().set_center(center, options)
    }

    fn set_rotation(&mut self, rotation: f64, options: &AnimationOptions) -> Result<(), ControllerError> {
        self.inner.lock().set_rotation(rotation, options)
    }

    fn once_idle(&mut self) -> IdleSignal {
        self.inner.lock().once_idle()
    }

    fn request_redraw(&mut self) {
        self.inner.lock().request_redraw();
    }
}
