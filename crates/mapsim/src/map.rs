use flight::{AnimationOptions, CameraController, CameraProperty, ControllerError, IdleNotifier, IdleSignal};
use foundation::geo::LngLat;
use runtime::{EventBus, Frame, MapEventKind};
use tracing::{debug, trace};

use crate::animation::{Interpolate, Tween, lerp, lerp_bearing, lerp_center, lerp_height};
use crate::camera::{CameraState, MapLimits};

/// What the render hook sees each drawn frame.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct FrameContext {
    pub frame: Frame,
    pub camera: CameraState,
}

impl FrameContext {
    /// Zoom the style is evaluated at; the headless map has no style
    /// transitions so it tracks the camera.
    pub fn style_zoom(&self) -> f64 {
        self.camera.zoom
    }
}

pub type RenderHook = Box<dyn FnMut(&FrameContext) + Send>;

#[derive(Default)]
struct Tweens {
    zoom: Option<Tween<f64>>,
    pitch: Option<Tween<f64>>,
    center: Option<Tween<LngLat>>,
    rotation: Option<Tween<f64>>,
}

impl Tweens {
    fn is_empty(&self) -> bool {
        self.zoom.is_none() && self.pitch.is_none() && self.center.is_none() && self.rotation.is_none()
    }
}

/// Samples a tween into `value`, dropping it once it lands.
fn advance<T: Copy>(slot: &mut Option<Tween<T>>, value: &mut T, frame: Frame) -> bool {
    let Some(tween) = slot else {
        return false;
    };
    tween.start_at(frame.time);
    *value = tween.sample(frame.time);
    if tween.is_finished(frame.time) {
        *slot = None;
    }
    true
}

/// Map camera driven by explicit frame ticks.
///
/// Animations set between ticks start on the next tick and run their full
/// duration from there; `tick` advances time, draws when anything changed,
/// and fires idle once every animation has landed.
pub struct HeadlessMap {
    camera: CameraState,
    limits: MapLimits,
    frame: Frame,
    tweens: Tweens,
    idle_waiters: Vec<IdleNotifier>,
    needs_redraw: bool,
    moving: bool,
    destroyed: bool,
    events: EventBus,
    render_hook: Option<RenderHook>,
}

impl std::fmt::Debug for HeadlessMap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HeadlessMap")
            .field("camera", &self.camera)
            .field("frame", &self.frame)
            .field("moving", &self.moving)
            .field("idle_waiters", &self.idle_waiters.len())
            .field("destroyed", &self.destroyed)
            .finish_non_exhaustive()
    }
}

impl Default for HeadlessMap {
    fn default() -> Self {
        Self::new(CameraState::default())
    }
}

impl HeadlessMap {
    pub fn new(camera: CameraState) -> Self {
        Self::with_limits(camera, MapLimits::default())
    }

    pub fn with_limits(camera: CameraState, limits: MapLimits) -> Self {
        Self {
            camera: limits.clamp(camera),
            limits,
            frame: Frame::first(),
            tweens: Tweens::default(),
            idle_waiters: Vec::new(),
            // The first frame always draws.
            needs_redraw: true,
            moving: false,
            destroyed: false,
            events: EventBus::new(),
            render_hook: None,
        }
    }

    pub fn set_render_hook(&mut self, hook: RenderHook) {
        self.render_hook = Some(hook);
    }

    pub fn camera(&self) -> CameraState {
        self.camera
    }

    pub fn frame(&self) -> Frame {
        self.frame
    }

    pub fn events(&self) -> &EventBus {
        &self.events
    }

    pub fn events_mut(&mut self) -> &mut EventBus {
        &mut self.events
    }

    pub fn is_moving(&self) -> bool {
        !self.tweens.is_empty()
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    /// Tears the map down. Pending idle subscriptions are dropped unfired
    /// and further setters fail.
    pub fn destroy(&mut self) {
        if self.destroyed {
            return;
        }
        debug!(waiters = self.idle_waiters.len(), "map destroyed");
        self.destroyed = true;
        self.idle_waiters.clear();
        self.tweens = Tweens::default();
        self.render_hook = None;
    }

    /// Advances map time by `dt_ms` and processes one frame.
    pub fn tick(&mut self, dt_ms: f64) -> Frame {
        self.frame = self.frame.next(dt_ms);
        if self.destroyed {
            return self.frame;
        }
        let frame = self.frame;

        let mut changed = std::mem::take(&mut self.needs_redraw);
        let camera = &mut self.camera;
        changed |= advance(&mut self.tweens.zoom, &mut camera.zoom, frame);
        changed |= advance(&mut self.tweens.pitch, &mut camera.pitch, frame);
        changed |= advance(&mut self.tweens.center, &mut camera.center, frame);
        changed |= advance(&mut self.tweens.rotation, &mut camera.rotation, frame);

        if changed {
            let ctx = FrameContext {
                frame,
                camera: self.camera,
            };
            if let Some(hook) = self.render_hook.as_mut() {
                hook(&ctx);
            }
            trace!(frame = frame.index, zoom = self.camera.zoom, "render");
            self.events.emit(frame, MapEventKind::Render, "");
        }

        let settled = self.tweens.is_empty();
        if settled && self.moving {
            self.moving = false;
            self.events.emit(frame, MapEventKind::MoveEnd, "");
        }

        self.idle_waiters.retain(|waiter| !waiter.is_abandoned());
        if settled && (changed || !self.idle_waiters.is_empty()) {
            self.events.emit(frame, MapEventKind::Idle, "");
            let waiters = std::mem::take(&mut self.idle_waiters);
            debug!(frame = frame.index, waiters = waiters.len(), "map idle");
            for waiter in waiters {
                waiter.notify();
            }
        }
        frame
    }

    fn check(&self, property: CameraProperty, valid: bool, value: impl std::fmt::Display) -> Result<(), ControllerError> {
        if self.destroyed {
            return Err(ControllerError::Unavailable("map has been destroyed".to_string()));
        }
        if !valid {
            return Err(ControllerError::InvalidTarget {
                property,
                value: value.to_string(),
            });
        }
        Ok(())
    }

    fn start_move(&mut self, property: CameraProperty, options: &AnimationOptions) {
        if options.duration_ms == 0 {
            self.needs_redraw = true;
            return;
        }
        if !self.moving {
            self.moving = true;
            self.events.emit(self.frame, MapEventKind::MoveStart, property.as_str());
        }
    }
}

impl CameraController for HeadlessMap {
    fn set_zoom(&mut self, zoom: f64, options: &AnimationOptions) -> Result<(), ControllerError> {
        self.check(CameraProperty::Zoom, zoom.is_finite(), zoom)?;
        let zoom = self.limits.clamp_zoom(zoom);
        if options.duration_ms == 0 {
            self.tweens.zoom = None;
            self.camera.zoom = zoom;
        } else {
            let interpolate: Interpolate<f64> = if options.animate_height { lerp_height } else { lerp };
            self.tweens.zoom = Some(Tween::new(self.camera.zoom, zoom, options, interpolate));
        }
        self.start_move(CameraProperty::Zoom, options);
        Ok(())
    }

    fn set_pitch(&mut self, pitch: f64, options: &AnimationOptions) -> Result<(), ControllerError> {
        self.check(CameraProperty::Pitch, pitch.is_finite(), pitch)?;
        let pitch = self.limits.clamp_pitch(pitch);
        if options.duration_ms == 0 {
            self.tweens.pitch = None;
            self.camera.pitch = pitch;
        } else {
            self.tweens.pitch = Some(Tween::new(self.camera.pitch, pitch, options, lerp));
        }
        self.start_move(CameraProperty::Pitch, options);
        Ok(())
    }

    fn set_center(&mut self, center: LngLat, options: &AnimationOptions) -> Result<(), ControllerError> {
        self.check(CameraProperty::Center, center.is_finite(), center)?;
        let center = self.limits.clamp_center(center);
        if options.duration_ms == 0 {
            self.tweens.center = None;
            self.camera.center = center;
        } else {
            self.tweens.center = Some(Tween::new(self.camera.center, center, options, lerp_center));
        }
        self.start_move(CameraProperty::Center, options);
        Ok(())
    }

    fn set_rotation(&mut self, rotation: f64, options: &AnimationOptions) -> Result<(), ControllerError> {
        self.check(CameraProperty::Rotation, rotation.is_finite(), rotation)?;
        if options.duration_ms == 0 {
            self.tweens.rotation = None;
            self.camera.rotation = rotation;
        } else {
            self.tweens.rotation = Some(Tween::new(self.camera.rotation, rotation, options, lerp_bearing));
        }
        self.start_move(CameraProperty::Rotation, options);
        Ok(())
    }

    fn once_idle(&mut self) -> IdleSignal {
        let (notifier, signal) = IdleSignal::channel();
        if !self.destroyed {
            self.idle_waiters.push(notifier);
        }
        signal
    }

    fn request_redraw(&mut self) {
        self.needs_redraw = true;
    }
}
