use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use foundation::geo::LngLat;
use tokio::sync::oneshot;

use crate::easing::Easing;
use crate::error::ControllerError;

/// The four animatable camera properties, in the order a step issues them.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum CameraProperty {
    Zoom,
    Pitch,
    Center,
    Rotation,
}

impl CameraProperty {
    pub fn as_str(self) -> &'static str {
        match self {
            CameraProperty::Zoom => "zoom",
            CameraProperty::Pitch => "pitch",
            CameraProperty::Center => "center",
            CameraProperty::Rotation => "rotation",
        }
    }
}

impl std::fmt::Display for CameraProperty {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a controller should animate towards a new target.
#[derive(Debug, Copy, Clone, PartialEq, Default)]
pub struct AnimationOptions {
    pub duration_ms: u64,
    /// `None` leaves the curve to the controller.
    pub easing: Option<Easing>,
    /// Zoom only: animate camera height and zoom together.
    pub animate_height: bool,
}

/// One-shot subscription to a controller's next idle event.
///
/// Resolves with `Err` if the controller drops the subscription without
/// ever firing it.
#[derive(Debug)]
pub struct IdleSignal {
    rx: oneshot::Receiver<()>,
}

/// Firing side of an [`IdleSignal`], kept by the controller.
#[derive(Debug)]
pub struct IdleNotifier {
    tx: oneshot::Sender<()>,
}

impl IdleSignal {
    pub fn channel() -> (IdleNotifier, IdleSignal) {
        let (tx, rx) = oneshot::channel();
        (IdleNotifier { tx }, IdleSignal { rx })
    }

    /// A signal that has already fired.
    pub fn ready() -> Self {
        let (notifier, signal) = Self::channel();
        notifier.notify();
        signal
    }
}

impl Future for IdleSignal {
    type Output = Result<(), oneshot::error::RecvError>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.rx).poll(cx)
    }
}

impl IdleNotifier {
    /// Fires the signal. Returns `false` if nobody is listening anymore.
    pub fn notify(self) -> bool {
        self.tx.send(()).is_ok()
    }

    pub fn is_abandoned(&self) -> bool {
        self.tx.is_closed()
    }
}

/// Camera capability a flight is played against.
///
/// Setters start an animation and return immediately; they fail only when
/// the target cannot be applied at all.
pub trait CameraController {
    fn set_zoom(&mut self, zoom: f64, options: &AnimationOptions) -> Result<(), ControllerError>;

    fn set_pitch(&mut self, pitch: f64, options: &AnimationOptions) -> Result<(), ControllerError>;

    fn set_center(
        &mut self,
        center: LngLat,
        options: &AnimationOptions,
    ) -> Result<(), ControllerError>;

    fn set_rotation(
        &mut self,
        rotation: f64,
        options: &AnimationOptions,
    ) -> Result<(), ControllerError>;

    /// Subscribes once to the next idle event.
    fn once_idle(&mut self) -> IdleSignal;

    /// Asks for a frame to be drawn even if the camera did not move.
    fn request_redraw(&mut self);
}
