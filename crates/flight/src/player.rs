use std::future::Future;
use std::time::Duration;

use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::cancel::CancelToken;
use crate::controller::{CameraController, CameraProperty};
use crate::error::{ControllerError, FlightError};
use crate::step::{Scenario, StepSpec, Wait};

/// Where a playback is.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum FlightState {
    /// Value published before `run` is called.
    NotStarted,
    /// Issuing or waiting on step `step`.
    Running { step: usize },
    /// All steps processed, or the flight failed.
    Done,
}

/// Plays scenarios one step at a time.
///
/// Without a cancel token or idle timeout this behaves exactly like
/// [`run_flight`]: an idle wait on a controller that never goes idle never
/// returns.
#[derive(Debug)]
pub struct FlightPlayer {
    idle_timeout: Option<Duration>,
    cancel: Option<CancelToken>,
    state: watch::Sender<FlightState>,
}

impl Default for FlightPlayer {
    fn default() -> Self {
        let (state, _rx) = watch::channel(FlightState::NotStarted);
        Self {
            idle_timeout: None,
            cancel: None,
            state,
        }
    }
}

impl FlightPlayer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail an idle wait that takes longer than `timeout`.
    pub fn idle_timeout(mut self, timeout: Duration) -> Self {
        self.idle_timeout = Some(timeout);
        self
    }

    pub fn cancel_token(mut self, token: CancelToken) -> Self {
        self.cancel = Some(token);
        self
    }

    pub fn progress(&self) -> watch::Receiver<FlightState> {
        self.state.subscribe()
    }

    /// Plays `scenario` against `controller`.
    ///
    /// Steps run strictly in order. Within a step the targets are issued as
    /// zoom, pitch, center, rotation; then the action runs; then the player
    /// waits. The first failing setter or action ends the flight.
    pub async fn run<C>(&self, scenario: Scenario<'_>, controller: &mut C) -> Result<(), FlightError>
    where
        C: CameraController + ?Sized,
    {
        let steps = scenario.len();
        info!(steps, "flight started");

        let result = self.play(scenario, controller).await;
        self.state.send_replace(FlightState::Done);

        match &result {
            Ok(()) => info!(steps, "flight finished"),
            Err(err) => warn!("flight stopped: {err}"),
        }
        result
    }

    async fn play<C>(&self, scenario: Scenario<'_>, controller: &mut C) -> Result<(), FlightError>
    where
        C: CameraController + ?Sized,
    {
        for (index, mut step) in scenario.into_iter().enumerate() {
            if self.cancel.as_ref().is_some_and(CancelToken::is_cancelled) {
                return Err(FlightError::Cancelled { step: index });
            }
            self.state.send_replace(FlightState::Running { step: index });
            debug!(step = index, spec = ?step.spec, "flight step");

            issue_targets(index, &step.spec, controller)?;

            if let Some(action) = step.action.as_mut() {
                action().map_err(|source| FlightError::Action {
                    step: index,
                    source,
                })?;
            }

            self.wait(index, step.spec.wait(), controller).await?;
        }
        Ok(())
    }

    async fn wait<C>(&self, step: usize, wait: Wait, controller: &mut C) -> Result<(), FlightError>
    where
        C: CameraController + ?Sized,
    {
        match wait {
            Wait::Idle => {
                let signal = controller.once_idle();
                let idle_timeout = self.idle_timeout;
                self.unless_cancelled(step, async move {
                    match idle_timeout {
                        Some(timeout) => match tokio::time::timeout(timeout, signal).await {
                            Ok(fired) => fired.map_err(|_| FlightError::IdleSignalLost { step }),
                            Err(_) => Err(FlightError::IdleTimeout { step, timeout }),
                        },
                        None => signal.await.map_err(|_| FlightError::IdleSignalLost { step }),
                    }
                })
                .await
            }
            Wait::Sleep(duration) => {
                self.unless_cancelled(step, async move {
                    tokio::time::sleep(duration).await;
                    Ok(())
                })
                .await
            }
        }
    }

    async fn unless_cancelled<F>(&self, step: usize, wait: F) -> Result<(), FlightError>
    where
        F: Future<Output = Result<(), FlightError>>,
    {
        let Some(token) = &self.cancel else {
            return wait.await;
        };
        tokio::select! {
            biased;
            () = token.cancelled() => Err(FlightError::Cancelled { step }),
            result = wait => result,
        }
    }
}

fn issue_targets<C>(step: usize, spec: &StepSpec, controller: &mut C) -> Result<(), FlightError>
where
    C: CameraController + ?Sized,
{
    if let Some(zoom) = spec.zoom {
        let options = spec.animation_options(CameraProperty::Zoom);
        controller
            .set_zoom(zoom, &options)
            .map_err(setter_failed(step, CameraProperty::Zoom))?;
    }
    if let Some(pitch) = spec.pitch {
        let options = spec.animation_options(CameraProperty::Pitch);
        controller
            .set_pitch(pitch, &options)
            .map_err(setter_failed(step, CameraProperty::Pitch))?;
    }
    if let Some(center) = spec.center {
        let options = spec.animation_options(CameraProperty::Center);
        controller
            .set_center(center, &options)
            .map_err(setter_failed(step, CameraProperty::Center))?;
    }
    if let Some(rotation) = spec.rotation {
        let options = spec.animation_options(CameraProperty::Rotation);
        controller
            .set_rotation(rotation, &options)
            .map_err(setter_failed(step, CameraProperty::Rotation))?;
    }
    Ok(())
}

fn setter_failed(
    step: usize,
    property: CameraProperty,
) -> impl FnOnce(ControllerError) -> FlightError {
    move |source| FlightError::Controller {
        step,
        property,
        source,
    }
}

/// Plays `scenario` with a default [`FlightPlayer`].
pub async fn run_flight<C>(scenario: Scenario<'_>, controller: &mut C) -> Result<(), FlightError>
where
    C: CameraController + ?Sized,
{
    FlightPlayer::new().run(scenario, controller).await
}
