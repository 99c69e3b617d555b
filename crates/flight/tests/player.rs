use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use flight::{
    ActionError, AnimationOptions, CameraController, CameraProperty, CancelToken, ControllerError,
    Easing, FlightError, FlightPlayer, FlightState, IdleNotifier, IdleSignal, Scenario,
    ScenarioStep, StepSpec, run_flight,
};
use foundation::geo::LngLat;
use pretty_assertions::assert_eq;
use tokio::time::Instant;

#[derive(Debug, Clone, PartialEq)]
enum Call {
    Zoom(f64, AnimationOptions),
    Pitch(f64, AnimationOptions),
    Center(LngLat, AnimationOptions),
    Rotation(f64, AnimationOptions),
    OnceIdle,
    Action(usize),
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum IdleMode {
    /// Fire as soon as someone subscribes.
    Immediate,
    /// Hand notifiers to the test.
    Manual,
    /// Keep notifiers forever without firing.
    Never,
    /// Drop notifiers right away.
    Drop,
}

#[derive(Debug, Clone, Default)]
struct Log {
    calls: Rc<RefCell<Vec<(Call, Instant)>>>,
}

impl Log {
    fn record(&self, call: Call) {
        self.calls.borrow_mut().push((call, Instant::now()));
    }

    fn calls(&self) -> Vec<Call> {
        self.calls.borrow().iter().map(|(c, _)| c.clone()).collect()
    }

    fn time_of(&self, wanted: &Call) -> Instant {
        self.calls
            .borrow()
            .iter()
            .find(|(c, _)| c == wanted)
            .map(|(_, t)| *t)
            .unwrap()
    }

    /// Builds an action that records its step index.
    fn action(&self, index: usize) -> ScenarioStep<'static> {
        let log = self.clone();
        ScenarioStep::action(move || {
            log.record(Call::Action(index));
            Ok(())
        })
    }
}

struct RecordingController {
    log: Log,
    idle: IdleMode,
    pending: Rc<RefCell<Vec<IdleNotifier>>>,
    redraws: usize,
}

impl RecordingController {
    fn new(idle: IdleMode) -> Self {
        Self {
            log: Log::default(),
            idle,
            pending: Rc::default(),
            redraws: 0,
        }
    }

    fn check(&self, property: CameraProperty, value: f64) -> Result<(), ControllerError> {
        if !value.is_finite() {
            return Err(ControllerError::InvalidTarget {
                property,
                value: value.to_string(),
            });
        }
        Ok(())
    }
}

impl CameraController for RecordingController {
    fn set_zoom(&mut self, zoom: f64, options: &AnimationOptions) -> Result<(), ControllerError> {
        self.check(CameraProperty::Zoom, zoom)?;
        self.log.record(Call::Zoom(zoom, *options));
        Ok(())
    }

    fn set_pitch(&mut self, pitch: f64, options: &AnimationOptions) -> Result<(), ControllerError> {
        self.check(CameraProperty::Pitch, pitch)?;
        self.log.record(Call::Pitch(pitch, *options));
        Ok(())
    }

    fn set_center(
        &mut self,
        center: LngLat,
        options: &AnimationOptions,
    ) -> Result<(), ControllerError> {
        self.log.record(Call::Center(center, *options));
        Ok(())
    }

    fn set_rotation(
        &mut self,
        rotation: f64,
        options: &AnimationOptions,
    ) -> Result<(), ControllerError> {
        self.check(CameraProperty::Rotation, rotation)?;
        self.log.record(Call::Rotation(rotation, *options));
        Ok(())
    }

    fn once_idle(&mut self) -> IdleSignal {
        self.log.record(Call::OnceIdle);
        let (notifier, signal) = IdleSignal::channel();
        match self.idle {
            IdleMode::Immediate => {
                notifier.notify();
            }
            IdleMode::Manual | IdleMode::Never => self.pending.borrow_mut().push(notifier),
            IdleMode::Drop => drop(notifier),
        }
        signal
    }

    fn request_redraw(&mut self) {
        self.redraws += 1;
    }
}

fn opts(duration_ms: u64, animate_height: bool) -> AnimationOptions {
    AnimationOptions {
        duration_ms,
        easing: None,
        animate_height,
    }
}

#[derive(Debug)]
struct Boom(&'static str);

impl std::fmt::Display for Boom {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "boom: {}", self.0)
    }
}

impl std::error::Error for Boom {}

#[tokio::test(start_paused = true)]
async fn empty_scenario_touches_nothing() {
    let mut controller = RecordingController::new(IdleMode::Immediate);
    let start = Instant::now();

    run_flight(Scenario::new(), &mut controller).await.unwrap();

    assert!(controller.log.calls().is_empty());
    assert_eq!(controller.redraws, 0);
    assert_eq!(Instant::now(), start);
}

#[tokio::test(start_paused = true)]
async fn actions_run_once_in_index_order() {
    let mut controller = RecordingController::new(IdleMode::Immediate);
    let log = controller.log.clone();
    let scenario: Scenario = (0..5).map(|i| log.action(i)).collect();

    run_flight(scenario, &mut controller).await.unwrap();

    let expected: Vec<Call> = (0..5).map(Call::Action).collect();
    assert_eq!(log.calls(), expected);
}

#[tokio::test(start_paused = true)]
async fn zoom_then_rotation_steps_issue_only_their_setters() {
    let mut controller = RecordingController::new(IdleMode::Immediate);
    let scenario: Scenario = [
        StepSpec {
            zoom: Some(20.0),
            duration: Some(3000),
            ..StepSpec::default()
        },
        StepSpec {
            rotation: Some(75.0),
            duration: Some(1000),
            ..StepSpec::default()
        },
    ]
    .into_iter()
    .collect();
    let start = Instant::now();

    run_flight(scenario, &mut controller).await.unwrap();

    assert_eq!(
        controller.log.calls(),
        vec![
            Call::Zoom(20.0, opts(3000, true)),
            Call::Rotation(75.0, opts(1000, false)),
        ]
    );
    let rotation_at = controller.log.time_of(&Call::Rotation(75.0, opts(1000, false)));
    assert!(rotation_at - start >= Duration::from_millis(3000));
    assert!(Instant::now() - start >= Duration::from_millis(4000));
}

#[tokio::test(start_paused = true)]
async fn setters_follow_fixed_order_then_action() {
    let mut controller = RecordingController::new(IdleMode::Immediate);
    let log = controller.log.clone();
    let center = LngLat::new(55.145096, 25.0869);
    let spec = StepSpec {
        rotation: Some(30.0),
        center: Some(center),
        pitch: Some(45.0),
        zoom: Some(18.0),
        duration: Some(500),
        center_easing: Some(Easing::EaseOutCubic),
        ..StepSpec::default()
    };
    let step = ScenarioStep::new(spec).with_action(move || {
        log.record(Call::Action(0));
        Ok(())
    });

    run_flight(Scenario::new().then(step), &mut controller).await.unwrap();

    assert_eq!(
        controller.log.calls(),
        vec![
            Call::Zoom(18.0, opts(500, true)),
            Call::Pitch(45.0, opts(500, false)),
            Call::Center(
                center,
                AnimationOptions {
                    duration_ms: 500,
                    easing: Some(Easing::EaseOutCubic),
                    animate_height: false,
                }
            ),
            Call::Rotation(30.0, opts(500, false)),
            Call::Action(0),
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn sleep_holds_the_next_step_back() {
    let mut controller = RecordingController::new(IdleMode::Immediate);
    let log = controller.log.clone();
    let scenario = Scenario::new()
        .then(log.action(0))
        .then(StepSpec {
            duration: Some(10_000),
            sleep: Some(1000),
            ..StepSpec::default()
        })
        .then(log.action(2));
    let start = Instant::now();

    run_flight(scenario, &mut controller).await.unwrap();

    let first = log.time_of(&Call::Action(0));
    let last = log.time_of(&Call::Action(2));
    assert_eq!(first, start);
    assert!(last - first >= Duration::from_millis(1000));
    assert!(last - first < Duration::from_millis(10_000));
}

#[tokio::test(start_paused = true)]
async fn action_only_step_sets_nothing_and_does_not_wait() {
    let mut controller = RecordingController::new(IdleMode::Immediate);
    let log = controller.log.clone();
    let start = Instant::now();

    run_flight(Scenario::new().then(log.action(0)), &mut controller)
        .await
        .unwrap();

    assert_eq!(log.calls(), vec![Call::Action(0)]);
    assert_eq!(Instant::now(), start);
}

#[tokio::test(start_paused = true)]
async fn wait_idle_blocks_until_the_controller_fires() {
    let mut controller = RecordingController::new(IdleMode::Manual);
    let log = controller.log.clone();
    let pending = controller.pending.clone();
    let scenario: Scenario = [
        StepSpec {
            zoom: Some(10.0),
            duration: Some(200),
            wait_idle: true,
            ..StepSpec::default()
        },
        StepSpec {
            zoom: Some(12.0),
            ..StepSpec::default()
        },
    ]
    .into_iter()
    .collect();
    let start = Instant::now();

    let driver = async {
        // Far past the step's own duration: only the idle event may release it.
        tokio::time::sleep(Duration::from_millis(5000)).await;
        assert_eq!(
            log.calls(),
            vec![Call::Zoom(10.0, opts(200, true)), Call::OnceIdle]
        );
        let notifier = pending.borrow_mut().pop().unwrap();
        assert!(notifier.notify());
    };
    let (result, ()) = tokio::join!(run_flight(scenario, &mut controller), driver);
    result.unwrap();

    let second = log.time_of(&Call::Zoom(12.0, opts(0, true)));
    assert!(second - start >= Duration::from_millis(5000));
}

#[tokio::test(start_paused = true)]
async fn failing_action_aborts_with_its_error() {
    let mut controller = RecordingController::new(IdleMode::Immediate);
    let scenario = Scenario::new()
        .then(StepSpec {
            zoom: Some(15.0),
            ..StepSpec::default()
        })
        .then(ScenarioStep::action(|| -> Result<(), ActionError> {
            Err(Box::new(Boom("model missing")))
        }))
        .then(StepSpec {
            zoom: Some(16.0),
            pitch: Some(30.0),
            ..StepSpec::default()
        });

    let err = run_flight(scenario, &mut controller).await.unwrap_err();

    let FlightError::Action { step, source } = &err else {
        panic!("expected action error, got {err:?}");
    };
    assert_eq!(*step, 1);
    assert_eq!(source.downcast_ref::<Boom>().unwrap().0, "model missing");
    assert_eq!(controller.log.calls(), vec![Call::Zoom(15.0, opts(0, true))]);
}

#[tokio::test(start_paused = true)]
async fn failing_setter_skips_rest_of_step_and_flight() {
    let mut controller = RecordingController::new(IdleMode::Immediate);
    let log = controller.log.clone();
    let step = ScenarioStep::new(StepSpec {
        zoom: Some(f64::NAN),
        pitch: Some(40.0),
        ..StepSpec::default()
    })
    .with_action(move || {
        log.record(Call::Action(0));
        Ok(())
    });
    let scenario = Scenario::new().then(step).then(StepSpec {
        rotation: Some(10.0),
        ..StepSpec::default()
    });

    let err = run_flight(scenario, &mut controller).await.unwrap_err();

    assert!(matches!(
        err,
        FlightError::Controller {
            step: 0,
            property: CameraProperty::Zoom,
            ..
        }
    ));
    assert!(controller.log.calls().is_empty());
}

#[tokio::test(start_paused = true)]
async fn idle_timeout_fails_a_silent_controller() {
    let mut controller = RecordingController::new(IdleMode::Never);
    let player = FlightPlayer::new().idle_timeout(Duration::from_millis(2000));
    let scenario = Scenario::new().then(StepSpec {
        wait_idle: true,
        ..StepSpec::default()
    });
    let start = Instant::now();

    let err = player.run(scenario, &mut controller).await.unwrap_err();

    assert!(matches!(err, FlightError::IdleTimeout { step: 0, .. }));
    assert!(Instant::now() - start >= Duration::from_millis(2000));
}

#[tokio::test(start_paused = true)]
async fn dropped_idle_subscription_is_reported() {
    let mut controller = RecordingController::new(IdleMode::Drop);
    let scenario = Scenario::new()
        .then(StepSpec::pause(10))
        .then(StepSpec {
            wait_idle: true,
            ..StepSpec::default()
        });

    let err = run_flight(scenario, &mut controller).await.unwrap_err();

    assert!(matches!(err, FlightError::IdleSignalLost { step: 1 }));
}

#[tokio::test(start_paused = true)]
async fn cancel_interrupts_a_sleep() {
    let mut controller = RecordingController::new(IdleMode::Immediate);
    let token = CancelToken::new();
    let player = FlightPlayer::new().cancel_token(token.clone());
    let scenario = Scenario::new().then(StepSpec::pause(10_000)).then(StepSpec {
        zoom: Some(3.0),
        ..StepSpec::default()
    });
    let start = Instant::now();

    let canceller = async {
        tokio::time::sleep(Duration::from_millis(1500)).await;
        token.cancel();
    };
    let (result, ()) = tokio::join!(player.run(scenario, &mut controller), canceller);

    assert!(matches!(result, Err(FlightError::Cancelled { step: 0 })));
    assert!(controller.log.calls().is_empty());
    assert!(Instant::now() - start < Duration::from_millis(10_000));
}

#[tokio::test(start_paused = true)]
async fn cancel_interrupts_an_idle_wait() {
    let mut controller = RecordingController::new(IdleMode::Never);
    let token = CancelToken::new();
    let player = FlightPlayer::new().cancel_token(token.clone());
    let scenario = Scenario::new()
        .then(StepSpec {
            zoom: Some(5.0),
            wait_idle: true,
            ..StepSpec::default()
        })
        .then(StepSpec {
            pitch: Some(30.0),
            ..StepSpec::default()
        });
    let start = Instant::now();

    let canceller = async {
        tokio::time::sleep(Duration::from_millis(1500)).await;
        token.cancel();
    };
    let (result, ()) = tokio::join!(player.run(scenario, &mut controller), canceller);

    assert!(matches!(result, Err(FlightError::Cancelled { step: 0 })));
    assert_eq!(
        controller.log.calls(),
        vec![Call::Zoom(5.0, opts(0, true)), Call::OnceIdle]
    );
    assert_eq!(Instant::now() - start, Duration::from_millis(1500));
}

#[tokio::test(start_paused = true)]
async fn cancelled_token_prevents_any_step() {
    let mut controller = RecordingController::new(IdleMode::Immediate);
    let token = CancelToken::new();
    token.cancel();
    let player = FlightPlayer::new().cancel_token(token);
    let scenario = Scenario::new().then(StepSpec {
        zoom: Some(3.0),
        ..StepSpec::default()
    });

    let err = player.run(scenario, &mut controller).await.unwrap_err();

    assert!(matches!(err, FlightError::Cancelled { step: 0 }));
    assert!(controller.log.calls().is_empty());
}

#[tokio::test(start_paused = true)]
async fn progress_ends_in_done() {
    let mut controller = RecordingController::new(IdleMode::Immediate);
    let player = FlightPlayer::new();
    let mut progress = player.progress();
    assert_eq!(*progress.borrow_and_update(), FlightState::NotStarted);

    let scenario = Scenario::new()
        .then(StepSpec::pause(100))
        .then(StepSpec::pause(100));
    player.run(scenario, &mut controller).await.unwrap();

    assert!(progress.has_changed().unwrap());
    assert_eq!(*progress.borrow(), FlightState::Done);
}

#[tokio::test(start_paused = true)]
async fn progress_reports_running_step() {
    let mut controller = RecordingController::new(IdleMode::Immediate);
    let player = FlightPlayer::new();
    let progress = player.progress();
    let scenario = Scenario::new()
        .then(StepSpec::pause(100))
        .then(StepSpec::pause(1000));

    let observer = async {
        tokio::time::sleep(Duration::from_millis(500)).await;
        *progress.borrow()
    };
    let (result, seen) = tokio::join!(player.run(scenario, &mut controller), observer);

    result.unwrap();
    assert_eq!(seen, FlightState::Running { step: 1 });
}

#[tokio::test(start_paused = true)]
async fn flight_runs_against_a_trait_object() {
    let mut controller = RecordingController::new(IdleMode::Immediate);
    let dyn_controller: &mut dyn CameraController = &mut controller;
    let scenario = Scenario::new().then(StepSpec {
        pitch: Some(60.0),
        wait_idle: true,
        ..StepSpec::default()
    });

    run_flight(scenario, dyn_controller).await.unwrap();

    assert_eq!(
        controller.log.calls(),
        vec![Call::Pitch(60.0, opts(0, false)), Call::OnceIdle]
    );
}
