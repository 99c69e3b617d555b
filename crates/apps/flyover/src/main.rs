mod config;
mod loader;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use flight::{CameraController, CancelToken, FlightPlayer, FlightState, Scenario, ScenarioStep};
use mapsim::{FrameContext, HeadlessMap, MapHandle};
use parking_lot::Mutex;
use scene::{AppState, LayerPass, ModelLayer, ModelStack};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, trace, warn};
use tracing_subscriber::EnvFilter;

use crate::config::{FlightFile, FlightStep};
use crate::loader::{LoadedModel, load_all};

type SharedApp = Arc<Mutex<AppState<LoadedModel>>>;

#[derive(Parser, Debug)]
#[command(author, version, about = "Plays a scripted camera flight over a headless map")]
struct Args {
    /// Flight file (JSON)
    file: PathBuf,

    /// Frames per second of the map's render loop
    #[arg(long, env = "FLYOVER_FPS", default_value_t = 60, value_parser = clap::value_parser!(u32).range(1..=240))]
    fps: u32,

    /// Fail a waitIdle step if the map stays busy this long
    #[arg(long, env = "FLYOVER_IDLE_TIMEOUT_MS")]
    idle_timeout_ms: Option<u64>,

    /// Directory model paths are relative to (default: the flight file's directory)
    #[arg(long)]
    model_root: Option<PathBuf>,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    if let Err(e) = real_main(Args::parse()).await {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

async fn real_main(args: Args) -> Result<(), String> {
    let file = FlightFile::load(&args.file).await.map_err(|e| e.to_string())?;
    let model_root = args.model_root.clone().unwrap_or_else(|| {
        args.file
            .parent()
            .map(PathBuf::from)
            .unwrap_or_default()
    });

    let app = build_app(&file, &model_root).await.map_err(|e| e.to_string())?;
    let map = MapHandle::new(HeadlessMap::new(file.map.camera()));
    install_render_hook(&map, &app);

    // Show the default model once every load has settled.
    if let Some(default) = file.models.as_ref().and_then(|m| m.default.as_deref()) {
        if app.lock().stack_mut().show_only(default) {
            map.clone().request_redraw();
        } else {
            warn!(model = default, "default model did not load");
        }
    }

    let frame_period = Duration::from_secs_f64(1.0 / f64::from(args.fps));
    let frames = map.spawn_frame_loop(frame_period);

    let cancel = CancelToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("interrupted; cancelling flight");
            on_interrupt.cancel();
        }
    });

    let mut player = FlightPlayer::new().cancel_token(cancel);
    if let Some(ms) = args.idle_timeout_ms {
        player = player.idle_timeout(Duration::from_millis(ms));
    }
    let progress = tokio::spawn(log_progress(player.progress()));

    let scenario = build_scenario(file.steps, &app, &map);
    let result = player.run(scenario, &mut map.clone()).await;

    let camera = map.camera();
    info!(
        lon = camera.center.lon,
        lat = camera.center.lat,
        zoom = camera.zoom,
        pitch = camera.pitch,
        rotation = camera.rotation,
        frames_drawn = app.lock().frames_drawn(),
        "final camera"
    );

    map.destroy();
    join_frame_loop(frames).await;
    progress.abort();

    result.map_err(|e| e.to_string())
}

async fn build_app(file: &FlightFile, model_root: &std::path::Path) -> Result<SharedApp, scene::SceneError> {
    let Some(models) = &file.models else {
        return Ok(Arc::new(Mutex::new(AppState::new(
            ModelStack::new(Vec::new())?,
            ModelLayer::default(),
        ))));
    };

    let mut stack = ModelStack::new(models.items.clone())?;
    let loaded = load_all(model_root, &models.items, &models.placement).await;
    info!(declared = models.items.len(), loaded = loaded.len(), "models loaded");
    for (name, model) in loaded {
        debug!(
            model = %name,
            path = %model.path.display(),
            bytes = model.bytes,
            position = ?model.transform.position,
            "model placed"
        );
        stack.insert_loaded(&name, model)?;
    }
    Ok(Arc::new(Mutex::new(AppState::new(stack, ModelLayer::new(models.min_zoom)))))
}

fn install_render_hook(map: &MapHandle, app: &SharedApp) {
    let app = app.clone();
    map.set_render_hook(Box::new(move |ctx: &FrameContext| {
        let mut app = app.lock();
        match app.render_frame(ctx.style_zoom()) {
            LayerPass::Drawn(names) => trace!(frame = ctx.frame.index, ?names, "models drawn"),
            LayerPass::Detached => trace!(frame = ctx.frame.index, "models detached"),
            LayerPass::Empty => {}
        }
    }));
}

/// Turns each step's `show` into an action that switches the model and
/// asks the map for a redraw.
fn build_scenario(steps: Vec<FlightStep>, app: &SharedApp, map: &MapHandle) -> Scenario<'static> {
    steps
        .into_iter()
        .map(|step| {
            let scenario_step = ScenarioStep::new(step.spec);
            let Some(name) = step.show else {
                return scenario_step;
            };
            let app = app.clone();
            let mut map = map.clone();
            scenario_step.with_action(move || {
                let changed = app.lock().select(&name);
                if changed {
                    map.request_redraw();
                }
                Ok(())
            })
        })
        .collect()
}

/// Waits for the frame loop to wind down. Returns `false` if it died early,
/// e.g. from a panic inside the render hook.
async fn join_frame_loop(frames: JoinHandle<()>) -> bool {
    match frames.await {
        Ok(()) => true,
        Err(err) => {
            warn!("frame loop ended abnormally: {err}");
            false
        }
    }
}

async fn log_progress(mut rx: watch::Receiver<FlightState>) {
    while rx.changed().await.is_ok() {
        let state = *rx.borrow_and_update();
        match state {
            FlightState::Running { step } => info!(step, "flight step"),
            FlightState::Done => break,
            FlightState::NotStarted => {}
        }
    }
}
