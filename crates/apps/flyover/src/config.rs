use std::path::{Path, PathBuf};

use flight::StepSpec;
use foundation::geo::LngLat;
use mapsim::CameraState;
use scene::{DEFAULT_MIN_ZOOM, ModelDescriptor, ModelPlacement, SceneError};
use serde::Deserialize;

/// A flight file: starting camera, models to load, steps to play.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlightFile {
    pub map: MapConfig,
    #[serde(default)]
    pub models: Option<ModelsConfig>,
    #[serde(default)]
    pub steps: Vec<FlightStep>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapConfig {
    pub center: LngLat,
    pub zoom: f64,
    #[serde(default)]
    pub pitch: f64,
    #[serde(default)]
    pub rotation: f64,
}

impl MapConfig {
    pub fn camera(&self) -> CameraState {
        CameraState {
            center: self.center,
            zoom: self.zoom,
            pitch: self.pitch,
            rotation: self.rotation,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelsConfig {
    #[serde(default = "default_min_zoom")]
    pub min_zoom: f64,
    /// Model shown once loading settles.
    #[serde(default)]
    pub default: Option<String>,
    pub placement: ModelPlacement,
    pub items: Vec<ModelDescriptor>,
}

fn default_min_zoom() -> f64 {
    DEFAULT_MIN_ZOOM
}

/// A step plus the model it switches to, if any.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct FlightStep {
    #[serde(flatten)]
    pub spec: StepSpec,
    #[serde(default)]
    pub show: Option<String>,
}

#[derive(Debug)]
pub enum ConfigError {
    Read { path: PathBuf, source: std::io::Error },
    Parse { path: PathBuf, source: serde_json::Error },
    Scene(SceneError),
    /// A step shows a model but the file declares none.
    NoModels { step: usize },
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Read { path, source } => write!(f, "read {}: {source}", path.display()),
            ConfigError::Parse { path, source } => write!(f, "parse {}: {source}", path.display()),
            ConfigError::Scene(err) => write!(f, "{err}"),
            ConfigError::NoModels { step } => write!(f, "step {step} shows a model but no models are declared"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Read { source, .. } => Some(source),
            ConfigError::Parse { source, .. } => Some(source),
            ConfigError::Scene(err) => Some(err),
            ConfigError::NoModels { .. } => None,
        }
    }
}

impl From<SceneError> for ConfigError {
    fn from(err: SceneError) -> Self {
        ConfigError::Scene(err)
    }
}

impl FlightFile {
    pub async fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| ConfigError::Read {
                path: path.to_path_buf(),
                source,
            })?;
        let file: FlightFile = serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        file.validate()?;
        Ok(file)
    }

    /// Every model a step or the default refers to must be declared.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let Some(models) = &self.models else {
            return match self.steps.iter().position(|s| s.show.is_some()) {
                Some(step) => Err(ConfigError::NoModels { step }),
                None => Ok(()),
            };
        };
        let declared = |name: &str| models.items.iter().any(|d| d.name == name);
        let referenced = models
            .default
            .iter()
            .chain(self.steps.iter().filter_map(|s| s.show.as_ref()));
        for name in referenced {
            if !declared(name) {
                return Err(SceneError::UnknownModel(name.clone()).into());
            }
        }
        Ok(())
    }
}
