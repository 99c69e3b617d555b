use std::path::{Path, PathBuf};

use futures_util::future::join_all;
use scene::{ModelDescriptor, ModelPlacement, Transform};
use tracing::{debug, warn};

/// A model file read into memory and placed on the map.
///
/// Only the byte count is kept; meshes are never parsed.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedModel {
    pub path: PathBuf,
    pub bytes: usize,
    pub transform: Transform,
}

#[derive(Debug)]
pub enum LoadError {
    Io { path: PathBuf, source: std::io::Error },
    Empty { path: PathBuf },
}

impl std::fmt::Display for LoadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LoadError::Io { path, source } => write!(f, "load {}: {source}", path.display()),
            LoadError::Empty { path } => write!(f, "load {}: file is empty", path.display()),
        }
    }
}

impl std::error::Error for LoadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LoadError::Io { source, .. } => Some(source),
            LoadError::Empty { .. } => None,
        }
    }
}

pub async fn load_model(
    root: &Path,
    descriptor: &ModelDescriptor,
    placement: &ModelPlacement,
) -> Result<LoadedModel, LoadError> {
    let path = root.join(&descriptor.path);
    let bytes = tokio::fs::read(&path).await.map_err(|source| LoadError::Io {
        path: path.clone(),
        source,
    })?;
    if bytes.is_empty() {
        return Err(LoadError::Empty { path });
    }
    debug!(model = %descriptor.name, bytes = bytes.len(), "model loaded");
    Ok(LoadedModel {
        path,
        bytes: bytes.len(),
        transform: placement.transform(),
    })
}

/// Loads every model at once. Failures are logged and left out; the rest
/// come back in declaration order.
pub async fn load_all(
    root: &Path,
    descriptors: &[ModelDescriptor],
    placement: &ModelPlacement,
) -> Vec<(String, LoadedModel)> {
    let loads = descriptors.iter().map(|d| load_model(root, d, placement));
    let results = join_all(loads).await;

    descriptors
        .iter()
        .zip(results)
        .filter_map(|(descriptor, result)| match result {
            Ok(model) => Some((descriptor.name.clone(), model)),
            Err(err) => {
                warn!(model = %descriptor.name, "skipping model: {err}");
                None
            }
        })
        .collect()
}
