use serde::{Deserialize, Serialize};

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelKind {
    /// Whole-building shell.
    Building,
    /// One storey of a sliced building.
    Floor,
}

/// A model the application knows how to load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelDescriptor {
    /// Stable key used by UI handlers and flight steps.
    pub name: String,
    #[serde(rename = "type")]
    pub kind: ModelKind,
    /// Label shown to users; defaults to `name`.
    #[serde(default)]
    pub display_name: Option<String>,
    /// Mesh file, relative to the model root.
    pub path: String,
}

impl ModelDescriptor {
    pub fn new(name: impl Into<String>, kind: ModelKind, path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind,
            display_name: None,
            path: path.into(),
        }
    }

    pub fn label(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SceneError {
    DuplicateModel(String),
    UnknownModel(String),
}

impl std::fmt::Display for SceneError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SceneError::DuplicateModel(name) => write!(f, "model declared twice: {name}"),
            SceneError::UnknownModel(name) => write!(f, "unknown model: {name}"),
        }
    }
}

impl std::error::Error for SceneError {}

#[cfg(test)]
mod tests {
    use super::{ModelDescriptor, ModelKind};

    #[test]
    fn parses_catalog_entry() {
        let json = r#"{
            "name": "01b1",
            "type": "floor",
            "displayName": "Tower B1",
            "path": "floors/01b1/01b1.gltf"
        }"#;
        let d: ModelDescriptor = serde_json::from_str(json).unwrap();
        assert_eq!(d.kind, ModelKind::Floor);
        assert_eq!(d.label(), "Tower B1");
    }

    #[test]
    fn label_falls_back_to_name() {
        let d = ModelDescriptor::new("building", ModelKind::Building, "building.gltf");
        assert_eq!(d.label(), "building");
    }
}
