use std::collections::BTreeMap;

use crate::model::{ModelDescriptor, SceneError};

/// A building shell plus its floors, and which of them are shown.
///
/// Descriptors are ordered: the first is the whole building, the rest are
/// floors from the bottom up. Models whose load failed are never inserted and
/// are skipped wherever they would be shown.
#[derive(Debug)]
pub struct ModelStack<M> {
    descriptors: Vec<ModelDescriptor>,
    loaded: BTreeMap<String, M>,
    rendered: Vec<String>,
}

impl<M> ModelStack<M> {
    pub fn new(descriptors: Vec<ModelDescriptor>) -> Result<Self, SceneError> {
        for (i, d) in descriptors.iter().enumerate() {
            if descriptors[..i].iter().any(|other| other.name == d.name) {
                return Err(SceneError::DuplicateModel(d.name.clone()));
            }
        }
        Ok(Self {
            descriptors,
            loaded: BTreeMap::new(),
            rendered: Vec::new(),
        })
    }

    pub fn descriptors(&self) -> &[ModelDescriptor] {
        &self.descriptors
    }

    pub fn descriptor(&self, name: &str) -> Option<&ModelDescriptor> {
        self.descriptors.iter().find(|d| d.name == name)
    }

    pub fn insert_loaded(&mut self, name: &str, model: M) -> Result<(), SceneError> {
        if self.descriptor(name).is_none() {
            return Err(SceneError::UnknownModel(name.to_string()));
        }
        self.loaded.insert(name.to_string(), model);
        Ok(())
    }

    pub fn is_loaded(&self, name: &str) -> bool {
        self.loaded.contains_key(name)
    }

    pub fn loaded_count(&self) -> usize {
        self.loaded.len()
    }

    pub fn get(&self, name: &str) -> Option<&M> {
        self.loaded.get(name)
    }

    /// Shows `name` and everything stacked under it.
    ///
    /// Choosing the building shows just the building. Choosing a floor shows
    /// every loaded floor up to and including it, without the building shell.
    /// Returns `false` and leaves the selection alone if `name` is not loaded.
    pub fn toggle(&mut self, name: &str) -> bool {
        if !self.is_loaded(name) {
            return false;
        }
        let chose_building = self.descriptors.first().is_some_and(|d| d.name == name);

        self.rendered.clear();
        for (i, d) in self.descriptors.iter().enumerate() {
            if self.loaded.contains_key(&d.name) && (chose_building || i != 0) {
                self.rendered.push(d.name.clone());
            }
            if d.name == name {
                break;
            }
        }
        true
    }

    /// Shows only `name`, the state right after loading.
    pub fn show_only(&mut self, name: &str) -> bool {
        if !self.is_loaded(name) {
            return false;
        }
        self.rendered = vec![name.to_string()];
        true
    }

    pub fn hide_all(&mut self) {
        self.rendered.clear();
    }

    pub fn rendered_names(&self) -> &[String] {
        &self.rendered
    }

    pub fn rendered(&self) -> impl Iterator<Item = (&str, &M)> + '_ {
        self.rendered
            .iter()
            .filter_map(|name| self.loaded.get(name).map(|m| (name.as_str(), m)))
    }
}
