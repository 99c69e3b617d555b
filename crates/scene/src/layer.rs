use tracing::debug;

use crate::stack::ModelStack;

/// Zoom level below which the overlay detaches its models.
pub const DEFAULT_MIN_ZOOM: f64 = 16.0;

/// Outcome of drawing the model layer for one frame.
#[derive(Debug, Clone, PartialEq)]
pub enum LayerPass<'s> {
    /// Nothing is selected; the layer does no work.
    Empty,
    /// Models are selected but the map is zoomed out past the layer.
    Detached,
    /// These models are attached and drawn, bottom first.
    Drawn(Vec<&'s str>),
}

/// Custom map layer that draws the selected models.
#[derive(Debug)]
pub struct ModelLayer {
    min_zoom: f64,
    attached: bool,
}

impl Default for ModelLayer {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_ZOOM)
    }
}

impl ModelLayer {
    pub fn new(min_zoom: f64) -> Self {
        Self {
            min_zoom,
            attached: false,
        }
    }

    pub fn min_zoom(&self) -> f64 {
        self.min_zoom
    }

    pub fn is_attached(&self) -> bool {
        self.attached
    }

    pub fn render<'s, M>(&mut self, stack: &'s ModelStack<M>, style_zoom: f64) -> LayerPass<'s> {
        if stack.rendered_names().is_empty() {
            return LayerPass::Empty;
        }

        let attach = style_zoom >= self.min_zoom;
        if attach != self.attached {
            debug!(style_zoom, min_zoom = self.min_zoom, attach, "model layer visibility changed");
            self.attached = attach;
        }
        if !attach {
            return LayerPass::Detached;
        }
        LayerPass::Drawn(stack.rendered().map(|(name, _)| name).collect())
    }
}
