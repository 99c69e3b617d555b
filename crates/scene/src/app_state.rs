use tracing::{debug, info};

use crate::layer::{LayerPass, ModelLayer};
use crate::stack::ModelStack;

/// Everything the overlay renders from, owned in one place.
///
/// UI handlers and flight actions change the selection through [`select`];
/// the map's render hook draws through [`render_frame`]. Callers share it
/// behind a lock and ask the map for a redraw when `select` reports a change.
///
/// [`select`]: AppState::select
/// [`render_frame`]: AppState::render_frame
#[derive(Debug)]
pub struct AppState<M> {
    stack: ModelStack<M>,
    layer: ModelLayer,
    frames_drawn: u64,
}

impl<M> AppState<M> {
    pub fn new(stack: ModelStack<M>, layer: ModelLayer) -> Self {
        Self {
            stack,
            layer,
            frames_drawn: 0,
        }
    }

    pub fn stack(&self) -> &ModelStack<M> {
        &self.stack
    }

    pub fn stack_mut(&mut self) -> &mut ModelStack<M> {
        &mut self.stack
    }

    /// Switches the displayed model. Returns `true` if a redraw is needed.
    pub fn select(&mut self, name: &str) -> bool {
        let changed = self.stack.toggle(name);
        if changed {
            info!(model = name, shown = ?self.stack.rendered_names(), "model selected");
        } else {
            debug!(model = name, "model not loaded; selection unchanged");
        }
        changed
    }

    pub fn render_frame(&mut self, style_zoom: f64) -> LayerPass<'_> {
        let pass = self.layer.render(&self.stack, style_zoom);
        if matches!(pass, LayerPass::Drawn(_)) {
            self.frames_drawn += 1;
        }
        pass
    }

    pub fn frames_drawn(&self) -> u64 {
        self.frames_drawn
    }
}
