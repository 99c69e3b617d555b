use std::collections::VecDeque;

use crate::frame::Frame;

/// Map-side events, in the vocabulary map engines expose to listeners.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum MapEventKind {
    /// A camera property started animating.
    MoveStart,
    /// The last running camera animation finished.
    MoveEnd,
    /// A frame was drawn.
    Render,
    /// Nothing left to animate or redraw.
    Idle,
}

impl MapEventKind {
    pub fn as_str(self) -> &'static str {
        match self {
            MapEventKind::MoveStart => "movestart",
            MapEventKind::MoveEnd => "moveend",
            MapEventKind::Render => "render",
            MapEventKind::Idle => "idle",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    pub frame_index: u64,
    pub kind: MapEventKind,
    pub message: String,
}

/// Bounded log of recent map events, oldest dropped first.
#[derive(Debug)]
pub struct EventBus {
    events: VecDeque<Event>,
    capacity: usize,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::with_capacity(1024)
    }
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            events: VecDeque::with_capacity(capacity.clamp(1, 1024)),
            capacity: capacity.max(1),
        }
    }

    pub fn emit(&mut self, frame: Frame, kind: MapEventKind, message: impl Into<String>) {
        if self.events.len() == self.capacity {
            self.events.pop_front();
        }
        self.events.push_back(Event {
            frame_index: frame.index,
            kind,
            message: message.into(),
        });
    }

    pub fn events(&self) -> &VecDeque<Event> {
        &self.events
    }

    pub fn count(&self, kind: MapEventKind) -> usize {
        self.events.iter().filter(|e| e.kind == kind).count()
    }

    pub fn drain(&mut self) -> Vec<Event> {
        self.events.drain(..).collect()
    }
}
